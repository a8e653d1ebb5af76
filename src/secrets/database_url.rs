//! Password injection into the database connection-string template.
//!
//! The template carries a user but no password, e.g.
//! `postgresql://admin@db.example.com:5432/expenses`. The password is
//! inserted as `:password` right before the `@` that starts the host.
//! This is a textual splice; the password is not percent-encoded.

use crate::error::{Error, Result};

/// Splice `password` into `template` after the user segment.
///
/// Templates that do not have the `scheme://user@host...` shape, or that
/// already carry a password, are rejected.
pub fn splice_password(template: &str, password: &str) -> Result<String> {
    let scheme_end = template
        .find("://")
        .ok_or_else(|| invalid(template, "missing '://' after scheme"))?;
    if scheme_end == 0 {
        return Err(invalid(template, "empty scheme"));
    }

    let authority_start = scheme_end + 3;
    let rest = &template[authority_start..];
    let authority_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_len];

    let at = authority
        .find('@')
        .ok_or_else(|| invalid(template, "missing 'user@' before host"))?;
    let user = &authority[..at];
    let host = &authority[at + 1..];

    if user.is_empty() {
        return Err(invalid(template, "empty user"));
    }
    if user.contains(':') {
        return Err(invalid(template, "template already contains a password"));
    }
    if host.is_empty() || host.starts_with(':') || host.contains('@') {
        return Err(invalid(template, "missing or malformed host after '@'"));
    }

    let splice_at = authority_start + at;
    let mut url = String::with_capacity(template.len() + password.len() + 1);
    url.push_str(&template[..splice_at]);
    url.push(':');
    url.push_str(password);
    url.push_str(&template[splice_at..]);
    Ok(url)
}

fn invalid(template: &str, reason: &str) -> Error {
    let scheme = template.split("://").next().unwrap_or_default();
    Error::InvalidDatabaseUrl(format!("{reason} (scheme '{scheme}')"))
}
