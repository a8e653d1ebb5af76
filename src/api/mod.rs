pub mod routes;
mod server;

pub use server::*;
