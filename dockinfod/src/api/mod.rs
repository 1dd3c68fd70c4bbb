pub mod cors;
pub mod error;
pub mod routes;
