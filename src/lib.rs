pub mod server;
pub mod sql;
