pub mod anchor;
pub mod server;
