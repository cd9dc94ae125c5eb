pub mod assets;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod export;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod submission;
pub mod template;

pub use routes::AppState;
