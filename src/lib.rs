pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod policy;
pub mod router;
pub mod services;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use router::app;
pub use state::AppState;
