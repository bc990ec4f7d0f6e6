pub mod auth;
pub mod config;
pub mod error;
pub mod post;
pub mod profile;
pub mod router;
pub mod server;
pub mod state;
