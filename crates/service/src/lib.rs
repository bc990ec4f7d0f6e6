pub mod auth;
pub mod error;
pub mod github;
pub mod parser;
pub mod post_editor;
pub mod profile_editor;
pub mod store;
pub mod validation;
