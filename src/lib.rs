//! Blog platform backend: user registration and login with JWT bearer tokens,
//! and blog post CRUD where only a post's author may modify it.

pub mod app;
pub mod auth;
pub mod blogs;
pub mod config;
pub mod error;
pub mod extract;
pub mod state;
pub mod store;

pub use app::build_app;
pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;
