pub mod api;
pub mod assistant;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod models;
pub mod ranker;
pub mod service;
pub mod store;

pub use config::AppConfig;
pub use error::{AssistantError, Result};
pub use service::DocumentService;
