pub mod adapters;
pub mod analysis;
pub mod api;
pub mod cli;
pub mod collector;
pub mod config;
pub mod domain;
pub mod error;
pub mod ml;
pub mod persistence;
pub mod services;
pub mod validation;

pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use error::{NbaError, Result};
pub use persistence::NbaRepository;
