pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult};
pub use routes::create_router;
pub use state::AppState;
