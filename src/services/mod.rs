//! Business logic between the HTTP handlers and the repository.

pub mod analytics;
pub mod games;
pub mod ml;
pub mod players;
pub mod teams;

pub use analytics::AnalyticsService;
pub use games::GameService;
pub use ml::MlService;
pub use players::PlayerService;
pub use teams::TeamService;
