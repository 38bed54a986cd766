pub mod api_server;
pub mod balldontlie;
pub mod postgres;
pub mod sportsdb;

pub use api_server::start_api_server;
pub use balldontlie::{BallDontLieClient, BdlPlayer, BdlTeam};
pub use postgres::PostgresStore;
pub use sportsdb::{SportsDbClient, SportsDbPlayer, SportsDbTeam};
