//! Storage abstraction shared by the services.
//!
//! The API only ever talks to `NbaRepository`; `adapters::PostgresStore` is
//! the production implementation.

use async_trait::async_trait;

use crate::domain::{
    Game, GameCreate, GameFilter, Player, PlayerCreate, PlayerFilter, PlayerSearch, PlayerStats,
    PlayerStatsCreate, StatLine, StatLineFilter, Team, TeamCreate, TeamFilter,
};
use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NbaRepository: Send + Sync {
    /// Cheap connectivity check
    async fn ping(&self) -> Result<()>;

    // ==================== Teams ====================

    async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>>;

    async fn get_team(&self, id: i64) -> Result<Option<Team>>;

    async fn find_team_by_abbreviation(&self, abbreviation: &str) -> Result<Option<Team>>;

    async fn find_team_by_external_id(&self, external_id: &str) -> Result<Option<Team>>;

    async fn insert_team(&self, team: &TeamCreate) -> Result<Team>;

    /// Persist every mutable column of an existing team
    async fn save_team(&self, team: &Team) -> Result<Team>;

    // ==================== Players ====================

    async fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<Player>>;

    async fn search_players(&self, search: &PlayerSearch) -> Result<Vec<Player>>;

    async fn get_player(&self, id: i64) -> Result<Option<Player>>;

    async fn find_player_by_external_id(&self, external_id: &str) -> Result<Option<Player>>;

    async fn insert_player(&self, player: &PlayerCreate) -> Result<Player>;

    /// Persist every mutable column of an existing player
    async fn save_player(&self, player: &Player) -> Result<Player>;

    // ==================== Games ====================

    /// Filtered page of games plus the total matching count
    async fn list_games(&self, filter: &GameFilter) -> Result<(Vec<Game>, i64)>;

    async fn get_game(&self, id: i64) -> Result<Option<Game>>;

    async fn insert_game(&self, game: &GameCreate) -> Result<Game>;

    async fn save_game(&self, game: &Game) -> Result<Game>;

    /// All completed games, optionally limited to one season, oldest first
    async fn completed_games(&self, season: Option<String>) -> Result<Vec<Game>>;

    // ==================== Player stats ====================

    async fn insert_player_stats(
        &self,
        game_id: i64,
        team_id: Option<i64>,
        stats: &PlayerStatsCreate,
    ) -> Result<PlayerStats>;

    /// A player's stat lines, most recent game first
    async fn player_stats(&self, filter: &StatLineFilter) -> Result<Vec<PlayerStats>>;

    /// Stat lines joined with game and player context, oldest game first
    async fn stat_lines(&self, filter: &StatLineFilter) -> Result<Vec<StatLine>>;
}
