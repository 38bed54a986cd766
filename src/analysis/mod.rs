//! Statistics computed in memory over rows loaded by the services.

pub mod advanced;
pub mod aggregates;
pub mod comparison;
pub mod leaders;
pub mod similarity;
pub mod stats;
pub mod trends;

pub use advanced::{player_advanced, team_advanced, PlayerAdvanced, TeamAdvanced};
pub use aggregates::{group_by_player, player_analytics, team_analytics, PlayerTotals, Totals};
pub use comparison::{compare_teams, TeamComparison};
pub use leaders::{league_leaders, player_efficiency, LeaderEntry, LeaderStat, PlayerEfficiency};
pub use similarity::{find_similar, SimilarPlayer};
pub use trends::{compute_trend, TimePeriod, TrendPoint, TrendType};
