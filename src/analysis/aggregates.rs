//! Per-player and per-team aggregation over box scores and completed games.

use std::collections::BTreeMap;

use super::stats::ratio;
use crate::domain::{
    BoxScore, Game, Player, PlayerAnalytics, Position, StatLine, Team, TeamAnalytics,
};

/// Running totals over a set of box scores
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub games: u32,
    /// Games with a recorded minutes value
    pub games_with_minutes: u32,
    pub box_score: BoxScore,
}

impl Totals {
    pub fn add(&mut self, line: &BoxScore) {
        self.games += 1;
        let acc = &mut self.box_score;
        if let Some(m) = line.minutes_played {
            self.games_with_minutes += 1;
            acc.minutes_played = Some(acc.minutes_played.unwrap_or(0.0) + m);
        }
        acc.points += line.points;
        acc.rebounds += line.rebounds;
        acc.assists += line.assists;
        acc.steals += line.steals;
        acc.blocks += line.blocks;
        acc.turnovers += line.turnovers;
        acc.fouls += line.fouls;
        acc.field_goals_made += line.field_goals_made;
        acc.field_goals_attempted += line.field_goals_attempted;
        acc.three_pointers_made += line.three_pointers_made;
        acc.three_pointers_attempted += line.three_pointers_attempted;
        acc.free_throws_made += line.free_throws_made;
        acc.free_throws_attempted += line.free_throws_attempted;
        if let Some(pm) = line.plus_minus {
            acc.plus_minus = Some(acc.plus_minus.unwrap_or(0) + pm);
        }
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a BoxScore>) -> Self {
        let mut totals = Totals::default();
        for line in lines {
            totals.add(line);
        }
        totals
    }

    /// Per-game average of a counting stat
    pub fn per_game(&self, value: i32) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        value as f64 / self.games as f64
    }

    pub fn points_per_game(&self) -> f64 {
        self.per_game(self.box_score.points)
    }

    pub fn rebounds_per_game(&self) -> f64 {
        self.per_game(self.box_score.rebounds)
    }

    pub fn assists_per_game(&self) -> f64 {
        self.per_game(self.box_score.assists)
    }

    pub fn minutes_per_game(&self) -> f64 {
        match (self.box_score.minutes_played, self.games_with_minutes) {
            (Some(m), n) if n > 0 => m / n as f64,
            _ => 0.0,
        }
    }

    /// EFF per game: PTS + REB + AST + STL + BLK - missed FG - missed FT - TOV
    pub fn efficiency(&self) -> f64 {
        let b = &self.box_score;
        let missed_fg = b.field_goals_attempted - b.field_goals_made;
        let missed_ft = b.free_throws_attempted - b.free_throws_made;
        let raw = b.points + b.rebounds + b.assists + b.steals + b.blocks
            - missed_fg
            - missed_ft
            - b.turnovers;
        self.per_game(raw)
    }

    /// TS% = PTS / (2 * (FGA + 0.44 * FTA))
    pub fn true_shooting(&self) -> Option<f64> {
        let b = &self.box_score;
        let tsa = b.field_goals_attempted as f64 + 0.44 * b.free_throws_attempted as f64;
        ratio(b.points as f64, 2.0 * tsa)
    }

    /// eFG% = (FGM + 0.5 * 3PM) / FGA
    pub fn effective_fg(&self) -> Option<f64> {
        let b = &self.box_score;
        ratio(
            b.field_goals_made as f64 + 0.5 * b.three_pointers_made as f64,
            b.field_goals_attempted as f64,
        )
    }

    pub fn assist_to_turnover(&self) -> Option<f64> {
        ratio(
            self.box_score.assists as f64,
            self.box_score.turnovers as f64,
        )
    }

    pub fn points_per_shot(&self) -> Option<f64> {
        ratio(
            self.box_score.points as f64,
            self.box_score.field_goals_attempted as f64,
        )
    }
}

/// A player's identity plus their totals over a set of stat lines
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTotals {
    pub player_id: i64,
    pub player_name: String,
    pub position: Option<Position>,
    /// Team on the most recent line
    pub team_id: Option<i64>,
    pub totals: Totals,
}

/// Group stat lines by player, ordered by player id
pub fn group_by_player(lines: &[StatLine]) -> Vec<PlayerTotals> {
    let mut by_player: BTreeMap<i64, PlayerTotals> = BTreeMap::new();
    for line in lines {
        let entry = by_player
            .entry(line.player_id)
            .or_insert_with(|| PlayerTotals {
                player_id: line.player_id,
                player_name: line.player_name.clone(),
                position: line.position,
                team_id: line.team_id,
                totals: Totals::default(),
            });
        if line.team_id.is_some() {
            entry.team_id = line.team_id;
        }
        entry.totals.add(&line.line);
    }
    by_player.into_values().collect()
}

/// Season aggregates for one player; None without any stat lines
pub fn player_analytics(player: &Player, lines: &[BoxScore]) -> Option<PlayerAnalytics> {
    if lines.is_empty() {
        return None;
    }
    let totals = Totals::from_lines(lines);
    let b = &totals.box_score;
    Some(PlayerAnalytics {
        player_id: player.id,
        player_name: player.name.clone(),
        games_played: totals.games as i64,
        avg_points: totals.points_per_game(),
        avg_rebounds: totals.rebounds_per_game(),
        avg_assists: totals.assists_per_game(),
        avg_minutes: totals.minutes_per_game(),
        field_goal_percentage: b.field_goal_percentage().unwrap_or(0.0),
        three_point_percentage: b.three_point_percentage().unwrap_or(0.0),
        free_throw_percentage: b.free_throw_percentage().unwrap_or(0.0),
        efficiency_rating: Some(totals.efficiency()),
    })
}

/// Record and scoring averages over completed games, plus rebounds and
/// assists from the team's stat lines in those games.
///
/// None when the team has no completed games.
pub fn team_analytics(team: &Team, games: &[Game], lines: &[StatLine]) -> Option<TeamAnalytics> {
    let results: Vec<_> = games.iter().filter_map(|g| g.result_for(team.id)).collect();
    if results.is_empty() {
        return None;
    }
    let n = results.len() as f64;
    let wins = results.iter().filter(|r| r.won()).count() as i64;
    let points_for: i64 = results.iter().map(|r| r.points_for as i64).sum();
    let points_against: i64 = results.iter().map(|r| r.points_against as i64).sum();

    let (mut rebounds, mut assists) = (0i64, 0i64);
    for line in lines {
        if line.team_id == Some(team.id) && results.iter().any(|r| r.game_id == line.game_id) {
            rebounds += line.line.rebounds as i64;
            assists += line.line.assists as i64;
        }
    }

    Some(TeamAnalytics {
        team_id: team.id,
        team_name: team.full_name(),
        games_played: results.len() as i64,
        wins,
        losses: results.len() as i64 - wins,
        win_percentage: wins as f64 / n,
        avg_points_scored: points_for as f64 / n,
        avg_points_allowed: points_against as f64 / n,
        avg_rebounds: rebounds as f64 / n,
        avg_assists: assists as f64 / n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Conference, GameStatus};
    use chrono::{TimeZone, Utc};

    fn line(points: i32, fgm: i32, fga: i32, tpm: i32, ftm: i32, fta: i32) -> BoxScore {
        BoxScore {
            minutes_played: Some(30.0),
            points,
            rebounds: 5,
            assists: 4,
            steals: 1,
            blocks: 1,
            turnovers: 2,
            field_goals_made: fgm,
            field_goals_attempted: fga,
            three_pointers_made: tpm,
            three_pointers_attempted: tpm * 2,
            free_throws_made: ftm,
            free_throws_attempted: fta,
            ..Default::default()
        }
    }

    fn team(id: i64) -> Team {
        Team {
            id,
            external_id: None,
            name: "Celtics".into(),
            city: "Boston".into(),
            abbreviation: "BOS".into(),
            conference: Some(Conference::Eastern),
            division: None,
            founded_year: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn game(id: i64, home: i64, away: i64, hs: i32, aws: i32) -> Game {
        Game {
            id,
            external_id: None,
            season: "2023-24".into(),
            game_date: Utc.with_ymd_and_hms(2024, 1, id as u32, 0, 0, 0).unwrap(),
            home_team_id: home,
            away_team_id: away,
            home_score: Some(hs),
            away_score: Some(aws),
            status: GameStatus::Completed,
            quarter: None,
            time_remaining: None,
            game_type: "regular".into(),
            created_at: Utc::now(),
            updated_at: None,
            home_team: None,
            away_team: None,
        }
    }

    #[test]
    fn test_efficiency_and_shooting() {
        // 20 pts on 8/15 FG (2 threes), 2/4 FT
        let totals = Totals::from_lines(&[line(20, 8, 15, 2, 2, 4)]);
        // 20 + 5 + 4 + 1 + 1 - 7 - 2 - 2 = 20
        assert!((totals.efficiency() - 20.0).abs() < 1e-9);
        let ts = totals.true_shooting().unwrap();
        assert!((ts - 20.0 / (2.0 * (15.0 + 1.76))).abs() < 1e-9);
        assert!((totals.effective_fg().unwrap() - 9.0 / 15.0).abs() < 1e-9);
        assert_eq!(totals.assist_to_turnover(), Some(2.0));
    }

    #[test]
    fn test_empty_attempts_have_no_percentages() {
        let totals = Totals::from_lines(&[line(0, 0, 0, 0, 0, 0)]);
        assert!(totals.true_shooting().is_none());
        assert!(totals.effective_fg().is_none());
        assert!(totals.points_per_shot().is_none());
    }

    #[test]
    fn test_minutes_average_skips_missing() {
        let mut no_minutes = line(10, 4, 8, 0, 2, 2);
        no_minutes.minutes_played = None;
        let totals = Totals::from_lines(&[line(10, 4, 8, 0, 2, 2), no_minutes]);
        assert_eq!(totals.games, 2);
        assert!((totals.minutes_per_game() - 30.0).abs() < 1e-9);
        assert!((totals.points_per_game() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_team_analytics_record() {
        let games = vec![game(1, 1, 2, 110, 100), game(2, 3, 1, 105, 99), game(3, 2, 3, 90, 80)];
        let ta = team_analytics(&team(1), &games, &[]).unwrap();
        assert_eq!(ta.games_played, 2);
        assert_eq!(ta.wins, 1);
        assert_eq!(ta.losses, 1);
        assert!((ta.win_percentage - 0.5).abs() < 1e-9);
        assert!((ta.avg_points_scored - 104.5).abs() < 1e-9);
        assert!((ta.avg_points_allowed - 102.5).abs() < 1e-9);

        assert!(team_analytics(&team(9), &games, &[]).is_none());
    }
}
