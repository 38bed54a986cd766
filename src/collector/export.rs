//! Sample data export from TheSportsDB
//!
//! Pulls the NBA team directory plus a fixed list of well-known players and
//! writes them as CSV files with a plain-text summary next to them.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::adapters::sportsdb::{SportsDbClient, SportsDbPlayer, SportsDbTeam};
use crate::error::Result;

pub const TEAMS_FILE: &str = "sample_nba_teams.csv";
pub const PLAYERS_FILE: &str = "sample_nba_players.csv";
pub const SUMMARY_FILE: &str = "sample_data_summary.txt";

/// Fields in `TeamRow` and `PlayerRow`
pub const TEAM_COLUMNS: usize = 19;
pub const PLAYER_COLUMNS: usize = 21;

const DESCRIPTION_CHARS: usize = 200;

/// Team search by name returns soccer clubs, so players are looked up one by one
pub const KNOWN_PLAYERS: [&str; 20] = [
    "LeBron James",
    "Stephen Curry",
    "Kevin Durant",
    "Giannis Antetokounmpo",
    "Jayson Tatum",
    "Luka Doncic",
    "Nikola Jokic",
    "Joel Embiid",
    "Jimmy Butler",
    "Kawhi Leonard",
    "Damian Lillard",
    "Anthony Davis",
    "Ja Morant",
    "Trae Young",
    "Devin Booker",
    "Donovan Mitchell",
    "Zion Williamson",
    "Paolo Banchero",
    "Victor Wembanyama",
    "Scottie Barnes",
];

/// One CSV row per team; field order is the column order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamRow {
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    pub team_short: Option<String>,
    pub alternate_name: Option<String>,
    pub founded: Option<String>,
    pub stadium: Option<String>,
    pub stadium_capacity: Option<String>,
    pub stadium_location: Option<String>,
    pub league: Option<String>,
    pub division: Option<String>,
    pub manager: Option<String>,
    pub website: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub description: String,
    pub jersey_colors: String,
    pub logo_url: Option<String>,
    pub badge_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerRow {
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub team: Option<String>,
    pub sport: Option<String>,
    pub position: Option<String>,
    pub nationality: Option<String>,
    pub birth_date: Option<String>,
    pub birth_location: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub jersey_number: Option<String>,
    pub signing_date: Option<String>,
    pub wage: Option<String>,
    pub description: String,
    pub thumb_url: Option<String>,
    pub cutout_url: Option<String>,
    pub fanart_url: Option<String>,
    pub website: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
}

/// First 200 characters followed by `...`; empty when there is no text
pub fn short_description(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => {
            let mut out: String = t.chars().take(DESCRIPTION_CHARS).collect();
            out.push_str("...");
            out
        }
        _ => String::new(),
    }
}

/// `primary / secondary / tertiary` with missing colours trimmed off the ends
pub fn jersey_colors(team: &SportsDbTeam) -> String {
    let part = |c: &Option<String>| c.clone().unwrap_or_default();
    format!(
        "{} / {} / {}",
        part(&team.str_colour1),
        part(&team.str_colour2),
        part(&team.str_colour3)
    )
    .trim_matches(|c| c == ' ' || c == '/')
    .to_string()
}

impl From<&SportsDbTeam> for TeamRow {
    fn from(t: &SportsDbTeam) -> Self {
        Self {
            team_id: t.id_team.clone(),
            team_name: t.str_team.clone(),
            team_short: t.str_team_short.clone(),
            alternate_name: t.str_alternate.clone(),
            founded: t.int_formed_year.clone(),
            stadium: t.str_stadium.clone(),
            stadium_capacity: t.int_stadium_capacity.clone(),
            stadium_location: t.str_stadium_location.clone(),
            league: t.str_league.clone(),
            division: t.str_division.clone(),
            manager: t.str_manager.clone(),
            website: t.str_website.clone(),
            facebook: t.str_facebook.clone(),
            twitter: t.str_twitter.clone(),
            instagram: t.str_instagram.clone(),
            description: short_description(t.str_description_en.as_deref()),
            jersey_colors: jersey_colors(t),
            logo_url: t.str_team_logo.clone(),
            badge_url: t.str_team_badge.clone(),
        }
    }
}

impl From<&SportsDbPlayer> for PlayerRow {
    fn from(p: &SportsDbPlayer) -> Self {
        Self {
            player_id: p.id_player.clone(),
            player_name: p.str_player.clone(),
            team: p.str_team.clone(),
            sport: p.str_sport.clone(),
            position: p.str_position.clone(),
            nationality: p.str_nationality.clone(),
            birth_date: p.date_born.clone(),
            birth_location: p.str_birth_location.clone(),
            height: p.str_height.clone(),
            weight: p.str_weight.clone(),
            jersey_number: p.str_number.clone(),
            signing_date: p.date_signed.clone(),
            wage: p.str_wage.clone(),
            description: short_description(p.str_description_en.as_deref()),
            thumb_url: p.str_thumb.clone(),
            cutout_url: p.str_cutout.clone(),
            fanart_url: p.str_fanart1.clone(),
            website: p.str_website.clone(),
            facebook: p.str_facebook.clone(),
            twitter: p.str_twitter.clone(),
            instagram: p.str_instagram.clone(),
        }
    }
}

/// Serialize rows with a header line; returns the number of rows written
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Write `rows` to `path`; empty inputs produce no file
pub fn export_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<Option<PathBuf>> {
    if rows.is_empty() {
        warn!("No rows for {}, skipping", path.display());
        return Ok(None);
    }
    let written = write_rows(File::create(path)?, rows)?;
    info!("Exported {} rows to {}", written, path.display());
    Ok(Some(path.to_path_buf()))
}

/// The first basketball result that has not been collected already
pub fn pick_basketball_player(
    results: Vec<SportsDbPlayer>,
    seen: &mut HashSet<String>,
) -> Option<SportsDbPlayer> {
    let player = results.into_iter().find(|p| {
        p.is_basketball() && p.id_player.as_ref().map_or(true, |id| !seen.contains(id))
    })?;
    if let Some(id) = &player.id_player {
        seen.insert(id.clone());
    }
    Some(player)
}

pub async fn fetch_teams(client: &SportsDbClient) -> Vec<SportsDbTeam> {
    match client.search_all_teams("NBA").await {
        Ok(teams) => {
            info!("Fetched {} NBA teams", teams.len());
            teams
        }
        Err(e) => {
            warn!("Failed to fetch NBA teams: {}", e);
            Vec::new()
        }
    }
}

/// Sequential name searches with a fixed pause between requests
pub async fn fetch_players(
    client: &SportsDbClient,
    names: &[&str],
    delay: Duration,
) -> Vec<SportsDbPlayer> {
    let mut seen = HashSet::new();
    let mut players = Vec::new();

    for (i, name) in names.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match client.search_players(name).await {
            Ok(results) => match pick_basketball_player(results, &mut seen) {
                Some(p) => {
                    info!(
                        "Found {} ({})",
                        p.str_player.as_deref().unwrap_or(name),
                        p.str_team.as_deref().unwrap_or("no team")
                    );
                    players.push(p);
                }
                None => warn!("No basketball player found for '{}'", name),
            },
            Err(e) => warn!("Search for '{}' failed: {}", name, e),
        }
    }

    info!("Collected {} unique players", players.len());
    players
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Counts reported in `sample_data_summary.txt`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub total_teams: usize,
    pub teams_with_stadiums: usize,
    pub teams_with_descriptions: usize,
    pub sample_teams: Vec<String>,
    pub total_players: usize,
    pub players_with_positions: usize,
    pub players_with_birth_dates: usize,
    pub distinct_teams: usize,
    /// Most common positions, highest count first
    pub top_positions: Vec<(String, usize)>,
}

impl ExportSummary {
    pub fn from_rows(teams: &[TeamRow], players: &[PlayerRow]) -> Self {
        let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
        for p in players {
            if let Some(pos) = p.position.as_deref().filter(|s| !s.trim().is_empty()) {
                *positions.entry(pos).or_default() += 1;
            }
        }
        let mut top_positions: Vec<(String, usize)> = positions
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        // BTreeMap order makes the name tiebreak stable
        top_positions.sort_by(|a, b| b.1.cmp(&a.1));
        top_positions.truncate(5);

        let distinct_teams: HashSet<&str> =
            players.iter().filter_map(|p| p.team.as_deref()).collect();

        Self {
            total_teams: teams.len(),
            teams_with_stadiums: teams.iter().filter(|t| present(&t.stadium)).count(),
            teams_with_descriptions: teams
                .iter()
                .filter(|t| t.description.chars().count() > 10)
                .count(),
            sample_teams: teams
                .iter()
                .filter_map(|t| t.team_name.clone())
                .take(5)
                .collect(),
            total_players: players.len(),
            players_with_positions: players.iter().filter(|p| present(&p.position)).count(),
            players_with_birth_dates: players.iter().filter(|p| present(&p.birth_date)).count(),
            distinct_teams: distinct_teams.len(),
            top_positions,
        }
    }

    pub fn render(&self, exported_at: DateTime<Local>) -> String {
        let rule = "=".repeat(50);
        let sub = "-".repeat(20);
        let positions = self
            .top_positions
            .iter()
            .map(|(p, n)| format!("{}: {}", p, n))
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::new();
        out.push_str("NBA Sample Data Export Summary\n");
        out.push_str(&format!("{}\n\n", rule));
        out.push_str(&format!(
            "Export Date: {}\n",
            exported_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str("Data Source: TheSportsDB API\n\n");

        out.push_str(&format!("TEAMS DATA:\n{}\n", sub));
        out.push_str(&format!("Total Teams: {}\n", self.total_teams));
        out.push_str(&format!("Columns: {}\n", TEAM_COLUMNS));
        out.push_str(&format!("Teams with Stadiums: {}\n", self.teams_with_stadiums));
        out.push_str(&format!(
            "Teams with Descriptions: {}\n",
            self.teams_with_descriptions
        ));
        out.push_str(&format!("Sample Teams: {}\n\n", self.sample_teams.join(", ")));

        out.push_str(&format!("PLAYERS DATA:\n{}\n", sub));
        out.push_str(&format!("Total Players: {}\n", self.total_players));
        out.push_str(&format!("Columns: {}\n", PLAYER_COLUMNS));
        out.push_str(&format!(
            "Players with Positions: {}\n",
            self.players_with_positions
        ));
        out.push_str(&format!(
            "Players with Birth Dates: {}\n",
            self.players_with_birth_dates
        ));
        out.push_str(&format!(
            "Different Teams Represented: {}\n",
            self.distinct_teams
        ));
        out.push_str(&format!("Top Positions: {}\n\n", positions));

        out.push_str(&format!("FILES CREATED:\n{}\n", sub));
        for file in [TEAMS_FILE, PLAYERS_FILE, SUMMARY_FILE] {
            out.push_str(&format!("- {}\n", file));
        }

        out.push_str(&format!("\nUSAGE:\n{}\n", sub));
        for line in [
            "These files are for local review and analysis",
            "CSV files can be opened in Excel, Google Sheets, or any data tool",
            "Use this data to understand the structure and quality of TheSportsDB",
            "Files are git-ignored for privacy and repository size management",
        ] {
            out.push_str(&format!("- {}\n", line));
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub teams_file: Option<PathBuf>,
    pub players_file: Option<PathBuf>,
    pub summary_file: PathBuf,
    pub summary: ExportSummary,
}

/// Write already-fetched data into `out_dir`
pub fn write_export(
    out_dir: &Path,
    teams: &[SportsDbTeam],
    players: &[SportsDbPlayer],
) -> Result<ExportReport> {
    std::fs::create_dir_all(out_dir)?;
    let team_rows: Vec<TeamRow> = teams.iter().map(TeamRow::from).collect();
    let player_rows: Vec<PlayerRow> = players.iter().map(PlayerRow::from).collect();

    let teams_file = export_csv(&out_dir.join(TEAMS_FILE), &team_rows)?;
    let players_file = export_csv(&out_dir.join(PLAYERS_FILE), &player_rows)?;

    let summary = ExportSummary::from_rows(&team_rows, &player_rows);
    let summary_file = out_dir.join(SUMMARY_FILE);
    std::fs::write(&summary_file, summary.render(Local::now()))?;
    info!("Summary written to {}", summary_file.display());

    Ok(ExportReport {
        teams_file,
        players_file,
        summary_file,
        summary,
    })
}

/// Fetch teams and the known players, then write everything to `out_dir`
pub async fn run_export(
    client: &SportsDbClient,
    out_dir: &Path,
    delay: Duration,
) -> Result<ExportReport> {
    let teams = fetch_teams(client).await;
    let players = fetch_players(client, &KNOWN_PLAYERS, delay).await;
    write_export(out_dir, &teams, &players)
}
