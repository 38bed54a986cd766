//! Connectivity probe for the upstream data APIs
//!
//! Runs a handful of read-only calls one after another and reports which
//! worked. A failed probe is recorded and the run moves on.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::adapters::balldontlie::BallDontLieClient;
use crate::adapters::sportsdb::{SportsDbClient, SportsDbTeam};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub name: String,
    pub ok: bool,
    /// Short description of what came back, or the error
    pub detail: String,
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.ok { "OK  " } else { "FAIL" };
        write!(f, "[{}] {}: {}", mark, self.name, self.detail)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProbeReport {
    pub results: Vec<ProbeResult>,
}

impl ProbeReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    async fn run<F, Fut>(&mut self, name: &str, probe: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let result = match probe().await {
            Ok(detail) => {
                info!("Probe {} succeeded: {}", name, detail);
                ProbeResult {
                    name: name.to_string(),
                    ok: true,
                    detail,
                }
            }
            Err(e) => {
                warn!("Probe {} failed: {}", name, e);
                ProbeResult {
                    name: name.to_string(),
                    ok: false,
                    detail: e.to_string(),
                }
            }
        };
        self.results.push(result);
    }
}

/// Team fields worth knowing about before relying on TheSportsDB
pub fn available_team_fields(team: &SportsDbTeam) -> Vec<&'static str> {
    [
        ("strTeam", &team.str_team),
        ("strLeague", &team.str_league),
        ("strStadium", &team.str_stadium),
        ("strWebsite", &team.str_website),
        ("strDescriptionEN", &team.str_description_en),
    ]
    .into_iter()
    .filter(|(_, v)| v.as_deref().is_some_and(|s| !s.is_empty()))
    .map(|(name, _)| name)
    .collect()
}

pub async fn run_probe(
    balldontlie: &BallDontLieClient,
    sportsdb: &SportsDbClient,
    delay: Duration,
) -> ProbeReport {
    let mut report = ProbeReport::default();
    if !balldontlie.has_api_key() {
        warn!("No balldontlie API key configured; expect 401 responses");
    }

    report
        .run("balldontlie teams", || async move {
            let teams = balldontlie.teams().await?;
            let sample: Vec<String> = teams
                .iter()
                .take(5)
                .map(|t| format!("{} ({})", t.full_name, t.abbreviation))
                .collect();
            Ok(format!("{} teams, e.g. {}", teams.len(), sample.join(", ")))
        })
        .await;
    tokio::time::sleep(delay).await;

    report
        .run("balldontlie players", || async move {
            let players = balldontlie.players(10, None).await?;
            let names: Vec<String> = players
                .iter()
                .map(|p| format!("{} ({})", p.full_name(), p.team_name()))
                .collect();
            Ok(format!("{} players: {}", players.len(), names.join(", ")))
        })
        .await;
    tokio::time::sleep(delay).await;

    report
        .run("balldontlie search", || async move {
            let found = balldontlie.players(10, Some("lebron")).await?;
            Ok(match found.first() {
                Some(p) => format!(
                    "{} / {} / {}",
                    p.full_name(),
                    p.team_name(),
                    p.position.as_deref().filter(|s| !s.is_empty()).unwrap_or("N/A")
                ),
                None => "no match for 'lebron'".to_string(),
            })
        })
        .await;
    tokio::time::sleep(delay).await;

    report
        .run("thesportsdb teams", || async move {
            let teams = sportsdb.search_all_teams("NBA").await?;
            let fields = teams.first().map(available_team_fields).unwrap_or_default();
            Ok(format!(
                "{} NBA teams, fields available: {}",
                teams.len(),
                if fields.is_empty() {
                    "none".to_string()
                } else {
                    fields.join(", ")
                }
            ))
        })
        .await;

    report
}
