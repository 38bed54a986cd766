//! TheSportsDB client
//!
//! Team directory and player profile lookups from the free public tier
//! (`/api/v1/json/3`). No API key required.

use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::debug;

use crate::error::{NbaError, Result};

// ── Public types ────────────────────────────────────────────────

/// A team as returned by `search_all_teams.php`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsDbTeam {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id_team: Option<String>,
    #[serde(default)]
    pub str_team: Option<String>,
    #[serde(default)]
    pub str_team_short: Option<String>,
    #[serde(default)]
    pub str_alternate: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub int_formed_year: Option<String>,
    #[serde(default)]
    pub str_stadium: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub int_stadium_capacity: Option<String>,
    #[serde(default)]
    pub str_stadium_location: Option<String>,
    #[serde(default)]
    pub str_league: Option<String>,
    #[serde(default)]
    pub str_division: Option<String>,
    #[serde(default)]
    pub str_manager: Option<String>,
    #[serde(default)]
    pub str_website: Option<String>,
    #[serde(default)]
    pub str_facebook: Option<String>,
    #[serde(default)]
    pub str_twitter: Option<String>,
    #[serde(default)]
    pub str_instagram: Option<String>,
    #[serde(default, rename = "strDescriptionEN")]
    pub str_description_en: Option<String>,
    #[serde(default)]
    pub str_colour1: Option<String>,
    #[serde(default)]
    pub str_colour2: Option<String>,
    #[serde(default)]
    pub str_colour3: Option<String>,
    #[serde(default)]
    pub str_team_logo: Option<String>,
    #[serde(default)]
    pub str_team_badge: Option<String>,
}

/// A player profile as returned by `searchplayers.php`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportsDbPlayer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id_player: Option<String>,
    #[serde(default)]
    pub str_player: Option<String>,
    #[serde(default)]
    pub str_team: Option<String>,
    #[serde(default)]
    pub str_sport: Option<String>,
    #[serde(default)]
    pub str_position: Option<String>,
    #[serde(default)]
    pub str_nationality: Option<String>,
    #[serde(default)]
    pub date_born: Option<String>,
    #[serde(default)]
    pub str_birth_location: Option<String>,
    #[serde(default)]
    pub str_height: Option<String>,
    #[serde(default)]
    pub str_weight: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub str_number: Option<String>,
    #[serde(default)]
    pub date_signed: Option<String>,
    #[serde(default)]
    pub str_wage: Option<String>,
    #[serde(default, rename = "strDescriptionEN")]
    pub str_description_en: Option<String>,
    #[serde(default)]
    pub str_thumb: Option<String>,
    #[serde(default)]
    pub str_cutout: Option<String>,
    #[serde(default)]
    pub str_fanart1: Option<String>,
    #[serde(default)]
    pub str_website: Option<String>,
    #[serde(default)]
    pub str_facebook: Option<String>,
    #[serde(default)]
    pub str_twitter: Option<String>,
    #[serde(default)]
    pub str_instagram: Option<String>,
}

impl SportsDbPlayer {
    pub fn is_basketball(&self) -> bool {
        self.str_sport
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("basketball"))
    }
}

// ── Response envelopes ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Option<Vec<SportsDbTeam>>,
}

#[derive(Debug, Deserialize)]
struct PlayersResponse {
    #[serde(default)]
    player: Option<Vec<SportsDbPlayer>>,
}

/// Ids and years arrive as strings or numbers depending on the endpoint
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ── Client ──────────────────────────────────────────────────────

pub struct SportsDbClient {
    http: reqwest::Client,
    base_url: String,
}

impl SportsDbClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// All teams registered under a league name (e.g. `NBA`)
    pub async fn search_all_teams(&self, league: &str) -> Result<Vec<SportsDbTeam>> {
        let url = format!("{}/search_all_teams.php", self.base_url);
        let resp = self.http.get(&url).query(&[("l", league)]).send().await?;
        let body = Self::checked_body(resp).await?;
        let teams = Self::parse_teams(&body)?;
        debug!("TheSportsDB: fetched {} teams for {}", teams.len(), league);
        Ok(teams)
    }

    /// Player profiles whose name matches `name`, across every sport
    pub async fn search_players(&self, name: &str) -> Result<Vec<SportsDbPlayer>> {
        let url = format!("{}/searchplayers.php", self.base_url);
        let resp = self.http.get(&url).query(&[("p", name)]).send().await?;
        let body = Self::checked_body(resp).await?;
        let players = Self::parse_players(&body)?;
        debug!("TheSportsDB: {} results for '{}'", players.len(), name);
        Ok(players)
    }

    async fn checked_body(resp: reqwest::Response) -> Result<String> {
        let status = resp.status();
        if !status.is_success() {
            return Err(NbaError::Upstream(format!(
                "TheSportsDB returned HTTP {}",
                status
            )));
        }
        Ok(resp.text().await?)
    }

    fn parse_teams(body: &str) -> Result<Vec<SportsDbTeam>> {
        let data: TeamsResponse = serde_json::from_str(body)?;
        Ok(data.teams.unwrap_or_default())
    }

    fn parse_players(body: &str) -> Result<Vec<SportsDbPlayer>> {
        let data: PlayersResponse = serde_json::from_str(body)?;
        Ok(data.player.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_teams_json() {
        let json = r##"{
            "teams": [{
                "idTeam": "134860",
                "strTeam": "Boston Celtics",
                "strTeamShort": "BOS",
                "intFormedYear": "1946",
                "intStadiumCapacity": 19156,
                "strStadium": "TD Garden",
                "strDescriptionEN": "The Boston Celtics are an American professional basketball team.",
                "strColour1": "#008348",
                "strColour2": "#FFFFFF",
                "strColour3": ""
            }]
        }"##;

        let teams = SportsDbClient::parse_teams(json).unwrap();
        assert_eq!(teams.len(), 1);
        let t = &teams[0];
        assert_eq!(t.id_team.as_deref(), Some("134860"));
        assert_eq!(t.str_team_short.as_deref(), Some("BOS"));
        assert_eq!(t.int_formed_year.as_deref(), Some("1946"));
        assert_eq!(t.int_stadium_capacity.as_deref(), Some("19156"));
        assert!(t.str_description_en.is_some());
        assert!(t.str_manager.is_none());
    }

    #[test]
    fn test_null_results_are_empty() {
        assert!(SportsDbClient::parse_teams(r#"{"teams": null}"#)
            .unwrap()
            .is_empty());
        assert!(SportsDbClient::parse_players(r#"{"player": null}"#)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_players_json() {
        let json = r#"{
            "player": [
                {"idPlayer": "34145937", "strPlayer": "LeBron James", "strSport": "Basketball",
                 "strTeam": "Los Angeles Lakers", "strPosition": "Small Forward", "strNumber": 23},
                {"idPlayer": "1", "strPlayer": "Lebron Jamesson", "strSport": "Soccer"}
            ]
        }"#;

        let players = SportsDbClient::parse_players(json).unwrap();
        assert_eq!(players.len(), 2);
        assert!(players[0].is_basketball());
        assert_eq!(players[0].str_number.as_deref(), Some("23"));
        assert!(!players[1].is_basketball());
    }
}
