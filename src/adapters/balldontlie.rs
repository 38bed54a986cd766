//! balldontlie client
//!
//! Teams and player directory. Since the v1 relaunch the API wants a free
//! key in the `Authorization` header; without one most calls return 401.

use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{NbaError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct BdlTeam {
    pub id: i64,
    pub abbreviation: String,
    pub full_name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BdlPlayer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub team: Option<BdlTeam>,
}

impl BdlPlayer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn team_name(&self) -> &str {
        self.team
            .as_ref()
            .map(|t| t.full_name.as_str())
            .unwrap_or("Free Agent")
    }
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

pub struct BallDontLieClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl BallDontLieClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn teams(&self) -> Result<Vec<BdlTeam>> {
        let teams: Vec<BdlTeam> = self.get("teams", &[]).await?;
        debug!("balldontlie: fetched {} teams", teams.len());
        Ok(teams)
    }

    /// First page of players, optionally filtered by a name search
    pub async fn players(&self, per_page: u32, search: Option<&str>) -> Result<Vec<BdlPlayer>> {
        let mut query = vec![("per_page", per_page.to_string())];
        if let Some(s) = search {
            query.push(("search", s.to_string()));
        }
        let players: Vec<BdlPlayer> = self.get("players", &query).await?;
        debug!("balldontlie: fetched {} players", players.len());
        Ok(players)
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/{}", self.base_url, path);
        let mut req = self.http.get(&url).query(query);
        if let Some(key) = &self.api_key {
            req = req.header(reqwest::header::AUTHORIZATION, key.as_str());
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(NbaError::Upstream(format!(
                "balldontlie {} returned HTTP {}",
                path, status
            )));
        }
        let body = resp.text().await?;
        Self::parse_data(&body)
    }

    fn parse_data<T>(body: &str) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let envelope: DataEnvelope<T> = serde_json::from_str(body)?;
        Ok(envelope.data)
    }
}
