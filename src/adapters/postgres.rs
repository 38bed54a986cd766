use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow, Postgres};
use sqlx::{QueryBuilder, Row};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::domain::{
    BoxScore, Conference, Game, GameCreate, GameFilter, GameStatus, Player, PlayerCreate,
    PlayerFilter, PlayerSearch, PlayerStats, PlayerStatsCreate, Position, StatLine,
    StatLineFilter, Team, TeamCreate, TeamFilter,
};
use crate::error::{NbaError, Result};
use crate::persistence::NbaRepository;

const TEAM_COLUMNS: &str = "id, external_id, name, city, abbreviation, conference, division, \
     founded_year, is_active, created_at, updated_at";

const PLAYER_COLUMNS: &str = "id, external_id, name, first_name, last_name, position, height, \
     weight, birth_date, birth_place, jersey_number, years_pro, college, team_id, is_active, \
     is_rookie, created_at, updated_at";

const GAME_COLUMNS: &str = "id, external_id, season, game_date, home_team_id, away_team_id, \
     home_score, away_score, status, quarter, time_remaining, game_type, created_at, updated_at";

const STATS_COLUMNS: &str = "ps.id, ps.player_id, ps.game_id, ps.team_id, ps.minutes_played, \
     ps.points, ps.rebounds, ps.assists, ps.steals, ps.blocks, ps.turnovers, ps.fouls, \
     ps.field_goals_made, ps.field_goals_attempted, ps.three_pointers_made, \
     ps.three_pointers_attempted, ps.free_throws_made, ps.free_throws_attempted, \
     ps.plus_minus, ps.created_at";

/// PostgreSQL storage adapter
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    echo: bool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool, echo: false })
    }

    /// Log every statement at INFO
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    fn trace_sql(&self, sql: &str) {
        if self.echo {
            info!(target: "nba_analytics::sql", "{}", sql);
        } else {
            debug!(target: "nba_analytics::sql", "{}", sql);
        }
    }

    async fn attach_teams(&self, players: &mut [Player]) -> Result<()> {
        let ids: Vec<i64> = players.iter().filter_map(|p| p.team_id).collect();
        let teams = self.teams_by_ids(&ids).await?;
        for player in players.iter_mut() {
            player.team = player.team_id.and_then(|id| teams.get(&id).cloned());
        }
        Ok(())
    }

    async fn attach_game_teams(&self, games: &mut [Game]) -> Result<()> {
        let ids: Vec<i64> = games
            .iter()
            .flat_map(|g| [g.home_team_id, g.away_team_id])
            .collect();
        let teams = self.teams_by_ids(&ids).await?;
        for game in games.iter_mut() {
            game.home_team = teams.get(&game.home_team_id).cloned();
            game.away_team = teams.get(&game.away_team_id).cloned();
        }
        Ok(())
    }

    async fn teams_by_ids(&self, ids: &[i64]) -> Result<HashMap<i64, Team>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = format!("SELECT {} FROM teams WHERE id = ANY($1)", TEAM_COLUMNS);
        self.trace_sql(&sql);
        let rows = sqlx::query(&sql).bind(ids).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(team_from_row)
            .map(|t| (t.id, t))
            .collect())
    }

    async fn fetch_team(&self, column: &str, value: &str) -> Result<Option<Team>> {
        let sql = format!("SELECT {} FROM teams WHERE {} = $1", TEAM_COLUMNS, column);
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(team_from_row))
    }
}

/// Map constraint violations to caller errors; everything else stays a database error
fn map_write_error(err: sqlx::Error, what: &str) -> NbaError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return NbaError::Conflict(format!("{} already exists", what));
        }
        if db.is_foreign_key_violation() {
            return NbaError::Validation(format!("{} references a missing record", what));
        }
        if db.is_check_violation() {
            return NbaError::Validation(format!("{} violates a field constraint", what));
        }
    }
    NbaError::Database(err)
}

fn team_from_row(r: &PgRow) -> Team {
    Team {
        id: r.get("id"),
        external_id: r.get("external_id"),
        name: r.get("name"),
        city: r.get("city"),
        abbreviation: r.get("abbreviation"),
        conference: r
            .get::<Option<String>, _>("conference")
            .and_then(|s| Conference::try_from(s.as_str()).ok()),
        division: r.get("division"),
        founded_year: r.get("founded_year"),
        is_active: r.get("is_active"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn player_from_row(r: &PgRow) -> Player {
    Player {
        id: r.get("id"),
        external_id: r.get("external_id"),
        name: r.get("name"),
        first_name: r.get("first_name"),
        last_name: r.get("last_name"),
        position: r
            .get::<Option<String>, _>("position")
            .and_then(|s| Position::try_from(s.as_str()).ok()),
        height: r.get("height"),
        weight: r.get("weight"),
        birth_date: r.get("birth_date"),
        birth_place: r.get("birth_place"),
        jersey_number: r.get("jersey_number"),
        years_pro: r.get("years_pro"),
        college: r.get("college"),
        team_id: r.get("team_id"),
        is_active: r.get("is_active"),
        is_rookie: r.get("is_rookie"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        team: None,
    }
}

fn game_from_row(r: &PgRow) -> Game {
    Game {
        id: r.get("id"),
        external_id: r.get("external_id"),
        season: r.get("season"),
        game_date: r.get("game_date"),
        home_team_id: r.get("home_team_id"),
        away_team_id: r.get("away_team_id"),
        home_score: r.get("home_score"),
        away_score: r.get("away_score"),
        status: GameStatus::try_from(r.get::<String, _>("status").as_str()).unwrap_or_default(),
        quarter: r.get("quarter"),
        time_remaining: r.get("time_remaining"),
        game_type: r.get("game_type"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
        home_team: None,
        away_team: None,
    }
}

fn box_score_from_row(r: &PgRow) -> BoxScore {
    BoxScore {
        minutes_played: r.get("minutes_played"),
        points: r.get("points"),
        rebounds: r.get("rebounds"),
        assists: r.get("assists"),
        steals: r.get("steals"),
        blocks: r.get("blocks"),
        turnovers: r.get("turnovers"),
        fouls: r.get("fouls"),
        field_goals_made: r.get("field_goals_made"),
        field_goals_attempted: r.get("field_goals_attempted"),
        three_pointers_made: r.get("three_pointers_made"),
        three_pointers_attempted: r.get("three_pointers_attempted"),
        free_throws_made: r.get("free_throws_made"),
        free_throws_attempted: r.get("free_throws_attempted"),
        plus_minus: r.get("plus_minus"),
    }
}

fn stats_from_row(r: &PgRow) -> PlayerStats {
    PlayerStats::new(
        r.get("id"),
        r.get("player_id"),
        r.get("game_id"),
        r.get("team_id"),
        box_score_from_row(r),
        r.get("created_at"),
    )
}

/// `%term%` for ILIKE, with the wildcard characters in `term` matched literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_stat_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &StatLineFilter) {
    if let Some(player_id) = filter.player_id {
        qb.push(" AND ps.player_id = ").push_bind(player_id);
    }
    if let Some(team_id) = filter.team_id {
        qb.push(" AND ps.team_id = ").push_bind(team_id);
    }
    if let Some(season) = &filter.season {
        qb.push(" AND g.season = ").push_bind(season.clone());
    }
}

#[async_trait]
impl NbaRepository for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== Teams ====================

    #[instrument(skip(self))]
    async fn list_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM teams WHERE 1=1",
            TEAM_COLUMNS
        ));
        if let Some(conference) = filter.conference {
            qb.push(" AND conference = ").push_bind(conference.as_str());
        }
        if let Some(active) = filter.is_active {
            qb.push(" AND is_active = ").push_bind(active);
        }
        qb.push(" ORDER BY name, id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        self.trace_sql(qb.sql());
        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(team_from_row).collect())
    }

    async fn get_team(&self, id: i64) -> Result<Option<Team>> {
        let sql = format!("SELECT {} FROM teams WHERE id = $1", TEAM_COLUMNS);
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(team_from_row))
    }

    async fn find_team_by_abbreviation(&self, abbreviation: &str) -> Result<Option<Team>> {
        self.fetch_team("abbreviation", &abbreviation.to_ascii_uppercase())
            .await
    }

    async fn find_team_by_external_id(&self, external_id: &str) -> Result<Option<Team>> {
        self.fetch_team("external_id", external_id).await
    }

    #[instrument(skip(self, team), fields(abbreviation = %team.abbreviation))]
    async fn insert_team(&self, team: &TeamCreate) -> Result<Team> {
        let sql = format!(
            r#"
            INSERT INTO teams (external_id, name, city, abbreviation, conference, division, founded_year)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            TEAM_COLUMNS
        );
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(&team.external_id)
            .bind(team.name.trim())
            .bind(team.city.trim())
            .bind(team.abbreviation.trim().to_ascii_uppercase())
            .bind(team.conference.map(|c| c.as_str()))
            .bind(&team.division)
            .bind(team.founded_year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Team"))?;

        Ok(team_from_row(&row))
    }

    #[instrument(skip(self, team), fields(team_id = team.id))]
    async fn save_team(&self, team: &Team) -> Result<Team> {
        let sql = format!(
            r#"
            UPDATE teams SET
                name = $2, city = $3, conference = $4, division = $5,
                is_active = $6, updated_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            TEAM_COLUMNS
        );
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(team.id)
            .bind(&team.name)
            .bind(&team.city)
            .bind(team.conference.map(|c| c.as_str()))
            .bind(&team.division)
            .bind(team.is_active)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Team"))?;

        row.as_ref()
            .map(team_from_row)
            .ok_or_else(|| NbaError::not_found("Team not found"))
    }

    // ==================== Players ====================

    #[instrument(skip(self))]
    async fn list_players(&self, filter: &PlayerFilter) -> Result<Vec<Player>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM players WHERE 1=1",
            PLAYER_COLUMNS
        ));
        if let Some(team_id) = filter.team_id {
            qb.push(" AND team_id = ").push_bind(team_id);
        }
        if let Some(position) = filter.position {
            qb.push(" AND position = ").push_bind(position.as_str());
        }
        if let Some(active) = filter.is_active {
            qb.push(" AND is_active = ").push_bind(active);
        }
        qb.push(" ORDER BY name, id LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        self.trace_sql(qb.sql());
        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut players: Vec<Player> = rows.iter().map(player_from_row).collect();
        self.attach_teams(&mut players).await?;
        Ok(players)
    }

    #[instrument(skip(self))]
    async fn search_players(&self, search: &PlayerSearch) -> Result<Vec<Player>> {
        let columns = PLAYER_COLUMNS
            .split(", ")
            .map(|c| format!("p.{}", c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM players p LEFT JOIN teams t ON t.id = p.team_id WHERE 1=1",
            columns
        ));
        if let Some(name) = search.name.as_deref().filter(|n| !n.trim().is_empty()) {
            qb.push(" AND p.name ILIKE ")
                .push_bind(contains_pattern(name))
                .push(" ESCAPE '\\'");
        }
        if let Some(team) = search.team_name.as_deref().filter(|n| !n.trim().is_empty()) {
            let pattern = contains_pattern(team);
            qb.push(" AND (t.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR t.city ILIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        qb.push(" ORDER BY p.name, p.id LIMIT ").push_bind(search.limit);

        self.trace_sql(qb.sql());
        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut players: Vec<Player> = rows.iter().map(player_from_row).collect();
        self.attach_teams(&mut players).await?;
        Ok(players)
    }

    async fn get_player(&self, id: i64) -> Result<Option<Player>> {
        let sql = format!("SELECT {} FROM players WHERE id = $1", PLAYER_COLUMNS);
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut players = vec![player_from_row(&row)];
        self.attach_teams(&mut players).await?;
        Ok(players.pop())
    }

    async fn find_player_by_external_id(&self, external_id: &str) -> Result<Option<Player>> {
        let sql = format!(
            "SELECT {} FROM players WHERE external_id = $1",
            PLAYER_COLUMNS
        );
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(player_from_row))
    }

    #[instrument(skip(self, player), fields(name = %player.name))]
    async fn insert_player(&self, player: &PlayerCreate) -> Result<Player> {
        let sql = format!(
            r#"
            INSERT INTO players (
                external_id, name, first_name, last_name, position, height, weight,
                birth_date, birth_place, jersey_number, years_pro, college, team_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            PLAYER_COLUMNS
        );
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(&player.external_id)
            .bind(player.name.trim())
            .bind(&player.first_name)
            .bind(&player.last_name)
            .bind(player.position.map(|p| p.as_str()))
            .bind(&player.height)
            .bind(&player.weight)
            .bind(player.birth_date)
            .bind(&player.birth_place)
            .bind(player.jersey_number)
            .bind(player.years_pro)
            .bind(&player.college)
            .bind(player.team_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Player"))?;

        let mut players = vec![player_from_row(&row)];
        self.attach_teams(&mut players).await?;
        players
            .pop()
            .ok_or_else(|| NbaError::Internal("insert returned no player".to_string()))
    }

    #[instrument(skip(self, player), fields(player_id = player.id))]
    async fn save_player(&self, player: &Player) -> Result<Player> {
        let sql = format!(
            r#"
            UPDATE players SET
                name = $2, position = $3, team_id = $4, jersey_number = $5,
                is_active = $6, is_rookie = $7, updated_at = $8
            WHERE id = $1
            RETURNING {}
            "#,
            PLAYER_COLUMNS
        );
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(player.id)
            .bind(&player.name)
            .bind(player.position.map(|p| p.as_str()))
            .bind(player.team_id)
            .bind(player.jersey_number)
            .bind(player.is_active)
            .bind(player.is_rookie)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Player"))?;

        let Some(row) = row else {
            return Err(NbaError::not_found("Player not found"));
        };
        let mut players = vec![player_from_row(&row)];
        self.attach_teams(&mut players).await?;
        players
            .pop()
            .ok_or_else(|| NbaError::Internal("update returned no player".to_string()))
    }

    // ==================== Games ====================

    #[instrument(skip(self))]
    async fn list_games(&self, filter: &GameFilter) -> Result<(Vec<Game>, i64)> {
        fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &GameFilter) {
            if let Some(season) = &filter.season {
                qb.push(" AND season = ").push_bind(season.clone());
            }
            if let Some(team_id) = filter.team_id {
                qb.push(" AND (home_team_id = ")
                    .push_bind(team_id)
                    .push(" OR away_team_id = ")
                    .push_bind(team_id)
                    .push(")");
            }
            if let Some(from) = filter.date_from {
                qb.push(" AND game_date >= ").push_bind(from);
            }
            if let Some(to) = filter.date_to {
                qb.push(" AND game_date <= ").push_bind(to);
            }
            if let Some(status) = filter.status {
                qb.push(" AND status = ").push_bind(status.as_str());
            }
        }

        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*)::BIGINT FROM games WHERE 1=1");
        push_filters(&mut count_qb, filter);
        self.trace_sql(count_qb.sql());
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM games WHERE 1=1",
            GAME_COLUMNS
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY game_date DESC, id DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        self.trace_sql(qb.sql());
        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut games: Vec<Game> = rows.iter().map(game_from_row).collect();
        self.attach_game_teams(&mut games).await?;
        Ok((games, total))
    }

    async fn get_game(&self, id: i64) -> Result<Option<Game>> {
        let sql = format!("SELECT {} FROM games WHERE id = $1", GAME_COLUMNS);
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut games = vec![game_from_row(&row)];
        self.attach_game_teams(&mut games).await?;
        Ok(games.pop())
    }

    #[instrument(skip(self, game), fields(season = %game.season))]
    async fn insert_game(&self, game: &GameCreate) -> Result<Game> {
        let sql = format!(
            r#"
            INSERT INTO games (
                external_id, season, game_date, home_team_id, away_team_id,
                home_score, away_score, status, quarter, time_remaining, game_type
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            GAME_COLUMNS
        );
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(&game.external_id)
            .bind(&game.season)
            .bind(game.game_date)
            .bind(game.home_team_id)
            .bind(game.away_team_id)
            .bind(game.home_score)
            .bind(game.away_score)
            .bind(game.status.as_str())
            .bind(game.quarter)
            .bind(&game.time_remaining)
            .bind(&game.game_type)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Game"))?;

        let mut games = vec![game_from_row(&row)];
        self.attach_game_teams(&mut games).await?;
        games
            .pop()
            .ok_or_else(|| NbaError::Internal("insert returned no game".to_string()))
    }

    #[instrument(skip(self, game), fields(game_id = game.id))]
    async fn save_game(&self, game: &Game) -> Result<Game> {
        let sql = format!(
            r#"
            UPDATE games SET
                home_score = $2, away_score = $3, status = $4, quarter = $5,
                time_remaining = $6, updated_at = $7
            WHERE id = $1
            RETURNING {}
            "#,
            GAME_COLUMNS
        );
        self.trace_sql(&sql);
        let row = sqlx::query(&sql)
            .bind(game.id)
            .bind(game.home_score)
            .bind(game.away_score)
            .bind(game.status.as_str())
            .bind(game.quarter)
            .bind(&game.time_remaining)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Game"))?;

        let Some(row) = row else {
            return Err(NbaError::not_found("Game not found"));
        };
        let mut games = vec![game_from_row(&row)];
        self.attach_game_teams(&mut games).await?;
        games
            .pop()
            .ok_or_else(|| NbaError::Internal("update returned no game".to_string()))
    }

    async fn completed_games(&self, season: Option<String>) -> Result<Vec<Game>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM games WHERE status = 'completed' \
             AND home_score IS NOT NULL AND away_score IS NOT NULL",
            GAME_COLUMNS
        ));
        if let Some(season) = season {
            qb.push(" AND season = ").push_bind(season);
        }
        qb.push(" ORDER BY game_date, id");

        self.trace_sql(qb.sql());
        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(game_from_row).collect())
    }

    // ==================== Player stats ====================

    #[instrument(skip(self, stats), fields(player_id = stats.player_id))]
    async fn insert_player_stats(
        &self,
        game_id: i64,
        team_id: Option<i64>,
        stats: &PlayerStatsCreate,
    ) -> Result<PlayerStats> {
        let l = &stats.line;
        let sql = r#"
            INSERT INTO player_stats (
                player_id, game_id, team_id, minutes_played, points, rebounds, assists,
                steals, blocks, turnovers, fouls, field_goals_made, field_goals_attempted,
                three_pointers_made, three_pointers_attempted, free_throws_made,
                free_throws_attempted, plus_minus
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING id, created_at
            "#;
        self.trace_sql(sql);
        let row = sqlx::query(sql)
            .bind(stats.player_id)
            .bind(game_id)
            .bind(team_id)
            .bind(l.minutes_played)
            .bind(l.points)
            .bind(l.rebounds)
            .bind(l.assists)
            .bind(l.steals)
            .bind(l.blocks)
            .bind(l.turnovers)
            .bind(l.fouls)
            .bind(l.field_goals_made)
            .bind(l.field_goals_attempted)
            .bind(l.three_pointers_made)
            .bind(l.three_pointers_attempted)
            .bind(l.free_throws_made)
            .bind(l.free_throws_attempted)
            .bind(l.plus_minus)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Stat line for this player and game"))?;

        Ok(PlayerStats::new(
            row.get("id"),
            stats.player_id,
            game_id,
            team_id,
            *l,
            row.get("created_at"),
        ))
    }

    #[instrument(skip(self))]
    async fn player_stats(&self, filter: &StatLineFilter) -> Result<Vec<PlayerStats>> {
        filter.validate()?;
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM player_stats ps JOIN games g ON g.id = ps.game_id WHERE 1=1",
            STATS_COLUMNS
        ));
        push_stat_filters(&mut qb, filter);
        qb.push(" ORDER BY g.game_date DESC, g.id DESC");
        if let Some(n) = filter.last_n_games {
            qb.push(" LIMIT ").push_bind(n);
        }

        self.trace_sql(qb.sql());
        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(stats_from_row).collect())
    }

    #[instrument(skip(self))]
    async fn stat_lines(&self, filter: &StatLineFilter) -> Result<Vec<StatLine>> {
        filter.validate()?;
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {}, p.name AS player_name, p.position, g.season, g.game_date \
             FROM player_stats ps \
             JOIN games g ON g.id = ps.game_id \
             JOIN players p ON p.id = ps.player_id \
             WHERE 1=1",
            STATS_COLUMNS
        ));
        push_stat_filters(&mut qb, filter);
        qb.push(" ORDER BY g.game_date, g.id, ps.player_id");

        self.trace_sql(qb.sql());
        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut lines: Vec<StatLine> = rows
            .iter()
            .map(|r| StatLine {
                player_id: r.get("player_id"),
                player_name: r.get("player_name"),
                position: r
                    .get::<Option<String>, _>("position")
                    .and_then(|s| Position::try_from(s.as_str()).ok()),
                team_id: r.get("team_id"),
                game_id: r.get("game_id"),
                season: r.get("season"),
                game_date: r.get("game_date"),
                line: box_score_from_row(r),
            })
            .collect();

        if let Some(n) = filter.last_n_games {
            let keep = n.max(0) as usize;
            if lines.len() > keep {
                lines.drain(..lines.len() - keep);
            }
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(" curry "), "%curry%");
        assert_eq!(contains_pattern("_"), "%\\_%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
