use std::path::Path;

use tracing::instrument;

use crate::api::backend::{Backend, LoginUser};
use crate::api::football;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::Result;
use crate::model::*;
use crate::session::{FileTokenStore, Session};
use crate::views::{self, FixturesView, LiveHandle, LivePoller, TeamsView};

/// The main entry point for loading Premier League statistics.
///
/// `PlClient` owns a [`reqwest::Client`] for the upstream football API and a
/// [`Backend`] for the backend-for-frontend service, and exposes one method
/// per page of the dashboard.
///
/// Methods with a `_with` suffix take a [`CancelToken`]; the plain variants
/// run to completion.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> pl_stats::Result<()> {
/// use pl_stats::{Config, FixtureFilter, PlClient};
///
/// let client = PlClient::from_config(Config::from_env()?)?;
/// let view = client.get_fixtures().await?;
/// for row in view.filtered(FixtureFilter::Upcoming) {
///     println!("{} {} v {}", row.when_local, row.home.name, row.away.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PlClient {
    http: reqwest::Client,
    config: Config,
    backend: Backend,
}

impl PlClient {
    /// Create a client with default settings and an in-memory session.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new(), Config::default(), Session::in_memory())
    }

    /// Create a client from `config`, persisting the session token to
    /// `config.token_file` when one is set.
    pub fn from_config(config: Config) -> Result<Self> {
        let session = match &config.token_file {
            Some(path) => Session::new(FileTokenStore::new(path))?,
            None => Session::in_memory(),
        };
        Ok(Self::with_client(reqwest::Client::new(), config, session))
    }

    /// Create a client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure timeouts, proxies, headers, etc.
    pub fn with_client(http: reqwest::Client, config: Config, session: Session) -> Self {
        let backend = Backend::new(http.clone(), config.backend_url.clone(), session);
        Self {
            http,
            config,
            backend,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn session(&self) -> &Session {
        self.backend.session()
    }

    /// Every fixture of the configured season, sorted by kickoff.
    pub async fn get_fixtures(&self) -> Result<FixturesView> {
        self.get_fixtures_with(&CancelToken::new()).await
    }

    pub async fn get_fixtures_with(&self, cancel: &CancelToken) -> Result<FixturesView> {
        views::fixtures::load_fixtures(&self.http, &self.config, cancel).await
    }

    /// Fixtures currently in play, optionally narrowed to one league and season.
    #[instrument(skip(self))]
    pub async fn get_live_fixtures(
        &self,
        league: Option<u32>,
        season: Option<u32>,
    ) -> Result<Vec<ApiFixture>> {
        football::get_live_fixtures(&self.http, &self.config, league, season).await
    }

    /// Events (goals, cards, substitutions) of one fixture.
    #[instrument(skip(self))]
    pub async fn get_fixture_events(&self, fixture_id: u64) -> Result<Vec<FixtureEvent>> {
        football::get_fixture_events(&self.http, &self.config, fixture_id).await
    }

    /// Start polling live fixtures of the configured league every
    /// `config.poll_interval`.
    pub fn live_poller(&self) -> LiveHandle {
        let http = self.http.clone();
        let config = self.config.clone();
        LivePoller::new(self.config.poll_interval).spawn(move || {
            let http = http.clone();
            let config = config.clone();
            async move {
                football::get_live_fixtures(&http, &config, Some(config.league_id), None).await
            }
        })
    }

    #[instrument(skip(self))]
    pub async fn get_standings(&self) -> Result<Vec<StandingsRow>> {
        football::get_standings(&self.http, &self.config).await
    }

    /// Teams grid and league table, loaded side by side.
    pub async fn get_teams(&self) -> TeamsView {
        self.get_teams_with(&CancelToken::new()).await
    }

    pub async fn get_teams_with(&self, cancel: &CancelToken) -> TeamsView {
        views::teams::load_teams_view(&self.http, &self.config, &self.backend, cancel).await
    }

    /// Team metadata plus the configured season's stats.
    pub async fn get_team_details(&self, route_id: u64) -> Result<TeamDetails> {
        self.get_team_details_with(route_id, &CancelToken::new()).await
    }

    pub async fn get_team_details_with(
        &self,
        route_id: u64,
        cancel: &CancelToken,
    ) -> Result<TeamDetails> {
        views::teams::load_team_details(&self.backend, route_id, self.config.season, cancel).await
    }

    pub async fn get_leaderboards(&self) -> Result<Leaderboards> {
        self.get_leaderboards_with(&CancelToken::new()).await
    }

    pub async fn get_leaderboards_with(&self, cancel: &CancelToken) -> Result<Leaderboards> {
        views::players::load_leaderboards(&self.backend, self.config.backend_season_id, cancel)
            .await
    }

    pub async fn get_player_details(&self, player_id: u64) -> Result<PlayerDetails> {
        self.get_player_details_with(player_id, &CancelToken::new()).await
    }

    pub async fn get_player_details_with(
        &self,
        player_id: u64,
        cancel: &CancelToken,
    ) -> Result<PlayerDetails> {
        views::players::load_player_details(&self.backend, player_id, cancel).await
    }

    /// Head-to-head meetings from an exported JSON file of any shape.
    pub fn head_to_head_file(&self, path: &Path) -> Result<Vec<Match>> {
        views::head_to_head_file(path)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginUser> {
        self.backend.login(email, password).await
    }

    pub fn logout(&self) -> Result<()> {
        self.backend.logout()
    }
}

impl Default for PlClient {
    fn default() -> Self {
        Self::new()
    }
}
