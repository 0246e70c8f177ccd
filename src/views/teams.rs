use std::future::Future;

use tracing::{debug, info, instrument, warn};

use crate::api::backend::{Backend, Query};
use crate::api::football;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{PlStatsError, Result};
use crate::model::{StandingsRow, TeamDetails, TeamInfo, TeamStatsRecord};

/// Upstream ids of the clubs in the current Premier League season.
pub const ALLOWED_API_TEAM_IDS: [u64; 20] = [
    33, 34, 35, 36, 39, 40, 42, 44, 45, 47, 48, 49, 50, 51, 52, 55, 63, 65, 66, 746,
];

const TEAMS: &str = "teamsInfo";
const TEAM_STATS: &str = "teams-stats-files";

/// Teams grid plus league table. Each half fails on its own.
#[derive(Debug)]
pub struct TeamsView {
    pub teams: Result<Vec<TeamInfo>>,
    pub standings: Result<Vec<StandingsRow>>,
}

/// Drop teams outside [`ALLOWED_API_TEAM_IDS`] when the backend ignored the
/// `$in` filter and returned extra rows.
pub fn filter_allowed(teams: Vec<TeamInfo>) -> Vec<TeamInfo> {
    let allowed = |t: &TeamInfo| ALLOWED_API_TEAM_IDS.contains(&t.api_team_id);
    if teams.iter().all(allowed) {
        return teams;
    }
    warn!(count = teams.len(), "backend returned teams outside the league");
    teams.into_iter().filter(allowed).collect()
}

pub fn search_teams<'a>(teams: &'a [TeamInfo], needle: &str) -> Vec<&'a TeamInfo> {
    teams.iter().filter(|t| t.matches_search(needle)).collect()
}

/// Resolve a team page id against the teams table.
///
/// Route ids are not consistently one key across backend tables, so the
/// lookup tries `team_id`, then `id`, then `api_team_id`, stopping at the
/// first hit.
pub async fn resolve_team<F, Fut>(route_id: u64, mut lookup: F) -> Result<TeamInfo>
where
    F: FnMut(&'static str, u64) -> Fut,
    Fut: Future<Output = Result<Option<TeamInfo>>>,
{
    for field in ["team_id", "id", "api_team_id"] {
        if let Some(team) = lookup(field, route_id).await? {
            debug!(route_id, field, "resolved team");
            return Ok(team);
        }
    }
    Err(PlStatsError::not_found("team"))
}

#[instrument(skip(backend, cancel))]
pub(crate) async fn load_teams(backend: &Backend, cancel: &CancelToken) -> Result<Vec<TeamInfo>> {
    let query = Query::new()
        .limit(100)
        .sort("name", 1)
        .param_list("api_team_id[$in]", ALLOWED_API_TEAM_IDS);
    let teams = cancel
        .run(backend.find::<TeamInfo>(TEAMS, &query))
        .await?
        .into_vec();
    Ok(filter_allowed(teams))
}

#[instrument(skip_all)]
pub(crate) async fn load_teams_view(
    http: &reqwest::Client,
    config: &Config,
    backend: &Backend,
    cancel: &CancelToken,
) -> TeamsView {
    let (teams, standings) = tokio::join!(
        load_teams(backend, cancel),
        cancel.run(football::get_standings(http, config)),
    );
    if let Err(e) = &teams {
        warn!(error = %e, "teams failed to load");
    }
    if let Err(e) = &standings {
        warn!(error = %e, "standings failed to load");
    }
    TeamsView { teams, standings }
}

#[instrument(skip(backend, cancel))]
pub(crate) async fn load_team_details(
    backend: &Backend,
    route_id: u64,
    season: u32,
    cancel: &CancelToken,
) -> Result<TeamDetails> {
    cancel
        .run(async {
            let team = resolve_team(route_id, |field, id| {
                backend.find_one::<TeamInfo>(TEAMS, Query::new().param(field, id))
            })
            .await?;
            let stats_id = team
                .stats_id()
                .ok_or_else(|| PlStatsError::not_found(format!("stats id for {}", team.name)))?;
            let query = Query::new()
                .sort("stats_id", 1)
                .param("team_id", stats_id)
                .param("season", season);
            let stats: TeamStatsRecord = backend
                .find_one(TEAM_STATS, query)
                .await?
                .ok_or_else(|| PlStatsError::not_found(format!("stats for season {season}")))?;
            info!(team = %team.name, season, "loaded team stats");
            let lines = stats.lines();
            let penalties = stats.penalties();
            Ok(TeamDetails {
                team,
                stats,
                lines,
                penalties,
            })
        })
        .await
}
