use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, info, instrument};

use crate::aggregate::{aggregate, mean_ratings};
use crate::api::backend::{Backend, Query};
use crate::cancel::CancelToken;
use crate::error::{PlStatsError, Result};
use crate::model::{
    Category, LeaderboardRow, Leaderboards, PlayerDetails, PlayerProfile, PlayerSeasonStat,
    TeamInfo, TopStat,
};

/// Rows kept per leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

const PROFILES: &str = "players-profiles";
const SEASON_STATS: &str = "players-season-stats";
const TOP_STATS: &str = "players-top-stats";
const TEAMS: &str = "teamsInfo";

/// Build every leaderboard from the four backend collections.
///
/// Top-stat rows without a metric value or a matching profile are skipped.
/// The team shown is resolved from the top-stat record, then the player's
/// first season line, then the profile.
pub fn build_leaderboards(
    profiles: &[PlayerProfile],
    season: &[PlayerSeasonStat],
    top: &[TopStat],
    teams: &[TeamInfo],
) -> Leaderboards {
    let profiles_by_id: HashMap<u64, &PlayerProfile> =
        profiles.iter().map(|p| (p.player_id, p)).collect();
    let team_names: HashMap<u64, &str> = teams
        .iter()
        .filter_map(|t| t.stats_id().map(|id| (id, t.name.as_str())))
        .collect();
    let team_name = |id: Option<u64>| id.and_then(|id| team_names.get(&id)).map(|n| n.to_string());

    let category_rows = |category: Category| {
        let rows = top
            .iter()
            .filter_map(|t| {
                let value = t.metric(category)?;
                let player_id = t.player_id()?;
                let profile = profiles_by_id.get(&player_id)?;
                let team_id = t
                    .team_id()
                    .or_else(|| {
                        season
                            .iter()
                            .find(|s| s.player_id() == Some(player_id))
                            .and_then(PlayerSeasonStat::team_id)
                    })
                    .or(profile.team_id);
                Some(LeaderboardRow {
                    player_id,
                    name: profile.name.clone(),
                    team: team_name(team_id),
                    photo: profile.photo.clone(),
                    value,
                    topstat_id: t.topstat_id(),
                })
            })
            .collect();
        top_n(rows)
    };

    let ratings = mean_ratings(season);
    let rating_rows = profiles
        .iter()
        .filter_map(|p| {
            let value = *ratings.get(&p.player_id)?;
            Some(LeaderboardRow {
                player_id: p.player_id,
                name: p.name.clone(),
                team: team_name(p.team_id),
                photo: p.photo.clone(),
                value,
                topstat_id: None,
            })
        })
        .collect();

    Leaderboards {
        goals: category_rows(Category::Goals),
        assists: category_rows(Category::Assists),
        yellow_cards: category_rows(Category::YellowCards),
        red_cards: category_rows(Category::RedCards),
        ratings: top_n(rating_rows),
    }
}

/// Highest values first; equal values keep their input order.
fn top_n(mut rows: Vec<LeaderboardRow>) -> Vec<LeaderboardRow> {
    rows.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    rows.truncate(LEADERBOARD_SIZE);
    rows
}

/// Find a player by name: an exact case-insensitive match wins over the
/// first partial one.
pub fn search_player<'a>(profiles: &'a [PlayerProfile], query: &str) -> Option<&'a PlayerProfile> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    profiles
        .iter()
        .find(|p| p.name.to_lowercase() == needle)
        .or_else(|| profiles.iter().find(|p| p.name.to_lowercase().contains(&needle)))
}

/// Join a player's profile with the season totals of their stat lines.
pub fn build_player_details(
    player_id: u64,
    profiles: Vec<PlayerProfile>,
    stats: &[PlayerSeasonStat],
) -> PlayerDetails {
    let lines: Vec<PlayerSeasonStat> = stats
        .iter()
        .filter(|s| s.player_id() == Some(player_id))
        .cloned()
        .collect();
    PlayerDetails {
        profile: profiles.into_iter().find(|p| p.player_id == player_id),
        totals: aggregate(&lines),
    }
}

#[instrument(skip(backend, cancel))]
pub(crate) async fn load_leaderboards(
    backend: &Backend,
    season_id: u32,
    cancel: &CancelToken,
) -> Result<Leaderboards> {
    let all = Query::new();
    let by_season = Query::new().param("season_id", season_id);
    let (profiles, season, top, teams) = cancel
        .run(async {
            tokio::try_join!(
                backend.find::<PlayerProfile>(PROFILES, &all),
                backend.find::<PlayerSeasonStat>(SEASON_STATS, &by_season),
                backend.find::<TopStat>(TOP_STATS, &by_season),
                backend.find::<TeamInfo>(TEAMS, &all),
            )
        })
        .await?;
    let (profiles, season, top, teams) = (
        profiles.into_vec(),
        season.into_vec(),
        top.into_vec(),
        teams.into_vec(),
    );
    debug!(
        profiles = profiles.len(),
        season = season.len(),
        top = top.len(),
        teams = teams.len(),
        "fetched player collections"
    );
    let boards = build_leaderboards(&profiles, &season, &top, &teams);
    info!(goals = boards.goals.len(), ratings = boards.ratings.len(), "built leaderboards");
    Ok(boards)
}

#[instrument(skip(backend, cancel))]
pub(crate) async fn load_player_details(
    backend: &Backend,
    player_id: u64,
    cancel: &CancelToken,
) -> Result<PlayerDetails> {
    if player_id == 0 {
        return Err(PlStatsError::InvalidArgument(format!(
            "invalid player id {player_id}"
        )));
    }
    let by_player = Query::new().param("player_id", player_id);
    let (profiles, stats) = cancel
        .run(async {
            tokio::try_join!(
                backend.find::<PlayerProfile>(PROFILES, &by_player),
                backend.find::<PlayerSeasonStat>(SEASON_STATS, &by_player),
            )
        })
        .await?;
    let details = build_player_details(player_id, profiles.into_vec(), &stats.into_vec());
    if details.profile.is_none() && details.totals.is_none() {
        return Err(PlStatsError::not_found(format!("player {player_id}")));
    }
    Ok(details)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::api::test_server::{serve, Route};

    fn profile(player_id: u64, name: &str, team_id: Option<u64>) -> PlayerProfile {
        PlayerProfile {
            player_id,
            name: name.to_string(),
            nationality: None,
            age: None,
            photo: None,
            team: None,
            team_id,
        }
    }

    fn records<T: From<Value>>(values: Value) -> Vec<T> {
        match values {
            Value::Array(items) => items.into_iter().map(T::from).collect(),
            _ => Vec::new(),
        }
    }

    fn team(team_id: u64, name: &str) -> TeamInfo {
        serde_json::from_value(json!({ "team_id": team_id, "api_team_id": team_id, "name": name }))
            .unwrap()
    }

    #[test]
    fn test_goals_board_sorted_and_capped() {
        let profiles: Vec<PlayerProfile> = (1..=7).map(|i| profile(i, &format!("P{i}"), None)).collect();
        let top: Vec<TopStat> = records(json!([
            { "player_id": 1, "goals": 3 },
            { "player_id": 2, "goals": 9 },
            { "player_id": 3, "goals": "7" },
            { "player_id": 4, "goals": 1 },
            { "player_id": 5, "goals": 7 },
            { "player_id": 6, "goals": 2 },
            { "player_id": 7 },
            { "player_id": 99, "goals": 50 },
        ]));
        let boards = build_leaderboards(&profiles, &[], &top, &[]);
        let ids: Vec<u64> = boards.goals.iter().map(|r| r.player_id).collect();
        assert_eq!(ids, vec![2, 3, 5, 1, 6]);
        assert!(boards.assists.is_empty());
    }

    #[test]
    fn test_team_resolution_order() {
        let profiles = vec![
            profile(1, "A", Some(30)),
            profile(2, "B", Some(30)),
            profile(3, "C", Some(30)),
        ];
        let season: Vec<PlayerSeasonStat> = records(json!([
            { "player_id": 2, "team_id": 20 },
            { "player_id": 2, "team_id": 30 },
        ]));
        let top: Vec<TopStat> = records(json!([
            { "player_id": 1, "team_id": 10, "assists": 3 },
            { "player_id": 2, "assists": 2 },
            { "player_id": 3, "assists": 1 },
        ]));
        let teams = vec![team(10, "Ten"), team(20, "Twenty"), team(30, "Thirty")];
        let boards = build_leaderboards(&profiles, &season, &top, &teams);
        let names: Vec<Option<&str>> = boards.assists.iter().map(|r| r.team.as_deref()).collect();
        assert_eq!(names, vec![Some("Ten"), Some("Twenty"), Some("Thirty")]);
    }

    #[test]
    fn test_ratings_board_uses_mean_rating() {
        let profiles = vec![profile(1, "A", None), profile(2, "B", None), profile(3, "C", None)];
        let season: Vec<PlayerSeasonStat> = records(json!([
            { "player_id": 1, "games_rating": "7.0", "games_minutes": 90 },
            { "player_id": 1, "games_rating": "7.2", "games_minutes": 10 },
            { "player_id": 2, "rating": 7.5, "minutes": 90 },
            { "player_id": 3, "minutes": 90 },
        ]));
        let boards = build_leaderboards(&profiles, &season, &[], &[]);
        assert_eq!(boards.ratings.len(), 2);
        assert_eq!(boards.ratings[0].player_id, 2);
        assert!((boards.ratings[1].value - 7.1).abs() < 1e-9);
        assert_eq!(boards.ratings[1].value_label(), "7.10");
    }

    #[test]
    fn test_search_prefers_exact_match() {
        let profiles = vec![profile(1, "Mohamed Salah Jr", None), profile(2, "mohamed salah", None)];
        assert_eq!(search_player(&profiles, "Mohamed Salah").unwrap().player_id, 2);
        assert_eq!(search_player(&profiles, "jr").unwrap().player_id, 1);
        assert!(search_player(&profiles, "  ").is_none());
        assert!(search_player(&profiles, "haaland").is_none());
    }

    #[test]
    fn test_player_details_filters_foreign_lines() {
        let stats: Vec<PlayerSeasonStat> = records(json!([
            { "player_id": 9, "goals": 4, "minutes": 900 },
            { "player_id": 8, "goals": 40, "minutes": 900 },
            { "player_id": 9, "goals_total": 2, "games_minutes": 450 },
        ]));
        let details = build_player_details(9, vec![profile(8, "X", None), profile(9, "Y", None)], &stats);
        assert_eq!(details.profile.unwrap().name, "Y");
        let totals = details.totals.unwrap();
        assert_eq!(totals.goals, 6);
        assert_eq!(totals.minutes, 1350);
    }

    fn backend(base: String) -> Backend {
        Backend::new(reqwest::Client::new(), base, crate::session::Session::in_memory())
    }

    fn feeds(profiles: Value) -> Vec<Route> {
        vec![
            Route::new("/api/v1/players-profiles", 200, profiles.to_string()),
            Route::new("/api/v1/players-season-stats", 200, "[]"),
            Route::new(
                "/api/v1/players-top-stats",
                200,
                json!({ "total": 2, "limit": 10, "skip": 0, "data": [
                    { "player_id": 1, "goals": 4 },
                    { "player_id": 2, "goals": 6 },
                ] })
                .to_string(),
            ),
            Route::new("/api/v1/teamsInfo", 200, "[]"),
        ]
    }

    #[tokio::test]
    async fn test_load_leaderboards_over_http() {
        let profiles = json!([
            { "player_id": 1, "name": "Saka" },
            { "player_id": 2, "name": "Haaland" },
        ]);
        let base = serve(feeds(profiles)).await;
        let boards = load_leaderboards(&backend(base), 2024, &CancelToken::new())
            .await
            .unwrap();
        let names: Vec<&str> = boards.goals.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Haaland", "Saka"]);
    }

    #[tokio::test]
    async fn test_load_leaderboards_fails_on_bad_profile_row() {
        let profiles = json!([
            { "player_id": 1, "name": "Saka" },
            { "player_id": 2, "name": null },
        ]);
        let base = serve(feeds(profiles)).await;
        let err = load_leaderboards(&backend(base), 2024, &CancelToken::new())
            .await
            .unwrap_err();
        match err {
            PlStatsError::Decode { url, .. } => assert!(url.contains("players-profiles")),
            other => panic!("unexpected {other:?}"),
        }
    }
}

