use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::utils::{dash_if_empty, string_or_default, u32_or_default};

/// Descriptive metadata for a club, as stored by the backend.
///
/// Depending on the backend table the record carries `id`, `team_id`, or
/// both. `api_team_id` cross-references the upstream standings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub team_id: Option<u64>,
    #[serde(default)]
    pub api_team_id: u64,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub founded: Option<u32>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl TeamInfo {
    /// Identifier used to link to the team page: `id`, then `team_id`.
    pub fn key(&self) -> Option<u64> {
        self.id.or(self.team_id)
    }

    /// Identifier the stats tables are keyed by: `team_id`, then `id`.
    pub fn stats_id(&self) -> Option<u64> {
        self.team_id.or(self.id)
    }

    /// `"country • venue • est. founded"`, skipping missing parts.
    pub fn subtitle(&self) -> String {
        let founded = self.founded.map(|f| format!("est. {f}"));
        let subtitle = [self.country.as_deref(), self.venue.as_deref(), founded.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .join(" • ");
        subtitle
    }

    /// Case-insensitive search over name, country, venue and founding year.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let founded = self.founded.map(|f| f.to_string()).unwrap_or_default();
        [
            self.name.as_str(),
            self.country.as_deref().unwrap_or_default(),
            self.venue.as_deref().unwrap_or_default(),
            founded.as_str(),
        ]
        .join(" ")
        .to_lowercase()
        .contains(&needle)
    }
}

/// Season statistics for one team, split home/away/total.
///
/// Averages and percentages stay in the string form the upstream formats them in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamStatsRecord {
    pub stats_id: u64,
    pub league_id: u32,
    pub team_id: u64,
    pub season: u32,
    pub form: Option<String>,

    #[serde(deserialize_with = "u32_or_default")]
    pub fixtures_played_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub fixtures_played_away: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub fixtures_played_total: u32,

    #[serde(deserialize_with = "u32_or_default")]
    pub wins_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub wins_away: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub wins_total: u32,

    #[serde(deserialize_with = "u32_or_default")]
    pub draws_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub draws_away: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub draws_total: u32,

    #[serde(deserialize_with = "u32_or_default")]
    pub loses_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub loses_away: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub loses_total: u32,

    #[serde(deserialize_with = "u32_or_default")]
    pub goals_for_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub goals_for_away: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub goals_for_total: u32,

    #[serde(deserialize_with = "u32_or_default")]
    pub goals_against_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub goals_against_away: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub goals_against_total: u32,

    #[serde(deserialize_with = "string_or_default")]
    pub avg_goals_for_home: String,
    #[serde(deserialize_with = "string_or_default")]
    pub avg_goals_for_away: String,
    #[serde(deserialize_with = "string_or_default")]
    pub avg_goals_for_total: String,

    #[serde(deserialize_with = "string_or_default")]
    pub avg_goals_against_home: String,
    #[serde(deserialize_with = "string_or_default")]
    pub avg_goals_against_away: String,
    #[serde(deserialize_with = "string_or_default")]
    pub avg_goals_against_total: String,

    #[serde(deserialize_with = "u32_or_default")]
    pub clean_sheet_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub clean_sheet_away: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub clean_sheet_total: u32,

    #[serde(deserialize_with = "u32_or_default")]
    pub failed_to_score_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub failed_to_score_away: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub failed_to_score_total: u32,

    #[serde(deserialize_with = "u32_or_default")]
    pub penalty_scored_total: u32,
    #[serde(deserialize_with = "string_or_default")]
    pub penalty_scored_percentage: String,
    #[serde(deserialize_with = "u32_or_default")]
    pub penalty_missed_total: u32,
    #[serde(deserialize_with = "string_or_default")]
    pub penalty_missed_percentage: String,
    #[serde(deserialize_with = "u32_or_default")]
    pub penalty_total: u32,

    #[serde(deserialize_with = "u32_or_default")]
    pub biggest_streak_wins: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub biggest_streak_draws: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub biggest_streak_loses: u32,

    pub biggest_win_home: Option<String>,
    pub biggest_win_away: Option<String>,
    pub biggest_lose_home: Option<String>,
    pub biggest_lose_away: Option<String>,

    #[serde(deserialize_with = "u32_or_default")]
    pub biggest_goals_for_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub biggest_goals_for_away: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub biggest_goals_against_home: u32,
    #[serde(deserialize_with = "u32_or_default")]
    pub biggest_goals_against_away: u32,
}

/// One labelled home/away/total row of the team stats grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamStatLine {
    pub label: &'static str,
    pub home: String,
    pub away: String,
    pub total: String,
}

impl TeamStatLine {
    fn counts(label: &'static str, home: u32, away: u32, total: u32) -> Self {
        Self {
            label,
            home: home.to_string(),
            away: away.to_string(),
            total: total.to_string(),
        }
    }

    fn texts(label: &'static str, home: &str, away: &str, total: &str) -> Self {
        Self {
            label,
            home: dash_if_empty(home),
            away: dash_if_empty(away),
            total: dash_if_empty(total),
        }
    }
}

impl TeamStatsRecord {
    /// Rows of the home/away/total grid, in display order.
    pub fn lines(&self) -> Vec<TeamStatLine> {
        vec![
            TeamStatLine::counts(
                "Fixtures played",
                self.fixtures_played_home,
                self.fixtures_played_away,
                self.fixtures_played_total,
            ),
            TeamStatLine::counts("Wins", self.wins_home, self.wins_away, self.wins_total),
            TeamStatLine::counts("Draws", self.draws_home, self.draws_away, self.draws_total),
            TeamStatLine::counts("Losses", self.loses_home, self.loses_away, self.loses_total),
            TeamStatLine::counts(
                "Goals for",
                self.goals_for_home,
                self.goals_for_away,
                self.goals_for_total,
            ),
            TeamStatLine::counts(
                "Goals against",
                self.goals_against_home,
                self.goals_against_away,
                self.goals_against_total,
            ),
            TeamStatLine::texts(
                "Avg goals for",
                &self.avg_goals_for_home,
                &self.avg_goals_for_away,
                &self.avg_goals_for_total,
            ),
            TeamStatLine::texts(
                "Avg goals against",
                &self.avg_goals_against_home,
                &self.avg_goals_against_away,
                &self.avg_goals_against_total,
            ),
            TeamStatLine::counts(
                "Clean sheets",
                self.clean_sheet_home,
                self.clean_sheet_away,
                self.clean_sheet_total,
            ),
            TeamStatLine::counts(
                "Failed to score",
                self.failed_to_score_home,
                self.failed_to_score_away,
                self.failed_to_score_total,
            ),
        ]
    }

    /// Penalty record with whole-percent shares.
    pub fn penalties(&self) -> PenaltyLine {
        PenaltyLine {
            scored: self.penalty_scored_total,
            scored_share: percent_label(&self.penalty_scored_percentage),
            missed: self.penalty_missed_total,
            missed_share: percent_label(&self.penalty_missed_percentage),
            total: self.penalty_total,
        }
    }

    /// Recent results, one entry per character of the form string (`W`, `D`, `L`).
    pub fn form_chars(&self) -> Vec<char> {
        self.form
            .as_deref()
            .map(|f| f.trim().chars().collect())
            .unwrap_or_default()
    }
}

/// Render an upstream percentage such as `"66.67%"` as a whole percent.
pub fn percent_label(raw: &str) -> String {
    let digits = raw.trim().trim_end_matches('%');
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{v:.0}%"),
        _ => "—".to_string(),
    }
}

/// Penalties taken over the season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PenaltyLine {
    pub scored: u32,
    pub scored_share: String,
    pub missed: u32,
    pub missed_share: String,
    pub total: u32,
}

impl std::fmt::Display for PenaltyLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} scored ({}), {} missed ({}) of {}",
            self.scored, self.scored_share, self.missed, self.missed_share, self.total
        )
    }
}

/// One line of the league table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsRow {
    pub rank: u32,
    pub team_id: u64,
    pub name: String,
    pub logo: Option<String>,
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub lose: u32,
    pub gf: u32,
    pub ga: u32,
    pub gd: i32,
    pub pts: u32,
    pub form: String,
}

/// Upstream `/standings` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct StandingsResponse {
    #[serde(default)]
    pub response: Vec<StandingsLeagueEnvelope>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingsLeagueEnvelope {
    pub league: StandingsLeague,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingsLeague {
    #[serde(default)]
    pub standings: Vec<Vec<StandingsEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingsEntry {
    pub rank: u32,
    pub team: StandingsTeam,
    pub points: u32,
    #[serde(rename = "goalsDiff")]
    pub goals_diff: i32,
    #[serde(default)]
    pub form: Option<String>,
    pub all: StandingsRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingsTeam {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingsRecord {
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub lose: u32,
    pub goals: StandingsGoals,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingsGoals {
    #[serde(rename = "for")]
    pub scored: u32,
    pub against: u32,
}

impl StandingsResponse {
    /// Rows of the first table of the first league; empty when absent.
    pub fn into_rows(self) -> Vec<StandingsRow> {
        self.response
            .into_iter()
            .next()
            .and_then(|l| l.league.standings.into_iter().next())
            .unwrap_or_default()
            .into_iter()
            .map(StandingsRow::from)
            .collect()
    }
}

impl From<StandingsEntry> for StandingsRow {
    fn from(s: StandingsEntry) -> Self {
        Self {
            rank: s.rank,
            team_id: s.team.id,
            name: s.team.name,
            logo: s.team.logo,
            played: s.all.played,
            win: s.all.win,
            draw: s.all.draw,
            lose: s.all.lose,
            gf: s.all.goals.scored,
            ga: s.all.goals.against,
            gd: s.goals_diff,
            pts: s.points,
            form: s.form.unwrap_or_default(),
        }
    }
}

/// Everything the team details page shows.
#[derive(Debug, Clone, Serialize)]
pub struct TeamDetails {
    pub team: TeamInfo,
    pub stats: TeamStatsRecord,
    pub lines: Vec<TeamStatLine>,
    pub penalties: PenaltyLine,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_team_identity_order() {
        let team: TeamInfo =
            serde_json::from_value(json!({ "id": 1, "team_id": 2, "api_team_id": 33, "name": "Man Utd" }))
                .unwrap();
        assert_eq!(team.key(), Some(1));
        assert_eq!(team.stats_id(), Some(2));

        let team: TeamInfo =
            serde_json::from_value(json!({ "team_id": 2, "api_team_id": 33, "name": "Man Utd" }))
                .unwrap();
        assert_eq!(team.key(), Some(2));
    }

    #[test]
    fn test_team_search_and_subtitle() {
        let team: TeamInfo = serde_json::from_value(json!({
            "id": 7, "api_team_id": 42, "name": "Arsenal",
            "country": "England", "founded": 1886, "venue": "Emirates Stadium"
        }))
        .unwrap();
        assert!(team.matches_search("emirates"));
        assert!(team.matches_search("1886"));
        assert!(team.matches_search("  "));
        assert!(!team.matches_search("anfield"));
        assert_eq!(team.subtitle(), "England • Emirates Stadium • est. 1886");
    }

    #[test]
    fn test_stats_lines_keep_upstream_strings() {
        let stats: TeamStatsRecord = serde_json::from_value(json!({
            "team_id": 40,
            "wins_home": 10, "wins_away": "8", "wins_total": 18,
            "avg_goals_for_home": "2.1", "avg_goals_for_away": 1.5, "avg_goals_for_total": null,
            "form": "WWDL"
        }))
        .unwrap();
        let lines = stats.lines();
        assert_eq!(lines.len(), 10);
        let wins = lines.iter().find(|l| l.label == "Wins").unwrap();
        assert_eq!((wins.home.as_str(), wins.away.as_str()), ("10", "8"));
        let avg = lines.iter().find(|l| l.label == "Avg goals for").unwrap();
        assert_eq!(avg.home, "2.1");
        assert_eq!(avg.away, "1.5");
        assert_eq!(avg.total, "—");
        assert_eq!(stats.form_chars(), vec!['W', 'W', 'D', 'L']);
    }

    #[test]
    fn test_percent_label() {
        assert_eq!(percent_label("66.67%"), "67%");
        assert_eq!(percent_label("100"), "100%");
        assert_eq!(percent_label(""), "—");
    }

    #[test]
    fn test_penalty_line() {
        let stats: TeamStatsRecord = serde_json::from_value(json!({
            "penalty_scored_total": 5, "penalty_scored_percentage": "83.33%",
            "penalty_missed_total": "1", "penalty_missed_percentage": "16.67%",
            "penalty_total": 6
        }))
        .unwrap();
        let line = stats.penalties();
        assert_eq!(line.scored_share, "83%");
        assert_eq!(line.missed, 1);
        assert_eq!(line.to_string(), "5 scored (83%), 1 missed (17%) of 6");

        let empty = TeamStatsRecord::default().penalties();
        assert_eq!(empty.to_string(), "0 scored (—), 0 missed (—) of 0");
    }

    #[test]
    fn test_standings_rows() {
        let resp: StandingsResponse = serde_json::from_value(json!({
            "response": [{ "league": { "standings": [[{
                "rank": 1,
                "team": { "id": 40, "name": "Liverpool", "logo": null },
                "points": 84, "goalsDiff": 45, "form": null,
                "all": { "played": 38, "win": 25, "draw": 9, "lose": 4,
                         "goals": { "for": 86, "against": 41 } }
            }]] } }]
        }))
        .unwrap();
        let rows = resp.into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].gf, 86);
        assert_eq!(rows[0].gd, 45);
        assert_eq!(rows[0].form, "");

        let empty: StandingsResponse = serde_json::from_value(json!({ "response": [] })).unwrap();
        assert!(empty.into_rows().is_empty());
    }
}
