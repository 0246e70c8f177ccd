use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::utils::{string_or_default, vec_or_default};

/// Status codes of matches currently being played.
pub const LIVE_STATUSES: &[&str] = &["1H", "HT", "2H", "ET", "BT", "P", "SUSP", "INT", "LIVE"];

/// Status codes of matches that are over, including ones that never will be played.
pub const PLAYED_STATUSES: &[&str] = &["FT", "AET", "PEN", "AWD", "WO", "CANC", "ABD"];

/// Which of the three lifecycle buckets a status code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum StatusGroup {
    Upcoming,
    Live,
    Played,
}

impl StatusGroup {
    /// Classify an upstream short status code. Anything neither live nor
    /// played counts as upcoming.
    pub fn of(short: &str) -> Self {
        let short = short.trim();
        if LIVE_STATUSES.contains(&short) {
            StatusGroup::Live
        } else if PLAYED_STATUSES.contains(&short) {
            StatusGroup::Played
        } else {
            StatusGroup::Upcoming
        }
    }
}

/// Fixtures table toggle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FixtureFilter {
    Upcoming,
    /// Finished and in-progress matches.
    #[default]
    Played,
}

impl FixtureFilter {
    pub fn matches(self, group: StatusGroup) -> bool {
        match self {
            FixtureFilter::Upcoming => group == StatusGroup::Upcoming,
            FixtureFilter::Played => group != StatusGroup::Upcoming,
        }
    }
}

/// Collection envelope used by every upstream list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    #[serde(default = "Vec::new", deserialize_with = "vec_or_default")]
    pub response: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

/// Upstream pagination counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub current: u32,
    pub total: u32,
}

/// A fixture as returned by the upstream `/fixtures` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFixture {
    pub fixture: FixtureInfo,
    #[serde(default)]
    pub league: FixtureLeague,
    pub teams: FixtureTeams,
    #[serde(default)]
    pub goals: Goals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureInfo {
    pub id: u64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub status: FixtureStatus,
    #[serde(default)]
    pub referee: Option<String>,
    #[serde(default)]
    pub venue: Venue,
}

impl FixtureInfo {
    /// Kickoff with the offset of the timezone the fixture was requested in.
    pub fn kickoff(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.date).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureStatus {
    #[serde(default = "not_started")]
    pub short: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub long: String,
    #[serde(default)]
    pub elapsed: Option<u32>,
}

impl Default for FixtureStatus {
    fn default() -> Self {
        Self {
            short: not_started(),
            long: String::new(),
            elapsed: None,
        }
    }
}

fn not_started() -> String {
    "NS".to_string()
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub name: Option<String>,
    pub city: Option<String>,
}

impl Venue {
    /// `"name — city"`, skipping blank parts.
    pub fn label(&self) -> String {
        [self.name.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" — ")
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FixtureLeague {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub season: u32,
    #[serde(default)]
    pub round: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureTeams {
    pub home: FixtureTeam,
    pub away: FixtureTeam,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureTeam {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Score; either side is null before kickoff.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

/// An in-match event from `/fixtures/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureEvent {
    pub time: EventTime,
    pub team: FixtureTeam,
    #[serde(default)]
    pub player: Option<EventPerson>,
    #[serde(default)]
    pub assist: Option<EventPerson>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventTime {
    pub elapsed: u32,
    #[serde(default)]
    pub extra: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPerson {
    pub id: Option<u64>,
    pub name: Option<String>,
}

/// One row of the fixtures table.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureRow {
    pub id: u64,
    pub timestamp: i64,
    /// Local kickoff as `dd/mm HH:MM`.
    pub when_local: String,
    pub home: RowTeam,
    pub away: RowTeam,
    pub status_short: String,
    pub status_long: String,
    pub group: StatusGroup,
    pub score: String,
    pub venue: String,
    pub round: Option<String>,
    pub referee: Option<String>,
    pub elapsed: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowTeam {
    pub name: String,
    pub logo: Option<String>,
}

impl From<&FixtureTeam> for RowTeam {
    fn from(team: &FixtureTeam) -> Self {
        Self {
            name: team.name.clone(),
            logo: team.logo.clone(),
        }
    }
}

/// Score cell: a dash before kickoff, otherwise `home–away` with nulls as zero.
pub fn score_label(goals: &Goals, group: StatusGroup) -> String {
    match group {
        StatusGroup::Upcoming => "–".to_string(),
        _ => format!("{}–{}", goals.home.unwrap_or(0), goals.away.unwrap_or(0)),
    }
}

impl From<&ApiFixture> for FixtureRow {
    fn from(api: &ApiFixture) -> Self {
        let f = &api.fixture;
        let group = StatusGroup::of(&f.status.short);
        let when_local = f
            .kickoff()
            .map(|k| k.format("%d/%m %H:%M").to_string())
            .unwrap_or_else(|| f.date.clone());
        Self {
            id: f.id,
            timestamp: f.timestamp,
            when_local,
            home: (&api.teams.home).into(),
            away: (&api.teams.away).into(),
            status_short: f.status.short.clone(),
            status_long: f.status.long.clone(),
            group,
            score: score_label(&api.goals, group),
            venue: f.venue.label(),
            round: api.league.round.clone(),
            referee: f.referee.clone(),
            elapsed: f.status.elapsed,
        }
    }
}

/// A single line of the live ticker.
#[derive(Debug, Clone, Serialize)]
pub struct LiveLine {
    pub fixture_id: u64,
    pub status: String,
    pub elapsed: u32,
    pub home: String,
    pub away: String,
    pub home_goals: u32,
    pub away_goals: u32,
}

impl From<&ApiFixture> for LiveLine {
    fn from(api: &ApiFixture) -> Self {
        Self {
            fixture_id: api.fixture.id,
            status: api.fixture.status.short.clone(),
            elapsed: api.fixture.status.elapsed.unwrap_or(0),
            home: api.teams.home.name.clone(),
            away: api.teams.away.name.clone(),
            home_goals: api.goals.home.unwrap_or(0),
            away_goals: api.goals.away.unwrap_or(0),
        }
    }
}

impl std::fmt::Display for LiveLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} · {}' {} {} – {} {}",
            self.status, self.elapsed, self.home, self.home_goals, self.away_goals, self.away
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fixture(short: &str, home: Option<u32>, away: Option<u32>) -> ApiFixture {
        serde_json::from_value(json!({
            "fixture": {
                "id": 1035037,
                "date": "2025-08-16T15:00:00+01:00",
                "timestamp": 1755352800,
                "timezone": "Europe/London",
                "status": { "short": short, "long": "x", "elapsed": null },
                "referee": null,
                "venue": { "name": "Villa Park", "city": "Birmingham" }
            },
            "league": { "id": 39, "season": 2025, "round": "Regular Season - 1" },
            "teams": {
                "home": { "id": 66, "name": "Aston Villa", "logo": null },
                "away": { "id": 34, "name": "Newcastle", "logo": "n.png" }
            },
            "goals": { "home": home, "away": away }
        }))
        .unwrap()
    }

    #[test]
    fn test_status_groups_are_exclusive() {
        for code in LIVE_STATUSES {
            assert_eq!(StatusGroup::of(code), StatusGroup::Live);
            assert!(!PLAYED_STATUSES.contains(code));
        }
        for code in PLAYED_STATUSES {
            assert_eq!(StatusGroup::of(code), StatusGroup::Played);
        }
        for code in ["NS", "TBD", "PST", "", "???"] {
            assert_eq!(StatusGroup::of(code), StatusGroup::Upcoming);
        }
    }

    #[test]
    fn test_filter_played_includes_live() {
        assert!(FixtureFilter::Played.matches(StatusGroup::Live));
        assert!(FixtureFilter::Played.matches(StatusGroup::Played));
        assert!(!FixtureFilter::Played.matches(StatusGroup::Upcoming));
        assert!(FixtureFilter::Upcoming.matches(StatusGroup::Upcoming));
    }

    #[test]
    fn test_row_from_upcoming_fixture() {
        let row = FixtureRow::from(&fixture("NS", None, None));
        assert_eq!(row.score, "–");
        assert_eq!(row.when_local, "16/08 15:00");
        assert_eq!(row.venue, "Villa Park — Birmingham");
        assert_eq!(row.round.as_deref(), Some("Regular Season - 1"));
        assert_eq!(row.home.name, "Aston Villa");
    }

    #[test]
    fn test_row_from_live_fixture_treats_null_goals_as_zero() {
        let row = FixtureRow::from(&fixture("1H", Some(1), None));
        assert_eq!(row.group, StatusGroup::Live);
        assert_eq!(row.score, "1–0");
    }

    #[test]
    fn test_missing_status_defaults_to_not_started() {
        let api: ApiFixture = serde_json::from_value(json!({
            "fixture": { "id": 5 },
            "teams": { "home": { "name": "A" }, "away": { "name": "B" } }
        }))
        .unwrap();
        assert_eq!(api.fixture.status.short, "NS");
        assert_eq!(FixtureRow::from(&api).when_local, "");
    }

    #[test]
    fn test_live_line_display() {
        let line = LiveLine::from(&fixture("2H", Some(2), Some(1)));
        assert_eq!(line.to_string(), "2H · 0' Aston Villa 2 – 1 Newcastle");
    }

    #[test]
    fn test_response_envelope_with_null_response() {
        let resp: ApiResponse<ApiFixture> =
            serde_json::from_value(json!({ "response": null, "paging": { "current": 1, "total": 1 } }))
                .unwrap();
        assert!(resp.response.is_empty());
        assert_eq!(resp.paging, Some(Paging { current: 1, total: 1 }));
    }
}
