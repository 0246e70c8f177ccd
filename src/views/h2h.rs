use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{PlStatsError, Result};
use crate::extract::extract_fixtures_from_value;
use crate::model::Match;
use crate::normalize::{to_id, to_number};

fn text_at(value: &Value, path: &[&str]) -> String {
    path.iter()
        .try_fold(value, |v, key| v.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn goals_at(value: &Value, side: &str) -> u32 {
    value
        .get("goals")
        .and_then(|g| g.get(side))
        .and_then(to_number)
        .filter(|n| *n >= 0.0)
        .map_or(0, |n| n as u32)
}

/// Flatten extracted fixture records into head-to-head rows.
pub fn to_matches(records: &[Value]) -> Vec<Match> {
    records
        .iter()
        .map(|r| Match {
            fixture_id: r
                .get("fixture")
                .and_then(|f| f.get("id"))
                .and_then(to_id),
            date: text_at(r, &["fixture", "date"]),
            league: text_at(r, &["league", "name"]),
            home: text_at(r, &["teams", "home", "name"]),
            away: text_at(r, &["teams", "away", "name"]),
            home_goals: goals_at(r, "home"),
            away_goals: goals_at(r, "away"),
        })
        .collect()
}

/// Keep the first occurrence of each (fixture id, date, home, away).
/// Rows without a fixture id are never treated as duplicates.
pub fn dedupe_matches(matches: Vec<Match>) -> Vec<Match> {
    let mut seen = HashSet::new();
    matches
        .into_iter()
        .filter(|m| match m.fixture_id {
            Some(id) => seen.insert((id, m.date.clone(), m.home.clone(), m.away.clone())),
            None => true,
        })
        .collect()
}

/// Head-to-head rows from a payload of any shape.
pub fn head_to_head(payload: &Value) -> Vec<Match> {
    let records = extract_fixtures_from_value(payload);
    let matches = dedupe_matches(to_matches(&records));
    debug!(found = records.len(), kept = matches.len(), "head-to-head");
    matches
}

/// Read a JSON file and extract its head-to-head rows.
#[instrument]
pub fn head_to_head_file(path: &Path) -> Result<Vec<Match>> {
    let body = std::fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&body).map_err(|e| PlStatsError::Decode {
        url: path.display().to_string(),
        source: e,
    })?;
    Ok(head_to_head(&payload))
}
