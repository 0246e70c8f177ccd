use tracing::{info, instrument, warn};

use crate::api::football;
use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{PlStatsError, Result};
use crate::model::{ApiFixture, FixtureFilter, FixtureRow};

/// The fixtures table for one league season.
#[derive(Debug)]
pub struct FixturesView {
    /// Rows sorted by kickoff, earliest first.
    pub rows: Vec<FixtureRow>,
    pub requests: u32,
    /// Set when a page request failed; `rows` then holds the pages fetched before it.
    pub error: Option<PlStatsError>,
}

impl FixturesView {
    /// Rows shown for the given toggle.
    pub fn filtered(&self, filter: FixtureFilter) -> Vec<&FixtureRow> {
        self.rows
            .iter()
            .filter(|row| filter.matches(row.group))
            .collect()
    }
}

/// Map upstream fixtures to table rows ordered by kickoff timestamp.
pub fn build_rows(fixtures: &[ApiFixture]) -> Vec<FixtureRow> {
    let mut rows: Vec<FixtureRow> = fixtures.iter().map(FixtureRow::from).collect();
    rows.sort_by_key(|row| row.timestamp);
    rows
}

#[instrument(skip_all, fields(league = config.league_id, season = config.season))]
pub(crate) async fn load_fixtures(
    http: &reqwest::Client,
    config: &Config,
    cancel: &CancelToken,
) -> Result<FixturesView> {
    let paged = cancel
        .run(async { Ok(football::get_fixtures(http, config).await) })
        .await?;
    if let Some(e) = &paged.error {
        warn!(error = %e, kept = paged.items.len(), "fixtures load ended early");
    }
    let rows = build_rows(&paged.items);
    info!(count = rows.len(), requests = paged.requests, "loaded fixtures");
    Ok(FixturesView {
        rows,
        requests: paged.requests,
        error: paged.error,
    })
}
