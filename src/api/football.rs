use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::api::{join_url, send_json, with_query};
use crate::config::Config;
use crate::error::Result;
use crate::model::{ApiFixture, ApiResponse, FixtureEvent, StandingsResponse, StandingsRow};
use crate::pager::{Page, Paged, Pager};

/// GET an upstream endpoint with the provider's auth headers.
async fn get<T: DeserializeOwned>(
    client: &reqwest::Client,
    config: &Config,
    path: &str,
    params: &[(&str, String)],
) -> Result<T> {
    let params: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    let url = with_query(&join_url(&config.upstream_base(), path), &params)?;
    let mut request = client.get(url.clone()).header("accept", "application/json");
    for (name, value) in config.upstream_headers()? {
        request = request.header(name, value);
    }
    send_json(request, url.as_str()).await
}

#[instrument(skip(client, config), fields(league = config.league_id, season = config.season))]
pub(crate) async fn get_fixtures_page(
    client: &reqwest::Client,
    config: &Config,
    page: u32,
) -> Result<Page<ApiFixture>> {
    let params = [
        ("league", config.league_id.to_string()),
        ("season", config.season.to_string()),
        ("timezone", config.timezone.clone()),
        ("page", page.to_string()),
    ];
    let resp: ApiResponse<ApiFixture> = get(client, config, "/fixtures", &params).await?;
    debug!(count = resp.response.len(), paging = ?resp.paging, "parsed fixtures page");
    Ok(Page {
        items: resp.response,
        paging: resp.paging,
    })
}

/// Every fixture of the configured league and season, up to `config.max_pages` pages.
pub(crate) async fn get_fixtures(client: &reqwest::Client, config: &Config) -> Paged<ApiFixture> {
    Pager::new(config.max_pages)
        .run(|page| get_fixtures_page(client, config, page))
        .await
}

#[instrument(skip(client, config))]
pub(crate) async fn get_live_fixtures(
    client: &reqwest::Client,
    config: &Config,
    league: Option<u32>,
    season: Option<u32>,
) -> Result<Vec<ApiFixture>> {
    let mut params = vec![("live", "all".to_string())];
    if let Some(league) = league {
        params.push(("league", league.to_string()));
    }
    if let Some(season) = season {
        params.push(("season", season.to_string()));
    }
    let resp: ApiResponse<ApiFixture> = get(client, config, "/fixtures", &params).await?;
    debug!(count = resp.response.len(), "parsed live fixtures");
    Ok(resp.response)
}

#[instrument(skip(client, config))]
pub(crate) async fn get_fixture_events(
    client: &reqwest::Client,
    config: &Config,
    fixture_id: u64,
) -> Result<Vec<FixtureEvent>> {
    let params = [("fixture", fixture_id.to_string())];
    let resp: ApiResponse<FixtureEvent> = get(client, config, "/fixtures/events", &params).await?;
    debug!(count = resp.response.len(), fixture_id, "parsed fixture events");
    Ok(resp.response)
}

#[instrument(skip(client, config), fields(league = config.league_id, season = config.season))]
pub(crate) async fn get_standings(
    client: &reqwest::Client,
    config: &Config,
) -> Result<Vec<StandingsRow>> {
    let params = [
        ("league", config.league_id.to_string()),
        ("season", config.season.to_string()),
    ];
    let resp: StandingsResponse = get(client, config, "/standings", &params).await?;
    let rows = resp.into_rows();
    debug!(count = rows.len(), "parsed standings");
    Ok(rows)
}
