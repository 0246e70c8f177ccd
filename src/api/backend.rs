use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::api::{join_url, send_json, send_text, with_query};
use crate::error::{PlStatsError, Result};
use crate::session::Session;

const API_PREFIX: &str = "/api/v1";

/// Query string for backend collection calls.
///
/// Keys are sent verbatim, so operator keys such as `$limit`, `$sort[name]`
/// or `api_team_id[$in]` work as-is. Lists repeat their key once per value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs.push((key.into(), value.to_string()));
        self
    }

    pub fn param_list<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for value in values {
            self.pairs.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn limit(self, limit: u32) -> Self {
        self.param("$limit", limit)
    }

    /// `$sort[field]=1` for ascending, `-1` for descending.
    pub fn sort(self, field: &str, direction: i8) -> Self {
        self.param(format!("$sort[{field}]"), direction)
    }

    /// Append every pair of `other`.
    pub fn merge(mut self, other: Query) -> Self {
        self.pairs.extend(other.pairs);
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// A `find` result: either a bare array or a paginated envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Paginated {
        data: Vec<T>,
        total: Option<u64>,
        limit: Option<u64>,
        skip: Option<u64>,
    },
    /// Any other shape carries no rows.
    Other,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    data: Vec<T>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    limit: Option<u64>,
    #[serde(default)]
    skip: Option<u64>,
}

impl<T: DeserializeOwned> Listing<T> {
    /// Decode a `find` body. A row that does not fit `T` fails the whole
    /// listing instead of being dropped.
    pub fn from_value(value: Value, url: &str) -> Result<Self> {
        let decode_err = |source| PlStatsError::Decode {
            url: url.to_owned(),
            source,
        };
        match value {
            Value::Array(_) => serde_json::from_value(value)
                .map(Listing::Bare)
                .map_err(decode_err),
            Value::Object(map) if map.contains_key("data") => {
                let env: Envelope<T> =
                    serde_json::from_value(Value::Object(map)).map_err(decode_err)?;
                Ok(Listing::Paginated {
                    data: env.data,
                    total: env.total,
                    limit: env.limit,
                    skip: env.skip,
                })
            }
            _ => Ok(Listing::Other),
        }
    }
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Paginated { data, .. } => data,
            Listing::Other => Vec::new(),
        }
    }

    pub fn total(&self) -> Option<u64> {
        match self {
            Listing::Bare(items) => Some(items.len() as u64),
            Listing::Paginated { total, .. } => *total,
            Listing::Other => None,
        }
    }
}

/// The signed-in backend account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    pub user_id: u64,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_active: u8,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    user: LoginUser,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TokenCheck {
    pub valid: bool,
}

/// Feathers-style client for the backend-for-frontend service.
///
/// Every call sends `Authorization: Bearer <token>` when the [`Session`]
/// holds a token.
#[derive(Debug, Clone)]
pub struct Backend {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl Backend {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, session: Session) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Service URL under the API prefix. Each segment is percent-encoded on
    /// its own, so an id holding `/` or `?` stays inside its segment.
    pub(crate) fn url(&self, segments: &[&str], query: &Query) -> Result<reqwest::Url> {
        let mut url = with_query(&join_url(&self.base_url, API_PREFIX), query.pairs())?;
        url.path_segments_mut()
            .map_err(|()| {
                PlStatsError::InvalidArgument(format!("base url {:?} cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: reqwest::Url) -> Result<reqwest::RequestBuilder> {
        let mut request = self
            .http
            .request(method, url)
            .header("Content-Type", "application/json");
        if let Some(bearer) = self.session.bearer()? {
            request = request.header("Authorization", bearer);
        }
        Ok(request)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        segments: &[&str],
        query: &Query,
        body: Option<String>,
    ) -> Result<T> {
        let url = self.url(segments, query)?;
        let mut request = self.request(method, url.clone())?;
        if let Some(body) = body {
            request = request.body(body);
        }
        send_json(request, url.as_str()).await
    }

    #[instrument(skip(self, query))]
    pub async fn find<T: DeserializeOwned>(&self, name: &str, query: &Query) -> Result<Listing<T>> {
        let url = self.url(&[name], query)?;
        let request = self.request(reqwest::Method::GET, url.clone())?;
        let body: Value = send_json(request, url.as_str()).await?;
        let listing = Listing::from_value(body, url.as_str())?;
        if let Listing::Other = listing {
            warn!(name, "find returned neither an array nor a data envelope");
        }
        Ok(listing)
    }

    /// `find` with `$limit=1`, returning the first row if any.
    pub async fn find_one<T: DeserializeOwned>(&self, name: &str, query: Query) -> Result<Option<T>> {
        let query = Query::new().limit(1).merge(query);
        Ok(self.find::<T>(name, &query).await?.into_vec().into_iter().next())
    }

    #[instrument(skip(self, query))]
    pub async fn get<T: DeserializeOwned>(&self, name: &str, id: &str, query: &Query) -> Result<T> {
        self.call(reqwest::Method::GET, &[name, id], query, None)
            .await
    }

    #[instrument(skip(self, body))]
    pub async fn create<T: DeserializeOwned, P: Serialize>(&self, name: &str, body: &P) -> Result<T> {
        let body = to_body(body)?;
        self.call(reqwest::Method::POST, &[name], &Query::new(), Some(body))
            .await
    }

    #[instrument(skip(self, body))]
    pub async fn patch<T: DeserializeOwned, P: Serialize>(
        &self,
        name: &str,
        id: &str,
        body: &P,
    ) -> Result<T> {
        let body = to_body(body)?;
        self.call(reqwest::Method::PATCH, &[name, id], &Query::new(), Some(body))
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove<T: DeserializeOwned>(&self, name: &str, id: &str) -> Result<T> {
        self.call(reqwest::Method::DELETE, &[name, id], &Query::new(), None)
            .await
    }

    /// Exchange credentials for a token and store it in the session.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginUser> {
        let body = to_body(&LoginRequest { email, password })?;
        let resp: LoginResponse = self
            .call(
                reqwest::Method::POST,
                &["login", "access-token"],
                &Query::new(),
                Some(body),
            )
            .await?;
        let token = resp
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PlStatsError::not_found("no token returned from login"))?;
        self.session.sign_in(&token)?;
        debug!(user_id = resp.user.user_id, "logged in");
        Ok(resp.user)
    }

    pub fn logout(&self) -> Result<()> {
        self.session.sign_out()
    }

    /// Ask the backend whether the stored token is still accepted.
    #[instrument(skip(self))]
    pub async fn test_token(&self) -> Result<TokenCheck> {
        self.call(reqwest::Method::GET, &["login", "test-token"], &Query::new(), None)
            .await
    }

    /// `true` when the backend answers at all, whatever the status.
    pub async fn ping(&self) -> bool {
        let url = join_url(&self.base_url, "/");
        let request = self.http.get(&url).header("Content-Type", "application/json");
        match send_text(request, &url).await {
            Ok(_) | Err(PlStatsError::HttpStatus { .. }) => true,
            Err(e) => {
                debug!(error = %e, "backend ping failed");
                false
            }
        }
    }
}

fn to_body<P: Serialize>(body: &P) -> Result<String> {
    serde_json::to_string(body).map_err(|e| PlStatsError::InvalidArgument(e.to_string()))
}
