//! Crypto headlines from a CryptoPanic-compatible feed.

use daybreak_common::{DaybreakError, Result};
use daybreak_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::Deserialize;

// Trailing slash matters: paths join onto it.
const NEWS_API_BASE: &str = "https://cryptopanic.com/api/free/v1/";

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    results: Vec<NewsPost>,
}

#[derive(Debug, Deserialize)]
struct NewsPost {
    #[serde(default)]
    title: String,
}

#[derive(Clone)]
pub struct NewsApi {
    http: HttpClient,
    auth_token: Option<String>,
}

impl NewsApi {
    /// `endpoint` overrides the public CryptoPanic base, mostly for tests.
    /// `auth_token` lifts the free-tier rate limits; the public feed works
    /// without one.
    pub fn new(endpoint: Option<&str>, auth_token: Option<String>) -> Result<Self> {
        let base = endpoint.unwrap_or(NEWS_API_BASE);
        let http = HttpClient::new(base).map_err(http_to_signal)?;
        Ok(Self { http, auth_token })
    }

    /// Fetch the newest headlines, newest first, at most `limit`.
    ///
    /// Single attempt, no retries. Untitled entries are dropped rather than
    /// rendered as blank bullet points.
    pub async fn top_headlines(&self, limit: usize) -> Result<Vec<String>> {
        let mut opts = RequestOpts {
            query: Some(vec![("public", "true".into())]),
            retries: Some(0),
            ..Default::default()
        };
        if let Some(token) = &self.auth_token {
            opts.auth = Some(Auth::Query {
                name: "auth_token",
                value: token.as_str().into(),
            });
        }

        let resp: PostsResponse = self
            .http
            .get_json("posts/", opts)
            .await
            .map_err(http_to_signal)?;

        let headlines: Vec<String> = resp
            .results
            .into_iter()
            .map(|p| p.title)
            .filter(|t| !t.trim().is_empty())
            .take(limit)
            .collect();
        tracing::debug!(count = headlines.len(), "news headlines");
        Ok(headlines)
    }
}

fn http_to_signal(e: HttpError) -> DaybreakError {
    DaybreakError::Signal(format!("{e}"))
}
