//! NewsAPI `everything` endpoint client.
//!
//! Issues one keyword + date-range search per run, sorted by popularity and
//! restricted to English results, and reduces the response to its article
//! titles.
//!
//! # Response Envelope
//!
//! ```text
//! {"status": "ok", "totalResults": 42, "articles": [{"title": "...", "publishedAt": "..."}]}
//! {"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid"}
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{DayWindow, HeadlineSource};
use crate::errors::{QuizError, QuizResult};
use crate::models::Headline;
use crate::utils::truncate_for_log;

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_MAX_HEADLINES: usize = 15;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    total_results: u64,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    published_at: Option<String>,
}

/// Headline source backed by NewsAPI.
pub struct NewsApiClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    topic: String,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("topic", &self.topic)
            .finish()
    }
}

impl NewsApiClient {
    /// Build a client for `endpoint` searching for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::Config`] if the endpoint is not a valid URL or the
    /// HTTP client cannot be constructed.
    pub fn new(endpoint: &str, api_key: &str, topic: &str, timeout: Duration) -> QuizResult<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| QuizError::Config(format!("invalid news API url {endpoint:?}: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("news_quiz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QuizError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.to_string(),
            topic: topic.to_string(),
        })
    }

    fn request_url(&self, window: &DayWindow, max_count: usize) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &self.topic)
            .append_pair("from", &window.from_param())
            .append_pair("to", &window.to_param())
            .append_pair("language", "en")
            .append_pair("sortBy", "popularity")
            .append_pair("pageSize", &max_count.to_string())
            .append_pair("apiKey", &self.api_key);
        url
    }
}

impl HeadlineSource for NewsApiClient {
    #[instrument(level = "info", skip(self), fields(topic = %self.topic))]
    async fn fetch_headlines(&self, day: NaiveDate, max_count: usize) -> QuizResult<Vec<Headline>> {
        let window = DayWindow::new(day);
        let url = self.request_url(&window, max_count);
        info!(from = %window.from_param(), to = %window.to_param(), "Querying NewsAPI");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "NewsAPI responded");

        let headlines = headlines_from_body(status, &body, &window, max_count)?;
        info!(count = headlines.len(), "Fetched headlines");
        Ok(headlines)
    }
}

/// Reduce a NewsAPI response body to the headlines inside `window`.
fn headlines_from_body(
    status: StatusCode,
    body: &str,
    window: &DayWindow,
    max_count: usize,
) -> QuizResult<Vec<Headline>> {
    let parsed: NewsApiResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(QuizError::UpstreamStatus(format!(
                "NewsAPI returned status code {status}: {}",
                truncate_for_log(body, 300)
            )));
        }
        Err(e) => {
            return Err(QuizError::ResponseFormat(format!(
                "Failed to parse NewsAPI response: {e}"
            )));
        }
    };

    if parsed.status != "ok" {
        let message = parsed.message.unwrap_or_else(|| "Unknown error".to_string());
        return Err(QuizError::UpstreamStatus(message));
    }
    if !status.is_success() {
        return Err(QuizError::UpstreamStatus(format!(
            "NewsAPI returned status code {status}"
        )));
    }
    if parsed.total_results == 0 {
        return Err(QuizError::NoResults(format!(
            "No news articles found for {}",
            window.day
        )));
    }

    let headlines = parsed
        .articles
        .into_iter()
        .filter(|article| match article.published_at.as_deref() {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(t) => {
                    let inside = window.contains(t.with_timezone(&Utc));
                    if !inside {
                        debug!(published_at = raw, "Dropping article outside the day window");
                    }
                    inside
                }
                Err(e) => {
                    warn!(published_at = raw, error = %e, "Unparseable publishedAt; keeping article");
                    true
                }
            },
            None => true,
        })
        .filter_map(|article| article.title)
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .take(max_count)
        .collect();

    Ok(headlines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn window() -> DayWindow {
        DayWindow::new(NaiveDate::from_ymd_opt(2025, 5, 6).unwrap())
    }

    fn client() -> NewsApiClient {
        NewsApiClient::new(DEFAULT_NEWS_API_URL, "secret-key", "Israel", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_request_url_parameters() {
        let url = client().request_url(&window(), 15);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(url.path(), "/v2/everything");
        assert_eq!(get("q"), Some("Israel"));
        assert_eq!(get("from"), Some("2025-05-06"));
        assert_eq!(get("to"), Some("2025-05-07"));
        assert_eq!(get("language"), Some("en"));
        assert_eq!(get("sortBy"), Some("popularity"));
        assert_eq!(get("pageSize"), Some("15"));
        assert_eq!(get("apiKey"), Some("secret-key"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("secret-key"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error_without_key() {
        let client = NewsApiClient::new(
            "http://127.0.0.1:1/v2/everything",
            "secret-key",
            "Israel",
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client
            .fetch_headlines(window().day, 5)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!err.to_string().contains("secret-key"));
        assert!(!format!("{err:?}").contains("secret-key"));
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let err = NewsApiClient::new("not a url", "k", "t", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, QuizError::Config(_)));
    }

    #[test]
    fn test_titles_extracted_and_empty_dropped() {
        let body = r#"{
            "status": "ok",
            "totalResults": 4,
            "articles": [
                {"title": "Team X wins championship", "publishedAt": "2025-05-06T10:00:00Z"},
                {"title": "", "publishedAt": "2025-05-06T11:00:00Z"},
                {"publishedAt": "2025-05-06T12:00:00Z"},
                {"title": "Markets rally", "publishedAt": "2025-05-06T13:00:00Z"}
            ]
        }"#;
        let headlines = headlines_from_body(StatusCode::OK, body, &window(), 15).unwrap();
        assert_eq!(headlines, vec!["Team X wins championship", "Markets rally"]);
    }

    #[test]
    fn test_duplicates_pass_through_and_cap_applies() {
        let body = r#"{
            "status": "ok",
            "totalResults": 3,
            "articles": [{"title": "Same"}, {"title": "Same"}, {"title": "Other"}]
        }"#;
        let headlines = headlines_from_body(StatusCode::OK, body, &window(), 2).unwrap();
        assert_eq!(headlines, vec!["Same", "Same"]);
    }

    #[test]
    fn test_article_at_next_midnight_excluded() {
        let body = r#"{
            "status": "ok",
            "totalResults": 3,
            "articles": [
                {"title": "Late edition", "publishedAt": "2025-05-06T23:59:59Z"},
                {"title": "Tomorrow", "publishedAt": "2025-05-07T00:00:00Z"},
                {"title": "Offset midnight", "publishedAt": "2025-05-07T02:00:00+02:00"}
            ]
        }"#;
        let headlines = headlines_from_body(StatusCode::OK, body, &window(), 15).unwrap();
        assert_eq!(headlines, vec!["Late edition"]);
    }

    #[test]
    fn test_zero_results_is_no_results_error() {
        let body = r#"{"status": "ok", "totalResults": 0, "articles": []}"#;
        let err = headlines_from_body(StatusCode::OK, body, &window(), 15).unwrap_err();
        assert!(matches!(err, QuizError::NoResults(_)));
    }

    #[test]
    fn test_error_status_surfaces_message() {
        let body = r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid"}"#;
        let err = headlines_from_body(StatusCode::UNAUTHORIZED, body, &window(), 15).unwrap_err();
        match err {
            QuizError::UpstreamStatus(msg) => assert_eq!(msg, "Your API key is invalid"),
            other => panic!("unexpected error: {other:?}"),
        }

        let body = r#"{"status": "error"}"#;
        let err = headlines_from_body(StatusCode::OK, body, &window(), 15).unwrap_err();
        assert!(matches!(err, QuizError::UpstreamStatus(ref m) if m == "Unknown error"));
    }

    #[test]
    fn test_http_error_with_unreadable_body() {
        let err = headlines_from_body(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>", &window(), 15)
            .unwrap_err();
        assert!(matches!(err, QuizError::UpstreamStatus(ref m) if m.contains("502")));
    }

    #[test]
    fn test_malformed_body_is_format_error() {
        let err = headlines_from_body(StatusCode::OK, "not json", &window(), 15).unwrap_err();
        assert!(matches!(err, QuizError::ResponseFormat(_)));

        let err = headlines_from_body(StatusCode::OK, r#"{"totalResults": 3}"#, &window(), 15).unwrap_err();
        assert!(matches!(err, QuizError::ResponseFormat(_)));
    }
}
