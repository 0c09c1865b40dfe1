//! HTTP client for a remote EHCO content API.
//!
//! Speaks the same JSON routes this crate serves, so one deployment can
//! resolve articles from another.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::articles::{ArticleFetcher, FetchError, MAX_IDS_PER_REQUEST};
use crate::content::{Article, ArticleSummary};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, url } => Self::Status { status, url },
            ClientError::Decode { .. } => Self::Decode(err.to_string()),
            ClientError::Build(_) | ClientError::Url(_) | ClientError::Request { .. } => {
                Self::Request(err.to_string())
            }
        }
    }
}

/// Client for the `/api/...` content routes.
#[derive(Debug, Clone)]
pub struct ContentApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ContentApiClient {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ehco/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Build)?;

        // Url::join drops the last path segment unless it ends with a slash
        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch article summaries for `ids` filed under `figure_id`.
    ///
    /// IDs go out as repeated `articleId` pairs, at most
    /// [`MAX_IDS_PER_REQUEST`] per request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or an
    /// undecodable body.
    pub async fn article_summaries(
        &self,
        figure_id: &str,
        ids: &[String],
    ) -> Result<Vec<ArticleSummary>, ClientError> {
        let mut summaries = Vec::new();
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let mut url = self.base_url.join("api/article-summaries")?;
            url.query_pairs_mut()
                .append_pair("publicFigure", figure_id)
                .extend_pairs(chunk.iter().map(|id| ("articleId", id)));
            summaries.extend(self.get_json::<Vec<ArticleSummary>>(url).await?);
        }
        Ok(summaries)
    }

    /// Resolve full articles for `ids`, in batches of at most
    /// [`MAX_IDS_PER_REQUEST`] repeated `id` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or an
    /// undecodable body. Batches already received are discarded.
    pub async fn articles(&self, ids: &[String]) -> Result<Vec<Article>, ClientError> {
        let mut articles = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let mut url = self.base_url.join("api/articles")?;
            url.query_pairs_mut()
                .extend_pairs(chunk.iter().map(|id| ("id", id)));
            articles.extend(self.get_json::<Vec<Article>>(url).await?);
        }
        Ok(articles)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!(url = %url, "Content API request");
        let url_str = url.to_string();

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url_str.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url_str,
            });
        }

        response
            .json()
            .await
            .map_err(|source| ClientError::Decode {
                url: url_str,
                source,
            })
    }
}

#[async_trait]
impl ArticleFetcher for ContentApiClient {
    async fn fetch_articles(&self, ids: &[String]) -> Result<Vec<Article>, FetchError> {
        Ok(self.articles(ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use super::*;

    async fn client_for(server: &MockServer) -> ContentApiClient {
        let base = Url::parse(&server.uri()).unwrap();
        ContentApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[tokio::test]
    async fn test_fetch_articles_batches_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .and(query_param("id", "a1"))
            .and(query_param("id", "a2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "a1", "title": "First", "sendDate": "20210101", "imageUrls": [] },
                { "id": "a2", "title": "Second" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let articles = client.fetch_articles(&ids(&["a1", "a2"])).await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].send_date, "20210101");
        assert_eq!(articles[1].title, "Second");
    }

    /// Answers `/api/articles` with one article per requested `id`.
    fn echo_articles(request: &Request) -> ResponseTemplate {
        let articles: Vec<_> = request
            .url
            .query_pairs()
            .filter(|(key, _)| key == "id")
            .map(|(_, id)| serde_json::json!({ "id": id, "title": format!("Title {id}") }))
            .collect();
        ResponseTemplate::new(200).set_body_json(articles)
    }

    #[tokio::test]
    async fn test_large_requests_are_split() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(echo_articles)
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let wanted: Vec<String> = (0..150).map(|n| format!("a{n}")).collect();
        let articles = client.fetch_articles(&wanted).await.unwrap();

        let got: Vec<_> = articles.iter().map(|a| a.id.clone()).collect();
        assert_eq!(got, wanted);

        let requests = server.received_requests().await.unwrap();
        let sizes: Vec<_> = requests
            .iter()
            .map(|r| r.url.query_pairs().filter(|(key, _)| key == "id").count())
            .collect();
        assert_eq!(sizes, vec![MAX_IDS_PER_REQUEST, 50]);
    }

    #[tokio::test]
    async fn test_ids_with_commas_are_sent_whole() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .and(query_param("id", "seoul, 2021"))
            .respond_with(echo_articles)
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let articles = client.articles(&ids(&["seoul, 2021"])).await.unwrap();
        assert_eq!(articles[0].id, "seoul, 2021");
    }

    #[tokio::test]
    async fn test_empty_request_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.articles(&[]).await.unwrap().is_empty());
        assert!(client.article_summaries("iu", &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_articles(&ids(&["a1"])).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_article_summaries_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/article-summaries"))
            .and(query_param("publicFigure", "iu"))
            .and(query_param("articleId", "a1"))
            .and(query_param("articleId", "a2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "a2", "title": "Two" }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let summaries = client
            .article_summaries("iu", &ids(&["a1", "a2"]))
            .await
            .unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "a2");
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let base = Url::parse("https://ehco.example/mirror").unwrap();
        let client = ContentApiClient::new(base, Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url().as_str(), "https://ehco.example/mirror/");
    }
}
