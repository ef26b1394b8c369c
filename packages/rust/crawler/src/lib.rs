//! Company website fetching and HTML cleanup.
//!
//! A [`Fetcher`] performs one GET per call with a browser-like User-Agent,
//! rejects non-success statuses, and reduces the page to plain text with
//! `script` and `style` elements removed.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use companyscout_shared::{FetchConfig, ResearchError, Result};

/// Maximum number of redirects to follow for a page.
const MAX_REDIRECTS: usize = 5;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// ---------------------------------------------------------------------------
// CleanedDocument
// ---------------------------------------------------------------------------

/// A fetched page reduced to its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedDocument {
    /// Final URL after redirects.
    pub url: String,
    /// HTTP status code of the response.
    pub status: u16,
    /// Contents of `<title>`, if present and non-blank.
    pub title: Option<String>,
    /// Text nodes of the cleaned tree, whitespace runs collapsed.
    pub text: String,
}

impl CleanedDocument {
    /// Character count of the text (not bytes).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// HTTP client for company pages.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher from the `[fetch]` config.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ResearchError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch `url` and return its cleaned text.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<CleanedDocument> {
        let parsed =
            Url::parse(url).map_err(|e| ResearchError::Fetch(format!("invalid URL '{url}': {e}")))?;

        debug!("fetching page");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ResearchError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::Fetch(format!("{url}: HTTP {status}")));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| ResearchError::Fetch(format!("{url}: body read failed: {e}")))?;

        let doc = clean_html(&final_url, status.as_u16(), &body);
        debug!(
            status = doc.status,
            body_len = body.len(),
            text_chars = doc.char_len(),
            "page cleaned"
        );

        Ok(doc)
    }
}

// ---------------------------------------------------------------------------
// HTML cleanup
// ---------------------------------------------------------------------------

/// Parse `body`, drop `script`/`style` subtrees, and flatten to text.
pub fn clean_html(url: &str, status: u16, body: &str) -> CleanedDocument {
    let mut doc = Html::parse_document(body);

    let strip_sel = Selector::parse("script, style").unwrap();
    let stripped: Vec<_> = doc.select(&strip_sel).map(|el| el.id()).collect();
    for id in stripped {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    let title_sel = Selector::parse("title").unwrap();
    let title = doc
        .select(&title_sel)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let raw: String = doc.root_element().text().collect::<Vec<_>>().join(" ");

    CleanedDocument {
        url: url.to_string(),
        status,
        title,
        text: collapse_whitespace(&raw),
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>Acme | Pricing</title>
    <style>body { color: red; }</style>
    <script>window.analytics = { track() {} };</script>
  </head>
  <body>
    <h1>Plans</h1>
    <p>Starter   costs
       $10/mo.</p>
    <script type="application/ld+json">{"@type": "Organization"}</script>
    <p>Free trial available.</p>
  </body>
</html>"#;

    #[test]
    fn strips_script_and_style() {
        let doc = clean_html("https://acme.com/", 200, PAGE);
        assert_eq!(doc.title.as_deref(), Some("Acme | Pricing"));
        assert!(doc.text.contains("Plans"));
        assert!(doc.text.contains("Starter costs $10/mo."));
        assert!(doc.text.contains("Free trial available."));
        assert!(!doc.text.contains("analytics"));
        assert!(!doc.text.contains("color: red"));
        assert!(!doc.text.contains("Organization"));
    }

    #[test]
    fn collapses_whitespace() {
        let doc = clean_html("https://acme.com/", 200, "<p>\n  a \t\t b  </p><p>c</p>");
        assert_eq!(doc.text, "a b c");
        assert!(doc.title.is_none());
    }

    #[tokio::test]
    async fn fetch_sends_user_agent() {
        let server = MockServer::start().await;
        let config = FetchConfig::default();

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", config.user_agent.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(PAGE),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&config).unwrap();
        let doc = fetcher.fetch(&format!("{}/", server.uri())).await.unwrap();
        assert_eq!(doc.status, 200);
        assert!(doc.text.contains("Free trial available."));
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        let url = format!("{}/missing", server.uri());
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, ResearchError::Fetch(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn refused_connection_is_fetch_error() {
        // Grab a free port, then close it so nothing is listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        let url = format!("http://127.0.0.1:{port}/");
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, ResearchError::Fetch(_)));
        assert!(err.to_string().contains(&url));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAGE)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = FetchConfig {
            timeout_secs: 1,
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(&config).unwrap();
        let err = fetcher.fetch(&format!("{}/", server.uri())).await.unwrap_err();
        assert!(matches!(err, ResearchError::Fetch(_)));
    }

    #[tokio::test]
    async fn invalid_url_is_fetch_error() {
        let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, ResearchError::Fetch(_)));
    }
}
