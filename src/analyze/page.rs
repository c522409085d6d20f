// src/analyze/page.rs
// =============================================================================
// The page analyzer: fetch a page through a site session, extract its
// surface, optionally POST the discovered fields back, and build a PageRecord.
//
// Nothing fails past this point. A page that cannot be fetched is logged and
// comes back as None; a POST that fails leaves its error text in the record.
// =============================================================================

use log::{debug, warn};

use super::html::{extract_surface, InputPolicy, PageSurface};
use super::records::PageRecord;
use crate::config::CrawlConfig;
use crate::crawl::{FetchedPage, Session};

#[derive(Debug, Clone)]
pub struct PageAnalyzer {
    policy: InputPolicy,
    submit_forms: bool,
    post_excerpt_len: usize,
}

/// A record together with the links found on its page
#[derive(Debug, Clone)]
pub struct AnalyzedPage {
    pub record: PageRecord,
    pub links: Vec<String>,
}

impl PageAnalyzer {
    pub fn new(config: &CrawlConfig) -> Self {
        PageAnalyzer {
            policy: InputPolicy {
                exclude_button_inputs: config.exclude_button_inputs,
            },
            submit_forms: config.submit_forms,
            post_excerpt_len: config.post_excerpt_len,
        }
    }

    /// Fetch and analyze one URL; None when the page is unavailable
    pub async fn analyze_page(&self, session: &Session, url: &str) -> Option<PageRecord> {
        match session.get(url).await {
            Ok(page) => Some(self.analyze_fetched(session, page, None).await.record),
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                None
            }
        }
    }

    /// Analyze a page that has already been fetched
    ///
    /// With no `link_prefix`, links resolve against and must start with the
    /// URL we asked for. With one, links resolve against wherever the page
    /// was finally served from and must start with the prefix.
    pub async fn analyze_fetched(
        &self,
        session: &Session,
        page: FetchedPage,
        link_prefix: Option<&str>,
    ) -> AnalyzedPage {
        let link_base = match link_prefix {
            Some(_) => page.final_url.as_str(),
            None => page.url.as_str(),
        };
        let PageSurface {
            input_tags,
            forms,
            form_data,
            csrf_token,
            links,
        } = extract_surface(&page.body, link_base, link_prefix, self.policy);

        let post_response = if self.submit_forms && !form_data.is_empty() {
            debug!("POSTing {} field(s) to {}", form_data.len(), page.url);
            Some(match session.post_form(&page.url, &form_data).await {
                Ok(body) => body.chars().take(self.post_excerpt_len).collect(),
                Err(e) => format!("POST request failed: {}", e),
            })
        } else {
            None
        };

        let record = PageRecord {
            cookies: session.cookies(),
            url: page.url,
            input_tags,
            forms,
            form_data,
            csrf_token,
            post_response,
        };

        AnalyzedPage { record, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> CrawlConfig {
        CrawlConfig {
            request_delay: Duration::ZERO,
            retry_limit: 0,
            ..CrawlConfig::default()
        }
    }

    #[tokio::test]
    async fn test_form_page_is_posted_and_truncated() {
        let server = MockServer::start().await;
        let html = r#"
            <meta name="csrf-token" content="T">
            <form method="post"><input name="q" value="x"><input type="submit"></form>
        "#;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(html)
                    .insert_header("set-cookie", "sid=1; Path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_string_contains("csrf_token=T"))
            .respond_with(ResponseTemplate::new(200).set_body_string("é".repeat(800)))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::new(&config()).unwrap();
        let analyzer = PageAnalyzer::new(&config());
        let url = format!("{}/search", server.uri());
        let record = analyzer.analyze_page(&session, &url).await.unwrap();

        assert_eq!(record.url, url);
        assert_eq!(record.csrf_token.as_deref(), Some("T"));
        assert_eq!(record.form_data["csrf_token"], "T");
        assert_eq!(record.form_data["q"], "x");
        assert_eq!(record.input_tags.len(), 1);
        assert_eq!(record.cookies, vec!["sid=1"]);
        assert_eq!(record.post_response.unwrap().chars().count(), 500);
    }

    #[tokio::test]
    async fn test_page_without_fields_is_not_posted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>static</p>"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = Session::new(&config()).unwrap();
        let record = PageAnalyzer::new(&config())
            .analyze_page(&session, &server.uri())
            .await
            .unwrap();
        assert!(record.form_data.is_empty());
        assert_eq!(record.post_response, None);
    }

    #[tokio::test]
    async fn test_submission_can_be_disabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<input name="q">"#))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = CrawlConfig {
            submit_forms: false,
            ..config()
        };
        let session = Session::new(&config).unwrap();
        let record = PageAnalyzer::new(&config)
            .analyze_page(&session, &server.uri())
            .await
            .unwrap();
        assert_eq!(record.form_data["q"], "test_value");
        assert_eq!(record.post_response, None);
    }

    #[tokio::test]
    async fn test_record_lists_cookies_set_for_other_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/login"))
            .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "adm=1; Path=/admin"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>home</p>"))
            .mount(&server)
            .await;

        let session = Session::new(&config()).unwrap();
        let analyzer = PageAnalyzer::new(&config());
        analyzer
            .analyze_page(&session, &format!("{}/admin/login", server.uri()))
            .await
            .unwrap();
        let record = analyzer
            .analyze_page(&session, &format!("{}/", server.uri()))
            .await
            .unwrap();
        assert_eq!(record.cookies, vec!["adm=1"]);
    }

    #[tokio::test]
    async fn test_unavailable_page_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let session = Session::new(&config()).unwrap();
        let analyzer = PageAnalyzer::new(&config());
        assert!(analyzer.analyze_page(&session, &server.uri()).await.is_none());
    }
}
