//! DAO for Splunk-style search APIs.
//!
//! Declares two fetch operations: `search` runs an ad-hoc query, and
//! `saved_search` runs a search stored on the server. Both go through the
//! payload cache so identical tile refreshes within the TTL share one
//! upstream call.

use crate::client::Dao;
use crate::errors::DaoError;
use crate::formats::{Payload, ResponseFormat};
use crate::registry::{DataSource, fetch_not_implemented};
use async_trait::async_trait;
use std::collections::HashMap;

pub struct SearchDao {
    dao: Dao,
}

impl SearchDao {
    pub const OPERATIONS: &'static [&'static str] = &["search", "saved_search"];

    /// URL template keys this DAO expects in its configuration.
    pub const URL_KEYS: &'static [&'static str] = Self::OPERATIONS;

    pub fn new(dao: Dao) -> Self {
        SearchDao { dao }
    }

    pub async fn search(&self, params: &HashMap<String, String>) -> Result<Payload, DaoError> {
        self.dao
            .request_with_cache("search", params, ResponseFormat::Json, None)
            .await
    }

    pub async fn saved_search(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<Payload, DaoError> {
        self.dao
            .request_with_cache("saved_search", params, ResponseFormat::Json, None)
            .await
    }
}

#[async_trait]
impl DataSource for SearchDao {
    fn name(&self) -> &'static str {
        "SearchDao"
    }

    fn operations(&self) -> &'static [&'static str] {
        Self::OPERATIONS
    }

    async fn fetch(
        &self,
        operation: &str,
        params: &HashMap<String, String>,
    ) -> Result<Payload, DaoError> {
        match operation {
            "search" => self.search(params).await,
            "saved_search" => self.saved_search(params).await,
            other => Err(fetch_not_implemented(other, self.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MokaCache;
    use crate::http::ReqwestFetcher;
    use crate::templates::UrlTemplates;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_search_dao(base: &str) -> SearchDao {
        let templates = UrlTemplates::new(HashMap::from([
            (
                "search".to_string(),
                format!("{base}/services/search?q=:query:"),
            ),
            (
                "saved_search".to_string(),
                format!("{base}/services/saved/:name:/results"),
            ),
        ]));
        SearchDao::new(Dao::new(
            templates,
            Arc::new(ReqwestFetcher::new()),
            Arc::new(MokaCache::default()),
        ))
    }

    #[tokio::test]
    async fn test_search_operation() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"count": 12}"#))
            .mount(&server)
            .await;

        let dao = make_search_dao(&server.uri());
        let payload = dao
            .fetch(
                "search",
                &HashMap::from([("query".to_string(), "errors".to_string())]),
            )
            .await
            .unwrap();

        assert_eq!(payload, Payload::Json(json!({"count": 12})));
    }

    #[tokio::test]
    async fn test_saved_search_operation() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/saved/daily-errors/results"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"count": 3}"#))
            .expect(1)
            .mount(&server)
            .await;

        let dao = make_search_dao(&server.uri());
        let params = HashMap::from([("name".to_string(), "daily-errors".to_string())]);

        dao.fetch("saved_search", &params).await.unwrap();
        // Second identical call is served from the cache
        dao.fetch("saved_search", &params).await.unwrap();
    }

    #[tokio::test]
    async fn test_undeclared_operation() {
        let dao = make_search_dao("http://127.0.0.1:1");
        let err = dao.fetch("alerts", &HashMap::new()).await.unwrap_err();

        assert!(matches!(
            err,
            DaoError::FetchNotImplemented { ref method, ref dao_type }
                if method == "alerts" && dao_type == "SearchDao"
        ));
    }
}
