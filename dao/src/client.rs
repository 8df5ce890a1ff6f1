use crate::cache::CacheStore;
use crate::errors::DaoError;
use crate::formats::{self, Payload, ResponseFormat};
use crate::http::{BasicAuth, FetchRequest, HttpFetcher, Method};
use crate::metrics_defs::UPSTREAM_REQUESTS;
use shared::counter;
use crate::templates::UrlTemplates;
use shared::wire::url_hash;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-instance request options: URL placeholder values shared across calls,
/// HTTP headers, and an optional basic-auth credential pair. Shape only, no
/// further validation.
#[derive(Debug, Clone, Default)]
pub struct DaoOptions {
    pub params: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub auth: Option<BasicAuth>,
}

/// One DAO instance per external API. Collaborators are constructor-passed:
/// the HTTP fetcher owns the transport, the cache store owns eviction.
pub struct Dao {
    templates: UrlTemplates,
    options: DaoOptions,
    fetcher: Arc<dyn HttpFetcher>,
    cache: Arc<dyn CacheStore>,
}

impl Dao {
    pub fn new(
        templates: UrlTemplates,
        fetcher: Arc<dyn HttpFetcher>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Dao {
            templates,
            options: DaoOptions::default(),
            fetcher,
            cache,
        }
    }

    pub fn set_options(&mut self, options: DaoOptions) {
        self.options = options;
    }

    /// Resolve, assemble, fetch, parse. Issues a POST when `post_data` is
    /// given, a GET otherwise. Assembly failures surface before any network
    /// call is made.
    pub async fn request(
        &self,
        url_key: &str,
        params: &HashMap<String, String>,
        format: ResponseFormat,
        post_data: Option<String>,
    ) -> Result<Payload, DaoError> {
        let url = self.assemble(url_key, params)?;
        self.fetch_and_parse(url, format, post_data).await
    }

    /// Same contract as [`Dao::request`], memoized by the hash of the
    /// assembled URL. HIT and MISS return the same payload shape. The
    /// read-check-then-write is unsynchronized; concurrent callers racing on
    /// one key may both miss and both store.
    pub async fn request_with_cache(
        &self,
        url_key: &str,
        params: &HashMap<String, String>,
        format: ResponseFormat,
        post_data: Option<String>,
    ) -> Result<Payload, DaoError> {
        let url = self.assemble(url_key, params)?;
        let key = url_hash(&url);

        if let Some(payload) = self.cache.get(&key) {
            return Ok(payload);
        }

        let payload = self.fetch_and_parse(url, format, post_data).await?;
        self.cache.insert(&key, payload.clone());

        Ok(payload)
    }

    fn assemble(
        &self,
        url_key: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, DaoError> {
        // Call-specific params win over instance defaults
        let mut merged = self.options.params.clone();
        merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));

        self.templates.assemble(url_key, &merged)
    }

    async fn fetch_and_parse(
        &self,
        url: String,
        format: ResponseFormat,
        post_data: Option<String>,
    ) -> Result<Payload, DaoError> {
        let method = if post_data.is_some() {
            Method::Post
        } else {
            Method::Get
        };

        let request = FetchRequest {
            method,
            url,
            headers: self
                .options
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            auth: self.options.auth.clone(),
            body: post_data,
        };

        counter!(UPSTREAM_REQUESTS).increment(1);
        tracing::debug!(url = %request.url, method = ?request.method, "issuing upstream request");
        let response = self.fetcher.send(request).await?;

        if !(200..300).contains(&response.status) {
            return Err(DaoError::UpstreamStatus {
                status: response.status,
                message: response.body,
            });
        }

        formats::parse(format, &response.body)
    }
}
