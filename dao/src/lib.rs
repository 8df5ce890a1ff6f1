//! Data-access objects for external monitoring APIs.
//!
//! A `Dao` resolves a logical fetch name to a configured URL template,
//! substitutes `:name:` placeholders, issues the HTTP request through an
//! injected [`HttpFetcher`], parses the body per [`ResponseFormat`], and can
//! memoize parsed payloads in an injected [`CacheStore`] keyed by the
//! assembled URL.
//!
//! Concrete DAO types declare the fetch operations they support via
//! [`DataSource`]; dispatching an undeclared operation fails with
//! [`DaoError::FetchNotImplemented`].

pub mod cache;
pub mod client;
pub mod errors;
pub mod formats;
pub mod http;
pub mod metrics_defs;
pub mod registry;
pub mod search;
pub mod templates;

pub use cache::{CacheStore, MokaCache};
pub use client::{Dao, DaoOptions};
pub use errors::DaoError;
pub use formats::{Payload, ResponseFormat, XmlElement};
pub use http::{BasicAuth, FetchRequest, FetchResponse, HttpFetcher, Method, ReqwestFetcher};
pub use registry::{DataSource, Registry};
pub use search::SearchDao;
pub use templates::UrlTemplates;
