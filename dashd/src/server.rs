//! The widget-data endpoint.
//!
//! `GET /widgets/{config_name}/{widget_id}[/{old_hash}]` dispatches the
//! widget's configured source operation through the DAO registry, injects
//! the payload fingerprint, and short-circuits the body to the hash alone
//! when the caller already has the current data.

use crate::config::{Config, Listener, SourceKind, WidgetConfig};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use dao::{
    BasicAuth, Dao, DaoError, DaoOptions, MokaCache, Payload, Registry, ReqwestFetcher,
    SearchDao, UrlTemplates,
};
use serde_json::{Map, Value, json};
use shared::wire::{ErrorEnvelope, HASH_FIELD, payload_hash};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(thiserror::Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct AppState {
    registry: Registry,
    widgets: HashMap<String, WidgetConfig>,
}

impl AppState {
    pub fn new(registry: Registry, widgets: HashMap<String, WidgetConfig>) -> Self {
        AppState { registry, widgets }
    }

    /// Wires one DAO per configured source. The fetcher and payload cache
    /// are shared across sources.
    pub fn from_config(config: Config) -> Self {
        let fetcher = Arc::new(ReqwestFetcher::new());
        let cache = Arc::new(MokaCache::new(
            config.cache.capacity,
            Duration::from_secs(config.cache.ttl_secs),
        ));

        let mut registry = Registry::new();
        for (name, source) in &config.sources {
            let mut dao = Dao::new(
                UrlTemplates::new(source.urls.clone()),
                fetcher.clone(),
                cache.clone(),
            );
            dao.set_options(DaoOptions {
                params: source.params.clone(),
                headers: source.headers.clone(),
                auth: source.auth.as_ref().map(|auth| BasicAuth {
                    username: auth.username.clone(),
                    password: auth.password.clone(),
                }),
            });

            match source.kind {
                SourceKind::Search => registry.insert(name.clone(), Arc::new(SearchDao::new(dao))),
            }
        }

        AppState::new(registry, config.widgets)
    }

    /// Produces the JSON body for one widget poll.
    async fn widget_payload(
        &self,
        config_name: &str,
        old_hash: Option<&str>,
    ) -> Result<Value, ApiError> {
        let widget = self
            .widgets
            .get(config_name)
            .ok_or_else(|| ApiError::UnknownWidget(config_name.to_string()))?;

        let payload = self
            .registry
            .fetch(&widget.source, &widget.operation, &widget.query_params)
            .await?;

        let mut fields = normalize(payload);
        let hash = payload_hash(&Value::Object(fields.clone()));

        if old_hash == Some(hash.as_str()) {
            return Ok(json!({ HASH_FIELD: hash }));
        }

        fields.insert(HASH_FIELD.to_string(), Value::String(hash));
        Ok(Value::Object(fields))
    }
}

/// Widget payloads are JSON objects on the wire. Object payloads pass
/// through; anything else is wrapped under a `value` field.
fn normalize(payload: Payload) -> Map<String, Value> {
    let value = match payload {
        Payload::Json(value) => value,
        Payload::Raw(body) => Value::String(body),
        Payload::Xml(root) => Value::String(root.text),
    };

    match value {
        Value::Object(fields) => fields,
        other => {
            let mut fields = Map::new();
            fields.insert("value".to_string(), other);
            fields
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum ApiError {
    #[error("no widget configured under name: {0}")]
    UnknownWidget(String),

    #[error(transparent)]
    Dao(#[from] DaoError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownWidget(_) => StatusCode::NOT_FOUND,
            ApiError::Dao(DaoError::SourceNotConfigured(_)) => StatusCode::NOT_FOUND,
            ApiError::Dao(DaoError::FetchNotImplemented { .. }) => StatusCode::NOT_IMPLEMENTED,
            ApiError::Dao(DaoError::UpstreamStatus { .. }) | ApiError::Dao(DaoError::Transport(_)) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Dao(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ApiError::UnknownWidget(_) => "UnknownWidget",
            ApiError::Dao(DaoError::EndpointUrlNotDefined { .. }) => "EndpointUrlNotDefined",
            ApiError::Dao(DaoError::EndpointUrlNotAssembled { .. }) => "EndpointUrlNotAssembled",
            ApiError::Dao(DaoError::FetchNotImplemented { .. }) => "FetchNotImplemented",
            ApiError::Dao(DaoError::SourceNotConfigured(_)) => "SourceNotConfigured",
            ApiError::Dao(DaoError::UpstreamStatus { .. }) | ApiError::Dao(DaoError::Transport(_)) => {
                "Transport"
            }
            ApiError::Dao(DaoError::ParseFailed { .. }) => "ParseFailed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorEnvelope::new(self.to_string(), self.type_name()));
        (self.status(), body).into_response()
    }
}

pub async fn serve(listener: &Listener, state: AppState) -> Result<(), ServeError> {
    let app = router(Arc::new(state));
    let addr = format!("{}:{}", listener.host, listener.port);

    tracing::info!(%addr, "serving widget endpoint");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/widgets/{config_name}/{widget_id}", get(widget_handler))
        .route(
            "/widgets/{config_name}/{widget_id}/{old_hash}",
            get(widget_handler_with_hash),
        )
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn widget_handler(
    State(state): State<Arc<AppState>>,
    Path((config_name, widget_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    respond(&state, &config_name, &widget_id, None).await
}

async fn widget_handler_with_hash(
    State(state): State<Arc<AppState>>,
    Path((config_name, widget_id, old_hash)): Path<(String, String, String)>,
) -> Result<Json<Value>, ApiError> {
    respond(&state, &config_name, &widget_id, Some(&old_hash)).await
}

async fn respond(
    state: &AppState,
    config_name: &str,
    widget_id: &str,
    old_hash: Option<&str>,
) -> Result<Json<Value>, ApiError> {
    match state.widget_payload(config_name, old_hash).await {
        Ok(value) => Ok(Json(value)),
        Err(err) => {
            tracing::error!(%config_name, %widget_id, error = %err, "widget fetch failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use async_trait::async_trait;
    use dao::DataSource;
    use dao::registry::fetch_not_implemented;

    struct StubSource;

    #[async_trait]
    impl DataSource for StubSource {
        fn name(&self) -> &'static str {
            "StubSource"
        }

        fn operations(&self) -> &'static [&'static str] {
            &["counts"]
        }

        async fn fetch(
            &self,
            operation: &str,
            _params: &HashMap<String, String>,
        ) -> Result<Payload, DaoError> {
            match operation {
                "counts" => Ok(Payload::Json(json!({"count": 42}))),
                other => Err(fetch_not_implemented(other, self.name())),
            }
        }
    }

    fn widget_config(operation: &str) -> WidgetConfig {
        serde_yaml::from_str(&format!(
            "source: stub\noperation: {operation}\n"
        ))
        .unwrap()
    }

    fn make_state(operation: &str) -> AppState {
        let mut registry = Registry::new();
        registry.insert("stub", Arc::new(StubSource));

        AppState::new(
            registry,
            HashMap::from([("error-count".to_string(), widget_config(operation))]),
        )
    }

    #[tokio::test]
    async fn test_payload_carries_hash_and_fields() {
        let state = make_state("counts");
        let value = state.widget_payload("error-count", None).await.unwrap();

        assert_eq!(value["count"], 42);
        assert!(value[HASH_FIELD].is_string());
    }

    #[tokio::test]
    async fn test_matching_hash_short_circuits_body() {
        let state = make_state("counts");

        let first = state.widget_payload("error-count", None).await.unwrap();
        let hash = first[HASH_FIELD].as_str().unwrap().to_string();

        let second = state
            .widget_payload("error-count", Some(&hash))
            .await
            .unwrap();

        assert_eq!(second, json!({ HASH_FIELD: hash }));
    }

    #[tokio::test]
    async fn test_stale_hash_returns_full_payload() {
        let state = make_state("counts");
        let value = state
            .widget_payload("error-count", Some("stale"))
            .await
            .unwrap();

        assert_eq!(value["count"], 42);
    }

    #[tokio::test]
    async fn test_unknown_widget_is_404() {
        let state = make_state("counts");
        let err = state.widget_payload("nope", None).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.type_name(), "UnknownWidget");
    }

    #[tokio::test]
    async fn test_undeclared_operation_is_501() {
        let state = make_state("alerts");
        let err = state.widget_payload("error-count", None).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(err.type_name(), "FetchNotImplemented");
    }

    #[test]
    fn test_error_envelope_wire_shape() {
        let err = ApiError::UnknownWidget("nope".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_normalize_wraps_scalars() {
        let fields = normalize(Payload::Raw("97%".to_string()));
        assert_eq!(fields["value"], "97%");

        let fields = normalize(Payload::Json(json!([1, 2])));
        assert_eq!(fields["value"], json!([1, 2]));
    }
}
