//! HTTP surface of the range query service.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use aurum_store::SeriesStore;
use aurum_types::{AurumError, Resolution};
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::{DEFAULT_LOOKBACK, QueryResult, RangeQueryService, lookback_from_hours};

/// Error returned by HTTP handlers, rendered as `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError(pub AurumError);

impl From<AurumError> for ApiError {
    fn from(e: AurumError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = %self.0, "query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Query string of `GET /candles`.
#[derive(Debug, Default, Deserialize)]
pub struct CandleParams {
    /// `1min`, `5min` or `1h`; defaults to `1min`.
    #[serde(default)]
    pub timeframe: Option<String>,
    /// Lookback in whole hours; defaults to 24.
    #[serde(default)]
    pub hours: Option<String>,
}

/// Handles `GET /candles`.
///
/// # Errors
///
/// Returns a 400 response for a malformed query string or a bad
/// `timeframe` or `hours`, and a 500 response if the store read fails.
pub async fn get_candles<S: SeriesStore + 'static>(
    State(service): State<Arc<RangeQueryService<S>>>,
    params: Result<Query<CandleParams>, QueryRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Query(params) =
        params.map_err(|rejection| AurumError::InvalidArgument(rejection.body_text()))?;

    let lookback = match params.hours.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_LOOKBACK,
        Some(raw) => {
            let hours = raw.parse::<u32>().map_err(|_| {
                AurumError::InvalidArgument(format!(
                    "hours must be a positive integer, got '{raw}'"
                ))
            })?;
            lookback_from_hours(hours)?
        }
    };

    let timeframe = params
        .timeframe
        .as_deref()
        .unwrap_or_else(|| Resolution::Minute1.as_str());

    Ok(Json(service.query_range(timeframe, lookback).await?))
}

/// Handles `GET /health`.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the router serving `/candles` and `/health`.
pub fn router<S: SeriesStore + 'static>(service: Arc<RangeQueryService<S>>) -> Router {
    Router::new()
        .route("/candles", get(get_candles::<S>))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Serves the query endpoint on `addr` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve<S: SeriesStore + 'static>(
    service: Arc<RangeQueryService<S>>,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "query endpoint listening");
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use aurum_store::{MemoryStore, StoreError};
    use aurum_types::{Candle, DEFAULT_RETENTION, DEFAULT_SYMBOL, TimeKey};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{DateTime, Utc};
    use tower::ServiceExt;

    struct DownStore;

    #[async_trait]
    impl SeriesStore for DownStore {
        async fn put(&self, _candle: &Candle) -> aurum_store::Result<()> {
            Ok(())
        }

        async fn query(
            &self,
            _resolution: Resolution,
            _start: &TimeKey,
            _end: &TimeKey,
        ) -> aurum_store::Result<Vec<Candle>> {
            Err(StoreError::ReadDir {
                path: "series".into(),
                source: std::io::Error::other("disk unavailable"),
            })
        }

        async fn purge_expired(&self, _now: DateTime<Utc>) -> aurum_store::Result<usize> {
            Ok(0)
        }
    }

    fn params(
        timeframe: Option<&str>,
        hours: Option<&str>,
    ) -> Result<Query<CandleParams>, QueryRejection> {
        Ok(Query(CandleParams {
            timeframe: timeframe.map(str::to_string),
            hours: hours.map(str::to_string),
        }))
    }

    async fn send(uri: &str) -> (StatusCode, Value) {
        let app = router(Arc::new(RangeQueryService::new(MemoryStore::new())));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_defaults_to_one_minute() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .put(&Candle::new(
                now - chrono::TimeDelta::minutes(2),
                Resolution::Minute1,
                DEFAULT_SYMBOL,
                1.0,
                2.0,
                0.5,
                1.5,
                3.0,
                DEFAULT_RETENTION,
            ))
            .await
            .unwrap();
        let service = Arc::new(RangeQueryService::new(store));

        let Json(result) = get_candles(State(service), params(None, None))
            .await
            .unwrap();
        assert_eq!(result.timeframe, Resolution::Minute1);
        assert_eq!(result.count, 1);
    }

    #[tokio::test]
    async fn test_bad_parameters_are_client_errors() {
        let service = Arc::new(RangeQueryService::new(MemoryStore::new()));

        for (timeframe, hours) in [
            (Some("2min"), None),
            (Some("5MIN"), None),
            (Some(" 1h"), None),
            (Some("1h"), Some("0")),
            (Some("1h"), Some("-3")),
            (None, Some("abc")),
        ] {
            let err = get_candles(State(Arc::clone(&service)), params(timeframe, hours))
                .await
                .unwrap_err();
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let service = Arc::new(RangeQueryService::new(DownStore));
        let err = get_candles(State(service), params(Some("5min"), Some("1")))
            .await
            .unwrap_err();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_router_rejections_are_json() {
        for uri in [
            "/candles?timeframe=2min",
            "/candles?timeframe=5MIN",
            "/candles?hours=0",
            "/candles?hours=1&hours=2",
        ] {
            let (status, body) = send(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}: {body}");
        }
    }

    #[tokio::test]
    async fn test_router_serves_empty_range() {
        let (status, body) = send("/candles?timeframe=5min&hours=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timeframe"], "5min");
        assert_eq!(body["count"], 0);
    }
}
