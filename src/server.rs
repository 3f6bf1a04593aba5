// Copyright 2025 The Delivery Exporter Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The exporter HTTP server: `/health` and `/metrics`.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use lazy_static::lazy_static;
use log::{error, info};
use tower_http::cors::CorsLayer;

use crate::config::{ConstructError, EnvConfig, Field, ResolvedValues, Schema};
use crate::metrics::ExporterMetrics;

/// Content type for the Prometheus text exposition format.
const OPENMETRICS_CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Listener settings and collection cadence, loaded from the environment like
/// every other configuration in this crate.
#[derive(Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds between collection cycles.
    pub collection_interval: u64,
}

impl EnvConfig for ServerConfig {
    fn schema() -> &'static Schema {
        lazy_static! {
            static ref SCHEMA: Schema = Schema::builder("ServerConfig")
                .field(Field::text("host").env_lookups(["EXPORTER_HOST"]).default("0.0.0.0"))
                .field(Field::int("port").env_lookups(["EXPORTER_PORT"]).default(8080_i64))
                .field(
                    Field::int("collection_interval")
                        .env_lookups(["COLLECTION_INTERVAL"])
                        .default(60_i64)
                )
                .build()
                .expect("invalid ServerConfig schema");
        }
        &SCHEMA
    }

    fn from_values(values: &mut ResolvedValues) -> Result<Self, ConstructError> {
        let host = values.take_text("host")?;

        let port = values.take_int("port")?;
        let port = u16::try_from(port).map_err(|_| ConstructError::Invalid {
            field: "port".into(),
            reason: format!("{port} is not a valid TCP port"),
        })?;

        let collection_interval = values.take_int("collection_interval")?;
        if collection_interval < 1 {
            return Err(ConstructError::Invalid {
                field: "collection_interval".into(),
                reason: format!("{collection_interval} must be at least 1 second"),
            });
        }

        Ok(Self {
            host,
            port,
            collection_interval: collection_interval as u64,
        })
    }
}

pub struct ExporterServer {
    host: String,
    port: u16,
    metrics: Arc<ExporterMetrics>,
}

impl ExporterServer {
    pub fn new(host: impl Into<String>, port: u16, metrics: Arc<ExporterMetrics>) -> Self {
        Self {
            host: host.into(),
            port,
            metrics,
        }
    }

    /// Build the application router. Separated from [`run`](Self::run) so
    /// tests can exercise it without binding a socket.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/metrics", get(serve_metrics))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.metrics))
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let app = self.router();

        info!("Serving metrics on http://{addr}/metrics");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy"}))
}

async fn serve_metrics(State(metrics): State<Arc<ExporterMetrics>>) -> Response {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "encoding error").into_response()
        }
    }
}
