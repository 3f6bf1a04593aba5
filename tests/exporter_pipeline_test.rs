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

//! Integration tests for the config-to-metrics pipeline.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serial_test::serial;
use tower::ServiceExt;

use delivery_exporter::config::{load, EnvSnapshot, Overrides};
use delivery_exporter::exporters::committime::{CommitTimeConfig, MockCommitCollector};
use delivery_exporter::exporters::Collector;
use delivery_exporter::{ExporterMetrics, ExporterServer};

#[tokio::test]
async fn commit_config_drives_the_metrics_endpoint() {
    let env = EnvSnapshot::from([
        ("API_USER", "builder"),
        ("TOKEN", "t0k3n"),
        ("NAMESPACES", "dev,prod"),
    ]);
    let config = load::<CommitTimeConfig>(&env, &Overrides::new()).unwrap();

    let metrics = Arc::new(ExporterMetrics::new());
    MockCommitCollector::from_config(&config)
        .collect(&metrics)
        .unwrap();

    let app = ExporterServer::new("127.0.0.1", 0, metrics).router();
    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("commit_timestamp"));
    assert!(body.contains("namespace=\"dev\""));
    assert!(body.contains("namespace=\"prod\""));
    // The token never reaches the exposition.
    assert!(!body.contains("t0k3n"));
}

#[test]
#[serial]
fn os_environment_snapshot_feeds_the_loader() {
    std::env::set_var("GIT_API", "https://git.example.com/api");
    std::env::set_var("GIT_PROVIDER", "gitea");

    let env = EnvSnapshot::from_os();
    let config = load::<CommitTimeConfig>(&env, &Overrides::new()).unwrap();
    assert_eq!(config.git_api, "https://git.example.com/api");
    assert_eq!(config.git_provider, "gitea");

    std::env::remove_var("GIT_API");
    std::env::remove_var("GIT_PROVIDER");
}

#[test]
#[serial]
fn snapshot_is_immutable_once_taken() {
    std::env::set_var("GIT_API", "https://before.example.com");
    let env = EnvSnapshot::from_os();
    std::env::set_var("GIT_API", "https://after.example.com");

    assert_eq!(env.get("GIT_API"), Some("https://before.example.com"));

    std::env::remove_var("GIT_API");
}
