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

//! Delivery metric records and the collector seam.
//!
//! A [`Collector`] produces delivery records each cycle and records them into
//! the metric families. The built-in collectors are in-memory mock sources;
//! real VCS or platform clients are injected by embedding applications,
//! typically through the configuration override map.

pub mod committime;
pub mod deploytime;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;

use crate::metrics::ExporterMetrics;

/// Git providers recognized by the commit-time exporter.
pub const GIT_PROVIDER_TYPES: [&str; 5] = ["github", "bitbucket", "gitea", "azure-devops", "gitlab"];

pub const DEFAULT_GIT_PROVIDER: &str = "github";

/// Workload label carrying the application name.
pub const DEFAULT_APP_LABEL: &str = "app.kubernetes.io/name";

/// A source-control commit attached to a built image.
#[derive(Debug, Clone, Serialize)]
pub struct CommitMetric {
    pub app: String,
    pub namespace: String,
    pub commit_hash: String,
    pub image_sha: String,
    pub commit_time: DateTime<Utc>,
}

/// A running deployment of a built image.
#[derive(Debug, Clone, Serialize)]
pub struct DeployMetric {
    pub app: String,
    pub namespace: String,
    pub image_sha: String,
    pub deploy_time: DateTime<Utc>,
}

/// One scrape cycle's worth of collection.
pub trait Collector: Send + Sync {
    fn name(&self) -> &str;

    /// Record the current delivery state into `metrics`, returning how many
    /// records were observed.
    fn collect(&self, metrics: &ExporterMetrics) -> anyhow::Result<usize>;
}

/// Drive `collector` on a fixed period until the task is dropped. Collection
/// failures are logged and the loop keeps going; a transient provider outage
/// should not kill the exporter.
pub async fn run_collection_loop(
    collector: Arc<dyn Collector>,
    metrics: Arc<ExporterMetrics>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        match collector.collect(&metrics) {
            Ok(count) => debug!("{} collected {count} records", collector.name()),
            Err(e) => warn!("{} collection failed: {e:#}", collector.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flaky;

    impl Collector for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn collect(&self, _metrics: &ExporterMetrics) -> anyhow::Result<usize> {
            anyhow::bail!("provider unavailable")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn collection_loop_survives_failures() {
        let metrics = Arc::new(ExporterMetrics::new());
        let handle = tokio::spawn(run_collection_loop(
            Arc::new(Flaky),
            metrics,
            Duration::from_secs(1),
        ));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
