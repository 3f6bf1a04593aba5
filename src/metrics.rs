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

//! Prometheus metric families for the delivery exporters.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::atomic::AtomicU64;

use crate::exporters::{CommitMetric, DeployMetric};

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CommitLabels {
    pub namespace: String,
    pub app: String,
    pub commit: String,
    pub image_sha: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DeployLabels {
    pub namespace: String,
    pub app: String,
    pub image_sha: String,
}

/// The registry and gauge families served at `/metrics`.
#[derive(Debug)]
pub struct ExporterMetrics {
    registry: Registry,
    commit_timestamp: Family<CommitLabels, Gauge<f64, AtomicU64>>,
    deploy_timestamp: Family<DeployLabels, Gauge<f64, AtomicU64>>,
}

impl ExporterMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let commit_timestamp = Family::<CommitLabels, Gauge<f64, AtomicU64>>::default();
        registry.register(
            "commit_timestamp",
            "Commit timestamp of a built image, in seconds since the epoch",
            commit_timestamp.clone(),
        );

        let deploy_timestamp = Family::<DeployLabels, Gauge<f64, AtomicU64>>::default();
        registry.register(
            "deploy_timestamp",
            "Deployment timestamp of a running image, in seconds since the epoch",
            deploy_timestamp.clone(),
        );

        Self {
            registry,
            commit_timestamp,
            deploy_timestamp,
        }
    }

    pub fn record_commit(&self, metric: &CommitMetric) {
        self.commit_timestamp
            .get_or_create(&CommitLabels {
                namespace: metric.namespace.clone(),
                app: metric.app.clone(),
                commit: metric.commit_hash.clone(),
                image_sha: metric.image_sha.clone(),
            })
            .set(metric.commit_time.timestamp() as f64);
    }

    pub fn record_deploy(&self, metric: &DeployMetric) {
        self.deploy_timestamp
            .get_or_create(&DeployLabels {
                namespace: metric.namespace.clone(),
                app: metric.app.clone(),
                image_sha: metric.image_sha.clone(),
            })
            .set(metric.deploy_time.timestamp() as f64);
    }

    /// Encode the registry in Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

impl Default for ExporterMetrics {
    fn default() -> Self {
        Self::new()
    }
}
