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

//! The deploy-time exporter: when did each running image start serving?

use std::collections::BTreeSet;

use chrono::Utc;
use lazy_static::lazy_static;

use super::{Collector, DeployMetric, DEFAULT_APP_LABEL};
use crate::config::{ConstructError, EnvConfig, Field, ResolvedValues, Schema, Value};
use crate::metrics::ExporterMetrics;

#[derive(Debug)]
pub struct DeployTimeConfig {
    /// Namespaces to watch; empty means all of them.
    pub namespaces: BTreeSet<String>,
    /// Workload label naming the application.
    pub app_label: String,
    /// Label marking production workloads; empty disables the filter.
    pub prod_label: String,
}

impl EnvConfig for DeployTimeConfig {
    fn schema() -> &'static Schema {
        lazy_static! {
            static ref SCHEMA: Schema = Schema::builder("DeployTimeConfig")
                .field(Field::set("namespaces").default_factory(|| Value::Set(Default::default())))
                .field(Field::text("app_label").default(DEFAULT_APP_LABEL))
                .field(Field::text("prod_label").default(""))
                .build()
                .expect("invalid DeployTimeConfig schema");
        }
        &SCHEMA
    }

    fn from_values(values: &mut ResolvedValues) -> Result<Self, ConstructError> {
        Ok(Self {
            namespaces: values.take_set("namespaces")?,
            app_label: values.take_text("app_label")?,
            prod_label: values.take_text("prod_label")?,
        })
    }
}

/// In-memory deployment source emitting a fixed set of sample records.
pub struct MockDeployCollector {
    deploys: Vec<DeployMetric>,
}

impl MockDeployCollector {
    pub fn from_config(config: &DeployTimeConfig) -> Self {
        let namespaces: Vec<String> = if config.namespaces.is_empty() {
            vec!["default".to_owned()]
        } else {
            config.namespaces.iter().cloned().collect()
        };

        let now = Utc::now();
        let deploys = namespaces
            .iter()
            .enumerate()
            .map(|(i, namespace)| DeployMetric {
                app: format!("sample-app-{i}"),
                namespace: namespace.clone(),
                image_sha: format!("sha256:{i:064x}"),
                deploy_time: now,
            })
            .collect();

        Self { deploys }
    }

    pub fn with_deploys(deploys: Vec<DeployMetric>) -> Self {
        Self { deploys }
    }
}

impl Collector for MockDeployCollector {
    fn name(&self) -> &str {
        "mock-deploytime"
    }

    fn collect(&self, metrics: &ExporterMetrics) -> anyhow::Result<usize> {
        for deploy in &self.deploys {
            metrics.record_deploy(deploy);
        }
        Ok(self.deploys.len())
    }
}
