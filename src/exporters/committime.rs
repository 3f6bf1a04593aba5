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

//! The commit-time exporter: when was the commit behind each built image
//! authored?

use std::collections::BTreeSet;
use std::fmt;

use chrono::Utc;
use lazy_static::lazy_static;
use log::warn;

use super::{Collector, CommitMetric, DEFAULT_GIT_PROVIDER, GIT_PROVIDER_TYPES};
use crate::config::{ConstructError, EnvConfig, Field, ResolvedValues, Schema, Value};
use crate::metrics::ExporterMetrics;

pub struct CommitTimeConfig {
    pub username: String,
    pub token: String,
    pub namespaces: BTreeSet<String>,
    pub git_api: String,
    pub git_provider: String,
    pub tls_verify: bool,
}

impl EnvConfig for CommitTimeConfig {
    fn schema() -> &'static Schema {
        lazy_static! {
            static ref SCHEMA: Schema = Schema::builder("CommitTimeConfig")
                .field(
                    Field::text("username")
                        .env_lookups(["API_USER", "GITHUB_USER", "GIT_USER"])
                        .default("")
                )
                .field(
                    Field::text("token")
                        .env_lookups(["TOKEN", "GIT_TOKEN", "GITHUB_TOKEN"])
                        .default("")
                )
                .field(Field::set("namespaces").default_factory(|| Value::Set(Default::default())))
                .field(
                    Field::text("git_api")
                        .env_lookups(["GIT_API", "GITHUB_API"])
                        .default("")
                )
                .field(Field::text("git_provider").default(DEFAULT_GIT_PROVIDER))
                .field(Field::bool("tls_verify").default(true))
                .build()
                .expect("invalid CommitTimeConfig schema");
        }
        &SCHEMA
    }

    fn from_values(values: &mut ResolvedValues) -> Result<Self, ConstructError> {
        let mut config = Self {
            username: values.take_text("username")?,
            token: values.take_text("token")?,
            namespaces: values.take_set("namespaces")?,
            git_api: values.take_text("git_api")?,
            git_provider: values.take_text("git_provider")?,
            tls_verify: values.take_bool("tls_verify")?,
        };

        if !GIT_PROVIDER_TYPES.contains(&config.git_provider.as_str()) {
            return Err(ConstructError::Invalid {
                field: "git_provider".into(),
                reason: format!(
                    "'{}' is not one of {}",
                    config.git_provider,
                    GIT_PROVIDER_TYPES.join(", ")
                ),
            });
        }

        // Credentials only work as a pair.
        match (config.username.is_empty(), config.token.is_empty()) {
            (true, true) => warn!(
                "No API_USER and no TOKEN given. This is okay for public repositories only."
            ),
            (false, true) | (true, false) => {
                warn!(
                    "username and token must both be set, or neither should be set. \
                     Unsetting both."
                );
                config.username.clear();
                config.token.clear();
            }
            (false, false) => {}
        }

        Ok(config)
    }
}

// Hand-written so the token never ends up in debug output.
impl fmt::Debug for CommitTimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitTimeConfig")
            .field("username", &self.username)
            .field("token", &"REDACTED")
            .field("namespaces", &self.namespaces)
            .field("git_api", &self.git_api)
            .field("git_provider", &self.git_provider)
            .field("tls_verify", &self.tls_verify)
            .finish()
    }
}

/// In-memory commit source emitting a fixed set of sample records, stamped at
/// construction time. Real git providers are wired in by embedding
/// applications through the collector seam.
pub struct MockCommitCollector {
    commits: Vec<CommitMetric>,
}

impl MockCommitCollector {
    pub fn from_config(config: &CommitTimeConfig) -> Self {
        let namespaces: Vec<String> = if config.namespaces.is_empty() {
            vec!["default".to_owned()]
        } else {
            config.namespaces.iter().cloned().collect()
        };

        let now = Utc::now();
        let commits = namespaces
            .iter()
            .enumerate()
            .map(|(i, namespace)| CommitMetric {
                app: format!("sample-app-{i}"),
                namespace: namespace.clone(),
                commit_hash: format!("{:07x}", 0xa11ce00 + i),
                image_sha: format!("sha256:{i:064x}"),
                commit_time: now,
            })
            .collect();

        Self { commits }
    }

    pub fn with_commits(commits: Vec<CommitMetric>) -> Self {
        Self { commits }
    }
}

impl Collector for MockCommitCollector {
    fn name(&self) -> &str {
        "mock-committime"
    }

    fn collect(&self, metrics: &ExporterMetrics) -> anyhow::Result<usize> {
        for commit in &self.commits {
            metrics.record_commit(commit);
        }
        Ok(self.commits.len())
    }
}
