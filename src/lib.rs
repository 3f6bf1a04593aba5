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

//! Software delivery metrics exporters.
//!
//! Long-running daemons that collect delivery metadata — commit times,
//! deployment times — and expose them as Prometheus time-series metrics over
//! HTTP. All configuration is declared once per exporter and resolved from
//! environment variables by the [`config`] module, which logs every resolved
//! value with its provenance and redacts anything sensitive.

pub mod config;
pub mod exporters;
pub mod metrics;
pub mod server;

// Main exports for library users
pub use config::{load, load_and_log, EnvConfig, EnvSnapshot, Loaded, Overrides};
pub use exporters::{Collector, CommitMetric, DeployMetric};
pub use metrics::ExporterMetrics;
pub use server::{ExporterServer, ServerConfig};
