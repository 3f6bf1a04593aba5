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

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;

use delivery_exporter::config::{
    load_and_log_with, EnvSnapshot, Overrides, DEFAULT_KEYWORD, DEFAULT_KEYWORD_VAR,
};
use delivery_exporter::exporters::committime::{CommitTimeConfig, MockCommitCollector};
use delivery_exporter::exporters::deploytime::{DeployTimeConfig, MockDeployCollector};
use delivery_exporter::exporters::{run_collection_loop, Collector};
use delivery_exporter::{ExporterMetrics, ExporterServer, ServerConfig};

#[derive(Parser)]
#[command(name = "delivery-exporter")]
#[command(about = "Software delivery metrics exporters")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Which exporter to run
    #[arg(long, value_enum, default_value_t = ExporterKind::Committime)]
    exporter: ExporterKind,

    /// Override the server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the bind address
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExporterKind {
    Committime,
    Deploytime,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file_loaded = dotenvy::dotenv().is_ok();
    init_logging();

    let cli = Cli::parse();

    info!("Starting delivery exporter ({:?})", cli.exporter);
    if env_file_loaded {
        info!("Loaded environment variables from .env file");
    }

    let env = EnvSnapshot::from_os();
    let default_keyword = env
        .get(DEFAULT_KEYWORD_VAR)
        .unwrap_or(DEFAULT_KEYWORD)
        .to_owned();

    // CLI flags preempt the environment through the override map.
    let mut overrides = Overrides::new();
    if let Some(port) = cli.port {
        info!("Using command line port {port}");
        overrides = overrides.value("port", i64::from(port));
    }
    if let Some(host) = &cli.host {
        overrides = overrides.value("host", host.as_str());
    }

    let server_config =
        load_and_log_with::<ServerConfig>(&env, &overrides, &default_keyword)?;

    let metrics = Arc::new(ExporterMetrics::new());
    let collector: Arc<dyn Collector> = match cli.exporter {
        ExporterKind::Committime => {
            let config = load_and_log_with::<CommitTimeConfig>(
                &env,
                &Overrides::new(),
                &default_keyword,
            )?;
            Arc::new(MockCommitCollector::from_config(&config))
        }
        ExporterKind::Deploytime => {
            let config = load_and_log_with::<DeployTimeConfig>(
                &env,
                &Overrides::new(),
                &default_keyword,
            )?;
            Arc::new(MockDeployCollector::from_config(&config))
        }
    };
    info!("Using {} as the delivery data source", collector.name());

    tokio::spawn(run_collection_loop(
        collector,
        Arc::clone(&metrics),
        Duration::from_secs(server_config.collection_interval),
    ));

    ExporterServer::new(
        server_config.host.clone(),
        server_config.port,
        metrics,
    )
    .run()
    .await
}

/// `RUST_LOG` wins; otherwise fall back to `LOG_LEVEL`, defaulting to info.
fn init_logging() {
    let fallback = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_owned());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(fallback)).init();
}
