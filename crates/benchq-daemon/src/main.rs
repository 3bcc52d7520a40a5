mod config;
mod server;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use benchq_api::{HttpApi, ServiceApiAdapter};
use benchq_core::prelude::{BenchmarkService, Collaborators, InMemoryStore, ServiceSettings};
use benchq_integrations::{BuildkiteClient, GithubClient};
use benchq_observe::{LoggerTimeZone, init_local_offset, init_logger};
use benchq_prometheus::PrometheusMetrics;

use crate::config::DaemonConfig;

/// Pull request benchmark scheduler.
#[derive(Debug, Parser)]
#[command(name = "benchq", version, about)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(short, long, env = "BENCHQ_CONFIG")]
    config: PathBuf,

    /// GitHub token used when the config file has none.
    #[arg(long, env = "GITHUB_API_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Buildkite token used when the config file has none.
    #[arg(long, env = "BUILDKITE_API_TOKEN", hide_env_values = true)]
    buildkite_token: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) config
    let cfg = DaemonConfig::load(&cli.config)?.with_tokens(cli.github_token, cli.buildkite_token);

    // 2) logger; the local offset must be read while single-threaded
    if cfg.logger.tz == LoggerTimeZone::Local {
        init_local_offset();
    }
    init_logger(&cfg.logger)?;
    info!(config = %cli.config.display(), "logger initialized");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("cannot start runtime")?
        .block_on(run(cfg))
}

async fn run(cfg: DaemonConfig) -> anyhow::Result<()> {
    let timeout = cfg.call_timeout();

    // 3) metrics
    let metrics = Arc::new(PrometheusMetrics::new().context("metrics registry")?);

    // 4) external collaborators
    let github = Arc::new(GithubClient::new(&cfg.github, timeout)?);
    let buildkite = Arc::new(BuildkiteClient::new(&cfg.buildkite, timeout)?);
    if cfg.github.token.is_none() {
        tracing::warn!("no GitHub token configured; API calls are unauthenticated");
    }
    if cfg.repos.is_empty() {
        tracing::warn!("no repositories configured; every request will be rejected");
    }
    let repos = cfg.repos.len();

    // 5) service
    let service = BenchmarkService::new(
        ServiceSettings {
            bot_handle: cfg.bot_handle,
            links: cfg.links,
            call_timeout: timeout,
        },
        Collaborators {
            config: Arc::new(cfg.repos),
            repos: github,
            builds: buildkite,
            store: Arc::new(InMemoryStore::new()),
            metrics: metrics.clone(),
        },
    );

    // 6) http
    let app = HttpApi::new(Arc::new(ServiceApiAdapter::new(Arc::new(service))))
        .router()
        .merge(server::metrics_router(metrics));
    let listener = tokio::net::TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("cannot bind {}", cfg.listen))?;
    info!(addr = %cfg.listen, repos, "benchq listening");

    // 7) serve until signalled
    let shutdown = CancellationToken::new();
    tokio::spawn(server::watch_signals(shutdown.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("http server failed")?;

    info!("shutdown complete");
    Ok(())
}
