// Framework bootstrap for the portal runtime.

use secrecy::ExposeSecret;
use std::io::Result;
use std::path::Path;
use std::sync::Arc;

use crate::frameworks::config::PortalConfig;
use crate::frameworks::db;
use crate::interface_adapters::clients::controller::ControllerSessionClient;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::stores::{PostgresAuditStore, SystemClock};
use crate::interface_adapters::views::AskamaRenderer;
use crate::use_cases::{AuditRecorder, PortalWorkflow};

pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
    asset_dir: &Path,
) -> Result<()> {
    let address = listener.local_addr()?;
    let app = app(state, asset_dir);

    tracing::info!(%address, asset_dir = %asset_dir.display(), "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config(config: &PortalConfig) -> Result<()> {
    let state = build_state(config).await?;
    let address = config.server.listen_address.as_str();

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, state, &config.server.asset_dir).await
}

async fn build_state(config: &PortalConfig) -> Result<Arc<AppState>> {
    let pool = db::connect_pool(config.audit.database_url.expose_secret())
        .map_err(|e| std::io::Error::other(format!("failed to configure database pool: {e}")))?;

    // Guests are still served when the database is down; their audit writes fail and are logged.
    match db::ensure_audit_table(&pool, &config.audit.table_name).await {
        Ok(()) => tracing::debug!(table = %config.audit.table_name, "audit table ready"),
        Err(e) => tracing::warn!(
            table = %config.audit.table_name,
            error = %e,
            "could not ensure audit table exists"
        ),
    }

    let controller = ControllerSessionClient::new(config.controller_settings());
    tracing::debug!(
        controller_url = %config.controller.url,
        site = %config.controller.site,
        request_timeout_ms = config.controller.request_timeout_ms,
        "controller client configured"
    );

    let workflow = PortalWorkflow {
        site: Arc::new(config.site_settings()),
        authorizer: Arc::new(controller),
        renderer: Arc::new(AskamaRenderer),
        recorder: AuditRecorder {
            store: Arc::new(PostgresAuditStore::new(pool, config.audit.table_name.clone())),
            clock: Arc::new(SystemClock),
            write_timeout: config.audit_write_timeout(),
        },
    };

    Ok(Arc::new(AppState { workflow }))
}
