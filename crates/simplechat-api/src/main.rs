//! SimpleChat web server and CLI entry point.
//!
//! Binary name: `simplechat`
//!
//! Parses CLI arguments, loads configuration, then either starts the chat
//! web server or runs one of the store inspection commands.

mod cli;
mod http;
mod state;

use anyhow::anyhow;
use clap::Parser;
use secrecy::SecretString;

use simplechat_infra::config::{ConfigOverrides, load_config};
use simplechat_observe::tracing_setup::{default_directive, init_tracing, shutdown_tracing};
use simplechat_types::config::AppConfig;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.otel, default_directive(cli.verbose, cli.quiet))
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))?;

    let mut config = load_config(&cli.config).await;
    ConfigOverrides {
        store_location: cli.store.clone(),
        ..ConfigOverrides::default()
    }
    .apply(&mut config);

    let result = match cli.command.unwrap_or_default() {
        Commands::Serve {
            host,
            port,
            model,
            reset_store,
            api_key,
        } => {
            ConfigOverrides {
                host,
                port,
                model_name: model,
                reset_store,
                api_credential: api_key.map(SecretString::from),
                ..ConfigOverrides::default()
            }
            .apply(&mut config);
            serve(config, cli.quiet).await
        }

        Commands::History { session_id } => {
            cli::history::show_history(&config, &session_id, cli.json).await
        }

        Commands::Sessions => cli::history::list_sessions(&config, cli.json).await,
    };

    shutdown_tracing();
    result
}

async fn serve(config: AppConfig, quiet: bool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let model = config.model_name.clone();
    let state = AppState::init(config).await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if !quiet {
        println!(
            "  {} SimpleChat listening on {} (model {})",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan(),
            console::style(model).yellow()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state.clone());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.orchestrator.store().pool().close().await;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
