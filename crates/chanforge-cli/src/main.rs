mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            bind,
            port,
            store,
            store_path,
            postgres_url,
            engine,
            engine_url,
            notify,
            alert_webhook_url,
            admin_token,
            reconcile_interval_seconds,
            reconcile_limit,
        } => {
            commands::serve(
                config,
                bind,
                port,
                store,
                store_path,
                postgres_url,
                engine,
                engine_url,
                notify,
                alert_webhook_url,
                admin_token,
                reconcile_interval_seconds,
                reconcile_limit,
            )
            .await
        }
        Command::ReconcileOnce {
            config,
            store,
            store_path,
            postgres_url,
            engine,
            engine_url,
            notify,
            alert_webhook_url,
            limit,
        } => {
            commands::reconcile_once(
                config,
                store,
                store_path,
                postgres_url,
                engine,
                engine_url,
                notify,
                alert_webhook_url,
                limit,
            )
            .await
        }
        Command::Status => commands::status(cli.remote, cli.token).await,
        Command::Retire { content_id } => commands::retire(content_id, cli.remote, cli.token).await,
        Command::RotateKey { content_id } => commands::rotate_key(content_id, cli.remote, cli.token).await,
        Command::Purge { content_id } => commands::purge(content_id, cli.remote, cli.token).await,
    }
}
