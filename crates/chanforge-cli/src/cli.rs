use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "chanforge",
    about = "Channel provisioning control plane: admin API, reconciliation loop, and collaborator bootstrap",
    version
)]
pub struct Cli {
    /// Admin API base URL for the retire/rotate-key/purge/status subcommands.
    #[arg(long, env = "CHANFORGE_URL", global = true)]
    pub remote: Option<String>,

    /// Bearer token for the admin API. Falls back to CHANFORGE_TOKEN.
    #[arg(long, env = "CHANFORGE_TOKEN", global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the admin API and reconciliation scheduler.
    Serve {
        /// Path to a YAML configuration file. Defaults apply for any field it omits.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "0.0.0.0")]
        bind: String,

        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Metadata repository backend.
        #[arg(long, default_value = "memory")]
        store: StoreArg,

        /// Path to the redb database file (store=redb).
        #[arg(long)]
        store_path: Option<String>,

        /// Postgres connection string (store=postgres).
        #[arg(long, env = "CHANFORGE_POSTGRES_URL")]
        postgres_url: Option<String>,

        /// Media engine client backend.
        #[arg(long, default_value = "stub")]
        engine: EngineArg,

        /// Base URL of the media engine HTTP API (engine=http).
        #[arg(long)]
        engine_url: Option<String>,

        /// Alerting sink backend, used by the reconciliation scheduler.
        #[arg(long, default_value = "logging")]
        notify: NotifyArg,

        /// Webhook URL for ingest-failure alerts (notify=http).
        #[arg(long)]
        alert_webhook_url: Option<String>,

        /// Admin API bearer token. Generated and printed if omitted.
        #[arg(long, env = "CHANFORGE_TOKEN")]
        admin_token: Option<String>,

        /// Interval, in seconds, between reconciliation passes.
        #[arg(long, default_value_t = 60)]
        reconcile_interval_seconds: u64,

        /// Max failed records reconciled per pass.
        #[arg(long, default_value_t = 20)]
        reconcile_limit: u32,
    },

    /// Run a single reconciliation pass against the configured store and exit.
    ReconcileOnce {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "memory")]
        store: StoreArg,

        #[arg(long)]
        store_path: Option<String>,

        #[arg(long, env = "CHANFORGE_POSTGRES_URL")]
        postgres_url: Option<String>,

        #[arg(long, default_value = "stub")]
        engine: EngineArg,

        #[arg(long)]
        engine_url: Option<String>,

        #[arg(long, default_value = "logging")]
        notify: NotifyArg,

        #[arg(long)]
        alert_webhook_url: Option<String>,

        /// Max failed records to reconcile. Defaults to the provisioner's reconciliation batch size.
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show the admin API's health/readiness.
    Status,

    /// Transition a channel from ready to retired.
    Retire { content_id: String },

    /// Rotate the ingest key for an assigned channel.
    RotateKey { content_id: String },

    /// Remove a channel from the media engine and retire its record.
    Purge { content_id: String },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum StoreArg {
    Memory,
    Redb,
    Postgres,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum EngineArg {
    Stub,
    Http,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum NotifyArg {
    Logging,
    Http,
}
