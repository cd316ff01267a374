use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chanforge_api::AppState;
use chanforge_config::ProvisionerConfig;
use chanforge_engine::{HttpMediaEngineClient, MediaEngineClient, StubMediaEngineClient};
use chanforge_notify::{AlertingSink, HttpAlertingSink, LoggingAlertingSink};
use chanforge_provisioner::ChannelProvisioner;
use chanforge_reconciler::{reconcile_failed, ReconcileScheduler};
use chanforge_store::{InMemoryRepository, MetadataRepository, PostgresRepository, RedbRepository};
use uuid::Uuid;

use crate::cli::{EngineArg, NotifyArg, StoreArg};

// ── Collaborator wiring ───────────────────────────────────────────────────────

async fn build_repository(
    store: &StoreArg,
    store_path: &Option<String>,
    postgres_url: &Option<String>,
) -> Result<Arc<dyn MetadataRepository>> {
    match store {
        StoreArg::Memory => {
            println!("Using in-memory store — state will be lost on process exit");
            Ok(Arc::new(InMemoryRepository::new()))
        }
        StoreArg::Redb => {
            let path = resolve_store_path(store_path.clone());
            println!("Using redb store at {}", path.display());
            Ok(Arc::new(
                RedbRepository::open(&path)
                    .with_context(|| format!("Failed to open redb store at {}", path.display()))?,
            ))
        }
        StoreArg::Postgres => {
            let url = postgres_url
                .clone()
                .context("--postgres-url (or CHANFORGE_POSTGRES_URL) is required for store=postgres")?;
            println!("Connecting to Postgres store");
            Ok(Arc::new(
                PostgresRepository::connect(&url)
                    .await
                    .context("Failed to connect to Postgres store")?,
            ))
        }
    }
}

fn build_engine(engine: &EngineArg, engine_url: &Option<String>) -> Result<Arc<dyn MediaEngineClient>> {
    match engine {
        EngineArg::Stub => {
            println!("Using stub media engine client (no real channels will be created)");
            Ok(Arc::new(StubMediaEngineClient::new()))
        }
        EngineArg::Http => {
            let url = engine_url
                .clone()
                .context("--engine-url is required for engine=http")?;
            println!("Using HTTP media engine client at {url}");
            Ok(Arc::new(HttpMediaEngineClient::new(url)))
        }
    }
}

fn build_alerter(notify: &NotifyArg, webhook_url: &Option<String>) -> Arc<dyn AlertingSink> {
    match (notify, webhook_url) {
        (NotifyArg::Http, Some(url)) => Arc::new(HttpAlertingSink::new(url.clone())),
        _ => Arc::new(LoggingAlertingSink),
    }
}

fn load_config(path: &Option<PathBuf>) -> Result<ProvisionerConfig> {
    match path {
        Some(p) => chanforge_config::load(p).with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(ProvisionerConfig::default()),
    }
}

// ── Serve ─────────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub async fn serve(
    config: Option<PathBuf>,
    bind: String,
    port: u16,
    store: StoreArg,
    store_path: Option<String>,
    postgres_url: Option<String>,
    engine: EngineArg,
    engine_url: Option<String>,
    notify: NotifyArg,
    alert_webhook_url: Option<String>,
    admin_token: Option<String>,
    reconcile_interval_seconds: u64,
    reconcile_limit: u32,
) -> Result<()> {
    let cfg = load_config(&config)?;

    let repository = build_repository(&store, &store_path, &postgres_url).await?;
    let engine_client = build_engine(&engine, &engine_url)?;
    let alerter = build_alerter(&notify, &alert_webhook_url);

    let provisioner = Arc::new(ChannelProvisioner::new(
        repository.clone(),
        engine_client.clone(),
        cfg.clone(),
    ));

    let token = match admin_token {
        Some(t) => t,
        None => {
            let t = generate_token();
            println!("Generated admin token (pass --admin-token or CHANFORGE_TOKEN to pin it): {t}");
            t
        }
    };

    let scheduler = ReconcileScheduler::new(
        repository.clone(),
        provisioner.clone(),
        alerter.clone(),
        cfg.clone(),
        Duration::from_secs(reconcile_interval_seconds),
        reconcile_limit,
    );
    tokio::spawn(scheduler.run());

    let state = AppState {
        repository,
        engine: engine_client,
        alerter,
        provisioner,
        config: Arc::new(cfg),
        auth_token: Arc::new(token),
    };

    let addr = format!("{bind}:{port}");
    println!("Starting chanforge admin API on http://{addr}");
    let app = chanforge_api::build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

// ── Reconcile once ────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub async fn reconcile_once(
    config: Option<PathBuf>,
    store: StoreArg,
    store_path: Option<String>,
    postgres_url: Option<String>,
    engine: EngineArg,
    engine_url: Option<String>,
    notify: NotifyArg,
    alert_webhook_url: Option<String>,
    limit: Option<u32>,
) -> Result<()> {
    let cfg = load_config(&config)?;
    let repository = build_repository(&store, &store_path, &postgres_url).await?;
    let engine_client = build_engine(&engine, &engine_url)?;
    let alerter = build_alerter(&notify, &alert_webhook_url);
    let provisioner = ChannelProvisioner::new(repository.clone(), engine_client, cfg.clone());

    let report = reconcile_failed(repository.as_ref(), &provisioner, alerter.as_ref(), &cfg, limit)
        .await
        .context("Reconciliation pass failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ── Admin subcommands (against a running server) ─────────────────────────────

pub async fn status(remote: Option<String>, token: Option<String>) -> Result<()> {
    let token = resolve_token(token)?;
    let url = server_url(remote);
    let resp = authed_client(&token)
        .get(format!("{}/ready", url.trim_end_matches('/')))
        .send()
        .await
        .with_context(|| format!("Failed to reach server at {url}"))?;
    println!("Server at {url}: {}", resp.status());
    Ok(())
}

pub async fn retire(content_id: String, remote: Option<String>, token: Option<String>) -> Result<()> {
    admin_post(remote, token, &format!("/channels/{content_id}/retire")).await
}

pub async fn rotate_key(content_id: String, remote: Option<String>, token: Option<String>) -> Result<()> {
    admin_post(remote, token, &format!("/channels/{content_id}/rotate-key")).await
}

pub async fn purge(content_id: String, remote: Option<String>, token: Option<String>) -> Result<()> {
    let token = resolve_token(token)?;
    let url = server_url(remote);
    let resp = authed_client(&token)
        .delete(format!("{}/channels/{content_id}", url.trim_end_matches('/')))
        .send()
        .await
        .with_context(|| format!("Failed to reach server at {url}"))?;
    print_json_response(resp).await
}

async fn admin_post(remote: Option<String>, token: Option<String>, path: &str) -> Result<()> {
    let token = resolve_token(token)?;
    let url = server_url(remote);
    let resp = authed_client(&token)
        .post(format!("{}{}", url.trim_end_matches('/'), path))
        .send()
        .await
        .with_context(|| format!("Failed to reach server at {url}"))?;
    print_json_response(resp).await
}

async fn print_json_response(resp: reqwest::Response) -> Result<()> {
    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or(serde_json::Value::Null);
    println!("{}", serde_json::to_string_pretty(&body)?);
    if !status.is_success() {
        anyhow::bail!("request failed: {status}");
    }
    Ok(())
}

// ── Shared helpers ────────────────────────────────────────────────────────────

fn generate_token() -> String {
    let a = Uuid::new_v4().to_string().replace('-', "");
    let b = Uuid::new_v4().to_string().replace('-', "");
    format!("{a}{b}")
}

/// Resolve the bearer token for an admin subcommand: explicit value wins,
/// otherwise CHANFORGE_TOKEN (already bound via clap's `env`).
fn resolve_token(explicit: Option<String>) -> Result<String> {
    explicit.context(
        "No token provided. Use --token or CHANFORGE_TOKEN to authenticate against the admin API.",
    )
}

fn authed_client(token: &str) -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    let bearer = format!("Bearer {token}");
    headers.insert(
        reqwest::header::AUTHORIZATION,
        reqwest::header::HeaderValue::from_str(&bearer)
            .expect("token contains invalid header characters"),
    );
    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .expect("failed to build HTTP client")
}

fn server_url(remote: Option<String>) -> String {
    remote.unwrap_or_else(|| "http://localhost:8080".into())
}

fn resolve_store_path(store_path: Option<String>) -> PathBuf {
    if let Some(p) = store_path {
        return PathBuf::from(p);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    PathBuf::from(home).join(".chanforge").join("state.redb")
}
