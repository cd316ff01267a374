use serde::Deserialize;

/// Mirrors the recognized-options table. Every field is optional in YAML;
/// defaults are applied in `loader::load`. Unknown top-level keys are
/// ignored since this struct has no `deny_unknown_fields`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub ack_deadline_seconds: Option<u64>,
    pub manifest_ttl_seconds: Option<u64>,
    pub max_delivery_attempts: Option<u32>,
    pub manifest_bucket: Option<String>,
    pub reels_preset: Option<String>,
    pub series_preset: Option<String>,
    pub reels_ingest_pool: Option<String>,
    pub series_ingest_pool: Option<String>,
    pub reels_egress_pool: Option<String>,
    pub series_egress_pool: Option<String>,
    pub max_provision_retries: Option<u32>,
    pub cdn_base_url: Option<String>,
    pub signing_key_id: Option<String>,
    pub dry_run: Option<bool>,
    pub reconcile_default_tenant_id: Option<String>,
    pub reconcile_default_ingest_region: Option<String>,
}
