use std::path::Path;

use chanforge_domain::AbrVariant;
use tracing::debug;

use crate::error::ConfigError;
use crate::preset::parse_abr_preset;
use crate::raw::RawConfig;

/// The closed set of recognized configuration options, resolved and
/// defaulted, with ABR presets parsed once at load time.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub ack_deadline_seconds: u64,
    pub manifest_ttl_seconds: u64,
    pub max_delivery_attempts: u32,
    pub manifest_bucket: String,
    pub reels_abr_ladder: Vec<AbrVariant>,
    pub series_abr_ladder: Vec<AbrVariant>,
    pub reels_ingest_pool: String,
    pub series_ingest_pool: String,
    pub reels_egress_pool: String,
    pub series_egress_pool: String,
    pub max_provision_retries: u32,
    pub cdn_base_url: String,
    pub signing_key_id: String,
    pub dry_run: bool,
    pub reconcile_default_tenant_id: String,
    pub reconcile_default_ingest_region: String,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        ProvisionerConfig {
            ack_deadline_seconds: 30,
            manifest_ttl_seconds: 3600,
            max_delivery_attempts: 5,
            manifest_bucket: "chanforge-manifests".to_string(),
            reels_abr_ladder: Vec::new(),
            series_abr_ladder: Vec::new(),
            reels_ingest_pool: "reels-ingest".to_string(),
            series_ingest_pool: "series-ingest".to_string(),
            reels_egress_pool: "reels-egress".to_string(),
            series_egress_pool: "series-egress".to_string(),
            max_provision_retries: 5,
            cdn_base_url: "https://cdn.example.com/".to_string(),
            signing_key_id: "default".to_string(),
            dry_run: false,
            reconcile_default_tenant_id: "unknown".to_string(),
            reconcile_default_ingest_region: "us".to_string(),
        }
    }
}

/// Loads configuration from a YAML file, falling back to defaults for every
/// optional field. Unknown YAML keys are ignored (forward-compatible).
pub fn load(path: &Path) -> Result<ProvisionerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_from_str(&content, &path.display().to_string())
}

pub fn load_from_str(content: &str, path_for_errors: &str) -> Result<ProvisionerConfig, ConfigError> {
    let raw: RawConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::YamlParse {
        path: path_for_errors.to_string(),
        source: e,
    })?;

    let defaults = ProvisionerConfig::default();
    let reels_preset_text = raw.reels_preset.unwrap_or_default();
    let series_preset_text = raw.series_preset.unwrap_or_default();

    debug!(path = path_for_errors, "loaded provisioner config");

    Ok(ProvisionerConfig {
        ack_deadline_seconds: raw.ack_deadline_seconds.unwrap_or(defaults.ack_deadline_seconds),
        manifest_ttl_seconds: raw.manifest_ttl_seconds.unwrap_or(defaults.manifest_ttl_seconds),
        max_delivery_attempts: raw.max_delivery_attempts.unwrap_or(defaults.max_delivery_attempts),
        manifest_bucket: raw.manifest_bucket.unwrap_or(defaults.manifest_bucket),
        reels_abr_ladder: parse_abr_preset(&reels_preset_text)?,
        series_abr_ladder: parse_abr_preset(&series_preset_text)?,
        reels_ingest_pool: raw.reels_ingest_pool.unwrap_or(defaults.reels_ingest_pool),
        series_ingest_pool: raw.series_ingest_pool.unwrap_or(defaults.series_ingest_pool),
        reels_egress_pool: raw.reels_egress_pool.unwrap_or(defaults.reels_egress_pool),
        series_egress_pool: raw.series_egress_pool.unwrap_or(defaults.series_egress_pool),
        max_provision_retries: raw.max_provision_retries.unwrap_or(defaults.max_provision_retries),
        cdn_base_url: raw.cdn_base_url.unwrap_or(defaults.cdn_base_url),
        signing_key_id: raw.signing_key_id.unwrap_or(defaults.signing_key_id),
        dry_run: raw.dry_run.unwrap_or(defaults.dry_run),
        reconcile_default_tenant_id: raw
            .reconcile_default_tenant_id
            .unwrap_or(defaults.reconcile_default_tenant_id),
        reconcile_default_ingest_region: raw
            .reconcile_default_ingest_region
            .unwrap_or(defaults.reconcile_default_ingest_region),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_yaml_is_empty() {
        let cfg = load_from_str("", "<test>").unwrap();
        assert_eq!(cfg.max_delivery_attempts, 5);
        assert!(!cfg.dry_run);
        assert!(cfg.reels_abr_ladder.is_empty());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let yaml = "cdnBaseUrl: https://cdn.example/\nsomeFutureOption: true\n";
        let cfg = load_from_str(yaml, "<test>").unwrap();
        assert_eq!(cfg.cdn_base_url, "https://cdn.example/");
    }

    #[test]
    fn parses_abr_presets() {
        let yaml = "reelsPreset: \"low|640x360|600\"\nmaxProvisionRetries: 3\n";
        let cfg = load_from_str(yaml, "<test>").unwrap();
        assert_eq!(cfg.reels_abr_ladder.len(), 1);
        assert_eq!(cfg.max_provision_retries, 3);
    }

    #[test]
    fn bad_preset_reports_offending_entry() {
        let yaml = "reelsPreset: \"low|640x360\"\n";
        let err = load_from_str(yaml, "<test>").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPreset { .. }));
    }
}
