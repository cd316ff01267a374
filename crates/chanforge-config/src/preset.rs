use chanforge_domain::AbrVariant;

use crate::error::ConfigError;

/// Parses the compact textual ABR preset form: `entry (',' entry)*` where
/// `entry = name '|' resolution '|' bitrateKbps`. Whitespace around tokens is
/// trimmed; empty entries produced by the split (e.g. a trailing comma) are
/// skipped. An empty token within a non-empty entry, or a `bitrateKbps` that
/// isn't a base-10 integer, fails parsing with the offending entry named.
pub fn parse_abr_preset(text: &str) -> Result<Vec<AbrVariant>, ConfigError> {
    let mut variants = Vec::new();

    for raw_entry in text.split(',') {
        let entry = raw_entry.trim();
        if entry.is_empty() {
            continue;
        }

        let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::InvalidPreset {
                entry: entry.to_string(),
                message: "expected `name|resolution|bitrateKbps`".to_string(),
            });
        }

        let bitrate_kbps = parts[2].parse::<u32>().map_err(|_| ConfigError::InvalidPreset {
            entry: entry.to_string(),
            message: format!("bitrateKbps '{}' is not a base-10 integer", parts[2]),
        })?;

        variants.push(AbrVariant {
            name: parts[0].to_string(),
            resolution: parts[1].to_string(),
            bitrate_kbps,
        });
    }

    Ok(variants)
}
