// src/config/mod.rs
//! Tracker configuration: which repositories and packages to resolve.
//!
//! Parsing is lenient: a blank, malformed or missing blob yields the
//! defaults (no entities), logged at `warn`.

pub mod trackers;

pub use trackers::{BiocondaConfig, GitHubConfig, SourceSpec, TrackersConfig};

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "TRACKERS_CONFIG_PATH";
pub const ENV_CONFIG_JSON: &str = "TRACKERS_CONFIG_JSON";

/// Parse a page-embedded JSON blob. The blob may be double-encoded (a JSON
/// string whose content is the JSON object).
pub fn parse_page_blob(raw: &str) -> TrackersConfig {
    let raw = raw.trim();
    if raw.is_empty() {
        return TrackersConfig::default();
    }
    match parse_json(raw) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(target: "config", error = ?e, "malformed trackers config; using defaults");
            TrackersConfig::default()
        }
    }
}

fn parse_json(raw: &str) -> Result<TrackersConfig> {
    let cfg: TrackersConfig = if raw.starts_with('"') {
        let inner: String = serde_json::from_str(raw).context("decoding outer JSON string")?;
        serde_json::from_str(&inner).context("decoding inner JSON object")?
    } else {
        serde_json::from_str(raw).context("decoding JSON object")?
    };
    Ok(cfg.sanitized())
}

fn parse_toml(raw: &str) -> Result<TrackersConfig> {
    let cfg: TrackersConfig = toml::from_str(raw).context("decoding TOML")?;
    Ok(cfg.sanitized())
}

/// Load from an explicit file (TOML or JSON by extension). Unreadable files
/// are errors; unparseable content falls back to defaults.
pub fn load_from(path: &Path) -> Result<TrackersConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading trackers config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let parsed = if ext == "toml" {
        parse_toml(&content)
    } else {
        parse_json(content.trim())
    };
    Ok(parsed.unwrap_or_else(|e| {
        tracing::warn!(target: "config", error = ?e, path = %path.display(), "malformed trackers config; using defaults");
        TrackersConfig::default()
    }))
}

/// Resolve configuration from the environment:
/// 1) $TRACKERS_CONFIG_JSON (inline blob)
/// 2) $TRACKERS_CONFIG_PATH
/// 3) config/trackers.toml
/// 4) config/trackers.json
/// 5) defaults
pub fn load_default() -> Result<TrackersConfig> {
    if let Ok(blob) = std::env::var(ENV_CONFIG_JSON) {
        return Ok(parse_page_blob(&blob));
    }
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    for candidate in ["config/trackers.toml", "config/trackers.json"] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return load_from(&pb);
        }
    }
    Ok(TrackersConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_encoded_blob_is_unwrapped() {
        let raw = r#""{\"bioconda\":{\"packages\":[\"samtools\",\" bwa \",\"\"]}}""#;
        let cfg = parse_page_blob(raw);
        assert_eq!(cfg.bioconda.packages, vec!["samtools", "bwa"]);
        assert_eq!(cfg.bioconda.channel, "bioconda");
    }

    #[test]
    fn malformed_or_blank_blob_yields_empty_lists() {
        for raw in ["", "   ", "{not json", "[1,2]", r#"{"bioconda":{"packages":"x"}}"#] {
            let cfg = parse_page_blob(raw);
            assert!(cfg.bioconda.packages.is_empty(), "raw={raw}");
            assert!(cfg.github.repos.is_empty(), "raw={raw}");
        }
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let raw = r#"{
            "github": {"username": "octo", "reposPerPage": 3},
            "bioconda": {
                "entities": ["pkg-a", "pkg-a", "pkg-b"],
                "sourceListOverrides": [{"source": "docs"}, {"source": "api", "urlTemplate": "http://mirror/{package}"}]
            }
        }"#;
        let cfg = parse_page_blob(raw);
        assert_eq!(cfg.github.username, "octo");
        assert_eq!(cfg.github.repos_per_page, 3);
        assert_eq!(cfg.bioconda.packages, vec!["pkg-a", "pkg-b"]);
        let overrides = cfg.bioconda.source_list_overrides.unwrap();
        assert_eq!(overrides[0].source, "docs");
        assert_eq!(overrides[1].url_template.as_deref(), Some("http://mirror/{package}"));
    }

    #[test]
    fn toml_shape_matches_json_shape() {
        let cfg = parse_toml(
            r#"
[github]
username = "octo"
repos = ["alpha"]

[bioconda]
packages = ["samtools"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.github.repos, vec!["alpha"]);
        assert_eq!(cfg.github.repos_per_page, 8);
        assert_eq!(cfg.bioconda.packages, vec!["samtools"]);
    }
}
