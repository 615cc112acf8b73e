use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::imaging::BackendKind;

/// Application configuration loaded from environment variables.
///
/// Every credential is optional: a missing key degrades the matching client
/// to its fallback (templates, placeholder images, or a reported export error).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub output_dir: PathBuf,
    pub llm: LlmSettings,
    pub images: ImageSettings,
    pub airtable: AirtableSettings,
    pub google_docs: GoogleDocsSettings,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: String,
    pub content_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// USD per 1K prompt tokens.
    pub input_cost_per_1k: f64,
    /// USD per 1K completion tokens.
    pub output_cost_per_1k: f64,
}

#[derive(Debug, Clone)]
pub struct ImageSettings {
    pub backend: BackendKind,
    pub placeholder_fallback: bool,
    /// Flat per-image estimate reported in the review manifest.
    pub cost_estimate: f64,
    pub ideogram_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub pexels_api_key: Option<String>,
    pub unsplash_access_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AirtableSettings {
    pub api_key: Option<String>,
    pub base_id: Option<String>,
    pub table_id: String,
}

#[derive(Debug, Clone)]
pub struct GoogleDocsSettings {
    pub api_key: Option<String>,
    pub folder_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default =
            |key: &str, default: &str| optional(key).unwrap_or_else(|| default.to_string());

        let openai_api_key = optional("OPENAI_API_KEY");

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: or_default("RUST_LOG", "info"),
            output_dir: PathBuf::from(or_default("PACK_OUTPUT_DIR", ".")),
            llm: LlmSettings {
                api_key: openai_api_key.clone(),
                base_url: or_default("OPENAI_BASE_URL", "https://api.openai.com"),
                default_model: or_default("LLM_DEFAULT_MODEL", "gpt-4"),
                content_model: or_default("LLM_CONTENT_MODEL", "gpt-4o-mini"),
                temperature: parse_or(&lookup, "LLM_TEMPERATURE", 0.7)?,
                max_tokens: parse_or(&lookup, "LLM_MAX_TOKENS", 2000)?,
                input_cost_per_1k: parse_or(&lookup, "LLM_INPUT_COST_PER_1K", 0.03)?,
                output_cost_per_1k: parse_or(&lookup, "LLM_OUTPUT_COST_PER_1K", 0.06)?,
            },
            images: ImageSettings {
                backend: parse_or(&lookup, "IMAGE_BACKEND", BackendKind::Ideogram)?,
                placeholder_fallback: parse_or(&lookup, "IMAGE_PLACEHOLDER_FALLBACK", true)?,
                cost_estimate: parse_or(&lookup, "IMAGE_COST_ESTIMATE", 0.08)?,
                ideogram_api_key: optional("IDEOGRAM_API_KEY"),
                openai_api_key,
                pexels_api_key: optional("PEXELS_API_KEY"),
                unsplash_access_key: optional("UNSPLASH_ACCESS_KEY"),
            },
            airtable: AirtableSettings {
                api_key: optional("AIRTABLE_API_KEY"),
                base_id: optional("AIRTABLE_BASE_ID"),
                table_id: or_default("AIRTABLE_TABLE_ID", "Content Packs"),
            },
            google_docs: GoogleDocsSettings {
                api_key: optional("GOOGLE_DOCS_API_KEY"),
                folder_id: optional("GOOGLE_DRIVE_FOLDER_ID"),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.output_dir, PathBuf::from("."));
        assert!(cfg.llm.api_key.is_none());
        assert_eq!(cfg.llm.default_model, "gpt-4");
        assert_eq!(cfg.llm.content_model, "gpt-4o-mini");
        assert_eq!(cfg.llm.max_tokens, 2000);
        assert!((cfg.llm.input_cost_per_1k - 0.03).abs() < f64::EPSILON);
        assert!((cfg.llm.output_cost_per_1k - 0.06).abs() < f64::EPSILON);
        assert_eq!(cfg.images.backend, BackendKind::Ideogram);
        assert!(cfg.images.placeholder_fallback);
        assert_eq!(cfg.airtable.table_id, "Content Packs");
    }

    #[test]
    fn test_overrides_are_applied() {
        let cfg = config_from(&[
            ("PORT", "9000"),
            ("OPENAI_API_KEY", "sk-test"),
            ("LLM_MAX_TOKENS", "1200"),
            ("IMAGE_BACKEND", "pexels"),
            ("IMAGE_PLACEHOLDER_FALLBACK", "false"),
            ("AIRTABLE_TABLE_ID", "Drafts"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.images.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(cfg.llm.max_tokens, 1200);
        assert_eq!(cfg.images.backend, BackendKind::Pexels);
        assert!(!cfg.images.placeholder_fallback);
        assert_eq!(cfg.airtable.table_id, "Drafts");
    }

    #[test]
    fn test_blank_credentials_are_treated_as_missing() {
        let cfg = config_from(&[("OPENAI_API_KEY", "   "), ("AIRTABLE_BASE_ID", "")]).unwrap();
        assert!(cfg.llm.api_key.is_none());
        assert!(cfg.airtable.base_id.is_none());
    }

    #[test]
    fn test_malformed_number_is_an_error() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_unknown_image_backend_is_an_error() {
        assert!(config_from(&[("IMAGE_BACKEND", "midjourney")]).is_err());
    }
}
