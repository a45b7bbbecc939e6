use crate::storage::UploadNaming;
use anyhow::{Context, Result};
use pdf_rag::query_service::{DEFAULT_MAX_CONTEXT_TOKENS, DEFAULT_MAX_RESULTS};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub upload_naming: UploadNaming,
    pub max_upload_bytes: usize,
    pub max_results: usize,
    pub max_context_tokens: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            upload_dir: PathBuf::from("uploads"),
            upload_naming: UploadNaming::Fixed,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_results: DEFAULT_MAX_RESULTS,
            max_context_tokens: DEFAULT_MAX_CONTEXT_TOKENS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(dir) = lookup("UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        config.port = parse_var(&lookup, "PORT", config.port)?;
        config.upload_naming = parse_var(&lookup, "UPLOAD_NAMING", config.upload_naming)?;
        config.max_upload_bytes = parse_var(&lookup, "MAX_UPLOAD_BYTES", config.max_upload_bytes)?;
        config.max_results = parse_var(&lookup, "RAG_MAX_RESULTS", config.max_results)?;
        config.max_context_tokens =
            parse_var(&lookup, "RAG_MAX_CONTEXT_TOKENS", config.max_context_tokens)?;

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.upload_naming, UploadNaming::Fixed);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.max_results, 5);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("UPLOAD_DIR", "/tmp/pdfs"),
            ("UPLOAD_NAMING", "per-upload"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("RAG_MAX_RESULTS", "3"),
            ("RAG_MAX_CONTEXT_TOKENS", "2000"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/pdfs"));
        assert_eq!(config.upload_naming, UploadNaming::PerUpload);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.max_results, 3);
        assert_eq!(config.max_context_tokens, 2000);
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(format!("{:#}", err).contains("PORT"));

        assert!(Config::from_lookup(lookup(&[("UPLOAD_NAMING", "random")])).is_err());
    }
}
