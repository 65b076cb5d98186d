//! # Application State
//!
//! Shared state for the Axum application, passed to every handler through
//! the `State` extractor.
//!
//! Drafts live behind a [`FallbackDraftStore`]. With a database configured
//! it fronts a [`PgDraftStore`](testament_store::PgDraftStore); without one
//! it is memory-only and every save reports `"persisted": "cached"`.

use std::sync::Arc;
use std::time::Duration;

use testament_state::{DocumentAssembler, OutlineAssembler, DEFAULT_AUTOSAVE_DEBOUNCE};
use testament_store::FallbackDraftStore;

/// Service configuration, read from the environment.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to (`PORT`).
    pub port: u16,
    /// Postgres connection string (`DATABASE_URL`). `None` runs memory-only.
    pub database_url: Option<String>,
    /// Autosave debounce advertised to clients (`TESTAMENT_AUTOSAVE_MS`).
    pub autosave_debounce: Duration,
}

impl AppConfig {
    /// Build from `PORT`, `DATABASE_URL`, and `TESTAMENT_AUTOSAVE_MS`.
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let autosave_debounce = match std::env::var("TESTAMENT_AUTOSAVE_MS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "ignoring invalid TESTAMENT_AUTOSAVE_MS");
                    defaults.autosave_debounce
                }
            },
            Err(_) => defaults.autosave_debounce,
        };
        Self {
            port,
            database_url,
            autosave_debounce,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("autosave_debounce", &self.autosave_debounce)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            autosave_debounce: DEFAULT_AUTOSAVE_DEBOUNCE,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub drafts: FallbackDraftStore,
    pub assembler: Arc<dyn DocumentAssembler>,
}

impl AppState {
    /// Default configuration, memory-only drafts, outline assembler.
    pub fn new() -> Self {
        Self::with_store(AppConfig::default(), FallbackDraftStore::memory_only())
    }

    pub fn with_store(config: AppConfig, drafts: FallbackDraftStore) -> Self {
        Self {
            config,
            drafts,
            assembler: Arc::new(OutlineAssembler),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("durable", &self.drafts.has_durable())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_database_url() {
        let config = AppConfig {
            database_url: Some("postgres://app:s3cret@db/testament".into()),
            ..AppConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn default_state_is_memory_only() {
        let state = AppState::new();
        assert!(!state.drafts.has_durable());
        assert_eq!(state.config.autosave_debounce, Duration::from_secs(3));
    }
}
