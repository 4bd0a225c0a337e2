//! Frontend Configuration
//!
//! Read once at startup from the `window.__KANBAN_CONFIG__` object the host
//! page may define. Anything missing falls back to defaults.

use board_engine::{BoardId, EngineConfig};
use serde::Deserialize;
use tracing::Level;

/// API base when neither the page nor the build provides one
const DEFAULT_API_URL: &str = "http://localhost:3000";

const CONFIG_GLOBAL: &str = "__KANBAN_CONFIG__";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the board server, without trailing slash
    pub api_url: String,
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
    /// How long a notification stays visible
    pub notification_timeout_ms: u32,
    pub board: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: option_env!("KANBAN_API_URL").unwrap_or(DEFAULT_API_URL).to_string(),
            log_level: "info".to_string(),
            notification_timeout_ms: 4000,
            board: EngineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the page, falling back to defaults
    pub fn load() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let value = match js_sys::Reflect::get(&window, &CONFIG_GLOBAL.into()) {
            Ok(value) if !value.is_undefined() && !value.is_null() => value,
            _ => return Self::default(),
        };
        match serde_wasm_bindgen::from_value::<AppConfig>(value) {
            Ok(config) => config.normalized(),
            Err(e) => {
                web_sys::console::warn_1(&format!("[CONFIG] Ignoring invalid {}: {}", CONFIG_GLOBAL, e).into());
                Self::default()
            }
        }
    }

    fn normalized(mut self) -> Self {
        while self.api_url.ends_with('/') {
            self.api_url.pop();
        }
        self
    }

    /// Parsed log level; unknown names mean `info`
    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

/// Board id from a `/board/{id}` location path
pub fn board_id_from_path(path: &str) -> Option<BoardId> {
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    match (segments.next(), segments.next(), segments.next()) {
        (Some("board"), Some(id), None) => {
            let id = percent_encoding::percent_decode_str(id).decode_utf8().ok()?;
            Some(BoardId::from(id.as_ref()))
        }
        _ => None,
    }
}
