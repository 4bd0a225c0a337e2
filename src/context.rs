//! Application Context
//!
//! Shared handles provided via Leptos Context API: the board engine, the
//! drag-and-drop signals and the error reporting path.

use std::time::Duration;

use board_engine::{ApiError, BoardEngine, EngineError};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::DndSignals;
use tracing::{error, warn};

use crate::commands::HttpBoardApi;
use crate::config::AppConfig;
use crate::models::NotificationLevel;
use crate::store::{store_dismiss_notification, store_push_notification, AppStore, StoreHandle};

pub type Engine = BoardEngine<StoreHandle, HttpBoardApi>;

/// Where the server sends an expired session
const LOGIN_PATH: &str = "/login";

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct BoardContext {
    engine: StoredValue<Engine, LocalStorage>,
    pub store: AppStore,
    pub dnd: DndSignals,
    config: StoredValue<AppConfig>,
}

impl BoardContext {
    pub fn new(engine: Engine, store: AppStore, dnd: DndSignals, config: AppConfig) -> Self {
        Self {
            engine: StoredValue::new_local(engine),
            store,
            dnd,
            config: StoredValue::new(config),
        }
    }

    /// Engine handle to move into a task
    pub fn engine(&self) -> Engine {
        self.engine.get_value()
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    /// Reset the store; in-flight responses for the old board are dropped
    pub fn close_board(&self) {
        if let Some(Err(err)) = self.engine.try_with_value(|engine| engine.close_board()) {
            warn!(error = %err, "closing board failed");
        }
    }

    /// Show a transient message
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        let store = self.store;
        let id = store_push_notification(&store, level, message.into());
        let timeout = self.config.with_value(|config| config.notification_timeout_ms);
        spawn_local(async move {
            gloo_timers::future::sleep(Duration::from_millis(u64::from(timeout))).await;
            store_dismiss_notification(&store, id);
        });
    }

    /// Route an engine failure to the user.
    ///
    /// An expired session leaves the app; everything else becomes a
    /// notification. Validation errors belong to the form that caused them
    /// and should be shown there instead of calling this.
    pub fn report(&self, context: &str, err: &EngineError) {
        if err.is_unauthorized() {
            warn!(context, "session expired, redirecting to login");
            redirect_to_login();
            return;
        }
        error!(context, error = %err, "board operation failed");
        let message = match err.api() {
            Some(ApiError::NotFound { .. }) => format!("{}: it no longer exists", context),
            Some(api) => format!("{}: {}", context, api.message()),
            None => format!("{}: {}", context, err),
        };
        self.notify(NotificationLevel::Error, message);
    }
}

/// Get the board context
pub fn use_board_context() -> BoardContext {
    expect_context::<BoardContext>()
}

/// Leave the app for the login page
pub fn redirect_to_login() {
    if let Some(win) = web_sys::window() {
        let _ = win.location().replace(LOGIN_PATH);
    }
}
