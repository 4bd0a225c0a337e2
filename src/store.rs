//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The board lives
//! here and is changed only through `board_engine` messages.

use board_engine::store::{reduce, Liveness};
use board_engine::{Board, BoardMsg, BoardStore, Column, ColumnFilters, ColumnId};
use leptos::prelude::*;
use reactive_stores::Store;

use crate::models::{Notification, NotificationLevel};

/// Why the board page cannot show a board
#[derive(Clone, Debug, PartialEq)]
pub enum BoardLoadError {
    NotFound,
    Failed(String),
}

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// The open board (empty when none)
    pub board: Board,
    /// Set when opening the board failed
    pub load_error: Option<BoardLoadError>,
    /// Priority filter shown in the toolbar
    pub filters: ColumnFilters,
    /// Transient messages, newest last
    pub notifications: Vec<Notification>,
    /// Id for the next notification
    pub next_notification_id: u64,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// The app store seen as a `BoardStore`
#[derive(Clone, Copy)]
pub struct StoreHandle(pub AppStore);

impl BoardStore for StoreHandle {
    fn snapshot(&self) -> Board {
        self.0.board().get_untracked()
    }

    fn dispatch(&self, msg: BoardMsg) -> Result<(), board_engine::store::StoreError> {
        let next = self.0.board().with_untracked(|board| reduce(board, msg))?;
        self.0.board().set(next);
        Ok(())
    }

    fn liveness(&self) -> Option<Liveness> {
        self.0.board().with_untracked(Board::liveness)
    }
}

// ========================
// Store Helper Functions
// ========================

/// Column `id` of the open board (tracked)
pub fn store_column(store: &AppStore, id: &ColumnId) -> Option<Column> {
    store.board().with(|board| board.column(id).cloned())
}

/// Column ids in display order (tracked)
pub fn store_column_order(store: &AppStore) -> Vec<ColumnId> {
    store.board().with(|board| board.column_order.clone())
}

/// Push a notification, returning its id
pub fn store_push_notification(store: &AppStore, level: NotificationLevel, message: String) -> u64 {
    let id = store.next_notification_id().get_untracked();
    store.next_notification_id().set(id + 1);
    store.notifications().write().push(Notification { id, level, message });
    id
}

/// Remove a notification by ID
pub fn store_dismiss_notification(store: &AppStore, id: u64) {
    store.notifications().write().retain(|notification| notification.id != id);
}
