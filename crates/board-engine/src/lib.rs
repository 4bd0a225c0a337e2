//! Board Engine
//!
//! Client-side state for a kanban board: the column/card store, drag
//! resolution with neighbor-anchored server commits, cursor pagination and
//! the geometry behind the virtualized card lists. Free of any UI or
//! transport dependency; the host supplies a [`BoardStore`] and a
//! [`BoardApi`].

pub mod api;
pub mod config;
pub mod drag;
pub mod engine;
pub mod error;
pub mod model;
pub mod ops;
pub mod pagination;
pub mod row_height;
pub mod store;
pub mod virtual_list;

#[cfg(test)]
mod testing;

pub use api::{BoardApi, MoveCardRequest};
pub use config::EngineConfig;
pub use drag::{CardSlot, DragEnd};
pub use engine::{BoardEngine, Outcome};
pub use error::{ApiError, ApiResult, EngineError, EngineResult};
pub use model::{
    Board, BoardId, BoardSummary, Card, CardId, CardPatch, Column, ColumnFilters, ColumnId, ColumnSummary, Priority, MAX_TITLE_LEN,
};
pub use pagination::LoadOutcome;
pub use store::{BoardMsg, BoardStore, LocalBoardStore};
