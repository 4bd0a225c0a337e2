//! Board Store
//!
//! The board is changed only through [`BoardMsg`] values applied by
//! [`reduce`]. Hosts hold the resulting state behind the [`BoardStore`]
//! trait so the engine never touches a global.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::model::{Board, BoardId, Card, ColumnId};

/// Structural violations the store refuses to apply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("column {0} is listed in the order but has no entry")]
    DanglingColumn(ColumnId),
    #[error("column {0} has an entry but is missing from the order")]
    OrphanColumn(ColumnId),
    #[error("column {0} appears more than once in the order")]
    DuplicateColumn(ColumnId),
    #[error("column entry {key} holds column {id}")]
    MismatchedColumnId { key: ColumnId, id: ColumnId },
    #[error("merge names unknown column {0}")]
    UnknownColumn(ColumnId),
}

/// Shallow patch of one column. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPatch {
    pub name: Option<String>,
    pub cards: Option<Vec<Card>>,
    pub loading_older: Option<bool>,
    pub generation: Option<u64>,
    pub reloading: Option<bool>,
}

impl ColumnPatch {
    pub fn cards(cards: Vec<Card>) -> Self {
        Self {
            cards: Some(cards),
            ..Default::default()
        }
    }

    pub fn loading_older(loading: bool) -> Self {
        Self {
            loading_older: Some(loading),
            ..Default::default()
        }
    }

    pub fn with_loading_older(mut self, loading: bool) -> Self {
        self.loading_older = Some(loading);
        self
    }

    /// Start first-page reload `generation`
    pub fn reload(generation: u64) -> Self {
        Self {
            generation: Some(generation),
            reloading: Some(true),
            ..Default::default()
        }
    }

    pub fn with_reloading(mut self, reloading: bool) -> Self {
        self.reloading = Some(reloading);
        self
    }
}

/// Store messages
#[derive(Debug, Clone, PartialEq)]
pub enum BoardMsg {
    /// Replace the whole board
    Replace(Board),
    /// Merge partial columns into existing ones
    MergeColumns(HashMap<ColumnId, ColumnPatch>),
    /// Back to the empty board
    Reset,
}

impl BoardMsg {
    /// Merge touching a single column
    pub fn merge(column_id: ColumnId, patch: ColumnPatch) -> Self {
        BoardMsg::MergeColumns(HashMap::from([(column_id, patch)]))
    }
}

/// Identifies the board an async continuation was issued for.
///
/// `session` changes on `Reset` and whenever a `Replace` switches boards, so
/// a response that arrives after navigation never lands on the new board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Liveness {
    pub board_id: BoardId,
    pub session: u64,
}

/// Apply `msg` to `board`, producing the next state
pub fn reduce(board: &Board, msg: BoardMsg) -> Result<Board, StoreError> {
    match msg {
        BoardMsg::Replace(mut next) => {
            next.check_invariant()?;
            next.session = if next.board_id == board.board_id {
                board.session
            } else {
                board.session + 1
            };
            for column in next.columns.values_mut() {
                column.cursor = column.cards.last().map(|card| card.id.clone());
                column.revision = match board.columns.get(&column.id) {
                    Some(prev) if prev.cards == column.cards => prev.revision,
                    Some(prev) => prev.revision + 1,
                    None => column.revision,
                };
                // generations never go backwards while a column id lives
                if let Some(prev) = board.columns.get(&column.id) {
                    column.generation = column.generation.max(prev.generation);
                }
            }
            Ok(next)
        }
        BoardMsg::MergeColumns(patches) => {
            if let Some(unknown) = patches.keys().find(|id| !board.columns.contains_key(*id)) {
                return Err(StoreError::UnknownColumn(unknown.clone()));
            }
            let mut next = board.clone();
            for (id, patch) in patches {
                let Some(column) = next.columns.get_mut(&id) else {
                    continue;
                };
                if let Some(name) = patch.name {
                    column.name = name;
                }
                if let Some(cards) = patch.cards {
                    column.cursor = cards.last().map(|card| card.id.clone());
                    column.cards = cards;
                    column.revision += 1;
                }
                if let Some(loading) = patch.loading_older {
                    column.loading_older = loading;
                }
                if let Some(generation) = patch.generation {
                    column.generation = generation;
                }
                if let Some(reloading) = patch.reloading {
                    column.reloading = reloading;
                }
            }
            Ok(next)
        }
        BoardMsg::Reset => Ok(Board {
            session: board.session + 1,
            ..Default::default()
        }),
    }
}

/// A board container shared by reference between the engine and its host
pub trait BoardStore {
    /// Immutable copy of the current board
    fn snapshot(&self) -> Board;

    /// Apply a message synchronously
    fn dispatch(&self, msg: BoardMsg) -> Result<(), StoreError>;

    fn liveness(&self) -> Option<Liveness> {
        self.snapshot().liveness()
    }
}

/// Plain single-threaded store
#[derive(Clone, Default)]
pub struct LocalBoardStore {
    board: Rc<RefCell<Board>>,
}

impl LocalBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the board without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&Board) -> R) -> R {
        f(&self.board.borrow())
    }
}

impl BoardStore for LocalBoardStore {
    fn snapshot(&self) -> Board {
        self.board.borrow().clone()
    }

    fn dispatch(&self, msg: BoardMsg) -> Result<(), StoreError> {
        let next = reduce(&self.board.borrow(), msg)?;
        *self.board.borrow_mut() = next;
        Ok(())
    }

    fn liveness(&self) -> Option<Liveness> {
        self.board.borrow().liveness()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Card, CardId, Column};

    fn cards(ids: &[&str]) -> Vec<Card> {
        ids.iter().map(|id| Card::new(*id, id.to_uppercase())).collect()
    }

    fn two_column_board() -> Board {
        Board::new(
            "b1",
            [
                Column::new("todo", "To Do").with_cards(cards(&["a", "b"])),
                Column::new("done", "Done"),
            ],
        )
    }

    #[test]
    fn test_replace_accepts_consistent_board() {
        let next = reduce(&Board::default(), BoardMsg::Replace(two_column_board())).unwrap();
        assert_eq!(next.column_order.len(), next.columns.len());
        assert_eq!(next.board_id, Some(BoardId::from("b1")));
    }

    #[test]
    fn test_replace_rejects_dangling_order() {
        let mut broken = two_column_board();
        broken.columns.remove(&ColumnId::from("done"));

        let err = reduce(&Board::default(), BoardMsg::Replace(broken)).unwrap_err();
        assert_eq!(err, StoreError::DanglingColumn(ColumnId::from("done")));
    }

    #[test]
    fn test_merge_appends_without_touching_other_columns() {
        let board = reduce(&Board::default(), BoardMsg::Replace(two_column_board())).unwrap();
        let done_before = board.column(&ColumnId::from("done")).cloned();

        let mut merged = board.column(&ColumnId::from("todo")).unwrap().cards.clone();
        merged.extend(cards(&["e", "f"]));
        let next = reduce(&board, BoardMsg::merge(ColumnId::from("todo"), ColumnPatch::cards(merged))).unwrap();

        let todo = next.column(&ColumnId::from("todo")).unwrap();
        assert_eq!(todo.card_ids(), vec![CardId::from("a"), CardId::from("b"), CardId::from("e"), CardId::from("f")]);
        assert_eq!(todo.cursor, Some(CardId::from("f")));
        assert_eq!(todo.revision, 1);
        assert_eq!(next.column(&ColumnId::from("done")).cloned(), done_before);
    }

    #[test]
    fn test_merge_flag_only_keeps_revision() {
        let board = reduce(&Board::default(), BoardMsg::Replace(two_column_board())).unwrap();
        let next = reduce(&board, BoardMsg::merge(ColumnId::from("todo"), ColumnPatch::loading_older(true))).unwrap();

        let todo = next.column(&ColumnId::from("todo")).unwrap();
        assert!(todo.loading_older);
        assert_eq!(todo.revision, 0);
    }

    #[test]
    fn test_merge_unknown_column_is_rejected_atomically() {
        let board = reduce(&Board::default(), BoardMsg::Replace(two_column_board())).unwrap();
        let msg = BoardMsg::MergeColumns(HashMap::from([
            (ColumnId::from("todo"), ColumnPatch::cards(Vec::new())),
            (ColumnId::from("ghost"), ColumnPatch::cards(Vec::new())),
        ]));

        assert_eq!(reduce(&board, msg), Err(StoreError::UnknownColumn(ColumnId::from("ghost"))));
    }

    #[test]
    fn test_invariant_holds_across_message_sequences() {
        let store = LocalBoardStore::new();
        store.dispatch(BoardMsg::Replace(two_column_board())).unwrap();
        store
            .dispatch(BoardMsg::merge(ColumnId::from("done"), ColumnPatch::cards(cards(&["x"]))))
            .unwrap();

        let mut reordered = store.snapshot();
        reordered.column_order.reverse();
        store.dispatch(BoardMsg::Replace(reordered)).unwrap();

        let mut broken = store.snapshot();
        broken.column_order.push(ColumnId::from("todo"));
        assert!(store.dispatch(BoardMsg::Replace(broken)).is_err());

        store.with(|board| {
            assert_eq!(board.column_order.len(), board.columns.len());
            assert!(board.check_invariant().is_ok());
            assert_eq!(board.column_order, vec![ColumnId::from("done"), ColumnId::from("todo")]);
        });
    }

    #[test]
    fn test_session_changes_on_reset_and_board_switch() {
        let store = LocalBoardStore::new();
        store.dispatch(BoardMsg::Replace(two_column_board())).unwrap();
        let first = store.liveness().unwrap();

        store.dispatch(BoardMsg::Replace(store.snapshot())).unwrap();
        assert_eq!(store.liveness(), Some(first.clone()));

        store.dispatch(BoardMsg::Reset).unwrap();
        assert_eq!(store.liveness(), None);

        store.dispatch(BoardMsg::Replace(two_column_board())).unwrap();
        let second = store.liveness().unwrap();
        assert_eq!(second.board_id, first.board_id);
        assert_ne!(second.session, first.session);
    }

    #[test]
    fn test_replace_bumps_revision_only_for_changed_columns() {
        let store = LocalBoardStore::new();
        store.dispatch(BoardMsg::Replace(two_column_board())).unwrap();

        let mut next = store.snapshot();
        if let Some(todo) = next.columns.get_mut(&ColumnId::from("todo")) {
            todo.cards.reverse();
        }
        store.dispatch(BoardMsg::Replace(next)).unwrap();

        store.with(|board| {
            let todo = board.column(&ColumnId::from("todo")).unwrap();
            assert_eq!(todo.revision, 1);
            assert_eq!(todo.cursor, Some(CardId::from("a")));
            assert_eq!(board.column(&ColumnId::from("done")).unwrap().revision, 0);
        });
    }

    #[test]
    fn test_reopening_a_board_keeps_column_generation() {
        let store = LocalBoardStore::new();
        store.dispatch(BoardMsg::Replace(two_column_board())).unwrap();
        store
            .dispatch(BoardMsg::merge(ColumnId::from("todo"), ColumnPatch::reload(3).with_reloading(false)))
            .unwrap();

        // a fresh column list for the same board starts from generation 0
        store.dispatch(BoardMsg::Replace(two_column_board())).unwrap();

        store.with(|board| {
            let todo = board.column(&ColumnId::from("todo")).unwrap();
            assert_eq!(todo.generation, 3);
            assert!(!todo.reloading);
        });
    }
}
