//! Board Engine
//!
//! Glues the store, the remote API and the pure drag planner together.
//! Every operation that awaits the server captures the board's liveness key
//! first and drops its result if the board was closed or switched meanwhile.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::api::BoardApi;
use crate::config::EngineConfig;
use crate::drag::{plan, resolve_drag, Commit, DragEnd, Rollback};
use crate::error::{EngineError, EngineResult};
use crate::model::{BoardId, ColumnFilters};
use crate::store::{BoardMsg, BoardStore, Liveness};

/// Result of an operation that may end without effect
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    /// Nothing to do, no request was sent
    NoOp,
    /// The board changed while the request was in flight; the response was
    /// dropped
    Discarded,
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            _ => None,
        }
    }
}

/// A gesture whose optimistic update is applied and whose server commit is
/// still owed
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommit {
    pub liveness: Liveness,
    pub commit: Commit,
    pub rollback: Rollback,
}

pub struct BoardEngine<S, A> {
    store: S,
    api: Rc<A>,
    config: Rc<EngineConfig>,
    filters: Rc<RefCell<ColumnFilters>>,
}

impl<S: Clone, A> Clone for BoardEngine<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            api: self.api.clone(),
            config: self.config.clone(),
            filters: self.filters.clone(),
        }
    }
}

impl<S, A> BoardEngine<S, A>
where
    S: BoardStore,
    A: BoardApi,
{
    pub fn new(store: S, api: A, config: EngineConfig) -> Self {
        Self {
            store,
            api: Rc::new(api),
            config: Rc::new(config),
            filters: Rc::new(RefCell::new(ColumnFilters::default())),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Filters sent with every page request
    pub fn filters(&self) -> ColumnFilters {
        self.filters.borrow().clone()
    }

    pub(crate) fn replace_filters(&self, filters: ColumnFilters) {
        *self.filters.borrow_mut() = filters;
    }

    /// Id and liveness key of the open board
    pub(crate) fn active(&self) -> EngineResult<(BoardId, Liveness)> {
        let liveness = self.store.liveness().ok_or(EngineError::NoActiveBoard)?;
        Ok((liveness.board_id.clone(), liveness))
    }

    /// Whether the board a continuation was issued for is still open
    pub fn is_live(&self, liveness: &Liveness) -> bool {
        self.store.liveness().as_ref() == Some(liveness)
    }

    /// Apply `msg`. A rejected message is a bug in the caller.
    pub(crate) fn dispatch(&self, msg: BoardMsg) -> EngineResult<()> {
        self.store.dispatch(msg).map_err(|err| {
            error!(error = %err, "board store rejected message");
            debug_assert!(false, "board store rejected message: {}", err);
            EngineError::from(err)
        })
    }

    /// Resolve a finished gesture and apply its optimistic update.
    ///
    /// Returns `None` when the gesture changes nothing. The returned commit
    /// must be passed to [`BoardEngine::commit`].
    pub fn begin_drag(&self, event: &DragEnd) -> EngineResult<Option<PendingCommit>> {
        let Some(intent) = resolve_drag(event) else {
            debug!(?event, "drag ended without effect");
            return Ok(None);
        };
        let (_, liveness) = self.active()?;
        let drag_plan = plan(&self.store.snapshot(), intent)?;
        self.dispatch(drag_plan.message)?;
        Ok(Some(PendingCommit {
            liveness,
            commit: drag_plan.commit,
            rollback: drag_plan.rollback,
        }))
    }

    /// Send a gesture's commit to the server, undoing the optimistic update
    /// on failure when configured to and when nothing else has touched the
    /// same columns since.
    pub async fn commit(&self, pending: PendingCommit) -> EngineResult<Outcome<()>> {
        let PendingCommit {
            liveness,
            commit,
            rollback,
        } = pending;
        let board_id = &liveness.board_id;

        let result = match &commit {
            Commit::ReorderColumns { column_order } => self.api.reorder_columns(board_id, column_order).await,
            Commit::MoveCard {
                card_id,
                source_column_id,
                request,
            } => self.api.move_card(board_id, source_column_id, card_id, request).await,
        };

        if !self.is_live(&liveness) {
            debug!(%board_id, "board closed before commit finished, dropping result");
            return Ok(Outcome::Discarded);
        }

        match result {
            Ok(()) => {
                info!(%board_id, ?commit, "drag committed");
                Ok(Outcome::Done(()))
            }
            Err(err) => {
                warn!(%board_id, error = %err, "drag commit failed");
                if self.config.rollback_on_commit_failure {
                    match rollback.restore(&self.store.snapshot()) {
                        Some(msg) => self.dispatch(msg)?,
                        None => warn!(%board_id, "board changed since the drag, keeping optimistic state"),
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Apply a finished gesture and commit it
    pub async fn on_drag_end(&self, event: DragEnd) -> EngineResult<Outcome<()>> {
        match self.begin_drag(&event)? {
            Some(pending) => self.commit(pending).await,
            None => Ok(Outcome::NoOp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::CardSlot;
    use crate::error::ApiError;
    use crate::model::{Board, Card, CardId, Column, ColumnId};
    use crate::store::{ColumnPatch, LocalBoardStore};
    use crate::testing::{Call, MockApi};

    fn engine_with(board: Board) -> BoardEngine<LocalBoardStore, MockApi> {
        let store = LocalBoardStore::new();
        store.dispatch(BoardMsg::Replace(board)).unwrap();
        BoardEngine::new(store, MockApi::default(), EngineConfig::default())
    }

    fn cards(ids: &[&str]) -> Vec<Card> {
        ids.iter().map(|id| Card::new(*id, format!("Card {}", id))).collect()
    }

    fn ids(engine: &BoardEngine<LocalBoardStore, MockApi>, column: &str) -> Vec<String> {
        engine.store().with(|board| {
            board
                .column(&ColumnId::from(column))
                .map(|c| c.cards.iter().map(|card| card.id.to_string()).collect())
                .unwrap_or_default()
        })
    }

    fn card_drag(card: &str, from: (&str, usize), to: Option<(&str, usize)>) -> DragEnd {
        DragEnd::Card {
            card_id: CardId::from(card),
            source: CardSlot::new(from.0, from.1),
            destination: to.map(|(column, index)| CardSlot::new(column, index)),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_move_into_empty_column() {
        let engine = engine_with(Board::new(
            "b1",
            [
                Column::new("todo", "To Do"),
                Column::new("doing", "Doing").with_cards(cards(&["X"])),
            ],
        ));

        let outcome = engine.on_drag_end(card_drag("X", ("doing", 0), Some(("todo", 0)))).await.unwrap();

        assert_eq!(outcome, Outcome::Done(()));
        assert_eq!(ids(&engine, "todo"), vec!["X"]);
        assert!(ids(&engine, "doing").is_empty());
        let moved_owner = engine.store().with(|board| {
            board.column(&ColumnId::from("todo")).unwrap().cards[0].column_id.clone()
        });
        assert_eq!(moved_owner, Some(ColumnId::from("todo")));

        let calls = engine.api().calls();
        assert_eq!(calls.len(), 1);
        let Call::MoveCard { card_id, source_column_id, request } = &calls[0] else {
            panic!("expected move_card, got {:?}", calls[0]);
        };
        assert_eq!(card_id, &CardId::from("X"));
        assert_eq!(source_column_id, &ColumnId::from("doing"));
        assert_eq!(request.destination_column_id, ColumnId::from("todo"));
        assert_eq!(request.destination_index, 0);
        assert!(!request.placed_at_top);
        assert_eq!(request.target_card_id, None);
        assert_eq!(serde_json::to_value(request).unwrap()["targetCardId"], "");
    }

    #[tokio::test]
    async fn test_column_drop_on_same_index_sends_nothing() {
        let engine = engine_with(Board::new("b1", [Column::new("a", "A"), Column::new("b", "B")]));
        let before = engine.store().snapshot();

        let event = DragEnd::Column {
            column_id: ColumnId::from("b"),
            source_index: 1,
            destination_index: Some(1),
        };
        assert_eq!(engine.on_drag_end(event).await.unwrap(), Outcome::NoOp);

        assert_eq!(engine.store().snapshot(), before);
        assert!(engine.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_drop_outside_is_a_noop() {
        let engine = engine_with(Board::new("b1", [Column::new("a", "A").with_cards(cards(&["x"]))]));
        let before = engine.store().snapshot();

        assert_eq!(engine.on_drag_end(card_drag("x", ("a", 0), None)).await.unwrap(), Outcome::NoOp);
        assert_eq!(engine.store().snapshot(), before);
        assert!(engine.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_column_reorder_commits_full_order() {
        let engine = engine_with(Board::new(
            "b1",
            [Column::new("a", "A"), Column::new("b", "B"), Column::new("c", "C")],
        ));
        let event = DragEnd::Column {
            column_id: ColumnId::from("a"),
            source_index: 0,
            destination_index: Some(2),
        };
        engine.on_drag_end(event).await.unwrap();

        let expected: Vec<ColumnId> = ["b", "c", "a"].into_iter().map(ColumnId::from).collect();
        assert_eq!(engine.store().snapshot().column_order, expected);
        assert_eq!(engine.api().calls(), vec![Call::ReorderColumns(expected)]);
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back() {
        let engine = engine_with(Board::new(
            "b1",
            [
                Column::new("todo", "To Do"),
                Column::new("doing", "Doing").with_cards(cards(&["X", "Y"])),
            ],
        ));
        engine.api().fail_next(ApiError::from_status(500, "boom"));

        let err = engine
            .on_drag_end(card_drag("X", ("doing", 0), Some(("todo", 0))))
            .await
            .unwrap_err();

        assert!(matches!(err.api(), Some(ApiError::NetworkOrServerFailure { .. })));
        assert!(ids(&engine, "todo").is_empty());
        assert_eq!(ids(&engine, "doing"), vec!["X", "Y"]);
    }

    #[tokio::test]
    async fn test_failed_column_reorder_rolls_back() {
        let engine = engine_with(Board::new("b1", [Column::new("a", "A"), Column::new("b", "B")]));
        let before = engine.store().snapshot().column_order;
        engine.api().fail_next(ApiError::from_status(503, "unavailable"));

        let event = DragEnd::Column {
            column_id: ColumnId::from("a"),
            source_index: 0,
            destination_index: Some(1),
        };
        assert!(engine.on_drag_end(event).await.is_err());
        assert_eq!(engine.store().snapshot().column_order, before);
    }

    #[tokio::test]
    async fn test_rollback_skipped_when_column_changed_meanwhile() {
        let engine = engine_with(Board::new(
            "b1",
            [
                Column::new("todo", "To Do"),
                Column::new("doing", "Doing").with_cards(cards(&["X", "Y"])),
            ],
        ));
        engine.api().fail_next(ApiError::from_status(500, "boom"));

        let pending = engine
            .begin_drag(&card_drag("X", ("doing", 0), Some(("todo", 0))))
            .unwrap()
            .unwrap();
        // an older page lands in the source column before the commit fails
        engine
            .store()
            .dispatch(BoardMsg::merge(ColumnId::from("doing"), ColumnPatch::cards(cards(&["Y", "Z"]))))
            .unwrap();

        assert!(engine.commit(pending).await.is_err());
        assert_eq!(ids(&engine, "todo"), vec!["X"]);
        assert_eq!(ids(&engine, "doing"), vec!["Y", "Z"]);
    }

    #[tokio::test]
    async fn test_rollback_can_be_disabled() {
        let store = LocalBoardStore::new();
        store
            .dispatch(BoardMsg::Replace(Board::new(
                "b1",
                [Column::new("a", "A").with_cards(cards(&["x", "y"]))],
            )))
            .unwrap();
        let config = EngineConfig {
            rollback_on_commit_failure: false,
            ..EngineConfig::default()
        };
        let engine = BoardEngine::new(store, MockApi::default(), config);
        engine.api().fail_next(ApiError::from_status(500, "boom"));

        assert!(engine.on_drag_end(card_drag("x", ("a", 0), Some(("a", 1)))).await.is_err());
        assert_eq!(ids(&engine, "a"), vec!["y", "x"]);
    }

    #[tokio::test]
    async fn test_commit_after_close_is_discarded() {
        let engine = engine_with(Board::new(
            "b1",
            [Column::new("a", "A").with_cards(cards(&["x", "y"]))],
        ));
        engine.api().fail_next(ApiError::from_status(500, "boom"));

        let pending = engine
            .begin_drag(&card_drag("x", ("a", 0), Some(("a", 1))))
            .unwrap()
            .unwrap();
        let (outcome, ()) = futures::join!(engine.commit(pending), async { engine.close_board().unwrap() });

        assert_eq!(outcome.unwrap(), Outcome::Discarded);
        assert_eq!(engine.store().snapshot(), Board { session: 2, ..Board::default() });
    }

    #[tokio::test]
    async fn test_stale_gesture_is_refused() {
        let engine = engine_with(Board::new(
            "b1",
            [Column::new("a", "A").with_cards(cards(&["x", "y"]))],
        ));
        let before = engine.store().snapshot();

        let err = engine
            .on_drag_end(card_drag("x", ("a", 1), Some(("a", 0))))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::StaleGesture(_)));
        assert_eq!(engine.store().snapshot(), before);
        assert!(engine.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_drag_without_open_board() {
        let engine = BoardEngine::new(LocalBoardStore::new(), MockApi::default(), EngineConfig::default());
        let err = engine
            .on_drag_end(card_drag("x", ("a", 0), Some(("a", 1))))
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::NoActiveBoard);
    }
}
