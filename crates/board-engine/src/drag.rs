//! Drag Resolution
//!
//! Turns a finished drag gesture into an intent, then plans the optimistic
//! board update, the server commit and the state needed to undo it.
//! Everything here is pure; `BoardEngine` does the dispatching.

use std::collections::HashMap;

use crate::api::MoveCardRequest;
use crate::error::{EngineError, EngineResult};
use crate::model::{Board, Card, CardId, Column, ColumnId};
use crate::store::{BoardMsg, ColumnPatch};

/// Position of a card slot inside a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSlot {
    pub column_id: ColumnId,
    pub index: usize,
}

impl CardSlot {
    pub fn new(column_id: impl Into<ColumnId>, index: usize) -> Self {
        Self {
            column_id: column_id.into(),
            index,
        }
    }
}

/// A finished drag gesture. `None` destinations mean the drop missed every
/// target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEnd {
    Column {
        column_id: ColumnId,
        source_index: usize,
        destination_index: Option<usize>,
    },
    Card {
        card_id: CardId,
        source: CardSlot,
        destination: Option<CardSlot>,
    },
}

/// What a gesture asks the board to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragIntent {
    ReorderColumns {
        column_id: ColumnId,
        from: usize,
        to: usize,
    },
    ReorderCardsInColumn {
        card_id: CardId,
        column_id: ColumnId,
        from: usize,
        to: usize,
    },
    MoveCardAcrossColumns {
        card_id: CardId,
        source: CardSlot,
        destination: CardSlot,
    },
}

/// Classify a gesture. Drops outside any target and drops back onto the
/// starting index resolve to nothing.
pub fn resolve_drag(event: &DragEnd) -> Option<DragIntent> {
    match event {
        DragEnd::Column {
            column_id,
            source_index,
            destination_index,
        } => {
            let to = (*destination_index)?;
            (to != *source_index).then(|| DragIntent::ReorderColumns {
                column_id: column_id.clone(),
                from: *source_index,
                to,
            })
        }
        DragEnd::Card {
            card_id,
            source,
            destination,
        } => {
            let destination = destination.as_ref()?;
            if destination.column_id == source.column_id {
                (destination.index != source.index).then(|| DragIntent::ReorderCardsInColumn {
                    card_id: card_id.clone(),
                    column_id: source.column_id.clone(),
                    from: source.index,
                    to: destination.index,
                })
            } else {
                Some(DragIntent::MoveCardAcrossColumns {
                    card_id: card_id.clone(),
                    source: source.clone(),
                    destination: destination.clone(),
                })
            }
        }
    }
}

/// Final index of a card dropped into the gap before row `slot`.
///
/// Hover targets name the gap in the list as rendered, which still contains
/// the dragged card; moving down inside the same column lands one lower.
pub fn destination_index_for_slot(source: &CardSlot, slot_column: &ColumnId, slot: usize) -> usize {
    if &source.column_id == slot_column && source.index < slot {
        slot - 1
    } else {
        slot
    }
}

/// Neighbor-relative placement sent to the server
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardAnchor {
    pub target_card_id: Option<CardId>,
    pub placed_at_top: bool,
}

/// Anchor for inserting at `destination_index` into `pre_insert`, the
/// destination sequence without the moved card.
///
/// Index 0 anchors on the previous head (if any) and flags `placed_at_top`;
/// any other index anchors on the card the moved card now follows.
pub fn compute_anchor(pre_insert: &[Card], destination_index: usize) -> CardAnchor {
    if destination_index == 0 {
        return CardAnchor {
            target_card_id: pre_insert.first().map(|card| card.id.clone()),
            placed_at_top: !pre_insert.is_empty(),
        };
    }
    let after = destination_index.min(pre_insert.len());
    CardAnchor {
        target_card_id: after.checked_sub(1).and_then(|i| pre_insert.get(i)).map(|card| card.id.clone()),
        placed_at_top: false,
    }
}

/// Server request for a planned gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    ReorderColumns {
        column_order: Vec<ColumnId>,
    },
    MoveCard {
        card_id: CardId,
        source_column_id: ColumnId,
        request: MoveCardRequest,
    },
}

/// Pre-gesture state of everything a plan touches
#[derive(Debug, Clone, PartialEq)]
pub enum Rollback {
    ColumnOrder {
        previous: Vec<ColumnId>,
        /// Order right after the optimistic update
        applied: Vec<ColumnId>,
    },
    Cards {
        /// Columns as they were before the gesture
        previous: Vec<Column>,
    },
}

impl Rollback {
    /// Message restoring the pre-gesture state, provided nothing else has
    /// touched the affected columns since the optimistic update
    pub fn restore(&self, current: &Board) -> Option<BoardMsg> {
        match self {
            Rollback::ColumnOrder { previous, applied } => {
                if &current.column_order != applied {
                    return None;
                }
                let mut next = current.clone();
                next.column_order = previous.clone();
                next.check_invariant().ok()?;
                Some(BoardMsg::Replace(next))
            }
            Rollback::Cards { previous } => {
                let mut patches = HashMap::with_capacity(previous.len());
                for before in previous {
                    let now = current.column(&before.id)?;
                    // the optimistic merge bumped each touched column exactly once
                    if now.revision != before.revision + 1 {
                        return None;
                    }
                    patches.insert(before.id.clone(), ColumnPatch::cards(before.cards.clone()));
                }
                Some(BoardMsg::MergeColumns(patches))
            }
        }
    }
}

/// Optimistic update, commit and undo information for one gesture
#[derive(Debug, Clone, PartialEq)]
pub struct DragPlan {
    pub message: BoardMsg,
    pub commit: Commit,
    pub rollback: Rollback,
}

/// Plan `intent` against the current board.
///
/// The source position must still hold the dragged entity; if the list
/// changed under the gesture the plan is refused rather than moving the
/// wrong card.
pub fn plan(board: &Board, intent: DragIntent) -> EngineResult<DragPlan> {
    match intent {
        DragIntent::ReorderColumns { column_id, from, to } => {
            if board.column_order.get(from) != Some(&column_id) {
                return Err(EngineError::StaleGesture(format!("column {} is not at index {}", column_id, from)));
            }
            let mut order = board.column_order.clone();
            let moved = order.remove(from);
            let to = to.min(order.len());
            order.insert(to, moved);

            let mut next = board.clone();
            next.column_order = order.clone();
            Ok(DragPlan {
                message: BoardMsg::Replace(next),
                commit: Commit::ReorderColumns {
                    column_order: order.clone(),
                },
                rollback: Rollback::ColumnOrder {
                    previous: board.column_order.clone(),
                    applied: order,
                },
            })
        }
        DragIntent::ReorderCardsInColumn {
            card_id,
            column_id,
            from,
            to,
        } => {
            let column = board
                .column(&column_id)
                .ok_or_else(|| EngineError::UnknownColumn(column_id.clone()))?;
            check_source(column, &card_id, from)?;

            let mut cards = column.cards.clone();
            let moved = cards.remove(from);
            let to = to.min(cards.len());
            let anchor = compute_anchor(&cards, to);
            cards.insert(to, moved);

            Ok(DragPlan {
                message: BoardMsg::merge(column_id.clone(), ColumnPatch::cards(cards)),
                commit: move_commit(card_id, column_id.clone(), column_id, to, anchor),
                rollback: Rollback::Cards {
                    previous: vec![column.clone()],
                },
            })
        }
        DragIntent::MoveCardAcrossColumns {
            card_id,
            source,
            destination,
        } => {
            let source_column = board
                .column(&source.column_id)
                .ok_or_else(|| EngineError::UnknownColumn(source.column_id.clone()))?;
            let destination_column = board
                .column(&destination.column_id)
                .ok_or_else(|| EngineError::UnknownColumn(destination.column_id.clone()))?;
            check_source(source_column, &card_id, source.index)?;

            let mut source_cards = source_column.cards.clone();
            let moved = source_cards.remove(source.index).moved_to(&destination.column_id);

            let mut destination_cards = destination_column.cards.clone();
            let to = destination.index.min(destination_cards.len());
            let anchor = compute_anchor(&destination_cards, to);
            destination_cards.insert(to, moved);

            let message = BoardMsg::MergeColumns(HashMap::from([
                (source.column_id.clone(), ColumnPatch::cards(source_cards)),
                (destination.column_id.clone(), ColumnPatch::cards(destination_cards)),
            ]));
            Ok(DragPlan {
                message,
                commit: move_commit(card_id, source.column_id, destination.column_id, to, anchor),
                rollback: Rollback::Cards {
                    previous: vec![source_column.clone(), destination_column.clone()],
                },
            })
        }
    }
}

fn check_source(column: &Column, card_id: &CardId, index: usize) -> EngineResult<()> {
    match column.cards.get(index) {
        Some(card) if &card.id == card_id => Ok(()),
        _ => Err(EngineError::StaleGesture(format!(
            "card {} is not at index {} of column {}",
            card_id, index, column.id
        ))),
    }
}

fn move_commit(
    card_id: CardId,
    source_column_id: ColumnId,
    destination_column_id: ColumnId,
    destination_index: usize,
    anchor: CardAnchor,
) -> Commit {
    Commit::MoveCard {
        card_id,
        source_column_id,
        request: MoveCardRequest {
            destination_column_id,
            destination_index,
            target_card_id: anchor.target_card_id,
            placed_at_top: anchor.placed_at_top,
        },
    }
}
