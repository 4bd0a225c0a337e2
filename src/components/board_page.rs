//! Board Page Component
//!
//! Loads the board, lays out its columns left to right and turns finished
//! drags into engine gestures.

use board_engine::drag::destination_index_for_slot;
use board_engine::{ApiError, BoardId, CardId, CardSlot, ColumnId, DragEnd};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{bind_global_handlers, DragKind, DragSource, DropSlot};
use tracing::info;

use crate::components::{BoardColumn, BoardFilter, BoardNotFound, CreateColumn};
use crate::context::use_board_context;
use crate::store::{store_column_order, AppStateStoreFields, BoardLoadError};

/// Engine gesture for a finished mouse drag
pub fn drag_end_from(source: DragSource, slot: Option<DropSlot>) -> DragEnd {
    match source.kind {
        DragKind::Column => DragEnd::Column {
            column_id: ColumnId::from(source.id),
            source_index: source.index,
            destination_index: slot.map(|slot| slot.index),
        },
        DragKind::Card => {
            let from = CardSlot::new(source.container, source.index);
            let destination = slot.map(|slot| {
                let column_id = ColumnId::from(slot.container);
                let index = destination_index_for_slot(&from, &column_id, slot.index);
                CardSlot { column_id, index }
            });
            DragEnd::Card {
                card_id: CardId::from(source.id),
                source: from,
                destination,
            }
        }
    }
}

#[component]
pub fn BoardPage(board_id: BoardId) -> impl IntoView {
    let ctx = use_board_context();
    let store = ctx.store;
    let (loading, set_loading) = signal(true);

    // Load board on mount
    {
        let board_id = board_id.clone();
        store.load_error().set(None);
        spawn_local(async move {
            let result = ctx.engine().open_board(&board_id).await;
            set_loading.set(false);
            match result {
                Ok(_) => info!(%board_id, "board ready"),
                Err(err) => match err.api() {
                    Some(ApiError::NotFound { .. }) => store.load_error().set(Some(BoardLoadError::NotFound)),
                    _ if err.is_unauthorized() => ctx.report("Opening board", &err),
                    _ => store.load_error().set(Some(BoardLoadError::Failed(err.to_string()))),
                },
            }
        });
    }
    on_cleanup(move || ctx.close_board());

    // Drops become engine gestures
    bind_global_handlers(ctx.dnd, move |source, slot| {
        let event = drag_end_from(source, slot);
        let engine = ctx.engine();
        spawn_local(async move {
            if let Err(err) = engine.on_drag_end(event).await {
                ctx.report("Moving failed", &err);
            }
        });
    });

    let column_ids = move || store_column_order(&store);
    let board_name = move || store.board().with(|board| board.name.clone());

    view! {
        {move || match store.load_error().get() {
            Some(BoardLoadError::NotFound) => view! { <BoardNotFound /> }.into_any(),
            Some(BoardLoadError::Failed(message)) => view! {
                <div class="board-error">
                    <h2>"Could not load this board"</h2>
                    <p>{message}</p>
                </div>
            }.into_any(),
            None => view! {
                <div class="board-page">
                    <div class="board-toolbar">
                        <h1 class="board-name">{board_name}</h1>
                        <BoardFilter />
                        <Show when=move || loading.get()>
                            <span class="board-loading">"Loading..."</span>
                        </Show>
                    </div>
                    <div class="board-columns">
                        <For
                            each=column_ids
                            key=|id| id.clone()
                            children=move |id| view! { <BoardColumn column_id=id /> }
                        />
                        <CreateColumn />
                    </div>
                </div>
            }.into_any(),
        }}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_source(container: &str, index: usize) -> DragSource {
        DragSource {
            kind: DragKind::Card,
            id: "B".into(),
            container: container.into(),
            index,
        }
    }

    fn card_slot(container: &str, index: usize) -> DropSlot {
        DropSlot {
            kind: DragKind::Card,
            container: container.into(),
            index,
        }
    }

    #[test]
    fn test_moving_down_in_same_column_lands_before_hovered_row() {
        // B at 1 hovering the gap before row 3 of [A,B,C,D] ends at index 2
        let event = drag_end_from(card_source("doing", 1), Some(card_slot("doing", 3)));
        assert_eq!(
            event,
            DragEnd::Card {
                card_id: CardId::from("B"),
                source: CardSlot::new("doing", 1),
                destination: Some(CardSlot::new("doing", 2)),
            }
        );
    }

    #[test]
    fn test_other_column_keeps_slot_index() {
        let event = drag_end_from(card_source("doing", 0), Some(card_slot("todo", 0)));
        let DragEnd::Card { destination, .. } = event else {
            panic!("expected a card drag");
        };
        assert_eq!(destination, Some(CardSlot::new("todo", 0)));
    }

    #[test]
    fn test_release_outside_has_no_destination() {
        let column = DragSource {
            kind: DragKind::Column,
            id: "todo".into(),
            container: String::new(),
            index: 0,
        };
        assert_eq!(
            drag_end_from(column, None),
            DragEnd::Column {
                column_id: ColumnId::from("todo"),
                source_index: 0,
                destination_index: None,
            }
        );
    }
}
