//! Board Column Component
//!
//! One draggable column: header, inline new-card form and the virtualized
//! card list. Hovering a drag over the column makes it a drop target.

use board_engine::ColumnId;
use leptos::prelude::*;
use leptos_dragdrop::{make_on_mousedown, make_on_mouseleave, make_on_slot_mouseenter, DragKind, DragSource, DropSlot};

use crate::components::{ColumnHeader, ItemList, NewCardForm};
use crate::context::use_board_context;
use crate::store::{store_column, AppStateStoreFields};

#[component]
pub fn BoardColumn(column_id: ColumnId) -> impl IntoView {
    let ctx = use_board_context();
    let store = ctx.store;
    let dnd = ctx.dnd;
    let (adding_card, set_adding_card) = signal(false);

    // Re-renders only when this column changes
    let column = {
        let column_id = column_id.clone();
        Memo::new(move |_| store_column(&store, &column_id))
    };
    let index = {
        let column_id = column_id.clone();
        Memo::new(move |_| {
            store
                .board()
                .with(|board| board.column_order.iter().position(|id| id == &column_id))
                .unwrap_or_default()
        })
    };

    let id = column_id.to_string();
    let on_header_mousedown = {
        let id = id.clone();
        move |ev: web_sys::MouseEvent| {
            let source = DragSource {
                kind: DragKind::Column,
                id: id.clone(),
                container: String::new(),
                index: index.get_untracked(),
            };
            make_on_mousedown(dnd, source)(ev);
        }
    };
    // Column drags target this column's position; card drags its end
    let on_mouseenter = {
        let id = id.clone();
        move |ev: web_sys::MouseEvent| {
            let slot = match dnd.dragging_kind() {
                Some(DragKind::Column) => DropSlot {
                    kind: DragKind::Column,
                    container: String::new(),
                    index: index.get_untracked(),
                },
                Some(DragKind::Card) => DropSlot {
                    kind: DragKind::Card,
                    container: id.clone(),
                    index: column.with_untracked(|c| c.as_ref().map_or(0, |c| c.cards.len())),
                },
                None => return,
            };
            make_on_slot_mouseenter(dnd, slot)(ev);
        }
    };
    let on_mouseleave = make_on_mouseleave(dnd);

    let column_class = {
        let id = id.clone();
        move || {
            let mut c = String::from("board-column");
            if dnd.is_dragged(&id) {
                c.push_str(" dragging");
            }
            if dnd.is_slot_active(DragKind::Column, "", index.get()) && !dnd.is_dragged(&id) {
                c.push_str(" drop-target");
            }
            c
        }
    };

    view! {
        <Show when=move || column.with(Option::is_some)>
            <section
                class=column_class.clone()
                on:mouseenter=on_mouseenter.clone()
                on:mouseleave=on_mouseleave
            >
                <ColumnHeader
                    column=column
                    on_mousedown=Callback::new(on_header_mousedown.clone())
                    on_add=Callback::new(move |_: ()| set_adding_card.update(|v| *v = !*v))
                />
                {
                    let column_id = column_id.clone();
                    view! {
                        <Show when=move || adding_card.get()>
                            <NewCardForm
                                column_id=column_id.clone()
                                on_close=Callback::new(move |_: ()| set_adding_card.set(false))
                            />
                        </Show>
                    }
                }
                <ItemList column=column />
            </section>
        </Show>
    }
}
