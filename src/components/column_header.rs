//! Column Header Component
//!
//! Drag handle of a column with its name, card count and actions.

use board_engine::{Column, Outcome};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::DeleteConfirmButton;
use crate::context::use_board_context;
use crate::models::NotificationLevel;

#[component]
pub fn ColumnHeader(
    column: Memo<Option<Column>>,
    #[prop(into)] on_mousedown: Callback<web_sys::MouseEvent>,
    #[prop(into)] on_add: Callback<()>,
) -> impl IntoView {
    let ctx = use_board_context();

    let name = move || column.with(|c| c.as_ref().map(|c| c.name.clone()).unwrap_or_default());
    let count = move || column.with(|c| c.as_ref().map_or(0, |c| c.cards.len()));

    let delete_column = move |_: ()| {
        let Some(column_id) = column.with_untracked(|c| c.as_ref().map(|c| c.id.clone())) else {
            return;
        };
        let engine = ctx.engine();
        spawn_local(async move {
            match engine.delete_column(&column_id).await {
                Ok(Outcome::Done(())) => ctx.notify(NotificationLevel::Info, "Column deleted"),
                Ok(_) => {}
                Err(err) => ctx.report("Deleting column failed", &err),
            }
        });
    };

    view! {
        <header class="column-header" on:mousedown=move |ev| on_mousedown.run(ev)>
            <span class="column-name">{name}</span>
            <span class="column-count">{count}</span>
            <button
                class="add-card-btn"
                title="New card"
                on:click=move |ev| {
                    ev.stop_propagation();
                    on_add.run(());
                }
            >
                "+"
            </button>
            <DeleteConfirmButton
                button_class="column-delete-btn"
                prompt="Delete column?"
                on_confirm=Callback::new(delete_column)
            />
        </header>
    }
}
