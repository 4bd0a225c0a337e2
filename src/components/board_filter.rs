//! Board Filter Component
//!
//! Priority filter for the whole board. Changing it reloads every column's
//! first page.

use board_engine::{ColumnFilters, Priority};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_board_context;
use crate::models::PRIORITY_OPTIONS;
use crate::store::AppStateStoreFields;

#[component]
pub fn BoardFilter() -> impl IntoView {
    let ctx = use_board_context();
    let store = ctx.store;

    let on_change = move |ev: web_sys::Event| {
        let filters = ColumnFilters {
            priority: Priority::parse(&event_target_value(&ev)),
        };
        store.filters().set(filters.clone());
        let engine = ctx.engine();
        spawn_local(async move {
            if let Err(err) = engine.set_filters(filters).await {
                ctx.report("Filtering failed", &err);
            }
        });
    };

    let selected = move || store.filters().with(|f| f.priority.map(|p| p.as_str()).unwrap_or_default());

    view! {
        <label class="board-filter">
            <span class="board-filter-label">"Priority"</span>
            <select on:change=on_change prop:value=selected>
                <option value="">"All"</option>
                {PRIORITY_OPTIONS.iter().map(|(value, label)| view! {
                    <option value=*value>{*label}</option>
                }).collect_view()}
            </select>
        </label>
    }
}
