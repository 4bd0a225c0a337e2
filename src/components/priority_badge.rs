//! Priority Badge Component

use board_engine::Priority;
use leptos::prelude::*;

use crate::models::{priority_class, priority_label};

/// Colored priority label; keeps its space when the card has none
#[component]
pub fn PriorityBadge(priority: Option<Priority>) -> impl IntoView {
    match priority {
        Some(priority) => view! {
            <span class=priority_class(priority)>{priority_label(priority)}</span>
        }.into_any(),
        None => view! { <span class="priority-badge hidden"></span> }.into_any(),
    }
}
