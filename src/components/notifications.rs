//! Notifications Component
//!
//! Transient messages stacked in the corner; each dismisses itself after
//! the configured timeout or on click.

use leptos::prelude::*;

use crate::context::use_board_context;
use crate::store::{store_dismiss_notification, AppStateStoreFields};

#[component]
pub fn Notifications() -> impl IntoView {
    let store = use_board_context().store;

    view! {
        <div class="notifications">
            <For
                each=move || store.notifications().get()
                key=|notification| notification.id
                children=move |notification| {
                    let id = notification.id;
                    let class = notification.level.class();
                    view! {
                        <div class=class on:click=move |_| store_dismiss_notification(&store, id)>
                            {notification.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
