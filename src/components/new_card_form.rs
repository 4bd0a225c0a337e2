//! New Card Form Component
//!
//! Inline form at the top of a column. Rejected titles are reported on the
//! form itself.

use board_engine::{ApiError, ColumnId, MAX_TITLE_LEN};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_board_context;

#[component]
pub fn NewCardForm(column_id: ColumnId, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
    let ctx = use_board_context();

    let (new_title, set_new_title) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (saving, set_saving) = signal(false);

    let create_card = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let title = new_title.get_untracked();
        let column_id = column_id.clone();
        let engine = ctx.engine();
        set_saving.set(true);

        spawn_local(async move {
            let result = engine.create_card(&column_id, &title).await;
            set_saving.set(false);
            match result {
                Ok(_) => {
                    set_new_title.set(String::new());
                    set_error.set(None);
                    on_close.run(());
                }
                Err(err) => match err.api() {
                    Some(ApiError::ValidationRejected { message, .. }) => set_error.set(Some(message.clone())),
                    _ => ctx.report("Creating card failed", &err),
                },
            }
        });
    };

    view! {
        <form class="new-card-form" on:submit=create_card>
            <input
                type="text"
                placeholder="Card title..."
                maxlength=MAX_TITLE_LEN.to_string()
                prop:value=move || new_title.get()
                on:input=move |ev| {
                    set_new_title.set(event_target_value(&ev));
                    set_error.set(None);
                }
            />
            <div class="new-card-actions">
                <button type="submit" disabled=move || saving.get()>"Add"</button>
                <button type="button" class="cancel-btn" on:click=move |_| on_close.run(())>"Cancel"</button>
            </div>
            {move || error.get().map(|message| view! { <div class="form-error">{message}</div> })}
        </form>
    }
}
