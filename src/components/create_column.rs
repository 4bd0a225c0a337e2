//! Create Column Component
//!
//! "Add column" tile at the end of the board.

use board_engine::ApiError;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_board_context;

#[component]
pub fn CreateColumn() -> impl IntoView {
    let ctx = use_board_context();

    let (open, set_open) = signal(false);
    let (name, set_name) = signal(String::new());
    let (error, set_error) = signal(None::<String>);

    let create_column = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let column_name = name.get_untracked();
        let engine = ctx.engine();
        spawn_local(async move {
            match engine.create_column(&column_name).await {
                Ok(_) => {
                    set_name.set(String::new());
                    set_error.set(None);
                    set_open.set(false);
                }
                Err(err) => match err.api() {
                    Some(ApiError::ValidationRejected { message, .. }) => set_error.set(Some(message.clone())),
                    _ => ctx.report("Creating column failed", &err),
                },
            }
        });
    };

    view! {
        <div class="create-column">
            <Show
                when=move || open.get()
                fallback=move || view! {
                    <button class="create-column-btn" on:click=move |_| set_open.set(true)>"+ Add column"</button>
                }
            >
                <form class="create-column-form" on:submit=create_column>
                    <input
                        type="text"
                        placeholder="Column name"
                        prop:value=move || name.get()
                        on:input=move |ev| {
                            set_name.set(event_target_value(&ev));
                            set_error.set(None);
                        }
                    />
                    <button type="submit">"Create"</button>
                    <button type="button" class="cancel-btn" on:click=move |_| set_open.set(false)>"Cancel"</button>
                    {move || error.get().map(|message| view! { <div class="form-error">{message}</div> })}
                </form>
            </Show>
        </div>
    }
}
