//! Card Item Component
//!
//! One card row: key, priority, due date and title. The row is a drag source
//! and the drop slot before itself; double-clicking the title edits it.

use board_engine::{ApiError, Card, CardPatch, ColumnId, Outcome, Priority};
use chrono::Utc;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{make_on_mousedown, make_on_slot_mouseenter, DragKind, DragSource, DropSlot};

use crate::components::{DeleteConfirmButton, PriorityBadge};
use crate::context::use_board_context;
use crate::models::{card_key, due_label, is_overdue, priority_label, NotificationLevel};

#[component]
pub fn CardItem(card: Card, index: usize, column_id: ColumnId) -> impl IntoView {
    let ctx = use_board_context();
    let dnd = ctx.dnd;
    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(card.title.clone());
    let (edit_error, set_edit_error) = signal(None::<String>);

    let id = card.id.to_string();
    let on_mousedown = make_on_mousedown(
        dnd,
        DragSource {
            kind: DragKind::Card,
            id: id.clone(),
            container: column_id.to_string(),
            index,
        },
    );
    let on_mouseenter = make_on_slot_mouseenter(
        dnd,
        DropSlot {
            kind: DragKind::Card,
            container: column_id.to_string(),
            index,
        },
    );

    let card_class = {
        let id = id.clone();
        let container = column_id.to_string();
        move || {
            let mut c = String::from("card-item");
            if dnd.is_dragged(&id) {
                c.push_str(" dragging");
            }
            if dnd.is_slot_active(DragKind::Card, &container, index) {
                c.push_str(" drop-before");
            }
            c
        }
    };

    let save_title = {
        let card_id = card.id.clone();
        move || {
            let title = draft.get_untracked();
            let card_id = card_id.clone();
            let engine = ctx.engine();
            spawn_local(async move {
                let patch = CardPatch {
                    title: Some(title),
                    ..Default::default()
                };
                match engine.update_card(&card_id, patch).await {
                    Ok(_) => {
                        set_edit_error.set(None);
                        set_editing.set(false);
                    }
                    Err(err) if matches!(err.api(), Some(ApiError::ValidationRejected { .. })) => {
                        set_edit_error.set(err.api().map(|api| api.message().to_string()));
                    }
                    Err(err) => ctx.report("Updating card failed", &err),
                }
            });
        }
    };

    let delete_card = {
        let card_id = card.id.clone();
        move |_: ()| {
            let card_id = card_id.clone();
            let engine = ctx.engine();
            spawn_local(async move {
                match engine.delete_card(&card_id).await {
                    Ok(Outcome::Done(())) => ctx.notify(NotificationLevel::Info, "Card deleted"),
                    Ok(_) => {}
                    Err(err) => ctx.report("Deleting card failed", &err),
                }
            });
        }
    };

    let set_priority = {
        let card_id = card.id.clone();
        move |value: String| {
            let card_id = card_id.clone();
            let patch = CardPatch {
                priority: Some(Priority::parse(&value)),
                ..Default::default()
            };
            let engine = ctx.engine();
            spawn_local(async move {
                if let Err(err) = engine.update_card(&card_id, patch).await {
                    ctx.report("Updating card failed", &err);
                }
            });
        }
    };

    let overdue = card.due_date.as_ref().is_some_and(|due| is_overdue(due, &Utc::now()));
    let due = card.due_date.as_ref().map(due_label);
    let author = card.created_by.as_ref().and_then(|by| by.display_name()).map(str::to_string);
    let key = card_key(&card);
    let title = card.title.clone();
    let priority = card.priority;

    view! {
        <div
            class=card_class
            on:mousedown=on_mousedown
            on:mouseenter=on_mouseenter
        >
            <div class="card-meta">
                <span class="card-key">{key}</span>
                <PriorityBadge priority=priority />
                <select
                    class="card-priority-select"
                    title="Priority"
                    on:change=move |ev| set_priority(event_target_value(&ev))
                >
                    <option value="" selected={priority.is_none()}>"-"</option>
                    {Priority::ALL.iter().map(|p| view! {
                        <option value=p.as_str() selected={priority == Some(*p)}>{priority_label(*p)}</option>
                    }).collect_view()}
                </select>
                <DeleteConfirmButton
                    button_class="card-delete-btn"
                    prompt="Delete card?"
                    on_confirm=Callback::new(delete_card)
                />
            </div>
            <Show
                when=move || editing.get()
                fallback={
                    let title = title.clone();
                    move || view! {
                        <div class="card-title" on:dblclick=move |_| set_editing.set(true)>{title.clone()}</div>
                    }
                }
            >
                {
                    let save_title = save_title.clone();
                    view! {
                        <input
                            class="card-title-input"
                            prop:value=move || draft.get()
                            on:input=move |ev| set_draft.set(event_target_value(&ev))
                            on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                                "Enter" => save_title(),
                                "Escape" => {
                                    set_edit_error.set(None);
                                    set_editing.set(false);
                                }
                                _ => {}
                            }
                        />
                    }
                }
                {move || edit_error.get().map(|message| view! { <div class="form-error">{message}</div> })}
            </Show>
            <div class="card-footer">
                {due.map(|due| view! {
                    <span class={if overdue { "card-due overdue" } else { "card-due" }}>{due}</span>
                })}
                {author.map(|name| view! { <span class="card-author">{name}</span> })}
            </div>
        </div>
    }
}
