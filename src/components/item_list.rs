//! Item List Component
//!
//! Virtualized card list of one column. Only the rows intersecting the
//! viewport (plus overscan) are mounted; a spacer keeps the scroll height.
//! Scrolling to the loaded bottom pages in older cards.

use board_engine::row_height::ApproximateRowHeight;
use board_engine::virtual_list::{ScrollWatcher, VirtualList};
use board_engine::{Card, Column, LoadOutcome};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{make_on_slot_mouseenter, DragKind, DropSlot};
use tracing::debug;

use crate::components::CardItem;
use crate::context::use_board_context;

/// A mounted row; `card` is `None` for the drop placeholder
#[derive(Debug, Clone, PartialEq)]
struct Row {
    index: usize,
    top: f64,
    height: f64,
    card: Option<Card>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Window {
    extent: f64,
    rows: Vec<Row>,
}

#[component]
pub fn ItemList(column: Memo<Option<Column>>) -> impl IntoView {
    let ctx = use_board_context();
    let dnd = ctx.dnd;
    let config = ctx.config().board;
    let estimator = ApproximateRowHeight::from(&config);
    let list_height = config.list_height;
    let overscan = config.overscan;

    let list = StoredValue::new(VirtualList::new(config.placeholder_row_height));
    let watcher = StoredValue::new(ScrollWatcher::new(config.bottom_tolerance));
    let (scroll_top, set_scroll_top) = signal(0.0f64);
    let id = column.with_untracked(|c| c.as_ref().map(|c| c.id.to_string()).unwrap_or_default());

    let window = {
        let id = id.clone();
        Memo::new(move |_| {
            let hovering = dnd.is_card_over(&id);
            let offset = scroll_top.get();
            column.with(|column| {
                let Some(column) = column else {
                    return Window::default();
                };
                list.update_value(|list| {
                    list.sync(column, &estimator);
                    list.set_placeholder(hovering);
                });
                list.with_value(|list| Window {
                    extent: list.scroll_extent(),
                    rows: list
                        .visible_range(offset, list_height, overscan)
                        .map(|index| Row {
                            index,
                            top: list.row_offset(index),
                            height: list.row_size(index),
                            card: column.cards.get(index).cloned(),
                        })
                        .collect(),
                })
            })
        })
    };

    let on_scroll = {
        let id = id.clone();
        move |ev: web_sys::Event| {
            let el = event_target::<web_sys::HtmlElement>(&ev);
            let offset = f64::from(el.scroll_top());
            let viewport = f64::from(el.client_height());
            set_scroll_top.set(offset);

            let suppressed = dnd.drop_slot_read.with_untracked(|slot| {
                slot.as_ref().is_some_and(|slot| slot.kind == DragKind::Card && slot.container == id)
            });
            let content_height = list.with_value(VirtualList::content_height);
            let at_bottom = watcher
                .try_update_value(|watcher| watcher.on_scroll(offset, viewport, content_height, suppressed))
                .unwrap_or(false);
            let Some((column_id, has_cards)) =
                column.with_untracked(|c| c.as_ref().map(|c| (c.id.clone(), !c.cards.is_empty())))
            else {
                return;
            };
            if !at_bottom || !has_cards {
                return;
            }
            let engine = ctx.engine();
            spawn_local(async move {
                match engine.load_more(&column_id).await {
                    Ok(LoadOutcome::Appended(count)) => debug!(%column_id, count, "older cards appended"),
                    Ok(outcome) => debug!(%column_id, ?outcome, "load more skipped"),
                    Err(err) => ctx.report("Loading older cards failed", &err),
                }
            });
        }
    };

    let rows = move || {
        let id = id.clone();
        window.with(|w| w.rows.clone()).into_iter().map(move |row| {
            let style = format!(
                "position: absolute; top: {}px; height: {}px; left: 0; right: 0;",
                row.top, row.height
            );
            match row.card {
                Some(card) => view! {
                    <div class="item-row" style=style>
                        <CardItem card=card index=row.index column_id=id.clone().into() />
                    </div>
                }.into_any(),
                None => {
                    let slot = DropSlot {
                        kind: DragKind::Card,
                        container: id.clone(),
                        index: row.index,
                    };
                    let container = id.clone();
                    let index = row.index;
                    view! {
                        <div
                            class=move || if dnd.is_slot_active(DragKind::Card, &container, index) {
                                "item-row item-placeholder active"
                            } else {
                                "item-row item-placeholder"
                            }
                            style=style
                            on:mouseenter=make_on_slot_mouseenter(dnd, slot)
                        />
                    }.into_any()
                }
            }
        }).collect_view()
    };

    view! {
        <div
            class="item-list"
            style=format!("height: {}px; overflow-y: auto;", list_height)
            on:scroll=on_scroll
        >
            <div
                class="item-list-inner"
                style=move || format!("height: {}px; position: relative;", window.with(|w| w.extent))
            >
                {rows}
            </div>
            <Show when=move || column.with(|c| c.as_ref().is_some_and(|c| c.loading_older))>
                <div class="item-list-loading">"Loading older cards..."</div>
            </Show>
        </div>
    }
}
