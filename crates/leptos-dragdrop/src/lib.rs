//! Leptos DragDrop Utilities
//!
//! Mouse-event drag-and-drop for ordered lists of lists (columns of cards).
//! Uses a movement threshold to distinguish click from drag. A gesture ends
//! with the drag source and the slot under the pointer, if any.

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// What is being dragged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragKind {
    /// A whole list, reordered within its parent
    Column,
    /// An entry, moved within or between lists
    Card,
}

/// Where a drag started
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragSource {
    pub kind: DragKind,
    /// Id of the dragged entity
    pub id: String,
    /// Id of the list holding it; empty for columns
    pub container: String,
    pub index: usize,
}

/// A gap a drag can end in: before row `index` of `container`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropSlot {
    pub kind: DragKind,
    pub container: String,
    pub index: usize,
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_read: ReadSignal<Option<DragSource>>,
    pub dragging_write: WriteSignal<Option<DragSource>>,
    pub drop_slot_read: ReadSignal<Option<DropSlot>>,
    pub drop_slot_write: WriteSignal<Option<DropSlot>>,
    /// Pending source (mousedown but not yet dragging)
    pub pending_read: ReadSignal<Option<DragSource>>,
    pub pending_write: WriteSignal<Option<DragSource>>,
    /// Start position for movement detection
    pub start_x_read: ReadSignal<i32>,
    pub start_x_write: WriteSignal<i32>,
    pub start_y_read: ReadSignal<i32>,
    pub start_y_write: WriteSignal<i32>,
}

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

pub fn create_dnd_signals() -> DndSignals {
    let (dragging_read, dragging_write) = signal(None::<DragSource>);
    let (drop_slot_read, drop_slot_write) = signal(None::<DropSlot>);
    let (pending_read, pending_write) = signal(None::<DragSource>);
    let (start_x_read, start_x_write) = signal(0i32);
    let (start_y_read, start_y_write) = signal(0i32);
    DndSignals {
        dragging_read,
        dragging_write,
        drop_slot_read,
        drop_slot_write,
        pending_read,
        pending_write,
        start_x_read,
        start_x_write,
        start_y_read,
        start_y_write,
    }
}

impl DndSignals {
    /// Kind of the drag in progress (untracked, for event handlers)
    pub fn dragging_kind(&self) -> Option<DragKind> {
        self.dragging_read
            .with_untracked(|dragging| dragging.as_ref().map(|source| source.kind))
    }

    /// Whether `id` is the entity being dragged (tracked)
    pub fn is_dragged(&self, id: &str) -> bool {
        self.dragging_read
            .with(|dragging| dragging.as_ref().is_some_and(|source| source.id == id))
    }

    /// Whether a card drag currently hovers `container` (tracked)
    pub fn is_card_over(&self, container: &str) -> bool {
        self.drop_slot_read.with(|slot| {
            slot.as_ref()
                .is_some_and(|slot| slot.kind == DragKind::Card && slot.container == container)
        })
    }

    /// Whether the hovered slot is exactly `slot` (tracked)
    pub fn is_slot_active(&self, kind: DragKind, container: &str, index: usize) -> bool {
        self.drop_slot_read.with(|slot| {
            slot.as_ref()
                .is_some_and(|slot| slot.kind == kind && slot.container == container && slot.index == index)
        })
    }
}

/// Whether the pointer moved far enough from the press to start a drag
pub fn exceeds_threshold(dx: i32, dy: i32) -> bool {
    dx.abs() > DRAG_THRESHOLD_PX || dy.abs() > DRAG_THRESHOLD_PX
}

/// Whether a drag of `source` may end in `slot`
pub fn accepts(source: &DragSource, slot: &DropSlot) -> bool {
    source.kind == slot.kind
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    dnd.dragging_write.set(None);
    dnd.drop_slot_write.set(None);
    dnd.pending_write.set(None);
}

/// Create mousedown handler for a draggable element.
/// Records a pending drag with start position.
pub fn make_on_mousedown(dnd: DndSignals, source: DragSource) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        // Form controls keep their own mouse handling
        if let Some(target) = ev.target() {
            if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() {
                return;
            }
            if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() {
                return;
            }
            if target.dyn_ref::<web_sys::HtmlSelectElement>().is_some() {
                return;
            }
        }
        // A card press bubbles up to its column; the innermost source wins
        if dnd.pending_read.get_untracked().is_some() {
            return;
        }
        dnd.pending_write.set(Some(source.clone()));
        dnd.start_x_write.set(ev.client_x());
        dnd.start_y_write.set(ev.client_y());
    }
}

/// Create mouseenter handler for a drop slot
pub fn make_on_slot_mouseenter(dnd: DndSignals, slot: DropSlot) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |_ev: web_sys::MouseEvent| {
        let accepted = dnd
            .dragging_read
            .with_untracked(|dragging| dragging.as_ref().is_some_and(|source| accepts(source, &slot)));
        if accepted {
            dnd.drop_slot_write.set(Some(slot.clone()));
        }
    }
}

/// Create mouseleave handler for a container: leaving it drops the hover
pub fn make_on_mouseleave(dnd: DndSignals) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_read.with_untracked(Option::is_some) {
            dnd.drop_slot_write.set(None);
        }
    }
}

/// Document listeners that are removed when dropped
struct GlobalListeners {
    on_mousemove: Closure<dyn FnMut(web_sys::MouseEvent)>,
    on_mouseup: Closure<dyn FnMut(web_sys::MouseEvent)>,
}

impl GlobalListeners {
    fn attach(&self) {
        if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
            let _ = doc.add_event_listener_with_callback("mousemove", self.on_mousemove.as_ref().unchecked_ref());
            let _ = doc.add_event_listener_with_callback("mouseup", self.on_mouseup.as_ref().unchecked_ref());
        }
    }
}

impl Drop for GlobalListeners {
    fn drop(&mut self) {
        if let Some(doc) = web_sys::window().and_then(|win| win.document()) {
            let _ = doc.remove_event_listener_with_callback("mousemove", self.on_mousemove.as_ref().unchecked_ref());
            let _ = doc.remove_event_listener_with_callback("mouseup", self.on_mouseup.as_ref().unchecked_ref());
        }
    }
}

/// Bind document mousemove/mouseup for the current reactive owner.
///
/// `on_drop` receives every completed drag with the hovered slot, or `None`
/// when the pointer was released outside any slot. Clicks never reach it.
/// The listeners are removed when the owner is disposed.
pub fn bind_global_handlers<F>(dnd: DndSignals, on_drop: F)
where
    F: Fn(DragSource, Option<DropSlot>) + 'static,
{
    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        // Only a pending press that has not become a drag yet
        if dnd.dragging_read.with_untracked(Option::is_some) {
            return;
        }
        let Some(pending) = dnd.pending_read.get_untracked() else {
            return;
        };
        let dx = ev.client_x() - dnd.start_x_read.get_untracked();
        let dy = ev.client_y() - dnd.start_y_read.get_untracked();
        if exceeds_threshold(dx, dy) {
            dnd.dragging_write.set(Some(pending));
        }
    });

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let dragging = dnd.dragging_read.get_untracked();
        let drop_slot = dnd.drop_slot_read.get_untracked();

        // Clear pending state first
        dnd.pending_write.set(None);

        match dragging {
            Some(source) => {
                end_drag(&dnd);
                let slot = drop_slot.filter(|slot| accepts(&source, slot));
                on_drop(source, slot);
            }
            // Not dragging: the click event fires naturally on the element
            None => dnd.drop_slot_write.set(None),
        }
    });

    let listeners = GlobalListeners {
        on_mousemove,
        on_mouseup,
    };
    listeners.attach();
    // Owned by the reactive owner; dropped (and detached) on dispose
    let _ = StoredValue::new_local(listeners);
}
