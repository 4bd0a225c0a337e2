//! Kanban Frontend App
//!
//! Builds the store, the board engine and the DnD signals, then shows the
//! board named by the location path.

use board_engine::BoardEngine;
use leptos::prelude::*;
use leptos_dragdrop::create_dnd_signals;
use reactive_stores::Store;

use crate::commands::HttpBoardApi;
use crate::components::{BoardPage, Notifications};
use crate::config::{board_id_from_path, AppConfig};
use crate::context::BoardContext;
use crate::store::{AppState, StoreHandle};

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    let store = Store::new(AppState::default());

    let engine = BoardEngine::new(
        StoreHandle(store),
        HttpBoardApi::new(config.api_url.clone()),
        config.board.clone(),
    );
    provide_context(BoardContext::new(engine, store, create_dnd_signals(), config));

    let board_id = web_sys::window()
        .and_then(|win| win.location().pathname().ok())
        .and_then(|path| board_id_from_path(&path));

    view! {
        <div class="app-layout">
            {match board_id {
                Some(board_id) => view! { <BoardPage board_id=board_id /> }.into_any(),
                None => view! {
                    <main class="no-board">
                        <h1>"Kanban"</h1>
                        <p>"Open a board at /board/<id>."</p>
                    </main>
                }.into_any(),
            }}
            <Notifications />
        </div>
    }
}
