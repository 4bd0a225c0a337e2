//! Board Not Found Component

use leptos::prelude::*;

#[component]
pub fn BoardNotFound() -> impl IntoView {
    view! {
        <div class="board-not-found">
            <h1>"404"</h1>
            <h2>"Board not found."</h2>
            <p class="dimmed">
                "This page isn't available. The board may have been deleted, or the URL might be incorrect."
            </p>
            <a class="home-link" href="/">"Take me back to the home page"</a>
        </div>
    }
}
