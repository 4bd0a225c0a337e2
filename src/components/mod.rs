//! UI Components
//!
//! Leptos components of the board page.

mod board_column;
mod board_filter;
mod board_not_found;
mod board_page;
mod card_item;
mod column_header;
mod create_column;
mod delete_confirm_button;
mod item_list;
mod new_card_form;
mod notifications;
mod priority_badge;

pub use board_column::BoardColumn;
pub use board_filter::BoardFilter;
pub use board_not_found::BoardNotFound;
pub use board_page::BoardPage;
pub use card_item::CardItem;
pub use column_header::ColumnHeader;
pub use create_column::CreateColumn;
pub use delete_confirm_button::DeleteConfirmButton;
pub use item_list::ItemList;
pub use new_card_form::NewCardForm;
pub use notifications::Notifications;
pub use priority_badge::PriorityBadge;
