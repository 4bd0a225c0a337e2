//! Board Data Model
//!
//! Cards, columns and the board as the client holds them. Cards are value
//! snapshots: a change always produces a new `Card`, never an in-place edit.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Liveness, StoreError};

/// Maximum card title length, in characters
pub const MAX_TITLE_LEN: usize = 180;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Server-assigned board identifier
    BoardId
);
string_id!(
    /// Server-assigned column identifier
    ColumnId
);
string_id!(
    /// Server-assigned card identifier
    CardId
);

/// Card priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Normal, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "normal" => Some(Priority::Normal),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Card author as the server reports it: either a bare name or a user object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedBy {
    Name(String),
    User {
        #[serde(default)]
        name: Option<String>,
    },
}

impl CreatedBy {
    pub fn display_name(&self) -> Option<&str> {
        match self {
            CreatedBy::Name(name) => Some(name),
            CreatedBy::User { name } => name.as_deref(),
        }
    }
}

/// A single task on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: CardId,
    /// Owning column; only authoritative on the server
    #[serde(default)]
    pub column_id: Option<ColumnId>,
    /// Human readable key, e.g. `KAN-12`
    #[serde(default)]
    pub card_key: String,
    pub title: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub formatted_content: Option<String>,
    #[serde(default)]
    pub created_by: Option<CreatedBy>,
    #[serde(default, rename = "date_created")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Card {
    pub fn new(id: impl Into<CardId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            column_id: None,
            card_key: String::new(),
            title: title.into(),
            priority: None,
            due_date: None,
            content: None,
            formatted_content: None,
            created_by: None,
            created_at: None,
        }
    }

    /// Snapshot of this card owned by another column
    pub fn moved_to(&self, column_id: &ColumnId) -> Self {
        Self {
            column_id: Some(column_id.clone()),
            ..self.clone()
        }
    }

    /// Snapshot of this card with `patch` applied
    pub fn patched(&self, patch: &CardPatch) -> Self {
        let mut next = self.clone();
        if let Some(title) = &patch.title {
            next.title = title.clone();
        }
        if let Some(content) = &patch.content {
            next.content = Some(content.clone());
        }
        if let Some(formatted) = &patch.formatted_content {
            next.formatted_content = Some(formatted.clone());
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            next.due_date = due_date;
        }
        next
    }
}

/// Partial card update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Option<Priority>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Column identity as returned by the column list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: ColumnId,
    pub name: String,
}

/// Filters sent with every card page request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// A named, ordered bucket of cards.
///
/// `cards` is a prefix of the server's sequence. `cursor` and `revision`
/// are maintained by the store reducer.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub cards: Vec<Card>,
    /// Id of the last (oldest) loaded card, the cursor for older pages
    pub cursor: Option<CardId>,
    /// An older-card fetch is in flight
    pub loading_older: bool,
    /// Bumped whenever `cards` changes
    pub revision: u64,
    /// Bumped each time a first-page reload is requested. Older pages
    /// fetched under a previous generation no longer fit `cards`.
    pub generation: u64,
    /// A first-page reload is in flight
    pub reloading: bool,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cards: Vec::new(),
            cursor: None,
            loading_older: false,
            revision: 0,
            generation: 0,
            reloading: false,
        }
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cursor = cards.last().map(|card| card.id.clone());
        self.cards = cards;
        self
    }

    pub fn position_of(&self, card_id: &CardId) -> Option<usize> {
        self.cards.iter().position(|card| &card.id == card_id)
    }

    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|card| card.id.clone()).collect()
    }
}

/// Board header as returned by the board endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BoardSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSummary>,
}

impl From<ColumnSummary> for Column {
    fn from(summary: ColumnSummary) -> Self {
        Column::new(summary.id, summary.name)
    }
}

/// Columns of one board plus their left-to-right order.
///
/// Every id in `column_order` has exactly one entry in `columns` and vice
/// versa; the store refuses any state that breaks this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub board_id: Option<BoardId>,
    /// Display name; empty until the board is loaded
    pub name: String,
    /// Assigned by the store; see [`Liveness`]
    pub session: u64,
    pub column_order: Vec<ColumnId>,
    pub columns: HashMap<ColumnId, Column>,
}

impl Board {
    pub fn new(board_id: impl Into<BoardId>, columns: impl IntoIterator<Item = Column>) -> Self {
        let mut board = Board {
            board_id: Some(board_id.into()),
            ..Default::default()
        };
        for column in columns {
            board.column_order.push(column.id.clone());
            board.columns.insert(column.id.clone(), column);
        }
        board
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    /// Columns in display order
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order.iter().filter_map(|id| self.columns.get(id))
    }

    /// Column currently holding `card_id` and the card's index in it
    pub fn locate_card(&self, card_id: &CardId) -> Option<(&Column, usize)> {
        self.ordered_columns()
            .find_map(|column| column.position_of(card_id).map(|index| (column, index)))
    }

    pub fn liveness(&self) -> Option<Liveness> {
        self.board_id.clone().map(|board_id| Liveness {
            board_id,
            session: self.session,
        })
    }

    /// Check the order/map correspondence
    pub fn check_invariant(&self) -> Result<(), StoreError> {
        let mut seen = std::collections::HashSet::with_capacity(self.column_order.len());
        for id in &self.column_order {
            if !seen.insert(id) {
                return Err(StoreError::DuplicateColumn(id.clone()));
            }
            match self.columns.get(id) {
                None => return Err(StoreError::DanglingColumn(id.clone())),
                Some(column) if &column.id != id => {
                    return Err(StoreError::MismatchedColumnId {
                        key: id.clone(),
                        id: column.id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
        if let Some(orphan) = self.columns.keys().find(|id| !seen.contains(id)) {
            return Err(StoreError::OrphanColumn(orphan.clone()));
        }
        Ok(())
    }
}
