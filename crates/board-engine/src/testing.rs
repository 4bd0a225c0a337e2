//! In-memory `BoardApi` for engine tests. Every call yields once before
//! answering so tests can interleave other work with a request in flight.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;

use crate::api::{BoardApi, MoveCardRequest};
use crate::error::{ApiError, ApiResult};
use crate::model::{BoardId, BoardSummary, Card, CardId, CardPatch, ColumnFilters, ColumnId, ColumnSummary};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchColumns,
    FetchCards {
        column_id: ColumnId,
        filters: ColumnFilters,
    },
    FetchOlderCards {
        column_id: ColumnId,
        cursor: CardId,
        filters: ColumnFilters,
    },
    CreateCard {
        column_id: ColumnId,
        title: String,
    },
    UpdateCard {
        card_id: CardId,
        patch: CardPatch,
    },
    DeleteCard {
        card_id: CardId,
    },
    MoveCard {
        card_id: CardId,
        source_column_id: ColumnId,
        request: MoveCardRequest,
    },
    CreateColumn {
        name: String,
    },
    DeleteColumn {
        column_id: ColumnId,
    },
    ReorderColumns(Vec<ColumnId>),
}

#[derive(Default)]
pub struct MockApi {
    calls: RefCell<Vec<Call>>,
    failure: RefCell<Option<ApiError>>,
    board_name: RefCell<String>,
    columns: RefCell<Vec<ColumnSummary>>,
    first_pages: RefCell<HashMap<ColumnId, Vec<Card>>>,
    older_pages: RefCell<HashMap<CardId, Vec<Card>>>,
    next_id: RefCell<u32>,
}

impl MockApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Fail the next request with `err`
    pub fn fail_next(&self, err: ApiError) {
        *self.failure.borrow_mut() = Some(err);
    }

    pub fn set_board_name(&self, name: &str) {
        *self.board_name.borrow_mut() = name.to_string();
    }

    pub fn set_columns(&self, columns: &[(&str, &str)]) {
        *self.columns.borrow_mut() = columns
            .iter()
            .map(|(id, name)| ColumnSummary {
                id: ColumnId::from(*id),
                name: name.to_string(),
            })
            .collect();
    }

    pub fn set_first_page(&self, column_id: &str, cards: Vec<Card>) {
        self.first_pages.borrow_mut().insert(ColumnId::from(column_id), cards);
    }

    /// Cards returned for a fetch older than `cursor`
    pub fn set_older_page(&self, cursor: &str, cards: Vec<Card>) {
        self.older_pages.borrow_mut().insert(CardId::from(cursor), cards);
    }

    async fn respond(&self, call: Call) -> ApiResult<()> {
        self.calls.borrow_mut().push(call);
        tokio::task::yield_now().await;
        match self.failure.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.borrow_mut();
        *next += 1;
        format!("{}-{}", prefix, next)
    }
}

#[async_trait(?Send)]
impl BoardApi for MockApi {
    async fn fetch_columns(&self, _board_id: &BoardId) -> ApiResult<BoardSummary> {
        self.respond(Call::FetchColumns).await?;
        Ok(BoardSummary {
            name: self.board_name.borrow().clone(),
            columns: self.columns.borrow().clone(),
        })
    }

    async fn fetch_cards(
        &self,
        _board_id: &BoardId,
        column_id: &ColumnId,
        filters: &ColumnFilters,
    ) -> ApiResult<Vec<Card>> {
        self.respond(Call::FetchCards {
            column_id: column_id.clone(),
            filters: filters.clone(),
        })
        .await?;
        let page = self.first_pages.borrow().get(column_id).cloned().unwrap_or_default();
        Ok(page
            .into_iter()
            .filter(|card| filters.priority.is_none() || card.priority == filters.priority)
            .collect())
    }

    async fn fetch_older_cards(
        &self,
        _board_id: &BoardId,
        column_id: &ColumnId,
        cursor: &CardId,
        filters: &ColumnFilters,
    ) -> ApiResult<Vec<Card>> {
        self.respond(Call::FetchOlderCards {
            column_id: column_id.clone(),
            cursor: cursor.clone(),
            filters: filters.clone(),
        })
        .await?;
        Ok(self.older_pages.borrow().get(cursor).cloned().unwrap_or_default())
    }

    async fn create_card(&self, _board_id: &BoardId, column_id: &ColumnId, title: &str) -> ApiResult<Card> {
        self.respond(Call::CreateCard {
            column_id: column_id.clone(),
            title: title.to_string(),
        })
        .await?;
        Ok(Card::new(self.fresh_id("card"), title))
    }

    async fn update_card(
        &self,
        _board_id: &BoardId,
        _column_id: &ColumnId,
        card_id: &CardId,
        patch: &CardPatch,
    ) -> ApiResult<()> {
        self.respond(Call::UpdateCard {
            card_id: card_id.clone(),
            patch: patch.clone(),
        })
        .await
    }

    async fn delete_card(&self, _board_id: &BoardId, _column_id: &ColumnId, card_id: &CardId) -> ApiResult<()> {
        self.respond(Call::DeleteCard {
            card_id: card_id.clone(),
        })
        .await
    }

    async fn move_card(
        &self,
        _board_id: &BoardId,
        source_column_id: &ColumnId,
        card_id: &CardId,
        request: &MoveCardRequest,
    ) -> ApiResult<()> {
        self.respond(Call::MoveCard {
            card_id: card_id.clone(),
            source_column_id: source_column_id.clone(),
            request: request.clone(),
        })
        .await
    }

    async fn create_column(&self, _board_id: &BoardId, name: &str) -> ApiResult<ColumnSummary> {
        self.respond(Call::CreateColumn { name: name.to_string() }).await?;
        Ok(ColumnSummary {
            id: ColumnId::from(self.fresh_id("column")),
            name: name.to_string(),
        })
    }

    async fn delete_column(&self, _board_id: &BoardId, column_id: &ColumnId) -> ApiResult<()> {
        self.respond(Call::DeleteColumn {
            column_id: column_id.clone(),
        })
        .await
    }

    async fn reorder_columns(&self, _board_id: &BoardId, column_order: &[ColumnId]) -> ApiResult<()> {
        self.respond(Call::ReorderColumns(column_order.to_vec())).await
    }
}
