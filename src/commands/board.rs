//! Board, Column and Card Commands

use async_trait::async_trait;
use board_engine::{
    ApiResult, BoardApi, BoardId, BoardSummary, Card, CardId, CardPatch, ColumnFilters, ColumnId, ColumnSummary, MoveCardRequest,
};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use super::{Envelope, HttpClient};

// ========================
// Payloads
// ========================

#[derive(Serialize)]
struct TitleArgs<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct NameArgs<'a> {
    name: &'a str,
}

// ========================
// Commands
// ========================

/// `BoardApi` over the board server's REST endpoints
#[derive(Clone)]
pub struct HttpBoardApi {
    http: HttpClient,
}

impl HttpBoardApi {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(api_url),
        }
    }
}

#[async_trait(?Send)]
impl BoardApi for HttpBoardApi {
    async fn fetch_columns(&self, board_id: &BoardId) -> ApiResult<BoardSummary> {
        let url = self.http.url(&["board", board_id.as_str()]);
        self.http.send_json(self.http.request(Method::GET, url)).await
    }

    async fn fetch_cards(
        &self,
        board_id: &BoardId,
        column_id: &ColumnId,
        filters: &ColumnFilters,
    ) -> ApiResult<Vec<Card>> {
        let url = self.http.url(&["boards", board_id.as_str(), "columns", column_id.as_str()]);
        let request = self.http.request(Method::GET, url).query(filters);
        let page: Envelope<Vec<Card>> = self.http.send_json(request).await?;
        debug!(%board_id, %column_id, count = page.data.len(), "fetched first page");
        Ok(page.data)
    }

    async fn fetch_older_cards(
        &self,
        board_id: &BoardId,
        column_id: &ColumnId,
        cursor: &CardId,
        filters: &ColumnFilters,
    ) -> ApiResult<Vec<Card>> {
        let url = self.http.url(&[
            "boards",
            board_id.as_str(),
            "columns",
            column_id.as_str(),
            "cards",
            cursor.as_str(),
            "old",
        ]);
        let request = self.http.request(Method::GET, url).query(filters);
        let page: Envelope<Vec<Card>> = self.http.send_json(request).await?;
        debug!(%board_id, %column_id, %cursor, count = page.data.len(), "fetched older page");
        Ok(page.data)
    }

    async fn create_card(&self, board_id: &BoardId, column_id: &ColumnId, title: &str) -> ApiResult<Card> {
        let url = self
            .http
            .url(&["boards", board_id.as_str(), "columns", column_id.as_str(), "cards"]);
        let request = self.http.request(Method::POST, url).json(&TitleArgs { title });
        let created: Envelope<Card> = self.http.send_json(request).await?;
        Ok(created.data)
    }

    async fn update_card(
        &self,
        board_id: &BoardId,
        column_id: &ColumnId,
        card_id: &CardId,
        patch: &CardPatch,
    ) -> ApiResult<()> {
        let url = self.http.url(&[
            "boards",
            board_id.as_str(),
            "columns",
            column_id.as_str(),
            "cards",
            card_id.as_str(),
        ]);
        self.http.send(self.http.request(Method::PATCH, url).json(patch)).await?;
        Ok(())
    }

    async fn delete_card(&self, board_id: &BoardId, column_id: &ColumnId, card_id: &CardId) -> ApiResult<()> {
        let url = self.http.url(&[
            "boards",
            board_id.as_str(),
            "columns",
            column_id.as_str(),
            "cards",
            card_id.as_str(),
        ]);
        self.http.send(self.http.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn move_card(
        &self,
        board_id: &BoardId,
        source_column_id: &ColumnId,
        card_id: &CardId,
        request: &MoveCardRequest,
    ) -> ApiResult<()> {
        let url = self.http.url(&[
            "boards",
            board_id.as_str(),
            "columns",
            source_column_id.as_str(),
            "cards",
            card_id.as_str(),
            "move",
            "",
        ]);
        self.http.send(self.http.request(Method::PATCH, url).json(request)).await?;
        Ok(())
    }

    async fn create_column(&self, board_id: &BoardId, name: &str) -> ApiResult<ColumnSummary> {
        let url = self.http.url(&["boards", board_id.as_str(), "columns"]);
        let request = self.http.request(Method::POST, url).json(&NameArgs { name });
        self.http.send_json(request).await
    }

    async fn delete_column(&self, board_id: &BoardId, column_id: &ColumnId) -> ApiResult<()> {
        let url = self.http.url(&["boards", board_id.as_str(), "columns", column_id.as_str()]);
        self.http.send(self.http.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn reorder_columns(&self, board_id: &BoardId, column_order: &[ColumnId]) -> ApiResult<()> {
        let url = self.http.url(&["board", board_id.as_str(), "column", "order", ""]);
        self.http.send(self.http.request(Method::PUT, url).json(column_order)).await?;
        Ok(())
    }
}
