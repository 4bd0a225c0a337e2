//! Remote Board API
//!
//! The server is the authority for board state. The engine talks to it only
//! through this trait; the UI crate supplies the HTTP implementation.

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::error::ApiResult;
use crate::model::{BoardId, BoardSummary, Card, CardId, CardPatch, ColumnFilters, ColumnId, ColumnSummary};

/// Placement of a moved card, addressed by its neighbor rather than by index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub destination_column_id: ColumnId,
    pub destination_index: usize,
    /// Empty on the wire when the destination was empty
    #[serde(serialize_with = "serialize_anchor")]
    pub target_card_id: Option<CardId>,
    pub placed_at_top: bool,
}

fn serialize_anchor<S: Serializer>(anchor: &Option<CardId>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(anchor.as_ref().map(CardId::as_str).unwrap_or_default())
}

/// Request/response operations of the board server
#[async_trait(?Send)]
pub trait BoardApi {
    /// Board name and its columns in display order
    async fn fetch_columns(&self, board_id: &BoardId) -> ApiResult<BoardSummary>;

    /// First page of a column
    async fn fetch_cards(
        &self,
        board_id: &BoardId,
        column_id: &ColumnId,
        filters: &ColumnFilters,
    ) -> ApiResult<Vec<Card>>;

    /// Cards strictly older than `cursor`
    async fn fetch_older_cards(
        &self,
        board_id: &BoardId,
        column_id: &ColumnId,
        cursor: &CardId,
        filters: &ColumnFilters,
    ) -> ApiResult<Vec<Card>>;

    async fn create_card(&self, board_id: &BoardId, column_id: &ColumnId, title: &str) -> ApiResult<Card>;

    async fn update_card(
        &self,
        board_id: &BoardId,
        column_id: &ColumnId,
        card_id: &CardId,
        patch: &CardPatch,
    ) -> ApiResult<()>;

    async fn delete_card(&self, board_id: &BoardId, column_id: &ColumnId, card_id: &CardId) -> ApiResult<()>;

    async fn move_card(
        &self,
        board_id: &BoardId,
        source_column_id: &ColumnId,
        card_id: &CardId,
        request: &MoveCardRequest,
    ) -> ApiResult<()>;

    async fn create_column(&self, board_id: &BoardId, name: &str) -> ApiResult<ColumnSummary>;

    async fn delete_column(&self, board_id: &BoardId, column_id: &ColumnId) -> ApiResult<()>;

    async fn reorder_columns(&self, board_id: &BoardId, column_order: &[ColumnId]) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_request_wire_format() {
        let request = MoveCardRequest {
            destination_column_id: ColumnId::from("todo"),
            destination_index: 0,
            target_card_id: None,
            placed_at_top: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "destinationColumnId": "todo",
                "destinationIndex": 0,
                "targetCardId": "",
                "placedAtTop": false
            })
        );
    }

    #[test]
    fn test_move_request_carries_anchor_id() {
        let request = MoveCardRequest {
            destination_column_id: ColumnId::from("todo"),
            destination_index: 2,
            target_card_id: Some(CardId::from("c")),
            placed_at_top: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["targetCardId"], "c");
    }
}
