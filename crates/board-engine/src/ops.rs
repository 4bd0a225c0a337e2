//! Board Operations
//!
//! Opening and closing boards plus card and column CRUD. Unlike drags these
//! are not optimistic: the store changes only after the server accepts.

use futures::future::join_all;
use tracing::{debug, info};

use crate::api::BoardApi;
use crate::engine::{BoardEngine, Outcome};
use crate::error::{ApiError, EngineError, EngineResult};
use crate::model::{Board, BoardId, Card, CardId, CardPatch, Column, ColumnFilters, ColumnId, ColumnSummary, MAX_TITLE_LEN};
use crate::store::{BoardMsg, BoardStore, ColumnPatch};

/// Trimmed card title, or the reason it is unacceptable
pub fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::invalid("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::invalid(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}

/// Trimmed column name, or the reason it is unacceptable
pub fn validate_column_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid("Column name is required"));
    }
    Ok(name.to_string())
}

impl<S, A> BoardEngine<S, A>
where
    S: BoardStore,
    A: BoardApi,
{
    /// Load `board_id`'s columns and their first pages, replacing whatever
    /// board was open
    pub async fn open_board(&self, board_id: &BoardId) -> EngineResult<Outcome<()>> {
        let epoch = self.epoch();
        let summary = self.api().fetch_columns(board_id).await?;
        if self.epoch() != epoch {
            debug!(%board_id, "board changed while its columns were loading");
            return Ok(Outcome::Discarded);
        }

        info!(%board_id, name = %summary.name, columns = summary.columns.len(), "board opened");
        self.dispatch(BoardMsg::Replace(
            Board::new(board_id.clone(), summary.columns.into_iter().map(Column::from)).with_name(summary.name),
        ))?;
        self.reload_columns().await
    }

    /// Refetch the first page of every column concurrently
    pub async fn reload_columns(&self) -> EngineResult<Outcome<()>> {
        let (_, liveness) = self.active()?;
        let order = self.store().snapshot().column_order;
        let results = join_all(order.iter().map(|column_id| self.load_first_page(column_id))).await;

        let mut discarded = false;
        for result in results {
            discarded |= !result?.is_done();
        }
        if discarded || !self.is_live(&liveness) {
            return Ok(Outcome::Discarded);
        }
        Ok(Outcome::Done(()))
    }

    /// Replace the filters and reload every column with them
    pub async fn set_filters(&self, filters: ColumnFilters) -> EngineResult<Outcome<()>> {
        if self.filters() == filters {
            return Ok(Outcome::NoOp);
        }
        debug!(?filters, "filters changed");
        self.replace_filters(filters);
        self.reload_columns().await
    }

    /// Forget the open board; pending responses for it are dropped
    pub fn close_board(&self) -> EngineResult<()> {
        self.dispatch(BoardMsg::Reset)
    }

    /// Create a card at the top of `column_id`
    pub async fn create_card(&self, column_id: &ColumnId, title: &str) -> EngineResult<Outcome<Card>> {
        let title = validate_title(title)?;
        let (board_id, liveness) = self.active()?;
        self.require_column(column_id)?;

        let created = self.api().create_card(&board_id, column_id, &title).await?;

        if !self.is_live(&liveness) {
            return Ok(Outcome::Discarded);
        }
        let Some(column) = self.store().snapshot().column(column_id).cloned() else {
            return Ok(Outcome::Discarded);
        };
        let card = created.moved_to(column_id);
        info!(%board_id, %column_id, card_id = %card.id, "card created");

        let mut cards = Vec::with_capacity(column.cards.len() + 1);
        cards.push(card.clone());
        cards.extend(column.cards.into_iter().filter(|existing| existing.id != card.id));
        self.dispatch(BoardMsg::merge(column_id.clone(), ColumnPatch::cards(cards)))?;
        Ok(Outcome::Done(card))
    }

    /// Send `patch` for a card and apply it locally once accepted
    pub async fn update_card(&self, card_id: &CardId, patch: CardPatch) -> EngineResult<Outcome<Card>> {
        let mut patch = patch;
        if let Some(title) = &patch.title {
            patch.title = Some(validate_title(title)?);
        }
        let (board_id, liveness) = self.active()?;
        let column_id = self.owning_column(card_id)?;

        self.api().update_card(&board_id, &column_id, card_id, &patch).await?;

        if !self.is_live(&liveness) {
            return Ok(Outcome::Discarded);
        }
        // the card may have been dragged elsewhere meanwhile
        let board = self.store().snapshot();
        let Some((column, index)) = board.locate_card(card_id) else {
            return Ok(Outcome::Discarded);
        };
        let mut cards = column.cards.clone();
        let updated = cards[index].patched(&patch);
        cards[index] = updated.clone();
        debug!(%board_id, column_id = %column.id, %card_id, "card updated");
        self.dispatch(BoardMsg::merge(column.id.clone(), ColumnPatch::cards(cards)))?;
        Ok(Outcome::Done(updated))
    }

    pub async fn delete_card(&self, card_id: &CardId) -> EngineResult<Outcome<()>> {
        let (board_id, liveness) = self.active()?;
        let column_id = self.owning_column(card_id)?;

        self.api().delete_card(&board_id, &column_id, card_id).await?;

        if !self.is_live(&liveness) {
            return Ok(Outcome::Discarded);
        }
        let board = self.store().snapshot();
        let Some((column, index)) = board.locate_card(card_id) else {
            return Ok(Outcome::Discarded);
        };
        let mut cards = column.cards.clone();
        cards.remove(index);
        info!(%board_id, column_id = %column.id, %card_id, "card deleted");
        self.dispatch(BoardMsg::merge(column.id.clone(), ColumnPatch::cards(cards)))?;
        Ok(Outcome::Done(()))
    }

    /// Append a new empty column to the board
    pub async fn create_column(&self, name: &str) -> EngineResult<Outcome<ColumnSummary>> {
        let name = validate_column_name(name)?;
        let (board_id, liveness) = self.active()?;

        let summary = self.api().create_column(&board_id, &name).await?;

        if !self.is_live(&liveness) {
            return Ok(Outcome::Discarded);
        }
        let mut board = self.store().snapshot();
        if board.columns.contains_key(&summary.id) {
            return Ok(Outcome::Done(summary));
        }
        board.column_order.push(summary.id.clone());
        board.columns.insert(summary.id.clone(), Column::from(summary.clone()));
        info!(%board_id, column_id = %summary.id, "column created");
        self.dispatch(BoardMsg::Replace(board))?;
        Ok(Outcome::Done(summary))
    }

    pub async fn delete_column(&self, column_id: &ColumnId) -> EngineResult<Outcome<()>> {
        let (board_id, liveness) = self.active()?;
        self.require_column(column_id)?;

        self.api().delete_column(&board_id, column_id).await?;

        if !self.is_live(&liveness) {
            return Ok(Outcome::Discarded);
        }
        let mut board = self.store().snapshot();
        if board.columns.remove(column_id).is_none() {
            return Ok(Outcome::Discarded);
        }
        board.column_order.retain(|id| id != column_id);
        info!(%board_id, %column_id, "column deleted");
        self.dispatch(BoardMsg::Replace(board))?;
        Ok(Outcome::Done(()))
    }

    /// Board identity plus session, present even when no board is open
    fn epoch(&self) -> (Option<BoardId>, u64) {
        let board = self.store().snapshot();
        (board.board_id, board.session)
    }

    fn require_column(&self, column_id: &ColumnId) -> EngineResult<()> {
        match self.store().snapshot().column(column_id) {
            Some(_) => Ok(()),
            None => Err(EngineError::UnknownColumn(column_id.clone())),
        }
    }

    fn owning_column(&self, card_id: &CardId) -> EngineResult<ColumnId> {
        self.store()
            .snapshot()
            .locate_card(card_id)
            .map(|(column, _)| column.id.clone())
            .ok_or_else(|| EngineError::UnknownCard(card_id.clone()))
    }
}
