//! Incremental Loading
//!
//! First pages replace a column's cards; older pages are appended after the
//! column's last loaded card. One older-page fetch per column at a time.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::api::BoardApi;
use crate::engine::{BoardEngine, Outcome};
use crate::error::{EngineError, EngineResult};
use crate::model::{Board, Card, CardId, Column, ColumnId};
use crate::store::{BoardMsg, BoardStore, ColumnPatch};

/// Result of [`BoardEngine::load_more`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// This many new cards were appended
    Appended(usize),
    /// A fetch for the column is already running
    InFlight,
    /// The column has no cards to page from
    Empty,
    /// The board or the column went away, or the column was reloaded,
    /// before the response arrived
    Discarded,
}

impl<S, A> BoardEngine<S, A>
where
    S: BoardStore,
    A: BoardApi,
{
    /// Fetch the newest page of `column_id` with the current filters and
    /// replace its cards. Returns the number of cards loaded.
    ///
    /// Starting a reload moves the column to a new generation, so older
    /// pages requested before it are dropped when they arrive. Moves into or
    /// out of the column made while the page is in flight are kept.
    pub async fn load_first_page(&self, column_id: &ColumnId) -> EngineResult<Outcome<usize>> {
        let (board_id, liveness) = self.active()?;
        let Some(issued) = self.store().snapshot().column(column_id).cloned() else {
            return Err(EngineError::UnknownColumn(column_id.clone()));
        };
        let generation = issued.generation + 1;
        self.dispatch(BoardMsg::merge(column_id.clone(), ColumnPatch::reload(generation)))?;
        let filters = self.filters();

        let result = self.api().fetch_cards(&board_id, column_id, &filters).await;

        if !self.is_live(&liveness) {
            debug!(%board_id, %column_id, "dropping first page for a closed board");
            return Ok(Outcome::Discarded);
        }
        let board = self.store().snapshot();
        let Some(current) = board.column(column_id) else {
            debug!(%board_id, %column_id, "column deleted while its first page loaded");
            return Ok(Outcome::Discarded);
        };
        if current.generation != generation {
            debug!(%board_id, %column_id, generation, "first page superseded by a newer reload");
            return Ok(Outcome::Discarded);
        }

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(%board_id, %column_id, error = %err, "loading first page failed");
                self.dispatch(BoardMsg::merge(column_id.clone(), ColumnPatch::default().with_reloading(false)))?;
                return Err(err.into());
            }
        };
        let cards = if current.revision == issued.revision {
            page
        } else {
            debug!(%board_id, %column_id, "column changed while its first page loaded");
            reconcile_first_page(page, &issued, current, &board)
        };
        let count = cards.len();
        debug!(%board_id, %column_id, count, "first page loaded");
        self.dispatch(BoardMsg::merge(
            column_id.clone(),
            ColumnPatch::cards(cards).with_reloading(false),
        ))?;
        Ok(Outcome::Done(count))
    }

    /// Append the page of cards older than the column's last loaded card.
    ///
    /// A failed fetch clears the in-flight flag and returns the error; the
    /// column keeps the cards it had.
    pub async fn load_more(&self, column_id: &ColumnId) -> EngineResult<LoadOutcome> {
        let (board_id, liveness) = self.active()?;
        let board = self.store().snapshot();
        let column = board
            .column(column_id)
            .ok_or_else(|| EngineError::UnknownColumn(column_id.clone()))?;
        if column.loading_older || column.reloading {
            debug!(%board_id, %column_id, "column already loading");
            return Ok(LoadOutcome::InFlight);
        }
        let Some(cursor) = column.cursor.clone() else {
            warn!(%board_id, %column_id, "load_more called on an empty column");
            return Ok(LoadOutcome::Empty);
        };
        let generation = column.generation;

        self.dispatch(BoardMsg::merge(column_id.clone(), ColumnPatch::loading_older(true)))?;
        let filters = self.filters();
        let result = self.api().fetch_older_cards(&board_id, column_id, &cursor, &filters).await;

        if !self.is_live(&liveness) {
            debug!(%board_id, %column_id, "board closed while loading older cards");
            return Ok(LoadOutcome::Discarded);
        }
        let Some(current) = self.store().snapshot().column(column_id).cloned() else {
            debug!(%board_id, %column_id, "column deleted while loading older cards");
            return Ok(LoadOutcome::Discarded);
        };
        if current.generation != generation {
            debug!(%board_id, %column_id, %cursor, "column reloaded while loading older cards");
            self.dispatch(BoardMsg::merge(column_id.clone(), ColumnPatch::loading_older(false)))?;
            return Ok(LoadOutcome::Discarded);
        }

        match result {
            Ok(older) => {
                let (cards, appended) = append_older(current.cards, older);
                debug!(%board_id, %column_id, appended, "older cards loaded");
                self.dispatch(BoardMsg::merge(
                    column_id.clone(),
                    ColumnPatch::cards(cards).with_loading_older(false),
                ))?;
                Ok(LoadOutcome::Appended(appended))
            }
            Err(err) => {
                warn!(%board_id, %column_id, error = %err, "loading older cards failed");
                self.dispatch(BoardMsg::merge(column_id.clone(), ColumnPatch::loading_older(false)))?;
                Err(err.into())
            }
        }
    }
}

/// `loaded` followed by the cards of `older` it does not already hold. A
/// card dragged into the column can come back in an older page.
fn append_older(mut loaded: Vec<Card>, older: Vec<Card>) -> (Vec<Card>, usize) {
    let known: HashSet<_> = loaded.iter().map(|card| card.id.clone()).collect();
    let before = loaded.len();
    loaded.extend(older.into_iter().filter(|card| !known.contains(&card.id)));
    let appended = loaded.len() - before;
    (loaded, appended)
}

/// Lay a first page over the local changes made to the column after it was
/// requested. Cards that left the column since stay out of it; cards that
/// arrived keep their current index.
fn reconcile_first_page(page: Vec<Card>, issued: &Column, current: &Column, board: &Board) -> Vec<Card> {
    let before: HashSet<&CardId> = issued.cards.iter().map(|card| &card.id).collect();
    let now: HashSet<&CardId> = current.cards.iter().map(|card| &card.id).collect();
    let arrived: Vec<(usize, &Card)> = current
        .cards
        .iter()
        .enumerate()
        .filter(|(_, card)| !before.contains(&card.id))
        .collect();

    let mut cards: Vec<Card> = page
        .into_iter()
        .filter(|card| {
            let left = before.contains(&card.id) && !now.contains(&card.id);
            let elsewhere = board
                .locate_card(&card.id)
                .is_some_and(|(column, _)| column.id != current.id);
            let local = now.contains(&card.id) && !before.contains(&card.id);
            !left && !elsewhere && !local
        })
        .collect();
    for (index, card) in arrived {
        let at = index.min(cards.len());
        cards.insert(at, card.clone());
    }
    cards
}
