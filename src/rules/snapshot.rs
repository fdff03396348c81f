//! Read-only views of a match for presentation and transport.
//!
//! A `Snapshot` is a plain value: it borrows nothing from the engine and can
//! be compared, cloned, serialized and sent. Face-down values are hidden
//! unless the snapshot was taken with `Visibility::Full`.

use serde::{Deserialize, Serialize};

use crate::core::{Card, Cell, PhaseKind, PlayerGrid, PlayerId, StateKind, COLS, ROWS};

/// How much of the hidden information a snapshot exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Face-down values are masked for every seat, the viewer's own included.
    Redacted,
    /// Everything, for spectators with full rights, debugging and tests.
    Full,
}

/// One grid cell as seen by the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellView {
    Absent,
    /// Face-down, value withheld.
    Hidden,
    /// Face-down, value exposed (full visibility only).
    FaceDown(Card),
    FaceUp(Card),
}

impl CellView {
    fn of(cell: Cell, visibility: Visibility) -> Self {
        match (cell, visibility) {
            (Cell::Absent, _) => CellView::Absent,
            (Cell::FaceDown(_), Visibility::Redacted) => CellView::Hidden,
            (Cell::FaceDown(card), Visibility::Full) => CellView::FaceDown(card),
            (Cell::FaceUp(card), _) => CellView::FaceUp(card),
        }
    }

    /// Whether the card is face-up.
    #[must_use]
    pub fn is_revealed(self) -> bool {
        matches!(self, CellView::FaceUp(_))
    }

    /// The value shown, if any.
    #[must_use]
    pub fn value(self) -> Option<Card> {
        match self {
            CellView::FaceDown(card) | CellView::FaceUp(card) => Some(card),
            CellView::Absent | CellView::Hidden => None,
        }
    }
}

/// One seat as seen by the viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub player: PlayerId,
    pub name: String,
    pub cells: [[CellView; COLS]; ROWS],
    /// Live score from face-up cards only.
    pub revealed_score: i32,
    /// Score stored for the last completed round.
    pub round_score: i32,
    pub total_score: i32,
}

impl SeatView {
    pub(crate) fn of(player: PlayerId, grid: &PlayerGrid, visibility: Visibility) -> Self {
        let rows = grid.rows();
        let cells = std::array::from_fn(|row| {
            std::array::from_fn(|col| CellView::of(rows[row][col], visibility))
        });
        Self {
            player,
            name: grid.name().to_string(),
            cells,
            revealed_score: grid.revealed_score(),
            round_score: grid.round_score(),
            total_score: grid.total_score(),
        }
    }
}

/// Everything a client needs to render the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Seat the snapshot was taken for, if any.
    pub viewer: Option<PlayerId>,
    pub seats: Vec<SeatView>,
    pub state: StateKind,
    pub phase: Option<PhaseKind>,
    pub current_player: Option<PlayerId>,
    pub round: u32,
    pub trigger_player: Option<PlayerId>,
    pub deck_remaining: usize,
    pub discard_size: usize,
    pub top_discard: Option<Card>,
    /// The card the current seat is holding, visible to everyone.
    pub held_card: Option<Card>,
    /// Empty until the match is over.
    pub winners: Vec<PlayerId>,
    pub message: String,
}

impl Snapshot {
    /// Compact binary form for transports.
    pub fn encode(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    /// Inverse of `encode`.
    pub fn decode(bytes: &[u8]) -> bincode::Result<Self> {
        bincode::deserialize(bytes)
    }

    /// The view of one seat.
    #[must_use]
    pub fn seat(&self, player: PlayerId) -> Option<&SeatView> {
        self.seats.get(player.index())
    }
}
