//! Command rejection reasons.
//!
//! Every rejection is recoverable and leaves the engine untouched. `ErrorKind`
//! gives transports a coarse classification; the `EngineError` variants carry
//! the detail for logs and user-facing messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{PhaseKind, PlayerId, StateKind};

/// Coarse classification of a rejected command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Not this seat's turn, or not the right state/phase for the command.
    InvalidTurn,
    /// Coordinates off the grid, or the cell cannot take this move.
    InvalidPosition,
    /// A pile (or the table) has nothing left to give.
    ResourceExhausted,
    /// The table is not in a position to start or continue.
    NotReady,
    /// A registration name was empty or taken.
    InvalidName,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{player} is not seated at this table")]
    UnknownPlayer { player: PlayerId },

    #[error("it is {expected}'s turn, not {actual}'s")]
    NotYourTurn { expected: PlayerId, actual: PlayerId },

    #[error("command needs state {expected}, game is in {actual}")]
    WrongState { expected: StateKind, actual: StateKind },

    #[error("command needs phase {expected}, turn is in {actual}")]
    WrongPhase { expected: PhaseKind, actual: PhaseKind },

    #[error("the game has already started")]
    GameAlreadyStarted,

    #[error("cell ({row}, {col}) is outside the 3x4 grid")]
    OutOfBounds { row: usize, col: usize },

    #[error("cell ({row}, {col}) has been cleared")]
    CellAbsent { row: usize, col: usize },

    #[error("cell ({row}, {col}) is already face up")]
    AlreadyRevealed { row: usize, col: usize },

    #[error("the draw pile is empty")]
    DeckEmpty,

    #[error("the discard pile is empty")]
    DiscardEmpty,

    #[error("the table is full ({max} players)")]
    TableFull { max: usize },

    #[error("need at least {min} players to start, have {have}")]
    NotEnoughPlayers { min: usize, have: usize },

    #[error("the round is not over (game is in {actual})")]
    RoundNotOver { actual: StateKind },

    #[error("player name must not be empty")]
    EmptyName,

    #[error("player name {name:?} is already taken")]
    DuplicateName { name: String },
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::UnknownPlayer { .. }
            | EngineError::NotYourTurn { .. }
            | EngineError::WrongState { .. }
            | EngineError::WrongPhase { .. }
            | EngineError::GameAlreadyStarted => ErrorKind::InvalidTurn,
            EngineError::OutOfBounds { .. }
            | EngineError::CellAbsent { .. }
            | EngineError::AlreadyRevealed { .. } => ErrorKind::InvalidPosition,
            EngineError::DeckEmpty | EngineError::DiscardEmpty | EngineError::TableFull { .. } => {
                ErrorKind::ResourceExhausted
            }
            EngineError::NotEnoughPlayers { .. } | EngineError::RoundNotOver { .. } => {
                ErrorKind::NotReady
            }
            EngineError::EmptyName | EngineError::DuplicateName { .. } => ErrorKind::InvalidName,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            EngineError::NotYourTurn {
                expected: PlayerId::new(0),
                actual: PlayerId::new(1)
            }
            .kind(),
            ErrorKind::InvalidTurn
        );
        assert_eq!(EngineError::AlreadyRevealed { row: 0, col: 0 }.kind(), ErrorKind::InvalidPosition);
        assert_eq!(EngineError::DiscardEmpty.kind(), ErrorKind::ResourceExhausted);
        assert_eq!(
            EngineError::RoundNotOver { actual: StateKind::Playing }.kind(),
            ErrorKind::NotReady
        );
        assert_eq!(EngineError::EmptyName.kind(), ErrorKind::InvalidName);
    }

    #[test]
    fn test_messages() {
        let err = EngineError::WrongPhase {
            expected: PhaseKind::FlipCard,
            actual: PhaseKind::ChoosePile,
        };
        assert_eq!(err.to_string(), "command needs phase flip_card, turn is in choose_pile");

        let err = EngineError::NotYourTurn {
            expected: PlayerId::new(1),
            actual: PlayerId::new(0),
        };
        assert_eq!(err.to_string(), "it is Player 1's turn, not Player 0's");
    }
}
