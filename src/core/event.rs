//! Events describing what an accepted command did.
//!
//! Every successful command returns its events in order. Transports can use
//! them for animation or logging; the engine never reads them back.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::card::Card;
use super::grid::GridPos;
use super::player::PlayerId;
use super::state::GameResult;

/// Events from a single command. Most commands produce one or two.
pub type Events = SmallVec<[GameEvent; 4]>;

/// Which pile a card came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pile {
    Deck,
    Discard,
}

/// Something that happened during a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A round was dealt and the discard pile seeded.
    RoundDealt { round: u32, discard_top: Card },

    CardRevealed { player: PlayerId, pos: GridPos, card: Card },

    /// Setup finished; `player` takes the first turn.
    StartingPlayerChosen { player: PlayerId },

    CardDrawn { player: PlayerId, pile: Pile, card: Card },

    /// The held card was kept for a swap.
    CardKept { player: PlayerId, card: Card },

    CardDiscarded { player: PlayerId, card: Card },

    /// `placed` went onto the grid face-up; `removed` went to the discard pile.
    CardSwapped { player: PlayerId, pos: GridPos, placed: Card, removed: Card },

    /// Three equal face-up cards left the game.
    ColumnCleared { player: PlayerId, col: usize, card: Card },

    TurnPassed { player: PlayerId },

    /// `player` revealed their whole grid; everyone else gets one last turn.
    RoundEndTriggered { player: PlayerId },

    FinalTurnCompleted { player: PlayerId },

    /// Scores for the finished round, in seat order, after doubling.
    RoundScored {
        round: u32,
        scores: Vec<i32>,
        doubled: Option<PlayerId>,
    },

    GameOver { result: GameResult },
}
