//! # skyjo-engine
//!
//! Authoritative rules engine for the Skyjo card game.
//!
//! ## Design Principles
//!
//! 1. **Validate, then mutate**: every command is checked in full before any
//!    state changes. A rejected command leaves the engine untouched.
//!
//! 2. **States carry their data**: the held card, the trigger seat and the
//!    final-turn bookkeeping only exist in the stages where they mean something.
//!
//! 3. **Deterministic**: decks come from a seeded `GameRng` or an injected
//!    `DeckSource`, so a seed plus the command history replays a match.
//!
//! ## Architecture
//!
//! - **Single writer**: the engine is a plain `&mut self` state machine. A
//!   transport serializes commands and broadcasts `Snapshot`s afterwards.
//!
//! - **Events**: each accepted command returns the `GameEvent`s it produced.
//!
//! ## Modules
//!
//! - `core`: seats, cards, grids, the round/turn state machine, commands, RNG
//! - `rules`: the `Engine`, its errors and snapshots

pub mod core;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    PlayerId, PlayerMap,
    GameRng,
    Card, DeckComposition, Deck, DeckSource,
    Cell, GridPos, PlayerGrid, CELLS, COLS, ROWS,
    GameConfig,
    Command, CommandRecord,
    Events, GameEvent, Pile,
    GameResult, GameState, Phase, PhaseKind, RoundSummary, Stage, StateKind,
};

pub use crate::rules::{
    CardLedger, Engine,
    EngineError, ErrorKind,
    CellView, SeatView, Snapshot, Visibility,
};
