//! Core types: seats, cards, grids, the round/turn state machine, commands,
//! events, RNG and configuration.
//!
//! Nothing here knows about command dispatch or transports; `rules::Engine`
//! drives these types.

pub mod player;
pub mod rng;
pub mod card;
pub mod deck;
pub mod grid;
pub mod config;
pub mod action;
pub mod event;
pub mod state;

pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use card::{Card, DeckComposition};
pub use deck::{Deck, DeckSource};
pub use grid::{Cell, ClearedColumns, GridPos, PlayerGrid, CELLS, COLS, ROWS};
pub use config::GameConfig;
pub use action::{Command, CommandRecord};
pub use event::{Events, GameEvent, Pile};
pub use state::{GameResult, GameState, Phase, PhaseKind, RoundSummary, Stage, StateKind};
