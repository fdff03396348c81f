//! Match configuration.
//!
//! The defaults are the standard rules: 2–8 seats, two initial reveals,
//! the match ends once someone reaches 100 points, 150-card deck.
//! Builders assert on values that could never produce a playable match.

use serde::{Deserialize, Serialize};

use super::card::DeckComposition;
use super::grid::CELLS;

/// Complete match configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seats required before the game can start.
    pub min_players: usize,

    /// Seats available at the table.
    pub max_players: usize,

    /// Cards each seat flips before the first turn.
    pub initial_reveals: usize,

    /// Total score that ends the match.
    pub score_limit: i32,

    /// Cards in every freshly built deck.
    pub composition: DeckComposition,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 8,
            initial_reveals: 2,
            score_limit: 100,
            composition: DeckComposition::standard(),
        }
    }
}

impl GameConfig {
    /// Standard rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table size.
    ///
    /// The deck must cover a full deal plus the discard seed.
    #[must_use]
    pub fn with_max_players(mut self, max: usize) -> Self {
        assert!(max >= self.min_players, "Table must seat at least {} players", self.min_players);
        assert!(max <= 255, "At most 255 players supported");
        self.max_players = max;
        self.assert_deck_covers_deal();
        self
    }

    /// Set how many cards each seat flips during setup.
    ///
    /// At least one card stays face-down, so every grid has a flip left when
    /// play starts.
    #[must_use]
    pub fn with_initial_reveals(mut self, reveals: usize) -> Self {
        assert!((1..CELLS).contains(&reveals), "Initial reveals must be 1-{}", CELLS - 1);
        self.initial_reveals = reveals;
        self
    }

    /// Set the total score that ends the match.
    #[must_use]
    pub fn with_score_limit(mut self, limit: i32) -> Self {
        assert!(limit > 0, "Score limit must be positive");
        self.score_limit = limit;
        self
    }

    /// Use a different deck composition.
    #[must_use]
    pub fn with_composition(mut self, composition: DeckComposition) -> Self {
        self.composition = composition;
        self.assert_deck_covers_deal();
        self
    }

    /// Cards consumed by dealing a full table plus seeding the discard pile.
    #[must_use]
    pub fn cards_needed(&self, player_count: usize) -> usize {
        player_count * CELLS + 1
    }

    fn assert_deck_covers_deal(&self) {
        assert!(
            self.composition.total() >= self.cards_needed(self.max_players),
            "Deck of {} cards cannot deal {} players",
            self.composition.total(),
            self.max_players
        );
    }
}
