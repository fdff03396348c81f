//! The draw pile.
//!
//! A `Deck` is rebuilt at game start and at the start of every round. It never
//! refills itself from the discard pile: once empty, only the discard pile can
//! be drawn from.

use serde::{Deserialize, Serialize};

use super::card::{Card, DeckComposition};
use super::rng::GameRng;
use crate::rules::EngineError;

/// Draw pile (top = end of the vec).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Shuffle a fresh copy of `composition`.
    #[must_use]
    pub fn shuffled(composition: &DeckComposition, rng: &mut GameRng) -> Self {
        let mut cards = composition.cards();
        rng.shuffle(&mut cards);
        Self { cards }
    }

    /// Build an unshuffled deck where `cards[0]` is drawn first.
    ///
    /// ```
    /// use skyjo_engine::core::{Card, Deck};
    ///
    /// let c = |v| Card::new(v).unwrap();
    /// let mut deck = Deck::stacked(vec![c(1), c(2)]);
    /// assert_eq!(deck.draw().unwrap(), c(1));
    /// assert_eq!(deck.draw().unwrap(), c(2));
    /// assert!(deck.draw().is_err());
    /// ```
    #[must_use]
    pub fn stacked(mut cards: Vec<Card>) -> Self {
        cards.reverse();
        Self { cards }
    }

    /// Remove the top card.
    pub fn draw(&mut self) -> Result<Card, EngineError> {
        self.cards.pop().ok_or(EngineError::DeckEmpty)
    }

    /// Cards left to draw.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Supplies the engine with a fresh deck at game start and every new round.
///
/// `GameRng` shuffles the configured composition. Tests implement this to
/// stack the deck.
pub trait DeckSource {
    /// Build the deck for `round` (1-based).
    fn next_deck(&mut self, composition: &DeckComposition, round: u32) -> Deck;

    /// Take back a deck the engine refused (too small to deal the table), so
    /// the next request for `round` yields it again.
    ///
    /// The default drops it. That is enough for sources whose decks always
    /// cover the table, such as `GameRng` with a validated `GameConfig`.
    fn return_deck(&mut self, deck: Deck, round: u32) {
        let _ = (deck, round);
    }
}

impl DeckSource for GameRng {
    fn next_deck(&mut self, composition: &DeckComposition, _round: u32) -> Deck {
        let mut round_rng = self.fork();
        Deck::shuffled(composition, &mut round_rng)
    }
}
