//! Card values and deck composition.

use serde::{Deserialize, Serialize};

/// A single card. Only the face value matters.
///
/// Valid values are −2 through 12 inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(i8);

impl Card {
    /// Lowest printed value.
    pub const MIN: i8 = -2;
    /// Highest printed value.
    pub const MAX: i8 = 12;

    /// Create a card, or `None` if the value is not printed on any card.
    ///
    /// ```
    /// use skyjo_engine::core::Card;
    ///
    /// assert_eq!(Card::new(-2).map(Card::value), Some(-2));
    /// assert!(Card::new(13).is_none());
    /// ```
    #[must_use]
    pub const fn new(value: i8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Face value as a score contribution.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0 as i32
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How many copies of each value a fresh deck contains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckComposition {
    counts: Vec<(Card, usize)>,
}

impl DeckComposition {
    /// The 150-card distribution: −2×5, −1×10, 0×15, and 10 of each 1..=12.
    #[must_use]
    pub fn standard() -> Self {
        let counts = (Card::MIN..=Card::MAX)
            .filter_map(Card::new)
            .map(|card| {
                let count = match card.value() {
                    -2 => 5,
                    0 => 15,
                    _ => 10,
                };
                (card, count)
            })
            .collect();
        Self { counts }
    }

    /// Build from explicit (card, count) pairs.
    #[must_use]
    pub fn from_counts(counts: Vec<(Card, usize)>) -> Self {
        Self { counts }
    }

    /// Copies of `card` in a fresh deck.
    #[must_use]
    pub fn count_of(&self, card: Card) -> usize {
        self.counts
            .iter()
            .filter(|(c, _)| *c == card)
            .map(|(_, n)| n)
            .sum()
    }

    /// Total cards in a fresh deck.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Every card of the composition, grouped by value (unshuffled).
    #[must_use]
    pub fn cards(&self) -> Vec<Card> {
        self.counts
            .iter()
            .flat_map(|&(card, n)| std::iter::repeat(card).take(n))
            .collect()
    }
}

impl Default for DeckComposition {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(v: i8) -> Card {
        Card::new(v).unwrap()
    }

    #[test]
    fn test_card_bounds() {
        assert!(Card::new(-3).is_none());
        assert!(Card::new(-2).is_some());
        assert!(Card::new(12).is_some());
        assert!(Card::new(13).is_none());
    }

    #[test]
    fn test_standard_composition() {
        let comp = DeckComposition::standard();

        assert_eq!(comp.total(), 150);
        assert_eq!(comp.count_of(card(-2)), 5);
        assert_eq!(comp.count_of(card(-1)), 10);
        assert_eq!(comp.count_of(card(0)), 15);
        for v in 1..=12 {
            assert_eq!(comp.count_of(card(v)), 10, "value {}", v);
        }
        assert_eq!(comp.cards().len(), 150);
    }

    #[test]
    fn test_card_serializes_as_plain_integer() {
        assert_eq!(serde_json::to_string(&card(-1)).unwrap(), "-1");
        let back: Card = serde_json::from_str("7").unwrap();
        assert_eq!(back, card(7));
    }
}
