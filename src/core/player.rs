//! Seat identification and per-seat data storage.
//!
//! ## PlayerId
//!
//! Type-safe seat identifier. Seats are numbered in registration order and
//! never change for the lifetime of a match.
//!
//! ## PlayerMap
//!
//! Per-seat storage backed by `Vec` for O(1) access. Unlike a fixed-size map,
//! seats are appended while the table is filling up.

use serde::{Deserialize, Serialize};

/// Seat identifier.
///
/// Seat indices are 0-based: the first registered player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat after this one, wrapping around a table of `player_count` seats.
    ///
    /// ```
    /// use skyjo_engine::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::new(0).next(3), PlayerId::new(1));
    /// assert_eq!(PlayerId::new(2).next(3), PlayerId::new(0));
    /// ```
    #[must_use]
    pub fn next(self, player_count: usize) -> Self {
        Self(((self.index() + 1) % player_count) as u8)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use skyjo_engine::core::{PlayerId, PlayerMap};
///
/// let mut totals: PlayerMap<i32> = PlayerMap::new();
/// let alice = totals.push(0);
/// let bob = totals.push(0);
///
/// *totals.get_mut(bob).unwrap() += 12;
/// assert_eq!(totals.get(alice), Some(&0));
/// assert_eq!(totals.get(bob), Some(&12));
/// assert_eq!(totals.player_count(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> Default for PlayerMap<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T> PlayerMap<T> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a seat, returning its ID.
    pub fn push(&mut self, value: T) -> PlayerId {
        assert!(self.data.len() < 255, "At most 255 players supported");
        let id = PlayerId(self.data.len() as u8);
        self.data.push(value);
        id
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Whether `player` refers to an existing seat.
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        player.index() < self.data.len()
    }

    /// Get a seat's data, or `None` for an unknown seat.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Get a mutable reference to a seat's data.
    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs in seat order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over values in seat order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Iterate mutably over values in seat order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);

        assert_eq!(p0.index(), 0);
        assert_eq!(p1.index(), 1);
        assert_eq!(format!("{}", p0), "Player 0");
    }

    #[test]
    fn test_player_id_next_wraps() {
        assert_eq!(PlayerId::new(0).next(2), PlayerId::new(1));
        assert_eq!(PlayerId::new(1).next(2), PlayerId::new(0));
        assert_eq!(PlayerId::new(3).next(4), PlayerId::new(0));
    }

    #[test]
    fn test_player_map_push_assigns_seats_in_order() {
        let mut map: PlayerMap<&str> = PlayerMap::new();
        assert_eq!(map.player_count(), 0);

        let a = map.push("alice");
        let b = map.push("bob");

        assert_eq!(a, PlayerId::new(0));
        assert_eq!(b, PlayerId::new(1));
        assert_eq!(map.get(b), Some(&"bob"));
        assert_eq!(map.player_count(), 2);
    }

    #[test]
    fn test_player_map_unknown_seat() {
        let mut map: PlayerMap<i32> = PlayerMap::new();
        map.push(1);

        assert!(map.contains(PlayerId::new(0)));
        assert!(!map.contains(PlayerId::new(1)));
        assert_eq!(map.get(PlayerId::new(1)), None);
    }

    #[test]
    fn test_player_map_iter_mut() {
        let mut map: PlayerMap<i32> = PlayerMap::new();
        for _ in 0..3 {
            map.push(0);
        }
        for (id, v) in map.iter_mut() {
            *v = id.index() as i32 * 10;
        }

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs[2], (PlayerId::new(2), &20));
    }

    #[test]
    fn test_player_map_serialization() {
        let mut map: PlayerMap<i32> = PlayerMap::new();
        map.push(1);
        map.push(2);
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: PlayerMap<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }
}
