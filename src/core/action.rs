//! Player commands and the accepted-command history.
//!
//! `Command` is what a transport decodes from an inbound message. The serde
//! representation is tagged by `"action"` so a message looks like
//! `{"action": "swap_card", "row": 1, "col": 2}`.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// A command a seated player can issue during a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    /// Flip one of your cards during setup.
    SelectInitialCard { row: usize, col: usize },
    /// Take the top of the draw pile.
    DrawFromDeck,
    /// Take the top of the discard pile (must then be swapped in).
    DrawFromDiscard,
    /// Keep the card drawn from the deck.
    KeepCard,
    /// Throw the drawn card away and flip one of yours instead.
    DiscardCard,
    /// Put the held card at (row, col).
    SwapCard { row: usize, col: usize },
    /// Turn the face-down card at (row, col) face-up.
    FlipCard { row: usize, col: usize },
    /// Deal the next round.
    StartNewRound,
}

impl Command {
    /// Wire name of this command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Command::SelectInitialCard { .. } => "select_initial_card",
            Command::DrawFromDeck => "draw_from_deck",
            Command::DrawFromDiscard => "draw_from_discard",
            Command::KeepCard => "keep_card",
            Command::DiscardCard => "discard_card",
            Command::SwapCard { .. } => "swap_card",
            Command::FlipCard { .. } => "flip_card",
            Command::StartNewRound => "start_new_round",
        }
    }
}

/// An accepted command with ordering metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    /// The seat that issued it. `None` for table-level commands.
    pub player: Option<PlayerId>,

    pub command: Command,

    /// Round the command was applied in.
    pub round: u32,

    /// Position in the match-wide history.
    pub sequence: u32,
}

impl CommandRecord {
    #[must_use]
    pub fn new(player: Option<PlayerId>, command: Command, round: u32, sequence: u32) -> Self {
        Self {
            player,
            command,
            round,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_uses_action_tag() {
        let json = serde_json::to_value(Command::SwapCard { row: 1, col: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({"action": "swap_card", "row": 1, "col": 2}));

        let json = serde_json::to_value(Command::KeepCard).unwrap();
        assert_eq!(json, serde_json::json!({"action": "keep_card"}));
    }

    #[test]
    fn test_parse_inbound_message() {
        let cmd: Command =
            serde_json::from_str(r#"{"action":"select_initial_card","row":0,"col":3}"#).unwrap();
        assert_eq!(cmd, Command::SelectInitialCard { row: 0, col: 3 });

        let cmd: Command = serde_json::from_str(r#"{"action":"discard_card"}"#).unwrap();
        assert_eq!(cmd, Command::DiscardCard);

        assert!(serde_json::from_str::<Command>(r#"{"action":"cheat"}"#).is_err());
    }

    #[test]
    fn test_name_matches_serde_tag() {
        let all = [
            Command::SelectInitialCard { row: 0, col: 0 },
            Command::DrawFromDeck,
            Command::DrawFromDiscard,
            Command::KeepCard,
            Command::DiscardCard,
            Command::SwapCard { row: 0, col: 0 },
            Command::FlipCard { row: 0, col: 0 },
            Command::StartNewRound,
        ];
        for cmd in all {
            let json = serde_json::to_value(cmd).unwrap();
            assert_eq!(json["action"], cmd.name());
        }
    }

    #[test]
    fn test_record() {
        let record = CommandRecord::new(Some(PlayerId::new(1)), Command::DrawFromDeck, 2, 7);
        assert_eq!(record.player, Some(PlayerId::new(1)));
        assert_eq!(record.round, 2);
        assert_eq!(record.sequence, 7);
    }
}
