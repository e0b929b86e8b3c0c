//! Game configuration.

use serde::{Deserialize, Serialize};

/// Tunable rules for one room.
///
/// Start from `GameConfig::default()` and override the fields you care
/// about:
///
/// ```rust
/// use unoforge_engine::GameConfig;
///
/// let config = GameConfig {
///     challenge_enabled: true,
///     ..GameConfig::default()
/// };
/// assert_eq!(config.win_score(4), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Cards dealt to each seat at the start of a round.
    pub hand_size: usize,

    /// Minimum seats required to deal a round.
    pub min_players: usize,

    /// Maximum seats in one room.
    pub max_players: usize,

    /// Win threshold for a two-player game.
    pub base_win_score: u32,

    /// Added to the win threshold for every seat beyond two.
    pub win_score_step: u32,

    /// Whether a wild-draw-four may be challenged. Can only be changed
    /// between rounds.
    pub challenge_enabled: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: 7,
            min_players: 2,
            max_players: 10,
            base_win_score: 500,
            win_score_step: 250,
            challenge_enabled: false,
        }
    }
}

impl GameConfig {
    /// Cumulative score that ends the game for a table of `players` seats.
    pub fn win_score(&self, players: usize) -> u32 {
        let extra = players.saturating_sub(2) as u32;
        self.base_win_score + extra * self.win_score_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.hand_size, 7);
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_players, 10);
        assert!(!config.challenge_enabled);
    }

    #[test]
    fn test_win_score_scales_with_player_count() {
        let config = GameConfig::default();
        assert_eq!(config.win_score(2), 500);
        assert_eq!(config.win_score(3), 750);
        assert_eq!(config.win_score(10), 2500);
    }

    #[test]
    fn test_win_score_never_drops_below_base() {
        assert_eq!(GameConfig::default().win_score(1), 500);
    }
}
