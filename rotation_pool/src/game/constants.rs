//! Fixed rules of the rack.

use super::entities::Score;

/// Sum of every numbered ball's value. This is also the `maxPossible`
/// of every player before the first pot.
pub const MAX_TOTAL_SCORE: Score = 156;

/// The cue ball. It is never part of the rack and is never active.
pub const WHITE_BALL: u8 = 0;

/// Highest ball number on the table.
pub const HIGHEST_BALL: u8 = 15;

/// Canonical potting order: score ascending, then number ascending.
/// The white ball never appears here.
pub const POT_ORDER: [u8; 15] = [3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 1, 2];

/// Fewest players a game can be created with.
pub const MIN_PLAYERS: usize = 3;

/// Largest roster a game accepts unless configured otherwise.
pub const DEFAULT_MAX_PLAYERS: usize = 12;
