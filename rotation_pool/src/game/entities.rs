use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};
use uuid::Uuid;

use super::{
    constants::{HIGHEST_BALL, MAX_TOTAL_SCORE, POT_ORDER, WHITE_BALL},
    errors::{GameError, GameResult},
    functional,
};

/// Type alias for points. Scores go negative on fouls and penalties.
pub type Score = i32;

/// Identifier of one game (and of its event log).
pub type GameId = Uuid;

/// A ball on the table, numbered 0 (white) through 15.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Ball(u8);

impl Ball {
    pub const WHITE: Ball = Ball(WHITE_BALL);

    pub fn new(number: u8) -> GameResult<Self> {
        if number > HIGHEST_BALL {
            return Err(GameError::InvalidBall(number));
        }
        Ok(Self(number))
    }

    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_white(self) -> bool {
        self.0 == WHITE_BALL
    }

    /// Point value of the ball. Balls 1 and 2 are worth the most even
    /// though they are potted last.
    #[must_use]
    pub const fn value(self) -> Score {
        match self.0 {
            0 => 0,
            1 => 16,
            2 => 17,
            3..=6 => 6,
            n => n as Score,
        }
    }
}

impl TryFrom<u8> for Ball {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ball> for u8 {
    fn from(ball: Ball) -> Self {
        ball.0
    }
}

impl fmt::Display for Ball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_white() {
            write!(f, "white")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// The numbered balls still on the table.
///
/// Backed by a bitmask (bit `n` set means ball `n` is on the table), so it
/// can never contain the white ball or the same ball twice, and it is
/// `Copy`. Iteration always follows [`POT_ORDER`].
#[derive(Clone, Copy, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Rack {
    mask: u16,
}

impl Rack {
    const FULL_MASK: u16 = 0xFFFE;

    #[must_use]
    pub const fn full() -> Self {
        Self {
            mask: Self::FULL_MASK,
        }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self { mask: 0 }
    }

    #[must_use]
    pub const fn contains(self, ball: Ball) -> bool {
        !ball.is_white() && self.mask & (1u16 << ball.0) != 0
    }

    /// Copy of this rack with `ball` taken off the table. Removing the
    /// white ball, or a ball that is already gone, changes nothing.
    #[must_use]
    pub const fn without(self, ball: Ball) -> Self {
        if ball.is_white() {
            return self;
        }
        Self {
            mask: self.mask & !(1u16 << ball.0),
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.mask == 0
    }

    #[must_use]
    pub const fn len(self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Balls on the table in pot order.
    pub fn iter(self) -> impl Iterator<Item = Ball> {
        POT_ORDER
            .into_iter()
            .map(Ball)
            .filter(move |ball| self.contains(*ball))
    }

    /// Sum of the values of every ball on the table.
    #[must_use]
    pub fn total(self) -> Score {
        functional::remaining_total(self)
    }
}

impl Default for Rack {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Debug for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(Ball::number)).finish()
    }
}

impl TryFrom<Vec<u8>> for Rack {
    type Error = GameError;

    fn try_from(numbers: Vec<u8>) -> Result<Self, Self::Error> {
        let mut mask = 0u16;
        for number in numbers {
            let ball = Ball::new(number)?;
            if ball.is_white() {
                return Err(GameError::InvalidBall(number));
            }
            let bit = 1u16 << number;
            if mask & bit != 0 {
                return Err(GameError::DuplicateBall(number));
            }
            mask |= bit;
        }
        Ok(Self { mask })
    }
}

impl From<Rack> for Vec<u8> {
    fn from(rack: Rack) -> Self {
        rack.iter().map(Ball::number).collect()
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Active,
    Eliminated,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerStatus::Active => write!(f, "active"),
            PlayerStatus::Eliminated => write!(f, "eliminated"),
        }
    }
}

/// Game lifecycle. Variants are declared in the only order a game may move
/// through them.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Lobby,
    Active,
    Ended,
}

impl GameStatus {
    /// Moves forward to `to`, never backward.
    #[must_use]
    pub fn advance(self, to: GameStatus) -> GameStatus {
        self.max(to)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Lobby => write!(f, "lobby"),
            GameStatus::Active => write!(f, "active"),
            GameStatus::Ended => write!(f, "ended"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub score: Score,
    pub status: PlayerStatus,
    /// Score plus everything still on the table.
    pub max_possible: Score,
    /// Set once the score reaches [`MAX_TOTAL_SCORE`]. Informational only.
    pub hit_max: bool,
}

impl PlayerScore {
    #[must_use]
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            score: 0,
            status: PlayerStatus::Active,
            max_possible: MAX_TOTAL_SCORE,
            hit_max: false,
        }
    }
}

/// Canonical state of one game, derived entirely from its event log.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameState {
    /// One entry per roster player, in roster order.
    pub scores: Vec<PlayerScore>,
    pub remaining_balls: Rack,
    pub remaining_total: Score,
    pub top_score: Score,
    pub winners: Vec<PlayerId>,
    pub status: GameStatus,
    pub is_first_ball_potted: bool,
    /// Number of events folded into this state.
    pub version: u64,
}

impl GameState {
    /// Fresh state for `roster`: every player on zero with the full rack
    /// left to play for.
    #[must_use]
    pub fn new(roster: &Roster, status: GameStatus) -> Self {
        let remaining_balls = Rack::full();
        Self {
            scores: roster
                .iter()
                .map(|entry| PlayerScore::new(entry.player_id.clone()))
                .collect(),
            remaining_balls,
            remaining_total: remaining_balls.total(),
            top_score: 0,
            winners: Vec::new(),
            status,
            is_first_ball_potted: false,
            version: 0,
        }
    }

    #[must_use]
    pub fn score_of(&self, player_id: &PlayerId) -> Option<&PlayerScore> {
        self.scores.iter().find(|s| &s.player_id == player_id)
    }

    /// The ball players are expected to pot next.
    #[must_use]
    pub fn active_ball(&self) -> Option<Ball> {
        functional::active_ball(self.remaining_balls)
    }

    /// Every player, dropped out or not, whose score equals the top score.
    #[must_use]
    pub fn leaders(&self) -> Vec<PlayerId> {
        self.scores
            .iter()
            .filter(|s| s.score == self.top_score)
            .map(|s| s.player_id.clone())
            .collect()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.status == GameStatus::Ended
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    /// Display name captured when the game was created.
    pub name: String,
    /// 1-based seat in the rotation.
    pub turn_order: u32,
    pub dropped_out: bool,
}

/// Participants of a game, in turn order.
///
/// Owned by the caller. Reductions only read it to leave dropped-out
/// players out of the clinch comparison.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    #[must_use]
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    /// Roster where each id doubles as the display name.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = ids
            .into_iter()
            .enumerate()
            .map(|(idx, id)| RosterEntry {
                player_id: PlayerId::new(id.as_ref()),
                name: id.as_ref().trim().to_string(),
                turn_order: idx as u32 + 1,
                dropped_out: false,
            })
            .collect();
        Self { entries }
    }

    /// Checks player count and id uniqueness.
    pub fn validate(&self, min_players: usize, max_players: usize) -> GameResult<()> {
        if self.entries.len() < min_players {
            return Err(GameError::NotEnoughPlayers {
                min: min_players,
                got: self.entries.len(),
            });
        }
        if self.entries.len() > max_players {
            return Err(GameError::TooManyPlayers {
                max: max_players,
                got: self.entries.len(),
            });
        }
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(&entry.player_id) {
                return Err(GameError::DuplicatePlayer(entry.player_id.clone()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, player_id: &PlayerId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| &e.player_id == player_id)
    }

    #[must_use]
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.get(player_id).is_some()
    }

    /// Unknown players count as not dropped out.
    #[must_use]
    pub fn is_dropped_out(&self, player_id: &PlayerId) -> bool {
        self.get(player_id).is_some_and(|e| e.dropped_out)
    }

    /// Returns `false` if the player had already dropped out.
    pub fn mark_dropped_out(&mut self, player_id: &PlayerId) -> GameResult<bool> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| &e.player_id == player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.clone()))?;
        let changed = !entry.dropped_out;
        entry.dropped_out = true;
        Ok(changed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
