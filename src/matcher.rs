//! Historical game matching under board symmetry.
//!
//! Given a target position, scans an immutable corpus of recorded games for
//! every game whose move sequence passed through one of the target's 8
//! symmetric images, and aggregates outcome statistics for the move each
//! game played next.
//!
//! # Overview
//!
//! ```text
//! SymmetryMatcher::find_matches(&Corpus)
//!     |-- year filter (MatcherConfig)
//!     |-- pre-filter: replay placed squares only, compare empty masks
//!     |-- verify: full legal replay, exact board comparison (+1 implicit pass)
//!     |-- next move mapped back through the inverse symmetry
//! MoveStatistics::from_matches(&[GameMatch])
//! ```
//!
//! Malformed or truncated records are expected in historical data. They are
//! rejected as ordinary non-matches, never reported as errors.
//!
//! # Example
//!
//! ```
//! use othmatch::matcher::{CorpusBuilder, GameRecord, MatcherConfig, SymmetryMatcher};
//! use othmatch::position::Position;
//! use othmatch::square::Square;
//!
//! // f5 d6 c3 d3
//! let codes = [37, 43, 18, 19];
//! let mut builder = CorpusBuilder::new();
//! builder.push(GameRecord::from_codes(&codes, 36, 1998, 0).unwrap());
//! let corpus = builder.build();
//!
//! let mut target = Position::new();
//! target.make_move(Square::from_name("f5").unwrap()).unwrap();
//!
//! let matcher = SymmetryMatcher::new(&target, MatcherConfig::default()).unwrap();
//! let report = matcher.query(&corpus).unwrap();
//! assert_eq!(report.matches.len(), 1);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Color};
use crate::position::Position;
use crate::square::{NO_MOVE_CODE, Square};
use crate::transform::NUM_SYMMETRIES;

/// Maximum number of recorded moves in a game (one per initially empty square).
pub const MAX_GAME_MOVES: usize = 60;

/// Matcher error type.
#[derive(Error, Debug)]
pub enum MatchError {
    /// Configuration values are inconsistent.
    #[error("Invalid matcher configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed.
    #[error("Failed to parse matcher configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Dedicated thread pool could not be created.
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),

    /// Move list longer than a game can be.
    #[error("Game record has {0} moves (max 60)")]
    RecordTooLong(usize),

    /// Final disc count above 64.
    #[error("Invalid final disc count: {0}")]
    InvalidDiscCount(u8),

    /// JSON encoding of a report failed.
    #[error("Failed to encode report: {0}")]
    Encode(String),
}

/// One recorded game.
///
/// Moves are stored as square codes 0-63; unused trailing slots (and any
/// code the source could not decode) hold `NO_MOVE_CODE`. Forced passes are
/// not stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    moves: [i8; MAX_GAME_MOVES],
    black_discs: u8,
    year: u16,
    opening: u16,
}

impl GameRecord {
    /// Build a record from decoded move codes and metadata.
    ///
    /// # Arguments
    ///
    /// * `codes` - Played squares in order (at most 60); shorter lists are padded with `NO_MOVE_CODE`
    /// * `black_discs` - Black's final disc count (0-64)
    /// * `year` - Year the game was played
    /// * `opening` - Opening classification code from the source database
    ///
    /// # Errors
    ///
    /// * `MatchError::RecordTooLong` - more than 60 codes
    /// * `MatchError::InvalidDiscCount` - `black_discs` above 64
    pub fn from_codes(
        codes: &[i8],
        black_discs: u8,
        year: u16,
        opening: u16,
    ) -> Result<Self, MatchError> {
        if codes.len() > MAX_GAME_MOVES {
            return Err(MatchError::RecordTooLong(codes.len()));
        }
        if black_discs > 64 {
            return Err(MatchError::InvalidDiscCount(black_discs));
        }
        let mut moves = [NO_MOVE_CODE; MAX_GAME_MOVES];
        moves[..codes.len()].copy_from_slice(codes);
        Ok(Self {
            moves,
            black_discs,
            year,
            opening,
        })
    }

    /// Build a record from squares.
    pub fn from_squares(
        squares: &[Square],
        black_discs: u8,
        year: u16,
        opening: u16,
    ) -> Result<Self, MatchError> {
        let codes: Vec<i8> = squares.iter().map(|sq| sq.index() as i8).collect();
        Self::from_codes(&codes, black_discs, year, opening)
    }

    #[inline]
    pub fn moves(&self) -> &[i8; MAX_GAME_MOVES] {
        &self.moves
    }

    /// Square played at `ply`, or None for a missing or undecodable move.
    pub fn move_at(&self, ply: usize) -> Option<Square> {
        let code = *self.moves.get(ply)?;
        u8::try_from(code).ok().and_then(|c| Square::new(c).ok())
    }

    /// Number of leading moves that decode to a square.
    pub fn len(&self) -> usize {
        (0..MAX_GAME_MOVES)
            .take_while(|&ply| self.move_at(ply).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn black_discs(&self) -> u8 {
        self.black_discs
    }

    #[inline]
    pub fn year(&self) -> u16 {
        self.year
    }

    #[inline]
    pub fn opening(&self) -> u16 {
        self.opening
    }

    /// Final disc differential from Black's point of view.
    #[inline]
    pub fn black_score(&self) -> i32 {
        2 * self.black_discs as i32 - 64
    }
}

/// Load-phase collector for game records.
///
/// Sealed into an immutable [`Corpus`] by [`CorpusBuilder::build`]; queries
/// never see a corpus that is still being filled.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    games: Vec<GameRecord>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            games: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, game: GameRecord) {
        self.games.push(game);
    }

    /// Decode and push one game.
    pub fn push_codes(
        &mut self,
        codes: &[i8],
        black_discs: u8,
        year: u16,
        opening: u16,
    ) -> Result<(), MatchError> {
        self.games
            .push(GameRecord::from_codes(codes, black_discs, year, opening)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn build(self) -> Corpus {
        log::debug!("Corpus sealed with {} games", self.games.len());
        Corpus {
            games: self.games.into(),
        }
    }
}

impl Extend<GameRecord> for CorpusBuilder {
    fn extend<T: IntoIterator<Item = GameRecord>>(&mut self, iter: T) {
        self.games.extend(iter);
    }
}

/// Immutable collection of game records.
///
/// Cloning shares the underlying records.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    games: Arc<[GameRecord]>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GameRecord> {
        self.games.get(index)
    }

    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameRecord> {
        self.games.iter()
    }
}

impl FromIterator<GameRecord> for Corpus {
    fn from_iter<T: IntoIterator<Item = GameRecord>>(iter: T) -> Self {
        let mut builder = CorpusBuilder::new();
        builder.extend(iter);
        builder.build()
    }
}

/// Matcher configuration.
///
/// All fields are optional in JSON form.
///
/// ```
/// use othmatch::matcher::MatcherConfig;
///
/// let config = MatcherConfig::from_json_str(r#"{"min_year": 1980}"#).unwrap();
/// assert_eq!(config.min_year, Some(1980));
/// assert_eq!(config.num_threads, 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Worker threads for the corpus scan; 0 uses the global rayon pool.
    pub num_threads: usize,
    /// Skip games played before this year.
    pub min_year: Option<u16>,
    /// Skip games played after this year.
    pub max_year: Option<u16>,
}

impl MatcherConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self, MatchError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if let (Some(min), Some(max)) = (self.min_year, self.max_year) {
            if min > max {
                return Err(MatchError::InvalidConfig(format!(
                    "min_year {} is after max_year {}",
                    min, max
                )));
            }
        }
        Ok(())
    }

    #[inline]
    fn accepts_year(&self, year: u16) -> bool {
        self.min_year.is_none_or(|min| year >= min) && self.max_year.is_none_or(|max| year <= max)
    }
}

/// A game that passed through an image of the target position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GameMatch {
    /// Index of the game in the corpus.
    pub game_index: usize,
    /// Symmetry index `i` with `target.symmetry(i) == game board`.
    pub reflection: u8,
    /// Next move played in the game, mapped into the target's orientation.
    /// None when the game ended there or the next move belongs to the other side.
    pub next_move: Option<Square>,
    /// Final score from the point of view of the side to move at the match.
    pub score: i32,
}

/// Outcome tally for one move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MoveStats {
    pub count: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub total_score: i64,
}

impl MoveStats {
    fn record(&mut self, score: i32) {
        self.count += 1;
        self.total_score += score as i64;
        match score.signum() {
            1 => self.wins += 1,
            0 => self.draws += 1,
            _ => self.losses += 1,
        }
    }

    /// Average final score, 0.0 when empty.
    pub fn average_score(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_score as f64 / self.count as f64
        }
    }

    /// Wins plus half of draws over games played.
    pub fn win_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.wins as f64 + 0.5 * self.draws as f64) / self.count as f64
        }
    }
}

/// Per-move statistics over a set of matches, keyed by square in the
/// target's orientation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MoveStatistics {
    moves: BTreeMap<Square, MoveStats>,
    /// Matches that contributed a next move.
    played: u32,
    /// Matches with no next move.
    ended: u32,
}

impl MoveStatistics {
    /// Bucket matches by their next move.
    pub fn from_matches(matches: &[GameMatch]) -> Self {
        let mut stats = Self::default();
        for m in matches {
            match m.next_move {
                Some(sq) => {
                    stats.moves.entry(sq).or_default().record(m.score);
                    stats.played += 1;
                }
                None => stats.ended += 1,
            }
        }
        stats
    }

    pub fn get(&self, sq: Square) -> Option<&MoveStats> {
        self.moves.get(&sq)
    }

    /// Share of continuing games that played `sq`.
    pub fn frequency(&self, sq: Square) -> f64 {
        match self.moves.get(&sq) {
            Some(s) if self.played > 0 => s.count as f64 / self.played as f64,
            _ => 0.0,
        }
    }

    /// Number of matches that contributed a move.
    pub fn played(&self) -> u32 {
        self.played
    }

    /// Number of matches where the game did not continue with a move by the side to move.
    pub fn ended(&self) -> u32 {
        self.ended
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Moves ordered by play count (descending), ties by square.
    pub fn sorted(&self) -> Vec<(Square, MoveStats)> {
        let mut out: Vec<(Square, MoveStats)> = self.moves.iter().map(|(&k, &v)| (k, v)).collect();
        out.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));
        out
    }
}

/// Result of a full query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchReport {
    /// Recorded moves needed to reach the target.
    pub ply: usize,
    /// Games searched after the year filter.
    pub games_scanned: usize,
    pub matches: Vec<GameMatch>,
    pub statistics: MoveStatistics,
}

impl MatchReport {
    /// Pretty-printed JSON for reporting layers.
    pub fn to_json(&self) -> Result<String, MatchError> {
        serde_json::to_string_pretty(self).map_err(|e| MatchError::Encode(e.to_string()))
    }
}

/// Searches a corpus for games passing through any symmetric image of a target.
#[derive(Clone, Debug)]
pub struct SymmetryMatcher {
    reflections: [Board; NUM_SYMMETRIES],
    /// None when no game can reach the target.
    ply: Option<usize>,
    config: MatcherConfig,
}

impl SymmetryMatcher {
    /// Prepare a matcher for `target`.
    ///
    /// # Errors
    ///
    /// `MatchError::InvalidConfig` when the configuration fails validation.
    pub fn new(target: &Position, config: MatcherConfig) -> Result<Self, MatchError> {
        config.validate()?;
        let board = *target.board();
        let n_empty = board.n_empty() as usize;
        let ply = if board.is_impossible() || n_empty > MAX_GAME_MOVES {
            log::warn!(
                "Target position cannot occur in a game ({} empty squares)",
                n_empty
            );
            None
        } else {
            Some(MAX_GAME_MOVES - n_empty)
        };
        Ok(Self {
            reflections: board.reflections(),
            ply,
            config,
        })
    }

    /// The target's 8 symmetric images.
    pub fn reflections(&self) -> &[Board; NUM_SYMMETRIES] {
        &self.reflections
    }

    /// Recorded moves needed to reach the target, if reachable at all.
    pub fn ply(&self) -> Option<usize> {
        self.ply
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Find every game in `corpus` passing through an image of the target.
    ///
    /// Results are in corpus order.
    ///
    /// # Errors
    ///
    /// `MatchError::ThreadPool` when a dedicated pool is requested and cannot be built.
    pub fn find_matches(&self, corpus: &Corpus) -> Result<Vec<GameMatch>, MatchError> {
        Ok(self.scan(corpus)?.0)
    }

    /// Run `find_matches` and aggregate statistics.
    pub fn query(&self, corpus: &Corpus) -> Result<MatchReport, MatchError> {
        let (matches, games_scanned) = self.scan(corpus)?;
        let statistics = MoveStatistics::from_matches(&matches);
        log::info!(
            "Matched {} of {} games ({} distinct next moves)",
            matches.len(),
            games_scanned,
            statistics.moves.len()
        );
        Ok(MatchReport {
            ply: self.ply.unwrap_or(0),
            games_scanned,
            matches,
            statistics,
        })
    }

    /// Test a single game.
    ///
    /// Returns the match with `game_index` set to `index`.
    pub fn match_game(&self, index: usize, game: &GameRecord) -> Option<GameMatch> {
        let ply = self.ply?;
        if !self.passes_prefilter(game, ply) {
            return None;
        }
        self.verify(index, game, ply)
    }

    fn scan(&self, corpus: &Corpus) -> Result<(Vec<GameMatch>, usize), MatchError> {
        let Some(ply) = self.ply else {
            return Ok((Vec::new(), 0));
        };

        let scanned = AtomicUsize::new(0);
        let survivors = AtomicUsize::new(0);
        let run = || {
            corpus
                .games()
                .par_iter()
                .enumerate()
                .filter(|(_, game)| self.config.accepts_year(game.year))
                .filter_map(|(index, game)| {
                    scanned.fetch_add(1, Ordering::Relaxed);
                    if !self.passes_prefilter(game, ply) {
                        return None;
                    }
                    survivors.fetch_add(1, Ordering::Relaxed);
                    self.verify(index, game, ply)
                })
                .collect::<Vec<_>>()
        };

        let matches = if self.config.num_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.num_threads)
                .build()
                .map_err(|e| MatchError::ThreadPool(e.to_string()))?;
            pool.install(run)
        } else {
            run()
        };

        let scanned = scanned.load(Ordering::Relaxed);
        log::debug!(
            "Pre-filter at ply {}: {} of {} games survived, {} verified",
            ply,
            survivors.load(Ordering::Relaxed),
            scanned,
            matches.len()
        );
        Ok((matches, scanned))
    }

    /// Empty-square comparison over placed squares only.
    ///
    /// Necessary for a match, not sufficient.
    fn passes_prefilter(&self, game: &GameRecord, ply: usize) -> bool {
        let mut empty = Board::new().empty();
        for &code in &game.moves[..ply] {
            if !(0..64).contains(&code) {
                return false;
            }
            empty &= !(1u64 << code);
        }
        self.reflections.iter().any(|r| r.empty() == empty)
    }

    fn verify(&self, index: usize, game: &GameRecord, ply: usize) -> Option<GameMatch> {
        let mut pos = Position::new();
        for p in 0..ply {
            let Some(sq) = game.move_at(p) else {
                log::trace!("Game {}: missing move at ply {}", index, p);
                return None;
            };
            // Forced passes are not recorded.
            if pos.calc_moves() == 0 {
                pos.pass();
            }
            if pos.calc_moves() & sq.bit() == 0 {
                log::trace!("Game {}: illegal move {} at ply {}", index, sq, p);
                return None;
            }
            pos.make_move(sq).ok()?;
        }

        let reflection = match self.find_reflection(pos.board()) {
            Some(r) => r,
            None if pos.calc_moves() == 0 => {
                pos.pass();
                self.find_reflection(pos.board())?
            }
            None => return None,
        };

        let next_move = game
            .move_at(ply)
            .filter(|sq| pos.calc_moves() & sq.bit() != 0)
            .map(|sq| sq.inverse_symmetry(reflection));

        let score = match pos.to_move() {
            Color::Black => game.black_score(),
            Color::White => -game.black_score(),
        };

        Some(GameMatch {
            game_index: index,
            reflection,
            next_move,
            score,
        })
    }

    #[inline]
    fn find_reflection(&self, board: &Board) -> Option<u8> {
        self.reflections
            .iter()
            .position(|r| r == board)
            .map(|i| i as u8)
    }
}
