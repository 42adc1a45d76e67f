//! othmatch - オセロ盤面エンジンと対称性を考慮した棋譜照合
//!
//! BitBoard盤面表現、フラッドフィルによる合法手生成、8方向の対称変換、
//! および過去の棋譜集から指定局面（とその対称像）を通過した対局を探す照合を提供する。

pub mod board;
pub mod matcher;
pub mod move_set;
pub mod movegen;
pub mod position;
pub mod square;
pub mod transform;

pub use board::{Board, Color, MinimalReflection, Mobility, PassCode};
pub use matcher::{
    Corpus, CorpusBuilder, GameMatch, GameRecord, MAX_GAME_MOVES, MatchError, MatchReport,
    MatcherConfig, MoveStatistics, MoveStats, SymmetryMatcher,
};
pub use move_set::MoveSet;
pub use movegen::{calc_flips, calc_moves};
pub use position::{GameError, MoveUndo, Position};
pub use square::{Move, NO_MOVE_CODE, PASS_CODE, Square, SquareError};
