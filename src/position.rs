//! 対局レベルの局面
//!
//! `Board`に石数カウンタと手番の色を加え、パス・終局の判定を行う。

use thiserror::Error;

use crate::board::{self, Board, Color, PassCode};
use crate::move_set::MoveSet;
use crate::movegen::calc_flips;
use crate::square::Square;

/// 着手エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// 既に石があるマスへの着手
    #[error("Square {0} is already occupied")]
    Occupied(Square),

    /// 1枚も返らない着手（非合法手）
    #[error("Move {0} flips no discs")]
    NoFlips(Square),
}

/// 着手の取り消し情報
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveUndo {
    /// 置いた石
    pub placed: u64,
    /// 返った石
    pub flips: u64,
}

/// 局面
///
/// `n_empty`、`n_mover`は盤面から再計算できるが、差分で更新して保持する。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    board: Board,
    n_empty: u32,
    n_mover: u32,
    to_move: Color,
}

impl Position {
    /// 初期局面（黒番）
    ///
    /// # Examples
    ///
    /// ```
    /// use othmatch::board::Color;
    /// use othmatch::position::Position;
    ///
    /// let pos = Position::new();
    /// assert_eq!(pos.n_empty(), 60);
    /// assert_eq!(pos.to_move(), Color::Black);
    /// ```
    pub fn new() -> Self {
        Self::from_board(Board::new(), Color::Black)
    }

    /// 盤面と手番から生成
    pub fn from_board(board: Board, to_move: Color) -> Self {
        Self {
            board,
            n_empty: board.n_empty(),
            n_mover: board.mover().count_ones(),
            to_move,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn to_move(&self) -> Color {
        self.to_move
    }

    #[inline]
    pub fn is_black_move(&self) -> bool {
        self.to_move == Color::Black
    }

    #[inline]
    pub fn n_empty(&self) -> u32 {
        self.n_empty
    }

    /// 手番側の石数
    #[inline]
    pub fn n_mover(&self) -> u32 {
        self.n_mover
    }

    /// 相手側の石数
    #[inline]
    pub fn n_enemy(&self) -> u32 {
        64 - self.n_mover - self.n_empty
    }

    /// 黒石の数
    pub fn n_black(&self) -> u32 {
        match self.to_move {
            Color::Black => self.n_mover,
            Color::White => self.n_enemy(),
        }
    }

    /// 白石の数
    pub fn n_white(&self) -> u32 {
        match self.to_move {
            Color::Black => self.n_enemy(),
            Color::White => self.n_mover,
        }
    }

    /// 手番側の合法手マスク
    #[inline]
    pub fn calc_moves(&self) -> u64 {
        self.board.calc_moves()
    }

    /// 手番側の合法手カーソル
    pub fn legal_moves(&self) -> MoveSet {
        MoveSet::new(&self.board)
    }

    /// `sq`に着手する
    ///
    /// 8方向に相手石をたどり、自石で終わる方向の石だけを返す。
    /// 着手後は手番が入れ替わる。
    ///
    /// # Errors
    ///
    /// * `GameError::Occupied` - 空きマスでない
    /// * `GameError::NoFlips` - 1枚も返らない
    pub fn make_move(&mut self, sq: Square) -> Result<MoveUndo, GameError> {
        let placed = sq.bit();
        if self.board.empty() & placed == 0 {
            return Err(GameError::Occupied(sq));
        }
        let flips = calc_flips(self.board.mover(), self.board.enemy(), sq.index());
        if flips == 0 {
            return Err(GameError::NoFlips(sq));
        }

        let n_flips = flips.count_ones();
        let n_new_mover = self.n_enemy() - n_flips;
        self.board.make_move(placed, flips);
        self.n_mover = n_new_mover;
        self.n_empty -= 1;
        self.to_move = self.to_move.opposite();

        Ok(MoveUndo { placed, flips })
    }

    /// `make_move`を取り消す
    ///
    /// 着手後にパスした場合は、先にパスを取り消すこと。
    pub fn undo_move(&mut self, undo: MoveUndo) {
        let n_flips = undo.flips.count_ones();
        // 着手後の相手側 = 着手前の手番側 + 返った石 + 置いた石
        let n_prev_mover = self.n_enemy() - n_flips - 1;
        self.board.undo_move(undo.placed, undo.flips);
        self.n_empty += 1;
        self.n_mover = n_prev_mover;
        self.to_move = self.to_move.opposite();
    }

    /// 合法手の列を順に着手する
    pub fn apply_moves(&mut self, moves: &[Square]) -> Result<(), GameError> {
        for &sq in moves {
            if self.calc_moves() == 0 {
                self.pass();
            }
            self.make_move(sq)?;
        }
        Ok(())
    }

    /// パス
    pub fn pass(&mut self) {
        self.board.pass();
        self.n_mover = 64 - self.n_mover - self.n_empty;
        self.to_move = self.to_move.opposite();
    }

    /// 合法手を計算し、必要ならパスする
    ///
    /// 手番側に合法手がなければパスして相手の合法手を計算する。
    /// `PassCode::MustPass`、`PassCode::GameOver`の場合、局面は1回パスした状態になる。
    ///
    /// # Returns
    ///
    /// (合法手マスク, パス判定コード)
    pub fn calc_moves_and_pass(&mut self) -> (u64, PassCode) {
        let moves = self.calc_moves();
        if moves != 0 {
            return (moves, PassCode::CanMove);
        }
        self.pass();
        let moves = self.calc_moves();
        if moves != 0 {
            (moves, PassCode::MustPass)
        } else {
            (0, PassCode::GameOver)
        }
    }

    /// 終局かどうか
    pub fn is_game_over(&self) -> bool {
        self.calc_moves() == 0 && self.board.calc_enemy_moves() == 0
    }

    /// 終局スコア（手番側視点、空きマスは勝者に加算）
    pub fn terminal_value(&self) -> i32 {
        board::terminal_value(
            self.n_mover as i32,
            self.n_enemy() as i32,
            self.n_empty as i32,
        )
    }

    /// 合法手数
    ///
    /// `for_current_side`がfalseなら相手側の合法手数を、パスした複製で計算する。
    pub fn mobility(&self, for_current_side: bool) -> u32 {
        if for_current_side {
            self.calc_moves().count_ones()
        } else {
            let mut passed = *self;
            passed.pass();
            passed.calc_moves().count_ones()
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sq(name: &str) -> Square {
        Square::from_name(name).unwrap()
    }

    fn assert_counters_consistent(pos: &Position) {
        assert_eq!(pos.n_empty(), pos.board().n_empty(), "n_emptyが盤面と一致しない");
        assert_eq!(
            pos.n_mover(),
            pos.board().mover().count_ones(),
            "n_moverが盤面と一致しない"
        );
    }

    #[test]
    fn test_initial_position() {
        let pos = Position::new();
        assert_eq!(pos.n_black(), 2);
        assert_eq!(pos.n_white(), 2);
        assert!(pos.is_black_move());
        assert_eq!(pos.mobility(true), 4);
        assert_eq!(pos.mobility(false), 4);
        assert!(!pos.is_game_over());
    }

    #[test]
    fn test_make_move_flips_line() {
        let mut pos = Position::new();
        let undo = pos.make_move(sq("d3")).unwrap();
        assert_eq!(undo.flips, sq("d4").bit());
        assert_eq!(pos.n_black(), 4);
        assert_eq!(pos.n_white(), 1);
        assert_eq!(pos.to_move(), Color::White);
        assert_counters_consistent(&pos);
    }

    #[test]
    fn test_make_move_errors() {
        let mut pos = Position::new();
        assert_eq!(pos.make_move(sq("d4")), Err(GameError::Occupied(sq("d4"))));
        assert_eq!(pos.make_move(sq("a1")), Err(GameError::NoFlips(sq("a1"))));
        assert_eq!(pos, Position::new(), "失敗した着手で局面は変化しない");
    }

    #[test]
    fn test_undo_move_restores() {
        let mut pos = Position::new();
        let original = pos;
        let undo = pos.make_move(sq("f5")).unwrap();
        pos.undo_move(undo);
        assert_eq!(pos, original);
    }

    #[test]
    fn test_pass() {
        let mut pos = Position::new();
        pos.make_move(sq("d3")).unwrap();
        let before = pos;
        pos.pass();
        assert_eq!(pos.n_mover(), before.n_enemy());
        assert_eq!(pos.to_move(), before.to_move().opposite());
        assert_counters_consistent(&pos);
        pos.pass();
        assert_eq!(pos, before);
    }

    #[test]
    fn test_calc_moves_and_pass() {
        // 手番側（B1）は打てず、相手（A1）はC1に打てる
        let board = Board::from_masks(1 << 1, !0b11);
        let mut pos = Position::from_board(board, Color::Black);
        let (moves, code) = pos.calc_moves_and_pass();
        assert_eq!(code, PassCode::MustPass);
        assert_eq!(moves, 1 << 2);
        assert_eq!(pos.to_move(), Color::White, "パスで手番が入れ替わる");

        // 双方打てない
        let board = Board::from_masks(1, !(1 | (1 << 63)));
        let mut pos = Position::from_board(board, Color::White);
        let (moves, code) = pos.calc_moves_and_pass();
        assert_eq!(code, PassCode::GameOver);
        assert_eq!(moves, 0);
        assert_eq!(pos.to_move(), Color::Black, "終局時も1回パスした状態");
        assert!(pos.is_game_over());

        let mut pos = Position::new();
        assert_eq!(pos.calc_moves_and_pass().1, PassCode::CanMove);
        assert!(pos.is_black_move());
    }

    #[test]
    fn test_terminal_value() {
        let board = Board::from_masks(0x0000_0000_0000_00FF, 0xFF00_0000_0000_0000);
        let pos = Position::from_board(board, Color::Black);
        // 手番側8、相手側48、空き8
        assert_eq!(pos.terminal_value(), 8 - 48 - 8);
    }

    #[test]
    fn test_apply_moves() {
        let mut pos = Position::new();
        pos.apply_moves(&[sq("f5"), sq("d6"), sq("c3")]).unwrap();
        assert_eq!(pos.n_empty(), 57);
        assert_eq!(pos.to_move(), Color::White);
        assert!(pos.apply_moves(&[sq("a1")]).is_err());
    }

    #[test]
    fn test_random_playouts_make_undo() {
        // ランダム対局の各手でmake/undoが元に戻り、カウンタが一貫することを検証
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let mut pos = Position::new();
            loop {
                let (moves, code) = pos.calc_moves_and_pass();
                if code == PassCode::GameOver {
                    break;
                }
                let n = moves.count_ones() as usize;
                let choice = rng.random_range(0..n);
                let sq = pos.legal_moves().nth(choice).unwrap();

                let before = pos;
                let undo = pos.make_move(sq).unwrap();
                assert_counters_consistent(&pos);

                pos.undo_move(undo);
                assert_eq!(pos, before, "make/undoで局面が戻らない");

                pos.make_move(sq).unwrap();
            }
            assert_eq!(
                pos.terminal_value(),
                pos.board().terminal_value(),
                "差分カウンタの終局スコアが盤面と一致しない"
            );
            assert_eq!(pos.n_black() + pos.n_white() + pos.n_empty(), 64);
        }
    }
}
