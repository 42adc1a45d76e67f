//! 合法手の列挙カーソル
//!
//! 1つの盤面に対して計算した合法手マスクを、探索順序ヒューリスティクスに
//! 従って1手ずつ取り出す。取り出した手はマスクから取り除かれる。

use crate::board::Board;
use crate::square::Square;

/// 四隅（A1, H1, A8, H8）
pub const CORNER_MASK: u64 = 0x8100_0000_0000_0081;

/// 内側6x6からXマス（B2, G2, B7, G7）を除いた安全なマス
pub const REGULAR_MASK: u64 = 0x003C_7E7E_7E7E_3C00;

/// 合法手カーソル
///
/// 列挙順:
/// 1. 指定された最善手（あれば1回だけ）
/// 2. 四隅
/// 3. `REGULAR_MASK`のマス
/// 4. 残り（辺、Cマス、Xマス）
///
/// 各段の中ではインデックスの小さいマスから返す。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveSet {
    remaining: u64,
    best: Option<Square>,
}

impl MoveSet {
    /// 盤面の合法手から生成
    pub fn new(board: &Board) -> Self {
        Self::from_mask(board.calc_moves())
    }

    /// 最善手を先頭にして生成
    ///
    /// `best`が合法手に含まれない場合は無視する。
    pub fn with_best(board: &Board, best: Square) -> Self {
        let mut set = Self::new(board);
        set.set_best(best);
        set
    }

    /// 任意のマスクから生成
    pub fn from_mask(mask: u64) -> Self {
        Self {
            remaining: mask,
            best: None,
        }
    }

    /// 最善手を設定（合法手に含まれる場合のみ）
    pub fn set_best(&mut self, best: Square) {
        if self.remaining & best.bit() != 0 {
            self.best = Some(best);
        }
    }

    /// 残りの手のマスク
    #[inline]
    pub fn mask(&self) -> u64 {
        self.remaining
    }

    /// 残りの手数
    #[inline]
    pub fn len(&self) -> usize {
        self.remaining.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    #[inline]
    pub fn contains(&self, sq: Square) -> bool {
        self.remaining & sq.bit() != 0
    }

    /// 指定した手を取り除く
    ///
    /// 取り除いた手が未使用の最善手だった場合、最善手の指定も解除する。
    pub fn delete(&mut self, sq: Square) {
        self.remaining &= !sq.bit();
        if self.best == Some(sq) {
            self.best = None;
        }
    }
}

impl Iterator for MoveSet {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        if let Some(best) = self.best.take() {
            self.remaining &= !best.bit();
            return Some(best);
        }

        let tier = if self.remaining & CORNER_MASK != 0 {
            self.remaining & CORNER_MASK
        } else if self.remaining & REGULAR_MASK != 0 {
            self.remaining & REGULAR_MASK
        } else {
            self.remaining
        };

        let sq = Square::lowest(tier)?;
        self.remaining &= !sq.bit();
        Some(sq)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len();
        (n, Some(n))
    }
}

impl ExactSizeIterator for MoveSet {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_name(name).unwrap()
    }

    fn mask(names: &[&str]) -> u64 {
        names.iter().fold(0, |m, n| m | sq(n).bit())
    }

    #[test]
    fn test_regular_mask() {
        // 内側6x6は36マス、Xマス4つを除いて32マス
        assert_eq!(REGULAR_MASK.count_ones(), 32);
        for x in ["b2", "g2", "b7", "g7"] {
            assert_eq!(REGULAR_MASK & sq(x).bit(), 0, "{}はXマス", x);
        }
        assert_eq!(REGULAR_MASK & CORNER_MASK, 0);
        assert_ne!(REGULAR_MASK & sq("c3").bit(), 0);
    }

    #[test]
    fn test_initial_moves() {
        let moves: Vec<String> = MoveSet::new(&Board::new()).map(|s| s.to_string()).collect();
        assert_eq!(moves, vec!["d3", "c4", "f5", "e6"]);
    }

    #[test]
    fn test_tier_order() {
        // 辺(b1), Xマス(b2), 隅(h8), 内側(d6), 隅(a1)
        let set = MoveSet::from_mask(mask(&["b1", "b2", "h8", "d6", "a1"]));
        let order: Vec<String> = set.map(|s| s.to_string()).collect();
        assert_eq!(order, vec!["a1", "h8", "d6", "b1", "b2"]);
    }

    #[test]
    fn test_best_move_first() {
        let board = Board::new();
        let mut set = MoveSet::with_best(&board, sq("e6"));
        assert_eq!(set.len(), 4);
        assert_eq!(set.next(), Some(sq("e6")));
        let rest: Vec<Square> = set.collect();
        assert_eq!(rest, vec![sq("d3"), sq("c4"), sq("f5")], "最善手は2度返さない");
    }

    #[test]
    fn test_best_move_not_legal_is_ignored() {
        let set = MoveSet::with_best(&Board::new(), sq("a1"));
        assert_eq!(set.count(), 4);
    }

    #[test]
    fn test_delete() {
        let mut set = MoveSet::new(&Board::new());
        set.delete(sq("c4"));
        assert!(!set.contains(sq("c4")));
        assert_eq!(set.len(), 3);

        let mut set = MoveSet::with_best(&Board::new(), sq("f5"));
        set.delete(sq("f5"));
        assert_eq!(set.next(), Some(sq("d3")), "削除された最善手は返さない");
    }

    #[test]
    fn test_empty() {
        let mut set = MoveSet::from_mask(0);
        assert!(set.is_empty());
        assert_eq!(set.next(), None);
    }
}
