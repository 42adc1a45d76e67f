//! Board盤面表現とColor型定義
//!
//! 盤面は「手番側の石」と「空きマス」の2つのu64で表現する。
//! 色は盤面の外で管理し、`mover`は常に手番側を指す。

use std::cmp::Ordering;
use std::fmt;

use crate::movegen::calc_moves;
use crate::transform::{NUM_SYMMETRIES, flip_diagonal, flip_horizontal, flip_vertical, symmetry};

/// 石の色を表す列挙型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    /// 黒石
    Black = 0,
    /// 白石
    White = 1,
}

impl Color {
    /// 反対の色を返す
    ///
    /// # Examples
    ///
    /// ```
    /// use othmatch::board::Color;
    ///
    /// assert_eq!(Color::Black.opposite(), Color::White);
    /// assert_eq!(Color::White.opposite(), Color::Black);
    /// ```
    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// パス判定コード
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PassCode {
    /// 手番側に合法手がある
    CanMove = 0,
    /// 手番側はパスだが相手には合法手がある
    MustPass = 1,
    /// 双方とも合法手がない（終局）
    GameOver = 2,
}

/// 双方の合法手数とパス判定
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mobility {
    /// 手番側の合法手数
    pub mover: u32,
    /// 相手側の合法手数
    pub enemy: u32,
    /// パス判定コード
    pub pass_code: PassCode,
}

/// 初期配置の黒石: E4, D5
const START_BLACK: u64 = (1u64 << 28) | (1u64 << 35);
/// 初期配置の白石: D4, E5
const START_WHITE: u64 = (1u64 << 27) | (1u64 << 36);

/// オセロ盤面を表すBoard構造体
///
/// A1=bit 0, B1=bit 1, ..., H8=bit 63のマッピング。
/// 不変条件: `mover & empty == 0`（墓標`Board::impossible()`を除く）。
/// 相手の石は`!(mover | empty)`。
///
/// 等価性はフィールドの完全一致であり、対称変換による正規化は自動では行わない。
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    mover: u64,
    empty: u64,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("mover", &format_args!("{:#018x}", self.mover))
            .field("empty", &format_args!("{:#018x}", self.empty))
            .finish()
    }
}

impl Board {
    /// 初期盤面を生成（黒番）
    ///
    /// # Examples
    ///
    /// ```
    /// use othmatch::board::Board;
    ///
    /// let board = Board::new();
    /// assert_eq!(board.mover().count_ones(), 2);
    /// assert_eq!(board.empty().count_ones(), 60);
    /// ```
    pub fn new() -> Self {
        Self {
            mover: START_BLACK,
            empty: !(START_BLACK | START_WHITE),
        }
    }

    /// 手番側の石と空きマスから盤面を生成
    ///
    /// # Panics
    ///
    /// `mover`と`empty`が重なる場合
    pub fn from_masks(mover: u64, empty: u64) -> Self {
        assert_eq!(
            mover & empty,
            0,
            "mover and empty overlap: {:#018x} & {:#018x}",
            mover,
            empty
        );
        Self { mover, empty }
    }

    /// 黒石・白石・手番から盤面を生成
    ///
    /// # Panics
    ///
    /// `black`と`white`が重なる場合
    pub fn from_colors(black: u64, white: u64, to_move: Color) -> Self {
        assert_eq!(black & white, 0, "black and white overlap");
        let mover = match to_move {
            Color::Black => black,
            Color::White => white,
        };
        Self {
            mover,
            empty: !(black | white),
        }
    }

    /// 到達不可能な盤面を表す墓標
    pub const fn impossible() -> Self {
        Self {
            mover: u64::MAX,
            empty: u64::MAX,
        }
    }

    /// 墓標かどうか
    #[inline]
    pub fn is_impossible(&self) -> bool {
        self.mover & self.empty != 0
    }

    /// 手番側の石
    #[inline]
    pub fn mover(&self) -> u64 {
        self.mover
    }

    /// 空きマス
    #[inline]
    pub fn empty(&self) -> u64 {
        self.empty
    }

    /// 相手側の石
    #[inline]
    pub fn enemy(&self) -> u64 {
        !(self.mover | self.empty)
    }

    /// 空きマス数
    #[inline]
    pub fn n_empty(&self) -> u32 {
        self.empty.count_ones()
    }

    /// 着手を実行
    ///
    /// `placed`は置く石（1ビット）、`flips`は返る石。
    /// 実行後は手番が入れ替わる。
    ///
    /// # Panics
    ///
    /// `placed`が空きマスでない場合
    #[inline]
    pub fn make_move(&mut self, placed: u64, flips: u64) {
        assert!(
            placed & !self.empty == 0,
            "placed square is not empty: {:#018x}",
            placed
        );
        self.mover ^= flips;
        self.mover ^= !self.empty;
        self.empty ^= placed;
    }

    /// `make_move`を取り消す（同じ引数で呼ぶこと）
    #[inline]
    pub fn undo_move(&mut self, placed: u64, flips: u64) {
        self.empty ^= placed;
        self.mover ^= !self.empty;
        self.mover ^= flips;
    }

    /// パス（手番の入れ替え）
    #[inline]
    pub fn pass(&mut self) {
        self.mover = self.enemy();
    }

    /// 手番側の合法手
    #[inline]
    pub fn calc_moves(&self) -> u64 {
        calc_moves(self.mover, self.empty)
    }

    /// 相手側の合法手
    #[inline]
    pub fn calc_enemy_moves(&self) -> u64 {
        calc_moves(self.enemy(), self.empty)
    }

    /// 双方の合法手数とパス判定コードを計算
    ///
    /// # Examples
    ///
    /// ```
    /// use othmatch::board::{Board, PassCode};
    ///
    /// let mobility = Board::new().calc_mobility();
    /// assert_eq!(mobility.mover, 4);
    /// assert_eq!(mobility.pass_code, PassCode::CanMove);
    /// ```
    pub fn calc_mobility(&self) -> Mobility {
        let mover = self.calc_moves().count_ones();
        let enemy = self.calc_enemy_moves().count_ones();
        let pass_code = if mover != 0 {
            PassCode::CanMove
        } else if enemy != 0 {
            PassCode::MustPass
        } else {
            PassCode::GameOver
        };
        Mobility {
            mover,
            enemy,
            pass_code,
        }
    }

    /// 対称インデックス`sym`の像
    #[inline]
    pub fn symmetry(&self, sym: u8) -> Self {
        Self {
            mover: symmetry(self.mover, sym),
            empty: symmetry(self.empty, sym),
        }
    }

    /// 8つの対称像（`reflections()[i] == self.symmetry(i)`）
    ///
    /// 独立に8回変換せず、直前の像を再反転して順に生成する。
    pub fn reflections(&self) -> [Board; NUM_SYMMETRIES] {
        let mut out = [*self; NUM_SYMMETRIES];
        out[1] = out[0].map(flip_vertical);
        out[2] = out[0].map(flip_horizontal);
        out[3] = out[1].map(flip_horizontal);
        for i in 0..4 {
            out[i + 4] = out[i].map(flip_diagonal);
        }
        out
    }

    /// 最小の対称像（正規化キー）
    ///
    /// # Examples
    ///
    /// ```
    /// use othmatch::board::Board;
    ///
    /// let board = Board::new();
    /// for sym in 0..8 {
    ///     assert_eq!(board.symmetry(sym).minimal_reflection(), board.minimal_reflection());
    /// }
    /// ```
    pub fn minimal_reflection(&self) -> MinimalReflection {
        let reflections = self.reflections();
        let mut min = reflections[0];
        for r in &reflections[1..] {
            if *r < min {
                min = *r;
            }
        }
        MinimalReflection(min)
    }

    /// 終局スコア（手番側視点の石差）
    ///
    /// 空きマスはすべて勝っている側に加算する。
    pub fn terminal_value(&self) -> i32 {
        terminal_value(
            self.mover.count_ones() as i32,
            self.enemy().count_ones() as i32,
            self.n_empty() as i32,
        )
    }

    /// 4ワードのJenkins型ミキシングによるハッシュ値
    ///
    /// `mover`と`empty`の上位・下位32ビットを混合する。
    pub fn hash_code(&self) -> u64 {
        let mut a = self.mover as u32;
        let mut b = (self.mover >> 32) as u32;
        let mut c = self.empty as u32;
        let d = (self.empty >> 32) as u32;

        a = a.wrapping_add(0xDEAD_BEEF);
        b = b.wrapping_add(0xDEAD_BEEF);
        c = c.wrapping_add(0xDEAD_BEEF) ^ d.rotate_left(16);

        c ^= b;
        c = c.wrapping_sub(b.rotate_left(14));
        a ^= c;
        a = a.wrapping_sub(c.rotate_left(11));
        b ^= a;
        b = b.wrapping_sub(a.rotate_left(25));
        c ^= b;
        c = c.wrapping_sub(b.rotate_left(16));
        a ^= c;
        a = a.wrapping_sub(c.rotate_left(4));
        b ^= a;
        b = b.wrapping_sub(a.rotate_left(14));
        c ^= b;
        c = c.wrapping_sub(b.rotate_left(24));

        ((b as u64) << 32) | (c as u64 ^ d as u64)
    }

    #[inline]
    fn map(&self, f: fn(u64) -> u64) -> Self {
        Self {
            mover: f(self.mover),
            empty: f(self.empty),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// `mover`、`empty`の順にu64（符号なし）で比較する全順序
impl Ord for Board {
    fn cmp(&self, other: &Self) -> Ordering {
        self.mover
            .cmp(&other.mover)
            .then_with(|| self.empty.cmp(&other.empty))
    }
}

impl PartialOrd for Board {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 盤面表示（`*`: 手番側、`O`: 相手側、`.`: 空き）
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  A B C D E F G H")?;
        for row in 0..8 {
            write!(f, "{}", row + 1)?;
            for col in 0..8 {
                let bit = 1u64 << (row * 8 + col);
                let c = if self.mover & bit != 0 {
                    '*'
                } else if self.empty & bit != 0 {
                    '.'
                } else {
                    'O'
                };
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// 石数から終局スコアを計算（空きマスは勝者に加算）
pub(crate) fn terminal_value(n_mover: i32, n_enemy: i32, n_empty: i32) -> i32 {
    match n_mover.cmp(&n_enemy) {
        Ordering::Greater => n_mover - n_enemy + n_empty,
        Ordering::Less => n_mover - n_enemy - n_empty,
        Ordering::Equal => 0,
    }
}

/// 8つの対称像のうち最小のものであることが保証された盤面
///
/// `Board::minimal_reflection()`からのみ生成される。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MinimalReflection(Board);

impl MinimalReflection {
    /// 正規化された盤面
    #[inline]
    pub fn board(&self) -> &Board {
        &self.0
    }

    /// 盤面に戻す
    #[inline]
    pub fn into_board(self) -> Board {
        self.0
    }
}

impl From<MinimalReflection> for Board {
    fn from(m: MinimalReflection) -> Self {
        m.0
    }
}
