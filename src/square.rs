//! マス座標と着手の型定義

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// マス座標のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    /// インデックスが範囲外（0-63以外）
    #[error("Square index out of range: {0}")]
    OutOfRange(i32),

    /// 座標名の形式が不正（"a1"-"h8"以外）
    #[error("Invalid square name: {0:?}")]
    InvalidName(String),
}

/// 盤面上の1マス（0-63）
///
/// A1=0, B1=1, ..., H1=7, A2=8, ..., H8=63（行優先）。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    /// インデックスからマスを生成
    ///
    /// # Examples
    ///
    /// ```
    /// use othmatch::square::Square;
    ///
    /// assert_eq!(Square::new(19).unwrap().to_string(), "d3");
    /// assert!(Square::new(64).is_err());
    /// ```
    pub fn new(index: u8) -> Result<Self, SquareError> {
        if index < 64 {
            Ok(Self(index))
        } else {
            Err(SquareError::OutOfRange(index as i32))
        }
    }

    /// 行・列（共に0-7）からマスを生成
    pub fn from_row_col(row: u8, col: u8) -> Result<Self, SquareError> {
        if row < 8 && col < 8 {
            Ok(Self(row * 8 + col))
        } else {
            Err(SquareError::OutOfRange(row as i32 * 8 + col as i32))
        }
    }

    /// 座標名（"a1"-"h8"、大文字も可）からマスを生成
    pub fn from_name(name: &str) -> Result<Self, SquareError> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return Err(SquareError::InvalidName(name.to_string()));
        }
        let col = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let row = bytes[1].wrapping_sub(b'1');
        Self::from_row_col(row, col).map_err(|_| SquareError::InvalidName(name.to_string()))
    }

    /// インデックス（0-63）
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// 行（0=1行目）
    #[inline]
    pub const fn row(self) -> u8 {
        self.0 >> 3
    }

    /// 列（0=A列）
    #[inline]
    pub const fn col(self) -> u8 {
        self.0 & 7
    }

    /// このマスだけが立ったビットマスク
    #[inline]
    pub const fn bit(self) -> u64 {
        1u64 << (self.0 as u32)
    }

    /// ビットマスクの最下位ビットのマス（空ならNone）
    #[inline]
    pub fn lowest(mask: u64) -> Option<Self> {
        if mask == 0 {
            None
        } else {
            Some(Self(mask.trailing_zeros() as u8))
        }
    }

    /// 対称変換後のマス
    #[inline]
    pub const fn symmetry(self, sym: u8) -> Self {
        Self(crate::transform::symmetry_square(self.0, sym))
    }

    /// 対称変換の逆変換後のマス
    #[inline]
    pub const fn inverse_symmetry(self, sym: u8) -> Self {
        Self(crate::transform::inverse_symmetry_square(self.0, sym))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col()) as char, self.row() + 1)
    }
}

/// 座標名（"d3"など）として直列化する
impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl TryFrom<u8> for Square {
    type Error = SquareError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index)
    }
}

/// パスを表す棋譜コード
pub const PASS_CODE: i8 = -1;

/// 着手なし（未設定、または棋譜の終端）を表す棋譜コード
pub const NO_MOVE_CODE: i8 = -2;

/// 1手（着手またはパス）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    /// マスへの着手
    Play(Square),
    /// パス
    Pass,
}

impl Move {
    /// 棋譜コードから変換
    ///
    /// 0-63は着手、-1はパス。それ以外（-2を含む）はNoneを返す。
    ///
    /// # Examples
    ///
    /// ```
    /// use othmatch::square::{Move, NO_MOVE_CODE, PASS_CODE};
    ///
    /// assert_eq!(Move::from_code(PASS_CODE), Some(Move::Pass));
    /// assert_eq!(Move::from_code(NO_MOVE_CODE), None);
    /// ```
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            PASS_CODE => Some(Move::Pass),
            0..=63 => Some(Move::Play(Square(code as u8))),
            _ => None,
        }
    }

    /// 棋譜コードへ変換
    pub fn code(self) -> i8 {
        match self {
            Move::Play(sq) => sq.index() as i8,
            Move::Pass => PASS_CODE,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Play(sq) => write!(f, "{}", sq),
            Move::Pass => f.write_str("pass"),
        }
    }
}
