//! ビットボードの対称変換
//!
//! 8x8盤面の二面体群（8要素）に対応するビット演算を提供する。
//! A1=bit 0, B1=bit 1, ..., H8=bit 63（行優先）のマッピングを前提とする。
//!
//! 対称インデックス（0-7）の各ビットは以下の変換を選択する:
//! - bit 0: 上下反転（`flip_vertical`）
//! - bit 1: 左右反転（`flip_horizontal`）
//! - bit 2: A1-H8対角線での転置（`flip_diagonal`）
//!
//! 適用順序は常に上下→左右→対角。逆変換は対角→左右→上下の順に戻す。
//! 対角転置は他の2つと可換ではないため、この順序は変更できない。

/// 対称インデックスの個数
pub const NUM_SYMMETRIES: usize = 8;

/// 上下反転を選択するビット
pub const SYM_VERTICAL: u8 = 0b001;
/// 左右反転を選択するビット
pub const SYM_HORIZONTAL: u8 = 0b010;
/// 対角転置を選択するビット
pub const SYM_DIAGONAL: u8 = 0b100;

const K1_H: u64 = 0x5555_5555_5555_5555;
const K2_H: u64 = 0x3333_3333_3333_3333;
const K4_H: u64 = 0x0F0F_0F0F_0F0F_0F0F;

const K8_V: u64 = 0x00FF_00FF_00FF_00FF;
const K16_V: u64 = 0x0000_FFFF_0000_FFFF;

const K1_D: u64 = 0x5500_5500_5500_5500;
const K2_D: u64 = 0x3333_0000_3333_0000;
const K4_D: u64 = 0x0F0F_0F0F_0000_0000;

/// 左右反転（A列とH列を入れ替える）
///
/// 4/2/1ビット単位のマスク付きシフトで各行を反転する。
///
/// # Examples
///
/// ```
/// use othmatch::transform::flip_horizontal;
///
/// // A1 -> H1
/// assert_eq!(flip_horizontal(1), 1 << 7);
/// ```
#[inline]
pub const fn flip_horizontal(mut x: u64) -> u64 {
    x = ((x >> 4) & K4_H) | ((x & K4_H) << 4);
    x = ((x >> 2) & K2_H) | ((x & K2_H) << 2);
    x = ((x >> 1) & K1_H) | ((x & K1_H) << 1);
    x
}

/// 上下反転（1行目と8行目を入れ替える）
///
/// # Examples
///
/// ```
/// use othmatch::transform::flip_vertical;
///
/// // A1 -> A8
/// assert_eq!(flip_vertical(1), 1 << 56);
/// ```
#[inline]
pub const fn flip_vertical(mut x: u64) -> u64 {
    x = (x >> 32) | (x << 32);
    x = ((x >> 16) & K16_V) | ((x & K16_V) << 16);
    x = ((x >> 8) & K8_V) | ((x & K8_V) << 8);
    x
}

/// A1-H8対角線での転置（(row, col) -> (col, row)）
///
/// 2x2内の1x1ブロック、4x4内の2x2ブロック、8x8内の4x4ブロックの
/// 3段階のブロック交換で構成される。
///
/// # Examples
///
/// ```
/// use othmatch::transform::flip_diagonal;
///
/// // B1 -> A2
/// assert_eq!(flip_diagonal(1 << 1), 1 << 8);
/// ```
#[inline]
pub const fn flip_diagonal(mut x: u64) -> u64 {
    let mut t = K1_D & (x ^ (x << 7));
    x ^= t ^ (t >> 7);
    t = K2_D & (x ^ (x << 14));
    x ^= t ^ (t >> 14);
    t = K4_D & (x ^ (x << 28));
    x ^= t ^ (t >> 28);
    x
}

/// 対称インデックス`sym`に対応する変換を適用する
///
/// 上下反転（bit 0）→左右反転（bit 1）→対角転置（bit 2）の順に適用する。
/// `sym`の上位ビットは無視される。
#[inline]
pub const fn symmetry(mut x: u64, sym: u8) -> u64 {
    if sym & SYM_VERTICAL != 0 {
        x = flip_vertical(x);
    }
    if sym & SYM_HORIZONTAL != 0 {
        x = flip_horizontal(x);
    }
    if sym & SYM_DIAGONAL != 0 {
        x = flip_diagonal(x);
    }
    x
}

/// `symmetry`の逆変換
///
/// 対角転置→左右反転→上下反転の順に戻す。
/// 任意の`x`について`inverse_symmetry(symmetry(x, sym), sym) == x`。
#[inline]
pub const fn inverse_symmetry(mut x: u64, sym: u8) -> u64 {
    if sym & SYM_DIAGONAL != 0 {
        x = flip_diagonal(x);
    }
    if sym & SYM_HORIZONTAL != 0 {
        x = flip_horizontal(x);
    }
    if sym & SYM_VERTICAL != 0 {
        x = flip_vertical(x);
    }
    x
}

/// 1マスの位置（0-63）を対称変換する
#[inline]
pub const fn symmetry_square(sq: u8, sym: u8) -> u8 {
    symmetry(1u64 << (sq as u32), sym).trailing_zeros() as u8
}

/// 1マスの位置（0-63）を逆変換する
#[inline]
pub const fn inverse_symmetry_square(sq: u8, sym: u8) -> u8 {
    inverse_symmetry(1u64 << (sq as u32), sym).trailing_zeros() as u8
}

/// `row`行目（0=1行目）の8ビットを取り出す
///
/// bit 0がA列に対応する。
#[inline]
pub const fn row(x: u64, row: u8) -> u8 {
    (x >> (row as u32 * 8)) as u8
}
