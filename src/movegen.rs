//! 合法手生成
//!
//! 8方向のフラッドフィルで合法手のビットマスクを一括計算する。
//! 東西方向の成分を持つシフトでは列の回り込みを端列マスクで防ぐ。

/// A列を除くマスク（東向きシフト後に適用）
pub const NOT_A_FILE: u64 = 0xFEFE_FEFE_FEFE_FEFE;

/// H列を除くマスク（西向きシフト後に適用）
pub const NOT_H_FILE: u64 = 0x7F7F_7F7F_7F7F_7F7F;

/// 方向ごとのシフト量とシフト後マスク
///
/// 正のシフトは左シフト（インデックス増加）、負は右シフト。
const DIRECTIONS: [(i32, u64); 8] = [
    (1, NOT_A_FILE),  // 東
    (-1, NOT_H_FILE), // 西
    (8, u64::MAX),    // 北（行+1）
    (-8, u64::MAX),   // 南
    (9, NOT_A_FILE),  // 北東
    (7, NOT_H_FILE),  // 北西
    (-7, NOT_A_FILE), // 南東
    (-9, NOT_H_FILE), // 南西
];

/// 行・列の増分（`calc_flips`で使用）
const LINE_STEPS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

#[inline(always)]
const fn shift(x: u64, amount: i32) -> u64 {
    if amount > 0 {
        x << amount
    } else {
        x >> -amount
    }
}

/// 合法手のビットマスクを計算
///
/// # Arguments
///
/// * `mover` - 手番側の石
/// * `empty` - 空きマス
///
/// # Returns
///
/// 合法手のビットマスク。合法手がなければ0。
///
/// # Examples
///
/// ```
/// use othmatch::board::Board;
/// use othmatch::movegen::calc_moves;
///
/// let board = Board::new();
/// assert_eq!(calc_moves(board.mover(), board.empty()).count_ones(), 4);
/// ```
#[inline]
pub fn calc_moves(mover: u64, empty: u64) -> u64 {
    let enemy = !(mover | empty);
    let mut moves = 0u64;

    for &(amount, mask) in &DIRECTIONS {
        // 隣接する相手石から開始
        let mut frontier = shift(mover, amount) & mask & enemy;
        // 挟める相手石は最大6個
        for _ in 0..6 {
            frontier = shift(frontier, amount) & mask;
            moves |= frontier & empty;
            frontier &= enemy;
        }
    }

    moves
}

/// `sq`に着手したときに返る石のビットマスクを計算
///
/// 8方向それぞれについて、相手石が続く間だけ進み、その先が自石で
/// 終わる場合に限りその方向の相手石を返す。
/// `sq`が空きマスかどうかは呼び出し側で確認すること。
pub fn calc_flips(mover: u64, enemy: u64, sq: u8) -> u64 {
    let row = (sq >> 3) as i8;
    let col = (sq & 7) as i8;
    let mut flips = 0u64;

    for &(dr, dc) in &LINE_STEPS {
        let mut r = row + dr;
        let mut c = col + dc;
        let mut line = 0u64;

        while (0..8).contains(&r) && (0..8).contains(&c) {
            let bit = 1u64 << (r * 8 + c);
            if enemy & bit != 0 {
                line |= bit;
            } else {
                if mover & bit != 0 {
                    flips |= line;
                }
                break;
            }
            r += dr;
            c += dc;
        }
    }

    flips
}
