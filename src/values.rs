/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::PieceKind;

/// Per-kind weights consulted by every part of the evaluator.
///
/// Two numbers are stored for each [`PieceKind`]:
///
/// * `material`: what the piece is worth when it is won or lost.
/// * `inverse`: how threatening the piece is when it attacks or defends a square.
///   Cheap pieces are scarier to commit into an exchange, so this runs opposite to `material`.
///
/// Arrays are indexed Pawn, Knight, Bishop, Rook, Queen, King.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceValueTable {
    /// Material value of each piece kind.
    pub material: [i32; 6],

    /// Weight of each piece kind when counting attackers and defenders of a square.
    pub inverse: [i32; 6],
}

impl PieceValueTable {
    /// The weights the engine plays with.
    ///
    /// The King is worth `0`: it is never captured, so it must never show up in a trade.
    pub const STANDARD: Self = Self {
        material: [1, 3, 3, 10, 15, 0],
        inverse: [9, 4, 4, 2, 1, 0],
    };

    /// Material value of `kind`.
    #[inline(always)]
    pub const fn value_of(&self, kind: PieceKind) -> i32 {
        self.material[slot(kind)]
    }

    /// Attacker/defender weight of `kind`.
    #[inline(always)]
    pub const fn inverse_of(&self, kind: PieceKind) -> i32 {
        self.inverse[slot(kind)]
    }
}

impl Default for PieceValueTable {
    #[inline(always)]
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Index of `kind` in the table's arrays.
#[inline(always)]
const fn slot(kind: PieceKind) -> usize {
    match kind {
        PieceKind::Pawn => 0,
        PieceKind::Knight => 1,
        PieceKind::Bishop => 2,
        PieceKind::Rook => 3,
        PieceKind::Queen => 4,
        PieceKind::King => 5,
    }
}
