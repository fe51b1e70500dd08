/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Color, Game, PieceKind};

/// Returns `true` if `color` would rather take a stalemate than play on.
///
/// With no Queen, Rook, or Pawn left there is no realistic way to deliver mate,
/// so a draw is the best that side can hope for.
/// Mates with two Bishops or Bishop + Knight exist, but are deliberately not considered.
pub fn wants_stalemate(game: &Game, color: Color) -> bool {
    !game
        .board()
        .into_iter()
        .filter(|(_, piece)| piece.color() == color)
        .any(|(_, piece)| {
            matches!(
                piece.kind(),
                PieceKind::Queen | PieceKind::Rook | PieceKind::Pawn
            )
        })
}
