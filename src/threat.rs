/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Color, Game, Square};

use crate::{PieceValueTable, Rules};

/// Returns `true` if the piece of `color` on `square` can sit there without losing material.
///
/// Any enemy attacker worth strictly less than the piece makes it undefended outright.
/// Otherwise, attackers and defenders are weighed by [`PieceValueTable::inverse_of`],
/// and the square holds if the attackers do not outweigh the defenders.
///
/// An empty square is never defended.
pub fn is_adequately_defended(
    game: &Game,
    square: Square,
    color: Color,
    table: &PieceValueTable,
) -> bool {
    let Some(kind) = game.kind_on(square) else {
        return false;
    };
    let value = table.value_of(kind);

    let mut attacker_score = 0;
    for attacker in game.attackers(color.opponent(), square) {
        let Some(attacker) = game.kind_on(attacker) else {
            continue;
        };

        // A cheaper attacker always wins the trade
        if table.value_of(attacker) < value {
            return false;
        }

        attacker_score += table.inverse_of(attacker);
    }

    let defender_score: i32 = game
        .attackers(color, square)
        .into_iter()
        .filter_map(|defender| game.kind_on(defender))
        .map(|defender| table.inverse_of(defender))
        .sum();

    attacker_score <= defender_score
}

/// Sums the material value of every piece of `color` that is not adequately defended.
pub fn value_hanging(game: &Game, color: Color, table: &PieceValueTable) -> i32 {
    game.board()
        .into_iter()
        .filter(|(_, piece)| piece.color() == color)
        .filter(|&(square, _)| !is_adequately_defended(game, square, color, table))
        .map(|(_, piece)| table.value_of(piece.kind()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: PieceValueTable = PieceValueTable::STANDARD;

    fn defended(fen: &str, square: Square, color: Color) -> bool {
        let game: Game = fen.parse().unwrap();
        is_adequately_defended(&game, square, color, &TABLE)
    }

    #[test]
    fn test_empty_square_is_not_defended() {
        let game = Game::default();
        assert!(!is_adequately_defended(&game, Square::E4, Color::White, &TABLE));
    }

    #[test]
    fn test_unattacked_piece_is_defended() {
        // Lone knight, nobody looking at it
        assert!(defended("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1", Square::D4, Color::White));
    }

    #[test]
    fn test_cheaper_attacker_cuts_off() {
        // Black pawn on e5 hits the knight on d4, even though two white pawns defend it
        let fen = "4k3/8/8/4p3/3N4/2P1P3/8/4K3 w - - 0 1";
        assert!(!defended(fen, Square::D4, Color::White));
    }

    #[test]
    fn test_weighted_exchange() {
        // Rook on d4 attacked by a black rook (weight 2), defended by a white rook (weight 2)
        let fen = "3rk3/8/8/8/3R4/8/8/3RK3 w - - 0 1";
        assert!(defended(fen, Square::D4, Color::White));

        // Same, but the defender is gone
        let fen = "3rk3/8/8/8/3R4/8/8/4K3 w - - 0 1";
        assert!(!defended(fen, Square::D4, Color::White));

        // Two queen attackers (1 + 1) against one rook-weighted defender (2) still holds
        let fen = "3qk3/8/8/8/3R3q/8/8/3RK3 w - - 0 1";
        assert!(defended(fen, Square::D4, Color::White));
    }

    #[test]
    fn test_king_attacker_is_always_cheaper() {
        // The King is worth nothing, so it undercuts every piece it touches
        let fen = "8/8/8/4k3/3P4/2P5/8/4K3 w - - 0 1";
        assert!(!defended(fen, Square::D4, Color::White));
    }

    #[test]
    fn test_value_hanging() {
        // Knight on d4 attacked by a pawn; the a5 rook hits the e5 pawn, which nothing defends
        let fen = "4k3/8/8/R3p3/3N4/8/8/4K3 w - - 0 1";
        let game: Game = fen.parse().unwrap();
        assert_eq!(value_hanging(&game, Color::White, &TABLE), 3);
        assert_eq!(value_hanging(&game, Color::Black, &TABLE), 1);
    }

    #[test]
    fn test_value_hanging_grows_when_a_defender_leaves() {
        // Rook on d4 defended by the d1 rook; remove the defender and it hangs
        let defended: Game = "3rk3/8/8/8/3R4/8/8/3RK3 w - - 0 1".parse().unwrap();
        let undefended: Game = "3rk3/8/8/8/3R4/8/8/4K3 w - - 0 1".parse().unwrap();

        let before = value_hanging(&defended, Color::White, &TABLE);
        let after = value_hanging(&undefended, Color::White, &TABLE);
        assert!(after >= before);
        assert_eq!(after, 10);
    }

    #[test]
    fn test_startpos_has_nothing_hanging() {
        let game = Game::default();
        assert_eq!(value_hanging(&game, Color::White, &TABLE), 0);
        assert_eq!(value_hanging(&game, Color::Black, &TABLE), 0);
    }
}
