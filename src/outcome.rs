/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, Game, PieceKind};

use crate::Rules;

/// Number of times a position must occur before the game is drawn by repetition.
pub const REPETITION_LIMIT: usize = 5;

/// Halfmove clock at which the game is drawn without a capture or pawn move.
pub const HALFMOVE_LIMIT: usize = 150;

/// How many of each piece kind a side starts the game with.
const STARTING_SET: [u8; PieceKind::COUNT] = [8, 2, 2, 2, 1, 1];

/// The ways a game can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// The side-to-move is checkmated.
    Checkmate { winner: Color },

    /// The side-to-move has no legal moves but is not in check.
    Stalemate,

    /// Neither side has enough material left to deliver mate.
    InsufficientMaterial,

    /// 75 full moves have passed without a capture or pawn move.
    SeventyFiveMoves,

    /// The same position has occurred five times.
    FivefoldRepetition,
}

impl GameOutcome {
    /// Classifies `game`, returning `None` if it is still in progress.
    ///
    /// `history` holds the [`repetition_key`] of every position reached so far, the current one included.
    pub fn of(game: &Game, history: &[String]) -> Option<Self> {
        if game.is_checkmate() {
            return Some(Self::Checkmate {
                winner: game.side_to_move().opponent(),
            });
        }

        if game.is_stalemate() {
            return Some(Self::Stalemate);
        }

        if is_insufficient_material(game) {
            return Some(Self::InsufficientMaterial);
        }

        if game.halfmove() >= HALFMOVE_LIMIT {
            return Some(Self::SeventyFiveMoves);
        }

        let key = repetition_key(game);
        if history.iter().filter(|seen| **seen == key).count() >= REPETITION_LIMIT {
            return Some(Self::FivefoldRepetition);
        }

        None
    }

    /// The winning side, if the game was not drawn.
    #[inline(always)]
    pub const fn winner(&self) -> Option<Color> {
        match self {
            Self::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }

    /// Returns `true` if the game ended without a winner.
    #[inline(always)]
    pub const fn is_draw(&self) -> bool {
        self.winner().is_none()
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkmate { winner } => write!(f, "{} wins by checkmate", winner.name()),
            Self::Stalemate => write!(f, "draw by stalemate"),
            Self::InsufficientMaterial => write!(f, "draw by insufficient material"),
            Self::SeventyFiveMoves => write!(f, "draw by the seventy-five move rule"),
            Self::FivefoldRepetition => write!(f, "draw by fivefold repetition"),
        }
    }
}

/// The part of a FEN that identifies a position for repetition: placement, side to move,
/// castling rights and en passant square. The move clocks are left out.
pub fn repetition_key(game: &Game) -> String {
    game.to_fen()
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Each side has a lone King, or a King and a single minor piece.
///
/// This is a material count only. Square colours are ignored, so King and Bishop against
/// King and Bishop is a draw even with opposite-coloured Bishops, where mate can still be
/// helped along. Positions with two or more minor pieces on a side are never called drawn,
/// including two Knights or same-coloured Bishops that cannot force mate.
fn is_insufficient_material(game: &Game) -> bool {
    let board = game.board();

    Color::all().into_iter().all(|color| {
        let ours = board.color(color);
        let count = |kind: PieceKind| (board.kind(kind) & ours).population();

        let heavy = count(PieceKind::Pawn) + count(PieceKind::Rook) + count(PieceKind::Queen);
        let minors = count(PieceKind::Knight) + count(PieceKind::Bishop);

        heavy == 0 && minors <= 1
    })
}

/// Pieces each side has lost, relative to the standard starting set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapturedPieces([[u8; PieceKind::COUNT]; Color::COUNT]);

impl CapturedPieces {
    /// How many pieces of `kind` that `color` has lost.
    #[inline(always)]
    pub fn get(&self, color: Color, kind: PieceKind) -> u8 {
        self.0[color.index()][kind.index()]
    }

    /// Total number of pieces `color` has lost.
    #[inline(always)]
    pub fn total(&self, color: Color) -> u32 {
        self.0[color.index()].iter().map(|&n| n as u32).sum()
    }
}

/// Counts the pieces missing from each side of `game`.
///
/// Promoted pieces offset the count of their kind but never make it negative,
/// so a side with two Queens has simply lost no Queen.
pub fn captured(game: &Game) -> CapturedPieces {
    let board = game.board();
    let mut missing = CapturedPieces::default();

    for color in Color::all() {
        for kind in PieceKind::all() {
            let present = (board.kind(kind) & board.color(color)).population();
            missing.0[color.index()][kind.index()] =
                STARTING_SET[kind.index()].saturating_sub(present);
        }
    }

    missing
}

impl fmt::Display for CapturedPieces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in Color::all() {
            write!(f, "{:<5}:", color.name())?;
            for kind in PieceKind::all() {
                let n = self.get(color, kind);
                if n > 0 {
                    write!(f, " {n}x{kind:?}")?;
                }
            }
            if color.is_white() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(fen: &str) -> Option<GameOutcome> {
        let game: Game = fen.parse().unwrap();
        let history = vec![repetition_key(&game)];
        GameOutcome::of(&game, &history)
    }

    #[test]
    fn test_in_progress() {
        assert_eq!(GameOutcome::of(&Game::default(), &[]), None);
    }

    #[test]
    fn test_fools_mate() {
        let result = outcome("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(
            result,
            Some(GameOutcome::Checkmate {
                winner: Color::Black
            })
        );
        assert_eq!(result.unwrap().winner(), Some(Color::Black));
        assert!(!result.unwrap().is_draw());
    }

    #[test]
    fn test_stalemate() {
        let result = outcome("k7/8/KQ6/8/8/8/8/8 b - - 0 1");
        assert_eq!(result, Some(GameOutcome::Stalemate));
        assert_eq!(result.unwrap().to_string(), "draw by stalemate");
    }

    #[test]
    fn test_insufficient_material() {
        assert_eq!(
            outcome("k7/8/8/8/8/8/8/7K w - - 0 1"),
            Some(GameOutcome::InsufficientMaterial)
        );
        assert_eq!(
            outcome("kn6/8/8/8/8/8/8/5B1K w - - 0 1"),
            Some(GameOutcome::InsufficientMaterial)
        );

        // Bishop against Bishop counts as drawn whatever the square colours
        assert_eq!(
            outcome("kb6/8/8/8/8/8/8/5B1K w - - 0 1"),
            Some(GameOutcome::InsufficientMaterial)
        );

        // Two minor pieces, or any Pawn, is enough to play on
        assert_eq!(outcome("k7/8/8/8/8/8/8/4BB1K w - - 0 1"), None);
        assert_eq!(outcome("k7/8/8/8/8/8/P7/7K w - - 0 1"), None);
    }

    #[test]
    fn test_seventy_five_moves() {
        assert_eq!(
            outcome("k7/8/8/8/8/8/8/R6K w - - 150 120"),
            Some(GameOutcome::SeventyFiveMoves)
        );
        assert_eq!(outcome("k7/8/8/8/8/8/8/R6K w - - 149 120"), None);
    }

    #[test]
    fn test_fivefold_repetition() {
        let game = Game::default();
        let key = repetition_key(&game);

        let history = vec![key.clone(); REPETITION_LIMIT - 1];
        assert_eq!(GameOutcome::of(&game, &history), None);

        let history = vec![key; REPETITION_LIMIT];
        assert_eq!(
            GameOutcome::of(&game, &history),
            Some(GameOutcome::FivefoldRepetition)
        );
    }

    #[test]
    fn test_repetition_key_ignores_clocks() {
        let a: Game = "k7/8/8/8/8/8/8/R6K w - - 0 1".parse().unwrap();
        let b: Game = "k7/8/8/8/8/8/8/R6K w - - 12 40".parse().unwrap();
        assert_eq!(repetition_key(&a), repetition_key(&b));
        assert_eq!(repetition_key(&a), "k7/8/8/8/8/8/8/R6K w - -");
    }

    #[test]
    fn test_captured() {
        assert_eq!(captured(&Game::default()), CapturedPieces::default());

        // White lost a Pawn and a Knight, Black lost a Bishop
        let game: Game = "rn1qkbnr/pppppppp/8/8/8/8/1PPPPPPP/R1BQKBNR w KQkq - 0 1"
            .parse()
            .unwrap();
        let missing = captured(&game);
        assert_eq!(missing.get(Color::White, PieceKind::Pawn), 1);
        assert_eq!(missing.get(Color::White, PieceKind::Knight), 1);
        assert_eq!(missing.get(Color::Black, PieceKind::Bishop), 1);
        assert_eq!(missing.total(Color::White), 2);
        assert_eq!(missing.total(Color::Black), 1);
    }

    #[test]
    fn test_captured_never_negative() {
        // White promoted twice: 3 Queens, 6 Pawns
        let game: Game = "4k3/8/8/8/8/8/PPPPPP2/QQQ1K3 w - - 0 1".parse().unwrap();
        let missing = captured(&game);
        assert_eq!(missing.get(Color::White, PieceKind::Queen), 0);
        assert_eq!(missing.get(Color::White, PieceKind::Pawn), 2);
        assert_eq!(missing.get(Color::White, PieceKind::King), 0);
    }
}
