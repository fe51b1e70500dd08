/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::{anyhow, bail, Result};
use chessie::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks, Bitboard, Color,
    Game, Move, PieceKind, Square,
};

/// The handful of rules queries the evaluator needs on top of what [`Game`] already offers.
///
/// Everything here is derived from the board itself, so the answers do not depend on how
/// the move generator chooses to encode castling or en passant internally.
pub trait Rules {
    /// Returns `true` if the side-to-move is checkmated.
    fn is_checkmate(&self) -> bool;

    /// Returns `true` if the side-to-move has no legal moves but is not in check.
    fn is_stalemate(&self) -> bool;

    /// All squares holding a piece of `color` that attacks `square`.
    ///
    /// Pinned pieces still count as attackers. X-rays and en passant do not.
    fn attackers(&self, color: Color, square: Square) -> Bitboard;

    /// The kind of the piece on `square`, if there is one.
    fn kind_on(&self, square: Square) -> Option<PieceKind>;

    /// Returns `true` if `mv` captures a piece, including en passant.
    fn is_capture(&self, mv: Move) -> bool;

    /// Returns `true` if `mv` is a Pawn capturing en passant.
    fn is_en_passant(&self, mv: Move) -> bool;

    /// Returns `true` if `mv` is a castling move.
    fn is_castling(&self, mv: Move) -> bool;

    /// Resolves a move written in Standard Algebraic Notation against the legal moves of this position.
    fn parse_san(&self, san: &str) -> Result<Move>;
}

impl Rules for Game {
    #[inline(always)]
    fn is_checkmate(&self) -> bool {
        self.is_in_check() && self.get_legal_moves().is_empty()
    }

    #[inline(always)]
    fn is_stalemate(&self) -> bool {
        !self.is_in_check() && self.get_legal_moves().is_empty()
    }

    fn attackers(&self, color: Color, square: Square) -> Bitboard {
        let board = self.board();
        let ours = board.color(color);
        let blockers = board.occupied();

        let pawns = board.kind(PieceKind::Pawn) & ours;
        let knights = board.kind(PieceKind::Knight) & ours;
        let queens = board.kind(PieceKind::Queen) & ours;
        let diagonals = (board.kind(PieceKind::Bishop) & ours) | queens;
        let orthogonals = (board.kind(PieceKind::Rook) & ours) | queens;
        let king = board.kind(PieceKind::King) & ours;

        // A pawn of `color` attacks `square` from wherever an enemy pawn on `square` would attack.
        (pawn_attacks(square, color.opponent()) & pawns)
            | (knight_attacks(square) & knights)
            | (bishop_attacks(square, blockers) & diagonals)
            | (rook_attacks(square, blockers) & orthogonals)
            | (king_attacks(square) & king)
    }

    #[inline(always)]
    fn kind_on(&self, square: Square) -> Option<PieceKind> {
        self.piece_at(square).map(|piece| piece.kind())
    }

    fn is_capture(&self, mv: Move) -> bool {
        if self.is_en_passant(mv) {
            return true;
        }

        let Some(mover) = self.piece_at(mv.from()) else {
            return false;
        };

        self.piece_at(mv.to())
            .is_some_and(|victim| victim.color() != mover.color())
    }

    fn is_en_passant(&self, mv: Move) -> bool {
        self.kind_on(mv.from()) == Some(PieceKind::Pawn)
            && file_of(mv.from()) != file_of(mv.to())
            && self.piece_at(mv.to()).is_none()
    }

    fn is_castling(&self, mv: Move) -> bool {
        let Some(king) = self.piece_at(mv.from()) else {
            return false;
        };

        if king.kind() != PieceKind::King {
            return false;
        }

        // Either the King jumps two files, or it "captures" its own Rook (Chess960 encoding)
        let jumps = file_of(mv.from()).abs_diff(file_of(mv.to())) > 1;
        let onto_own_rook = self
            .piece_at(mv.to())
            .is_some_and(|rook| rook.kind() == PieceKind::Rook && rook.color() == king.color());

        jumps || onto_own_rook
    }

    fn parse_san(&self, san: &str) -> Result<Move> {
        let parsed = San::parse(san)?;

        let mut candidates = self
            .get_legal_moves()
            .into_iter()
            .filter(|&mv| parsed.matches(self, mv));

        let mv = candidates
            .next()
            .ok_or(anyhow!("{san:?} is not a legal move in {}", self.to_fen()))?;

        if candidates.next().is_some() {
            bail!("{san:?} is ambiguous in {}", self.to_fen());
        }

        Ok(mv)
    }
}

/// File index of `square`, `0` for the a-file through `7` for the h-file.
#[inline(always)]
fn file_of(square: Square) -> usize {
    square.index() % 8
}

/// Rank index of `square`, `0` for the first rank through `7` for the eighth.
#[inline(always)]
fn rank_of(square: Square) -> usize {
    square.index() / 8
}

/// The pieces of a SAN string, before it has been matched against any position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum San {
    /// `O-O` (`short == true`) or `O-O-O`.
    Castle { short: bool },

    /// Every other move.
    Normal {
        kind: PieceKind,
        from_file: Option<usize>,
        from_rank: Option<usize>,
        to: usize,
        promotion: Option<PieceKind>,
    },
}

impl San {
    fn parse(san: &str) -> Result<Self> {
        let trimmed = san.trim().trim_end_matches(['+', '#', '!', '?']);

        match trimmed {
            "O-O" | "0-0" => return Ok(Self::Castle { short: true }),
            "O-O-O" | "0-0-0" => return Ok(Self::Castle { short: false }),
            _ => {}
        }

        let (body, promotion) = match trimmed.split_once('=') {
            Some((body, promo)) => {
                let mut chars = promo.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    bail!("Invalid promotion in SAN move {san:?}");
                };
                let kind = kind_from_char(c)
                    .ok_or(anyhow!("Invalid promotion piece in SAN move {san:?}"))?;
                (body, Some(kind))
            }
            None => (trimmed, None),
        };

        let mut chars: Vec<char> = body.chars().filter(|&c| c != 'x').collect();

        let kind = match chars.first().copied().and_then(kind_from_char) {
            Some(kind) => {
                chars.remove(0);
                kind
            }
            None => PieceKind::Pawn,
        };

        if chars.len() < 2 {
            bail!("SAN move {san:?} has no destination square");
        }

        let dest = chars.split_off(chars.len() - 2);
        let to = square_index(dest[0], dest[1])
            .ok_or(anyhow!("Invalid destination square in SAN move {san:?}"))?;

        let mut from_file = None;
        let mut from_rank = None;
        for c in chars {
            match c {
                'a'..='h' => from_file = Some(c as usize - 'a' as usize),
                '1'..='8' => from_rank = Some(c as usize - '1' as usize),
                _ => bail!("Unexpected character {c:?} in SAN move {san:?}"),
            }
        }

        Ok(Self::Normal {
            kind,
            from_file,
            from_rank,
            to,
            promotion,
        })
    }

    fn matches(&self, game: &Game, mv: Move) -> bool {
        match *self {
            Self::Castle { short } => {
                game.is_castling(mv) && (file_of(mv.to()) > file_of(mv.from())) == short
            }

            Self::Normal {
                kind,
                from_file,
                from_rank,
                to,
                promotion,
            } => {
                game.kind_on(mv.from()) == Some(kind)
                    && !game.is_castling(mv)
                    && mv.to().index() == to
                    && from_file.map_or(true, |file| file == file_of(mv.from()))
                    && from_rank.map_or(true, |rank| rank == rank_of(mv.from()))
                    && mv.promotion() == promotion
            }
        }
    }
}

/// Maps an uppercase SAN piece letter to its [`PieceKind`].
#[inline(always)]
const fn kind_from_char(c: char) -> Option<PieceKind> {
    match c {
        'N' => Some(PieceKind::Knight),
        'B' => Some(PieceKind::Bishop),
        'R' => Some(PieceKind::Rook),
        'Q' => Some(PieceKind::Queen),
        'K' => Some(PieceKind::King),
        _ => None,
    }
}

#[inline(always)]
fn square_index(file: char, rank: char) -> Option<usize> {
    if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }

    Some((rank as usize - '1' as usize) * 8 + (file as usize - 'a' as usize))
}
