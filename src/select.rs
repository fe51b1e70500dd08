/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use chessie::{Color, Game, Move};
use log::{debug, info};
use rand::{seq::SliceRandom, Rng};

use crate::{Evaluator, PieceValueTable, Rules, Score};

/// First moves White picks from, in SAN.
pub const WHITE_BOOK: [&str; 6] = ["e4", "d4", "Nf3", "c4", "f4", "b3"];

/// First replies Black picks from, in SAN.
pub const BLACK_BOOK: [&str; 7] = ["e5", "c5", "e6", "c6", "d5", "g6", "Nf6"];

/// Returns the opening book for `color`.
#[inline(always)]
pub fn book_for(color: Color) -> &'static [&'static str] {
    match color {
        Color::White => &WHITE_BOOK,
        Color::Black => &BLACK_BOOK,
    }
}

/// Configuration variables for [`select_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Piece weights used when scoring moves.
    pub table: PieceValueTable,

    /// If set, a side's first move is drawn from its opening book instead of being scored.
    pub use_book: bool,
}

impl Default for SelectorConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            table: PieceValueTable::STANDARD,
            use_book: true,
        }
    }
}

/// A legal move and the score it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoredMove {
    /// The move.
    pub mv: Move,

    /// How much the evaluator liked it.
    pub score: Score,
}

/// The result of a selection: the move to play, and how every candidate scored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    /// The chosen move, or `None` if there were no legal moves.
    pub bestmove: Option<Move>,

    /// Every candidate in the order the move generator produced them.
    ///
    /// When the move came from the opening book, this holds only that move, scored `0`.
    pub scored: Vec<ScoredMove>,
}

impl Selection {
    /// The highest score among the candidates, if there were any.
    #[inline(always)]
    pub fn best_score(&self) -> Option<Score> {
        self.scored.iter().map(|sm| sm.score).max()
    }

    /// The candidates from best to worst. Moves with equal scores keep their generator order.
    pub fn ranked(&self) -> Vec<ScoredMove> {
        let mut ranked = self.scored.clone();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}

/// Chooses a move for the side-to-move of `game`.
///
/// On a side's first move (and if enabled in `config`), the move comes from its opening book.
/// Otherwise every legal move is scored with an [`Evaluator`] and one of the moves sharing the
/// top score is drawn uniformly with `rng`.
///
/// This does not decide whether the game is over; with no legal moves it simply returns no move.
pub fn select_move<R: Rng + ?Sized>(
    game: &Game,
    config: &SelectorConfig,
    rng: &mut R,
) -> Selection {
    let moves = game.get_legal_moves();
    if moves.is_empty() {
        debug!("No legal moves in {}", game.to_fen());
        return Selection::default();
    }

    if config.use_book && game.fullmove() == 1 {
        if let Some(mv) = book_move(game, rng) {
            info!("Playing book move {mv}");
            return Selection {
                bestmove: Some(mv),
                scored: vec![ScoredMove {
                    mv,
                    score: Score::ZERO,
                }],
            };
        }
    }

    let evaluator = Evaluator::new(game, &config.table);
    let scored: Vec<ScoredMove> = moves
        .into_iter()
        .map(|mv| {
            let score = evaluator.score_move(mv);
            debug!("{mv}: {score}");
            ScoredMove { mv, score }
        })
        .collect();

    // There is at least one legal move, so the default is never used
    let best = scored.iter().map(|sm| sm.score).max().unwrap_or_default();
    let tied: Vec<Move> = scored
        .iter()
        .filter(|sm| sm.score == best)
        .map(|sm| sm.mv)
        .collect();

    let bestmove = tied.choose(rng).copied();
    if let Some(mv) = bestmove {
        info!(
            "Selected {mv} with score {best} ({} of {} moves tied)",
            tied.len(),
            scored.len()
        );
    }

    Selection { bestmove, scored }
}

/// Draws a move from the side-to-move's opening book, skipping any entry that is not legal here.
fn book_move<R: Rng + ?Sized>(game: &Game, rng: &mut R) -> Option<Move> {
    let candidates: Vec<Move> = book_for(game.side_to_move())
        .iter()
        .filter_map(|san| game.parse_san(san).ok())
        .collect();

    candidates.choose(rng).copied()
}
