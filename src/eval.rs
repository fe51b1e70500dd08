/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::{Color, Game, Move, PieceKind, Square};

use crate::{
    is_adequately_defended, opponent_can_end_game, value_hanging, wants_stalemate, Danger,
    PieceValueTable, Rules, Score,
};

/// Bonus for a move that checks from a defended square (and penalty for an undefended one).
const CHECK_BONUS: i32 = 10;

/// Penalty for letting the opponent give check.
const ALLOWED_CHECK_PENALTY: i32 = 5;

/// Bonus for landing on a defended square.
const SAFE_SQUARE_BONUS: i32 = 1;

/// Bonus for castling, and penalty for any other King move.
const KING_MOVE_BONUS: i32 = 2;

/// Bonus for a move that starts or ends in the centre.
const CENTRE_BONUS: i32 = 2;

/// The four central squares: d4, e4, d5, e5.
const CENTRE: [usize; 4] = [27, 28, 35, 36];

/// Encapsulates the logic of scoring candidate moves in a position.
///
/// Every move is judged on its own: the evaluator plays it on a copy of the game,
/// peeks at the opponent's replies, and tallies a handful of static terms.
/// Nothing here is random, so the same game and move always produce the same score.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    /// The game whose moves are being scored. Never modified.
    game: &'a Game,

    /// Piece weights used by every term.
    table: &'a PieceValueTable,

    /// The side whose moves are being scored.
    color: Color,

    /// Whether `color` would take a stalemate, judged on the position before any move is made.
    wants_stalemate: bool,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for the side-to-move of `game`.
    #[inline(always)]
    pub fn new(game: &'a Game, table: &'a PieceValueTable) -> Self {
        Self::for_color(game, game.side_to_move(), table)
    }

    /// Construct a new [`Evaluator`] that scores moves on behalf of `color`.
    #[inline(always)]
    pub fn for_color(game: &'a Game, color: Color, table: &'a PieceValueTable) -> Self {
        Self {
            game,
            table,
            color,
            wants_stalemate: wants_stalemate(game, color),
        }
    }

    /// Score `mv`. Higher is better for the side this evaluator plays for.
    #[inline(always)]
    pub fn score_move(&self, mv: Move) -> Score {
        self.breakdown(mv).total()
    }

    /// Score `mv`, keeping every term separate.
    pub fn breakdown(&self, mv: Move) -> ScoreBreakdown {
        let future = self.game.with_move_made(mv);
        let to = self.landing_square(&future, mv);
        let to_defended = self.is_defended(&future, to);

        ScoreBreakdown {
            danger: self.danger_term(opponent_can_end_game(&future)),
            check: self.check_term(&future, to_defended),
            mate: self.mate_term(&future),
            stalemate: self.stalemate_term(&future),
            promotion: self.promotion_term(mv, to_defended),
            capture: self.capture_term(mv, to_defended),
            destination: self.destination_term(&future, to, to_defended),
            king: self.king_term(mv),
            hanging: self.hanging_term(&future),
            centre: centre_term(mv),
        }
    }

    /// The square the moved piece stands on in `future`.
    ///
    /// Castling is encoded as the King capturing its own Rook, so `mv.to()` is the Rook's
    /// old square; the King is looked up on the board instead.
    fn landing_square(&self, future: &Game, mv: Move) -> Square {
        if !self.game.is_castling(mv) {
            return mv.to();
        }

        let board = future.board();
        let king = board.kind(PieceKind::King) & board.color(self.game.side_to_move());
        king.into_iter().next().unwrap_or(mv.to())
    }

    /// Whether the piece of our color on `square` holds in `game`.
    #[inline(always)]
    fn is_defended(&self, game: &Game, square: Square) -> bool {
        is_adequately_defended(game, square, self.color, self.table)
    }

    /// Value of a stalemate for us: good if we have no winning chances, bad otherwise.
    #[inline(always)]
    fn stalemate_value(&self) -> Score {
        if self.wants_stalemate {
            Score::STALEMATE
        } else {
            -Score::STALEMATE
        }
    }

    fn danger_term(&self, danger: Danger) -> Score {
        if danger.is_mate() {
            -Score::MATE
        } else if danger.is_check() {
            Score(-ALLOWED_CHECK_PENALTY)
        } else if danger.is_stalemate() {
            self.stalemate_value()
        } else {
            Score::ZERO
        }
    }

    fn check_term(&self, future: &Game, to_defended: bool) -> Score {
        match (future.is_in_check(), to_defended) {
            (false, _) => Score::ZERO,
            (true, true) => Score(CHECK_BONUS),
            (true, false) => Score(-CHECK_BONUS),
        }
    }

    fn mate_term(&self, future: &Game) -> Score {
        if future.is_checkmate() {
            Score::MATE
        } else {
            Score::ZERO
        }
    }

    fn stalemate_term(&self, future: &Game) -> Score {
        if future.is_stalemate() {
            self.stalemate_value()
        } else {
            Score::ZERO
        }
    }

    fn promotion_term(&self, mv: Move, to_defended: bool) -> Score {
        let Some(promotion) = mv.promotion() else {
            return Score::ZERO;
        };

        let gained = self.table.value_of(promotion);
        if to_defended {
            Score(gained)
        } else {
            // The new piece is lost, and so is the pawn that became it
            Score(-(gained + self.table.value_of(PieceKind::Pawn)))
        }
    }

    fn capture_term(&self, mv: Move, to_defended: bool) -> Score {
        if !self.game.is_capture(mv) {
            return Score::ZERO;
        }

        let captured = if self.game.is_en_passant(mv) {
            Some(PieceKind::Pawn)
        } else {
            self.game.kind_on(mv.to())
        };

        let (Some(captured), Some(capturing)) = (captured, self.game.kind_on(mv.from())) else {
            return Score::ZERO;
        };

        let delta = self.table.value_of(captured) - self.table.value_of(capturing);

        // Taking something bigger is always good; otherwise it depends on whether we can hold the square
        if delta > 0 || to_defended {
            Score(delta)
        } else {
            Score(-delta)
        }
    }

    fn destination_term(&self, future: &Game, to: Square, to_defended: bool) -> Score {
        if to_defended {
            Score(SAFE_SQUARE_BONUS)
        } else {
            let value = future
                .kind_on(to)
                .map_or(0, |kind| self.table.value_of(kind));
            Score(-value)
        }
    }

    fn king_term(&self, mv: Move) -> Score {
        if self.game.kind_on(mv.from()) != Some(PieceKind::King) {
            return Score::ZERO;
        }

        if self.game.is_castling(mv) {
            Score(KING_MOVE_BONUS)
        } else {
            Score(-KING_MOVE_BONUS)
        }
    }

    fn hanging_term(&self, future: &Game) -> Score {
        let ours = value_hanging(future, self.color, self.table);
        let theirs = value_hanging(future, self.color.opponent(), self.table);

        // Their loose pieces count for half
        Score(theirs / 2 - ours)
    }
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<7} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} {:>6} | {:>6}",
            "move", "danger", "check", "mate", "stale", "promo", "capt", "dest", "king", "hang",
            "centre", "total"
        )?;

        for mv in self.game.get_legal_moves() {
            writeln!(f, "{:<7} {}", mv.to_string(), self.breakdown(mv))?;
        }

        write!(
            f,
            "\nScoring for: {}\nWants stalemate: {}",
            self.color.name(),
            self.wants_stalemate
        )
    }
}

/// The individual terms that add up to a move's [`Score`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoreBreakdown {
    /// What the opponent's best-looking reply does to us.
    pub danger: Score,

    /// Giving check, from a defended or undefended square.
    pub check: Score,

    /// Delivering mate.
    pub mate: Score,

    /// Delivering stalemate.
    pub stalemate: Score,

    /// Promoting a pawn.
    pub promotion: Score,

    /// Trading on the destination square.
    pub capture: Score,

    /// Safety of the piece on its new square.
    pub destination: Score,

    /// Castling versus walking the King.
    pub king: Score,

    /// Material left hanging by both sides.
    pub hanging: Score,

    /// Touching the centre.
    pub centre: Score,
}

impl ScoreBreakdown {
    /// The final score of the move: the sum of every term.
    #[inline(always)]
    pub fn total(&self) -> Score {
        self.terms().into_iter().sum()
    }

    /// Every term, in the order they are computed.
    #[inline(always)]
    pub const fn terms(&self) -> [Score; 10] {
        [
            self.danger,
            self.check,
            self.mate,
            self.stalemate,
            self.promotion,
            self.capture,
            self.destination,
            self.king,
            self.hanging,
            self.centre,
        ]
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for term in self.terms() {
            write!(f, "{:>6} ", term.to_string())?;
        }
        write!(f, "| {:>6}", self.total().to_string())
    }
}

/// Bonus if `mv` starts or ends on one of the four central squares.
#[inline(always)]
fn centre_term(mv: Move) -> Score {
    if CENTRE.contains(&mv.from().index()) || CENTRE.contains(&mv.to().index()) {
        Score(CENTRE_BONUS)
    } else {
        Score::ZERO
    }
}
