/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use chessie::Game;
use log::trace;

use crate::Rules;

/// What the opponent can do to us with their very next move.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Danger {
    /// No reply checks, mates, or stalemates us.
    #[default]
    None,

    /// A reply puts us in check.
    Check,

    /// A reply checkmates us.
    Mate,

    /// A reply leaves us without a legal move, but not in check.
    Stalemate,
}

impl Danger {
    /// Returns `true` if the opponent can give check (mate included).
    #[inline(always)]
    pub const fn is_check(&self) -> bool {
        matches!(self, Self::Check | Self::Mate)
    }

    /// Returns `true` if the opponent can deliver mate.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        matches!(self, Self::Mate)
    }

    /// Returns `true` if the opponent can force a stalemate.
    #[inline(always)]
    pub const fn is_stalemate(&self) -> bool {
        matches!(self, Self::Stalemate)
    }
}

impl fmt::Display for Danger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Check => "check",
            Self::Mate => "mate",
            Self::Stalemate => "stalemate",
        };
        write!(f, "{s}")
    }
}

/// Looks one ply ahead from `after_our_move`, where the opponent is to move.
///
/// Replies are examined in the order the move generator yields them,
/// and the scan stops at the *first* reply that mates, checks, or stalemates us.
/// This is not a worst-case search: a mate further down the move list can be
/// hidden behind an earlier, merely checking, reply.
pub fn opponent_can_end_game(after_our_move: &Game) -> Danger {
    for reply in after_our_move.get_legal_moves() {
        let after_reply = after_our_move.with_move_made(reply);

        let danger = if after_reply.is_checkmate() {
            Danger::Mate
        } else if after_reply.is_in_check() {
            Danger::Check
        } else if after_reply.is_stalemate() {
            Danger::Stalemate
        } else {
            continue;
        };

        trace!("reply {reply} leads to {danger}");
        return danger;
    }

    Danger::None
}
