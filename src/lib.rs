/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Command-line arguments and engine-specific commands.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Scoring of candidate moves.
mod eval;

/// One-ply lookahead for the opponent's most dangerous reply.
mod lookahead;

/// Detecting the end of a game, and tallying captured material.
mod outcome;

/// When a side would be happy to stalemate.
mod policy;

/// Rules queries built on top of the move generator.
mod rules;

/// Choosing a move: opening book, scoring, and tie-breaking.
mod select;

/// Running a computation in the background and collecting its result once.
mod task;

/// Whether pieces are defended, and how much material is left hanging.
mod threat;

/// Misc utility functions, constants, and types.
mod utils;

/// Material values of the pieces.
mod values;

pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use lookahead::*;
pub use outcome::*;
pub use policy::*;
pub use rules::*;
pub use select::*;
pub use task::*;
pub use threat::*;
pub use utils::*;
pub use values::*;
