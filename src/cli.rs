/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;
use log::LevelFilter;
use uci_parser::UciCommand;

/// Command-line arguments accepted on startup.
#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Seed for the random tie-break between equally-scored moves.
    ///
    /// If not supplied, the engine seeds itself from entropy.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// If set, first moves are scored like any other instead of being drawn from the opening book.
    #[arg(long, default_value = "false")]
    pub no_book: bool,

    /// Verbosity of the log written to `stderr`. Overridden by `RUST_LOG`, if set.
    #[arg(short, long, default_value = "warn")]
    pub log_level: LevelFilter,

    /// Commands to execute on startup, separated by `;`.
    ///
    /// Example: `patzer position startpos moves e2e4 ; go ; wait`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub commands: Vec<String>,
}

impl Cli {
    /// Splits the trailing startup arguments into individual commands.
    pub fn startup_commands(&self) -> Vec<String> {
        self.commands
            .join(" ")
            .split(';')
            .map(str::trim)
            .filter(|cmd| !cmd.is_empty())
            .map(String::from)
            .collect()
    }
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND> | <UCI COMMAND>")
)]
pub enum EngineCommand {
    /// Print the pieces each side has lost so far.
    Captured,

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Score every legal move in the current position.
    Eval {
        /// If set, each score is broken down into the terms it was built from.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine, abandoning any pending selection.
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Shows all legal moves in the current position.
    Moves,

    /// Display the current value of the specified option.
    Option {
        name: Vec<String>, // This is a vector in order to support multi-word options
    },

    /// Print whether the game has ended, and how.
    Outcome,

    /// Apply the provided move (in UCI notation) to the game, if it is legal.
    #[command(alias = "move")]
    Play { mv_string: String },

    /// Wrapper over UCI commands sent to the engine.
    #[command(skip)]
    Uci { cmd: UciCommand },

    /// Await the pending selection, blocking until it completes.
    ///
    /// This is primarily used when running `go` on startup,
    /// to await its result before doing something else.
    Wait,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    ///
    /// If this fails, it will attempt to parse the string as a [`UciCommand`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::try_parse_from(s.split_ascii_whitespace()) {
            Ok(cmd) => Ok(cmd),
            Err(e) => {
                // If parsing failed, attempt to parse as a UciCommand
                if let Ok(cmd) = UciCommand::new(s) {
                    Ok(Self::Uci { cmd })
                } else {
                    Err(e)
                }
            }
        }
    }
}
