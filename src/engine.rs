/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt, io,
    sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender},
    thread,
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Result};
use chessie::{Game, Move};
use clap::Parser;
use log::{debug, error, info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use uci_parser::{UciCommand, UciInfo, UciOption, UciParseError, UciResponse};

use crate::{
    captured, repetition_key, select_move, BackgroundTask, EngineCommand, Evaluator, GameOutcome,
    Selection, SelectorConfig,
};

/// How long the command loop waits for input before checking on a pending selection.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The Patzer chess engine.
#[derive(Debug)]
pub struct Engine {
    /// The current state of the chess board, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    game: Game,

    /// Repetition keys of every position reached in the current game, the current one included.
    history: Vec<String>,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Settings handed to every selection.
    config: SelectorConfig,

    /// The seed the engine was last seeded with, if one was supplied.
    seed: Option<u64>,

    /// Source of the per-selection seeds.
    rng: StdRng,

    /// The selection currently running in the background, if one exists.
    selection: Option<BackgroundTask<Selection>>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        let game = Game::default();

        Self {
            history: vec![repetition_key(&game)],
            game,
            sender,
            receiver,
            config: SelectorConfig::default(),
            seed: None,
            rng: StdRng::from_entropy(),
            selection: None,
        }
    }

    /// Constructs a new [`Engine`] using the supplied seed and selector settings.
    pub fn with_config(config: SelectorConfig, seed: Option<u64>) -> Self {
        let mut engine = Self::new();
        engine.config = config;
        engine.reseed(seed);
        engine
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Returns a string of all authors of this engine.
    pub fn authors(&self) -> String {
        // Split multiple authors by comma-space
        env!("CARGO_PKG_AUTHORS").replace(':', ", ").to_string()
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // Safe unwrap: `send` can only fail if it's corresponding receiver doesn't exist,
        //  and the only way our engine's `Receiver` can no longer exist is when our engine
        //  doesn't exist either, so this is always safe.
        self.sender.send(command).unwrap();
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands,
    /// checking on any pending selection in between.
    pub fn run(&mut self) -> Result<()> {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                error!("Input handler thread stopping after fatal error: {err}");
            }
        });

        loop {
            match self.receiver.recv_timeout(POLL_INTERVAL) {
                Ok(EngineCommand::Exit) => break,

                // Keep running, even on error
                Ok(cmd) => {
                    if let Err(e) = self.handle_command(cmd) {
                        eprintln!("Error: {e}");
                    }
                }

                Err(RecvTimeoutError::Timeout) => {}

                Err(RecvTimeoutError::Disconnected) => break,
            }

            self.poll_selection();
        }

        if self.selection.take().is_some() {
            debug!("Abandoning pending selection on exit");
        }

        Ok(())
    }

    /// Handle the execution of a single [`EngineCommand`].
    fn handle_command(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Captured => println!("{}", captured(&self.game)),

            EngineCommand::Display => self.display(),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            // Handled by the event loop
            EngineCommand::Exit => {}

            EngineCommand::Fen => println!("{}", self.game.to_fen()),

            EngineCommand::Moves => {
                let moves = self.game.get_legal_moves();

                // If there are none, print "(none)"
                let moves_string = if moves.is_empty() {
                    String::from("(none)")
                } else {
                    // Otherwise, join them by comma-space
                    moves
                        .into_iter()
                        .map(|mv| mv.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                println!("{moves_string}");
            }

            EngineCommand::Option { name } => {
                let name = name.join(" ");
                if let Some(value) = self.get_option(&name) {
                    println!("{name} := {value}");
                } else {
                    println!("{} has no option {name:?}", self.name());
                }
            }

            EngineCommand::Outcome => match self.outcome() {
                Some(outcome) => println!("{outcome}"),
                None => println!("game in progress"),
            },

            EngineCommand::Play { mv_string } => self.play(&mv_string)?,

            EngineCommand::Uci { cmd } => self.handle_uci_command(cmd)?,

            EngineCommand::Wait => {
                if let Some(selection) = self.wait() {
                    self.report(&selection);
                }
            }
        }

        Ok(())
    }

    /// Handle the execution of a single [`UciCommand`].
    fn handle_uci_command(&mut self, uci: UciCommand) -> Result<()> {
        use UciCommand::*;
        match uci {
            Uci => self.uci(),

            IsReady => println!("{}", UciResponse::<&str>::ReadyOk),

            SetOption { name, value } => self.set_option(&name, value)?,

            UciNewGame => self.new_game(),

            Position { fen, moves } => self.position(fen, moves)?,

            // Time controls are irrelevant: a selection is a single, short, pass over the legal moves
            Go(_) => {
                self.start_selection();
            }

            // Selections cannot be interrupted; the result arrives once it is ready
            Stop => {}

            Quit => self.send_command(EngineCommand::Exit),

            _ => bail!(
                "{} does not support UCI command {uci:?}",
                env!("CARGO_PKG_NAME")
            ),
        }

        Ok(())
    }

    /// Executes the `display` command, printing the current position.
    fn display(&self) {
        println!("{}", self.game);
    }

    /// Executes the `eval` command, printing the score of every legal move from best to worst.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::new(&self.game, &self.config.table);
        if pretty {
            println!("{evaluator}");
            return;
        }

        let mut scored = self
            .game
            .get_legal_moves()
            .into_iter()
            .map(|mv| (mv, evaluator.score_move(mv)))
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        for (mv, score) in scored {
            println!("{mv}: {score}");
        }
    }

    /// Set the position to the supplied FEN string (defaults to the standard startpos if not supplied),
    /// and then apply `moves` one-by-one to the position.
    fn position<T: AsRef<str>>(
        &mut self,
        fen: Option<T>,
        moves: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        // Parse everything first, so that a bad move leaves the current game untouched
        let mut game = if let Some(fen) = fen {
            fen.as_ref()
                .parse()
                .with_context(|| format!("Invalid FEN {:?}", fen.as_ref()))?
        } else {
            Game::default()
        };
        let mut history = vec![repetition_key(&game)];

        // Apply the provided moves
        for mv_str in moves {
            let mv = legal_move(&game, mv_str.as_ref())?;
            game.make_move(mv);
            history.push(repetition_key(&game));
        }

        self.game = game;
        self.history = history;

        Ok(())
    }

    /// Executes the `play` command, applying a single move to the current position.
    fn play(&mut self, mv_str: &str) -> Result<()> {
        let mv = legal_move(&self.game, mv_str)?;
        self.game.make_move(mv);
        self.history.push(repetition_key(&self.game));

        if let Some(outcome) = self.outcome() {
            info!("Game over after {mv}: {outcome}");
        }

        Ok(())
    }

    /// Classifies the current game, returning `None` if it is still in progress.
    fn outcome(&self) -> Option<GameOutcome> {
        GameOutcome::of(&self.game, &self.history)
    }

    /// Resets the engine's internal game state.
    ///
    /// Any pending selection is abandoned, and its result ignored.
    fn new_game(&mut self) {
        if self.selection.take().is_some() {
            debug!("Abandoning pending selection for new game");
        }

        self.game = Game::default();
        self.history = vec![repetition_key(&self.game)];
    }

    /// Re-seeds the engine, or seeds it from entropy if `seed` is `None`.
    fn reseed(&mut self, seed: Option<u64>) {
        self.seed = seed;
        self.rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
    }

    /// Starts a selection on the current position in the background.
    ///
    /// Returns `false` if one is already running, in which case nothing is started.
    fn start_selection(&mut self) -> bool {
        if self.selection.as_ref().is_some_and(|task| !task.is_done()) {
            warn!("A selection is already running; ignoring `go`");
            return false;
        }

        // Copy everything the selection needs into the task
        let game = self.game;
        let config = self.config;
        let mut rng = StdRng::seed_from_u64(self.rng.gen());

        debug!("Starting selection on {}", game.to_fen());
        self.selection = Some(BackgroundTask::spawn(move || {
            select_move(&game, &config, &mut rng)
        }));

        true
    }

    /// Reports the pending selection, if it has finished. Never blocks.
    fn poll_selection(&mut self) {
        let Some(task) = self.selection.as_mut() else {
            return;
        };

        if !task.is_done() {
            return;
        }

        let result = task.result();
        self.selection = None;

        match result {
            Ok(selection) => self.report(&selection),
            Err(e) => error!("Selection failed: {e}"),
        }
    }

    /// Awaits the pending selection, blocking until it finishes and returning its result.
    fn wait(&mut self) -> Option<Selection> {
        let mut task = self.selection.take()?;

        match task.wait() {
            Ok(selection) => Some(selection),
            Err(e) => {
                error!("Selection failed: {e}");
                None
            }
        }
    }

    /// Prints the result of a selection as a UCI `bestmove` response.
    fn report(&self, selection: &Selection) {
        if let Some(score) = selection.best_score() {
            Self::send_string(format!("score {score}"));
        }

        let response = UciResponse::BestMove {
            bestmove: selection.bestmove,
            ponder: None,
        };

        println!("{response}");
    }

    /// Called when the engine receives the `uci` command.
    ///
    /// Prints engine's ID, version, and authors, and lists all UCI options.
    fn uci(&self) {
        println!("id name {}\nid author {}\n", self.name(), self.authors());

        // Print all UCI options
        println!(
            "{}",
            UciResponse::Option(UciOption::check("OwnBook", self.config.use_book))
        );
        println!(
            "{}",
            UciResponse::Option(UciOption::spin("Seed", 0, 0, 2147483647))
        );

        // We're ready to go!
        println!("{}", UciResponse::<&str>::UciOk)
    }

    /// Handles the `setoption` command, setting option `name` to `value`.
    ///
    /// Will return an error if `name` isn't a valid option or `value` is not a valid value for that option.
    fn set_option(&mut self, name: &str, value: Option<String>) -> Result<()> {
        match name {
            "OwnBook" => {
                let Some(value) = value.as_ref() else {
                    bail!("usage: setoption name {name} value <true / false>");
                };

                let Ok(enabled) = value.parse() else {
                    bail!("expected bool. got {value:?}");
                };

                self.config.use_book = enabled;
            }

            // A seed of 0 means "seed from entropy"
            "Seed" => {
                let Some(value) = value.as_ref() else {
                    bail!("usage: setoption name {name} value <seed>");
                };

                let Ok(seed) = value.parse::<u64>() else {
                    bail!("expected integer. got {value:?}");
                };

                self.reseed((seed != 0).then_some(seed));
            }

            _ => {
                if let Some(value) = value.as_ref() {
                    bail!("Unrecognized option {name:?} with value {value:?}")
                } else {
                    bail!("Unrecognized option {name:?}")
                }
            }
        }

        info!("Option {name} set to {value:?}");

        Ok(())
    }

    /// Returns the current value of the option `name`, if it exists on this engine.
    fn get_option(&self, name: &str) -> Option<String> {
        let value = match name {
            "OwnBook" => format!("{}", self.config.use_book),

            "Seed" => self
                .seed
                .map_or_else(|| String::from("(entropy)"), |seed| seed.to_string()),

            _ => return None,
        };

        Some(value)
    }

    /// Helper to send a [`UciInfo`] containing only a `string` message to `stdout`.
    #[inline(always)]
    fn send_string<T: fmt::Display>(info: T) {
        let resp = UciResponse::<String>::Info(Box::new(UciInfo::new().string(info)));
        println!("{resp}");
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `mv_str` as a UCI move, ensuring it is legal in `game`.
fn legal_move(game: &Game, mv_str: &str) -> Result<Move> {
    let mv = Move::from_uci(game, mv_str)
        .with_context(|| format!("Invalid move {mv_str:?} in {}", game.to_fen()))?;

    if !game.get_legal_moves().into_iter().any(|legal| legal == mv) {
        bail!("Illegal move {mv_str:?} in {}", game.to_fen());
    }

    Ok(mv)
}

/// Reads `stdin` line by line, forwarding every command that parses through `sender`.
///
/// End of input is treated as `exit`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    for line in io::stdin().lines() {
        let line = line.context("Failed to read from stdin")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match parse_input(input) {
            Ok(cmd) => sender
                .send(cmd)
                .context("Engine is no longer receiving commands")?,
            Err(e) => eprintln!("{e}"),
        }
    }

    debug!("stdin closed");
    sender
        .send(EngineCommand::Exit)
        .context("Failed to send `exit` at end of input")
}

/// UCI takes priority. Anything UCI does not recognise is tried as an [`EngineCommand`].
fn parse_input(input: &str) -> Result<EngineCommand> {
    match UciCommand::new(input) {
        Ok(cmd) => Ok(EngineCommand::Uci { cmd }),

        Err(UciParseError::UnrecognizedCommand { .. }) => {
            EngineCommand::try_parse_from(input.split_ascii_whitespace())
                .map_err(|e| anyhow!("{e}"))
        }

        // A UCI command with bad arguments
        Err(e) => bail!("{e}"),
    }
}
