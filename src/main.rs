/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::Parser;
use patzer::{Cli, Engine, EngineCommand, SelectorConfig};

fn main() {
    let cli = Cli::parse();

    // Logs go to `stderr`, keeping `stdout` clean for UCI
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let config = SelectorConfig {
        use_book: !cli.no_book,
        ..Default::default()
    };
    let mut engine = Engine::with_config(config, cli.seed);

    // Queue up any commands supplied on startup
    for cmd in cli.startup_commands() {
        match cmd.parse::<EngineCommand>() {
            Ok(cmd) => engine.send_command(cmd),
            Err(e) => eprintln!("ERROR on input {cmd:?}:\n{e}"),
        }
    }

    if let Err(e) = engine.run() {
        eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
    }
}
