//! `regflow`: CLI sobre el engine de stages con almacenamiento en disco.

pub mod app;
pub mod cli;
pub mod commands;
pub mod error;
pub mod render;

use std::io::Write;

pub use cli::{Cli, Command};
pub use error::CliError;
use reg_persistence::LedgerConfig;

/// Despacha un subcomando ya parseado.
pub fn execute(cli: &Cli, cfg: &LedgerConfig, out: &mut dyn Write) -> Result<(), CliError> {
    let dir = cli.dir.as_path();
    match &cli.command {
        Command::Init { synthetic, force } => commands::init(dir, cfg, *synthetic, *force, out),
        Command::Train(args) => commands::train(dir, args, out),
        Command::Run(args) => commands::run(dir, cfg, args, out),
        Command::Status { stage } => commands::status(dir, cfg, stage.as_deref(), out),
        Command::Show { stage, json, sort_by } => commands::show(dir, cfg, stage.as_deref(), *json, sort_by.as_deref(), out),
        Command::Apply { id, force } => commands::apply(dir, cfg, id, *force, out),
        Command::Queue { clear } => commands::queue(dir, cfg, *clear, out),
        Command::Best { metric, lowest } => commands::best(dir, cfg, metric, *lowest, out),
    }
}
