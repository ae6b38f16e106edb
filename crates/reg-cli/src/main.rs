use std::process::ExitCode;

use clap::Parser;
use reg_cli::{execute, Cli};
use reg_persistence::{init_dotenv, LedgerConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("REGFLOW_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_target(false)
                             .with_writer(std::io::stderr)
                             .init();
}

fn main() -> ExitCode {
    init_dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cfg = LedgerConfig::from_env();
    let mut stdout = std::io::stdout().lock();
    match execute(&cli, &cfg, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            e.into()
        }
    }
}
