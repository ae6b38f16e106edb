use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use regflow_rust::config::CONFIG;
use regflow_rust::walkthrough::{self, WalkthroughConfig};
use tracing_subscriber::EnvFilter;

/// Recorrido completo: baseline, overrides, barrido encolado y apply del mejor run.
#[derive(Parser, Debug)]
#[command(name = "regflow-walkthrough", version, about)]
struct Args {
    /// Directorio del workspace (se crea si no existe).
    #[arg(default_value = "walkthrough")]
    dir: PathBuf,
    /// Workers del barrido (por defecto REGFLOW_JOBS).
    #[arg(short, long)]
    jobs: Option<usize>,
}

fn main() -> ExitCode {
    reg_persistence::init_dotenv();
    let filter = EnvFilter::try_from_env("REGFLOW_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_target(false)
                             .init();
    let args = Args::parse();

    let app = match CONFIG.as_ref() {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut cfg = WalkthroughConfig { ledger: app.ledger.clone(),
                                      data_seed: app.data_seed,
                                      ..WalkthroughConfig::default() };
    if let Some(jobs) = args.jobs {
        cfg.ledger.jobs = jobs.max(1);
    }
    match walkthrough::run(&args.dir, &cfg) {
        Ok(report) => {
            for s in &report.steps {
                println!("{:<14} {}  r2={:.6}", s.label, s.run_id, s.r2);
            }
            println!("best: {} ({}) r2={:.6}", report.best.label, report.best.run_id, report.best.r2);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
