//! Definición de argumentos (clap derive).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reg_adapters::{TrainOptions, DEFAULT_DATASET};

#[derive(Parser, Debug)]
#[command(name = "regflow", version, about = "Reproducible Elastic Net training runs", long_about = None)]
pub struct Cli {
    /// Raíz del workspace.
    #[arg(short = 'C', long, default_value = ".", global = true)]
    pub dir: PathBuf,

    /// Más detalle en el log (-v debug, -vv trace). `REGFLOW_LOG` tiene prioridad.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Escribe params.yaml y stages.yaml por defecto.
    Init {
        /// Genera además un dataset sintético 442 × 10.
        #[arg(long)]
        synthetic: bool,
        /// Sobrescribe archivos existentes.
        #[arg(long)]
        force: bool,
    },
    /// Entrena una vez y escribe modelo y métricas (sin registrar un run).
    Train(TrainArgs),
    /// Reproduce un stage si cambió alguna dependencia.
    Run(RunArgs),
    /// Informe de cambios respecto al último lock.
    Status {
        stage: Option<String>,
    },
    /// Tabla de runs con la fila `workspace` primero.
    Show {
        stage: Option<String>,
        #[arg(long)]
        json: bool,
        /// Ordena los runs por esta métrica (mayor primero).
        #[arg(long)]
        sort_by: Option<String>,
    },
    /// Restaura params, métricas y outputs de un run.
    Apply {
        id: String,
        #[arg(long)]
        force: bool,
    },
    /// Lista o vacía la cola.
    Queue {
        #[arg(long)]
        clear: bool,
    },
    /// Mejor run registrado según una métrica.
    Best {
        #[arg(long, default_value = "r2")]
        metric: String,
        /// Menor es mejor.
        #[arg(long)]
        lowest: bool,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    #[arg(long, default_value = "params.yaml")]
    pub params: String,
    #[arg(long, default_value = DEFAULT_DATASET)]
    pub dataset: String,
    #[arg(long, default_value = "model.bin")]
    pub model: String,
    #[arg(long, default_value = "metrics.yaml")]
    pub metrics: String,
    /// Centra y escala las features a norma unitaria al cargar.
    #[arg(long)]
    pub standardize: bool,
    #[arg(long, default_value_t = 0.25)]
    pub test_size: f64,
    #[arg(long, default_value_t = 0)]
    pub seed: u32,
}

impl TrainArgs {
    pub fn options(&self) -> TrainOptions {
        TrainOptions { dataset: self.dataset.clone(),
                       standardize: self.standardize,
                       test_size: self.test_size,
                       seed: self.seed }
    }
}

/// Envoltorio para parsear el `cmd` de una declaración `regflow train ...`.
#[derive(Parser, Debug)]
#[command(name = "train")]
pub struct TrainCommand {
    #[command(flatten)]
    pub args: TrainArgs,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    pub stage: Option<String>,
    /// Override `key=value`; repetible.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
    /// Nombre legible del run.
    #[arg(long)]
    pub name: Option<String>,
    /// Encola la variación en lugar de ejecutarla.
    #[arg(long)]
    pub queue: bool,
    /// Ejecuta todas las entradas encoladas.
    #[arg(long)]
    pub run_all: bool,
    /// Workers para --run-all (por defecto REGFLOW_JOBS).
    #[arg(short, long)]
    pub jobs: Option<usize>,
    /// Ejecuta aunque nada haya cambiado.
    #[arg(short, long)]
    pub force: bool,
}
