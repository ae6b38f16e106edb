//! Armado del engine a partir de `stages.yaml`.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use reg_adapters::{CommandStage, TrainStage};
use reg_core::stage::{PipelineFile, StageDeclaration, StageDefinition};
use reg_core::CoreEngineError;
use reg_persistence::{open_engine, FileEngine, LedgerConfig};

use crate::cli::TrainCommand;
use crate::error::CliError;

pub const PIPELINE_FILE: &str = "stages.yaml";
const TRAIN_PREFIX: [&str; 2] = ["regflow", "train"];

pub fn load_pipeline(dir: &Path) -> Result<PipelineFile, CliError> {
    let path = dir.join(PIPELINE_FILE);
    let text = std::fs::read_to_string(&path).map_err(|e| {
                                                 CliError::Usage(format!("cannot read {}: {e} (run `regflow init` first)",
                                                                         path.display()))
                                             })?;
    Ok(PipelineFile::from_yaml_str(&text)?)
}

/// `regflow train ...` se ejecuta en proceso; cualquier otro comando va por
/// `sh -c`.
pub fn resolve_stage(decl: &StageDeclaration) -> Result<Arc<dyn StageDefinition>, CliError> {
    let words: Vec<&str> = decl.cmd.split_whitespace().collect();
    if words.len() < 2 || words[..2] != TRAIN_PREFIX {
        log::debug!("stage '{}' runs through the shell", decl.name);
        return Ok(Arc::new(CommandStage::new(decl.clone())));
    }
    let parsed = TrainCommand::try_parse_from(&words[1..]).map_err(|e| {
                                                               CoreEngineError::InvalidDeclaration(format!("stage '{}': {}",
                                                                                                           decl.name,
                                                                                                           e.to_string().trim()))
                                                           })?;
    let args = parsed.args;
    let mismatch = |what: &str, cmd: &str, declared: Option<&String>| {
        CoreEngineError::InvalidDeclaration(format!("stage '{}': cmd writes {what} '{cmd}' but the declaration has {:?}",
                                                    decl.name, declared))
    };
    if decl.outs.first() != Some(&args.model) {
        return Err(mismatch("model", &args.model, decl.outs.first()).into());
    }
    if decl.metrics.first() != Some(&args.metrics) {
        return Err(mismatch("metrics", &args.metrics, decl.metrics.first()).into());
    }
    if decl.params_file != args.params {
        return Err(mismatch("params", &args.params, Some(&decl.params_file)).into());
    }
    Ok(Arc::new(TrainStage::new(decl.clone(), args.options())?))
}

/// Abre el directorio de estado y registra todos los stages declarados.
pub fn open(dir: &Path, cfg: &LedgerConfig) -> Result<FileEngine, CliError> {
    let pipeline = load_pipeline(dir)?;
    let mut engine = open_engine(dir, cfg)?;
    for decl in pipeline.stages.values() {
        engine.register_stage(resolve_stage(decl)?)?;
    }
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reg_adapters::default_train_declaration;

    #[test]
    fn default_declaration_runs_in_process() {
        let stage = resolve_stage(&default_train_declaration()).unwrap();
        assert_eq!(stage.name(), "train");
    }

    #[test]
    fn mismatched_model_path_is_rejected() {
        let decl = default_train_declaration().with_outs(["other.bin"]);
        let err = resolve_stage(&decl).err().unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unknown_train_flag_is_a_declaration_error() {
        let mut decl = default_train_declaration();
        decl.cmd = "regflow train --bogus".into();
        assert!(matches!(resolve_stage(&decl), Err(CliError::Core(CoreEngineError::InvalidDeclaration(_)))));
    }

    #[test]
    fn other_commands_use_the_shell() {
        let decl = StageDeclaration::new("echo", "python train.py").with_outs(["m.bin"]);
        assert!(resolve_stage(&decl).is_ok());
    }
}
