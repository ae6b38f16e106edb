//! Stage genérico: ejecuta `cmd` con `sh -c` en la raíz del workspace.
//!
//! El comando lee `params.yaml` y las dependencias directamente del disco y
//! escribe sus outputs ahí mismo. Antes de lanzarlo, los outputs declarados
//! se apartan; al terminar se leen los que el comando escribió y el
//! directorio vuelve a su estado previo. La escritura final queda a cargo del
//! engine, y un output que el comando no produjo llega como faltante.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use reg_core::errors::CoreEngineError;
use reg_core::model::{Artifact, ExecutionContext};
use reg_core::stage::{StageDeclaration, StageDefinition, StageRunResult};

pub struct CommandStage {
    decl: StageDeclaration,
}

impl CommandStage {
    pub fn new(decl: StageDeclaration) -> Self {
        Self { decl }
    }

    fn fail(&self, reason: impl Into<String>) -> StageRunResult {
        StageRunResult::Failure { error: CoreEngineError::StageFailed { stage: self.decl.name.clone(),
                                                                        reason: reason.into() } }
    }

    fn produced_paths(&self) -> impl Iterator<Item = &String> {
        self.decl.outs.iter().chain(self.decl.metrics.iter())
    }

    fn collect(&self, dir: &Path) -> Result<Vec<Artifact>, std::io::Error> {
        let mut outputs = Vec::new();
        for p in &self.decl.outs {
            if let Some(bytes) = read_optional(&dir.join(p))? {
                outputs.push(Artifact::output(p.clone(), bytes));
            }
        }
        for p in &self.decl.metrics {
            if let Some(bytes) = read_optional(&dir.join(p))? {
                outputs.push(Artifact::metrics(p.clone(), bytes));
            }
        }
        Ok(outputs)
    }

    fn spawn_and_collect(&self, dir: &Path) -> StageRunResult {
        log::debug!("sh -c {:?} in {}", self.decl.cmd, dir.display());
        let out = match Command::new("sh").arg("-c")
                                          .arg(&self.decl.cmd)
                                          .current_dir(dir)
                                          .env("REGFLOW_STAGE", &self.decl.name)
                                          .output()
        {
            Ok(o) => o,
            Err(e) => return self.fail(format!("could not spawn command: {e}")),
        };
        for line in String::from_utf8_lossy(&out.stdout).lines() {
            log::debug!("[{}] {line}", self.decl.name);
        }
        let stderr = String::from_utf8_lossy(&out.stderr);
        if !out.status.success() {
            let tail = stderr.lines().last().unwrap_or("").trim();
            return self.fail(format!("command exited with {}: {tail}", out.status));
        }
        for line in stderr.lines() {
            log::info!("[{}] {line}", self.decl.name);
        }
        match self.collect(dir) {
            Ok(outputs) => StageRunResult::Success { outputs },
            Err(e) => self.fail(format!("could not read outputs: {e}")),
        }
    }
}

/// Outputs previos movidos a un costado mientras corre el comando.
struct SetAside {
    entries: Vec<(PathBuf, Option<PathBuf>)>,
}

impl SetAside {
    fn new<'a>(dir: &Path, paths: impl Iterator<Item = &'a String>) -> Result<Self, std::io::Error> {
        let mut aside = Self { entries: Vec::new() };
        for rel in paths {
            let path = dir.join(rel);
            let backup = match fs::symlink_metadata(&path) {
                Ok(_) => {
                    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                    let backup = path.with_file_name(format!(".{name}.{}.prev", std::process::id()));
                    if let Err(e) = fs::rename(&path, &backup) {
                        aside.restore()?;
                        return Err(e);
                    }
                    Some(backup)
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => {
                    aside.restore()?;
                    return Err(e);
                }
            };
            aside.entries.push((path, backup));
        }
        Ok(aside)
    }

    /// Borra lo que haya escrito el comando y devuelve cada archivo previo a
    /// su lugar.
    fn restore(self) -> Result<(), std::io::Error> {
        for (path, backup) in self.entries {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
            if let Some(backup) = backup {
                fs::rename(&backup, &path)?;
            }
        }
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, std::io::Error> {
    match std::fs::read(path) {
        Ok(b) => Ok(Some(b)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

impl StageDefinition for CommandStage {
    fn declaration(&self) -> &StageDeclaration {
        &self.decl
    }

    fn run(&self, ctx: &ExecutionContext) -> StageRunResult {
        let Some(dir) = ctx.workdir.as_deref() else {
            return self.fail("shell commands need an on-disk workspace");
        };
        let aside = match SetAside::new(dir, self.produced_paths()) {
            Ok(a) => a,
            Err(e) => return self.fail(format!("could not set previous outputs aside: {e}")),
        };
        let result = self.spawn_and_collect(dir);
        if let Err(e) = aside.restore() {
            return self.fail(format!("could not restore previous outputs: {e}"));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(dir: Option<&Path>) -> ExecutionContext {
        ExecutionContext { stage: "echo".into(),
                           params: json!({}),
                           inputs: Default::default(),
                           workdir: dir.map(Path::to_path_buf) }
    }

    fn decl(cmd: &str) -> StageDeclaration {
        StageDeclaration::new("echo", cmd).with_outs(["out.txt"])
                                          .with_metrics(["metrics.yaml"])
    }

    #[test]
    fn reads_declared_outputs_back() {
        let dir = tempfile::tempdir().unwrap();
        let stage = CommandStage::new(decl("printf 'r2: 0.5\\n' > metrics.yaml && echo hi > out.txt && echo x > extra.txt"));
        let StageRunResult::Success { outputs } = stage.run(&ctx(Some(dir.path()))) else {
            panic!("expected success");
        };
        let paths: Vec<_> = outputs.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["out.txt", "metrics.yaml"]);
        assert_eq!(outputs[1].bytes, b"r2: 0.5\n");
        assert!(!dir.path().join("out.txt").exists());
        assert!(dir.path().join("extra.txt").exists());
    }

    #[test]
    fn previous_outputs_are_not_reported_as_new() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("out.txt"), "old model").unwrap();
        fs::write(dir.path().join("metrics.yaml"), "r2: 0.5\n").unwrap();
        let stage = CommandStage::new(decl("grep -q 'alpha: 1' params.yaml 2>/dev/null && echo new > out.txt; exit 0"));
        let StageRunResult::Success { outputs } = stage.run(&ctx(Some(dir.path()))) else {
            panic!("expected success");
        };
        assert!(outputs.is_empty());
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "old model");
        assert_eq!(fs::read_to_string(dir.path().join("metrics.yaml")).unwrap(), "r2: 0.5\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn failed_command_keeps_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("out.txt"), "old model").unwrap();
        let stage = CommandStage::new(decl("echo partial > out.txt; exit 1"));
        assert!(matches!(stage.run(&ctx(Some(dir.path()))), StageRunResult::Failure { .. }));
        assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "old model");
        assert!(!dir.path().join("metrics.yaml").exists());
    }

    #[test]
    fn missing_output_is_left_out() {
        let dir = tempfile::tempdir().unwrap();
        let stage = CommandStage::new(decl("echo hi > out.txt"));
        let StageRunResult::Success { outputs } = stage.run(&ctx(Some(dir.path()))) else {
            panic!("expected success");
        };
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn non_zero_exit_fails_with_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let stage = CommandStage::new(decl("echo boom >&2; exit 3"));
        match stage.run(&ctx(Some(dir.path()))) {
            StageRunResult::Failure { error: CoreEngineError::StageFailed { reason, .. } } => assert!(reason.contains("boom")),
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn needs_a_directory() {
        let stage = CommandStage::new(decl("true"));
        assert!(matches!(stage.run(&ctx(None)), StageRunResult::Failure { .. }));
    }
}
