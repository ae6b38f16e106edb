use std::collections::BTreeMap;

use super::Workspace;
use crate::errors::CoreEngineError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryWorkspace {
    pub files: BTreeMap<String, Vec<u8>>,
}

impl InMemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), bytes.into());
        self
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path)
    }
}

impl Workspace for InMemoryWorkspace {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>, CoreEngineError> {
        Ok(self.files.get(path).cloned())
    }

    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<(), CoreEngineError> {
        self.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn fork(&self, exclude: &[String]) -> Result<Self, CoreEngineError> {
        let files = self.files
                        .iter()
                        .filter(|&(p, _)| !exclude.contains(p))
                        .map(|(p, b)| (p.clone(), b.clone()))
                        .collect();
        Ok(Self { files })
    }
}
