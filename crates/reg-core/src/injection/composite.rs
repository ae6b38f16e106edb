use serde_json::Value;

use super::merge::merge_json;
use super::param_injector::ParamInjector;
use crate::model::ExecutionContext;

/// Aplica una serie de inyectores en orden: base -> injectors.
#[derive(Debug, Default)]
pub struct CompositeInjector {
    pub injectors: Vec<Box<dyn ParamInjector>>,
}

impl CompositeInjector {
    pub fn new() -> Self {
        Self { injectors: vec![] }
    }

    pub fn with_injectors(inj: Vec<Box<dyn ParamInjector>>) -> Self {
        Self { injectors: inj }
    }

    pub fn push(&mut self, inj: Box<dyn ParamInjector>) {
        self.injectors.push(inj);
    }

    pub fn apply(&self, base: &Value, ctx: &ExecutionContext) -> Value {
        Self::apply_injectors(&self.injectors, base, ctx)
    }

    /// Versión sin ownership, para callers que guardan sus propios inyectores.
    pub fn apply_injectors(injectors: &[Box<dyn ParamInjector>], base: &Value, ctx: &ExecutionContext) -> Value {
        let mut accumulated = base.clone();
        for inj in injectors.iter() {
            let v = inj.inject(&accumulated, ctx);
            accumulated = merge_json(&accumulated, &v);
        }
        accumulated
    }
}
