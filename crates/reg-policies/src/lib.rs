//! reg-policies: selección determinista del mejor run registrado.
//!
//! La política ordena por una métrica (mayor o menor es mejor) y desempata
//! por id ascendente, de modo que el mismo ledger produce siempre la misma
//! decisión. Runs sin la métrica o con valor no finito se excluyen.

use reg_core::hashing::{hash_str, to_canonical_json};
use reg_core::ledger::RunRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("no run has a finite '{0}' metric")]
    NoCandidates(String),
    #[error("serialization: {0}")]
    Serialization(String),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Highest,
    Lowest,
}

/// Regla de desempate determinista.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TieRule {
    /// Id de run ascendente.
    #[default]
    ById,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SelectionParams {
    pub metric: String,
    pub direction: Direction,
    pub tie_break: TieRule,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self { metric: "r2".into(),
               direction: Direction::Highest,
               tie_break: TieRule::ById }
    }
}

impl SelectionParams {
    pub fn metric(metric: impl Into<String>, direction: Direction) -> Self {
        Self { metric: metric.into(),
               direction,
               ..Self::default() }
    }
}

/// Explicación tipada de la decisión.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rationale {
    pub params: SelectionParams,
    pub considered_n: usize,
    pub excluded: Vec<String>,
    pub ties: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SelectionDecision {
    pub selected_id: String,
    pub value: f64,
    pub policy_id: String,
    /// Hash canónico de los parámetros de la política.
    pub params_hash: String,
    pub rationale: Rationale,
}

pub trait RunSelectionPolicy {
    fn id(&self) -> &'static str;
    fn choose(&self, runs: &[RunRecord], params: &SelectionParams) -> Result<SelectionDecision, PolicyError>;
}

/// Mejor valor de la métrica, desempate por id.
#[derive(Debug, Default)]
pub struct BestMetricPolicy;

impl BestMetricPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl RunSelectionPolicy for BestMetricPolicy {
    fn id(&self) -> &'static str {
        "best_metric"
    }

    fn choose(&self, runs: &[RunRecord], params: &SelectionParams) -> Result<SelectionDecision, PolicyError> {
        let mut scored: Vec<(&RunRecord, f64)> = Vec::with_capacity(runs.len());
        let mut excluded = Vec::new();
        for r in runs {
            match r.metric(&params.metric).filter(|v| v.is_finite()) {
                Some(v) => scored.push((r, v)),
                None => excluded.push(r.id.clone()),
            }
        }

        scored.sort_by(|(ra, a), (rb, b)| {
                  let by_value = match params.direction {
                      Direction::Highest => b.total_cmp(a),
                      Direction::Lowest => a.total_cmp(b),
                  };
                  by_value.then_with(|| match params.tie_break {
                                         TieRule::ById => ra.id.cmp(&rb.id),
                                     })
              });

        let (best, value) = *scored.first()
                                   .ok_or_else(|| PolicyError::NoCandidates(params.metric.clone()))?;
        let ties = scored.iter()
                         .filter(|(_, v)| *v == value)
                         .map(|(r, _)| r.id.clone())
                         .collect();
        Ok(SelectionDecision { selected_id: best.id.clone(),
                               value,
                               policy_id: self.id().into(),
                               params_hash: params_hash(params)?,
                               rationale: Rationale { params: params.clone(),
                                                      considered_n: runs.len(),
                                                      excluded,
                                                      ties } })
    }
}

/// Hash canónico de parámetros.
pub fn params_hash(params: &SelectionParams) -> Result<String, PolicyError> {
    let v = serde_json::to_value(params).map_err(|e| PolicyError::Serialization(e.to_string()))?;
    Ok(hash_str(&to_canonical_json(&v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reg_core::model::StageLock;
    use std::collections::BTreeMap;

    fn run(id: &str, r2: Option<f64>) -> RunRecord {
        RunRecord { id: id.into(),
                    name: None,
                    stage: "train".into(),
                    fingerprint: "f".into(),
                    lock: StageLock::new("train", BTreeMap::new(), BTreeMap::new()),
                    params: Default::default(),
                    metrics: r2.map(|v| BTreeMap::from([("r2".to_string(), v)])).unwrap_or_default(),
                    outputs: BTreeMap::new(),
                    created_at: Utc::now(),
                    queue_entry: None }
    }

    #[test]
    fn highest_wins_and_ties_break_by_id() {
        let runs = vec![run("exp-c", Some(0.3)), run("exp-b", Some(0.38)), run("exp-a", Some(0.38)), run("exp-d", None)];
        let d = BestMetricPolicy::new().choose(&runs, &SelectionParams::default()).unwrap();
        assert_eq!(d.selected_id, "exp-a");
        assert_eq!(d.value, 0.38);
        assert_eq!(d.rationale.ties, vec!["exp-a", "exp-b"]);
        assert_eq!(d.rationale.excluded, vec!["exp-d"]);
        assert_eq!(d.rationale.considered_n, 4);
    }

    #[test]
    fn lowest_direction() {
        let runs = vec![run("exp-a", Some(0.3)), run("exp-b", Some(-1.0)), run("exp-c", Some(f64::NAN))];
        let params = SelectionParams::metric("r2", Direction::Lowest);
        let d = BestMetricPolicy::new().choose(&runs, &params).unwrap();
        assert_eq!(d.selected_id, "exp-b");
        assert_ne!(d.params_hash, params_hash(&SelectionParams::default()).unwrap());
    }

    #[test]
    fn no_candidates_is_an_error() {
        let err = BestMetricPolicy::new().choose(&[run("exp-a", None)], &SelectionParams::default())
                                         .unwrap_err();
        assert_eq!(err, PolicyError::NoCandidates("r2".into()));
    }
}
