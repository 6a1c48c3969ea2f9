use serde::Serialize;
use thiserror::Error;

use crate::{artifacts::RunId, error::PipelineError};

/// How a run concluded.
///
/// There are two ways to learn that a problem is unsatisfiable, and they are kept apart: when the
/// encoder already refutes the problem there is no solution list at all, when the solver refutes
/// the CNF the solution list is empty. See [`Outcome::solution`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// One value per variable, in declaration order.
    Satisfiable(Vec<i64>),
    UnsatisfiableAtEncoding,
    UnsatisfiableAtSolving,
}

impl Outcome {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, Outcome::Satisfiable(_))
    }

    /// The solution list: the values for a satisfiable run, an empty list when the solver found
    /// no model, and nothing when the encoder refuted the problem.
    pub fn solution(&self) -> Option<&[i64]> {
        match self {
            Outcome::Satisfiable(values) => Some(values.as_slice()),
            Outcome::UnsatisfiableAtSolving => Some(&[][..]),
            Outcome::UnsatisfiableAtEncoding => None,
        }
    }
}

/// Timings (in seconds) and file sizes (in bytes) collected during a run. A field is `None` when
/// the run did not get to the point of measuring it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_csp_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csp_file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csp_to_cnf_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnf_file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver_cpu_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_time: Option<f64>,
}

/// The result of a completed run.
#[derive(Clone, Debug)]
pub struct Report {
    pub run_id: RunId,
    pub outcome: Outcome,
    pub metrics: Metrics,
}

/// A run that was aborted. The metrics hold what was measured before the failure.
#[derive(Debug, Error)]
#[error("run {run_id} failed")]
pub struct RunFailure {
    pub run_id: RunId,
    #[source]
    pub error: PipelineError,
    pub metrics: Metrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsatisfiable_outcomes_differ_in_their_solution_list() {
        assert_eq!(None, Outcome::UnsatisfiableAtEncoding.solution());
        assert_eq!(Some(&[][..]), Outcome::UnsatisfiableAtSolving.solution());
        assert_ne!(
            Outcome::UnsatisfiableAtEncoding,
            Outcome::UnsatisfiableAtSolving
        );
    }

    #[test]
    fn satisfiable_outcome_holds_the_values() {
        let outcome = Outcome::Satisfiable(vec![2, 2]);

        assert!(outcome.is_satisfiable());
        assert_eq!(Some(&[2, 2][..]), outcome.solution());
    }

    #[test]
    fn unmeasured_metrics_are_left_out() {
        let metrics = Metrics {
            csp_to_cnf_time: Some(0.5),
            cnf_file_size: Some(12),
            ..Metrics::default()
        };

        let json = serde_json::to_value(&metrics).expect("serializable");

        assert_eq!(
            serde_json::json!({ "csp_to_cnf_time": 0.5, "cnf_file_size": 12 }),
            json
        );
    }
}
