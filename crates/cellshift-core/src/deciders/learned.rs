//! Model-based decider.
//!
//! Feature layout for a snapshot with cells `c0 < c1 < ... < cn-1` (by cell id):
//!
//! ```text
//! [ d(c0,c1), d(c0,c2), ..., d(c0,cn-1), d(c1,c2), ..., d(cn-2,cn-1), loss_db ]
//! ```
//!
//! The inter-site part is the row-major upper triangle of the cell distance
//! matrix. It is the same for every terminal and is computed once per call.
//! The output vector is interpreted by the configured [`DecodeRule`].

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use super::decode::{DecodeRule, Target};
use crate::domain::{
    CellId, CellRecord, EngineError, HandoverDecision, InferenceFailure, MetricKind, Snapshot,
};
use crate::ports::{Decider, ModelLoader, Scorer};

pub const LEARNED_DECIDER_NAME: &str = "learned";

pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_millis(1000);

pub struct LearnedDecider {
    model: RwLock<Option<Arc<dyn Scorer>>>,
    decode: DecodeRule,
    inference_timeout: Duration,
}

impl LearnedDecider {
    /// An unbound decider. [`LearnedDecider::load`] or [`LearnedDecider::bind`]
    /// must succeed before it can decide anything.
    pub fn new(decode: DecodeRule, inference_timeout: Duration) -> Self {
        Self {
            model: RwLock::new(None),
            decode,
            inference_timeout,
        }
    }

    pub fn with_scorer(scorer: Arc<dyn Scorer>, decode: DecodeRule, inference_timeout: Duration) -> Self {
        let decider = Self::new(decode, inference_timeout);
        decider.bind(scorer);
        decider
    }

    /// Loads the artifact at `path` and binds it. On failure the previously
    /// bound model (if any) is kept.
    pub fn load(&self, path: &Path, loader: &dyn ModelLoader) -> Result<(), EngineError> {
        let scorer = loader.load(path).map_err(|e| {
            EngineError::Configuration(format!("cannot load model '{}': {e}", path.display()))
        })?;
        tracing::info!(path = %path.display(), "scoring model bound");
        self.bind(scorer);
        Ok(())
    }

    pub fn bind(&self, scorer: Arc<dyn Scorer>) {
        let mut slot = self.model.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(scorer);
    }

    pub fn unbind(&self) -> Option<Arc<dyn Scorer>> {
        let mut slot = self.model.write().unwrap_or_else(|e| e.into_inner());
        slot.take()
    }

    pub fn is_bound(&self) -> bool {
        self.model.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    fn scorer(&self) -> Result<Arc<dyn Scorer>, EngineError> {
        self.model
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| {
                EngineError::Configuration("no scoring model bound to the learned decider".into())
            })
    }
}

/// Row-major upper triangle of the distance matrix of `cells`.
pub fn inter_site_distances(cells: &[&CellRecord]) -> Vec<f64> {
    let n = cells.len();
    let mut distances = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for (i, a) in cells.iter().enumerate() {
        for b in &cells[i + 1..] {
            distances.push(a.position.distance_to(&b.position));
        }
    }
    distances
}

pub fn feature_vector(inter_site: &[f64], loss_db: f64) -> Vec<f64> {
    let mut features = Vec::with_capacity(inter_site.len() + 1);
    features.extend_from_slice(inter_site);
    features.push(loss_db);
    features
}

/// Runs `scorer` on the blocking pool, bounded by `timeout`.
///
/// A timed-out call keeps its blocking thread until the scorer returns; its
/// result is discarded.
async fn score_bounded(
    scorer: Arc<dyn Scorer>,
    features: Vec<f64>,
    timeout: Duration,
) -> Result<Vec<f64>, InferenceFailure> {
    let task = tokio::task::spawn_blocking(move || scorer.score(&features));
    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(InferenceFailure::TimedOut(timeout)),
        Ok(Err(join)) => Err(InferenceFailure::Aborted(join.to_string())),
        Ok(Ok(result)) => result.map_err(InferenceFailure::from),
    }
}

#[async_trait]
impl Decider for LearnedDecider {
    fn name(&self) -> &str {
        LEARNED_DECIDER_NAME
    }

    fn required_metric(&self) -> MetricKind {
        MetricKind::Loss
    }

    fn ensure_ready(&self) -> Result<(), EngineError> {
        self.scorer().map(|_| ())
    }

    async fn decide(&self, snapshot: &Snapshot) -> Result<Vec<HandoverDecision>, EngineError> {
        let scorer = self.scorer()?;

        let cells = snapshot.cells_by_id();
        if cells.is_empty() {
            tracing::debug!("no cells in snapshot, skipping inference");
            return Ok(Vec::new());
        }
        let cell_ids: Vec<CellId> = cells.iter().map(|c| c.cell_id).collect();
        let inter_site = inter_site_distances(&cells);

        let mut decisions = Vec::new();
        for terminal in snapshot.terminals() {
            let Some(loss_db) = terminal.metric.loss() else {
                continue;
            };
            let features = feature_vector(&inter_site, loss_db);

            let target = match score_bounded(scorer.clone(), features, self.inference_timeout).await {
                Ok(output) => self.decode.decode(&output, &cell_ids),
                Err(e) => Err(e),
            };
            let target = target.map_err(|source| {
                tracing::warn!(terminal = %terminal.node_id, error = %source, "inference failed");
                EngineError::Inference {
                    terminal: terminal.node_id.to_string(),
                    source,
                }
            })?;

            match target {
                Target::Hold => {
                    tracing::trace!(terminal = %terminal.node_id, "model holds serving cell");
                }
                Target::Cell(cell_id) => {
                    if let Some(decision) = HandoverDecision::between(terminal, cell_id) {
                        tracing::debug!(
                            terminal = %terminal.node_id,
                            serving = %terminal.serving_cell,
                            target = %cell_id,
                            "model recommends handover"
                        );
                        decisions.push(decision);
                    }
                }
            }
        }
        Ok(decisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellNodeId, Position, Rnti, TerminalNodeId, TerminalRecord};
    use crate::ports::ScoreError;
    use std::sync::Mutex;

    fn cell(id: u16, x: f64) -> CellRecord {
        CellRecord::new(CellNodeId::new(id as u64 * 10), CellId(id), Position::new(x, 0.0, 0.0))
    }

    fn terminal(node: u64, serving: u16, loss: f64) -> TerminalRecord {
        TerminalRecord::with_loss(TerminalNodeId::new(node), CellId(serving), Rnti(1), loss)
    }

    /// Records every feature vector and answers with a fixed output.
    struct RecordingScorer {
        output: Vec<f64>,
        seen: Mutex<Vec<Vec<f64>>>,
    }

    impl RecordingScorer {
        fn new(output: Vec<f64>) -> Arc<Self> {
            Arc::new(Self {
                output,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Scorer for RecordingScorer {
        fn score(&self, features: &[f64]) -> Result<Vec<f64>, ScoreError> {
            self.seen.lock().unwrap().push(features.to_vec());
            Ok(self.output.clone())
        }
    }

    struct FailingLoader;

    impl ModelLoader for FailingLoader {
        fn load(&self, path: &Path) -> Result<Arc<dyn Scorer>, ScoreError> {
            Err(ScoreError::Load {
                path: path.display().to_string(),
                detail: "missing".into(),
            })
        }
    }

    #[test]
    fn inter_site_distances_are_upper_triangle() {
        let (a, b, c) = (cell(1, 0.0), cell(2, 50.0), cell(3, 80.0));
        assert_eq!(inter_site_distances(&[&a, &b]), vec![50.0]);
        assert_eq!(inter_site_distances(&[&a, &b, &c]), vec![50.0, 80.0, 30.0]);
        assert!(inter_site_distances(&[&a]).is_empty());
    }

    #[tokio::test]
    async fn two_cells_fifty_metres_apart() {
        let scorer = RecordingScorer::new(vec![0.2, 0.8]);
        let decider = LearnedDecider::with_scorer(
            scorer.clone(),
            DecodeRule::ArgMaxCells,
            DEFAULT_INFERENCE_TIMEOUT,
        );
        let snapshot = Snapshot::new(vec![terminal(3, 1, 30.0)], vec![cell(1, 0.0), cell(2, 50.0)]);

        let decisions = decider.decide(&snapshot).await.unwrap();

        assert_eq!(scorer.seen.lock().unwrap().as_slice(), &[vec![50.0, 30.0]]);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].terminal, TerminalNodeId::new(3));
        assert_eq!(decisions[0].target_cell, CellId(2));
    }

    #[tokio::test]
    async fn recommendation_of_serving_cell_is_a_no_op() {
        let scorer = RecordingScorer::new(vec![0.2, 0.8]);
        let decider =
            LearnedDecider::with_scorer(scorer, DecodeRule::ArgMaxCells, DEFAULT_INFERENCE_TIMEOUT);
        let snapshot = Snapshot::new(vec![terminal(3, 2, 30.0)], vec![cell(1, 0.0), cell(2, 50.0)]);
        assert!(decider.decide(&snapshot).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn hold_class_emits_nothing() {
        let scorer = RecordingScorer::new(vec![0.9, 0.05, 0.05]);
        let decider =
            LearnedDecider::with_scorer(scorer, DecodeRule::ArgMaxWithHold, DEFAULT_INFERENCE_TIMEOUT);
        let snapshot = Snapshot::new(vec![terminal(3, 1, 30.0)], vec![cell(1, 0.0), cell(2, 50.0)]);
        assert!(decider.decide(&snapshot).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn features_do_not_depend_on_repository_order() {
        let scorer = RecordingScorer::new(vec![1.0, 0.0, 0.0]);
        let decider = LearnedDecider::with_scorer(
            scorer.clone(),
            DecodeRule::ArgMaxCells,
            DEFAULT_INFERENCE_TIMEOUT,
        );
        let shuffled = Snapshot::new(
            vec![terminal(1, 1, 10.0)],
            vec![cell(3, 80.0), cell(1, 0.0), cell(2, 50.0)],
        );
        decider.decide(&shuffled).await.unwrap();
        assert_eq!(scorer.seen.lock().unwrap()[0], vec![50.0, 80.0, 30.0, 10.0]);
    }

    #[tokio::test]
    async fn unbound_decider_is_a_configuration_error() {
        let decider = LearnedDecider::new(DecodeRule::ArgMaxCells, DEFAULT_INFERENCE_TIMEOUT);
        assert!(!decider.is_bound());
        assert!(matches!(decider.ensure_ready(), Err(EngineError::Configuration(_))));

        let snapshot = Snapshot::new(vec![terminal(1, 1, 10.0)], vec![cell(1, 0.0)]);
        assert!(matches!(
            decider.decide(&snapshot).await,
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn failed_load_keeps_decider_unbound() {
        let decider = LearnedDecider::new(DecodeRule::ArgMaxCells, DEFAULT_INFERENCE_TIMEOUT);
        let err = decider.load(Path::new("/nope/model.json"), &FailingLoader).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
        assert!(!decider.is_bound());
    }

    #[test]
    fn unbind_releases_the_model() {
        let decider = LearnedDecider::with_scorer(
            RecordingScorer::new(vec![1.0]),
            DecodeRule::ArgMaxCells,
            DEFAULT_INFERENCE_TIMEOUT,
        );
        assert!(decider.is_bound());
        assert!(decider.unbind().is_some());
        assert!(!decider.is_bound());
    }

    #[tokio::test]
    async fn slow_scorer_times_out() {
        let slow = Arc::new(|_: &[f64]| {
            std::thread::sleep(Duration::from_millis(300));
            Ok::<_, ScoreError>(vec![1.0, 0.0])
        });
        let decider =
            LearnedDecider::with_scorer(slow, DecodeRule::ArgMaxCells, Duration::from_millis(20));
        let snapshot = Snapshot::new(vec![terminal(1, 2, 10.0)], vec![cell(1, 0.0), cell(2, 5.0)]);

        let err = decider.decide(&snapshot).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Inference {
                source: InferenceFailure::TimedOut(_),
                ..
            }
        ));
        assert!(err.is_recoverable());
        // still bound for the next invocation
        assert!(decider.ensure_ready().is_ok());
    }

    #[tokio::test]
    async fn scorer_error_aborts_whole_call() {
        let broken = Arc::new(|_: &[f64]| Err::<Vec<f64>, _>(ScoreError::Other("boom".into())));
        let decider =
            LearnedDecider::with_scorer(broken, DecodeRule::ArgMaxCells, DEFAULT_INFERENCE_TIMEOUT);
        let snapshot = Snapshot::new(
            vec![terminal(1, 2, 10.0), terminal(2, 2, 20.0)],
            vec![cell(1, 0.0), cell(2, 5.0)],
        );
        assert!(matches!(
            decider.decide(&snapshot).await,
            Err(EngineError::Inference {
                source: InferenceFailure::Scorer(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn malformed_output_is_inference_failure() {
        let decider = LearnedDecider::with_scorer(
            RecordingScorer::new(vec![1.0, 0.0, 0.0]),
            DecodeRule::ArgMaxCells,
            DEFAULT_INFERENCE_TIMEOUT,
        );
        let snapshot = Snapshot::new(vec![terminal(1, 2, 10.0)], vec![cell(1, 0.0), cell(2, 5.0)]);
        assert!(matches!(
            decider.decide(&snapshot).await,
            Err(EngineError::Inference {
                source: InferenceFailure::OutputLength { expected: 2, actual: 3 },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn no_cells_skips_the_scorer() {
        let scorer = RecordingScorer::new(vec![]);
        let decider = LearnedDecider::with_scorer(
            scorer.clone(),
            DecodeRule::ArgMaxCells,
            DEFAULT_INFERENCE_TIMEOUT,
        );
        let snapshot = Snapshot::new(vec![terminal(1, 2, 10.0)], vec![]);
        assert!(decider.decide(&snapshot).await.unwrap().is_empty());
        assert!(scorer.seen.lock().unwrap().is_empty());
    }
}
