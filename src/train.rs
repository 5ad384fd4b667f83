//! Epoch-granular structured training.
//!
//! One epoch runs in a fixed order:
//!
//! 1. score every batch (temporal and causal, forward and flipped);
//! 2. aggregate the scores into one table per task;
//! 3. run global inference once over the whole epoch;
//! 4. compute the joint structured loss once;
//! 5. hand one [`UpdateStep`] to the scorer.
//!
//! The scorer is external and sits behind [`PairScorer`]. The trainer never
//! looks at features; it only routes instances to the scorer and gradients
//! back to it.

use crate::aggregate::{AggregatedScores, ScoreAggregator, ScoreBatch};
use crate::config::TrainConfig;
use crate::eval::{
    temporal_awareness, weighted_f1, AwarenessScore, ClassificationReport, EvalView,
    TemporalAwarenessEvaluator, TimexInput,
};
use crate::inference::{check_consistency, GlobalInference, InferenceStats};
use crate::loss::{hinge_gradient, joint_loss, JointLoss};
use crate::{
    Assignment, DatasetSchema, Error, LabelAlgebra, LabelId, Pair, Result, ScoreTable, Task,
};
use serde::{Deserialize, Serialize};

/// What an instance is labeled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    /// Temporal relation.
    Temporal,
    /// Causal relation.
    Causal,
    /// No label; never scored by the trainer.
    Unlabeled,
}

impl InstanceKind {
    fn task(self) -> Option<Task> {
        match self {
            InstanceKind::Temporal => Some(Task::Temporal),
            InstanceKind::Causal => Some(Task::Causal),
            InstanceKind::Unlabeled => None,
        }
    }
}

/// One event pair with its gold label and opaque scorer features.
///
/// `pair.reversed` marks a flipped copy: the scorer sees `(right, left)` and
/// `gold` is the label in that flipped orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance<F> {
    /// Pair identity as stored in the data.
    pub pair: Pair,
    /// Task of the gold label.
    pub kind: InstanceKind,
    /// Gold label id in the task's label space.
    pub gold: LabelId,
    /// Scorer input.
    pub features: F,
}

impl<F> Instance<F> {
    /// Create an instance.
    pub fn new(pair: Pair, kind: InstanceKind, gold: LabelId, features: F) -> Self {
        Self {
            pair,
            kind,
            gold,
            features,
        }
    }
}

/// Loss gradient of one task, one row per aggregated table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskGradient {
    /// Index into the epoch's instance slice for each row.
    pub instances: Vec<usize>,
    /// `∂loss / ∂score`, row-aligned with `instances`.
    pub gradient: ScoreTable,
}

impl TaskGradient {
    fn empty(n_labels: usize) -> Self {
        Self {
            instances: Vec::new(),
            gradient: ScoreTable::new(n_labels),
        }
    }
}

/// Everything the scorer needs for one parameter update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStep {
    /// Step size.
    pub learning_rate: f64,
    /// Momentum.
    pub momentum: f64,
    /// L2 weight decay.
    pub weight_decay: f64,
    /// Temporal gradient.
    pub temporal: TaskGradient,
    /// Causal gradient (empty when the causal task is inactive).
    pub causal: TaskGradient,
}

/// The external pair scorer.
pub trait PairScorer {
    /// Scorer input attached to each instance.
    type Features;

    /// One score row per instance, in input order, for `task`.
    ///
    /// `flip` is true when the instances are flipped copies.
    fn score(
        &mut self,
        batch: &[&Instance<Self::Features>],
        task: Task,
        flip: bool,
    ) -> Result<Vec<Vec<f64>>>;

    /// Apply one update. `data` is the slice the epoch was run on; the
    /// gradients index into it.
    fn apply_update(&mut self, step: &UpdateStep, data: &[Instance<Self::Features>]) -> Result<()>;
}

/// Summary of one training epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Joint structured loss.
    pub loss: JointLoss,
    /// Temporal rows in the epoch table.
    pub temporal_rows: usize,
    /// Causal rows in the epoch table.
    pub causal_rows: usize,
    /// Global inference statistics.
    pub inference: InferenceStats,
    /// Dev-set F1 after the update, if a dev set was given.
    pub dev_f1: Option<f64>,
}

/// Decoded output for a data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Aggregated tables with gold labels.
    pub scores: AggregatedScores,
    /// Globally decoded temporal labels.
    pub temporal: Assignment,
    /// Globally decoded causal labels.
    pub causal: Assignment,
}

/// Result of evaluating on a data set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Micro F1 under the default exclusions.
    pub f1: f64,
    /// Per-label breakdown.
    pub report: ClassificationReport,
}

/// Outcome of [`Trainer::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    /// Best dev F1 (0 without a dev set).
    pub best_f1: f64,
    /// Epoch that reached it (0 if none improved on 0).
    pub best_epoch: usize,
    /// One report per epoch.
    pub history: Vec<EpochReport>,
}

struct Collected {
    scores: AggregatedScores,
    // Instance index per aggregated row, by task.
    sources: [Vec<usize>; 2],
}

/// Drives a [`PairScorer`] through structured training.
#[derive(Debug)]
pub struct Trainer<S> {
    config: TrainConfig,
    algebra: LabelAlgebra,
    scorer: S,
}

impl<S: PairScorer> Trainer<S> {
    /// Validate the config and build the label algebra.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] from [`TrainConfig::validate`].
    pub fn new(config: TrainConfig, scorer: S) -> Result<Self> {
        config.validate()?;
        let algebra = LabelAlgebra::new(config.schema, config.joint);
        Ok(Self {
            config,
            algebra,
            scorer,
        })
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// The label algebra.
    #[must_use]
    pub fn algebra(&self) -> &LabelAlgebra {
        &self.algebra
    }

    /// The scorer.
    #[must_use]
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Consume the trainer and return the scorer.
    pub fn into_scorer(self) -> S {
        self.scorer
    }

    fn collect(&mut self, data: &[Instance<S::Features>]) -> Result<Collected> {
        let mut aggregator = ScoreAggregator::new(&self.algebra);
        // [task][flipped]
        let mut sources: [[Vec<usize>; 2]; 2] = Default::default();
        let mut unlabeled = 0usize;

        for (chunk_no, chunk) in data.chunks(self.config.batch_size).enumerate() {
            let offset = chunk_no * self.config.batch_size;
            for task in [Task::Temporal, Task::Causal] {
                if task == Task::Causal && !self.config.joint {
                    continue;
                }
                let n_labels = self.algebra.space(task)?.len();
                for flip in [false, true] {
                    let picked: Vec<usize> = chunk
                        .iter()
                        .enumerate()
                        .filter(|(_, x)| x.kind.task() == Some(task) && x.pair.reversed == flip)
                        .map(|(i, _)| offset + i)
                        .collect();
                    if picked.is_empty() {
                        continue;
                    }
                    let batch: Vec<&Instance<S::Features>> = picked.iter().map(|&i| &data[i]).collect();
                    let rows = self.scorer.score(&batch, task, flip)?;
                    Error::check_len(&format!("{task} scorer rows vs instances"), batch.len(), rows.len())?;
                    aggregator.push(ScoreBatch {
                        task,
                        reversed: flip,
                        pairs: batch
                            .iter()
                            .map(|x| Pair {
                                reversed: false,
                                ..x.pair.clone()
                            })
                            .collect(),
                        scores: ScoreTable::from_rows(&rows, n_labels)?,
                        gold: batch.iter().map(|x| x.gold).collect(),
                    })?;
                    sources[task_slot(task)][usize::from(flip)].extend(picked);
                }
            }
            unlabeled += chunk
                .iter()
                .filter(|x| x.kind == InstanceKind::Unlabeled)
                .count();
        }
        if unlabeled > 0 {
            log::debug!("{unlabeled} unlabeled instances not scored");
        }

        let scores = aggregator.finish()?;
        let [[t_fwd, t_rev], [c_fwd, c_rev]] = sources;
        Ok(Collected {
            scores,
            sources: [
                t_fwd.into_iter().chain(t_rev).collect(),
                c_fwd.into_iter().chain(c_rev).collect(),
            ],
        })
    }

    fn engine(&self) -> GlobalInference<'_> {
        GlobalInference::new(&self.algebra)
            .with_limits(self.config.solver.limits())
            .with_backend(self.config.solver.backend)
    }

    /// One full epoch: score, infer once, loss once, update once.
    ///
    /// # Errors
    ///
    /// Scorer failures, shape errors in its output, and global inference
    /// errors, including [`Error::SolverTimeout`].
    pub fn run_epoch(&mut self, epoch: usize, data: &[Instance<S::Features>]) -> Result<EpochReport> {
        let Collected { scores, sources } = self.collect(data)?;
        let (t, c) = (&scores.temporal, &scores.causal);

        let solved = self
            .engine()
            .solve(&t.pairs, &t.scores, &c.pairs, &c.scores)?;

        if log::log_enabled!(log::Level::Debug) {
            let local = Assignment::argmax(&t.scores);
            let local_c = Assignment::argmax(&c.scores);
            let report = check_consistency(&t.pairs, &local, &c.pairs, &local_c, &self.algebra)?;
            log::debug!(
                "epoch {epoch}: local decoding breaks {} constraints ({} transitivity)",
                report.violations.len(),
                report.transitivity_count()
            );
        }

        let margin = self.config.margin;
        let loss = joint_loss(
            &solved.temporal,
            &t.gold,
            &t.scores,
            &solved.causal,
            &c.gold,
            &c.scores,
            margin,
        )?;

        let temporal = TaskGradient {
            gradient: hinge_gradient(&solved.temporal, &t.gold, &t.scores, margin)?,
            instances: sources[0].clone(),
        };
        let causal = if c.is_empty() {
            TaskGradient::empty(c.scores.n_labels())
        } else {
            TaskGradient {
                gradient: hinge_gradient(&solved.causal, &c.gold, &c.scores, margin)?,
                instances: sources[1].clone(),
            }
        };
        let step = UpdateStep {
            learning_rate: self.config.learning_rate,
            momentum: self.config.momentum,
            weight_decay: self.config.weight_decay,
            temporal,
            causal,
        };
        self.scorer.apply_update(&step, data)?;

        log::info!(
            "epoch {epoch}: train loss {:.4} (temporal {:.4}, causal {:.4}) over {} + {} rows",
            loss.total,
            loss.temporal,
            loss.causal,
            t.len(),
            c.len()
        );
        Ok(EpochReport {
            epoch,
            loss,
            temporal_rows: t.len(),
            causal_rows: c.len(),
            inference: solved.stats,
            dev_f1: None,
        })
    }

    /// Score and globally decode a data set without updating the scorer.
    ///
    /// # Errors
    ///
    /// As [`Self::run_epoch`], minus the update.
    pub fn predict(&mut self, data: &[Instance<S::Features>]) -> Result<Prediction> {
        let Collected { scores, .. } = self.collect(data)?;
        let solved = self.engine().solve(
            &scores.temporal.pairs,
            &scores.temporal.scores,
            &scores.causal.pairs,
            &scores.causal.scores,
        )?;
        Ok(Prediction {
            scores,
            temporal: solved.temporal,
            causal: solved.causal,
        })
    }

    /// Temporal F1 and report of globally decoded predictions.
    pub fn evaluate(&mut self, data: &[Instance<S::Features>]) -> Result<Evaluation> {
        let prediction = self.predict(data)?;
        let space = self.algebra.temporal();
        let view = EvalView::select(
            &prediction.scores.temporal.pairs,
            prediction.temporal.labels(),
            &prediction.scores.temporal.gold,
            space,
            self.config.schema,
            self.config.backward_sample,
        )?;
        let f1 = weighted_f1(&view.pred, &view.gold, space)?;
        let report = ClassificationReport::new("global", &view.pred, &view.gold, space)?;
        Ok(Evaluation { f1, report })
    }

    /// Temporal awareness of globally decoded predictions.
    ///
    /// Flipped rows are left out when `backward_sample` is set. Timex edges
    /// reach the evaluator only with `eval_with_timex` on a TBD schema.
    pub fn awareness<E: TemporalAwarenessEvaluator + ?Sized>(
        &mut self,
        data: &[Instance<S::Features>],
        evaluator: &E,
        timex: Option<TimexInput<'_>>,
    ) -> Result<AwarenessScore> {
        let prediction = self.predict(data)?;
        let t = &prediction.scores.temporal;
        let rows: Vec<usize> = (0..t.len())
            .filter(|&r| !(self.config.backward_sample && t.pairs[r].reversed))
            .collect();
        let pairs: Vec<Pair> = rows.iter().map(|&r| t.pairs[r].clone()).collect();
        let gold: Vec<LabelId> = rows.iter().map(|&r| t.gold[r]).collect();
        let pred: Vec<LabelId> = rows.iter().map(|&r| prediction.temporal.label(r)).collect();

        let timex = if self.config.eval_with_timex { timex } else { None };
        if timex.is_some() && self.config.schema != DatasetSchema::Tbd {
            log::warn!(
                "timex edges ignored for schema {}; they only apply to tbd",
                self.config.schema
            );
        }
        temporal_awareness(
            evaluator,
            &pairs,
            &gold,
            &pred,
            self.algebra.temporal(),
            self.config.schema,
            timex,
        )
    }
}

impl<S: PairScorer + Clone> Trainer<S> {
    /// Train for `config.epochs` epochs.
    ///
    /// With a non-empty dev set, the scorer is evaluated after every epoch
    /// and the best one (strictly higher F1) is restored at the end. Without
    /// one, the last scorer is kept.
    pub fn fit(
        &mut self,
        train: &[Instance<S::Features>],
        dev: &[Instance<S::Features>],
    ) -> Result<FitSummary> {
        let mut best_f1 = 0.0;
        let mut best_epoch = 0;
        let mut best_scorer: Option<S> = None;
        let mut history = Vec::with_capacity(self.config.epochs);

        for epoch in 1..=self.config.epochs {
            let mut report = self.run_epoch(epoch, train)?;
            if !dev.is_empty() {
                let f1 = self.evaluate(dev)?.f1;
                log::info!("epoch {epoch}: dev F1 {f1:.4}");
                if f1 > best_f1 {
                    best_f1 = f1;
                    best_epoch = epoch;
                    best_scorer = Some(self.scorer.clone());
                }
                report.dev_f1 = Some(f1);
            }
            history.push(report);
        }

        if let Some(scorer) = best_scorer {
            self.scorer = scorer;
        }
        log::info!("best dev F1 {best_f1:.4} at epoch {best_epoch}");
        Ok(FitSummary {
            best_f1,
            best_epoch,
            history,
        })
    }
}

fn task_slot(task: Task) -> usize {
    match task {
        Task::Temporal => 0,
        Task::Causal => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scores are per-instance base rows plus a learned per-label bias.
    #[derive(Debug, Clone, Default)]
    struct BiasScorer {
        bias: Vec<f64>,
        bias_c: Vec<f64>,
        calls: Vec<(Task, bool, usize)>,
        updates: Vec<UpdateStep>,
    }

    impl BiasScorer {
        fn new(n: usize, n_c: usize) -> Self {
            Self {
                bias: vec![0.0; n],
                bias_c: vec![0.0; n_c],
                ..Self::default()
            }
        }
    }

    impl PairScorer for BiasScorer {
        type Features = Vec<f64>;

        fn score(&mut self, batch: &[&Instance<Vec<f64>>], task: Task, flip: bool) -> Result<Vec<Vec<f64>>> {
            self.calls.push((task, flip, batch.len()));
            let bias = match task {
                Task::Temporal => &self.bias,
                Task::Causal => &self.bias_c,
            };
            Ok(batch
                .iter()
                .map(|x| x.features.iter().zip(bias).map(|(f, b)| f + b).collect())
                .collect())
        }

        fn apply_update(&mut self, step: &UpdateStep, _: &[Instance<Vec<f64>>]) -> Result<()> {
            for row in step.temporal.gradient.rows() {
                for (b, g) in self.bias.iter_mut().zip(row) {
                    *b -= step.learning_rate * g;
                }
            }
            for row in step.causal.gradient.rows() {
                for (b, g) in self.bias_c.iter_mut().zip(row) {
                    *b -= step.learning_rate * g;
                }
            }
            self.updates.push(step.clone());
            Ok(())
        }
    }

    fn temporal(doc: &str, l: &str, r: &str, gold: usize, scores: [f64; 4]) -> Instance<Vec<f64>> {
        Instance::new(Pair::new(doc, l, r), InstanceKind::Temporal, gold, scores.to_vec())
    }

    fn config() -> TrainConfig {
        TrainConfig {
            epochs: 3,
            batch_size: 2,
            learning_rate: 1.0,
            backward_sample: false,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_epoch_scores_all_then_updates_once() {
        let data = vec![
            temporal("d", "a", "b", 0, [0.9, 0.0, 0.0, 0.0]),
            temporal("d", "b", "c", 0, [0.9, 0.0, 0.0, 0.0]),
            // Flipped copy of (b, c): recorded as (c, b), gold AFTER.
            Instance::new(
                Pair::new("d", "b", "c").with_reversed(true),
                InstanceKind::Temporal,
                1,
                vec![0.0, 0.8, 0.0, 0.0],
            ),
            Instance::new(Pair::new("d", "x", "y"), InstanceKind::Unlabeled, 0, vec![0.0; 4]),
        ];
        let mut trainer = Trainer::new(config(), BiasScorer::new(4, 0)).unwrap();
        let report = trainer.run_epoch(1, &data).unwrap();

        assert_eq!(report.temporal_rows, 3);
        assert_eq!(report.causal_rows, 0);
        assert_eq!(report.loss.causal, 0.0);
        let scorer = trainer.scorer();
        // Two chunks: [fwd, fwd] then [rev]; unlabeled never scored.
        assert_eq!(
            scorer.calls,
            vec![(Task::Temporal, false, 2), (Task::Temporal, true, 1)]
        );
        assert_eq!(scorer.updates.len(), 1);
        // Aggregated order is forward rows, then flipped rows.
        assert_eq!(scorer.updates[0].temporal.instances, vec![0, 1, 2]);
    }

    #[test]
    fn test_loss_zero_when_scores_agree_with_gold() {
        let data = vec![
            temporal("d", "a", "b", 0, [5.0, 0.0, 0.0, 0.0]),
            temporal("d", "b", "c", 0, [5.0, 0.0, 0.0, 0.0]),
            temporal("d", "a", "c", 0, [5.0, 0.0, 0.0, 0.0]),
        ];
        let mut trainer = Trainer::new(config(), BiasScorer::new(4, 0)).unwrap();
        let report = trainer.run_epoch(1, &data).unwrap();
        assert_eq!(report.loss.total, 0.0);
        assert!(trainer.scorer().bias.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_joint_epoch_routes_causal_rows() {
        let algebra = LabelAlgebra::joint(DatasetSchema::Tcr);
        let causes = algebra.space(Task::Causal).unwrap().id_of("CAUSES").unwrap();
        let data = vec![
            temporal("d", "a", "b", 0, [0.2, 0.6, 0.0, 0.0]),
            Instance::new(Pair::new("d", "a", "b"), InstanceKind::Causal, causes, vec![1.0, 0.0]),
        ];
        let cfg = TrainConfig {
            schema: DatasetSchema::Tcr,
            joint: true,
            ..config()
        };
        let mut trainer = Trainer::new(cfg, BiasScorer::new(4, 2)).unwrap();
        let report = trainer.run_epoch(1, &data).unwrap();
        assert_eq!(report.causal_rows, 1);
        assert!(report.inference.constraints.cross_task > 0);
        let step = &trainer.scorer().updates[0];
        assert_eq!(step.causal.instances, vec![1]);
        assert_eq!(step.temporal.instances, vec![0]);
    }

    #[test]
    fn test_causal_ignored_without_joint() {
        let data = vec![
            temporal("d", "a", "b", 0, [0.9, 0.0, 0.0, 0.0]),
            Instance::new(Pair::new("d", "a", "b"), InstanceKind::Causal, 0, vec![1.0, 0.0]),
        ];
        let mut trainer = Trainer::new(config(), BiasScorer::new(4, 2)).unwrap();
        let report = trainer.run_epoch(1, &data).unwrap();
        assert_eq!(report.causal_rows, 0);
        assert_eq!(trainer.scorer().calls.len(), 1);
    }

    #[test]
    fn test_bad_scorer_output_is_fatal() {
        #[derive(Clone)]
        struct Short;
        impl PairScorer for Short {
            type Features = ();
            fn score(&mut self, _: &[&Instance<()>], _: Task, _: bool) -> Result<Vec<Vec<f64>>> {
                Ok(vec![])
            }
            fn apply_update(&mut self, _: &UpdateStep, _: &[Instance<()>]) -> Result<()> {
                Ok(())
            }
        }
        let data = vec![Instance::new(Pair::new("d", "a", "b"), InstanceKind::Temporal, 0, ())];
        let mut trainer = Trainer::new(config(), Short).unwrap();
        assert!(matches!(
            trainer.run_epoch(1, &data),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_fit_learns_bias_and_keeps_best() {
        // Base scores prefer AFTER everywhere; gold is BEFORE.
        let train: Vec<_> = (0..4)
            .map(|i| temporal("t", &format!("e{i}"), &format!("f{i}"), 0, [0.0, 0.5, 0.0, 0.0]))
            .collect();
        let dev = vec![temporal("v", "a", "b", 0, [0.0, 0.5, 0.0, 0.0])];

        let mut trainer = Trainer::new(config(), BiasScorer::new(4, 0)).unwrap();
        let summary = trainer.fit(&train, &dev).unwrap();
        assert_eq!(summary.history.len(), 3);
        assert_eq!(summary.best_f1, 1.0);
        assert_eq!(summary.best_epoch, 1);
        assert_eq!(trainer.scorer().updates.len(), 1);
        assert!(trainer.scorer().bias[0] > trainer.scorer().bias[1]);
    }

    #[test]
    fn test_fit_without_dev_keeps_last() {
        let train = vec![temporal("t", "a", "b", 0, [0.0, 0.5, 0.0, 0.0])];
        let mut trainer = Trainer::new(config(), BiasScorer::new(4, 0)).unwrap();
        let summary = trainer.fit(&train, &[]).unwrap();
        assert_eq!(summary.best_epoch, 0);
        assert_eq!(summary.best_f1, 0.0);
        assert_eq!(trainer.scorer().updates.len(), 3);
    }

    #[test]
    fn test_awareness_honors_timex_flag() {
        use crate::eval::{RelationLists, TimexEdges};

        struct Counts;
        impl TemporalAwarenessEvaluator for Counts {
            fn evaluate(&self, lists: &RelationLists) -> Result<AwarenessScore> {
                Ok(AwarenessScore {
                    precision: lists.num_predicted() as f64,
                    recall: lists.num_gold() as f64,
                    f1: 0.0,
                })
            }
        }

        let data = vec![
            Instance::new(
                Pair::new("d", "a", "b"),
                InstanceKind::Temporal,
                0,
                vec![0.9, 0.0, 0.0, 0.0, 0.0, 0.0],
            ),
            Instance::new(
                Pair::new("d", "a", "b").with_reversed(true),
                InstanceKind::Temporal,
                1,
                vec![0.0, 0.9, 0.0, 0.0, 0.0, 0.0],
            ),
        ];
        let edges = TimexEdges::from_json_str(r#"{"d": [["a", "t0", "IS_INCLUDED"]]}"#).unwrap();
        let timex = TimexInput {
            gold: &edges,
            predicted: &edges,
        };

        let base = TrainConfig {
            schema: DatasetSchema::Tbd,
            backward_sample: true,
            ..config()
        };
        let mut off = Trainer::new(base.clone(), BiasScorer::new(6, 0)).unwrap();
        let score = off.awareness(&data, &Counts, Some(timex)).unwrap();
        // Flipped row dropped, timex ignored.
        assert_eq!((score.precision, score.recall), (1.0, 1.0));

        let cfg = TrainConfig {
            eval_with_timex: true,
            ..base
        };
        let mut on = Trainer::new(cfg, BiasScorer::new(6, 0)).unwrap();
        let score = on.awareness(&data, &Counts, Some(timex)).unwrap();
        assert_eq!((score.precision, score.recall), (2.0, 2.0));
    }

    #[test]
    fn test_evaluate_uses_view() {
        let algebra = LabelAlgebra::temporal_only(DatasetSchema::Matres);
        let vague = algebra.temporal().id_of("VAGUE").unwrap();
        let data = vec![
            temporal("d", "a", "b", 0, [0.9, 0.0, 0.0, 0.0]),
            temporal("d", "c", "e", vague, [0.9, 0.0, 0.0, 0.0]),
        ];
        let mut trainer = Trainer::new(config(), BiasScorer::new(4, 0)).unwrap();
        let eval = trainer.evaluate(&data).unwrap();
        assert_eq!(eval.f1, 1.0);
        assert_eq!(eval.report.total, 1);
    }
}
