//! Isolation forest outlier model.
//!
//! Points that are isolated by few random axis-aligned splits get a high
//! anomaly score. The decision threshold is the `(1 - contamination)`
//! quantile of the training scores.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::index::sample};
use serde::{Deserialize, Serialize};

use crate::monitor::{FEATURE_COUNT, FeatureRow};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub trees: usize,
    pub sample_size: usize,
    pub contamination: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

impl Node {
    fn path_length(&self, row: &FeatureRow, depth: f64) -> f64 {
        match self {
            Node::Leaf { size } => depth + average_path_length(*size),
            Node::Split {
                feature,
                value,
                left,
                right,
            } => {
                if row[*feature] < *value {
                    left.path_length(row, depth + 1.0)
                } else {
                    right.path_length(row, depth + 1.0)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
    threshold: f64,
}

impl IsolationForest {
    /// Fits the forest on `rows`. Returns `None` when there is nothing to
    /// learn from.
    pub fn fit(rows: &[FeatureRow], params: ForestParams) -> Option<Self> {
        if rows.is_empty() || params.trees == 0 {
            return None;
        }

        let sample_size = params.sample_size.max(2).min(rows.len());
        let height_limit = (sample_size.max(2) as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut trees = Vec::with_capacity(params.trees);
        for _ in 0..params.trees {
            let picked = sample(&mut rng, rows.len(), sample_size)
                .into_iter()
                .map(|index| rows[index])
                .collect::<Vec<_>>();
            trees.push(build_tree(&picked, 0, height_limit, &mut rng));
        }

        let mut forest = Self {
            trees,
            sample_size,
            threshold: 0.5,
        };

        let mut training_scores = rows.iter().map(|row| forest.score(row)).collect::<Vec<_>>();
        forest.threshold = quantile(&mut training_scores, 1.0 - params.contamination);
        Some(forest)
    }

    /// Anomaly score in (0, 1]; values near 1 are isolated quickly.
    pub fn score(&self, row: &FeatureRow) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        let mean_path = self
            .trees
            .iter()
            .map(|tree| tree.path_length(row, 0.0))
            .sum::<f64>()
            / self.trees.len() as f64;
        let normalizer = average_path_length(self.sample_size);
        if normalizer <= f64::EPSILON {
            return 0.5;
        }
        2f64.powf(-mean_path / normalizer)
    }

    pub fn is_anomalous(&self, row: &FeatureRow) -> bool {
        self.score(row) > self.threshold
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Rejects forests that would index outside a feature row or compare
    /// against a non-finite split.
    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        if !self.threshold.is_finite() {
            return Err(format!("threshold {} is not finite", self.threshold));
        }

        let mut pending = self.trees.iter().collect::<Vec<_>>();
        while let Some(node) = pending.pop() {
            if let Node::Split {
                feature,
                value,
                left,
                right,
            } = node
            {
                if *feature >= FEATURE_COUNT {
                    return Err(format!(
                        "split feature {} is out of range (max {})",
                        feature,
                        FEATURE_COUNT - 1
                    ));
                }
                if !value.is_finite() {
                    return Err(format!("split value {} is not finite", value));
                }
                pending.push(left);
                pending.push(right);
            }
        }
        Ok(())
    }
}

fn build_tree(rows: &[FeatureRow], depth: usize, height_limit: usize, rng: &mut StdRng) -> Node {
    if depth >= height_limit || rows.len() <= 1 {
        return Node::Leaf { size: rows.len() };
    }

    let spans = (0..FEATURE_COUNT)
        .filter_map(|feature| {
            let (min, max) = rows.iter().fold((f64::MAX, f64::MIN), |(min, max), row| {
                (min.min(row[feature]), max.max(row[feature]))
            });
            (max > min).then_some((feature, min, max))
        })
        .collect::<Vec<_>>();

    let Some(&(feature, min, max)) = spans.get(rng.gen_range(0..spans.len().max(1))) else {
        return Node::Leaf { size: rows.len() };
    };

    let value = rng.gen_range(min..max);
    let (left, right): (Vec<FeatureRow>, Vec<FeatureRow>) =
        rows.iter().partition(|row| row[feature] < value);

    Node::Split {
        feature,
        value,
        left: Box::new(build_tree(&left, depth + 1, height_limit, rng)),
        right: Box::new(build_tree(&right, depth + 1, height_limit, rng)),
    }
}

/// Expected path length of an unsuccessful BST search over `size` points.
fn average_path_length(size: usize) -> f64 {
    match size {
        0 | 1 => 0.0,
        2 => 1.0,
        n => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn quantile(values: &mut [f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.5;
    }
    values.sort_by(|left, right| left.total_cmp(right));

    let position = q.clamp(0.0, 1.0) * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    values[lower] * (1.0 - weight) + values[upper] * weight
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::{ForestParams, IsolationForest, average_path_length, quantile};
    use crate::monitor::FeatureRow;

    fn params() -> ForestParams {
        ForestParams {
            trees: 100,
            sample_size: 256,
            contamination: 0.05,
            seed: 42,
        }
    }

    fn normal_cluster(count: usize) -> Vec<FeatureRow> {
        let mut rng = StdRng::seed_from_u64(7);
        (0..count)
            .map(|_| {
                [
                    rng.gen_range(10.0..25.0),
                    rng.gen_range(35.0..50.0),
                    rng.gen_range(40.0..45.0),
                    rng.gen_range(180.0..220.0),
                    rng.gen_range(1.0e6..1.2e6),
                    rng.gen_range(2.0e6..2.4e6),
                    rng.gen_range(0.0..5.0),
                    rng.gen_range(38.0..45.0),
                ]
            })
            .collect()
    }

    #[test]
    fn clear_outlier_scores_above_threshold() {
        let rows = normal_cluster(500);
        let forest = IsolationForest::fit(&rows, params()).expect("forest should fit");

        let outlier = [99.0, 97.0, 44.0, 900.0, 9.0e6, 9.5e6, 95.0, 92.0];
        assert!(forest.is_anomalous(&outlier));
        assert!(forest.score(&outlier) > forest.score(&rows[0]));

        let flagged = rows.iter().filter(|row| forest.is_anomalous(row)).count();
        assert!(flagged <= 50, "too many training rows flagged: {}", flagged);
    }

    #[test]
    fn same_seed_gives_identical_scores() {
        let rows = normal_cluster(200);
        let first = IsolationForest::fit(&rows, params()).expect("forest should fit");
        let second = IsolationForest::fit(&rows, params()).expect("forest should fit");

        let point = [50.0, 60.0, 42.0, 300.0, 1.5e6, 2.5e6, 10.0, 50.0];
        assert_eq!(first.score(&point), second.score(&point));
        assert_eq!(first.threshold(), second.threshold());
    }

    #[test]
    fn sample_size_is_capped_by_row_count() {
        let rows = normal_cluster(40);
        let forest = IsolationForest::fit(&rows, params()).expect("forest should fit");
        assert_eq!(forest.sample_size(), 40);
        assert_eq!(forest.tree_count(), 100);
    }

    #[test]
    fn empty_input_cannot_be_fitted() {
        assert!(IsolationForest::fit(&[], params()).is_none());
    }

    #[test]
    fn constant_rows_produce_leaf_only_trees() {
        let rows = vec![[1.0; 8]; 16];
        let forest = IsolationForest::fit(&rows, params()).expect("forest should fit");
        let score = forest.score(&[1.0; 8]);
        assert!(score > 0.0 && score <= 1.0);
        assert!(!forest.is_anomalous(&[1.0; 8]));
    }

    #[test]
    fn average_path_length_matches_known_values() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!((average_path_length(256) - 10.244).abs() < 0.01);
    }

    #[test]
    fn quantile_interpolates_between_ranks() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&mut values, 0.0), 1.0);
        assert_eq!(quantile(&mut values, 1.0), 4.0);
        assert!((quantile(&mut values, 0.5) - 2.5).abs() < f64::EPSILON);
    }
}
