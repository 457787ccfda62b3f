//! Half-space trees: a streaming anomaly scorer.
//!
//! Every tree splits the normalised feature space at random. Node masses
//! are counted in a "latest" window; once the window fills they become the
//! reference masses the next window is scored against. A point that lands
//! in sparsely populated regions of the reference window scores close to 1.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::monitor::{FEATURE_COUNT, FeatureRow, Metric};

const SPLIT_PADDING: f64 = 0.15;

/// Incrementally trained anomaly scorer.
pub trait OnlineScorer: Send {
    fn learn_one(&mut self, row: &FeatureRow);

    /// Score in [0, 1]; higher is more anomalous.
    fn score_one(&self, row: &FeatureRow) -> f64;

    /// Observations still needed before scores become meaningful.
    fn warmup_remaining(&self) -> u32 {
        0
    }

    /// Learns from `row`, then scores the same row.
    fn learn_then_score(&mut self, row: &FeatureRow) -> f64 {
        self.learn_one(row);
        self.score_one(row)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HalfSpaceParams {
    pub trees: usize,
    pub height: u32,
    pub window_size: u32,
    pub seed: u64,
}

/// Per-feature value range used to map raw readings into [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct FeatureLimits {
    bounds: [(f64, f64); FEATURE_COUNT],
}

impl FeatureLimits {
    pub fn new(bounds: [(f64, f64); FEATURE_COUNT]) -> Self {
        Self { bounds }
    }

    fn normalize(&self, row: &FeatureRow) -> FeatureRow {
        let mut out = [0.0; FEATURE_COUNT];
        for (index, value) in row.iter().enumerate() {
            let (low, high) = self.bounds[index];
            let span = high - low;
            out[index] = if span > f64::EPSILON && value.is_finite() {
                ((value - low) / span).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
        out
    }
}

impl Default for FeatureLimits {
    fn default() -> Self {
        let mut bounds = [(0.0, 100.0); FEATURE_COUNT];
        bounds[Metric::RunningProcesses.index()] = (0.0, 2_000.0);
        bounds[Metric::NetworkSent.index()] = (0.0, 1.0e12);
        bounds[Metric::NetworkRecv.index()] = (0.0, 1.0e12);
        bounds[Metric::Temperature.index()] = (0.0, 110.0);
        Self { bounds }
    }
}

#[derive(Debug, Clone)]
struct HstNode {
    feature: usize,
    threshold: f64,
    children: Option<(usize, usize)>,
    reference_mass: u32,
    latest_mass: u32,
}

#[derive(Debug, Clone)]
struct HalfSpaceTree {
    nodes: Vec<HstNode>,
}

impl HalfSpaceTree {
    fn grow(height: u32, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let mut bounds = [(0.0, 1.0); FEATURE_COUNT];
        tree.grow_node(height, &mut bounds, rng);
        tree
    }

    fn grow_node(
        &mut self,
        remaining: u32,
        bounds: &mut [(f64, f64); FEATURE_COUNT],
        rng: &mut StdRng,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(HstNode {
            feature: 0,
            threshold: 0.0,
            children: None,
            reference_mass: 0,
            latest_mass: 0,
        });
        if remaining == 0 {
            return index;
        }

        let feature = pick_weighted_feature(bounds, rng);
        let (low, high) = bounds[feature];
        let padding = SPLIT_PADDING * (high - low);
        let threshold = if high - 2.0 * padding > low + padding {
            rng.gen_range((low + padding)..(high - padding))
        } else {
            (low + high) / 2.0
        };

        bounds[feature] = (low, threshold);
        let left = self.grow_node(remaining - 1, bounds, rng);
        bounds[feature] = (threshold, high);
        let right = self.grow_node(remaining - 1, bounds, rng);
        bounds[feature] = (low, high);

        let node = &mut self.nodes[index];
        node.feature = feature;
        node.threshold = threshold;
        node.children = Some((left, right));
        index
    }

    /// Node indices from the root down to the leaf `row` falls into.
    fn walk<'a>(&'a self, row: &'a FeatureRow) -> impl Iterator<Item = usize> + 'a {
        let mut next = Some(0);
        std::iter::from_fn(move || {
            let current = next?;
            let node = &self.nodes[current];
            next = node.children.map(|(left, right)| {
                if row[node.feature] < node.threshold {
                    left
                } else {
                    right
                }
            });
            Some(current)
        })
    }

    fn rotate_window(&mut self) {
        for node in &mut self.nodes {
            node.reference_mass = node.latest_mass;
            node.latest_mass = 0;
        }
    }
}

fn pick_weighted_feature(bounds: &[(f64, f64); FEATURE_COUNT], rng: &mut StdRng) -> usize {
    let total = bounds.iter().map(|(low, high)| high - low).sum::<f64>();
    if total <= f64::EPSILON {
        return rng.gen_range(0..FEATURE_COUNT);
    }

    let mut target = rng.gen_range(0.0..total);
    for (feature, (low, high)) in bounds.iter().enumerate() {
        let width = high - low;
        if target < width {
            return feature;
        }
        target -= width;
    }
    FEATURE_COUNT - 1
}

#[derive(Debug, Clone)]
pub struct HalfSpaceTrees {
    trees: Vec<HalfSpaceTree>,
    limits: FeatureLimits,
    height: u32,
    window_size: u32,
    observed_in_window: u32,
    first_window: bool,
}

impl HalfSpaceTrees {
    pub fn new(params: HalfSpaceParams, limits: FeatureLimits) -> Self {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let trees = (0..params.trees.max(1))
            .map(|_| HalfSpaceTree::grow(params.height, &mut rng))
            .collect();

        Self {
            trees,
            limits,
            height: params.height,
            window_size: params.window_size.max(1),
            observed_in_window: 0,
            first_window: true,
        }
    }

    fn max_score(&self) -> f64 {
        let per_tree = f64::from(self.window_size) * (2f64.powi(self.height as i32 + 1) - 1.0);
        per_tree * self.trees.len() as f64
    }

    fn size_limit(&self) -> f64 {
        0.1 * f64::from(self.window_size)
    }
}

impl OnlineScorer for HalfSpaceTrees {
    fn warmup_remaining(&self) -> u32 {
        if self.first_window {
            self.window_size - self.observed_in_window
        } else {
            0
        }
    }

    fn learn_one(&mut self, row: &FeatureRow) {
        let normalized = self.limits.normalize(row);
        for tree in &mut self.trees {
            let path = tree.walk(&normalized).collect::<Vec<_>>();
            for index in path {
                tree.nodes[index].latest_mass += 1;
            }
        }

        self.observed_in_window += 1;
        if self.observed_in_window >= self.window_size {
            for tree in &mut self.trees {
                tree.rotate_window();
            }
            self.observed_in_window = 0;
            self.first_window = false;
        }
    }

    fn score_one(&self, row: &FeatureRow) -> f64 {
        if self.first_window {
            return 0.0;
        }

        let normalized = self.limits.normalize(row);
        let size_limit = self.size_limit();
        let mut mass_score = 0.0;
        for tree in &self.trees {
            for (depth, index) in tree.walk(&normalized).enumerate() {
                let mass = f64::from(tree.nodes[index].reference_mass);
                mass_score += mass * 2f64.powi(depth as i32);
                if mass < size_limit {
                    break;
                }
            }
        }

        (1.0 - mass_score / self.max_score()).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureLimits, HalfSpaceParams, HalfSpaceTrees, OnlineScorer};
    use crate::monitor::FeatureRow;

    fn scorer(window_size: u32) -> HalfSpaceTrees {
        HalfSpaceTrees::new(
            HalfSpaceParams {
                trees: 10,
                height: 8,
                window_size,
                seed: 42,
            },
            FeatureLimits::default(),
        )
    }

    fn quiet_row(step: usize) -> FeatureRow {
        let wobble = (step % 5) as f64;
        [
            12.0 + wobble,
            40.0 + wobble,
            55.0,
            210.0,
            1.0e6,
            2.0e6,
            3.0,
            41.0,
        ]
    }

    #[test]
    fn first_window_scores_zero() {
        let mut scorer = scorer(20);
        for step in 0..19 {
            assert_eq!(scorer.learn_then_score(&quiet_row(step)), 0.0);
        }
        assert_eq!(scorer.warmup_remaining(), 1);
    }

    #[test]
    fn unseen_region_scores_higher_than_familiar_one() {
        let mut scorer = scorer(50);
        for step in 0..120 {
            scorer.learn_one(&quiet_row(step));
        }

        let familiar = scorer.score_one(&quiet_row(3));
        let storm = scorer.score_one(&[99.0, 97.0, 95.0, 1_900.0, 9.0e11, 9.0e11, 98.0, 105.0]);
        assert!(storm > familiar, "storm={} familiar={}", storm, familiar);
        assert!(storm > 0.8, "storm={}", storm);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let mut scorer = scorer(10);
        for step in 0..200 {
            let spike = if step % 17 == 0 { 95.0 } else { 10.0 };
            let mut row = quiet_row(step);
            row[0] = spike;
            let score = scorer.learn_then_score(&row);
            assert!((0.0..=1.0).contains(&score), "score out of range: {}", score);
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let mut first = scorer(10);
        let mut second = scorer(10);
        for step in 0..40 {
            let row = quiet_row(step);
            assert_eq!(first.learn_then_score(&row), second.learn_then_score(&row));
        }
    }
}
