//! CART (Classification and Regression Tree) builder
//!
//! Grows one regression tree by exact-greedy search over squared-error
//! splits. Each feature's sample order is sorted once at the root and
//! partitioned stably on the way down, so no node re-sorts.

use rand::seq::index;
use rand::Rng;
use vgsales_core::{ForestConfig, Node, Tree};

/// Node squared error at or below which a node is treated as pure
const PURE_SSE: f64 = 1e-12;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

impl From<&ForestConfig> for TreeConfig {
    fn from(config: &ForestConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf.max(1),
            max_features: config.max_features,
        }
    }
}

/// A grown tree plus the squared-error decrease credited to each feature
#[derive(Debug, Clone)]
pub struct GrownTree {
    pub tree: Tree,
    /// Normalized to sum to 1, or all zero if the tree never split
    pub importances: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    decrease: f64,
}

/// Build a regression tree over a (possibly repeated) selection of rows
pub struct CartBuilder<'a> {
    config: &'a TreeConfig,
    /// Column-major copy of the sampled rows
    columns: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl<'a> CartBuilder<'a> {
    /// Gather `rows` of `features`/`targets` into a training sample.
    ///
    /// Rows may repeat, as they do in a bootstrap sample.
    pub fn new(
        features: &[Vec<f64>],
        targets: &[f64],
        rows: &[usize],
        config: &'a TreeConfig,
    ) -> Self {
        assert_eq!(features.len(), targets.len());

        let feature_count = features.first().map_or(0, Vec::len);
        let columns = (0..feature_count)
            .map(|f| rows.iter().map(|&r| features[r][f]).collect())
            .collect();
        let targets = rows.iter().map(|&r| targets[r]).collect();

        Self {
            config,
            columns,
            targets,
        }
    }

    /// Build tree and return it with its feature importances
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> GrownTree {
        let sample_count = self.targets.len();
        let mut nodes = Vec::new();
        let mut importances = vec![0.0; self.columns.len()];

        if self.columns.is_empty() || sample_count == 0 {
            let all: Vec<usize> = (0..sample_count).collect();
            nodes.push(Node::leaf(0, self.node_stats(&all).0));
            return GrownTree {
                tree: Tree::new(nodes),
                importances,
            };
        }

        let sorted: Vec<Vec<usize>> = self
            .columns
            .iter()
            .map(|column| {
                let mut order: Vec<usize> = (0..sample_count).collect();
                order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
                order
            })
            .collect();

        let mut goes_left = vec![false; sample_count];
        self.grow(sorted, 0, &mut nodes, &mut importances, &mut goes_left, rng);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        GrownTree {
            tree: Tree::new(nodes),
            importances,
        }
    }

    /// Recursively build tree nodes; returns the index of the new node
    fn grow<R: Rng + ?Sized>(
        &self,
        sorted: Vec<Vec<usize>>,
        depth: usize,
        nodes: &mut Vec<Node>,
        importances: &mut [f64],
        goes_left: &mut [bool],
        rng: &mut R,
    ) -> i32 {
        let id = nodes.len() as i32;
        let members = &sorted[0];
        let n = members.len();
        let (mean, sse) = self.node_stats(members);

        let splittable = n >= self.config.min_samples_split
            && n >= 2 * self.config.min_samples_leaf
            && self.config.max_depth.map_or(true, |max| depth < max)
            && sse > PURE_SSE;

        let split = if splittable {
            self.find_best_split(&sorted, sse, rng)
        } else {
            None
        };
        let Some(split) = split else {
            nodes.push(Node::leaf(id, mean));
            return id;
        };

        importances[split.feature_idx] += split.decrease.max(0.0);

        let column = &self.columns[split.feature_idx];
        for &pos in members {
            goes_left[pos] = column[pos] <= split.threshold;
        }
        let (left, right): (Vec<Vec<usize>>, Vec<Vec<usize>>) = sorted
            .into_iter()
            .map(|order| order.into_iter().partition::<Vec<usize>, _>(|&p| goes_left[p]))
            .unzip();

        // Reserve the slot; children are filled in below
        nodes.push(Node::internal(
            id,
            split.feature_idx as i32,
            split.threshold,
            -1,
            -1,
        ));

        let left_id = self.grow(left, depth + 1, nodes, importances, goes_left, rng);
        let right_id = self.grow(right, depth + 1, nodes, importances, goes_left, rng);

        nodes[id as usize].left = left_id;
        nodes[id as usize].right = right_id;

        id
    }

    /// Best split over a random subset of `max_features` features
    fn find_best_split<R: Rng + ?Sized>(
        &self,
        sorted: &[Vec<usize>],
        parent_sse: f64,
        rng: &mut R,
    ) -> Option<SplitCandidate> {
        let feature_count = self.columns.len();
        let draw = self
            .config
            .max_features
            .map_or(feature_count, |k| k.clamp(1, feature_count));

        let mut best: Option<SplitCandidate> = None;
        for feature_idx in index::sample(rng, feature_count, draw).iter() {
            let Some(candidate) = self.best_split_on(feature_idx, &sorted[feature_idx], parent_sse)
            else {
                continue;
            };
            if best.map_or(true, |b| candidate.decrease > b.decrease) {
                best = Some(candidate);
            }
        }

        best
    }

    /// Sweep one feature's sorted order, scoring every boundary between
    /// distinct values that leaves `min_samples_leaf` rows on each side
    fn best_split_on(
        &self,
        feature_idx: usize,
        order: &[usize],
        parent_sse: f64,
    ) -> Option<SplitCandidate> {
        let column = &self.columns[feature_idx];
        let n = order.len();
        let min_leaf = self.config.min_samples_leaf;

        let (total_sum, total_sq) = order.iter().fold((0.0, 0.0), |(s, q), &p| {
            let y = self.targets[p];
            (s + y, q + y * y)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let mut best: Option<SplitCandidate> = None;

        for i in 0..n.saturating_sub(1) {
            let y = self.targets[order[i]];
            left_sum += y;
            left_sq += y * y;

            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_leaf {
                continue;
            }
            if n_right < min_leaf {
                break;
            }

            let value = column[order[i]];
            let next = column[order[i + 1]];
            if next <= value {
                continue;
            }

            let sse_left = (left_sq - left_sum * left_sum / n_left as f64).max(0.0);
            let right_sum = total_sum - left_sum;
            let sse_right =
                ((total_sq - left_sq) - right_sum * right_sum / n_right as f64).max(0.0);
            let decrease = parent_sse - sse_left - sse_right;

            if best.map_or(true, |b| decrease > b.decrease) {
                let mid = value + (next - value) / 2.0;
                best = Some(SplitCandidate {
                    feature_idx,
                    threshold: if mid < next { mid } else { value },
                    decrease,
                });
            }
        }

        best
    }

    /// Mean and sum of squared deviations of the targets at `positions`
    fn node_stats(&self, positions: &[usize]) -> (f64, f64) {
        if positions.is_empty() {
            return (0.0, 0.0);
        }
        let n = positions.len() as f64;
        let mean = positions.iter().map(|&p| self.targets[p]).sum::<f64>() / n;
        let sse = positions
            .iter()
            .map(|&p| (self.targets[p] - mean).powi(2))
            .sum();
        (mean, sse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn all_rows(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_step_function_is_learned_exactly() {
        let features = vec![vec![1.0, 7.0], vec![2.0, 3.0], vec![3.0, 9.0], vec![4.0, 1.0]];
        let targets = vec![0.0, 0.0, 10.0, 10.0];
        let config = TreeConfig::default();

        let grown = CartBuilder::new(&features, &targets, &all_rows(4), &config)
            .build(&mut StdRng::seed_from_u64(1));

        assert!(grown.tree.validate().is_ok());
        assert_eq!(grown.tree.nodes.len(), 3);
        let root = grown.tree.root().unwrap();
        assert_eq!(root.feature_idx, 0);
        assert_eq!(root.threshold, 2.5);
        assert_eq!(grown.importances, vec![1.0, 0.0]);

        for (row, target) in features.iter().zip(&targets) {
            assert_eq!(grown.tree.evaluate(row), *target);
        }
    }

    #[test]
    fn test_leaf_only_tree() {
        let features = vec![vec![1.0], vec![2.0]];
        let targets = vec![5.0, 5.0];
        let config = TreeConfig::default();

        let grown = CartBuilder::new(&features, &targets, &all_rows(2), &config)
            .build(&mut StdRng::seed_from_u64(1));

        assert_eq!(grown.tree.nodes.len(), 1);
        assert_eq!(grown.tree.nodes[0].leaf_value(), Some(5.0));
        assert_eq!(grown.importances, vec![0.0]);
    }

    #[test]
    fn test_max_depth_and_min_leaf() {
        let features: Vec<Vec<f64>> = (0..16).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..16).map(|i| (i * i) as f64).collect();

        let shallow = TreeConfig {
            max_depth: Some(2),
            ..TreeConfig::default()
        };
        let grown = CartBuilder::new(&features, &targets, &all_rows(16), &shallow)
            .build(&mut StdRng::seed_from_u64(3));
        assert!(grown.tree.depth() <= 2);
        assert!(grown.tree.leaf_count() <= 4);

        let wide_leaves = TreeConfig {
            min_samples_leaf: 5,
            ..TreeConfig::default()
        };
        let grown = CartBuilder::new(&features, &targets, &all_rows(16), &wide_leaves)
            .build(&mut StdRng::seed_from_u64(3));
        assert!(grown.tree.leaf_count() <= 3);
    }

    #[test]
    fn test_repeated_rows_and_constant_feature() {
        // Feature 1 is constant and can never be split on
        let features = vec![vec![0.0, 4.0], vec![1.0, 4.0], vec![2.0, 4.0]];
        let targets = vec![1.0, 2.0, 3.0];
        let config = TreeConfig::default();

        let grown = CartBuilder::new(&features, &targets, &[0, 0, 2, 2, 1], &config)
            .build(&mut StdRng::seed_from_u64(9));

        assert!(grown.tree.validate().is_ok());
        assert_eq!(grown.importances[1], 0.0);
        assert!((grown.importances[0] - 1.0).abs() < 1e-12);
        assert_eq!(grown.tree.evaluate(&[0.0, 4.0]), 1.0);
        assert_eq!(grown.tree.evaluate(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn test_same_seed_same_tree() {
        let features: Vec<Vec<f64>> = (0..40)
            .map(|i| vec![(i % 7) as f64, (i % 5) as f64, i as f64])
            .collect();
        let targets: Vec<f64> = (0..40).map(|i| ((i % 7) * 3 + (i % 5)) as f64).collect();
        let config = TreeConfig {
            max_features: Some(1),
            ..TreeConfig::default()
        };

        let builder = CartBuilder::new(&features, &targets, &all_rows(40), &config);
        let a = builder.build(&mut StdRng::seed_from_u64(11));
        let b = builder.build(&mut StdRng::seed_from_u64(11));
        assert_eq!(a.tree, b.tree);
        assert_eq!(a.importances, b.importances);
    }
}
