//! CART regression tree used as the forest's base learner.
//!
//! Trees are stored as a flat node arena and traversed iteratively;
//! `feature == -1` marks a leaf. Splits minimize the summed squared error of
//! the two children, searched over midpoints between consecutive distinct
//! feature values. No depth limit, minimum two samples to split, all features
//! considered at every node (the defaults the ranking workflow relies on).

/// One node in the flat tree arena.
#[derive(Debug, Clone)]
pub(crate) struct TreeNode {
    /// Split feature index, or -1 for a leaf.
    pub feature: i32,
    pub threshold: f64,
    pub left: i32,
    pub right: i32,
    /// Leaf prediction (mean of the training targets reaching the leaf).
    pub value: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct DecisionTree {
    nodes: Vec<TreeNode>,
    /// Summed squared-error reduction per feature, scaled by the training
    /// sample size. The forest averages and normalizes these.
    pub importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    children_sse: f64,
}

impl DecisionTree {
    /// Fit a tree on the rows selected by `sample` (bootstrap indices into
    /// `x`/`y`, duplicates allowed).
    pub fn fit(x: &[Vec<f64>], y: &[f64], sample: &[usize], n_features: usize) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };
        tree.build(x, y, sample.to_vec(), sample.len());
        tree
    }

    fn build(&mut self, x: &[Vec<f64>], y: &[f64], idx: Vec<usize>, n_root: usize) -> i32 {
        let (mean, sse) = mean_and_sse(y, &idx);

        if idx.len() < 2 || sse <= f64::EPSILON {
            return self.push_leaf(mean);
        }

        let Some(split) = best_split(x, y, &idx) else {
            // Every feature is constant across the sample.
            return self.push_leaf(mean);
        };

        self.importances[split.feature] += (sse - split.children_sse) / n_root as f64;

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = idx
            .into_iter()
            .partition(|&i| x[i][split.feature] <= split.threshold);

        let node_id = self.nodes.len() as i32;
        self.nodes.push(TreeNode {
            feature: split.feature as i32,
            threshold: split.threshold,
            left: -1,
            right: -1,
            value: 0.0,
        });

        let left = self.build(x, y, left_idx, n_root);
        let right = self.build(x, y, right_idx, n_root);
        self.nodes[node_id as usize].left = left;
        self.nodes[node_id as usize].right = right;
        node_id
    }

    fn push_leaf(&mut self, value: f64) -> i32 {
        let node_id = self.nodes.len() as i32;
        self.nodes.push(TreeNode {
            feature: -1,
            threshold: 0.0,
            left: -1,
            right: -1,
            value,
        });
        node_id
    }

    /// Predict a single row by walking the arena from the root.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        let mut node_idx = 0usize;
        loop {
            let node = &self.nodes[node_idx];
            if node.feature == -1 {
                return node.value;
            }
            let feature_val = features
                .get(node.feature as usize)
                .copied()
                .unwrap_or(f64::NAN);
            // NaN or <= threshold goes left.
            if feature_val.is_nan() || feature_val <= node.threshold {
                node_idx = node.left as usize;
            } else {
                node_idx = node.right as usize;
            }
        }
    }
}

fn mean_and_sse(y: &[f64], idx: &[usize]) -> (f64, f64) {
    if idx.is_empty() {
        return (0.0, 0.0);
    }
    let n = idx.len() as f64;
    let sum: f64 = idx.iter().map(|&i| y[i]).sum();
    let mean = sum / n;
    let sse: f64 = idx.iter().map(|&i| (y[i] - mean).powi(2)).sum();
    (mean, sse)
}

/// Exhaustive best-split search over all features.
///
/// For each feature, rows are sorted by value and candidate thresholds are
/// the midpoints between consecutive distinct values; prefix sums give the
/// children's SSE in O(n) per feature after the sort.
fn best_split(x: &[Vec<f64>], y: &[f64], idx: &[usize]) -> Option<BestSplit> {
    let n_features = x[idx[0]].len();
    let mut best: Option<BestSplit> = None;

    for feature in 0..n_features {
        let mut ordered: Vec<(f64, f64)> = idx.iter().map(|&i| (x[i][feature], y[i])).collect();
        ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let n = ordered.len();
        let total_sum: f64 = ordered.iter().map(|(_, t)| t).sum();
        let total_sq: f64 = ordered.iter().map(|(_, t)| t * t).sum();

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for split_at in 1..n {
            left_sum += ordered[split_at - 1].1;
            left_sq += ordered[split_at - 1].1 * ordered[split_at - 1].1;

            // Identical values cannot be separated by a threshold.
            if ordered[split_at - 1].0 == ordered[split_at].0 {
                continue;
            }

            let left_n = split_at as f64;
            let right_n = (n - split_at) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let sse_left = left_sq - left_sum * left_sum / left_n;
            let sse_right = right_sq - right_sum * right_sum / right_n;
            let children_sse = sse_left + sse_right;

            if best
                .as_ref()
                .map_or(true, |b| children_sse < b.children_sse)
            {
                best = Some(BestSplit {
                    feature,
                    threshold: (ordered[split_at - 1].0 + ordered[split_at].0) / 2.0,
                    children_sse,
                });
            }
        }
    }

    best
}
