//! CART tree shared by every tree-based model.
//!
//! Targets are real-valued with per-sample weights. Classification trees
//! are grown on 0/1 targets so a leaf value is the weighted fraction of the
//! positive class; regression trees (used by gradient boosting) store the
//! weighted mean. Node impurity is computed from the running sums
//! `Σw`, `Σwy` and `Σwy²`, which lets one sweep per feature evaluate every
//! threshold.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ModelError;

/// Split quality measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Gini,
    Entropy,
    SquaredError,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gini => write!(f, "gini"),
            Self::Entropy => write!(f, "entropy"),
            Self::SquaredError => write!(f, "squared_error"),
        }
    }
}

/// Margin by which a candidate split must beat the current best. An impure
/// node always takes its best valid split, even at zero gain.
const MIN_GAIN: f64 = 1e-12;

/// Growth limits for one tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub criterion: Criterion,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per split; `None` means all of them
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            criterion: Criterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted binary tree stored as a flat node arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    w: f64,
    wy: f64,
    wy2: f64,
    count: usize,
}

impl Sums {
    fn add(&mut self, w: f64, y: f64) {
        self.w += w;
        self.wy += w * y;
        self.wy2 += w * y * y;
        self.count += 1;
    }

    fn minus(&self, other: &Self) -> Self {
        Self {
            w: self.w - other.w,
            wy: self.wy - other.wy,
            wy2: self.wy2 - other.wy2,
            count: self.count - other.count,
        }
    }

    fn mean(&self) -> f64 {
        if self.w > 0.0 {
            self.wy / self.w
        } else {
            0.0
        }
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.w <= 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        match criterion {
            Criterion::SquaredError => (self.wy2 / self.w - mean * mean).max(0.0),
            Criterion::Gini => {
                let p = mean.clamp(0.0, 1.0);
                2.0 * p * (1.0 - p)
            }
            Criterion::Entropy => {
                let p = mean.clamp(0.0, 1.0);
                let h = |q: f64| if q > 0.0 { -q * q.log2() } else { 0.0 };
                h(p) + h(1.0 - p)
            }
        }
    }
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    w: &'a [f64],
    params: &'a TreeParams,
    n_features: usize,
    rng: Option<&'a mut StdRng>,
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl Builder<'_> {
    fn build(&mut self, indices: &[usize], depth: usize) -> usize {
        let mut sums = Sums::default();
        for &i in indices {
            sums.add(self.w[i], self.y[i]);
        }

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: sums.mean() });

        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        let too_small = indices.len() < self.params.min_samples_split
            || indices.len() < 2 * self.params.min_samples_leaf;
        if depth_reached || too_small || sums.impurity(self.params.criterion) <= f64::EPSILON {
            return node_id;
        }

        let Some(best) = self.find_split(indices, &sums) else {
            return node_id;
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[i][best.feature] <= best.threshold);

        let left = self.build(&left_idx, depth + 1);
        let right = self.build(&right_idx, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_id
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        match (self.params.max_features, self.rng.as_deref_mut()) {
            (Some(k), Some(rng)) if k < self.n_features => {
                rand::seq::index::sample(rng, self.n_features, k).into_vec()
            }
            _ => (0..self.n_features).collect(),
        }
    }

    fn find_split(&mut self, indices: &[usize], total: &Sums) -> Option<BestSplit> {
        let criterion = self.params.criterion;
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent_cost = total.w * total.impurity(criterion);
        let mut best: Option<BestSplit> = None;

        let mut order = indices.to_vec();
        for feature in self.candidate_features() {
            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left = Sums::default();
            for k in 0..order.len() - 1 {
                let i = order[k];
                left.add(self.w[i], self.y[i]);

                let here = self.x[i][feature];
                let next = self.x[order[k + 1]][feature];
                if next <= here {
                    continue;
                }
                let right = total.minus(&left);
                if left.count < min_leaf || right.count < min_leaf {
                    continue;
                }

                let cost = left.w * left.impurity(criterion) + right.w * right.impurity(criterion);
                let gain = parent_cost - cost;
                let better = match &best {
                    None => gain > -MIN_GAIN,
                    Some(b) => gain > b.gain + MIN_GAIN,
                };
                if better {
                    let mid = here + (next - here) / 2.0;
                    let threshold = if mid >= next { here } else { mid };
                    best = Some(BestSplit { feature, threshold, gain });
                }
            }
        }

        best
    }
}

impl Tree {
    /// Grow a tree on rows `x`, targets `y` and sample weights `w`.
    ///
    /// Samples with zero weight are ignored. `rng` is only consulted when
    /// `params.max_features` restricts the features examined per split.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        w: &[f64],
        params: &TreeParams,
        rng: Option<&mut StdRng>,
    ) -> Result<Self, ModelError> {
        if x.len() != y.len() || x.len() != w.len() {
            return Err(ModelError::LengthMismatch { rows: x.len(), labels: y.len() });
        }
        let indices: Vec<usize> = (0..x.len()).filter(|&i| w[i] > 0.0).collect();
        if indices.is_empty() {
            return Err(ModelError::EmptyInput);
        }

        let mut builder = Builder {
            x,
            y,
            w,
            params,
            n_features: x[0].len(),
            rng,
            nodes: Vec::new(),
        };
        builder.build(&indices, 0);
        Ok(Self { nodes: builder.nodes })
    }

    fn descend(&self, row: &[f64]) -> (usize, f64) {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return (id, *value),
                Node::Split { feature, threshold, left, right } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Index of the leaf `row` lands in.
    pub fn apply(&self, row: &[f64]) -> usize {
        self.descend(row).0
    }

    /// Leaf value for `row`.
    pub fn predict_value(&self, row: &[f64]) -> f64 {
        self.descend(row).1
    }

    /// Overwrite the value stored in leaf `id`. Non-leaf ids are ignored.
    pub fn set_leaf_value(&mut self, id: usize, new_value: f64) {
        if let Some(Node::Leaf { value }) = self.nodes.get_mut(id) {
            *value = new_value;
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}
