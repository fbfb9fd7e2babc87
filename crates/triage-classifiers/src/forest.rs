//! Random forest over sparse TF-IDF vectors.
//!
//! Trees are CART-style with Gini impurity. Each tree sees a bootstrap
//! sample of the training rows and, at every node, considers a random
//! subset of `sqrt(n_features)` features that vary within the node.
//! Tree `i` is seeded with `seed + i`, so training is reproducible
//! regardless of how rayon schedules the trees.
//!
//! Feature values are assumed non-negative, which holds for TF-IDF
//! weights: a sample missing a feature always falls on the left side
//! of a split on that feature.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use triage_core::{Error, Result};

use crate::config::ForestConfig;
use crate::features::SparseVector;

/// Minimum impurity decrease for a split to be accepted
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Split {
        feature: u32,
        threshold: f32,
        left: u32,
        right: u32,
    },
    Leaf {
        /// Class fractions of the training samples that reached this leaf
        distribution: Vec<f32>,
    },
}

/// Single classification tree stored as a node arena; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

/// Borrowed training data shared by all trees
struct TrainingSet<'a> {
    rows: &'a [SparseVector],
    labels: &'a [usize],
    n_classes: usize,
    max_features: usize,
}

struct TreeBuilder<'a, 'b> {
    data: &'b TrainingSet<'a>,
    config: &'b ForestConfig,
    rng: StdRng,
    nodes: Vec<Node>,
}

/// Best split found at a node
struct SplitCandidate {
    feature: u32,
    threshold: f32,
    score: f64,
}

impl DecisionTree {
    fn fit(data: &TrainingSet<'_>, config: &ForestConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = data.rows.len();
        let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

        let mut builder = TreeBuilder {
            data,
            config,
            rng,
            nodes: Vec::new(),
        };
        builder.build(&bootstrap, 0);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Class distribution of the leaf `row` lands in
    pub fn predict_distribution(&self, row: &SparseVector) -> &[f32] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row.get(*feature) <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check that the arena can be walked safely.
    ///
    /// Children are always stored after their parent, so requiring
    /// `idx < child < len` also rules out cycles.
    fn validate(&self, n_classes: usize, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::classifier("tree has no nodes"));
        }
        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature as usize >= n_features {
                        return Err(Error::classifier(format!(
                            "node {} splits on feature {} of {}",
                            idx, feature, n_features
                        )));
                    }
                    for child in [*left as usize, *right as usize] {
                        if child <= idx || child >= len {
                            return Err(Error::classifier(format!(
                                "node {} has child {} outside ({}, {})",
                                idx, child, idx, len
                            )));
                        }
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(Error::classifier(format!(
                            "leaf {} has {} classes, expected {}",
                            idx,
                            distribution.len(),
                            n_classes
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + walk(nodes, *left as usize).max(walk(nodes, *right as usize))
                }
            }
        }
        walk(&self.nodes, 0)
    }
}

impl TreeBuilder<'_, '_> {
    /// Build the subtree for `samples` and return its node index
    fn build(&mut self, samples: &[usize], depth: usize) -> u32 {
        let counts = self.class_counts(samples);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        if pure || depth >= self.config.max_depth || samples.len() < self.config.min_samples_split
        {
            return self.push_leaf(&counts, samples.len());
        }

        let Some(split) = self.best_split(samples, &counts) else {
            return self.push_leaf(&counts, samples.len());
        };

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&s| self.data.rows[s].get(split.feature) <= split.threshold);

        let idx = self.nodes.len() as u32;
        // reserved, filled in once both children exist
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });
        let left = self.build(&left, depth + 1);
        let right = self.build(&right, depth + 1);
        self.nodes[idx as usize] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        idx
    }

    fn push_leaf(&mut self, counts: &[usize], total: usize) -> u32 {
        let distribution = counts
            .iter()
            .map(|&c| if total == 0 { 0.0 } else { c as f32 / total as f32 })
            .collect();
        self.nodes.push(Node::Leaf { distribution });
        (self.nodes.len() - 1) as u32
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.data.n_classes];
        for &s in samples {
            counts[self.data.labels[s]] += 1;
        }
        counts
    }

    fn best_split(&mut self, samples: &[usize], counts: &[usize]) -> Option<SplitCandidate> {
        let n = samples.len();

        // (feature, value, class) for every non-zero cell in the node
        let mut entries: Vec<(u32, f32, usize)> = Vec::new();
        for &s in samples {
            let class = self.data.labels[s];
            entries.extend(self.data.rows[s].iter().map(|(f, v)| (f, v, class)));
        }
        if entries.is_empty() {
            return None;
        }
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));

        let mut groups: Vec<(usize, usize)> = Vec::new();
        let mut start = 0;
        for i in 1..=entries.len() {
            if i == entries.len() || entries[i].0 != entries[start].0 {
                groups.push((start, i));
                start = i;
            }
        }
        groups.shuffle(&mut self.rng);

        let parent_score = gini_score(counts, n);
        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;

        for (start, end) in groups {
            if visited >= self.data.max_features {
                break;
            }
            let group = &entries[start..end];
            let constant = group.len() == n && group[0].1 == group[group.len() - 1].1;
            if constant {
                continue;
            }
            visited += 1;

            if let Some(candidate) = evaluate_feature(group, counts, n) {
                let improves = candidate.score > parent_score + MIN_GAIN;
                let better = best.as_ref().map_or(true, |b| candidate.score > b.score);
                if improves && better {
                    best = Some(candidate);
                }
            }
        }

        best
    }
}

/// Sum over classes of `count^2 / total`; larger means purer
fn gini_score(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let sum_sq: f64 = counts.iter().map(|&c| (c as f64) * (c as f64)).sum();
    sum_sq / total as f64
}

/// Best threshold for one feature; `group` holds its non-zero cells
/// sorted by value
fn evaluate_feature(group: &[(u32, f32, usize)], counts: &[usize], n: usize) -> Option<SplitCandidate> {
    let feature = group[0].0;
    let mut right = vec![0usize; counts.len()];
    for &(_, _, class) in group {
        right[class] += 1;
    }
    // zero cells start on the left
    let mut left: Vec<usize> = counts.iter().zip(&right).map(|(c, r)| c - r).collect();
    let mut n_left = n - group.len();

    let mut best: Option<SplitCandidate> = None;
    let mut previous = 0.0f32;

    for &(_, value, class) in group {
        if n_left > 0 && value > previous {
            let score = gini_score(&left, n_left) + gini_score(&right, n - n_left);
            if best.as_ref().map_or(true, |b| score > b.score) {
                let mut threshold = previous + (value - previous) / 2.0;
                if threshold >= value {
                    threshold = previous;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                });
            }
        }
        left[class] += 1;
        right[class] -= 1;
        n_left += 1;
        previous = value;
    }

    best
}

/// Ensemble of bootstrap-trained decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
    n_features: usize,
}

impl RandomForest {
    /// Train a forest on `rows` with class indices `labels`
    pub fn fit(
        rows: &[SparseVector],
        labels: &[usize],
        n_classes: usize,
        config: &ForestConfig,
    ) -> Result<Self> {
        config.validate()?;
        if rows.is_empty() {
            return Err(Error::classifier("cannot train a forest on no samples"));
        }
        if rows.len() != labels.len() {
            return Err(Error::classifier(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(Error::classifier(format!(
                "label {} out of range for {} classes",
                bad, n_classes
            )));
        }

        let n_features = rows[0].dim();
        if rows.iter().any(|r| r.dim() != n_features) {
            return Err(Error::classifier("rows have inconsistent dimensions"));
        }

        let data = TrainingSet {
            rows,
            labels,
            n_classes,
            max_features: ((n_features as f64).sqrt() as usize).max(1),
        };

        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| DecisionTree::fit(&data, config, config.seed.wrapping_add(i as u64)))
            .collect();

        tracing::debug!(
            n_trees = trees.len(),
            n_samples = rows.len(),
            n_features,
            n_classes,
            "trained random forest"
        );

        Ok(Self {
            trees,
            n_classes,
            n_features,
        })
    }

    /// Mean of the leaf class distributions across all trees
    pub fn predict_proba(&self, row: &SparseVector) -> Result<Vec<f32>> {
        if row.dim() != self.n_features {
            return Err(Error::classifier(format!(
                "expected {} features, got {}",
                self.n_features,
                row.dim()
            )));
        }

        let mut proba = vec![0.0f32; self.n_classes];
        for tree in &self.trees {
            for (p, d) in proba.iter_mut().zip(tree.predict_distribution(row)) {
                *p += d;
            }
        }
        let n_trees = self.trees.len() as f32;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    /// Structural check for forests that did not come from [`fit`](Self::fit),
    /// such as decoded cache artifacts
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::classifier("forest has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_classes, self.n_features)
                .map_err(|e| Error::classifier(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
impl RandomForest {
    /// Replace the first tree with a root whose children point past the arena
    pub(crate) fn with_dangling_root(mut self) -> Self {
        self.trees[0].nodes = vec![Node::Split {
            feature: 0,
            threshold: 0.5,
            left: 999,
            right: 999,
        }];
        self
    }
}
