//! Exact per-prediction attribution for tree ensembles.
//!
//! For each tree we compute path-dependent Shapley values: the value of a coalition `S` of
//! known features is the tree's expected output when features in `S` follow `x` and every
//! other split is averaged over its branches in proportion to training cover. Instead of
//! enumerating coalitions, the recursion walks the tree once, carrying the set of features
//! seen on the current path together with the permutation weights of every subset size
//! (`extend_path` / `unwind_path`). Cost is `O(leaves · depth²)` per tree.
//!
//! Per-tree values are averaged across the forest, so
//! `Σ impact = predict_probability(x) - base_value` holds exactly up to rounding.

use rayon::prelude::*;

use crate::domain::Contribution;
use crate::features::{FEATURE_COUNT, FeatureVector};
use crate::models::{Node, TrainedForest, Tree};

/// Per-feature contributions in feature declaration order.
pub fn explain(forest: &TrainedForest, vector: &FeatureVector) -> Vec<Contribution> {
    let phi = shap_values(forest, vector);
    forest
        .feature_names()
        .iter()
        .zip(phi)
        .map(|(name, impact)| Contribution {
            feature: name.clone(),
            impact,
        })
        .collect()
}

/// Raw attribution array, index-aligned with the feature schema.
///
/// Trees are explained in parallel; the reduction runs in tree order so repeated calls are
/// bit-identical.
pub fn shap_values(forest: &TrainedForest, vector: &FeatureVector) -> [f64; FEATURE_COUNT] {
    let x = vector.as_slice();
    let per_tree: Vec<[f64; FEATURE_COUNT]> = forest
        .trees()
        .par_iter()
        .map(|tree| {
            let mut phi = [0.0; FEATURE_COUNT];
            tree_shap(tree, x, &mut phi);
            phi
        })
        .collect();

    let n_trees = forest.trees().len() as f64;
    let mut total = [0.0; FEATURE_COUNT];
    for phi in &per_tree {
        for (acc, v) in total.iter_mut().zip(phi) {
            *acc += v;
        }
    }
    for v in &mut total {
        *v /= n_trees;
    }
    total
}

#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// `None` only for the sentinel root element.
    feature: Option<usize>,
    /// Fraction of cover flowing down this path when the feature is unknown.
    zero_fraction: f64,
    /// 1 if `x` follows this path when the feature is known, else 0.
    one_fraction: f64,
    /// Permutation weight for subsets of the current size.
    weight: f64,
}

fn tree_shap(tree: &Tree, x: &[f64], phi: &mut [f64]) {
    let path = Vec::with_capacity(tree.depth() + 2);
    recurse(tree, x, phi, 0, path, 1.0, 1.0, None);
}

fn recurse(
    tree: &Tree,
    x: &[f64],
    phi: &mut [f64],
    node: usize,
    mut path: Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    extend_path(&mut path, zero_fraction, one_fraction, feature);

    match tree.nodes[node] {
        Node::Leaf { leaf_value, .. } => {
            for i in 1..path.len() {
                let el = path[i];
                let Some(f) = el.feature else { continue };
                let w = unwound_path_sum(&path, i);
                phi[f] += w * (el.one_fraction - el.zero_fraction) * leaf_value;
            }
        }
        Node::Split {
            split_feature_index: split,
            threshold,
            left,
            right,
            ..
        } => {
            let (left_frac, right_frac) = tree.child_fractions(left, right);
            let (hot, hot_frac, cold, cold_frac) = if x[split] <= threshold {
                (left, left_frac, right, right_frac)
            } else {
                (right, right_frac, left, left_frac)
            };

            // A feature split on twice along one path is counted once: undo the earlier
            // occurrence and fold its fractions into this split.
            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;
            if let Some(k) = path.iter().position(|el| el.feature == Some(split)) {
                incoming_zero = path[k].zero_fraction;
                incoming_one = path[k].one_fraction;
                unwind_path(&mut path, k);
            }

            recurse(
                tree,
                x,
                phi,
                hot,
                path.clone(),
                hot_frac * incoming_zero,
                incoming_one,
                Some(split),
            );
            recurse(tree, x, phi, cold, path, cold_frac * incoming_zero, 0.0, Some(split));
        }
    }
}

fn extend_path(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });

    let denom = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / denom;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / denom;
    }
}

fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;

    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one_portion * denom / ((i + 1) as f64 * one);
            next_one_portion = tmp - path[i].weight * zero * (depth - i) as f64 / denom;
        } else {
            path[i].weight = path[i].weight * denom / (zero * (depth - i) as f64);
        }
    }

    // Weights stay in place; feature data shifts down over the removed slot.
    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

/// Total permutation weight of the path with element `index` removed.
fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one = path[index].one_fraction;
    let zero = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;
    let mut total = 0.0;

    if one != 0.0 {
        for i in (0..depth).rev() {
            let tmp = next_one_portion * denom / ((i + 1) as f64 * one);
            total += tmp;
            next_one_portion = path[i].weight - tmp * zero * (depth - i) as f64 / denom;
        }
    } else {
        for i in (0..depth).rev() {
            total += path[i].weight * denom / (zero * (depth - i) as f64);
        }
    }
    total
}
