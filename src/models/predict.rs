//! Ensemble inference.

use crate::features::FeatureVector;
use crate::models::TrainedForest;

/// Default probability: arithmetic mean of the leaf values reached in each tree.
///
/// Leaf values are validated to lie in `[0, 1]` at load, so the mean does too.
pub fn predict_probability(forest: &TrainedForest, vector: &FeatureVector) -> f64 {
    let x = vector.as_slice();
    let total: f64 = forest.trees().iter().map(|tree| tree.predict(x)).sum();
    total / forest.trees().len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;
    use crate::models::forest::tests::small_tree;
    use crate::models::{Node, Tree};

    fn vector(dti: f64, income: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[6] = dti;
        values[0] = income;
        FeatureVector::new(values).unwrap()
    }

    #[test]
    fn averages_tree_votes() {
        let stump = Tree::new(vec![
            Node::Split { split_feature_index: 0, threshold: 50_000.0, left: 1, right: 2, cover: 10.0 },
            Node::Leaf { leaf_value: 0.6, cover: 5.0 },
            Node::Leaf { leaf_value: 0.2, cover: 5.0 },
        ]);
        let forest = TrainedForest::new("t", vec![small_tree(), stump]).unwrap();

        // small_tree -> 0.4 (dti<=50, income<=30k), stump -> 0.6
        let p = predict_probability(&forest, &vector(20.0, 25_000.0));
        assert!((p - 0.5).abs() < 1e-12);

        // small_tree -> 0.8, stump -> 0.2
        let p = predict_probability(&forest, &vector(80.0, 90_000.0));
        assert!((p - 0.5).abs() < 1e-12);

        // small_tree -> 0.1, stump -> 0.2
        let p = predict_probability(&forest, &vector(10.0, 90_000.0));
        assert!((p - 0.15).abs() < 1e-12);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let forest = TrainedForest::new("t", vec![small_tree(), small_tree()]).unwrap();
        let v = vector(42.0, 31_000.0);
        let a = predict_probability(&forest, &v);
        let b = predict_probability(&forest, &v);
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
