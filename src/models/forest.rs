//! Immutable decision-tree ensemble and its on-disk artifact form.
//!
//! Trees are stored as flat node arrays rooted at index 0. Every node records its `cover`
//! (training sample weight that reached it); the attribution engine uses cover ratios as the
//! probability of taking each branch when a feature is unknown.
//!
//! A [`TrainedForest`] can only be obtained through validation, so inference and
//! attribution code can index nodes and features without re-checking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RiskError;
use crate::features::{FEATURE_COUNT, FEATURE_NAMES, FEATURE_SCHEMA, check_feature_names};

/// Artifact layout version understood by this build.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Maximum tolerated drift between the recorded and the recomputed base value.
const BASE_VALUE_TOLERANCE: f64 = 1e-6;

/// Deepest root-to-leaf path accepted at load. Attribution recurses once per level.
pub const MAX_TREE_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Go `left` when `x[split_feature_index] <= threshold`, else `right`.
    Split {
        split_feature_index: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    /// Class-1 (default) probability observed at this leaf during training.
    Leaf { leaf_value: f64, cover: f64 },
}

impl Node {
    pub fn cover(&self) -> f64 {
        match self {
            Node::Split { cover, .. } | Node::Leaf { cover, .. } => *cover,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Structural checks: reachable tree rooted at 0, children after parents, each node
    /// referenced once, depth at most [`MAX_TREE_DEPTH`], features in range, finite
    /// thresholds, positive covers, leaf values in `[0, 1]`.
    fn validate(&self, tree_idx: usize, n_features: usize) -> Result<(), RiskError> {
        let fail = |node: usize, reason: String| {
            Err(RiskError::integrity(format!("tree {tree_idx}, node {node}: {reason}")))
        };

        if self.nodes.is_empty() {
            return Err(RiskError::integrity(format!("tree {tree_idx} has no nodes")));
        }

        let mut referenced = vec![false; self.nodes.len()];
        // Parents precede children, so a node's depth is final before it is visited.
        let mut node_depth = vec![0usize; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            let cover = node.cover();
            if !(cover.is_finite() && cover > 0.0) {
                return fail(idx, format!("cover must be > 0, got {cover}"));
            }
            match *node {
                Node::Leaf { leaf_value, .. } => {
                    if !(leaf_value.is_finite() && (0.0..=1.0).contains(&leaf_value)) {
                        return fail(idx, format!("leaf value {leaf_value} outside [0, 1]"));
                    }
                }
                Node::Split {
                    split_feature_index,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if split_feature_index >= n_features {
                        return fail(
                            idx,
                            format!("split feature {split_feature_index} out of range (0..{n_features})"),
                        );
                    }
                    if threshold.is_nan() {
                        return fail(idx, "threshold is NaN".to_string());
                    }
                    for child in [left, right] {
                        if child <= idx || child >= self.nodes.len() {
                            return fail(idx, format!("child index {child} must lie in ({idx}, {})", self.nodes.len()));
                        }
                        if referenced[child] {
                            return fail(idx, format!("child {child} has more than one parent"));
                        }
                        referenced[child] = true;
                        node_depth[child] = node_depth[idx] + 1;
                        if node_depth[child] > MAX_TREE_DEPTH {
                            return fail(child, format!("tree deeper than {MAX_TREE_DEPTH} levels"));
                        }
                    }
                }
            }
        }

        if let Some(orphan) = referenced.iter().skip(1).position(|r| !r) {
            return fail(orphan + 1, "unreachable from the root".to_string());
        }
        Ok(())
    }

    /// Leaf value reached by `x`.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { leaf_value, .. } => return leaf_value,
                Node::Split {
                    split_feature_index,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if x[split_feature_index] <= threshold { left } else { right };
                }
            }
        }
    }

    /// Branch probabilities `(left, right)` at a split, from child covers.
    ///
    /// Normalized by the children's total so the two always sum to 1 even if the recorded
    /// parent cover differs slightly.
    pub fn child_fractions(&self, left: usize, right: usize) -> (f64, f64) {
        let cl = self.nodes[left].cover();
        let cr = self.nodes[right].cover();
        let total = cl + cr;
        (cl / total, cr / total)
    }

    /// Expected output with no feature known: cover-weighted mean of leaf values.
    ///
    /// Children always follow their parent, so one backward sweep resolves every subtree.
    pub fn expected_value(&self) -> f64 {
        let mut expected = vec![0.0; self.nodes.len()];
        for idx in (0..self.nodes.len()).rev() {
            expected[idx] = match self.nodes[idx] {
                Node::Leaf { leaf_value, .. } => leaf_value,
                Node::Split { left, right, .. } => {
                    let (wl, wr) = self.child_fractions(left, right);
                    wl * expected[left] + wr * expected[right]
                }
            };
        }
        expected.first().copied().unwrap_or(0.0)
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut node_depth = vec![0usize; self.nodes.len()];
        let mut deepest = 0;
        for idx in 0..self.nodes.len() {
            if let Node::Split { left, right, .. } = self.nodes[idx] {
                node_depth[left] = node_depth[idx] + 1;
                node_depth[right] = node_depth[idx] + 1;
                deepest = deepest.max(node_depth[idx] + 1);
            }
        }
        deepest
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }
}

/// Serialized model, as produced by the offline training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub version_id: String,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    pub feature_names: Vec<String>,
    pub base_value: f64,
    pub trees: Vec<Tree>,
}

/// Validated, read-only ensemble.
///
/// Built once at startup and then shared by reference; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct TrainedForest {
    version_id: String,
    trained_at: Option<DateTime<Utc>>,
    feature_names: Vec<String>,
    trees: Vec<Tree>,
    base_value: f64,
}

impl TrainedForest {
    /// Validate trees against the feature schema and cache the base value.
    pub fn new(version_id: impl Into<String>, trees: Vec<Tree>) -> Result<Self, RiskError> {
        if trees.is_empty() {
            return Err(RiskError::integrity("forest has no trees"));
        }
        for (idx, tree) in trees.iter().enumerate() {
            tree.validate(idx, FEATURE_COUNT)?;
        }

        let base_value = trees.iter().map(Tree::expected_value).sum::<f64>() / trees.len() as f64;

        Ok(Self {
            version_id: version_id.into(),
            trained_at: None,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            trees,
            base_value,
        })
    }

    /// Load from a deserialized artifact. Every failure here is fatal for serving.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, RiskError> {
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(RiskError::integrity(format!(
                "unsupported artifact format_version {} (expected {ARTIFACT_FORMAT_VERSION})",
                artifact.format_version
            )));
        }
        check_feature_names(&artifact.feature_names)?;

        let mut forest = Self::new(artifact.version_id, artifact.trees)?;
        forest.trained_at = artifact.trained_at;

        if !artifact.base_value.is_finite()
            || (artifact.base_value - forest.base_value).abs() > BASE_VALUE_TOLERANCE
        {
            return Err(RiskError::integrity(format!(
                "recorded base_value {} does not match the trees ({})",
                artifact.base_value, forest.base_value
            )));
        }

        info!(
            version = %forest.version_id,
            schema = FEATURE_SCHEMA,
            trees = forest.trees.len(),
            base_value = forest.base_value,
            "model loaded"
        );
        Ok(forest)
    }

    pub fn to_artifact(&self) -> ModelArtifact {
        ModelArtifact {
            format_version: ARTIFACT_FORMAT_VERSION,
            version_id: self.version_id.clone(),
            trained_at: self.trained_at,
            feature_names: self.feature_names.clone(),
            base_value: self.base_value,
            trees: self.trees.clone(),
        }
    }

    pub fn with_trained_at(mut self, trained_at: DateTime<Utc>) -> Self {
        self.trained_at = Some(trained_at);
        self
    }

    pub fn version_id(&self) -> &str {
        &self.version_id
    }

    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.trained_at
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Unconditional expected output; the reference point for attributions.
    pub fn base_value(&self) -> f64 {
        self.base_value
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Depth-2 tree over DTI (6) and monthly income (0).
    pub(crate) fn small_tree() -> Tree {
        Tree::new(vec![
            Node::Split { split_feature_index: 6, threshold: 50.0, left: 1, right: 2, cover: 100.0 },
            Node::Split { split_feature_index: 0, threshold: 30_000.0, left: 3, right: 4, cover: 60.0 },
            Node::Leaf { leaf_value: 0.8, cover: 40.0 },
            Node::Leaf { leaf_value: 0.4, cover: 20.0 },
            Node::Leaf { leaf_value: 0.1, cover: 40.0 },
        ])
    }

    #[test]
    fn expected_value_is_cover_weighted() {
        let tree = small_tree();
        // 0.6 * (1/3 * 0.4 + 2/3 * 0.1) + 0.4 * 0.8
        let want = 0.6 * (0.4 / 3.0 + 0.2 / 3.0) + 0.32;
        assert!((tree.expected_value() - want).abs() < 1e-12);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn walks_left_on_less_or_equal() {
        let tree = small_tree();
        let mut x = [0.0; FEATURE_COUNT];
        x[6] = 50.0;
        x[0] = 30_000.0;
        assert_eq!(tree.predict(&x), 0.4);
        x[0] = 30_000.5;
        assert_eq!(tree.predict(&x), 0.1);
        x[6] = 50.1;
        assert_eq!(tree.predict(&x), 0.8);
    }

    #[test]
    fn rejects_out_of_range_leaf() {
        let mut tree = small_tree();
        tree.nodes[2] = Node::Leaf { leaf_value: 1.2, cover: 40.0 };
        let err = TrainedForest::new("bad", vec![tree]).unwrap_err();
        assert!(matches!(err, RiskError::ModelIntegrity(_)));
        assert!(err.to_string().contains("outside [0, 1]"));
    }

    #[test]
    fn rejects_back_edges_and_shared_children() {
        let mut tree = small_tree();
        tree.nodes[1] = Node::Split { split_feature_index: 0, threshold: 1.0, left: 0, right: 4, cover: 60.0 };
        assert!(TrainedForest::new("cycle", vec![tree]).is_err());

        let mut tree = small_tree();
        tree.nodes[1] = Node::Split { split_feature_index: 0, threshold: 1.0, left: 2, right: 4, cover: 60.0 };
        assert!(TrainedForest::new("shared", vec![tree]).is_err());
    }

    #[test]
    fn rejects_feature_index_out_of_schema() {
        let mut tree = small_tree();
        tree.nodes[0] = Node::Split { split_feature_index: FEATURE_COUNT, threshold: 1.0, left: 1, right: 2, cover: 100.0 };
        let err = TrainedForest::new("wide", vec![tree]).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    /// Right-leaning chain: `levels` splits on monthly income, each with a leaf on the left.
    pub(crate) fn chain_tree(levels: usize) -> Tree {
        let mut nodes = Vec::with_capacity(2 * levels + 1);
        for level in 0..levels {
            let idx = 2 * level;
            nodes.push(Node::Split {
                split_feature_index: 0,
                threshold: level as f64,
                left: idx + 1,
                right: idx + 2,
                cover: (levels - level) as f64 + 1.0,
            });
            nodes.push(Node::Leaf { leaf_value: (level % 10) as f64 / 10.0, cover: 1.0 });
        }
        nodes.push(Node::Leaf { leaf_value: 0.5, cover: 1.0 });
        Tree::new(nodes)
    }

    #[test]
    fn depth_limit_bounds_chain_trees() {
        let deepest = chain_tree(MAX_TREE_DEPTH);
        assert_eq!(deepest.depth(), MAX_TREE_DEPTH);
        let forest = TrainedForest::new("deep", vec![deepest]).unwrap();
        assert!((0.0..=1.0).contains(&forest.base_value()));

        for levels in [MAX_TREE_DEPTH + 1, 20_000] {
            let err = TrainedForest::new("too-deep", vec![chain_tree(levels)]).unwrap_err();
            assert!(matches!(err, RiskError::ModelIntegrity(_)));
            assert!(err.to_string().contains("deeper than"), "{err}");
        }
    }

    #[test]
    fn rejects_empty_forest_and_zero_cover() {
        assert!(TrainedForest::new("empty", vec![]).is_err());

        let mut tree = small_tree();
        tree.nodes[3] = Node::Leaf { leaf_value: 0.4, cover: 0.0 };
        assert!(TrainedForest::new("cover", vec![tree]).is_err());
    }

    #[test]
    fn artifact_checks_version_schema_and_base_value() {
        let forest = TrainedForest::new("v1", vec![small_tree()]).unwrap();
        let good = forest.to_artifact();
        assert!(TrainedForest::from_artifact(good.clone()).is_ok());

        let mut wrong_version = good.clone();
        wrong_version.format_version = 99;
        assert!(TrainedForest::from_artifact(wrong_version).is_err());

        let mut wrong_names = good.clone();
        wrong_names.feature_names.swap(0, 1);
        assert!(TrainedForest::from_artifact(wrong_names).is_err());

        let mut wrong_base = good;
        wrong_base.base_value += 0.01;
        let err = TrainedForest::from_artifact(wrong_base).unwrap_err();
        assert!(err.to_string().contains("base_value"));
    }

    #[test]
    fn nodes_round_trip_through_json_shape() {
        let json = r#"[
            {"split_feature_index": 6, "threshold": 50.0, "left": 1, "right": 2, "cover": 10.0},
            {"leaf_value": 0.2, "cover": 6.0},
            {"leaf_value": 0.9, "cover": 4.0}
        ]"#;
        let nodes: Vec<Node> = serde_json::from_str(json).unwrap();
        assert!(matches!(nodes[0], Node::Split { split_feature_index: 6, .. }));
        assert!(matches!(nodes[2], Node::Leaf { leaf_value, .. } if leaf_value == 0.9));
    }
}
