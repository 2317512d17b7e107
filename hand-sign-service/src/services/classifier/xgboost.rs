//! XGBoost gradient-boosted tree ensembles.
//!
//! Loads the JSON document written by `Booster.save_model("model.json")` and
//! evaluates the trees directly. Only the fields prediction needs are
//! deserialized; training statistics (gain, hessians, parents) are ignored.
//!
//! The compiled model is immutable: evaluation walks the node arrays through
//! `&self` and never writes, so one instance is shared by every request task
//! without a lock.

use super::{Classifier, ClassifierError};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Child index XGBoost writes for leaves.
const NO_CHILD: i64 = -1;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed XGBoost JSON model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported booster '{0}' (only 'gbtree' is supported)")]
    UnsupportedBooster(String),

    #[error("unsupported objective '{0}' (expected 'multi:softprob' or 'multi:softmax')")]
    UnsupportedObjective(String),

    #[error("model is missing '{0}'")]
    MissingField(&'static str),

    #[error("invalid learner parameter {name}='{value}'")]
    InvalidParameter { name: &'static str, value: String },

    #[error("tree_info has {info} entries for {trees} trees")]
    TreeInfoMismatch { info: usize, trees: usize },

    #[error("tree {tree}: {reason}")]
    MalformedTree { tree: usize, reason: String },
}

/// Training objective. Both variants are scored as softmax probabilities;
/// `multi:softmax` only differs in what XGBoost itself returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    SoftProb,
    SoftMax,
}

impl FromStr for Objective {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multi:softprob" => Ok(Objective::SoftProb),
            "multi:softmax" => Ok(Objective::SoftMax),
            other => Err(ModelError::UnsupportedObjective(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// On-disk document
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ModelDocument {
    learner: LearnerDocument,
}

#[derive(Deserialize)]
struct LearnerDocument {
    gradient_booster: BoosterDocument,
    learner_model_param: LearnerModelParam,
    objective: ObjectiveDocument,
}

#[derive(Deserialize)]
struct BoosterDocument {
    name: String,
    // Absent for dart, which nests its trees one level deeper.
    #[serde(default)]
    model: Option<GbTreeDocument>,
}

#[derive(Deserialize)]
struct GbTreeDocument {
    trees: Vec<TreeDocument>,
    tree_info: Vec<i64>,
}

/// XGBoost stores these numbers as strings.
#[derive(Deserialize)]
struct LearnerModelParam {
    base_score: String,
    num_class: String,
    num_feature: String,
    // Written since 2.0; earlier files are always single-target.
    #[serde(default)]
    num_target: Option<String>,
}

#[derive(Deserialize)]
struct ObjectiveDocument {
    name: String,
}

#[derive(Deserialize)]
struct TreeDocument {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    #[serde(default)]
    split_type: Vec<i64>,
    #[serde(default)]
    tree_param: Option<TreeParam>,
}

#[derive(Deserialize)]
struct TreeParam {
    // "0" before 2.0, "1" after; larger means one leaf vector per target.
    #[serde(default)]
    size_leaf_vector: Option<String>,
}

/// `default_left` is written as 0/1 by current releases and as booleans by
/// some older ones.
#[derive(Deserialize, Clone, Copy)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Compiled model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(f32),
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
}

#[derive(Debug)]
struct Tree {
    class: usize,
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(
        tree: usize,
        class: usize,
        doc: TreeDocument,
        num_features: usize,
    ) -> Result<Self, ModelError> {
        let malformed = |reason: String| ModelError::MalformedTree { tree, reason };

        let len = doc.left_children.len();
        if len == 0 {
            return Err(malformed("tree has no nodes".to_string()));
        }
        for (field, actual) in [
            ("right_children", doc.right_children.len()),
            ("split_indices", doc.split_indices.len()),
            ("split_conditions", doc.split_conditions.len()),
            ("default_left", doc.default_left.len()),
        ] {
            if actual != len {
                return Err(malformed(format!(
                    "{} has {} entries, expected {}",
                    field, actual, len
                )));
            }
        }
        if let Some(size) = doc
            .tree_param
            .as_ref()
            .and_then(|p| p.size_leaf_vector.as_deref())
        {
            let size: usize = parse_param("size_leaf_vector", size)?;
            if size > 1 {
                return Err(malformed(format!(
                    "vector leaves of size {} are not supported",
                    size
                )));
            }
        }
        if doc.split_type.iter().any(|&t| t != 0) {
            return Err(malformed("categorical splits are not supported".to_string()));
        }

        let mut nodes = Vec::with_capacity(len);
        for i in 0..len {
            if doc.left_children[i] == NO_CHILD {
                // A leaf's value is stored in its split_conditions slot.
                nodes.push(Node::Leaf(doc.split_conditions[i]));
                continue;
            }

            let left = child_index(doc.left_children[i], len).ok_or_else(|| {
                malformed(format!("node {} has invalid left child {}", i, doc.left_children[i]))
            })?;
            let right = child_index(doc.right_children[i], len).ok_or_else(|| {
                malformed(format!(
                    "node {} has invalid right child {}",
                    i, doc.right_children[i]
                ))
            })?;
            let feature = usize::try_from(doc.split_indices[i])
                .ok()
                .filter(|&f| f < num_features)
                .ok_or_else(|| {
                    malformed(format!(
                        "node {} splits on feature {} but the model has {} features",
                        i, doc.split_indices[i], num_features
                    ))
                })?;

            nodes.push(Node::Split {
                feature,
                threshold: doc.split_conditions[i],
                left,
                right,
                default_left: doc.default_left[i].is_set(),
            });
        }

        ensure_tree_shape(&nodes).map_err(malformed)?;

        Ok(Self { class, nodes })
    }

    /// Walks from the root to a leaf. Features must already be checked
    /// against the model's feature count.
    fn leaf_value(&self, features: &[f32]) -> f32 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let value = features[feature];
                    index = if value.is_nan() {
                        if default_left {
                            left
                        } else {
                            right
                        }
                    } else if value < threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn child_index(raw: i64, len: usize) -> Option<usize> {
    usize::try_from(raw).ok().filter(|&c| c < len)
}

/// Every node reachable from the root must be reachable exactly once, which
/// rules out cycles and guarantees `leaf_value` terminates.
fn ensure_tree_shape(nodes: &[Node]) -> Result<(), String> {
    let mut visited = vec![false; nodes.len()];
    let mut stack = vec![0usize];

    while let Some(index) = stack.pop() {
        if std::mem::replace(&mut visited[index], true) {
            return Err(format!("node {} is reachable by more than one path", index));
        }
        if let Node::Split { left, right, .. } = nodes[index] {
            stack.push(left);
            stack.push(right);
        }
    }

    Ok(())
}

fn parse_param<T: FromStr>(name: &'static str, value: &str) -> Result<T, ModelError> {
    value
        .trim()
        .parse()
        .map_err(|_| ModelError::InvalidParameter {
            name,
            value: value.to_string(),
        })
}

/// `base_score` is a scalar (`"5E-1"`) in older files and a bracketed list
/// (`"[5E-1]"` or one value per class) in newer ones.
fn parse_base_margins(value: &str, num_classes: usize) -> Result<Vec<f32>, ModelError> {
    let inner = value.trim().trim_start_matches('[').trim_end_matches(']');
    let scores = inner
        .split(',')
        .map(|s| parse_param::<f32>("base_score", s))
        .collect::<Result<Vec<_>, _>>()?;

    match scores.len() {
        1 => Ok(vec![scores[0]; num_classes]),
        n if n == num_classes => Ok(scores),
        _ => Err(ModelError::InvalidParameter {
            name: "base_score",
            value: value.to_string(),
        }),
    }
}

fn softmax(margins: &mut [f32]) {
    let max = margins.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for m in margins.iter_mut() {
        *m = (*m - max).exp();
        sum += *m;
    }
    for m in margins.iter_mut() {
        *m /= sum;
    }
}

/// A multi-class XGBoost `gbtree` model.
#[derive(Debug)]
pub struct XgboostModel {
    objective: Objective,
    num_features: usize,
    base_margins: Vec<f32>,
    trees: Vec<Tree>,
}

impl XgboostModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let document: ModelDocument = serde_json::from_slice(bytes)?;
        Self::compile(document.learner)
    }

    fn compile(learner: LearnerDocument) -> Result<Self, ModelError> {
        let objective: Objective = learner.objective.name.parse()?;

        let booster = learner.gradient_booster;
        if booster.name != "gbtree" {
            return Err(ModelError::UnsupportedBooster(booster.name));
        }
        let model = booster
            .model
            .ok_or(ModelError::MissingField("gradient_booster.model"))?;

        let params = learner.learner_model_param;
        let num_classes: usize = parse_param("num_class", &params.num_class)?;
        if num_classes == 0 {
            return Err(ModelError::InvalidParameter {
                name: "num_class",
                value: params.num_class,
            });
        }
        if let Some(num_target) = params.num_target {
            if parse_param::<usize>("num_target", &num_target)? != 1 {
                return Err(ModelError::InvalidParameter {
                    name: "num_target",
                    value: num_target,
                });
            }
        }
        let num_features: usize = parse_param("num_feature", &params.num_feature)?;
        let base_margins = parse_base_margins(&params.base_score, num_classes)?;

        if model.tree_info.len() != model.trees.len() {
            return Err(ModelError::TreeInfoMismatch {
                info: model.tree_info.len(),
                trees: model.trees.len(),
            });
        }

        let trees = model
            .trees
            .into_iter()
            .zip(model.tree_info)
            .enumerate()
            .map(|(index, (doc, class))| {
                let class = usize::try_from(class)
                    .ok()
                    .filter(|&c| c < num_classes)
                    .ok_or_else(|| ModelError::MalformedTree {
                        tree: index,
                        reason: format!("assigned to class {} of {}", class, num_classes),
                    })?;
                Tree::compile(index, class, doc, num_features)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            objective,
            num_features,
            base_margins,
            trees,
        })
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for XgboostModel {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn num_classes(&self) -> usize {
        self.base_margins.len()
    }

    fn predict_scores(&self, features: &[f32]) -> Result<Vec<f32>, ClassifierError> {
        if features.len() != self.num_features {
            return Err(ClassifierError::FeatureCount {
                expected: self.num_features,
                actual: features.len(),
            });
        }

        let mut margins = self.base_margins.clone();
        for tree in &self.trees {
            margins[tree.class] += tree.leaf_value(features);
        }
        softmax(&mut margins);

        Ok(margins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const FIXTURE: &str = include_str!("../../../tests/fixtures/model.json");

    fn fixture() -> Value {
        serde_json::from_str(FIXTURE).unwrap()
    }

    fn load(doc: &Value) -> Result<XgboostModel, ModelError> {
        XgboostModel::from_slice(&serde_json::to_vec(doc).unwrap())
    }

    fn features(x: f32, y: f32) -> Vec<f32> {
        let mut features = vec![0.0; 42];
        features[24] = x;
        features[25] = y;
        features
    }

    fn argmax(scores: &[f32]) -> usize {
        let mut best = 0;
        for (i, &s) in scores.iter().enumerate() {
            if s > scores[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn loads_fixture() {
        let model = XgboostModel::from_slice(FIXTURE.as_bytes()).unwrap();
        assert_eq!(model.num_classes(), 4);
        assert_eq!(model.num_features(), 42);
        assert_eq!(model.num_trees(), 4);
        assert_eq!(model.objective(), Objective::SoftProb);
    }

    #[test]
    fn scores_are_probabilities_following_fingertip_direction() {
        let model = XgboostModel::from_slice(FIXTURE.as_bytes()).unwrap();

        for (x, y, expected) in [(-1.0, 0.0, 0), (0.0, -1.0, 1), (0.0, 1.0, 2), (1.0, 0.0, 3)] {
            let scores = model.predict_scores(&features(x, y)).unwrap();
            assert_eq!(scores.len(), 4);
            assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-5);
            assert_eq!(argmax(&scores), expected, "direction ({}, {})", x, y);
        }
    }

    #[test]
    fn zero_vector_scores_every_class_equally() {
        let model = XgboostModel::from_slice(FIXTURE.as_bytes()).unwrap();
        let scores = model.predict_scores(&vec![0.0; 42]).unwrap();
        assert!(scores.iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn missing_value_follows_default_direction() {
        let model = XgboostModel::from_slice(FIXTURE.as_bytes()).unwrap();
        // Tree 0 sends NaN left (+), tree 3 sends it left (-).
        let scores = model.predict_scores(&features(f32::NAN, 0.0)).unwrap();
        assert_eq!(argmax(&scores), 0);
    }

    #[test]
    fn rejects_wrong_feature_count() {
        let model = XgboostModel::from_slice(FIXTURE.as_bytes()).unwrap();
        assert_eq!(
            model.predict_scores(&[0.0; 40]).unwrap_err(),
            ClassifierError::FeatureCount {
                expected: 42,
                actual: 40
            }
        );
    }

    #[test]
    fn accepts_boolean_default_left_and_bracketed_base_score() {
        let mut doc = fixture();
        doc["learner"]["learner_model_param"]["base_score"] = json!("[5E-1]");
        doc["learner"]["gradient_booster"]["model"]["trees"][0]["default_left"] =
            json!([true, false, false]);

        let model = load(&doc).unwrap();
        let scores = model.predict_scores(&features(f32::NAN, 0.0)).unwrap();
        assert_eq!(argmax(&scores), 0);
    }

    #[test]
    fn per_class_base_score_shifts_margins() {
        let mut doc = fixture();
        doc["learner"]["learner_model_param"]["base_score"] = json!("[0,0,0,5E0]");

        let model = load(&doc).unwrap();
        let scores = model.predict_scores(&vec![0.0; 42]).unwrap();
        assert_eq!(argmax(&scores), 3);
    }

    #[test]
    fn rejects_unsupported_objective() {
        let mut doc = fixture();
        doc["learner"]["objective"]["name"] = json!("binary:logistic");
        assert!(matches!(
            load(&doc),
            Err(ModelError::UnsupportedObjective(name)) if name == "binary:logistic"
        ));
    }

    #[test]
    fn rejects_dart_booster() {
        let mut doc = fixture();
        doc["learner"]["gradient_booster"]["name"] = json!("dart");
        assert!(matches!(load(&doc), Err(ModelError::UnsupportedBooster(_))));
    }

    #[test]
    fn rejects_out_of_range_child() {
        let mut doc = fixture();
        doc["learner"]["gradient_booster"]["model"]["trees"][2]["right_children"] =
            json!([9, -1, -1]);
        assert!(matches!(
            load(&doc),
            Err(ModelError::MalformedTree { tree: 2, .. })
        ));
    }

    #[test]
    fn rejects_cyclic_tree() {
        let mut doc = fixture();
        let tree = &mut doc["learner"]["gradient_booster"]["model"]["trees"][0];
        tree["left_children"] = json!([1, 0, -1]);
        tree["right_children"] = json!([2, 2, -1]);
        assert!(matches!(
            load(&doc),
            Err(ModelError::MalformedTree { tree: 0, .. })
        ));
    }

    #[test]
    fn rejects_split_on_unknown_feature() {
        let mut doc = fixture();
        doc["learner"]["gradient_booster"]["model"]["trees"][3]["split_indices"] =
            json!([42, 0, 0]);
        assert!(matches!(
            load(&doc),
            Err(ModelError::MalformedTree { tree: 3, .. })
        ));
    }

    #[test]
    fn rejects_tree_assigned_to_unknown_class() {
        let mut doc = fixture();
        doc["learner"]["gradient_booster"]["model"]["tree_info"] = json!([0, 1, 2, 4]);
        assert!(matches!(
            load(&doc),
            Err(ModelError::MalformedTree { tree: 3, .. })
        ));
    }

    #[test]
    fn rejects_tree_info_length_mismatch() {
        let mut doc = fixture();
        doc["learner"]["gradient_booster"]["model"]["tree_info"] = json!([0, 1, 2]);
        assert!(matches!(
            load(&doc),
            Err(ModelError::TreeInfoMismatch { info: 3, trees: 4 })
        ));
    }

    #[test]
    fn rejects_categorical_splits() {
        let mut doc = fixture();
        doc["learner"]["gradient_booster"]["model"]["trees"][0]["split_type"] = json!([1, 0, 0]);
        assert!(matches!(
            load(&doc),
            Err(ModelError::MalformedTree { tree: 0, .. })
        ));
    }

    #[test]
    fn rejects_vector_leaf_trees() {
        let mut doc = fixture();
        let model = &mut doc["learner"]["gradient_booster"]["model"];
        model["tree_info"] = json!([0, 0, 0, 0]);
        for tree in model["trees"].as_array_mut().unwrap() {
            tree["tree_param"]["size_leaf_vector"] = json!("4");
        }
        assert!(matches!(
            load(&doc),
            Err(ModelError::MalformedTree { tree: 0, .. })
        ));
    }

    #[test]
    fn rejects_multi_target_models() {
        let mut doc = fixture();
        doc["learner"]["learner_model_param"]["num_target"] = json!("4");
        assert!(matches!(
            load(&doc),
            Err(ModelError::InvalidParameter { name: "num_target", .. })
        ));
    }

    #[test]
    fn accepts_scalar_leaf_markers_from_any_release() {
        let mut doc = fixture();
        doc["learner"]["learner_model_param"]["num_target"] = json!("1");
        doc["learner"]["gradient_booster"]["model"]["trees"][0]["tree_param"]["size_leaf_vector"] =
            json!("0");
        assert!(load(&doc).is_ok());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = XgboostModel::load("/nonexistent/model.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/model.json"));
    }
}
