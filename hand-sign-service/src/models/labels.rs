use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

/// Label order the bundled model was trained with.
pub const DEFAULT_CLASSES: [&str; 4] = ["left", "up", "down", "right"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("at least one class label is required")]
    Empty,

    #[error("class label {0} is blank")]
    Blank(usize),

    #[error("class label '{0}' appears more than once")]
    Duplicate(String),
}

/// Class names indexed by model output position.
///
/// Must stay in lockstep with the order the model was trained with; the
/// service refuses to start when the count differs from the model's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabels(Vec<String>);

impl ClassLabels {
    pub fn new(labels: Vec<String>) -> Result<Self, LabelError> {
        if labels.is_empty() {
            return Err(LabelError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(LabelError::Blank(index));
            }
            if !seen.insert(label.as_str()) {
                return Err(LabelError::Duplicate(label.clone()));
            }
        }

        Ok(Self(labels))
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ClassLabels {
    fn default() -> Self {
        Self(DEFAULT_CLASSES.iter().map(|s| s.to_string()).collect())
    }
}

/// Parses a comma-separated list such as `left,up,down,right`.
impl FromStr for ClassLabels {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(LabelError::Empty);
        }
        Self::new(s.split(',').map(|label| label.trim().to_string()).collect())
    }
}
