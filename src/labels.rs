//! Class label sets.
//!
//! A `LabelSet` is loaded once per session and never mutated; its length
//! fixes the number of classes the decoder and suppressor expect. Clones share
//! the same backing storage.

use crate::util::{YoloPostError, YoloPostResult};
use std::path::Path;
use std::sync::Arc;

/// Ordered, immutable list of class names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSet {
    names: Arc<[String]>,
}

impl LabelSet {
    /// Creates a label set from owned names.
    pub fn new(names: Vec<String>) -> YoloPostResult<Self> {
        if names.is_empty() {
            return Err(YoloPostError::EmptyLabelSet);
        }
        Ok(Self {
            names: names.into(),
        })
    }

    /// Parses one label per line.
    ///
    /// Every line becomes a label, including blank ones, so that line numbers
    /// stay aligned with class indices.
    pub fn from_lines(text: &str) -> YoloPostResult<Self> {
        Self::new(text.lines().map(str::to_owned).collect())
    }

    /// Reads a one-label-per-line text file.
    pub fn load<P: AsRef<Path>>(path: P) -> YoloPostResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|err| YoloPostError::LabelIo {
            reason: format!("{}: {err}", path.as_ref().display()),
        })?;
        Self::from_lines(&text)
    }

    /// Returns the number of classes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true when no labels are held; never the case for a built set.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the name for `class_index`.
    pub fn get(&self, class_index: usize) -> Option<&str> {
        self.names.get(class_index).map(String::as_str)
    }

    /// Iterates over names in class order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
