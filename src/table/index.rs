use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{GeoFrameError, Result};

/// A row label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Str(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(value) => write!(f, "{value}"),
            Label::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Str(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Str(value)
    }
}

/// The row labels of a series or table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIndex {
    labels: Vec<Label>,
}

impl RowIndex {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    /// `0..len`
    pub fn range(len: usize) -> Self {
        Self::new((0..len as i64).map(Label::Int).collect())
    }

    /// Whether this is the default `0..len` index.
    pub fn is_range(&self) -> bool {
        self.labels
            .iter()
            .enumerate()
            .all(|(i, label)| *label == Label::Int(i as i64))
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn check_unique(&self) -> Result<()> {
        if let Some(label) = self.labels.iter().duplicates().next() {
            return Err(GeoFrameError::InvalidValue(
                format!("cannot align on an index with duplicate label '{label}'").into(),
            ));
        }
        Ok(())
    }

    /// Sorted union of two unique indexes, the outer join of their labels.
    pub fn union(&self, other: &RowIndex) -> Result<RowIndex> {
        self.check_unique()?;
        other.check_unique()?;
        let labels = self
            .labels
            .iter()
            .chain(other.labels.iter())
            .sorted()
            .dedup()
            .cloned()
            .collect();
        Ok(RowIndex::new(labels))
    }

    /// For every label of `target`, its position in this index, or `-1` if absent.
    pub fn positions_of(&self, target: &RowIndex) -> Result<Vec<i64>> {
        self.check_unique()?;
        let positions: HashMap<&Label, i64> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label, i as i64))
            .collect();
        Ok(target
            .labels
            .iter()
            .map(|label| positions.get(label).copied().unwrap_or(-1))
            .collect())
    }

    /// Positional subset of the labels.
    pub(crate) fn take(&self, positions: &[usize]) -> RowIndex {
        RowIndex::new(positions.iter().map(|&i| self.labels[i].clone()).collect())
    }
}

impl From<Vec<Label>> for RowIndex {
    fn from(value: Vec<Label>) -> Self {
        Self::new(value)
    }
}

impl FromIterator<Label> for RowIndex {
    fn from_iter<T: IntoIterator<Item = Label>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    fn index(labels: &[i64]) -> RowIndex {
        labels.iter().copied().map(Label::Int).collect()
    }

    #[test]
    fn range() {
        assert!(RowIndex::range(3).is_range());
        assert!(!index(&[1, 2]).is_range());
        assert_eq!(RowIndex::range(2), index(&[0, 1]));
    }

    #[test]
    fn outer_join_is_sorted() {
        let union = index(&[3, 1]).union(&index(&[2, 3])).unwrap();
        assert_eq!(union, index(&[1, 2, 3]));
        let positions = index(&[3, 1]).positions_of(&union).unwrap();
        assert_eq!(positions, vec![1, -1, 0]);
    }

    #[test]
    fn duplicates_cannot_align() {
        let err = index(&[1, 1]).union(&index(&[1])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn serde_untagged() {
        let idx = RowIndex::new(vec![Label::Int(1), Label::from("a")]);
        let json = serde_json::to_string(&idx).unwrap();
        assert_eq!(json, r#"[1,"a"]"#);
        assert_eq!(serde_json::from_str::<RowIndex>(&json).unwrap(), idx);
    }
}
