//! Root-to-item row paths.
//!
//! A path addresses an item of the hierarchy projection by the row index at
//! every level below the virtual root. The empty path is the root itself.

use core::fmt;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelPath(Vec<usize>);

impl ModelPath {
    /// The virtual root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_rows(rows: impl IntoIterator<Item = usize>) -> Self {
        Self(rows.into_iter().collect())
    }

    pub fn rows(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Row within the parent, `None` for the root.
    pub fn last_row(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent item, `None` for the root.
    pub fn parent(&self) -> Option<ModelPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Path of the child at `row`.
    pub fn child(&self, row: usize) -> ModelPath {
        let mut rows = Vec::with_capacity(self.0.len() + 1);
        rows.extend_from_slice(&self.0);
        rows.push(row);
        Self(rows)
    }

    /// True if `self` is `other` or lies below it.
    pub fn starts_with(&self, other: &ModelPath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl From<Vec<usize>> for ModelPath {
    fn from(rows: Vec<usize>) -> Self {
        Self(rows)
    }
}

impl From<&[usize]> for ModelPath {
    fn from(rows: &[usize]) -> Self {
        Self(rows.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for ModelPath {
    fn from(rows: [usize; N]) -> Self {
        Self(rows.to_vec())
    }
}

impl fmt::Debug for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelPath{:?}", self.0)
    }
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, row) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{row}")?;
        }
        Ok(())
    }
}
