//! Port diff planned before an expression is assigned.
//!
//! Inlets are matched to the new free variables by position: trailing inlets
//! beyond the new variable count are dropped, missing trailing positions are
//! appended, and every kept inlet takes the name of the variable at its
//! position. Links stay attached to the inlet object, so when variables are
//! reordered without changing their count a link can end up on an inlet
//! that now carries a different name.

use df_core::{InletId, NodeId};
use df_expr::Analyzer;

/// Planned inlet/outlet changes for one expression assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct PortDiff {
    pub(crate) node: NodeId,
    pub(crate) analyzer: Analyzer,
    pub(crate) identical: bool,
    pub(crate) keep: usize,
    pub(crate) removed: Vec<InletId>,
    pub(crate) added: Vec<String>,
    pub(crate) renamed: Vec<(usize, InletId, String)>,
    pub(crate) outlet: Option<String>,
}

impl PortDiff {
    /// Compare `current` inlets (with their names) against `analyzer`'s variables.
    pub(crate) fn plan(
        node: NodeId,
        current: &[(InletId, &str)],
        previous_source: Option<&str>,
        analyzer: Analyzer,
        outlet: Option<String>,
    ) -> Self {
        let identical = previous_source == Some(analyzer.source());
        let variables = analyzer.free_variables();
        let keep = current.len().min(variables.len());

        let removed = current[keep..].iter().map(|(id, _)| *id).collect();
        let added = variables[keep..].to_vec();
        let renamed = current[..keep]
            .iter()
            .zip(variables)
            .enumerate()
            .filter(|(_, ((_, old), new))| old != new)
            .map(|(row, ((id, _), new))| (row, *id, new.clone()))
            .collect();

        Self {
            node,
            analyzer,
            identical,
            keep,
            removed,
            added,
            renamed,
            outlet,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// The new text equals the current one; applying changes nothing.
    pub fn is_identical(&self) -> bool {
        self.identical
    }

    /// Row of the first removed or added inlet.
    pub fn first_changed_row(&self) -> usize {
        self.keep
    }

    /// Inlets to drop, in row order starting at [`first_changed_row`](Self::first_changed_row).
    pub fn removed_inlets(&self) -> &[InletId] {
        &self.removed
    }

    /// Names of inlets to append, in row order starting at [`first_changed_row`](Self::first_changed_row).
    pub fn added_names(&self) -> &[String] {
        &self.added
    }

    /// Kept inlets whose name changes: `(row, inlet, new name)`.
    pub fn renamed(&self) -> &[(usize, InletId, String)] {
        &self.renamed
    }

    /// Name of the outlet created by this assignment, if it is the first one.
    pub fn new_outlet(&self) -> Option<&str> {
        self.outlet.as_deref()
    }

    /// Inlet count once the diff is applied.
    pub fn final_inlet_count(&self) -> usize {
        self.keep + self.added.len()
    }

    pub fn is_structural(&self) -> bool {
        !self.removed.is_empty() || !self.added.is_empty() || self.outlet.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(current: &[&str], expr: &str) -> PortDiff {
        let ids: Vec<(InletId, &str)> = current
            .iter()
            .enumerate()
            .map(|(i, name)| (InletId::from_index(i as u32), *name))
            .collect();
        PortDiff::plan(
            NodeId::from_index(0),
            &ids,
            None,
            Analyzer::parse(expr).unwrap(),
            None,
        )
    }

    #[test]
    fn fresh_node_appends_every_variable() {
        let diff = plan(&[], "a + b");
        assert_eq!(diff.added_names(), ["a", "b"]);
        assert!(diff.removed_inlets().is_empty());
        assert_eq!(diff.first_changed_row(), 0);
    }

    #[test]
    fn fewer_variables_drop_trailing_inlets() {
        let diff = plan(&["x", "y"], "x*x");
        assert_eq!(diff.removed_inlets(), [InletId::from_index(1)]);
        assert!(diff.added_names().is_empty());
        assert!(diff.renamed().is_empty());
        assert_eq!(diff.final_inlet_count(), 1);
    }

    #[test]
    fn same_count_renames_by_position() {
        let diff = plan(&["x", "y"], "y - x");
        assert_eq!(
            diff.renamed(),
            [
                (0, InletId::from_index(0), "y".to_string()),
                (1, InletId::from_index(1), "x".to_string()),
            ]
        );
        assert!(!diff.is_structural());
    }

    #[test]
    fn more_variables_append_after_renames() {
        let diff = plan(&["a", "b"], "b + c + d");
        assert_eq!(diff.added_names(), ["d"]);
        assert_eq!(diff.renamed().len(), 2);
        assert_eq!(diff.final_inlet_count(), 3);
    }

    #[test]
    fn surviving_name_past_the_new_count_is_still_dropped() {
        let diff = plan(&["a", "b", "c"], "c");
        assert_eq!(
            diff.removed_inlets(),
            [InletId::from_index(1), InletId::from_index(2)]
        );
        assert_eq!(diff.renamed(), [(0, InletId::from_index(0), "c".to_string())]);
        assert!(diff.added_names().is_empty());
        assert_eq!(diff.final_inlet_count(), 1);
    }
}
