//! Reverse port/link lookup.
//!
//! Four maps are kept in step: link to source, link to target, outlet to its
//! links and inlet to its links. The inlet lists are ordered and define the
//! row of each link under its inlet.

use std::collections::HashMap;

use df_core::{InletId, LinkId, OutletId};

use crate::error::{GraphError, GraphResult};

#[derive(Debug, Clone, Default)]
pub struct PortLinkIndex {
    link_source: HashMap<LinkId, OutletId>,
    link_target: HashMap<LinkId, InletId>,
    outlet_links: HashMap<OutletId, Vec<LinkId>>,
    inlet_links: HashMap<InletId, Vec<LinkId>>,
}

impl PortLinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of links tracked.
    pub fn len(&self) -> usize {
        self.link_target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.link_target.is_empty()
    }

    pub fn source(&self, link: LinkId) -> Option<OutletId> {
        self.link_source.get(&link).copied()
    }

    pub fn target(&self, link: LinkId) -> Option<InletId> {
        self.link_target.get(&link).copied()
    }

    pub fn contains(&self, link: LinkId) -> bool {
        self.link_target.contains_key(&link)
    }

    /// Links into `inlet`, in row order.
    pub fn inlet_links(&self, inlet: InletId) -> &[LinkId] {
        self.inlet_links.get(&inlet).map_or(&[], Vec::as_slice)
    }

    /// Links out of `outlet`, oldest first.
    pub fn outlet_links(&self, outlet: OutletId) -> &[LinkId] {
        self.outlet_links.get(&outlet).map_or(&[], Vec::as_slice)
    }

    /// Row of `link` under its target inlet.
    pub fn row(&self, link: LinkId) -> Option<usize> {
        let target = self.target(link)?;
        self.inlet_links(target).iter().position(|&l| l == link)
    }

    /// Register a new link at `row` under `target`.
    pub fn link(
        &mut self,
        link: LinkId,
        source: Option<OutletId>,
        target: InletId,
        row: usize,
    ) -> GraphResult<()> {
        if self.contains(link) {
            return Err(GraphError::inconsistent(format!("{link} indexed twice")));
        }
        let count = self.inlet_links(target).len();
        if row > count {
            return Err(GraphError::RowOutOfRange { row, count });
        }
        self.inlet_links.entry(target).or_default().insert(row, link);
        self.link_target.insert(link, target);
        if let Some(source) = source {
            self.link_source.insert(link, source);
            self.outlet_links.entry(source).or_default().push(link);
        }
        Ok(())
    }

    /// Forget `link`, returning its source, target and former row.
    pub fn unlink(&mut self, link: LinkId) -> GraphResult<(Option<OutletId>, InletId, usize)> {
        let target = self
            .link_target
            .remove(&link)
            .ok_or_else(|| GraphError::inconsistent(format!("{link} is not indexed")))?;
        let row = remove_from(&mut self.inlet_links, target, link)
            .ok_or_else(|| GraphError::inconsistent(format!("{link} missing under {target}")))?;
        let source = self.link_source.remove(&link);
        if let Some(source) = source {
            remove_from(&mut self.outlet_links, source, link).ok_or_else(|| {
                GraphError::inconsistent(format!("{link} missing under {source}"))
            })?;
        }
        Ok((source, target, row))
    }

    /// Move `link` to a new source (or detach it), returning the old source.
    pub fn set_source(
        &mut self,
        link: LinkId,
        source: Option<OutletId>,
    ) -> GraphResult<Option<OutletId>> {
        if !self.contains(link) {
            return Err(GraphError::inconsistent(format!("{link} is not indexed")));
        }
        let previous = self.link_source.remove(&link);
        if let Some(old) = previous {
            remove_from(&mut self.outlet_links, old, link)
                .ok_or_else(|| GraphError::inconsistent(format!("{link} missing under {old}")))?;
        }
        if let Some(new) = source {
            self.link_source.insert(link, new);
            self.outlet_links.entry(new).or_default().push(link);
        }
        Ok(previous)
    }

    /// Every indexed link, in no particular order.
    pub fn links(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.link_target.keys().copied()
    }

    /// Check that the four maps agree with each other.
    pub fn check(&self) -> GraphResult<()> {
        let mut seen = 0;
        for (&inlet, links) in &self.inlet_links {
            for &link in links {
                seen += 1;
                if self.target(link) != Some(inlet) {
                    return Err(GraphError::inconsistent(format!(
                        "{link} listed under {inlet} but targets {:?}",
                        self.target(link)
                    )));
                }
            }
        }
        if seen != self.link_target.len() {
            return Err(GraphError::inconsistent(format!(
                "{} links targeted but {seen} listed under inlets",
                self.link_target.len()
            )));
        }

        let mut seen = 0;
        for (&outlet, links) in &self.outlet_links {
            for &link in links {
                seen += 1;
                if self.source(link) != Some(outlet) {
                    return Err(GraphError::inconsistent(format!(
                        "{link} listed under {outlet} but sourced from {:?}",
                        self.source(link)
                    )));
                }
            }
        }
        if seen != self.link_source.len() {
            return Err(GraphError::inconsistent(format!(
                "{} links sourced but {seen} listed under outlets",
                self.link_source.len()
            )));
        }

        if let Some(link) = self.link_source.keys().find(|l| !self.contains(**l)) {
            return Err(GraphError::inconsistent(format!(
                "{link} has a source but no target"
            )));
        }
        Ok(())
    }
}

/// Remove `link` from the list under `key`, dropping emptied lists.
fn remove_from<K>(map: &mut HashMap<K, Vec<LinkId>>, key: K, link: LinkId) -> Option<usize>
where
    K: std::hash::Hash + Eq,
{
    let list = map.get_mut(&key)?;
    let pos = list.iter().position(|&l| l == link)?;
    list.remove(pos);
    if list.is_empty() {
        map.remove(&key);
    }
    Some(pos)
}
