//! Path-addressed map from projection items to rendered proxies.
//!
//! The forward side is a tree of ordered child slots mirroring the
//! projection, so inserting or removing a slot shifts its later siblings the
//! same way the projection's rows shift. The reverse side (proxy to path) is
//! a cache rebuilt on first use after any structural edit.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::hash::Hash;

use df_core::ModelPath;
use tracing::trace;

use crate::error::{ProxyIndexError, ProxyIndexResult};

#[derive(Debug, Clone)]
struct Slot<P> {
    proxy: P,
    children: Vec<Slot<P>>,
}

impl<P: Clone> Slot<P> {
    fn collect_into(&self, out: &mut Vec<P>) {
        out.push(self.proxy.clone());
        for child in &self.children {
            child.collect_into(out);
        }
    }
}

#[derive(Debug, Clone)]
pub struct PositionProxyIndex<P> {
    roots: Vec<Slot<P>>,
    reverse: OnceCell<HashMap<P, ModelPath>>,
}

impl<P> Default for PositionProxyIndex<P> {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            reverse: OnceCell::new(),
        }
    }
}

impl<P: Clone + Eq + Hash> PositionProxyIndex<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of proxies held.
    pub fn len(&self) -> usize {
        fn count<P>(slots: &[Slot<P>]) -> usize {
            slots.iter().map(|s| 1 + count(&s.children)).sum()
        }
        count(&self.roots)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Insert `proxy` at `path`, shifting the slot there and its later
    /// siblings down by one. The parent slot must already exist.
    pub fn insert(&mut self, path: &ModelPath, proxy: P) -> ProxyIndexResult<()> {
        let (&row, parent) = path.rows().split_last().ok_or(ProxyIndexError::EmptyPath)?;
        let siblings = self.children_mut(parent, path)?;
        if row > siblings.len() {
            return Err(ProxyIndexError::PathOutOfRange {
                path: path.clone(),
                depth: path.depth() - 1,
            });
        }
        siblings.insert(
            row,
            Slot {
                proxy,
                children: Vec::new(),
            },
        );
        self.reverse.take();
        Ok(())
    }

    /// Remove the slot at `path` with its subtree; returns its proxies,
    /// parents before children.
    pub fn remove(&mut self, path: &ModelPath) -> ProxyIndexResult<Vec<P>> {
        let (&row, parent) = path.rows().split_last().ok_or(ProxyIndexError::EmptyPath)?;
        let siblings = self.children_mut(parent, path)?;
        if row >= siblings.len() {
            return Err(ProxyIndexError::PathOutOfRange {
                path: path.clone(),
                depth: path.depth() - 1,
            });
        }
        let slot = siblings.remove(row);
        self.reverse.take();

        let mut removed = Vec::new();
        slot.collect_into(&mut removed);
        Ok(removed)
    }

    pub fn get(&self, path: &ModelPath) -> Option<&P> {
        let mut slots = &self.roots;
        let mut found = None;
        for &row in path.rows() {
            let slot = slots.get(row)?;
            found = Some(&slot.proxy);
            slots = &slot.children;
        }
        found
    }

    /// Current path of `proxy`.
    pub fn path_of(&self, proxy: &P) -> Option<ModelPath> {
        self.reverse
            .get_or_init(|| {
                let mut map = HashMap::new();
                Self::walk(&self.roots, &mut Vec::new(), &mut map);
                trace!(entries = map.len(), "rebuilt proxy path cache");
                map
            })
            .get(proxy)
            .cloned()
    }

    /// Drop every slot; returns the proxies that were held.
    pub fn clear(&mut self) -> Vec<P> {
        let mut removed = Vec::new();
        for slot in self.roots.drain(..) {
            slot.collect_into(&mut removed);
        }
        self.reverse.take();
        removed
    }

    fn walk(slots: &[Slot<P>], prefix: &mut Vec<usize>, map: &mut HashMap<P, ModelPath>) {
        for (row, slot) in slots.iter().enumerate() {
            prefix.push(row);
            map.insert(slot.proxy.clone(), ModelPath::from(prefix.as_slice()));
            Self::walk(&slot.children, prefix, map);
            prefix.pop();
        }
    }

    fn children_mut(
        &mut self,
        rows: &[usize],
        path: &ModelPath,
    ) -> ProxyIndexResult<&mut Vec<Slot<P>>> {
        let mut slots = &mut self.roots;
        for (depth, &row) in rows.iter().enumerate() {
            slots = match slots.get_mut(row) {
                Some(slot) => &mut slot.children,
                None => {
                    return Err(ProxyIndexError::PathOutOfRange {
                        path: path.clone(),
                        depth,
                    });
                }
            };
        }
        Ok(slots)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn path_of_follows_inserts(rows in prop::collection::vec(0usize..8, 1..24)) {
            let mut index = PositionProxyIndex::new();
            for (proxy, row) in rows.iter().enumerate() {
                let at = (*row).min(index.len());
                let target = ModelPath::from([at]);
                index.insert(&target, proxy).unwrap();
                prop_assert_eq!(index.path_of(&proxy), Some(target));
            }
            for proxy in 0..rows.len() {
                let found = index.path_of(&proxy).unwrap();
                prop_assert_eq!(index.get(&found), Some(&proxy));
            }
        }
    }
}
