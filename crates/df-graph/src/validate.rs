//! Store validation logic.

use std::collections::HashSet;

use df_core::NodeId;

use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;

/// Validate the store: all references exist, ports agree with their nodes,
/// links agree with the port-link index.
pub(crate) fn validate_store(store: &GraphStore) -> GraphResult<()> {
    validate_nodes(store)?;
    validate_ports(store)?;
    validate_links(store)?;
    store.index.check()
}

fn validate_nodes(store: &GraphStore) -> GraphResult<()> {
    let mut seen: HashSet<NodeId> = HashSet::new();
    for &id in &store.order {
        if !seen.insert(id) {
            return Err(GraphError::inconsistent(format!("{id} appears twice in row order")));
        }
        if !store.nodes.contains_key(&id) {
            return Err(GraphError::inconsistent(format!("{id} ordered but not stored")));
        }
    }
    if seen.len() != store.nodes.len() {
        return Err(GraphError::inconsistent("stored node missing from row order"));
    }

    let mut names = HashSet::new();
    for node in store.nodes.values() {
        if !names.insert(node.name.as_str()) {
            return Err(GraphError::DuplicateName {
                name: node.name.clone(),
            });
        }
    }
    Ok(())
}

fn validate_ports(store: &GraphStore) -> GraphResult<()> {
    let mut inlet_count = 0;
    let mut outlet_count = 0;
    for node in store.nodes.values() {
        let mut names = HashSet::new();
        for &id in &node.inlets {
            inlet_count += 1;
            let inlet = store
                .inlets
                .get(&id)
                .ok_or_else(|| GraphError::inconsistent(format!("{} lists missing {id}", node.id)))?;
            if inlet.node != node.id {
                return Err(GraphError::inconsistent(format!(
                    "{id} listed under {} but owned by {}",
                    node.id, inlet.node
                )));
            }
            if !names.insert(inlet.name.as_str()) {
                return Err(GraphError::inconsistent(format!(
                    "{} has two inlets named {:?}",
                    node.id, inlet.name
                )));
            }
        }
        for &id in &node.outlets {
            outlet_count += 1;
            let outlet = store
                .outlets
                .get(&id)
                .ok_or_else(|| GraphError::inconsistent(format!("{} lists missing {id}", node.id)))?;
            if outlet.node != node.id {
                return Err(GraphError::inconsistent(format!(
                    "{id} listed under {} but owned by {}",
                    node.id, outlet.node
                )));
            }
        }
    }
    if inlet_count != store.inlets.len() || outlet_count != store.outlets.len() {
        return Err(GraphError::inconsistent("port not listed under any node"));
    }
    Ok(())
}

fn validate_links(store: &GraphStore) -> GraphResult<()> {
    if store.index.len() != store.links.len() {
        return Err(GraphError::inconsistent(format!(
            "{} links stored but {} indexed",
            store.links.len(),
            store.index.len()
        )));
    }
    for link in store.links.values() {
        if !store.inlets.contains_key(&link.target) {
            return Err(GraphError::inconsistent(format!(
                "{} targets missing {}",
                link.id, link.target
            )));
        }
        if let Some(source) = link.source
            && !store.outlets.contains_key(&source)
        {
            return Err(GraphError::inconsistent(format!(
                "{} sourced from missing {source}",
                link.id
            )));
        }
        if store.index.target(link.id) != Some(link.target)
            || store.index.source(link.id) != link.source
        {
            return Err(GraphError::inconsistent(format!(
                "{} disagrees with the index",
                link.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_core::{InletId, LinkId};

    use crate::graph::Link;

    fn two_linked_nodes() -> (GraphStore, LinkId) {
        let mut store = GraphStore::new();
        let a = store.create_node("A").unwrap();
        let b = store.create_node("B").unwrap();
        store.set_expression(a, "1").unwrap();
        store.set_expression(b, "x").unwrap();
        let link = store
            .insert_link(store.inlets(b)[0], 0, Some(store.outlets(a)[0]))
            .unwrap();
        (store, link)
    }

    #[test]
    fn validate_empty_store() {
        assert!(validate_store(&GraphStore::new()).is_ok());
    }

    #[test]
    fn validate_linked_store() {
        let (store, _) = two_linked_nodes();
        assert!(validate_store(&store).is_ok());
    }

    #[test]
    fn link_missing_from_index_is_reported() {
        let (mut store, link) = two_linked_nodes();
        store.index.unlink(link).unwrap();
        assert!(matches!(
            validate_store(&store),
            Err(GraphError::InconsistentIndex { .. })
        ));
    }

    #[test]
    fn dangling_target_is_reported() {
        let (mut store, link) = two_linked_nodes();
        store.links.insert(
            link,
            Link {
                id: link,
                source: None,
                target: InletId::from_index(99),
            },
        );
        assert!(validate_store(&store).is_err());
    }
}
