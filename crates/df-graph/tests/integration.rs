//! Integration tests for df-graph.

use df_core::NodeId;
use df_graph::{GraphBuilder, GraphError, GraphStore, PortRef};

fn inlet_names(store: &GraphStore, node: NodeId) -> Vec<String> {
    store
        .inlets(node)
        .iter()
        .map(|&i| store.inlet(i).unwrap().name.clone())
        .collect()
}

#[test]
fn two_node_script() {
    // A = a + b  ->  B = x*x
    let mut store = GraphStore::new();
    let a = store.create_node("A").unwrap();
    let b = store.create_node("B").unwrap();
    store.set_expression(a, "a + b").unwrap();
    store.set_expression(b, "x*x").unwrap();

    assert_eq!(inlet_names(&store, a), vec!["a", "b"]);
    assert_eq!(inlet_names(&store, b), vec!["x"]);
    assert_eq!(store.outlets(a).len(), 1);

    let outlet = store.outlets(a)[0];
    let inlet = store.inlets(b)[0];
    let link = store.insert_link(inlet, 0, Some(outlet)).unwrap();

    assert_eq!(store.link_source(link), Some(outlet));
    assert_eq!(store.link_target(link), Some(inlet));
    assert_eq!(store.build_script(b).unwrap(), "A = a + b\nB = A * A\n");
    store.validate().unwrap();
}

#[test]
fn shrinking_expression_cascades_trailing_links() {
    let mut store = GraphStore::new();
    let src = store.create_node("S").unwrap();
    let n = store.create_node("A").unwrap();
    store.set_expression(src, "1").unwrap();
    store.set_expression(n, "x*y").unwrap();

    let outlet = store.outlets(src)[0];
    let x = store.inlets(n)[0];
    let y = store.inlets(n)[1];
    let on_x = store.insert_link(x, 0, Some(outlet)).unwrap();
    let on_y = store.insert_link(y, 0, Some(outlet)).unwrap();

    store.set_expression(n, "x*x").unwrap();

    assert_eq!(inlet_names(&store, n), vec!["x"]);
    assert_eq!(store.inlets(n), &[x]);
    assert!(store.link(on_x).is_some());
    assert!(store.link(on_y).is_none());
    assert_eq!(store.links_of(PortRef::Outlet(outlet)), &[on_x]);
    assert!(store.inlet(y).is_none());
    store.validate().unwrap();
}

#[test]
fn growing_expression_appends_inlets() {
    let mut store = GraphStore::new();
    let n = store.create_node("n").unwrap();
    store.set_expression(n, "x").unwrap();
    let x = store.inlets(n)[0];
    store.set_expression(n, "x + y + z").unwrap();
    assert_eq!(inlet_names(&store, n), vec!["x", "y", "z"]);
    assert_eq!(store.inlets(n)[0], x);
}

#[test]
fn reordered_variables_rename_inlets_in_place() {
    // The link stays on the first inlet object even though its name changes.
    let mut store = GraphStore::new();
    let src = store.create_node("S").unwrap();
    let n = store.create_node("N").unwrap();
    store.set_expression(src, "0").unwrap();
    store.set_expression(n, "a - b").unwrap();
    let first = store.inlets(n)[0];
    let link = store
        .insert_link(first, 0, Some(store.outlets(src)[0]))
        .unwrap();

    store.set_expression(n, "b - a").unwrap();

    assert_eq!(inlet_names(&store, n), vec!["b", "a"]);
    assert_eq!(store.link_target(link), Some(first));
    assert_eq!(store.inlet(first).unwrap().name, "b");
    assert_eq!(store.build_script(n).unwrap(), "S = 0\nN = S - a\n");
}

#[test]
fn setting_same_expression_twice_changes_nothing() {
    let mut store = GraphStore::new();
    let n = store.create_node("n").unwrap();
    let first = store.set_expression(n, "p * q").unwrap();
    assert!(first.is_structural());
    let second = store.set_expression(n, "p * q").unwrap();
    assert!(second.is_identical());
    assert_eq!(inlet_names(&store, n), vec!["p", "q"]);
}

#[test]
fn removing_a_node_clears_every_reference() {
    let mut builder = GraphBuilder::new();
    builder
        .add_node("A", "1")
        .add_node("B", "u + v")
        .add_node("C", "w")
        .add_link("A", "B", "u")
        .add_link("A", "B", "v")
        .add_link("B", "C", "w");
    let mut store = builder.build().unwrap();
    let a = store.node_by_name("A").unwrap();
    let b = store.node_by_name("B").unwrap();
    let c = store.node_by_name("C").unwrap();
    let a_out = store.outlets(a)[0];
    let c_in = store.inlets(c)[0];

    let removed = store.remove_node(b).unwrap();
    assert_eq!(removed.len(), 3);
    assert!(store.links_of(PortRef::Outlet(a_out)).is_empty());
    assert!(store.links_of(PortRef::Inlet(c_in)).is_empty());
    assert!(store.index().is_empty());
    assert_eq!(store.ancestors(c).unwrap(), vec![c]);
    store.validate().unwrap();

    assert!(matches!(
        store.remove_node(b),
        Err(GraphError::StaleId { .. })
    ));
}

#[test]
fn ancestors_never_repeat_start() {
    let mut builder = GraphBuilder::new();
    builder
        .add_node("A", "1")
        .add_node("B", "a")
        .add_node("C", "a + b")
        .add_link("A", "B", "a")
        .add_link("A", "C", "a")
        .add_link("B", "C", "b");
    let store = builder.build().unwrap();
    let c = store.node_by_name("C").unwrap();
    let ancestors = store.ancestors(c).unwrap();
    assert_eq!(ancestors.len(), 3);
    assert_eq!(ancestors[0], c);
    assert_eq!(
        store.build_script(c).unwrap(),
        "A = 1\nB = A\nC = A + B\n"
    );
}

#[test]
fn empty_store() {
    let store = GraphBuilder::new().build().unwrap();
    assert!(store.nodes().is_empty());
    assert_eq!(store.link_count(), 0);
    assert!(store.node(NodeId::from_index(0)).is_none());
}

#[test]
fn large_chain() {
    let mut builder = GraphBuilder::new();
    builder.add_node("n0", "1");
    for i in 1..100 {
        builder.add_node(format!("n{i}"), "prev + 1");
        builder.add_link(format!("n{}", i - 1), format!("n{i}"), "prev");
    }
    let store = builder.build().unwrap();
    let last = store.node_by_name("n99").unwrap();

    let script = store.build_script(last).unwrap();
    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(lines.len(), 100);
    assert_eq!(lines[0], "n0 = 1");
    assert_eq!(lines[99], "n99 = n98 + 1");
}
