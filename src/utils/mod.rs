use crate::graph::Graph;

/// Graph with vertices `1..=num_nodes` and unit-weight edges between the given ids.
pub(crate) fn unit_graph(num_nodes: usize, edges: &[(i64, i64)]) -> Graph {
    let mut graph = Graph::new();
    for id in 1..=num_nodes as i64 {
        graph
            .add_vertex(id, vec![id.to_string()])
            .expect("fresh vertex id");
    }
    for &(a, b) in edges {
        graph
            .add_edge(a, b, 1.0, format!("{a},{b},1.0"))
            .expect("edge between known vertices");
    }
    graph
}

pub(crate) fn new_path(num_nodes: usize) -> Graph {
    let edges: Vec<_> = (1..num_nodes as i64).map(|i| (i, i + 1)).collect();
    unit_graph(num_nodes, &edges)
}

pub(crate) fn new_cycle(num_nodes: usize) -> Graph {
    let n = num_nodes as i64;
    let edges: Vec<_> = (1..=n).map(|i| (i, i % n + 1)).collect();
    unit_graph(num_nodes, &edges)
}

pub(crate) fn new_clique(num_nodes: usize) -> Graph {
    let n = num_nodes as i64;
    let mut edges = Vec::new();
    for i in 1..=n {
        for j in i + 1..=n {
            edges.push((i, j));
        }
    }
    unit_graph(num_nodes, &edges)
}
