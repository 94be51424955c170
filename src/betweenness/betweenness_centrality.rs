use crate::error::{Error, Result};
use crate::graph::Graph;
use dsi_progress_logger::ProgressLog;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Assignment of sources to one worker out of `total`.
///
/// The vertex at insertion position `i` belongs to worker `i % total`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    ordinal: usize,
    total: usize,
}

impl Partition {
    pub fn new(ordinal: usize, total: usize) -> Result<Self> {
        if total == 0 || ordinal >= total {
            return Err(Error::InvalidPartition { ordinal, total });
        }
        Ok(Partition { ordinal, total })
    }

    /// The partition covering every vertex.
    pub fn single() -> Self {
        Partition {
            ordinal: 0,
            total: 1,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn owns(&self, position: usize) -> bool {
        position % self.total == self.ordinal
    }

    /// Positions of the sources assigned to this worker among `num_vertices`.
    pub fn sources(&self, num_vertices: usize) -> impl Iterator<Item = usize> {
        (self.ordinal..num_vertices).step_by(self.total)
    }
}

/// Per-run shortest-path state, reset before every source.
struct Scratch {
    distance: Box<[f64]>,
    predecessor: Box<[Option<usize>]>,
    /// Vertices in the order they were settled.
    settled: Vec<usize>,
    /// Number of settled vertices whose tree path goes through each vertex.
    below: Box<[u64]>,
    queue: BinaryHeap<Reverse<(u64, usize)>>,
}

impl Scratch {
    fn new(num_nodes: usize) -> Self {
        Scratch {
            distance: vec![f64::INFINITY; num_nodes].into_boxed_slice(),
            predecessor: vec![None; num_nodes].into_boxed_slice(),
            settled: Vec::with_capacity(num_nodes),
            below: vec![0; num_nodes].into_boxed_slice(),
            queue: BinaryHeap::new(),
        }
    }

    fn reset(&mut self) {
        self.distance.fill(f64::INFINITY);
        self.predecessor.fill(None);
        self.settled.clear();
        self.queue.clear();
    }

    /// Dijkstra from `source`, leaving a shortest-path tree in `predecessor`.
    ///
    /// Weights must be non-negative: distances are ordered through their bit
    /// patterns, which only agrees with the float order for non-negative values.
    fn visit(&mut self, graph: &Graph, source: usize) {
        self.reset();
        self.distance[source] = 0.;
        self.queue.push(Reverse((0f64.to_bits(), source)));

        while let Some(Reverse((bits, node))) = self.queue.pop() {
            let d = f64::from_bits(bits);
            if d > self.distance[node] {
                continue;
            }
            self.settled.push(node);
            for &(edge, s) in graph.neighbors_of(node) {
                let candidate = d + graph.edge(edge).weight;
                if candidate < self.distance[s] {
                    self.distance[s] = candidate;
                    self.predecessor[s] = Some(node);
                    self.queue.push(Reverse((candidate.to_bits(), s)));
                }
            }
        }
    }

    /// Adds to `graph` one count per vertex for each tree path it lies on.
    ///
    /// Walking from every reached vertex back to the source touches each
    /// vertex once per descendant (itself included), so the counts are the
    /// subtree sizes, accumulated children-first over the reverse settle order.
    /// The source gets one count per other reached vertex.
    fn accumulate(&mut self, graph: &mut Graph) {
        for &node in &self.settled {
            self.below[node] = 1;
        }
        for &node in self.settled[1..].iter().rev() {
            let below = self.below[node];
            graph.add_centrality(node, below);
            if let Some(p) = self.predecessor[node] {
                self.below[p] += below;
            }
        }
        let source = self.settled[0];
        graph.add_centrality(source, self.below[source] - 1);
    }
}

/// Runs one shortest-path pass from every source owned by `partition` and adds
/// the resulting path counts to the vertices of `graph`.
///
/// Returns the number of sources processed.
pub fn compute(graph: &mut Graph, partition: Partition, pl: &mut impl ProgressLog) -> usize {
    let num_nodes = graph.num_vertices();
    let num_sources = partition.sources(num_nodes).count();

    pl.item_name("visit").expected_updates(Some(num_sources));
    pl.start(format!(
        "Computing centrality counts for worker {} of {} ({num_sources} sources)...",
        partition.ordinal(),
        partition.total()
    ));

    let mut scratch = Scratch::new(num_nodes);
    for source in partition.sources(num_nodes) {
        scratch.visit(graph, source);
        scratch.accumulate(graph);
        pl.update();
    }

    pl.done();
    num_sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gdf::{write_partial, GdfSections};
    use crate::utils::{new_clique, new_cycle, new_path, unit_graph};
    use dsi_progress_logger::no_logging;

    fn counts(graph: &Graph) -> Vec<u64> {
        graph.vertices().iter().map(|v| v.centrality).collect()
    }

    /// Literal back-walk from every reached vertex to the source.
    fn walk_counts(graph: &Graph) -> Vec<u64> {
        let n = graph.num_vertices();
        let mut result = vec![0u64; n];
        let mut scratch = Scratch::new(n);
        for source in 0..n {
            scratch.visit(graph, source);
            for v in 0..n {
                if scratch.predecessor[v].is_none() {
                    continue;
                }
                let mut x = Some(v);
                while let Some(node) = x {
                    result[node] += 1;
                    x = scratch.predecessor[node];
                }
            }
        }
        result
    }

    #[test]
    fn test_partition_rejects_bad_ordinal() {
        assert!(Partition::new(0, 0).is_err());
        assert!(Partition::new(3, 3).is_err());
        assert!(Partition::new(2, 3).is_ok());
        assert_eq!(Partition::single(), Partition::new(0, 1).unwrap());
    }

    #[test]
    fn test_partition_covers_each_vertex_once() {
        for n in [0, 1, 2, 7, 64, 101] {
            for total in 1..=9 {
                let mut owners = vec![0usize; n];
                for ordinal in 0..total {
                    let p = Partition::new(ordinal, total).unwrap();
                    for position in p.sources(n) {
                        assert!(p.owns(position));
                        owners[position] += 1;
                    }
                    assert_eq!(
                        p.sources(n).count(),
                        (0..n).filter(|&i| p.owns(i)).count()
                    );
                }
                assert!(owners.iter().all(|&c| c == 1), "n={n} total={total}");
            }
        }
    }

    #[test]
    fn test_path() {
        let mut g = new_path(4);
        let processed = compute(&mut g, Partition::single(), no_logging!());
        assert_eq!(processed, 4);
        assert_eq!(counts(&g), vec![6, 10, 10, 6]);
    }

    #[test]
    fn test_single_source() {
        // 1 - 2 - 3 - 4 from vertex 1 only: paths 2, 3-2, 4-3-2 end in 1.
        let mut g = new_path(4);
        let p = Partition::new(0, 4).unwrap();
        assert_eq!(compute(&mut g, p, no_logging!()), 1);
        assert_eq!(counts(&g), vec![3, 3, 2, 1]);
    }

    #[test]
    fn test_isolated_source_counts_nothing() {
        let mut g = unit_graph(3, &[(1, 2)]);
        compute(&mut g, Partition::single(), no_logging!());
        assert_eq!(counts(&g), vec![2, 2, 0]);
    }

    #[test]
    fn test_weights_pick_shortest_route() {
        let source = "nodedef>name\n1\n2\n3\nedgedef>a,b,w\n1,2,1\n2,3,1\n1,3,5\n";
        let mut g = GdfSections::split("w", source).unwrap().to_graph().unwrap();
        let p = Partition::new(0, 3).unwrap();
        compute(&mut g, p, no_logging!());
        // 3 is reached through 2
        assert_eq!(counts(&g), vec![2, 2, 1]);
    }

    #[test]
    fn test_zero_weights() {
        let source = "nodedef>name\n1\n2\n3\nedgedef>a,b,w\n1,2,0\n2,3,0.0\n";
        let mut g = GdfSections::split("z", source).unwrap().to_graph().unwrap();
        compute(&mut g, Partition::single(), no_logging!());
        assert_eq!(counts(&g), walk_counts(&g));
        assert_eq!(counts(&g), vec![4, 6, 4]);
    }

    #[test]
    fn test_self_loop_does_not_change_counts() {
        let plain = "nodedef>name\n4\n5\n6\nedgedef>a,b,w\n4,5,1.0\n5,6,2.0\n";
        let looped = "nodedef>name\n4\n5\n6\nedgedef>a,b,w\n4,5,1.0\n5,5,1.0\n5,6,2.0\n";

        let mut g = GdfSections::split("plain", plain).unwrap().to_graph().unwrap();
        let mut h = GdfSections::split("loop", looped).unwrap().to_graph().unwrap();
        compute(&mut g, Partition::single(), no_logging!());
        compute(&mut h, Partition::single(), no_logging!());
        assert_eq!(counts(&g), counts(&h));
    }

    #[test]
    fn test_clique() {
        for size in [2, 5, 10, 50] {
            let mut g = new_clique(size);
            compute(&mut g, Partition::single(), no_logging!());
            let expected = 2 * (size as u64 - 1);
            assert!(counts(&g).iter().all(|&c| c == expected), "size={size}");
        }
    }

    #[test]
    fn test_odd_cycle() {
        for m in [1u64, 2, 5, 20] {
            let size = (2 * m + 1) as usize;
            let mut g = new_cycle(size);
            compute(&mut g, Partition::single(), no_logging!());
            let expected = 2 * m + m * (m + 1);
            assert!(counts(&g).iter().all(|&c| c == expected), "size={size}");
        }
    }

    #[test]
    fn test_matches_back_walk() {
        let mut graphs = vec![new_path(9), new_cycle(10), new_clique(6)];
        // two triangles joined by one edge, plus two isolated vertices
        graphs.push(unit_graph(
            8,
            &[(1, 2), (2, 3), (3, 1), (3, 4), (4, 5), (5, 6), (6, 4)],
        ));
        for mut g in graphs {
            compute(&mut g, Partition::single(), no_logging!());
            assert_eq!(counts(&g), walk_counts(&g));
        }
    }

    #[test]
    fn test_counts_persist_across_calls() {
        let mut g = new_path(4);
        for ordinal in 0..2 {
            compute(&mut g, Partition::new(ordinal, 2).unwrap(), no_logging!());
        }
        assert_eq!(counts(&g), vec![6, 10, 10, 6]);
    }

    #[test]
    fn test_workers_add_up_to_single_run() {
        let mut whole = new_cycle(11);
        compute(&mut whole, Partition::single(), no_logging!());

        for total in [2, 3, 4, 11, 15] {
            let mut sum = vec![0u64; 11];
            for ordinal in 0..total {
                let mut g = new_cycle(11);
                compute(&mut g, Partition::new(ordinal, total).unwrap(), no_logging!());
                let mut partial = Vec::new();
                write_partial(&g, &mut partial).unwrap();
                for (i, line) in String::from_utf8(partial).unwrap().lines().enumerate() {
                    let count: u64 = line.split(',').nth(1).unwrap().parse().unwrap();
                    sum[i] += count;
                }
            }
            assert_eq!(sum, counts(&whole), "total={total}");
        }
    }
}
