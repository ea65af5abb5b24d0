use crate::graph_trait::Graph;
use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;
use petgraph::visit::NodeIndexable;

type PGraphType = petgraph::graph::UnGraph<(), ()>;

/// adjacency list graph backed by petgraph (better fit for the sparse derived graphs)
pub struct PGraph {
    g: PGraphType,
    degrees: Vec<usize>,
}

impl Graph for PGraph {
    fn new(n: usize) -> Self {
        let mut g_struct = PGraph {
            g: PGraphType::with_capacity(n, 3 * n / 2),
            degrees: vec![0; n],
        };
        for _ in 0..n {
            g_struct.g.add_node(());
        }
        g_struct
    }

    fn size(&self) -> usize {
        self.g.node_count()
    }

    fn edge_count(&self) -> usize {
        self.g.edge_count()  // O(1) time
    }

    fn degree(&self, v: usize) -> usize {
        self.degrees[v]
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        let m = self.g.edge_count();
        self.g.update_edge(self.g.from_index(u), self.g.from_index(v), ());
        assert_eq!(self.g.edge_count(), m + 1);  // ensure edge didn't exist yet
        self.degrees[u] += 1;
        self.degrees[v] += 1;
    }

    fn has_edge(&self, u: usize, v: usize) -> bool {
        // O(e’) time (e’: number of edges connected to u and v)
        self.g.contains_edge(self.g.from_index(u), self.g.from_index(v))
    }

    fn remove_edge(&mut self, u: usize, v: usize) {
        let e = self.g.find_edge(self.g.from_index(u), self.g.from_index(v));
        if let Some(e_idx) = e {
            self.g.remove_edge(e_idx);
            self.degrees[u] -= 1;
            self.degrees[v] -= 1;
        }
    }

    fn neighbors(&self, v: usize, vert: Option<&[usize]>) -> Vec<usize> {
        if let Some(vertices) = vert {
            assert!(vertices.contains(&v));
            return self.g.neighbors(self.g.from_index(v))
                .map(NodeIndex::index)
                .filter(|v| vertices.contains(v))
                .collect::<Vec<usize>>();
        }
        self.g.neighbors(self.g.from_index(v))
            .map(NodeIndex::index)
            .collect()
    }

    fn neighbors_iter(&self, v: usize) -> Box<dyn Iterator<Item=usize> + '_> {
        Box::new(self.g.neighbors(self.g.from_index(v)).map(NodeIndex::index))
    }

    fn is_connected(&self) -> bool {
        connected_components(&self.g) <= 1
    }
}
