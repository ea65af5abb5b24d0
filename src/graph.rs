use crate::graph_trait::Graph;

/// adjacency matrix based graph (fast 'has_edge', O(n) neighborhoods)
/// -> good fit for the small dense instances the exact ILP can handle
pub struct GraphAM {
    n: usize,
    m: usize,
    adj_matrix: Vec<Vec<bool>>,
    degrees: Vec<usize>,
}

impl Graph for GraphAM {
    fn new(n: usize) -> Self {
        GraphAM {
            n,
            m: 0,
            adj_matrix: vec![vec![false; n]; n],
            degrees: vec![0; n],
        }
    }

    fn size(&self) -> usize {
        self.n
    }

    fn edge_count(&self) -> usize {
        self.m
    }

    fn degree(&self, v: usize) -> usize {
        self.degrees[v]
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        debug_assert!(!self.has_edge(u, v));
        debug_assert_ne!(u, v);
        self.adj_matrix[u][v] = true;
        self.adj_matrix[v][u] = true;
        self.degrees[u] += 1;
        self.degrees[v] += 1;
        self.m += 1;
    }

    fn has_edge(&self, u:usize, v:usize) -> bool {
        debug_assert_eq!(self.adj_matrix[u][v], self.adj_matrix[v][u]);
        self.adj_matrix[u][v]
    }

    fn remove_edge(&mut self, u: usize, v: usize) {
        debug_assert!(self.has_edge(u, v));
        self.adj_matrix[u][v] = false;
        self.adj_matrix[v][u] = false;
        self.degrees[u] -= 1;
        self.degrees[v] -= 1;
        self.m -= 1;
    }

    fn neighbors(&self, v: usize, vert: Option<&[usize]>) -> Vec<usize> {
        let mut nbs: Vec<usize> = Vec::with_capacity(self.degree(v));
        if let Some(vt) = vert {
            debug_assert!(vt.contains(&v));
            for u in vt {
                if self.has_edge(*u, v) {
                    nbs.push(*u);
                }
            }
        } else {
            for u in 0..self.size() {
                if self.has_edge(u, v) {
                    nbs.push(u);
                }
            }
            debug_assert_eq!(nbs.len(), self.degree(v));
        }
        nbs
    }

    fn neighbors_iter(&self, v: usize) -> Box<dyn Iterator<Item=usize> + '_> {
        Box::new(self.adj_matrix[v].iter().enumerate().filter(|(_, e)| **e).map(|(u, _)| u))
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphAM;
    use crate::graph_trait::Graph;

    #[test]
    fn test_matrix_stays_symmetric() {
        let mut g = GraphAM::new(5);
        g.add_edge(0, 4);
        g.add_edge(3, 1);
        assert!(g.has_edge(4, 0) && g.has_edge(1, 3));
        assert_eq!(g.neighbors_iter(4).collect::<Vec<_>>(), vec![0]);
        g.remove_edge(4, 0);
        assert!(!g.has_edge(0, 4));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(0), 0);
    }

    #[test]
    fn test_empty_graph() {
        let g = GraphAM::new(0);
        assert_eq!(g.size(), 0);
        assert!(g.edges().is_empty());
        assert!(g.is_connected());
        assert!(!g.is_cubic());
    }
}
