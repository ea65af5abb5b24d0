use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use crate::error::{HpError, Result};
use crate::graph_trait::Graph;
use crate::hamiltonian::{check_hamiltonian_path, verify_hamiltonian_path};
use crate::labeled::LabeledGraph;

/// vertex of the derived graph: original vertex + one of its incident edges (sorted pair)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DerivedVertex {
    pub vertex: usize,
    pub edge: (usize, usize),
}

impl DerivedVertex {
    pub fn new(vertex: usize, other: usize) -> Self {
        DerivedVertex { vertex, edge: sorted_pair(vertex, other) }
    }
}

impl fmt::Display for DerivedVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, ({}, {}))", self.vertex, self.edge.0, self.edge.1)
    }
}

impl FromStr for DerivedVertex {
    type Err = HpError;

    /// parses "(v, (a, b))" (whitespace is ignored)
    fn from_str(s: &str) -> Result<Self> {
        let stripped: String = s.chars().filter(|c| !c.is_whitespace() && *c != '(' && *c != ')').collect();
        let parts = stripped.split(',')
            .map(|x| x.parse::<usize>())
            .collect::<std::result::Result<Vec<usize>, _>>()
            .map_err(|_| HpError::GraphFormat(format!("invalid derived vertex {s:?}")))?;
        if parts.len() != 3 {
            return Err(HpError::GraphFormat(format!("invalid derived vertex {s:?}")));
        }
        Ok(DerivedVertex { vertex: parts[0], edge: (parts[1], parts[2]) })
    }
}

fn sorted_pair(x: usize, y: usize) -> (usize, usize) {
    if x > y { (y, x) } else { (x, y) }
}

/// the other endpoints of x's incident edges (in increasing label order)
fn incident<G: Graph>(g: &LabeledGraph<usize, G>, v: usize) -> Vec<usize> {
    let mut nbs: Vec<usize> = g.graph().neighbors_iter(v).map(|u| *g.label(u)).collect();
    nbs.sort_unstable();
    nbs
}

/// transforms 'g' into its derived ("line-of-bipartite") graph:
///  - every vertex v is replaced by one node (v, e) per incident edge e
///  - (x, e) and (y, e) are adjacent for every edge e = {x, y}
///  - all nodes of the same vertex form a clique
pub fn derived_graph<G: Graph, H: Graph>(g: &LabeledGraph<usize, G>) -> LabeledGraph<DerivedVertex, H> {
    let mut nodes: Vec<DerivedVertex> = Vec::with_capacity(2 * g.graph().edge_count());
    let mut edges: Vec<(DerivedVertex, DerivedVertex)> = Vec::new();
    for v in 0..g.size() {
        let x = *g.label(v);
        let clique: Vec<DerivedVertex> = incident(g, v).into_iter().map(|y| DerivedVertex::new(x, y)).collect();
        for (i, a) in clique.iter().enumerate() {
            for b in clique.iter().skip(i + 1) {
                edges.push((*a, *b));
            }
        }
        nodes.extend(clique);
    }
    for (u, v) in g.graph().edges() {
        let (x, y) = (*g.label(u), *g.label(v));
        edges.push((DerivedVertex::new(x, y), DerivedVertex::new(y, x)));
    }
    let derived: LabeledGraph<DerivedVertex, H> = LabeledGraph::from_edges(nodes, edges);
    debug!("derived graph: {} vertices, {} edges", derived.size(), derived.graph().edge_count());
    derived
}

/// maps a Hamiltonian path of 'g' to a Hamiltonian path of the derived graph
/// first vertex: its non-path edges, then the edge to its successor
/// interior vertex: edge to its predecessor, its non-path edge(s), edge to its successor
/// last vertex: edge to its predecessor, then its non-path edges
/// (non-path edges are taken in increasing order)
pub fn derived_path<G: Graph>(g: &LabeledGraph<usize, G>, path: &[usize]) -> Result<Vec<DerivedVertex>> {
    if path.is_empty() {
        return Err(HpError::InvalidPath(String::from("empty path")));
    }
    let idx = g.indices(path)?;
    verify_hamiltonian_path(g.graph(), &idx, false)?;

    let mut new_path: Vec<DerivedVertex> = Vec::with_capacity(2 * g.graph().edge_count());
    let last = path.len() - 1;
    for (i, x) in path.iter().enumerate() {
        let pred = if i > 0 { Some(path[i - 1]) } else { None };
        let succ = if i < last { Some(path[i + 1]) } else { None };
        let nbs = incident(g, idx[i]);
        for y in pred.iter().chain(succ.iter()) {
            if !nbs.contains(y) {
                return Err(HpError::InvalidPath(format!("no edge between {x} and {y}")));
            }
        }
        if let Some(p) = pred {
            new_path.push(DerivedVertex::new(*x, p));
        }
        for y in nbs.iter().filter(|y| Some(**y) != pred && Some(**y) != succ) {
            new_path.push(DerivedVertex::new(*x, *y));
        }
        if let Some(s) = succ {
            new_path.push(DerivedVertex::new(*x, s));
        }
    }
    Ok(new_path)
}

/// reduces a (graph, Hamiltonian path) instance to the derived graph and its induced path
pub fn reduce<G: Graph, H: Graph>(g: &LabeledGraph<usize, G>, path: &[usize]) -> Result<(LabeledGraph<DerivedVertex, H>, Vec<DerivedVertex>)> {
    let new_path = derived_path(g, path)?;
    let new_g: LabeledGraph<DerivedVertex, H> = derived_graph(g);
    info!("reduced graph with {} vertices to derived graph with {} vertices (path length {} -> {})",
          g.size(), new_g.size(), path.len(), new_path.len());
    Ok((new_g, new_path))
}

/// checks that 'path' is a Hamiltonian path of the derived graph 'g'
pub fn verify_derived_path<H: Graph>(g: &LabeledGraph<DerivedVertex, H>, path: &[DerivedVertex]) -> Result<()> {
    let idx = g.indices(path)?;
    check_hamiltonian_path(g.graph(), &idx, false)
}

#[cfg(test)]
mod tests {
    use crate::graph::GraphAM;
    use crate::graph_parser::read_graph_from_file;
    use crate::graph_trait::Graph;
    use crate::labeled::LabeledGraph;
    use crate::petgraph::PGraph;
    use crate::reduction::*;

    fn setup() -> Vec<LabeledGraph<usize, GraphAM>> {
        let mut graphs = Vec::new();
        for file in ["test_instances/k4.dimacs", "test_instances/prism.dimacs", "test_instances/petersen.dimacs"] {
            let g = read_graph_from_file(file).unwrap();
            let n = g.size();
            graphs.push(LabeledGraph::from_graph(g, 1..=n).unwrap());  // 1-based labels as in the test files
        }
        graphs
    }

    fn paths() -> Vec<Vec<usize>> {
        vec![vec![1, 2, 3, 4], vec![2, 1, 3, 6, 4, 5], vec![1, 2, 3, 4, 5, 10, 7, 9, 6, 8]]
    }

    #[test]
    fn test_display_and_parse() {
        let x = DerivedVertex::new(4, 2);
        assert_eq!(x.edge, (2, 4));
        assert_eq!(x.to_string(), "(4, (2, 4))");
        assert_eq!("(4, (2, 4))".parse::<DerivedVertex>().unwrap(), x);
        assert_eq!("(4,(2,4))".parse::<DerivedVertex>().unwrap(), x);
        assert!("(4, (2))".parse::<DerivedVertex>().is_err());
        assert!("(a, (2, 4))".parse::<DerivedVertex>().is_err());
    }

    #[test]
    fn test_derived_graph_shape() {
        for g in setup() {
            let n = g.size();
            let d: LabeledGraph<DerivedVertex, PGraph> = derived_graph(&g);
            // 3 nodes per vertex, one triangle per vertex + one edge per original edge
            assert_eq!(d.size(), 3 * n);
            assert_eq!(d.graph().edge_count(), 3 * n + 3 * n / 2);
            assert!(d.graph().is_cubic());
            assert!(d.has_edge(&DerivedVertex::new(1, 2), &DerivedVertex::new(2, 1)));
            let nbs = g.neighbor_labels(&1).unwrap();
            assert!(d.has_edge(&DerivedVertex::new(1, *nbs[0]), &DerivedVertex::new(1, *nbs[2])));
        }
    }

    #[test]
    fn test_path_scales_by_three() {
        for (g, path) in setup().iter().zip(paths()) {
            let (d, new_path): (LabeledGraph<DerivedVertex, GraphAM>, _) = reduce(g, &path).unwrap();
            assert_eq!(new_path.len(), 3 * path.len());
            assert_eq!(new_path[0].vertex, path[0]);
            assert_eq!(new_path[new_path.len() - 1].vertex, path[path.len() - 1]);
            verify_derived_path(&d, &new_path).unwrap();
        }
    }

    #[test]
    fn test_consecutive_nodes_adjacent() {
        let graphs = setup();
        let path = vec![2, 1, 3, 6, 4, 5];
        let (d, new_path): (LabeledGraph<DerivedVertex, PGraph>, _) = reduce(&graphs[1], &path).unwrap();
        for w in new_path.windows(2) {
            assert!(d.has_edge(&w[0], &w[1]), "{} -- {}", w[0], w[1]);
        }
        assert_eq!(new_path[..5], [DerivedVertex::new(2, 3), DerivedVertex::new(2, 5),
            DerivedVertex::new(2, 1), DerivedVertex::new(1, 2), DerivedVertex::new(1, 4)][..]);
    }

    #[test]
    fn test_short_paths() {
        // isolated vertex -> no incident edges, no derived nodes
        let g: LabeledGraph<usize, GraphAM> = LabeledGraph::from_edges(vec![7], vec![]);
        assert_eq!(derived_path(&g, &[7]).unwrap(), vec![]);
        // K2: two vertices, one edge
        let g: LabeledGraph<usize, GraphAM> = LabeledGraph::from_edges(vec![1, 2], vec![(1, 2)]);
        let p = derived_path(&g, &[2, 1]).unwrap();
        assert_eq!(p, vec![DerivedVertex::new(2, 1), DerivedVertex::new(1, 2)]);
        // P3 with path in order
        let g: LabeledGraph<usize, PGraph> = LabeledGraph::from_edges(vec![1, 2, 3], vec![(1, 2), (2, 3)]);
        let (d, p): (LabeledGraph<DerivedVertex, PGraph>, _) = reduce(&g, &[1, 2, 3]).unwrap();
        assert_eq!(p.len(), 4);
        verify_derived_path(&d, &p).unwrap();
        assert!(derived_path(&g, &[]).is_err());
    }

    #[test]
    fn test_invalid_paths_rejected() {
        let graphs = setup();
        assert!(derived_path(&graphs[1], &[1, 2, 3, 4, 5]).is_err());     // too short
        assert!(derived_path(&graphs[1], &[1, 2, 3, 4, 5, 9]).is_err());  // unknown vertex
        assert!(derived_path(&graphs[1], &[1, 5, 3, 4, 2, 6]).is_err());  // 1 -- 5 is no edge
    }
}
