use rand::SeedableRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};
use crate::error::{HpError, Result};
use crate::graph_trait::Graph;
use crate::labeled::LabeledGraph;

const MAX_TRIES: usize = 10_000;

/// random cubic graph on the vertices 0..n (pairing model: 3 points per vertex are matched
/// uniformly at random, matchings with loops or parallel edges are thrown away)
pub fn random_cubic_graph<G: Graph>(n: usize, seed: u64) -> Result<G> {
    if n % 2 != 0 {
        return Err(HpError::InvalidArgument(format!("vertex count must be even (got {n})")));
    }
    if n < 4 {
        return Err(HpError::InvalidArgument(format!("a cubic graph has at least 4 vertices (got {n})")));
    }
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut points: Vec<usize> = (0..3 * n).map(|p| p / 3).collect();

    'tries: for attempt in 1..=MAX_TRIES {
        points.shuffle(&mut rng);
        let mut g = G::new(n);
        for pair in points.chunks(2) {
            if !g.add_edge_checked(pair[0], pair[1]) {
                continue 'tries;                                  // loop / parallel edge
            }
        }
        debug!("cubic graph with {} vertices after {} attempt(s)", n, attempt);
        return Ok(g);
    }
    Err(HpError::InvalidArgument(format!("no simple cubic graph with {n} vertices found in {MAX_TRIES} attempts")))
}

/// adds the vertices "s" and "t", both adjacent to every vertex of 'g'
pub fn add_source_sink<G: Graph, H: Graph>(g: &LabeledGraph<usize, G>) -> Result<LabeledGraph<String, H>> {
    let (s, t) = (String::from("s"), String::from("t"));
    let vertices: Vec<String> = g.labels().map(|v| v.to_string()).collect();
    if vertices.contains(&s) || vertices.contains(&t) {
        return Err(HpError::InvalidArgument(String::from("graph already has a vertex s or t")));
    }
    let mut edges: Vec<(String, String)> = g.graph().edges().into_iter()
        .map(|(u, v)| (g.label(u).to_string(), g.label(v).to_string()))
        .collect();
    for v in &vertices {
        edges.push((s.clone(), v.clone()));
    }
    for v in &vertices {
        edges.push((v.clone(), t.clone()));
    }
    let mut all = vertices;
    all.push(s);
    all.push(t);
    let h: LabeledGraph<String, H> = LabeledGraph::from_edges(all, edges);
    info!("added s and t: {} vertices, {} edges", h.size(), h.graph().edge_count());
    Ok(h)
}

#[cfg(test)]
mod tests {
    use crate::cubic::*;
    use crate::graph::GraphAM;
    use crate::petgraph::PGraph;

    #[test]
    fn test_random_cubic_graphs() {
        for n in [4, 6, 10, 20, 50] {
            let g: PGraph = random_cubic_graph(n, n as u64).unwrap();
            assert_eq!(g.size(), n);
            assert!(g.is_cubic());
            assert_eq!(g.edge_count(), 3 * n / 2);
        }
        // K4 is the only cubic graph on 4 vertices
        let g: GraphAM = random_cubic_graph(4, 7).unwrap();
        assert_eq!(g.edges(), vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_seed_determinism() {
        let g: GraphAM = random_cubic_graph(16, 42).unwrap();
        let h: PGraph = random_cubic_graph(16, 42).unwrap();
        assert_eq!(g.edges(), h.edges());
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(matches!(random_cubic_graph::<GraphAM>(7, 1), Err(HpError::InvalidArgument(msg)) if msg.contains("even")));
        assert!(random_cubic_graph::<GraphAM>(2, 1).is_err());
        assert!(random_cubic_graph::<GraphAM>(0, 1).is_err());
    }

    #[test]
    fn test_add_source_sink() {
        let g: GraphAM = random_cubic_graph(6, 3).unwrap();
        let g = LabeledGraph::from_graph(g, 0..6).unwrap();
        let h: LabeledGraph<String, PGraph> = add_source_sink(&g).unwrap();
        assert_eq!(h.size(), 8);
        assert_eq!(h.graph().edge_count(), 9 + 12);
        let s = String::from("s");
        let t = String::from("t");
        assert_eq!(h.degree(&s).unwrap(), 6);
        assert_eq!(h.degree(&t).unwrap(), 6);
        assert!(!h.has_edge(&s, &t));
        assert_eq!(h.degree(&String::from("0")).unwrap(), 5);
    }
}
