use ahash::AHashSet;
use crate::error::{HpError, Result};
use crate::graph_trait::Graph;

/// checks that 'path' covers every vertex of 'g' exactly once (length + membership check)
/// if 'cubic' is set, every vertex additionally has to have degree 3
pub fn verify_hamiltonian_path(g: &impl Graph, path: &[usize], cubic: bool) -> Result<()> {
    if path.len() != g.size() {
        return Err(HpError::InvalidPath(format!(
            "path has {} vertices, graph has {}", path.len(), g.size())));
    }
    let on_path: AHashSet<usize> = path.iter().copied().collect();
    for v in 0..g.size() {
        if !on_path.contains(&v) {
            return Err(HpError::InvalidPath(format!("vertex {v} is not on the path")));
        }
        if cubic && g.degree(v) != 3 {
            return Err(HpError::InvalidPath(format!(
                "vertex {v} has degree {} (expected 3)", g.degree(v))));
        }
    }
    Ok(())
}

/// checks that consecutive vertices on 'path' are adjacent in 'g'
pub fn verify_path_adjacency(g: &impl Graph, path: &[usize]) -> Result<()> {
    for (i, w) in path.windows(2).enumerate() {
        if w[0] >= g.size() || w[1] >= g.size() || !g.has_edge(w[0], w[1]) {
            return Err(HpError::InvalidPath(format!(
                "no edge between path positions {} and {} ({} -- {})", i, i + 1, w[0], w[1])));
        }
    }
    Ok(())
}

/// full check: covering + adjacency (+ optional degree-3 check)
pub fn check_hamiltonian_path(g: &impl Graph, path: &[usize], cubic: bool) -> Result<()> {
    verify_hamiltonian_path(g, path, cubic)?;
    verify_path_adjacency(g, path)
}

/// returns whether 'path' is a Hamiltonian path of 'g'
pub fn is_hamiltonian_path(g: &impl Graph, path: &[usize]) -> bool {
    check_hamiltonian_path(g, path, false).is_ok()
}
