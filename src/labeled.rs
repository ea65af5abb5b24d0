use std::fmt::Display;
use std::hash::Hash;
use indexmap::IndexSet;
use crate::error::{HpError, Result};
use crate::graph_trait::Graph;

/// a graph whose vertices carry labels (integers, (vertex, edge) pairs, cards, ...)
/// -> vertex i of the underlying graph has label labels[i] (insertion order is kept)
pub struct LabeledGraph<L, G> {
    labels: IndexSet<L>,
    g: G,
}

impl<L: Hash + Eq + Clone + Display, G: Graph> LabeledGraph<L, G> {
    /// builds a graph from a list of vertices and a list of edges between labels
    /// vertices that only show up in 'edges' are appended in order of appearance,
    /// loops and parallel edges (e.g., from symmetric adjacency lists) are skipped
    pub fn from_edges(vertices: impl IntoIterator<Item=L>, edges: impl IntoIterator<Item=(L, L)>) -> Self {
        let mut labels: IndexSet<L> = vertices.into_iter().collect();
        let mut index_edges: Vec<(usize, usize)> = Vec::new();
        for (x, y) in edges {
            let (u, _) = labels.insert_full(x);
            let (v, _) = labels.insert_full(y);
            index_edges.push((u, v));
        }
        let mut g = G::new(labels.len());
        for (u, v) in index_edges {
            g.add_edge_checked(u, v);
        }
        LabeledGraph { labels, g }
    }

    /// builds a graph from adjacency lists (as stored in the JSON graph files)
    pub fn from_adjacency(adjacency: impl IntoIterator<Item=(L, Vec<L>)>) -> Self {
        let mut vertices = Vec::new();
        let mut edges = Vec::new();
        for (v, nbs) in adjacency {
            vertices.push(v.clone());
            for u in nbs {
                edges.push((v.clone(), u));
            }
        }
        Self::from_edges(vertices, edges)
    }

    /// relabels the vertices of 'g' (labels[i] becomes the label of vertex i)
    pub fn from_graph(g: G, labels: impl IntoIterator<Item=L>) -> Result<Self> {
        let labels: IndexSet<L> = labels.into_iter().collect();
        if labels.len() != g.size() {
            return Err(HpError::InvalidArgument(format!(
                "{} distinct labels given for a graph with {} vertices", labels.len(), g.size())));
        }
        Ok(LabeledGraph { labels, g })
    }

    pub fn graph(&self) -> &G {
        &self.g
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.g
    }

    pub fn size(&self) -> usize {
        self.g.size()
    }

    /// returns the label of vertex 'v' (panics if v >= size)
    pub fn label(&self, v: usize) -> &L {
        &self.labels[v]
    }

    pub fn labels(&self) -> impl Iterator<Item=&L> + '_ {
        self.labels.iter()
    }

    pub fn label_strings(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.to_string()).collect()
    }

    pub fn index_of(&self, label: &L) -> Option<usize> {
        self.labels.get_index_of(label)
    }

    fn index_or_err(&self, label: &L) -> Result<usize> {
        self.index_of(label).ok_or_else(|| HpError::VertexNotFound(label.to_string()))
    }

    pub fn has_edge(&self, x: &L, y: &L) -> bool {
        match (self.index_of(x), self.index_of(y)) {
            (Some(u), Some(v)) => self.g.has_edge(u, v),
            _ => false,
        }
    }

    pub fn degree(&self, x: &L) -> Result<usize> {
        Ok(self.g.degree(self.index_or_err(x)?))
    }

    /// returns the labels of x's neighbors (ordered by vertex index)
    pub fn neighbor_labels(&self, x: &L) -> Result<Vec<&L>> {
        let v = self.index_or_err(x)?;
        Ok(self.g.sorted_neighbors(v).into_iter().map(|u| self.label(u)).collect())
    }

    /// maps a sequence of labels to vertex indices
    pub fn indices(&self, path: &[L]) -> Result<Vec<usize>> {
        path.iter().map(|x| self.index_or_err(x)).collect()
    }

    /// maps a sequence of vertex indices to labels
    pub fn labels_of(&self, path: &[usize]) -> Vec<L> {
        path.iter().map(|v| self.label(*v).clone()).collect()
    }

    /// adjacency lists in label form (vertex order, neighbors ordered by index)
    pub fn adjacency(&self) -> Vec<(&L, Vec<&L>)> {
        (0..self.size())
            .map(|v| (self.label(v), self.g.sorted_neighbors(v).into_iter().map(|u| self.label(u)).collect()))
            .collect()
    }

    pub fn to_dot(&self) -> String {
        self.g.to_dot(Some(&self.label_strings()))
    }
}
