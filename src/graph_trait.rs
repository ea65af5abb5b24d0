use ahash::AHashSet;

pub trait Graph {
	/// creates a new graph with 'n' vertices and no edges
	fn new(n: usize) -> Self;
	/// returns the size (i.e. number of vertices) of the graph
	fn size(&self) -> usize;
	/// returns number of edges in the graph (in O(1) time)
	fn edge_count(&self) -> usize;
	/// returns degree (i.e., number of neighbors) of vertex 'v'
	fn degree(&self, v: usize) -> usize;
	/// adds edge {u,v}
	fn add_edge(&mut self, u: usize, v: usize);
	/// returns whether edge {u,v} is present in the graph
	fn has_edge(&self, u: usize, v: usize) -> bool;
	/// removes the edge {u,v}
	fn remove_edge(&mut self, u: usize, v: usize);
	/// returns a list of vertex v's neighbors (only those in 'vert' if vert.is_some())
	fn neighbors(&self, v: usize, vert: Option<&[usize]>) -> Vec<usize>;
	/// returns an iterator over vertex v's neighbors
	fn neighbors_iter(&self, v: usize) -> Box<dyn Iterator<Item=usize> + '_>;
	/// adds edge {u,v} unless it is a loop or already present
	/// -> returns whether the edge was added
	fn add_edge_checked(&mut self, u: usize, v: usize) -> bool {
		if u == v || self.has_edge(u, v) {
			return false;
		}
		self.add_edge(u, v);
		true
	}
	/// returns v's neighbors in increasing order
	fn sorted_neighbors(&self, v: usize) -> Vec<usize> {
		let mut nbs = self.neighbors(v, None);
		nbs.sort_unstable();
		nbs
	}
	/// returns all edges as (u, v) with u < v, sorted
	fn edges(&self) -> Vec<(usize, usize)> {
		let mut edges = Vec::with_capacity(self.edge_count());
		for u in 0..self.size() {
			for v in self.neighbors_iter(u) {
				if u < v {
					edges.push((u, v));
				}
			}
		}
		edges.sort_unstable();
		debug_assert_eq!(edges.len(), self.edge_count());
		edges
	}
	/// returns non-decreasing degree sequence
	fn degree_sequence(&self) -> Vec<usize> {
		let mut deg_seq: Vec<usize> = (0..self.size()).map(|v| self.degree(v)).collect();
		deg_seq.sort_unstable();
		deg_seq
	}
	/// returns whether every vertex has degree 'd'
	fn is_regular(&self, d: usize) -> bool {
		(0..self.size()).all(|v| self.degree(v) == d)
	}
	/// returns whether the graph is cubic (3-regular)
	fn is_cubic(&self) -> bool {
		self.size() > 0 && self.is_regular(3)
	}

	/// returns vector of connected components
	/// each component is represented as a vector of the vertices it contains
	fn connected_components(&self, vert: Option<&[usize]>) -> Vec<Vec<usize>> {
		let all_vert = (0..self.size()).collect::<Vec<usize>>();
		let act_vert = match vert {
			Some(v) => v,
			None => &all_vert,
		};
		let mut components:Vec<Vec<usize>> = Vec::new();
		let mut seen: AHashSet<usize> = AHashSet::with_capacity(act_vert.len());
		for v in act_vert {
			if seen.contains(v) { continue; }

			seen.insert(*v);
			let mut comp = vec![*v];

			// find all other vertices in component c (using dfs)
			let mut stack = vec![*v];
			while let Some(u) = stack.pop() {
				for nb_u in self.neighbors(u, vert) {
					if seen.insert(nb_u) {
						stack.push(nb_u);
						comp.push(nb_u);
					}
				}
			}
			components.push(comp);
		}
		components
	}
	/// returns whether the graph is connected (the empty graph counts as connected)
	fn is_connected(&self) -> bool {
		self.connected_components(None).len() <= 1
	}
	/// returns the graph in DOT format (vertices named by 'labels' if given)
	fn to_dot(&self, labels: Option<&[String]>) -> String {
		let name = |v: usize| -> String {
			match labels {
				Some(l) => format!("\"{}\"", l[v].replace('"', "\\\"")),
				None => v.to_string(),
			}
		};
		let mut dot = String::from("graph {\n");
		for v in 0..self.size() {
			dot += &format!("    {} [ label = {} ]\n", v, name(v));
		}
		for (u, v) in self.edges() {
			dot += &format!("    {u} -- {v}\n");
		}
		dot += "}\n";
		dot
	}
}

#[cfg(test)]
mod tests {
	use crate::graph_parser::{read_graph_from_file, read_pgraph_from_file};
	use crate::graph_trait::Graph;

	fn setup1() -> Vec<impl Graph> {
		let g01 = read_graph_from_file("test_instances/k4.dimacs").unwrap();
		let g02 = read_graph_from_file("test_instances/prism.dimacs").unwrap();
		let g03 = read_graph_from_file("test_instances/petersen.dimacs").unwrap();
		let g04 = read_graph_from_file("test_instances/two_paths.dimacs").unwrap();
		vec![g01, g02, g03, g04]
	}

	fn setup2() -> Vec<impl Graph> {
		let g01 = read_pgraph_from_file("test_instances/k4.dimacs").unwrap();
		let g02 = read_pgraph_from_file("test_instances/prism.dimacs").unwrap();
		let g03 = read_pgraph_from_file("test_instances/petersen.dimacs").unwrap();
		let g04 = read_pgraph_from_file("test_instances/two_paths.dimacs").unwrap();
		vec![g01, g02, g03, g04]
	}

	#[test]
	fn test_basics_all_graphs() {
		let mut graphs = setup1();
		test_basics(&mut graphs);
		let mut graphs = setup2();
		test_basics(&mut graphs);
	}

	fn test_basics(graphs: &mut Vec<impl Graph>) {
		assert_eq!(graphs[0].size(), 4);
		assert_eq!(graphs[0].edge_count(), 6);
		assert_eq!(graphs[2].size(), 10);
		assert_eq!(graphs[2].edge_count(), 15);
		assert!(graphs[0].is_cubic() && graphs[1].is_cubic() && graphs[2].is_cubic());
		assert!(!graphs[3].is_cubic());
		assert!(graphs[1].has_edge(0, 1));
		assert!(!graphs[1].has_edge(0, 4));
		graphs[1].add_edge(0, 4);
		assert_eq!(graphs[1].degree(0), 4);
		assert!(!graphs[1].is_cubic());
		assert!(!graphs[1].add_edge_checked(0, 4));  // already present
		assert!(!graphs[1].add_edge_checked(2, 2));  // loop
		graphs[1].remove_edge(0, 4);
		assert!(!graphs[1].has_edge(0, 4));
		assert_eq!(graphs[1].edge_count(), 9);
		assert!(graphs[1].is_cubic());
	}

	#[test]
	fn test_nbs() {
		let graphs = setup2();
		assert_eq!(graphs[1].sorted_neighbors(0), vec![1, 2, 3]);
		let mut nbs = graphs[1].neighbors(0, Some(&[0, 1, 5]));
		nbs.sort();
		assert_eq!(nbs, vec![1]);
		assert_eq!(graphs[0].neighbors_iter(2).count(), 3);
	}

	#[test]
	fn test_edges_and_degrees() {
		let graphs = setup1();
		assert_eq!(graphs[0].edges(), vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
		assert_eq!(graphs[3].degree_sequence(), vec![1, 1, 1, 1, 2, 2]);
		let d = graphs[2].degree_sequence();
		assert_eq!(d.iter().sum::<usize>(), graphs[2].edge_count() * 2); // Handshake Lemma
	}

	#[test]
	fn test_connected_components() {
		let mut graphs = setup1();
		assert!(graphs[2].is_connected());
		let mut comps = graphs[3].connected_components(None);
		assert_eq!(comps.len(), 2);
		for comp in comps.iter_mut() {
			comp.sort();
		}
		assert!(comps.contains(&vec![0, 1, 2]) && comps.contains(&vec![3, 4, 5]));
		graphs[3].add_edge(2, 3);
		assert!(graphs[3].is_connected());
		comps = graphs[1].connected_components(Some(&[0, 1, 5]));
		assert_eq!(comps.len(), 2);
	}

	#[test]
	fn test_dot() {
		let graphs = setup1();
		let dot = graphs[0].to_dot(None);
		assert!(dot.starts_with("graph {"));
		assert!(dot.contains("0 -- 3"));
		let labels: Vec<String> = vec!["a".into(), "b".into(), "c".into(), "d".into()];
		let dot = graphs[0].to_dot(Some(&labels));
		assert!(dot.contains("label = \"d\""));
	}
}
