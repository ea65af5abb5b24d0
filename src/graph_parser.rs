use std::fmt;
use std::fmt::Display;
use std::fs::File;
use std::hash::Hash;
use std::io::{self, BufRead, BufWriter, Write};
use std::str::FromStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{debug, warn};
use crate::error::{HpError, Result};
use crate::graph::GraphAM;
use crate::graph_trait::Graph;
use crate::labeled::LabeledGraph;
use crate::petgraph::PGraph;

// ---------------------------------- DIMACS / edge lists ----------------------------------- //

fn read_lines(file: &str) -> Result<(io::Lines<io::BufReader<File>>, usize)> {
    let f = File::open(file)?;                              // open file or return error
    let mut lines = io::BufReader::new(f).lines();
    let mut n: Option<usize> = None;
    for line in lines.by_ref() {
        let line = line?;
        match line.bytes().next() {
            None | Some(b'c') => continue,                    // ignore comments + empty lines
            Some(b'p') => {
                // descriptor line --> dimacs format from PACE
                n = line.split_whitespace().nth(2).and_then(|s| s.parse().ok());
                break;
            },
            Some(b'#') => {
                // number of vertices --> format from other instances
                n = line.split_whitespace().nth(1).and_then(|s| s.parse().ok());
                break;
            },
            _ => return Err(HpError::GraphFormat(String::from("did not find number of vertices"))),
        }
    }

    match n {
        Some(no_vert) => Ok((lines, no_vert)),
        None => Err(HpError::GraphFormat(String::from("could not read number of vertices"))),
    }
}

fn create_graph(g: &mut impl Graph, lines: io::Lines<io::BufReader<File>>) -> Result<()> {
    let n = g.size();
    for (no, line) in lines.enumerate() {
        let line = line?;
        if line.starts_with('c') || line.starts_with('#') || line.trim().is_empty() {
            continue;                                                  // ignore comments
        }
        let edge: Vec<usize> = line.split_whitespace()
            .map(|x| x.parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| HpError::GraphFormat(format!("invalid edge {line:?}")))?;
        if edge.len() != 2 {
            return Err(HpError::GraphFormat(format!("invalid edge {line:?}")));
        }
        let (u, v) = (edge[0], edge[1]);
        if u == 0 || v == 0 || u > n || v > n {
            return Err(HpError::GraphFormat(format!("incorrect number of nodes (edge {u} {v})")));
        }
        if !g.add_edge_checked(u - 1, v - 1) {  // index shift --> first node has ID 0
            debug!("skipped loop / parallel edge {} {} (line {})", u, v, no + 1);
        }
    }
    Ok(())
}

/// reads a graph in DIMACS ('p' header) or edge list ('#' header) format, vertices are 1-based
pub fn read_dimacs<G: Graph>(file: &str) -> Result<G> {
    let (lines, n) = read_lines(file)?;
    let mut g = G::new(n);
    create_graph(&mut g, lines)?;
    debug!("read {}: {} vertices, {} edges", file, g.size(), g.edge_count());
    Ok(g)
}

pub fn read_graph_from_file(file: &str) -> Result<GraphAM> {
    read_dimacs(file)
}

pub fn read_pgraph_from_file(file: &str) -> Result<PGraph> {
    read_dimacs(file)
}

// --------------------------------------- JSON graphs --------------------------------------- //

/// entry of an adjacency list (plain vertex numbers or labels like "s" / "(1, (1, 2))")
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum VertexRef {
    Index(i64),
    Name(String),
}

impl VertexRef {
    pub fn from_label(label: String) -> Self {
        match label.parse::<i64>() {
            Ok(i) => VertexRef::Index(i),
            Err(_) => VertexRef::Name(label),
        }
    }
}

impl fmt::Display for VertexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexRef::Index(i) => write!(f, "{i}"),
            VertexRef::Name(s) => write!(f, "{s}"),
        }
    }
}

/// graph file: {"n_vertices": .., "n_arestas": .., "adjacencia": {"1": [2, 3, 4], ..}}
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GraphFile {
    pub n_vertices: usize,
    pub n_arestas: usize,
    pub adjacencia: IndexMap<String, Vec<VertexRef>>,
}

fn parse_label<L: FromStr>(s: &str) -> Result<L> {
    s.parse::<L>().map_err(|_| HpError::GraphFormat(format!("invalid vertex label {s:?}")))
}

impl GraphFile {
    pub fn from_labeled<L, G>(g: &LabeledGraph<L, G>) -> Self
        where L: Hash + Eq + Clone + Display, G: Graph
    {
        let adjacencia = g.adjacency().into_iter()
            .map(|(v, nbs)| (v.to_string(), nbs.into_iter().map(|u| VertexRef::from_label(u.to_string())).collect()))
            .collect();
        GraphFile {
            n_vertices: g.size(),
            n_arestas: g.graph().edge_count(),
            adjacencia,
        }
    }

    /// builds the graph, parsing every key / neighbor with L::from_str
    pub fn to_labeled<L, G>(&self) -> Result<LabeledGraph<L, G>>
        where L: Hash + Eq + Clone + Display + FromStr, G: Graph
    {
        let mut adjacency: Vec<(L, Vec<L>)> = Vec::with_capacity(self.adjacencia.len());
        for (v, nbs) in &self.adjacencia {
            let nbs = nbs.iter().map(|u| parse_label(&u.to_string())).collect::<Result<Vec<L>>>()?;
            adjacency.push((parse_label(v)?, nbs));
        }
        let g: LabeledGraph<L, G> = LabeledGraph::from_adjacency(adjacency);
        if g.size() != self.n_vertices {
            warn!("graph file claims {} vertices, adjacency lists have {}", self.n_vertices, g.size());
        }
        if g.graph().edge_count() != self.n_arestas {
            warn!("graph file claims {} edges, adjacency lists have {}", self.n_arestas, g.graph().edge_count());
        }
        Ok(g)
    }
}

pub fn read_json_graph(file: &str) -> Result<GraphFile> {
    let f = File::open(file)?;
    Ok(serde_json::from_reader(io::BufReader::new(f))?)
}

/// writes 'value' as JSON indented by 4 spaces
pub fn write_json<T: Serialize>(value: &T, file: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(file)?);
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn read_labeled_graph<L, G>(file: &str) -> Result<LabeledGraph<L, G>>
    where L: Hash + Eq + Clone + Display + FromStr, G: Graph
{
    read_json_graph(file)?.to_labeled()
}

pub fn write_labeled_graph<L, G>(g: &LabeledGraph<L, G>, file: &str) -> Result<()>
    where L: Hash + Eq + Clone + Display, G: Graph
{
    write_json(&GraphFile::from_labeled(g), file)
}

/// reads a graph with integer vertices from a JSON graph file ('.json') or a DIMACS file
/// (DIMACS vertices are labeled 1..=n)
pub fn read_int_graph<G: Graph>(file: &str) -> Result<LabeledGraph<usize, G>> {
    if file.ends_with(".json") {
        read_labeled_graph(file)
    } else {
        let g: G = read_dimacs(file)?;
        let n = g.size();
        LabeledGraph::from_graph(g, 1..=n)
    }
}

// ------------------------------------- HPC test files -------------------------------------- //

/// test instance: cubic graph + Hamiltonian path, {"vertices", "arestas", "adj", "caminho"}
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HpcFile {
    pub vertices: usize,
    #[serde(default)]
    pub arestas: Option<usize>,
    pub adj: IndexMap<String, Vec<usize>>,
    pub caminho: Vec<usize>,
}

/// reads an HPC test file -> (graph on the vertices 1..=n, path)
/// self-loops in the adjacency lists are ignored
pub fn read_hpc<G: Graph>(file: &str) -> Result<(LabeledGraph<usize, G>, Vec<usize>)> {
    let f = File::open(file)?;
    let hpc: HpcFile = serde_json::from_reader(io::BufReader::new(f))?;
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for (v, nbs) in &hpc.adj {
        let v: usize = parse_label(v)?;
        for u in nbs {
            if v < 1 || v > hpc.vertices || *u < 1 || *u > hpc.vertices {
                return Err(HpError::GraphFormat(format!("edge {v} {u} leaves the vertex range 1..={}", hpc.vertices)));
            }
            edges.push((v, *u));
        }
    }
    let g: LabeledGraph<usize, G> = LabeledGraph::from_edges(1..=hpc.vertices, edges);
    if let Some(m) = hpc.arestas {
        if m != g.graph().edge_count() {
            warn!("{}: {} edges announced, {} read", file, m, g.graph().edge_count());
        }
    }
    Ok((g, hpc.caminho))
}
