pub mod error;
pub mod graph;
pub mod graph_trait;
pub mod petgraph;
pub mod labeled;
pub mod graph_parser;
pub mod hamiltonian;
pub mod reduction;
pub mod cubic;
pub mod cards;
pub mod config;
pub mod ilp;
pub mod ilp_solver;
