use std::fs;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use hp_reduction::{cards, cubic, graph_parser, hamiltonian, reduction};
use hp_reduction::config::{GraphDs, SolverConfig, SubtourMode};
use hp_reduction::graph::GraphAM;
use hp_reduction::graph_trait::Graph;
use hp_reduction::ilp_solver::{self, HamPathModel};
use hp_reduction::labeled::LabeledGraph;
use hp_reduction::petgraph::PGraph;
use hp_reduction::reduction::DerivedVertex;

#[derive(Parser)]
#[command(name = "hp-reduction")]
#[command(about = "Hamiltonian paths in cubic graphs: reduction to line graphs of bipartite graphs and an ILP solver", long_about = None)]
#[command(version)]
struct Cli {
    /// Debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random cubic graph
    Generate {
        /// Number of vertices (even, at least 4)
        n: usize,
        /// Seed of the random generator (random if not given)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Add the vertices s and t, adjacent to all other vertices
        #[arg(long)]
        source_sink: bool,
        #[arg(short, long, default_value = "grafo_cubico.json")]
        output: String,
        /// Also write the graph in DOT format
        #[arg(long)]
        dot: Option<String>,
    },

    /// Transform a graph (JSON or DIMACS) into its derived graph
    Transform {
        input: String,
        #[arg(short, long, default_value = "grafo_transformado.json")]
        output: String,
        #[arg(long)]
        dot: Option<String>,
    },

    /// Verify and reduce a cubic graph with a Hamiltonian path (HPC test file)
    Reduce {
        input: String,
        /// Write the derived graph to this JSON file
        #[arg(short, long)]
        output: Option<String>,
        /// Write the derived path (one vertex per line) to this file
        #[arg(long)]
        path_output: Option<String>,
        #[arg(long)]
        dot: Option<String>,
    },

    /// Search a Hamiltonian path with the ILP
    Solve {
        /// Graph file (JSON with integer vertices or DIMACS)
        input: String,
        /// Config file ("key:value" lines)
        #[arg(short, long)]
        config: Option<String>,
        /// Statistics file (rows are appended)
        #[arg(short, long, default_value = "stats.tsv")]
        output: String,
        /// Add subtour constraints lazily (cutting planes)
        #[arg(long)]
        lazy: bool,
        /// Timeout in seconds
        #[arg(short, long)]
        timeout: Option<f32>,
        /// Largest number of vertices for which all subtour constraints are generated
        #[arg(long)]
        max_exact_vertices: Option<usize>,
        /// Branch and bound node limit
        #[arg(long)]
        node_limit: Option<usize>,
        /// Use the petgraph data structure
        #[arg(long)]
        pgraph: bool,
        /// Print the ILP in LP format before solving
        #[arg(long)]
        print_model: bool,
    },

    /// Write the card sequence of a derived graph
    Sequence {
        input: String,
        #[arg(short, long, default_value = "sequencia_grafo.txt")]
        output: String,
    },

    /// Build the colour/number graph of a card list and check whether the order is playable
    Cards {
        /// Comma separated cards, e.g. r5,g5,g7
        cards: String,
        /// DOT file for the bipartite colour/number graph
        #[arg(long)]
        bipartite_dot: Option<String>,
        /// DOT file for the line graph of the cards
        #[arg(long)]
        line_dot: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate { n, seed, source_sink, output, dot } => generate(n, seed, source_sink, &output, dot),
        Commands::Transform { input, output, dot } => transform(&input, &output, dot),
        Commands::Reduce { input, output, path_output, dot } => reduce(&input, output, path_output, dot),
        Commands::Solve { input, config, output, lazy, timeout, max_exact_vertices, node_limit, pgraph, print_model } => {
            let mut cfg = match &config {
                Some(file) => SolverConfig::from_file(file)
                    .with_context(|| format!("Problem reading config file {file}"))?,
                None => SolverConfig::default(),
            };
            if lazy { cfg.subtour_mode = SubtourMode::Lazy; }
            if pgraph { cfg.graph_ds = GraphDs::Petgraph; }
            if let Some(t) = timeout { cfg.timeout = t; }
            if let Some(k) = max_exact_vertices { cfg.max_exact_vertices = k; }
            if let Some(l) = node_limit { cfg.node_limit = l; }
            cfg.validate()?;
            match cfg.graph_ds {
                GraphDs::Petgraph => solve::<PGraph>(&input, &output, &cfg, print_model),
                GraphDs::Matrix => solve::<GraphAM>(&input, &output, &cfg, print_model),
            }
        },
        Commands::Sequence { input, output } => sequence(&input, &output),
        Commands::Cards { cards, bipartite_dot, line_dot } => play_cards(&cards, bipartite_dot, line_dot),
    }
}

fn write_dot(dot: &str, file: &str) -> Result<()> {
    fs::write(file, dot).with_context(|| format!("Problem writing DOT file {file}"))?;
    info!("DOT file written to {}", file);
    Ok(())
}

fn generate(n: usize, seed: Option<u64>, source_sink: bool, output: &str, dot: Option<String>) -> Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    info!("generating cubic graph with {} vertices (seed {})", n, seed);
    let g: PGraph = cubic::random_cubic_graph(n, seed)?;
    let g = LabeledGraph::from_graph(g, 0..n)?;
    let (json, dot_str) = if source_sink {
        let h: LabeledGraph<String, PGraph> = cubic::add_source_sink(&g)?;
        (graph_parser::GraphFile::from_labeled(&h), h.to_dot())
    } else {
        (graph_parser::GraphFile::from_labeled(&g), g.to_dot())
    };
    graph_parser::write_json(&json, output).with_context(|| format!("Problem writing {output}"))?;
    println!("Graph saved to {output} ({} vertices, {} edges)", json.n_vertices, json.n_arestas);
    if let Some(file) = dot {
        write_dot(&dot_str, &file)?;
    }
    Ok(())
}

fn transform(input: &str, output: &str, dot: Option<String>) -> Result<()> {
    let g: LabeledGraph<usize, GraphAM> = graph_parser::read_int_graph(input)
        .with_context(|| format!("Problem reading file {input}"))?;
    let d: LabeledGraph<DerivedVertex, PGraph> = reduction::derived_graph(&g);
    graph_parser::write_labeled_graph(&d, output).with_context(|| format!("Problem writing {output}"))?;
    println!("Derived graph saved to {output} ({} vertices, {} edges)", d.size(), d.graph().edge_count());
    if let Some(file) = dot {
        write_dot(&d.to_dot(), &file)?;
    }
    Ok(())
}

fn reduce(input: &str, output: Option<String>, path_output: Option<String>, dot: Option<String>) -> Result<()> {
    let (g, path) = graph_parser::read_hpc::<GraphAM>(input)
        .with_context(|| format!("Problem reading file {input}"))?;
    let idx = g.indices(&path)?;
    hamiltonian::verify_hamiltonian_path(g.graph(), &idx, true).context("Cubic graph")?;
    println!("Cubic graph: the given path is Hamiltonian.");

    let (d, new_path) = reduction::reduce::<GraphAM, PGraph>(&g, &path)?;
    reduction::verify_derived_path(&d, &new_path).context("Derived graph")?;
    println!("Derived graph: the new path is Hamiltonian.");
    println!("Path ({} vertices): {:?}", path.len(), path);
    let new_path_str: Vec<String> = new_path.iter().map(DerivedVertex::to_string).collect();
    println!("New path ({} vertices): {}", new_path.len(), new_path_str.join(" -> "));

    if let Some(file) = output {
        graph_parser::write_labeled_graph(&d, &file).with_context(|| format!("Problem writing {file}"))?;
        println!("Derived graph saved to {file}");
    }
    if let Some(file) = path_output {
        fs::write(&file, new_path_str.join("\n") + "\n").with_context(|| format!("Problem writing {file}"))?;
        println!("New path saved to {file}");
    }
    if let Some(file) = dot {
        write_dot(&d.to_dot(), &file)?;
    }
    Ok(())
}

fn solve<G: Graph>(input: &str, output: &str, config: &SolverConfig, print_model: bool) -> Result<()> {
    let g: LabeledGraph<usize, G> = graph_parser::read_int_graph(input)
        .with_context(|| format!("Problem reading file {input}"))?;
    if print_model {
        let (vertices, s, t, adjacency) = ilp_solver::augment(g.graph());
        let mut model = HamPathModel::new(&vertices, s, t, &adjacency)?;
        if config.subtour_mode == SubtourMode::Full {
            model.add_all_subtour_constraints(config.max_exact_vertices)?;
        }
        println!("{}", model.problem);
    }
    let sol = ilp_solver::start_ilp_solver(input, output, &g, config)?;
    match sol.path {
        Some(path) => {
            println!("SOLUTION:\nHamiltonian path ({} vertices): {:?}", path.len(), path);
            Ok(())
        },
        None => bail!("no Hamiltonian path found ({:?} after {} round(s), {} nodes)", sol.status, sol.rounds, sol.nodes),
    }
}

fn sequence(input: &str, output: &str) -> Result<()> {
    let d: LabeledGraph<DerivedVertex, PGraph> = graph_parser::read_labeled_graph(input)
        .with_context(|| format!("Problem reading derived graph {input}"))?;
    let seq = cards::format_cards(&cards::card_sequence(&d));
    fs::write(output, &seq).with_context(|| format!("Problem writing {output}"))?;
    println!("{seq}");
    println!("Sequence saved to {output}");
    Ok(())
}

fn play_cards(list: &str, bipartite_dot: Option<String>, line_dot: Option<String>) -> Result<()> {
    let hand = cards::parse_cards(list)?;
    let (bipartite, line) = cards::card_graphs::<PGraph>(&hand)?;
    println!("Colour/number graph: {} vertices, {} edges", bipartite.size(), bipartite.graph().edge_count());
    println!("Card line graph: {} vertices, {} edges", line.size(), line.graph().edge_count());
    if cards::is_playable_sequence::<PGraph>(&hand)? {
        println!("The sequence {} is playable.", cards::format_cards(&hand));
    } else {
        println!("The sequence {} is not playable.", cards::format_cards(&hand));
    }
    if let Some(file) = bipartite_dot {
        write_dot(&bipartite.to_dot(), &file)?;
    }
    if let Some(file) = line_dot {
        write_dot(&line.to_dot(), &file)?;
    }
    Ok(())
}
