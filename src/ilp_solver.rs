use std::{fs::File, io, io::Write, time::Instant};
use ahash::{AHashMap, AHashSet};
use tracing::{debug, info, warn};
use crate::config::{SolverConfig, SubtourMode};
use crate::error::{HpError, Result};
use crate::graph_trait::Graph;
use crate::hamiltonian::check_hamiltonian_path;
use crate::ilp::{Constraint, ConstraintType, ObjectiveType, Problem, SolveLimits, SolveStatus, Variable};
use crate::labeled::LabeledGraph;

struct IlpStats {
    file_name: String,              // name of the graph file
    output_file: String,            // name of the output file that these stats are written to
    runtime: f32,                   // how long it took to find the path
    size: usize,                    // |V| (no. of vertices in the graph, without S and T)
    variables: usize,               // no. of arc variables
    constraints: usize,             // no. of constraints in the last ILP that was solved
    mode: SubtourMode,
    rounds: usize,                  // no. of ILPs solved (> 1 only in lazy mode)
    nodes: usize,                   // branch and bound nodes (all rounds)
    path_len: Option<usize>,        // length of the Hamiltonian path found
}

impl IlpStats {
    fn new(in_file: &str, out_file: &str, n: usize, mode: SubtourMode) -> Self {
        IlpStats {
            file_name: in_file.to_string(),
            output_file: out_file.to_string(),
            runtime: 0.0,
            size: n,
            variables: 0,
            constraints: 0,
            mode,
            rounds: 0,
            nodes: 0,
            path_len: None,
        }
    }

    fn write_stats(&self) -> std::result::Result<(), io::Error> {
        let mut file: File;
        if let Ok(f) = File::options().append(true).open(&self.output_file) {
            // stats file already exists -> open for appending data
            file = f;
        } else {
            file = File::create(&self.output_file)?;
            file.write_all(b"File\tTime (s)\tGraph Size\tVariables\tConstraints\tSubtour Mode\tRounds\tB&B Nodes\tPath Length\n")?;
        }
        let path_len = match self.path_len {
            Some(len) => len.to_string(),
            None => String::from("unsolved"),
        };
        file.write_all(format!("{}\t{:.2}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                           self.file_name,
                           self.runtime,
                           self.size,
                           self.variables,
                           self.constraints,
                           self.mode.name(),
                           self.rounds,
                           self.nodes,
                           path_len).as_bytes())?;
        info!("statistics written to {:?}", self.output_file);
        Ok(())
    }
}

/// augments 'g' with a source S = n and a sink T = n+1
/// -> returns (vertices, S, T, directed adjacency lists): S -> v, v -> T and both directions of every edge
pub fn augment(g: &impl Graph) -> (Vec<usize>, usize, usize, AHashMap<usize, Vec<usize>>) {
    let n = g.size();
    let (s, t) = (n, n + 1);
    let mut adjacency: AHashMap<usize, Vec<usize>> = AHashMap::with_capacity(n + 2);
    for v in 0..n {
        let mut nbs = g.sorted_neighbors(v);
        nbs.push(t);
        adjacency.insert(v, nbs);
    }
    adjacency.insert(s, (0..n).collect());
    adjacency.insert(t, Vec::new());
    ((0..n + 2).collect(), s, t, adjacency)
}

/// ILP for a Hamiltonian S-T path: one binary variable per arc, unit in/out degrees,
/// subtour elimination constraints on subsets of the inner vertices
pub struct HamPathModel {
    pub problem: Problem,
    arc_var: AHashMap<(usize, usize), usize>,
    arcs: Vec<(usize, usize)>,      // arcs[i] = arc of variable i
    s: usize,
    t: usize,
    inner: Vec<usize>,              // all vertices except S and T
}

impl HamPathModel {
    pub fn new(vertices: &[usize], s: usize, t: usize, adjacency: &AHashMap<usize, Vec<usize>>) -> Result<Self> {
        if s == t || !vertices.contains(&s) || !vertices.contains(&t) {
            return Err(HpError::InvalidArgument(format!("invalid source / sink ({s}, {t})")));
        }
        let vertex_set: AHashSet<usize> = vertices.iter().copied().collect();
        let mut problem = Problem::new("HamPath");
        problem.set_objective_type(ObjectiveType::Maximize);

        //------------------------- create the variables (one per arc) --------------------------//
        let mut arc_var: AHashMap<(usize, usize), usize> = AHashMap::new();
        let mut arcs: Vec<(usize, usize)> = Vec::new();
        for u in vertices {
            for v in adjacency.get(u).map(Vec::as_slice).unwrap_or(&[]) {
                if u == v || !vertex_set.contains(v) || arc_var.contains_key(&(*u, *v)) {
                    continue;
                }
                let var = problem.add_variable(Variable::binary(format!("x_{u}_{v}"), 1.0))?;
                arc_var.insert((*u, *v), var);
                arcs.push((*u, *v));
            }
        }

        //---------------------------------- degree constraints ---------------------------------//
        let out_vars = |u: usize| -> Vec<usize> {
            arcs.iter().enumerate().filter(|(_, a)| a.0 == u).map(|(i, _)| i).collect()
        };
        let in_vars = |v: usize| -> Vec<usize> {
            arcs.iter().enumerate().filter(|(_, a)| a.1 == v).map(|(i, _)| i).collect()
        };
        problem.add_constraint(Constraint::sum("out_s", &out_vars(s), ConstraintType::Eq, 1.0))?;
        problem.add_constraint(Constraint::sum("in_t", &in_vars(t), ConstraintType::Eq, 1.0))?;
        let inner: Vec<usize> = vertices.iter().copied().filter(|v| *v != s && *v != t).collect();
        for v in &inner {
            problem.add_constraint(Constraint::sum(format!("in_{v}"), &in_vars(*v), ConstraintType::Eq, 1.0))?;
            problem.add_constraint(Constraint::sum(format!("out_{v}"), &out_vars(*v), ConstraintType::Eq, 1.0))?;
        }
        // the degree constraints fix the number of selected arcs to |inner| + 1
        problem.set_objective_target((inner.len() + 1) as f64);
        debug!("ham path model: {} vertices, {} arc variables", vertices.len(), arcs.len());

        Ok(HamPathModel { problem, arc_var, arcs, s, t, inner })
    }

    /// the arcs inside 'subset' may carry at most |subset| - 1 units
    /// -> returns false (and adds nothing) if there is no arc inside 'subset'
    pub fn add_subtour_constraint(&mut self, subset: &[usize]) -> Result<bool> {
        let mut vars: Vec<usize> = Vec::new();
        for (i, u) in subset.iter().enumerate() {
            for v in subset.iter().skip(i + 1) {
                vars.extend(self.arc_var.get(&(*u, *v)));
                vars.extend(self.arc_var.get(&(*v, *u)));
            }
        }
        if vars.is_empty() {
            return Ok(false);
        }
        let name = String::from("subset_") + &subset.iter().map(usize::to_string).collect::<Vec<_>>().join("_");
        self.problem.add_constraint(Constraint::sum(name, &vars, ConstraintType::LessThanEq, (subset.len() - 1) as f64))?;
        Ok(true)
    }

    /// adds the constraints for all subsets of the inner vertices of size 2..|inner|-1
    pub fn add_all_subtour_constraints(&mut self, max_exact_vertices: usize) -> Result<usize> {
        let k = self.inner.len();
        if k > max_exact_vertices || k >= usize::BITS as usize {
            return Err(HpError::InvalidArgument(format!(
                "{k} inner vertices exceed the limit of {max_exact_vertices} for enumerating all subsets (use the lazy subtour mode)")));
        }
        let mut cnt = 0;
        for mask in 1usize..(1 << k) {
            let size = mask.count_ones() as usize;
            if size < 2 || size >= k {
                continue;
            }
            let subset: Vec<usize> = (0..k).filter(|i| mask & (1 << i) != 0).map(|i| self.inner[i]).collect();
            if self.add_subtour_constraint(&subset)? {
                cnt += 1;
            }
        }
        debug!("added {} subtour constraints", cnt);
        Ok(cnt)
    }

    /// reads the selected arcs: path from S (until T or a repeated vertex) + all cycles off that path
    fn extract(&self, values: &[bool]) -> (Vec<usize>, Vec<Vec<usize>>) {
        let succ: AHashMap<usize, usize> = self.arcs.iter().zip(values)
            .filter(|(_, val)| **val)
            .map(|(a, _)| *a)
            .collect();
        let mut visited: AHashSet<usize> = AHashSet::new();
        let mut path: Vec<usize> = Vec::new();
        let mut cur = self.s;
        while let Some(next) = succ.get(&cur) {
            if *next == self.t || !visited.insert(*next) {
                break;
            }
            path.push(*next);
            cur = *next;
        }
        let mut cycles: Vec<Vec<usize>> = Vec::new();
        for v in &self.inner {
            if visited.contains(v) || !succ.contains_key(v) {
                continue;
            }
            let mut cycle = vec![*v];
            visited.insert(*v);
            let mut cur = *v;
            while let Some(next) = succ.get(&cur) {
                if !visited.insert(*next) {
                    break;
                }
                cycle.push(*next);
                cur = *next;
            }
            if cycle.len() > 1 {
                cycles.push(cycle);
            }
        }
        (path, cycles)
    }
}

#[derive(Clone, Debug)]
pub struct HamPathSolution {
    pub status: SolveStatus,
    pub path: Option<Vec<usize>>,   // inner vertices in path order (S and T dropped)
    pub variables: usize,
    pub constraints: usize,
    pub rounds: usize,
    pub nodes: usize,
}

/// solves the Hamiltonian S-T path ILP, either with all subtour constraints (full mode)
/// or by adding the constraints of the subtours found in the solutions (lazy mode)
pub fn ham_path(vertices: &[usize], s: usize, t: usize, adjacency: &AHashMap<usize, Vec<usize>>,
                config: &SolverConfig) -> Result<HamPathSolution> {
    let now = Instant::now();
    let mut model = HamPathModel::new(vertices, s, t, adjacency)?;
    if config.subtour_mode == SubtourMode::Full {
        model.add_all_subtour_constraints(config.max_exact_vertices)?;
    }
    let mut sol = HamPathSolution {
        status: SolveStatus::Infeasible,
        path: None,
        variables: model.problem.variable_count(),
        constraints: 0,
        rounds: 0,
        nodes: 0,
    };

    while sol.rounds < config.max_rounds {
        let limits = SolveLimits {
            node_limit: config.node_limit.saturating_sub(sol.nodes),
            timeout: (config.timeout - now.elapsed().as_secs_f32()).max(0.0),
        };
        let result = model.problem.solve(&limits);
        sol.rounds += 1;
        sol.nodes += result.nodes;
        sol.constraints = model.problem.constraint_count();
        sol.status = result.status;
        let values = match result.values {
            Some(values) if result.status == SolveStatus::Optimal => values,
            _ => return Ok(sol),  // infeasible or limit reached
        };
        let (path, cycles) = model.extract(&values);
        if cycles.is_empty() && path.len() == model.inner.len() {
            sol.path = Some(path);
            return Ok(sol);
        }
        if config.subtour_mode == SubtourMode::Full {
            return Err(HpError::Model(String::from("solution contains a subtour despite all subtour constraints")));
        }
        debug!("round {}: path of length {}, {} subtour(s)", sol.rounds, path.len(), cycles.len());
        for cycle in &cycles {
            let mut subset = cycle.clone();
            subset.sort_unstable();
            model.add_subtour_constraint(&subset)?;
        }
    }
    warn!("no Hamiltonian path after {} cutting plane rounds", sol.rounds);
    sol.status = SolveStatus::LimitReached;
    Ok(sol)
}

/// searches a Hamiltonian path of 'g' with the ILP (S/T augmentation)
/// saves the statistics in a .tsv file (see write_stats)
pub fn start_ilp_solver<G: Graph>(in_file: &str, out_file: &str, g: &LabeledGraph<usize, G>,
                                  config: &SolverConfig) -> Result<HamPathSolution> {
    let now = Instant::now();                                 // start timer
    let mut stats = IlpStats::new(in_file, out_file, g.size(), config.subtour_mode);
    if g.size() == 0 {
        return Err(HpError::InvalidArgument(String::from("graph has no vertices")));
    }

    let (vertices, s, t, adjacency) = augment(g.graph());
    let mut sol = ham_path(&vertices, s, t, &adjacency, config)?;
    if let Some(path) = &sol.path {
        check_hamiltonian_path(g.graph(), path, false)
            .map_err(|e| HpError::Model(format!("ILP returned an invalid path: {e}")))?;
        stats.path_len = Some(path.len());
        sol.path = Some(g.labels_of(path));
        info!("Hamiltonian path found after {} round(s)", sol.rounds);
    } else {
        info!("no Hamiltonian path found ({:?})", sol.status);
    }

    stats.runtime = now.elapsed().as_secs_f32();
    stats.variables = sol.variables;
    stats.constraints = sol.constraints;
    stats.rounds = sol.rounds;
    stats.nodes = sol.nodes;
    stats.write_stats().unwrap_or_else(|err| {
        warn!("problem writing statistics to file: {err}");
    });

    Ok(sol)
}
