//! small 0/1 integer linear programming solver
//!
//! All variables are binary. The solver is a depth-first branch and bound that propagates
//! variable bounds through the constraint activities after every decision. This is plenty for
//! the exponential Hamiltonian path model, which cannot be built for large graphs anyway.

use std::fmt;
use std::time::Instant;
use ahash::AHashSet;
use tracing::{debug, warn};
use crate::error::{HpError, Result};

const EPS: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ObjectiveType {
    Maximize,
    Minimize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstraintType {
    LessThanEq,
    Eq,
    GreaterThanEq,
}

#[derive(Clone, Debug)]
pub struct Variable {
    name: String,
    obj: f64,
    fixed: Option<bool>,
}

impl Variable {
    /// binary variable with objective coefficient 'obj'
    pub fn binary(name: impl Into<String>, obj: f64) -> Self {
        Variable { name: name.into(), obj, fixed: None }
    }

    /// binary variable whose value is fixed in advance
    pub fn fixed(name: impl Into<String>, obj: f64, value: bool) -> Self {
        Variable { name: name.into(), obj, fixed: Some(value) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Debug)]
pub struct Constraint {
    name: String,
    terms: Vec<(usize, f64)>,
    ctype: ConstraintType,
    rhs: f64,
}

impl Constraint {
    pub fn new(name: impl Into<String>, terms: Vec<(usize, f64)>, ctype: ConstraintType, rhs: f64) -> Self {
        Constraint { name: name.into(), terms, ctype, rhs }
    }

    /// sum of the given variables compared to 'rhs'
    pub fn sum(name: impl Into<String>, vars: &[usize], ctype: ConstraintType, rhs: f64) -> Self {
        Constraint::new(name, vars.iter().map(|v| (*v, 1.0)).collect(), ctype, rhs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn is_satisfied(&self, values: &[bool]) -> bool {
        let act: f64 = self.terms.iter().filter(|(v, _)| values[*v]).map(|(_, c)| c).sum();
        match self.ctype {
            ConstraintType::LessThanEq => act <= self.rhs + EPS,
            ConstraintType::Eq => (act - self.rhs).abs() <= EPS,
            ConstraintType::GreaterThanEq => act >= self.rhs - EPS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    /// node or time limit hit (the best solution found so far is reported, if any)
    LimitReached,
}

#[derive(Clone, Copy, Debug)]
pub struct SolveLimits {
    pub node_limit: usize,
    pub timeout: f32,
}

impl Default for SolveLimits {
    fn default() -> Self {
        SolveLimits { node_limit: 5_000_000, timeout: 300.0 }
    }
}

#[derive(Clone, Debug)]
pub struct Solution {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    pub values: Option<Vec<bool>>,
    pub nodes: usize,
}

pub struct Problem {
    name: String,
    objective_type: ObjectiveType,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    names: AHashSet<String>,
    target: Option<f64>,
}

impl Problem {
    pub fn new(name: impl Into<String>) -> Self {
        Problem {
            name: name.into(),
            objective_type: ObjectiveType::Maximize,
            variables: Vec::new(),
            constraints: Vec::new(),
            names: AHashSet::new(),
            target: None,
        }
    }

    pub fn set_objective_type(&mut self, ot: ObjectiveType) {
        self.objective_type = ot;
    }

    /// known bound on the optimum: the search stops at the first solution reaching it
    pub fn set_objective_target(&mut self, target: f64) {
        self.target = Some(target);
    }

    /// adds a variable and returns its index
    pub fn add_variable(&mut self, var: Variable) -> Result<usize> {
        if !self.names.insert(var.name.clone()) {
            return Err(HpError::Model(format!("variable {} defined twice", var.name)));
        }
        self.variables.push(var);
        Ok(self.variables.len() - 1)
    }

    /// adds a constraint and returns its index
    pub fn add_constraint(&mut self, con: Constraint) -> Result<usize> {
        if let Some((v, _)) = con.terms.iter().find(|(v, _)| *v >= self.variables.len()) {
            return Err(HpError::Model(format!("constraint {} uses unknown variable {}", con.name, v)));
        }
        self.constraints.push(con);
        Ok(self.constraints.len() - 1)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn variable(&self, i: usize) -> &Variable {
        &self.variables[i]
    }

    /// solves the problem with branch and bound
    pub fn solve(&self, limits: &SolveLimits) -> Solution {
        let mut search = Search::new(self, limits);
        let sol = search.run();
        debug!("{}: {:?} after {} nodes", self.name, sol.status, sol.nodes);
        sol
    }
}

/// writes the problem in (CPLEX) LP format
impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\\* {} *\\", self.name)?;
        match self.objective_type {
            ObjectiveType::Maximize => writeln!(f, "Maximize")?,
            ObjectiveType::Minimize => writeln!(f, "Minimize")?,
        }
        let obj: Vec<(usize, f64)> = self.variables.iter().enumerate()
            .filter(|(_, v)| v.obj != 0.0)
            .map(|(i, v)| (i, v.obj))
            .collect();
        writeln!(f, " objective: {}", self.linear_expr(&obj))?;
        writeln!(f, "Subject To")?;
        for con in &self.constraints {
            let op = match con.ctype {
                ConstraintType::LessThanEq => "<=",
                ConstraintType::Eq => "=",
                ConstraintType::GreaterThanEq => ">=",
            };
            writeln!(f, " {}: {} {} {}", con.name, self.linear_expr(&con.terms), op, con.rhs)?;
        }
        let fixed: Vec<&Variable> = self.variables.iter().filter(|v| v.fixed.is_some()).collect();
        if !fixed.is_empty() {
            writeln!(f, "Bounds")?;
            for v in fixed {
                writeln!(f, " {} = {}", v.name, u8::from(v.fixed == Some(true)))?;
            }
        }
        writeln!(f, "Binaries")?;
        for v in &self.variables {
            writeln!(f, " {}", v.name)?;
        }
        write!(f, "End")
    }
}

impl Problem {
    fn linear_expr(&self, terms: &[(usize, f64)]) -> String {
        if terms.is_empty() {
            return String::from("0");
        }
        let mut expr = String::new();
        for (i, (v, c)) in terms.iter().enumerate() {
            let sign = if *c < 0.0 { "- " } else if i > 0 { "+ " } else { "" };
            if i > 0 { expr.push(' '); }
            expr += sign;
            if (c.abs() - 1.0).abs() > EPS {
                expr += &format!("{} ", c.abs());
            }
            expr += &self.variables[*v].name;
        }
        expr
    }
}

// ------------------------------------ branch and bound ---------------------------------------- //

struct Search<'a> {
    prob: &'a Problem,
    obj: Vec<f64>,                  // objective coefficients (negated when minimizing)
    var_cons: Vec<Vec<usize>>,      // var_cons[v] = constraints containing variable v
    limits: &'a SolveLimits,
    start: Instant,
    nodes: usize,
    limit_hit: bool,
    done: bool,                     // objective target reached
    target: Option<f64>,
    best: Option<(f64, Vec<bool>)>,
}

impl<'a> Search<'a> {
    fn new(prob: &'a Problem, limits: &'a SolveLimits) -> Self {
        let sign = match prob.objective_type {
            ObjectiveType::Maximize => 1.0,
            ObjectiveType::Minimize => -1.0,
        };
        let mut var_cons = vec![Vec::new(); prob.variables.len()];
        for (ci, con) in prob.constraints.iter().enumerate() {
            for (v, _) in &con.terms {
                if var_cons[*v].last() != Some(&ci) {
                    var_cons[*v].push(ci);
                }
            }
        }
        Search {
            prob,
            obj: prob.variables.iter().map(|v| sign * v.obj).collect(),
            var_cons,
            limits,
            start: Instant::now(),
            nodes: 0,
            limit_hit: false,
            done: false,
            target: prob.target.map(|t| sign * t),
            best: None,
        }
    }

    fn run(&mut self) -> Solution {
        let mut assign: Vec<Option<bool>> = self.prob.variables.iter().map(|v| v.fixed).collect();
        let all: Vec<usize> = (0..self.prob.constraints.len()).collect();
        if self.propagate(&mut assign, all) {
            self.branch(assign);
        }

        let status = if self.limit_hit {
            warn!("{}: search stopped after {} nodes ({:.2}s)", self.prob.name, self.nodes,
                  self.start.elapsed().as_secs_f32());
            SolveStatus::LimitReached
        } else if self.best.is_some() {
            SolveStatus::Optimal
        } else {
            SolveStatus::Infeasible
        };
        let sign = if self.prob.objective_type == ObjectiveType::Maximize { 1.0 } else { -1.0 };
        let (objective, values) = match self.best.take() {
            Some((o, vals)) => (Some(sign * o), Some(vals)),
            None => (None, None),
        };
        Solution { status, objective, values, nodes: self.nodes }
    }

    /// returns (min, max) activity of 'con' under the partial assignment
    fn activity(con: &Constraint, assign: &[Option<bool>]) -> (f64, f64) {
        let (mut min_act, mut max_act) = (0.0, 0.0);
        for (v, c) in &con.terms {
            match assign[*v] {
                Some(true) => { min_act += c; max_act += c; },
                Some(false) => {},
                None => if *c > 0.0 { max_act += c } else { min_act += c },
            }
        }
        (min_act, max_act)
    }

    /// fixes variables implied by the constraints in 'queue' (and the constraints they touch)
    /// -> returns false if a constraint can no longer be satisfied
    fn propagate(&self, assign: &mut [Option<bool>], mut queue: Vec<usize>) -> bool {
        let mut queued = vec![false; self.prob.constraints.len()];
        for ci in &queue {
            queued[*ci] = true;
        }
        while let Some(ci) = queue.pop() {
            queued[ci] = false;
            let con = &self.prob.constraints[ci];
            let (min_act, max_act) = Self::activity(con, assign);
            let upper = con.ctype != ConstraintType::GreaterThanEq;  // act <= rhs has to hold
            let lower = con.ctype != ConstraintType::LessThanEq;     // act >= rhs has to hold
            if (upper && min_act > con.rhs + EPS) || (lower && max_act < con.rhs - EPS) {
                return false;
            }
            for (v, c) in &con.terms {
                if assign[*v].is_some() {
                    continue;
                }
                let (c, v) = (*c, *v);
                let mut forced: Option<bool> = None;
                if upper {
                    if c > 0.0 && min_act + c > con.rhs + EPS {
                        forced = Some(false);
                    } else if c < 0.0 && min_act - c > con.rhs + EPS {
                        forced = Some(true);
                    }
                }
                if lower {
                    let f = if c > 0.0 && max_act - c < con.rhs - EPS {
                        Some(true)
                    } else if c < 0.0 && max_act + c < con.rhs - EPS {
                        Some(false)
                    } else {
                        None
                    };
                    if let Some(val) = f {
                        if forced.is_some() && forced != Some(val) {
                            return false;
                        }
                        forced = Some(val);
                    }
                }
                if let Some(val) = forced {
                    assign[v] = Some(val);
                    for cj in &self.var_cons[v] {
                        if !queued[*cj] {
                            queued[*cj] = true;
                            queue.push(*cj);
                        }
                    }
                }
            }
        }
        true
    }

    /// picks a free variable of the equality constraint with the fewest free variables
    /// (falls back to the first free variable)
    fn pick_variable(&self, assign: &[Option<bool>]) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;  // (free count, variable)
        for con in self.prob.constraints.iter().filter(|c| c.ctype == ConstraintType::Eq) {
            let mut free = con.terms.iter().filter(|(v, _)| assign[*v].is_none());
            if let Some((first, _)) = free.next() {
                let cnt = 1 + free.count();
                if best.map_or(true, |(b, _)| cnt < b) {
                    best = Some((cnt, *first));
                }
            }
        }
        match best {
            Some((_, v)) => Some(v),
            None => assign.iter().position(|a| a.is_none()),
        }
    }

    fn branch(&mut self, assign: Vec<Option<bool>>) {
        self.nodes += 1;
        if self.nodes > self.limits.node_limit
            || self.start.elapsed().as_secs_f32() > self.limits.timeout {
            self.limit_hit = true;
            return;
        }

        // upper bound: fixed part + all positive free coefficients
        let bound: f64 = assign.iter().zip(&self.obj)
            .map(|(a, c)| match a {
                Some(true) => *c,
                Some(false) => 0.0,
                None => c.max(0.0),
            })
            .sum();
        if let Some((best, _)) = &self.best {
            if bound <= *best + EPS {
                return;
            }
        }

        let var = match self.pick_variable(&assign) {
            Some(v) => v,
            None => {
                // leaf: every variable is fixed
                let values: Vec<bool> = assign.iter().map(|a| a.unwrap_or(false)).collect();
                if self.prob.constraints.iter().all(|c| c.is_satisfied(&values)) {
                    self.done = self.target.map_or(false, |t| bound >= t - EPS);
                    self.best = Some((bound, values));
                }
                return;
            }
        };

        let order = if self.obj[var] >= 0.0 { [true, false] } else { [false, true] };
        for val in order {
            let mut child = assign.clone();
            child[var] = Some(val);
            if self.propagate(&mut child, self.var_cons[var].clone()) {
                self.branch(child);
            }
            if self.limit_hit || self.done {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ilp::*;

    fn knapsack() -> Problem {
        // max 5a + 4b + 3c  s.t.  2a + 3b + c <= 4  (optimum: a + c -> 8)
        let mut prob = Problem::new("knapsack");
        let a = prob.add_variable(Variable::binary("a", 5.0)).unwrap();
        let b = prob.add_variable(Variable::binary("b", 4.0)).unwrap();
        let c = prob.add_variable(Variable::binary("c", 3.0)).unwrap();
        prob.add_constraint(Constraint::new("cap", vec![(a, 2.0), (b, 3.0), (c, 1.0)],
                                            ConstraintType::LessThanEq, 4.0)).unwrap();
        prob
    }

    #[test]
    fn test_knapsack() {
        let sol = knapsack().solve(&SolveLimits::default());
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.objective, Some(8.0));
        assert_eq!(sol.values, Some(vec![true, false, true]));
    }

    #[test]
    fn test_minimize_with_cover() {
        // min a + b + c  s.t.  a + b >= 1, b + c >= 1  (optimum: b)
        let mut prob = Problem::new("cover");
        prob.set_objective_type(ObjectiveType::Minimize);
        let vars: Vec<usize> = ["a", "b", "c"].iter()
            .map(|n| prob.add_variable(Variable::binary(*n, 1.0)).unwrap())
            .collect();
        prob.add_constraint(Constraint::sum("ab", &vars[..2], ConstraintType::GreaterThanEq, 1.0)).unwrap();
        prob.add_constraint(Constraint::sum("bc", &vars[1..], ConstraintType::GreaterThanEq, 1.0)).unwrap();
        let sol = prob.solve(&SolveLimits::default());
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.objective, Some(1.0));
        assert_eq!(sol.values, Some(vec![false, true, false]));
    }

    #[test]
    fn test_infeasible() {
        let mut prob = Problem::new("infeasible");
        let x = prob.add_variable(Variable::binary("x", 1.0)).unwrap();
        let y = prob.add_variable(Variable::fixed("y", 1.0, true)).unwrap();
        prob.add_constraint(Constraint::sum("one", &[x, y], ConstraintType::Eq, 1.0)).unwrap();
        prob.add_constraint(Constraint::sum("x", &[x], ConstraintType::GreaterThanEq, 1.0)).unwrap();
        let sol = prob.solve(&SolveLimits::default());
        assert_eq!(sol.status, SolveStatus::Infeasible);
        assert!(sol.values.is_none());
    }

    #[test]
    fn test_model_errors() {
        let mut prob = Problem::new("errors");
        prob.add_variable(Variable::binary("x", 1.0)).unwrap();
        assert!(prob.add_variable(Variable::binary("x", 2.0)).is_err());
        assert!(prob.add_constraint(Constraint::sum("c", &[0, 1], ConstraintType::Eq, 1.0)).is_err());
        assert_eq!(prob.variable_count(), 1);
        assert_eq!(prob.constraint_count(), 0);
    }

    #[test]
    fn test_objective_target() {
        // any solution of value 2 is optimal -> stop after the first one
        let mut prob = Problem::new("target");
        let vars: Vec<usize> = (0..6)
            .map(|i| prob.add_variable(Variable::binary(format!("x{i}"), 1.0)).unwrap())
            .collect();
        prob.add_constraint(Constraint::sum("two", &vars, ConstraintType::Eq, 2.0)).unwrap();
        let full = prob.solve(&SolveLimits::default());
        prob.set_objective_target(2.0);
        let sol = prob.solve(&SolveLimits::default());
        assert_eq!(sol.status, SolveStatus::Optimal);
        assert_eq!(sol.objective, Some(2.0));
        assert!(sol.nodes < full.nodes);
    }

    #[test]
    fn test_node_limit() {
        let limits = SolveLimits { node_limit: 0, timeout: 10.0 };
        let sol = knapsack().solve(&limits);
        assert_eq!(sol.status, SolveStatus::LimitReached);
    }

    #[test]
    fn test_lp_format() {
        let lp = knapsack().to_string();
        assert!(lp.starts_with("\\* knapsack *\\\nMaximize"));
        assert!(lp.contains(" objective: 5 a + 4 b + 3 c"));
        assert!(lp.contains(" cap: 2 a + 3 b + c <= 4"));
        assert!(lp.ends_with("End"));
    }
}
