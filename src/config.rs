use std::fs::File;
use std::io::{self, BufRead};
use crate::error::{HpError, Result};

/// how the subtour elimination constraints are added to the ILP
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtourMode {
    /// all vertex subsets up front (exponential, limited by 'max_exact_vertices')
    Full,
    /// cutting planes: only subsets of cycles found in intermediate solutions
    Lazy,
}

impl SubtourMode {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(SubtourMode::Full),
            1 => Ok(SubtourMode::Lazy),
            _ => Err(HpError::InvalidArgument(format!("unknown subtour mode {code} (0: full, 1: lazy)"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubtourMode::Full => "full",
            SubtourMode::Lazy => "lazy",
        }
    }
}

/// graph data structure used by the solver pipelines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphDs {
    Matrix,
    Petgraph,
}

impl GraphDs {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(GraphDs::Matrix),
            1 => Ok(GraphDs::Petgraph),
            _ => Err(HpError::InvalidArgument(format!("unknown graph data structure {code} (0: graph, 1: pgraph)"))),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SolverConfig {
    pub graph_ds: GraphDs,
    pub subtour_mode: SubtourMode,
    pub max_exact_vertices: usize,  // largest inner vertex set for which all subsets are enumerated
    pub node_limit: usize,          // branch and bound nodes per ILP solve
    pub max_rounds: usize,          // cutting plane rounds (lazy mode)
    pub timeout: f32,               // seconds
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            graph_ds: GraphDs::Matrix,
            subtour_mode: SubtourMode::Full,
            max_exact_vertices: 16,
            node_limit: 5_000_000,
            max_rounds: 1000,
            timeout: 300.0,
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>()
        .map_err(|_| HpError::InvalidArgument(format!("invalid value {value:?} for {key}")))
}

impl SolverConfig {
    /// reads a config file of "key:value" lines ('#' starts a comment line)
    /// keys that are not given keep their default value
    pub fn from_file(file: &str) -> Result<Self> {
        let mut config = SolverConfig::default();
        let f: File = File::open(file)?;                               // open file or return error
        for line in io::BufReader::new(f).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once(':')
                .ok_or_else(|| HpError::InvalidArgument(format!("wrong format of config file: {line:?}")))?;
            match key.trim() {
                "timeout"               => config.timeout = parse_value(key, value)?,
                "subtour_mode"          => config.subtour_mode = SubtourMode::from_code(parse_value(key, value)?)?,
                "max_exact_vertices"    => config.max_exact_vertices = parse_value(key, value)?,
                "node_limit"            => config.node_limit = parse_value(key, value)?,
                "max_rounds"            => config.max_rounds = parse_value(key, value)?,
                "graph_data_structure"  => config.graph_ds = GraphDs::from_code(parse_value(key, value)?)?,
                _ => return Err(HpError::InvalidArgument(format!("unknown config key {key:?}"))),
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=90000.0).contains(&self.timeout) {
            return Err(HpError::InvalidArgument(String::from("timeout should be between 0 and 90000 seconds")));
        }
        if self.max_rounds == 0 {
            return Err(HpError::InvalidArgument(String::from("max_rounds has to be positive")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;

    fn write_config(content: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        std::fs::write(&path, content).unwrap();
        let file = path.to_str().unwrap().to_string();
        (dir, file)
    }

    #[test]
    fn test_read_config() {
        let (_dir, file) = write_config("# solver settings\ntimeout:60\nsubtour_mode:1\n\ngraph_data_structure: 1\n");
        let config = SolverConfig::from_file(&file).unwrap();
        assert_eq!(config.timeout, 60.0);
        assert_eq!(config.subtour_mode, SubtourMode::Lazy);
        assert_eq!(config.graph_ds, GraphDs::Petgraph);
        assert_eq!(config.max_exact_vertices, 16);
    }

    #[test]
    fn test_invalid_configs() {
        for content in ["timeout:100000\n", "subtour_mode:2\n", "solver:1\n", "timeout\n", "node_limit:-1\n"] {
            let (_dir, file) = write_config(content);
            assert!(SolverConfig::from_file(&file).is_err(), "{content:?}");
        }
        assert!(SolverConfig::from_file("no_such_config.txt").is_err());
    }
}
