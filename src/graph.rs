//! Weighted directed graph as immutable adjacency lists.
//!
//! The text format is one edge per line, `from to weight`,
//! whitespace-separated. Blank lines and lines starting with `#` are
//! skipped. Weights are parsed as floating point and rounded to the nearest
//! integer; the highest vertex id seen determines the node count.

use crate::dijkstra::INFINITY;
use crate::traits::Key;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// A directed edge out of some vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: i32,
    pub weight: Key,
}

/// Error type for graph loading
#[derive(Debug)]
pub enum GraphError {
    /// The file could not be read
    Io(io::Error),
    /// A line did not parse as `from to weight`
    Parse { line: usize, content: String },
    /// A vertex id was negative
    NegativeVertexId { line: usize },
    /// A weight was negative or exceeded the distance sentinel
    WeightOutOfRange { line: usize },
    /// The input contained no edges
    Empty,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::Io(err) => write!(f, "failed to read graph file: {err}"),
            GraphError::Parse { line, content } => {
                write!(f, "failed to parse line {line}: {content}")
            }
            GraphError::NegativeVertexId { line } => {
                write!(f, "negative vertex id on line {line}")
            }
            GraphError::WeightOutOfRange { line } => {
                write!(f, "weight out of range on line {line}")
            }
            GraphError::Empty => write!(f, "graph contains no edges"),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GraphError {
    fn from(err: io::Error) -> Self {
        GraphError::Io(err)
    }
}

/// Immutable adjacency-list graph indexed by vertex id.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
}

impl Graph {
    /// Builds a graph from `(from, to, weight)` triples. `node_count` is
    /// the highest id mentioned plus one.
    ///
    /// # Errors
    /// [`GraphError::NegativeVertexId`] or [`GraphError::WeightOutOfRange`]
    /// on a bad triple (reported with its 1-based position),
    /// [`GraphError::Empty`] when no edges are given.
    pub fn from_edges(edges: &[(i32, i32, Key)]) -> Result<Self, GraphError> {
        let mut graph = Graph::default();
        for (pos, &(from, to, weight)) in edges.iter().enumerate() {
            graph.add_edge(from, to, weight, pos + 1)?;
        }
        if graph.adjacency.is_empty() {
            return Err(GraphError::Empty);
        }
        Ok(graph)
    }

    /// Parses the one-edge-per-line text format.
    pub fn parse(input: &str) -> Result<Self, GraphError> {
        let mut graph = Graph::default();
        for (index, line) in input.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut fields = trimmed.split_whitespace();
            let parse_err = || GraphError::Parse {
                line: line_number,
                content: line.to_string(),
            };
            let from: i32 = fields
                .next()
                .and_then(|f| f.parse().ok())
                .ok_or_else(parse_err)?;
            let to: i32 = fields
                .next()
                .and_then(|f| f.parse().ok())
                .ok_or_else(parse_err)?;
            let weight: f64 = fields
                .next()
                .and_then(|f| f.parse().ok())
                .ok_or_else(parse_err)?;

            let discrete = weight.round() as Key;
            graph.add_edge(from, to, discrete, line_number)?;
        }

        if graph.adjacency.is_empty() {
            return Err(GraphError::Empty);
        }
        Ok(graph)
    }

    /// Reads and parses a graph file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    fn add_edge(&mut self, from: i32, to: i32, weight: Key, line: usize) -> Result<(), GraphError> {
        if from < 0 || to < 0 {
            return Err(GraphError::NegativeVertexId { line });
        }
        if !(0..=INFINITY).contains(&weight) {
            return Err(GraphError::WeightOutOfRange { line });
        }

        let needed = from.max(to) as usize + 1;
        if needed > self.adjacency.len() {
            self.adjacency.resize_with(needed, Vec::new);
        }
        self.adjacency[from as usize].push(Edge { to, weight });
        self.edge_count += 1;
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Out-edges of `node`
    pub fn neighbors(&self, node: i32) -> &[Edge] {
        &self.adjacency[node as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edges_comments_and_blanks() {
        let graph = Graph::parse(
            "# a comment\n\
             0 1 4\n\
             \n\
             1 2 2.6\n\
             0 2 1.2\n",
        )
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(0).len(), 2);
        // Weights round to the nearest integer
        assert_eq!(graph.neighbors(1)[0], Edge { to: 2, weight: 3 });
        assert_eq!(graph.neighbors(0)[1], Edge { to: 2, weight: 1 });
    }

    #[test]
    fn highest_id_fixes_node_count() {
        let graph = Graph::parse("0 9 1\n").unwrap();
        assert_eq!(graph.node_count(), 10);
        assert!(graph.neighbors(5).is_empty());
    }

    #[test]
    fn rejects_negative_ids() {
        let err = Graph::parse("0 1 2\n-1 2 3\n").unwrap_err();
        assert!(matches!(err, GraphError::NegativeVertexId { line: 2 }));
    }

    #[test]
    fn rejects_out_of_range_weights() {
        let err = Graph::parse("0 1 -5\n").unwrap_err();
        assert!(matches!(err, GraphError::WeightOutOfRange { line: 1 }));
    }

    #[test]
    fn rejects_malformed_lines() {
        let err = Graph::parse("0 one 2\n").unwrap_err();
        assert!(matches!(err, GraphError::Parse { line: 1, .. }));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(Graph::parse("# nothing\n"), Err(GraphError::Empty)));
        assert!(matches!(Graph::from_edges(&[]), Err(GraphError::Empty)));
    }
}
