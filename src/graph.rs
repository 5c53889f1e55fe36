//! Directed level graphs
//!
//! A level is described as a directed graph whose vertices carry a label and a
//! world position. The graph is only an input format: it has no simulation
//! logic and is consumed once by `EntityManager::create_from_graph`.
//! Cycles are allowed.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// A payload paired with its world-space position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node<T> {
    pub value: T,
    pub position: DVec2,
}

impl<T> Node<T> {
    pub fn new(value: T, position: DVec2) -> Self {
        Self { value, position }
    }
}

/// A vertex has a unique index within its graph and holds a piece of data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex<T> {
    pub index: usize,
    pub data: T,
}

/// Directed connection between two vertices of the same graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub source: Vertex<T>,
    pub destination: Vertex<T>,
    pub weight: Option<f64>,
}

/// Adjacency list keyed by vertex index.
///
/// Iteration is always in ascending vertex index, and a vertex's outgoing
/// edges keep their insertion order, so materializing the same graph twice
/// produces the same entities in the same order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph<T> {
    adjacencies: BTreeMap<usize, (Vertex<T>, Vec<Edge<T>>)>,
    next_index: usize,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self {
            adjacencies: BTreeMap::new(),
            next_index: 0,
        }
    }
}

impl<T: Clone + PartialEq> Graph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex holding `data` and return it.
    pub fn create_vertex(&mut self, data: T) -> Vertex<T> {
        let vertex = Vertex {
            index: self.next_index,
            data,
        };
        self.next_index += 1;
        self.adjacencies
            .insert(vertex.index, (vertex.clone(), Vec::new()));
        vertex
    }

    /// Add a directed edge. Both endpoints must already be in this graph.
    pub fn add_directed_edge(
        &mut self,
        source: &Vertex<T>,
        destination: &Vertex<T>,
        weight: Option<f64>,
    ) -> Result<(), GraphError> {
        self.check_member(destination)?;
        self.check_member(source)?;

        let edge = Edge {
            source: source.clone(),
            destination: destination.clone(),
            weight,
        };
        if let Some((_, edges)) = self.adjacencies.get_mut(&source.index) {
            edges.push(edge);
        }
        Ok(())
    }

    /// Add a pair of directed edges, one in each direction.
    pub fn add_undirected_edge(
        &mut self,
        a: &Vertex<T>,
        b: &Vertex<T>,
        weight: Option<f64>,
    ) -> Result<(), GraphError> {
        self.add_directed_edge(a, b, weight)?;
        self.add_directed_edge(b, a, weight)
    }

    fn check_member(&self, vertex: &Vertex<T>) -> Result<(), GraphError> {
        match self.adjacencies.get(&vertex.index) {
            Some((known, _)) if known == vertex => Ok(()),
            _ => Err(GraphError::UnknownVertex(vertex.index)),
        }
    }

    /// Outgoing edges of `vertex`; empty for vertices not in the graph.
    pub fn edges(&self, vertex: &Vertex<T>) -> &[Edge<T>] {
        self.adjacencies
            .get(&vertex.index)
            .filter(|(known, _)| known == vertex)
            .map(|(_, edges)| edges.as_slice())
            .unwrap_or(&[])
    }

    /// Weight of the first edge from `source` to `destination`, if any.
    pub fn weight(&self, source: &Vertex<T>, destination: &Vertex<T>) -> Option<f64> {
        self.edges(source)
            .iter()
            .find(|edge| edge.destination == *destination)
            .and_then(|edge| edge.weight)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex<T>> {
        self.adjacencies.values().map(|(vertex, _)| vertex)
    }

    /// Every edge, grouped by source vertex in ascending index order.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge<T>> {
        self.adjacencies.values().flat_map(|(_, edges)| edges.iter())
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacencies.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacencies.values().map(|(_, edges)| edges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Graph<Node<String>>, Vec<Vertex<Node<String>>>) {
        let mut graph = Graph::new();
        let a = graph.create_vertex(Node::new("a".to_string(), DVec2::new(1.0, 1.0)));
        let b = graph.create_vertex(Node::new("b".to_string(), DVec2::new(3.0, 1.0)));
        let c = graph.create_vertex(Node::new("c".to_string(), DVec2::new(2.0, 3.0)));
        graph.add_directed_edge(&a, &b, None).unwrap();
        graph.add_directed_edge(&b, &c, Some(2.5)).unwrap();
        graph.add_directed_edge(&c, &a, None).unwrap();
        (graph, vec![a, b, c])
    }

    #[test]
    fn test_vertices_get_sequential_indices() {
        let (graph, vertices) = triangle();
        let indices: Vec<usize> = graph.vertices().map(|v| v.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(vertices[2].index, 2);
        assert_eq!(graph.vertex_count(), 3);
    }

    #[test]
    fn test_cycles_are_allowed() {
        let (graph, vertices) = triangle();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.edges(&vertices[2])[0].destination, vertices[0]);
    }

    #[test]
    fn test_vertices_work_as_map_keys() {
        let mut graph: Graph<String> = Graph::new();
        let hall = graph.create_vertex("hall".to_string());
        let attic = graph.create_vertex("attic".to_string());

        let mut visits = std::collections::HashMap::new();
        *visits.entry(hall.clone()).or_insert(0) += 1;
        *visits.entry(attic).or_insert(0) += 1;
        *visits.entry(hall.clone()).or_insert(0) += 1;

        assert_eq!(visits.len(), 2);
        assert_eq!(visits[&hall], 2);
    }

    #[test]
    fn test_weight_lookup() {
        let (graph, vertices) = triangle();
        assert_eq!(graph.weight(&vertices[1], &vertices[2]), Some(2.5));
        assert_eq!(graph.weight(&vertices[0], &vertices[1]), None);
        assert_eq!(graph.weight(&vertices[0], &vertices[2]), None);
    }

    #[test]
    fn test_rejects_foreign_vertex() {
        let (mut graph, vertices) = triangle();
        let mut other = Graph::new();
        other.create_vertex(Node::new("x".to_string(), DVec2::ZERO));
        let stranger = other.create_vertex(Node::new("y".to_string(), DVec2::ZERO));
        let imposter = Vertex {
            index: 1,
            data: Node::new("not-b".to_string(), DVec2::ZERO),
        };

        // Same index as "b" but different data.
        assert_eq!(
            graph.add_directed_edge(&vertices[0], &stranger, None),
            Err(GraphError::UnknownVertex(1))
        );
        assert_eq!(
            graph.add_directed_edge(&imposter, &vertices[0], None),
            Err(GraphError::UnknownVertex(1))
        );
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_undirected_edge_adds_both_directions() {
        let mut graph = Graph::new();
        let a = graph.create_vertex(1);
        let b = graph.create_vertex(2);
        graph.add_undirected_edge(&a, &b, Some(1.0)).unwrap();
        assert_eq!(graph.edges(&a).len(), 1);
        assert_eq!(graph.edges(&b).len(), 1);
        assert_eq!(graph.edges(&b)[0].destination, a);
    }
}
