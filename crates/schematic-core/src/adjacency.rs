//! Incoming/outgoing edge index.
//!
//! [`Adjacency`] is built in one pass over an edge slice and answers
//! "which edges enter/leave this node" in O(1) per node. Validators and
//! exporters build one index per call and never keep it beyond that.

use std::collections::HashMap;

use crate::graph::Edge;

/// Per-node incoming and outgoing edge positions over a borrowed edge slice.
///
/// Edges whose endpoints are not nodes are still indexed under their ids,
/// so the index can be built over unchecked input.
#[derive(Debug)]
pub struct Adjacency<'g> {
    edges: &'g [Edge],
    incoming: HashMap<&'g str, Vec<usize>>,
    outgoing: HashMap<&'g str, Vec<usize>>,
}

impl<'g> Adjacency<'g> {
    /// Index `edges`.
    pub fn new(edges: &'g [Edge]) -> Self {
        let mut incoming: HashMap<&'g str, Vec<usize>> = HashMap::new();
        let mut outgoing: HashMap<&'g str, Vec<usize>> = HashMap::new();

        for (index, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.source()).or_default().push(index);
            incoming.entry(edge.target()).or_default().push(index);
        }

        Self {
            edges,
            incoming,
            outgoing,
        }
    }

    /// Edges whose target is `id`, in edge order.
    pub fn incoming(&self, id: &str) -> impl Iterator<Item = &'g Edge> + '_ {
        Self::lookup(&self.incoming, id).map(|index| &self.edges[index])
    }

    /// Edges whose source is `id`, in edge order.
    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &'g Edge> + '_ {
        Self::lookup(&self.outgoing, id).map(|index| &self.edges[index])
    }

    /// Edges touching `id` in either direction. A self-loop is reported twice.
    pub fn incident(&self, id: &str) -> impl Iterator<Item = &'g Edge> + '_ {
        self.incoming(id).chain(self.outgoing(id))
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.incoming.get(id).map_or(0, Vec::len)
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.outgoing.get(id).map_or(0, Vec::len)
    }

    /// Returns `true` if no edge touches `id`.
    pub fn is_isolated(&self, id: &str) -> bool {
        self.in_degree(id) == 0 && self.out_degree(id) == 0
    }

    fn lookup<'m>(
        map: &'m HashMap<&'g str, Vec<usize>>,
        id: &str,
    ) -> impl Iterator<Item = usize> + 'm {
        map.get(id).into_iter().flatten().copied()
    }
}
