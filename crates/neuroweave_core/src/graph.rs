//! ConnectivityGraph: spanning tree plus proximity edges.
//!
//! A Kruskal pass over all pairwise distances guarantees one connected
//! component no matter how the nodes cluster. A second pass over the same
//! sorted list adds every pair closer than the proximity threshold for local
//! density. The result is a superset of the minimum spanning tree.
//!
//! Building is O(n² log n), so the engine only rebuilds at init, on resize and
//! every `rebuild_interval` frames. Between rebuilds the edge list is stale by
//! up to that many frames of node drift and edges visibly stretch.

use std::collections::{HashSet, VecDeque};

use crate::field::Node;
use crate::geometry::Point;

/// Undirected edge between node indices, always stored with `a < b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    pub fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Edge { a: i, b: j }
        } else {
            Edge { a: j, b: i }
        }
    }
}

/// Disjoint-set forest with path compression and union by rank.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets of `a` and `b`. Returns false if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            core::cmp::Ordering::Less => self.parent[ra] = rb,
            core::cmp::Ordering::Greater => self.parent[rb] = ra,
            core::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectivityGraph {
    edges: Vec<Edge>,
    mst_edges: usize,
}

impl ConnectivityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(nodes: &[Node], proximity_threshold: f64) -> Self {
        let points: Vec<Point> = nodes.iter().map(|n| n.position).collect();
        Self::build_from_points(&points, proximity_threshold)
    }

    pub fn build_from_points(points: &[Point], proximity_threshold: f64) -> Self {
        let n = points.len();
        if n < 2 {
            return Self::default();
        }

        let mut candidates: Vec<(f64, Edge)> = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                candidates.push((points[i].distance(points[j]), Edge { a: i, b: j }));
            }
        }
        // stable: ties keep index order
        candidates.sort_by(|x, y| x.0.total_cmp(&y.0));

        let mut edges = Vec::with_capacity(n * 3);
        let mut seen: HashSet<Edge> = HashSet::with_capacity(n * 3);
        let mut sets = UnionFind::new(n);

        for &(_, edge) in &candidates {
            if sets.union(edge.a, edge.b) {
                seen.insert(edge);
                edges.push(edge);
                if edges.len() == n - 1 {
                    break;
                }
            }
        }
        let mst_edges = edges.len();

        for &(dist, edge) in &candidates {
            if !(dist < proximity_threshold) {
                break;
            }
            if seen.insert(edge) {
                edges.push(edge);
            }
        }

        Self { edges, mst_edges }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of edges contributed by the spanning-tree pass.
    pub fn mst_edge_count(&self) -> usize {
        self.mst_edges
    }

    /// Breadth-first check that every one of `node_count` nodes is reachable
    /// from node 0. Edges pointing past `node_count` are ignored.
    pub fn is_connected(&self, node_count: usize) -> bool {
        if node_count < 2 {
            return true;
        }
        let mut adjacency = vec![Vec::new(); node_count];
        for e in &self.edges {
            if e.b < node_count {
                adjacency[e.a].push(e.b);
                adjacency[e.b].push(e.a);
            }
        }
        let mut visited = vec![false; node_count];
        let mut queue = VecDeque::from([0usize]);
        visited[0] = true;
        let mut reached = 1;
        while let Some(cur) = queue.pop_front() {
            for &next in &adjacency[cur] {
                if !visited[next] {
                    visited[next] = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }
        reached == node_count
    }
}
