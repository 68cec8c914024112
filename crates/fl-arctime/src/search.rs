//! Graph search over an [`ArcTimeMesh`].
//!
//! Edge weights are elapsed time, so every path to a vertex costs the same
//! total; the Dijkstra variant therefore ranks equal costs by hop count and
//! returns the profile with the fewest vertices.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use crate::{ArcTimeMesh, VertexId};

#[derive(Copy, Clone, PartialEq)]
struct HeapEntry {
    cost: f64,
    hops: u32,
    vertex: VertexId,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    // Reversed for a min-heap on (cost, hops); the vertex id breaks ties.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn better(a: (f64, u32), b: (f64, u32)) -> bool {
    a.0 < b.0 || (a.0 == b.0 && a.1 < b.1)
}

/// Cheapest `source → target` vertex sequence, fewest hops among equals.
///
/// Frontier entries already costlier than the best known cost to `target`
/// are dropped without expansion.
pub fn shortest_path(mesh: &ArcTimeMesh, source: VertexId, target: VertexId) -> Option<Vec<VertexId>> {
    let n = mesh.vertex_count();
    if source.index() >= n || target.index() >= n {
        return None;
    }
    let mut best = vec![(f64::INFINITY, u32::MAX); n];
    let mut prev: Vec<Option<VertexId>> = vec![None; n];

    best[source.index()] = (0.0, 0);
    let mut heap = BinaryHeap::new();
    heap.push(HeapEntry { cost: 0.0, hops: 0, vertex: source });

    while let Some(HeapEntry { cost, hops, vertex }) = heap.pop() {
        if vertex == target {
            return Some(reconstruct(&prev, source, target));
        }
        // Stale entry.
        if better(best[vertex.index()], (cost, hops)) {
            continue;
        }
        let bound = best[target.index()].0;
        if cost > bound {
            continue;
        }
        for e in mesh.out_edges(vertex) {
            let next = mesh.edge_to[e];
            let cand = (cost + mesh.edge_weight[e], hops + 1);
            if cand.0 > bound {
                continue;
            }
            if better(cand, best[next.index()]) {
                best[next.index()] = cand;
                prev[next.index()] = Some(vertex);
                heap.push(HeapEntry { cost: cand.0, hops: cand.1, vertex: next });
            }
        }
    }
    None
}

fn reconstruct(prev: &[Option<VertexId>], source: VertexId, target: VertexId) -> Vec<VertexId> {
    let mut path = vec![target];
    let mut cur = target;
    while cur != source {
        match prev[cur.index()] {
            Some(p) => {
                path.push(p);
                cur = p;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Vertices reachable from `source` (breadth-first), as a membership mask.
pub fn reachable_from(mesh: &ArcTimeMesh, source: VertexId) -> Vec<bool> {
    let mut seen = vec![false; mesh.vertex_count()];
    if source.index() >= seen.len() {
        return seen;
    }
    let mut queue = VecDeque::from([source]);
    seen[source.index()] = true;
    while let Some(v) = queue.pop_front() {
        for e in mesh.out_edges(v) {
            let next = mesh.edge_to[e];
            if !seen[next.index()] {
                seen[next.index()] = true;
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Vertices from which `target` is reachable: breadth-first over the
/// reversed edges.
pub fn reverse_reachable(mesh: &ArcTimeMesh, target: VertexId) -> Vec<bool> {
    let n = mesh.vertex_count();
    let mut seen = vec![false; n];
    if target.index() >= n {
        return seen;
    }

    // Reverse CSR: in-edges grouped by destination.
    let mut in_start = vec![0usize; n + 1];
    for to in &mesh.edge_to {
        in_start[to.index() + 1] += 1;
    }
    for i in 1..=n {
        in_start[i] += in_start[i - 1];
    }
    let mut fill = in_start.clone();
    let mut in_from = vec![VertexId(0); mesh.edge_count()];
    for (from, to) in mesh.edge_from.iter().zip(&mesh.edge_to) {
        in_from[fill[to.index()]] = *from;
        fill[to.index()] += 1;
    }

    let mut queue = VecDeque::from([target]);
    seen[target.index()] = true;
    while let Some(v) = queue.pop_front() {
        for &prev in &in_from[in_start[v.index()]..in_start[v.index() + 1]] {
            if !seen[prev.index()] {
                seen[prev.index()] = true;
                queue.push_back(prev);
            }
        }
    }
    seen
}
