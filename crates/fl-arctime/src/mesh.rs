//! Arc-time mesh representation, builder and connection strategies.
//!
//! # Data layout
//!
//! The mesh uses **Compressed Sparse Row (CSR)** format for outgoing edges:
//! the out-edges of vertex `v` are the edge indices
//! `out_start[v] .. out_start[v+1]`, and all edge arrays are sorted by source
//! vertex.  The search inner loop is a contiguous scan.
//!
//! Edge weight is elapsed time (`to.time - from.time`).
//!
//! # Connection strategies
//!
//! [`connect_simple`] tests every ordered vertex pair: complete,
//! but quadratic in checker calls.  [`connect_lazy`] builds only the edges an
//! optimal profile needs: maximum-speed runs and waits at region corners.
//! From every vertex it casts a stationary ray forward in time and a
//! maximum-speed ray backward toward the minimum arc, both truncated at the
//! first region they enter.  Where one vertex's stationary ray meets
//! another's motion ray, the two are joined: through a new stop vertex if
//! the wait is longer than `min_stop_duration`, directly otherwise.

use tracing::trace;

use fl_core::Vector;
use fl_trajectory::ArcTime;

use crate::{EdgeChecker, ForbiddenRegion};

const TOLERANCE: f64 = 1e-9;

// ── VertexId ──────────────────────────────────────────────────────────────────

/// Index of a mesh vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u32);

impl VertexId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// ── ArcTimeMesh ───────────────────────────────────────────────────────────────

/// Directed arc-time graph in CSR format.
///
/// Do not construct directly; use [`MeshBuilder`].
#[derive(Clone, Debug)]
pub struct ArcTimeMesh {
    pub vertices: Vec<ArcTime>,
    /// CSR row pointer, length `vertex_count + 1`.
    pub out_start: Vec<u32>,
    pub edge_from: Vec<VertexId>,
    pub edge_to: Vec<VertexId>,
    /// Elapsed time per edge, in seconds.
    pub edge_weight: Vec<f64>,
}

impl ArcTimeMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    #[inline]
    pub fn vertex(&self, v: VertexId) -> ArcTime {
        self.vertices[v.index()]
    }

    /// Edge indices leaving `v`.
    #[inline]
    pub fn out_edges(&self, v: VertexId) -> std::ops::Range<usize> {
        self.out_start[v.index()] as usize..self.out_start[v.index() + 1] as usize
    }
}

// ── MeshBuilder ───────────────────────────────────────────────────────────────

/// Collect vertices and directed edges, then call [`build`](Self::build).
#[derive(Clone, Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<ArcTime>,
    raw_edges: Vec<(VertexId, VertexId)>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its id (sequential from 0).
    pub fn add_vertex(&mut self, v: ArcTime) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(v);
        id
    }

    pub fn add_edge(&mut self, from: VertexId, to: VertexId) {
        self.raw_edges.push((from, to));
    }

    pub fn vertex(&self, v: VertexId) -> ArcTime {
        self.vertices[v.index()]
    }

    pub fn vertices(&self) -> &[ArcTime] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    /// Consume the builder and produce an [`ArcTimeMesh`].
    ///
    /// Time complexity: O(E log E) for the edge sort.
    pub fn build(self) -> ArcTimeMesh {
        let n = self.vertices.len();
        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|&(from, to)| (from, to));
        raw.dedup();

        let edge_from: Vec<VertexId> = raw.iter().map(|e| e.0).collect();
        let edge_to: Vec<VertexId> = raw.iter().map(|e| e.1).collect();
        let edge_weight: Vec<f64> = raw
            .iter()
            .map(|&(a, b)| self.vertices[b.index()].time - self.vertices[a.index()].time)
            .collect();

        let mut out_start = vec![0u32; n + 1];
        for &(from, _) in &raw {
            out_start[from.index() + 1] += 1;
        }
        for i in 1..=n {
            out_start[i] += out_start[i - 1];
        }

        ArcTimeMesh { vertices: self.vertices, out_start, edge_from, edge_to, edge_weight }
    }
}

// ── Dense connection ──────────────────────────────────────────────────────────

/// Add an edge for every ordered pair of current vertices `checker` accepts.
pub fn connect_simple(builder: &mut MeshBuilder, checker: &dyn EdgeChecker) {
    let n = builder.vertex_count();
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (a, b) = (VertexId(i as u32), VertexId(j as u32));
            if checker.check(builder.vertex(a), builder.vertex(b)) {
                builder.add_edge(a, b);
            }
        }
    }
    trace!(vertices = n, edges = builder.edge_count(), "simple mesh connected");
}

// ── Sparse connection ─────────────────────────────────────────────────────────

/// Parameters of the sparse ray-casting connection.
#[derive(Copy, Clone, Debug)]
pub struct LazyRays<'a> {
    pub regions: &'a [ForbiddenRegion],
    pub max_speed: f64,
    pub min_stop_duration: f64,
    pub min_arc: f64,
    /// Arc of the route end.
    pub max_arc: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub finish: VertexId,
}

impl LazyRays<'_> {
    /// Parameter at which `origin + λ·dir`, `λ ∈ [0, hi]`, first enters a
    /// region; `hi` if it never does.
    fn truncate(&self, origin: ArcTime, dir: Vector, hi: f64) -> f64 {
        if hi <= 0.0 {
            return 0.0;
        }
        self.regions
            .iter()
            .filter_map(|r| r.first_entry(origin.to_point(), dir, hi))
            .fold(hi, f64::min)
    }
}

/// Connect the current vertices with maximum-speed runs and waits.
pub fn connect_lazy(builder: &mut MeshBuilder, rays: &LazyRays<'_>, checker: &dyn EdgeChecker) {
    let n = builder.vertex_count();
    let vmax = rays.max_speed;
    if n == 0 || vmax <= 0.0 {
        return;
    }
    let verts: Vec<ArcTime> = builder.vertices().to_vec();

    // Stationary rays, as the longest wait from each vertex.
    let wait_len: Vec<f64> = verts
        .iter()
        .map(|v| rays.truncate(*v, Vector::new(0.0, 1.0), rays.max_time - v.time))
        .collect();
    // Backward maximum-speed rays, as the longest run (in time) into each vertex.
    let run_len: Vec<f64> = verts
        .iter()
        .map(|v| {
            let hi = (v.time - rays.min_time).min((v.arc - rays.min_arc) / vmax);
            rays.truncate(*v, Vector::new(-vmax, -1.0), hi)
        })
        .collect();

    for (ui, u) in verts.iter().enumerate() {
        let uid = VertexId(ui as u32);
        for (wi, w) in verts.iter().enumerate() {
            if ui == wi || u.arc > w.arc + TOLERANCE {
                continue;
            }
            let mu = (w.arc - u.arc).max(0.0) / vmax;
            if mu > run_len[wi] + TOLERANCE {
                continue;
            }
            let meet = w.time - mu;
            let wait = meet - u.time;
            if wait < -TOLERANCE || wait > wait_len[ui] + TOLERANCE {
                continue;
            }
            let crossing = Crossing { at: ArcTime::new(u.arc, meet), wait, run: mu };
            join(builder, checker, rays.min_stop_duration, (uid, VertexId(wi as u32)), crossing);
        }

        // Run to the route end, then wait there for the finish.
        if uid == rays.finish || u.arc > rays.max_arc + TOLERANCE {
            continue;
        }
        let finish = builder.vertex(rays.finish);
        let mu = (rays.max_arc - u.arc).max(0.0) / vmax;
        let arrival = ArcTime::new(rays.max_arc, u.time + mu);
        let wait = finish.time - arrival.time;
        if wait < -TOLERANCE {
            continue;
        }
        let crossing = Crossing { at: arrival, wait, run: mu };
        join(builder, checker, rays.min_stop_duration, (uid, rays.finish), crossing);
    }
    trace!(
        vertices = builder.vertex_count(),
        edges = builder.edge_count(),
        "lazy mesh connected"
    );
}

/// The vertex where a wait and a maximum-speed run meet, with the duration
/// of each.
struct Crossing {
    at: ArcTime,
    wait: f64,
    run: f64,
}

/// Join `u` to `w` through `crossing.at`.  A wait or run too short to
/// matter collapses into one direct edge.
fn join(
    builder: &mut MeshBuilder,
    checker: &dyn EdgeChecker,
    min_stop: f64,
    (u, w): (VertexId, VertexId),
    crossing: Crossing,
) {
    let (from, to) = (builder.vertex(u), builder.vertex(w));
    if crossing.wait > min_stop && crossing.run > TOLERANCE {
        if checker.check(from, crossing.at) && checker.check(crossing.at, to) {
            let c = builder.add_vertex(crossing.at);
            builder.add_edge(u, c);
            builder.add_edge(c, w);
        }
    } else if checker.check(from, to) {
        builder.add_edge(u, w);
    }
}
