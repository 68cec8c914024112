//! Job dependency graphs and window tightening.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use fl_core::JobId;

use crate::{JobSpecification, PlanError, PlanResult};

/// Edges from a job to the jobs that must finish before it starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DependencyGraph {
    edges: BTreeMap<JobId, BTreeSet<JobId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `job` may only start after `dependency` has finished.
    pub fn add_dependency(&mut self, job: JobId, dependency: JobId) -> &mut Self {
        self.edges.entry(job).or_default().insert(dependency);
        self
    }

    pub fn dependencies_of(&self, job: JobId) -> impl Iterator<Item = JobId> + '_ {
        self.edges.get(&job).into_iter().flatten().copied()
    }

    /// Every id the graph mentions, on either end of an edge.
    pub fn job_ids(&self) -> BTreeSet<JobId> {
        self.edges.iter().flat_map(|(&job, deps)| std::iter::once(job).chain(deps.iter().copied())).collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }
}

impl FromIterator<(JobId, JobId)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (JobId, JobId)>>(iter: I) -> Self {
        let mut graph = Self::new();
        for (job, dependency) in iter {
            graph.add_dependency(job, dependency);
        }
        graph
    }
}

/// Order `specs` so every job follows its dependencies and tighten each
/// start window by what the graph implies.
///
/// A job may start no earlier than `margin` seconds after the earliest
/// finish of each dependency, and each dependency must be able to finish
/// `margin` seconds before the latest start of everything depending on it.
/// Ties in the order keep the input order.
///
/// Returns `Ok(None)` for a cycle or a window tightened to nothing.
/// Ids in the graph that no specification carries are an error.
pub fn normalize_dependencies(
    specs: &[JobSpecification],
    graph: &DependencyGraph,
    margin: f64,
) -> PlanResult<Option<Vec<JobSpecification>>> {
    let mut index: BTreeMap<JobId, usize> = BTreeMap::new();
    for (i, spec) in specs.iter().enumerate() {
        spec.validate()?;
        if index.insert(spec.id, i).is_some() {
            return Err(PlanError::DuplicateJob(spec.id));
        }
    }
    if let Some(&unknown) = graph.job_ids().iter().find(|id| !index.contains_key(id)) {
        return Err(PlanError::UnknownJob(unknown));
    }

    // Kahn's algorithm over spec indices.
    let mut pending: Vec<usize> = specs.iter().map(|s| graph.dependencies_of(s.id).count()).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); specs.len()];
    for (i, spec) in specs.iter().enumerate() {
        for dep in graph.dependencies_of(spec.id) {
            dependents[index[&dep]].push(i);
        }
    }
    let mut ready: VecDeque<usize> = (0..specs.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(specs.len());
    while let Some(i) = ready.pop_front() {
        order.push(i);
        for &d in &dependents[i] {
            pending[d] -= 1;
            if pending[d] == 0 {
                ready.push_back(d);
            }
        }
    }
    if order.len() < specs.len() {
        return Ok(None);
    }

    let mut tightened: Vec<JobSpecification> = specs.to_vec();
    for &i in &order {
        let id = tightened[i].id;
        let ready_at = graph
            .dependencies_of(id)
            .map(|dep| {
                let d = &tightened[index[&dep]];
                d.earliest_start + (d.duration + margin)
            })
            .max();
        if let Some(t) = ready_at {
            tightened[i].earliest_start = tightened[i].earliest_start.max(t);
        }
    }
    for &i in order.iter().rev() {
        let (id, latest) = (tightened[i].id, tightened[i].latest_start);
        for dep in graph.dependencies_of(id) {
            let d = &mut tightened[index[&dep]];
            d.latest_start = d.latest_start.min(latest - (d.duration + margin));
        }
    }
    if tightened.iter().any(|s| s.latest_start < s.earliest_start) {
        return Ok(None);
    }

    Ok(Some(order.into_iter().map(|i| tightened[i].clone()).collect()))
}
