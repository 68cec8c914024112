//! Fluent builder for constructing a [`JobScheduler`].

use rustc_hash::FxHashMap;

use fl_core::{PlannerConfig, SimRng, Time};
use fl_node::NodeSpecification;
use fl_schedule::Schedule;
use fl_spatial::{Router, World};
use fl_trajectory::DynamicObstacle;

use crate::{JobScheduler, ServiceResult, TransactionObserver};

/// Fluent builder for [`JobScheduler<R, O>`].
///
/// # Required inputs
///
/// - [`PlannerConfig`] — seed, pick limit, dependency margin, tolerances, …
/// - `R: Router` — the spatial router (e.g. [`fl_spatial::VisibilityRouter`])
/// - `O: TransactionObserver` — lifecycle callbacks (or [`NoopObserver`](crate::NoopObserver))
///
/// # Optional inputs (have defaults)
///
/// | Method                    | Default                |
/// |---------------------------|------------------------|
/// | `.world(w)`               | `World::empty()`       |
/// | `.nodes(v)`               | no nodes               |
/// | `.dynamic_obstacles(v)`   | none                   |
/// | `.frozen_horizon(t)`      | `-∞` (nothing frozen)  |
///
/// # Example
///
/// ```rust,ignore
/// let mut scheduler = JobSchedulerBuilder::new(config, VisibilityRouter::default(), NoopObserver)
///     .world(world)
///     .nodes(fleet)
///     .build()?;
/// let outcome = scheduler.schedule(&spec)?;
/// scheduler.commit(outcome.id)?;
/// ```
pub struct JobSchedulerBuilder<R: Router, O: TransactionObserver> {
    config:            PlannerConfig,
    router:            R,
    observer:          O,
    world:             Option<World>,
    nodes:             Vec<NodeSpecification>,
    dynamic_obstacles: Vec<DynamicObstacle>,
    frozen_horizon:    Option<Time>,
}

impl<R: Router, O: TransactionObserver> JobSchedulerBuilder<R, O> {
    /// Create a builder with all required inputs.
    pub fn new(config: PlannerConfig, router: R, observer: O) -> Self {
        Self {
            config,
            router,
            observer,
            world:             None,
            nodes:             Vec::new(),
            dynamic_obstacles: Vec::new(),
            frozen_horizon:    None,
        }
    }

    /// Supply the static obstacles every node must avoid.
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Supply the initial fleet.  Ids must be unique.
    pub fn nodes(mut self, nodes: Vec<NodeSpecification>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Supply obstacles that move independently of the fleet.
    pub fn dynamic_obstacles(mut self, obstacles: Vec<DynamicObstacle>) -> Self {
        self.dynamic_obstacles = obstacles;
        self
    }

    /// Start with the frozen horizon at `t`.  Every node must then be born
    /// at or after `t`.
    pub fn frozen_horizon(mut self, t: Time) -> Self {
        self.frozen_horizon = Some(t);
        self
    }

    /// Validate inputs and return a ready [`JobScheduler`].
    pub fn build(self) -> ServiceResult<JobScheduler<R, O>> {
        self.config.validate()?;

        let mut schedule = Schedule::new(self.world.unwrap_or_else(World::empty), &self.config);
        if let Some(t) = self.frozen_horizon {
            schedule.set_frozen_horizon(t)?;
        }
        for spec in self.nodes {
            schedule.add_node(spec)?;
        }
        for obstacle in self.dynamic_obstacles {
            schedule.add_dynamic_obstacle(obstacle);
        }

        Ok(JobScheduler {
            rng:          SimRng::new(self.config.seed),
            config:       self.config,
            schedule,
            router:       self.router,
            observer:     self.observer,
            transactions: FxHashMap::default(),
        })
    }
}
