use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    config::Config,
    debugger,
    demand::{self, Demand, DemandStatus, QosClass},
    error::Result,
    network::{IPLinkPool, Network},
    topology::{compute_route_candidates, PathConstraints, Topology},
    transponder::TransponderCatalog,
    SD,
};

pub mod output;
pub mod pathfinder;
pub mod route_plan;
pub mod scheduler;
pub mod subpath;
pub mod sweep;

/// State owned by one planning run. Created fresh, never shared across runs.
pub struct PlanningRun<'a> {
    pub config: &'a Config,
    pub topology: &'a Topology,
    pub catalog: &'a TransponderCatalog,
    pub network: Network,
    pub pool: IPLinkPool,
}

impl<'a> PlanningRun<'a> {
    pub fn new(config: &'a Config, topology: &'a Topology, catalog: &'a TransponderCatalog) -> Result<Self> {
        Ok(Self {
            config,
            topology,
            catalog,
            network: Network::from_config(config, topology)?,
            pool: IPLinkPool::new(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanSummary {
    pub total_cost: f64,
    pub lightpath_count: usize,
    pub demand_count: usize,
    pub served_count: usize,
    pub dropped_count: usize,
    pub best_effort_count: usize,
    pub drop_ratio: f64,
    pub regenerator_count: usize,
}

impl PlanSummary {
    pub fn new(pool: &IPLinkPool, demands: &[Demand]) -> Self {
        let count = |status: DemandStatus| demands.iter().filter(|d| d.status == status).count();
        let best_effort_count = demands.iter().filter(|d| d.qos == QosClass::BestEffort).count();
        let dropped_count = count(DemandStatus::Dropped);

        Self {
            total_cost: pool.usage.total_cost,
            lightpath_count: pool.usage.lightpath_count,
            demand_count: demands.len(),
            served_count: count(DemandStatus::Served),
            dropped_count,
            best_effort_count,
            drop_ratio: if best_effort_count == 0 { 0.0 } else { dropped_count as f64 / best_effort_count as f64 },
            regenerator_count: pool.usage.regenerator_count(),
        }
    }
}

pub struct PlanOutcome {
    pub network: Network,
    pub pool: IPLinkPool,
    pub summary: PlanSummary,
}

/// Runs the whole planning pass for `demands` and audits the final occupancy.
pub fn plan(config: &Config, topology: &Topology, catalog: &TransponderCatalog, demands: &mut [Demand]) -> Result<PlanOutcome> {
    demand::validate_demands(demands, topology)?;

    let constraints = PathConstraints::from_config(config);
    let sds: Vec<SD> = demands.iter().map(|d| d.sd).collect();
    let candidates = compute_route_candidates(topology, &sds, &constraints, config.debug.show_progress)?;

    let mut run = PlanningRun::new(config, topology, catalog)?;
    let policy = scheduler::from_config(config)?;
    log::info!(
        "planning {} demands over {} nodes / {} links with the {} policy",
        demands.len(),
        topology.node_count(),
        topology.links.len(),
        policy.name()
    );

    policy.schedule(&mut run, demands, &candidates)?;
    run.network.check_allocation_clashing(&run.pool)?;
    debugger::log_state_matrix(config, &run.network);

    let summary = PlanSummary::new(&run.pool, demands);
    log::info!(
        "total cost {} with {} lightpaths, {}/{} demands served, {} dropped",
        summary.total_cost,
        summary.lightpath_count,
        summary.served_count,
        summary.demand_count,
        summary.dropped_count
    );

    Ok(PlanOutcome {
        network: run.network,
        pool: run.pool,
        summary,
    })
}

pub fn main(config: &Config) -> Result<output::PlanReport> {
    let topology = Topology::new(config)?;
    let catalog = TransponderCatalog::from_config(config)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.simulation.random_seed);

    let mut demands = demand::get_demand_list(config, &topology, &mut rng)?;
    let outcome = plan(config, &topology, &catalog, &mut demands)?;

    let report = output::PlanReport::new(&topology, &catalog, &outcome, &demands);
    output::save_report(config, &report, &outcome.network)?;

    Ok(report)
}

/// Runs the capacity sweep and writes one summary per step under `outdir/<mode>/C<share>/`.
pub fn sweep_main(config: &Config) -> Result<sweep::SweepReport> {
    let topology = Topology::new(config)?;
    let catalog = TransponderCatalog::from_config(config)?;

    let report = sweep::sweep(config, &topology, &catalog, |step| output::save_sweep_step(config, step))?;
    output::save_sweep_report(config, &report)?;

    Ok(report)
}
