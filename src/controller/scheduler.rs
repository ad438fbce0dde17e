use fxhash::FxHashMap;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::{
    config::Config,
    debugger,
    demand::{Demand, DemandStatus, QosClass},
    error::{Error, Result},
    network::LightpathID,
    np_core::parameters::{PB_CHARS, PB_TEMPLATES},
    topology::RouteCandidate,
    SD,
};

use super::{pathfinder, route_plan::{RoutePlan, SegmentPlan}, PlanningRun};

/// Decides in which order demands are served and on which routes.
pub trait SchedulingPolicy {
    fn name(&self) -> &'static str;

    /// Serves `demands` on `run`, updating each demand's status and IP path.
    fn schedule(
        &self,
        run: &mut PlanningRun,
        demands: &mut [Demand],
        candidates: &FxHashMap<SD, Vec<RouteCandidate>>,
    ) -> Result<()>;
}

pub fn from_config(config: &Config) -> Result<Box<dyn SchedulingPolicy>> {
    match config.policy.scheduling_policy.as_str() {
        "greedy" | "GREEDY" => Ok(Box::new(GreedyScheduler)),
        other => Err(Error::InvalidConfig(format!("unknown scheduling policy `{other}`"))),
    }
}

/// Serves PRIORITY before BEST_EFFORT, shortest first candidate first, and
/// commits the cheapest feasible route of each demand without backtracking.
#[derive(Debug, Default)]
pub struct GreedyScheduler;

impl SchedulingPolicy for GreedyScheduler {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn schedule(
        &self,
        run: &mut PlanningRun,
        demands: &mut [Demand],
        candidates: &FxHashMap<SD, Vec<RouteCandidate>>,
    ) -> Result<()> {
        let order = scheduling_order(demands, candidates);
        let best_effort_total = demands.iter().filter(|d| d.qos == QosClass::BestEffort).count();
        let mut dropped = 0;

        let pb = ProgressBar::new(order.len() as u64);
        if run.config.debug.show_progress {
            if let Ok(style) = ProgressStyle::default_bar().template(PB_TEMPLATES) {
                pb.set_style(style.progress_chars(PB_CHARS));
            }
            pb.set_message("scheduling");
        } else {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        for position in order {
            let demand = &mut demands[position];
            let routes = candidates.get(&demand.sd).map_or(&[][..], |c| c.as_slice());

            let ip_path = match pathfinder::search(run, demand, routes)? {
                Some(plan) => commit(run, demand, &plan)?,
                None => None,
            };

            match ip_path {
                Some(ip_path) => {
                    demand.ip_path = ip_path;
                    demand.status = DemandStatus::Served;
                    debugger::log_demand_assign(run.config, demand, &run.pool);
                }
                None if demand.is_priority() => {
                    pb.finish_and_clear();
                    return Err(Error::PriorityDemandInfeasible {
                        index: demand.index,
                        src: demand.sd.src,
                        dst: demand.sd.dst,
                    });
                }
                None => {
                    demand.status = DemandStatus::Dropped;
                    dropped += 1;
                    debugger::log_demand_drop(run.config, demand, dropped, best_effort_total);

                    let ratio = dropped as f64 / best_effort_total as f64;
                    if ratio > run.config.policy.drop_ratio_limit {
                        pb.finish_and_clear();
                        return Err(Error::DropThresholdExceeded {
                            dropped,
                            total: best_effort_total,
                            ratio,
                            limit: run.config.policy.drop_ratio_limit,
                        });
                    }
                }
            }

            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(())
    }
}

/// Positions of `demands` in serving order: PRIORITY first, then by the length
/// of the first candidate route. Demands without a candidate come last in their class.
pub fn scheduling_order(demands: &[Demand], candidates: &FxHashMap<SD, Vec<RouteCandidate>>) -> Vec<usize> {
    let first_length = |demand: &Demand| {
        candidates
            .get(&demand.sd)
            .and_then(|routes| routes.first())
            .map_or(f64::INFINITY, |route| route.length_km())
    };

    let mut order: Vec<usize> = (0..demands.len()).collect();
    order.sort_by(|&a, &b| {
        demands[a]
            .qos
            .cmp(&demands[b].qos)
            .then_with(|| first_length(&demands[a]).total_cmp(&first_length(&demands[b])))
    });

    order
}

/// Creates the planned lightpaths and attaches the demand to the reused ones.
/// `None` if spectrum for the new lightpaths is gone.
fn commit(run: &mut PlanningRun, demand: &Demand, plan: &RoutePlan) -> Result<Option<Vec<LightpathID>>> {
    let planned = plan.planned_segments();
    let Some(created) = run.pool.create_new(&mut run.network, &planned, run.catalog, demand.index, demand.traffic_gbps)? else {
        return Ok(None);
    };

    for id in &created {
        if let Some(lightpath) = run.pool.get(*id) {
            debugger::log_lightpath_create(run.config, lightpath, run.catalog);
        }
    }

    let mut created = created.into_iter();
    let mut ip_path = Vec::with_capacity(plan.segments.len());
    for segment_plan in &plan.segments {
        match segment_plan {
            SegmentPlan::Reuse(lightpath_id) => {
                run.pool.attach(*lightpath_id, demand.traffic_gbps, demand.index)?;
                ip_path.push(*lightpath_id);
            }
            SegmentPlan::Create(_) => {
                if let Some(id) = created.next() {
                    ip_path.push(id);
                }
            }
        }
    }

    Ok(Some(ip_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(length_km: f64) -> Vec<RouteCandidate> {
        vec![RouteCandidate::new(vec![0, 1], vec![crate::Edge::new(0, 1)], vec![length_km])]
    }

    #[test]
    fn priority_first_then_shortest_first() {
        let demands = vec![
            Demand::new(0, SD::new(0, 1), 100.0, QosClass::BestEffort),
            Demand::new(1, SD::new(0, 2), 100.0, QosClass::Priority),
            Demand::new(2, SD::new(0, 3), 100.0, QosClass::BestEffort),
            Demand::new(3, SD::new(0, 4), 100.0, QosClass::Priority),
            Demand::new(4, SD::new(0, 1), 100.0, QosClass::BestEffort),
            Demand::new(5, SD::new(0, 9), 100.0, QosClass::Priority),
        ];
        let mut candidates = FxHashMap::default();
        candidates.insert(SD::new(0, 1), route(300.0));
        candidates.insert(SD::new(0, 2), route(500.0));
        candidates.insert(SD::new(0, 3), route(100.0));
        candidates.insert(SD::new(0, 4), route(200.0));

        assert_eq!(scheduling_order(&demands, &candidates), vec![3, 1, 5, 2, 0, 4]);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let mut config = Config::default();
        assert_eq!(from_config(&config).unwrap().name(), "greedy");

        config.policy.scheduling_policy = "random".to_string();
        assert!(matches!(from_config(&config), Err(Error::InvalidConfig(_))));
    }
}
