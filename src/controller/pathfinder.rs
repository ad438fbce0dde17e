use crate::{
    demand::Demand,
    error::{Error, Result},
    network::PlannedSegment,
    np_core::parameters::TRANSPONDERS_PER_LIGHTPATH,
    topology::RouteCandidate,
    transponder::ranked_modulations,
};

use super::{route_plan::{RoutePlan, SegmentPlan}, subpath, PlanningRun};

/// Cheapest feasible route among `candidates`; the earlier route wins a tie.
pub fn search(run: &PlanningRun, demand: &Demand, candidates: &[RouteCandidate]) -> Result<Option<RoutePlan>> {
    let mut best: Option<RoutePlan> = None;

    for (route_index, route) in candidates.iter().enumerate() {
        let Some(plan) = evaluate_route(run, demand, route_index, route)? else {
            continue;
        };

        match &best {
            Some(b) if plan.cost >= b.cost => (),
            _ => best = Some(plan),
        }
    }

    Ok(best)
}

/// Plans every segment of `route` against the current state without committing.
/// `None` if some segment cannot be served.
pub fn evaluate_route(run: &PlanningRun, demand: &Demand, route_index: usize, route: &RouteCandidate) -> Result<Option<RoutePlan>> {
    let Some(subpaths) = subpath::plan_subpaths(run.topology, run.catalog, route)? else {
        return Ok(None);
    };

    let objective = run.config.policy.modulation_objective;
    let mut segments = Vec::with_capacity(subpaths.len());
    let mut cost = 0.0;

    for subpath in subpaths {
        if let Some(lightpath_id) = run.pool.find_reusable(&subpath.segment.sd(), demand.traffic_gbps) {
            segments.push(SegmentPlan::Reuse(lightpath_id));
            continue;
        }

        let transponder = run.catalog.get(subpath.transponder);
        let length_km = subpath.segment.length_km();
        let ranked = ranked_modulations(length_km, transponder, objective);
        if ranked.is_empty() {
            return Err(Error::ModulationUnreachable { transponder: transponder.name.clone(), length_km });
        }

        // best-ranked modulation that carries the demand and still finds spectrum
        let mut chosen = None;
        for modulation in ranked.into_iter().filter(|m| m.data_rate >= demand.traffic_gbps) {
            if let Some(slot_head) = run.network.first_fit_assign(&subpath.segment, modulation.channel_spacing)? {
                chosen = Some((modulation, slot_head));
                break;
            }
        }
        let Some((modulation, slot_head)) = chosen else {
            return Ok(None);
        };

        cost += transponder.cost * TRANSPONDERS_PER_LIGHTPATH;
        segments.push(SegmentPlan::Create(PlannedSegment {
            segment: subpath.segment,
            transponder: subpath.transponder,
            modulation: modulation.clone(),
            slot_head,
            regenerated: subpath.regenerated,
        }));
    }

    Ok(Some(RoutePlan { route_index, segments, cost }))
}
