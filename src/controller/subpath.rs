use crate::{
    error::{Error, Result},
    network::{compute_regenerator_positions, regenerator::count_regenerators},
    np_core::{Region, Segment},
    topology::{RouteCandidate, Topology},
    transponder::{Transponder, TransponderCatalog, TransponderID},
};

/// A post-split piece of a route together with the transponder type serving it.
#[derive(Debug, Clone)]
pub struct SubPath {
    pub segment: Segment,
    pub transponder: TransponderID,
    /// The piece starts where a reach split placed a regenerator
    pub regenerated: bool,
}

/// Cuts `route` into maximal runs of links sharing a region.
///
/// The running intersection of region tags decides where a run ends; a run is
/// labelled with the highest-precedence region left in its intersection.
pub fn split_by_region(topology: &Topology, route: &RouteCandidate) -> Result<Vec<Segment>> {
    let mut segments = vec![];
    let mut edges = vec![];
    let mut lengths = vec![];
    let mut current: Vec<Region> = vec![];

    for (edge, &length_km) in route.edge_route.iter().zip(route.lengths_km.iter()) {
        let link = topology.link(edge)?;

        if edges.is_empty() {
            current = link.regions.clone();
        } else {
            let intersection: Vec<Region> = current.iter().copied().filter(|r| link.regions.contains(r)).collect();
            if intersection.is_empty() {
                segments.push(close_segment(&mut edges, &mut lengths, &current)?);
                current = link.regions.clone();
            } else {
                current = intersection;
            }
        }

        edges.push(*edge);
        lengths.push(length_km);
    }

    if !edges.is_empty() {
        segments.push(close_segment(&mut edges, &mut lengths, &current)?);
    }

    Ok(segments)
}

fn close_segment(edges: &mut Vec<crate::Edge>, lengths: &mut Vec<f64>, regions: &[Region]) -> Result<Segment> {
    let region = Region::primary(regions)
        .ok_or_else(|| Error::InvalidTopology(format!("link {} has no CORE/METRO tag", edges[0])))?;
    Ok(Segment::new(std::mem::take(edges), std::mem::take(lengths), region))
}

/// Splits a segment longer than the transponder's maximum reach at regeneration points.
///
/// Every modulation is tried; the one needing the fewest regenerators wins, a tie
/// going to the higher spectral efficiency. `None` if no modulation can place
/// regenerators, i.e. some link is longer than every reach.
pub fn split_by_reach(segment: &Segment, transponder: &Transponder) -> Option<Vec<Segment>> {
    if segment.length_km() <= transponder.max_reach() {
        return Some(vec![segment.clone()]);
    }

    let mut best: Option<(Vec<bool>, usize, f64)> = None;
    for modulation in &transponder.modulations {
        let Some(positions) = compute_regenerator_positions(segment, modulation.reach_km) else {
            continue;
        };
        let count = count_regenerators(&positions);
        let efficiency = modulation.spectral_efficiency();

        let better = match &best {
            None => true,
            Some((_, best_count, best_efficiency)) => {
                count < *best_count || (count == *best_count && efficiency > *best_efficiency)
            }
        };
        if better {
            best = Some((positions, count, efficiency));
        }
    }

    best.map(|(positions, _, _)| segment.split_at(&positions))
}

/// Region split followed by reach split. `None` when the route cannot be served.
pub fn plan_subpaths(topology: &Topology, catalog: &TransponderCatalog, route: &RouteCandidate) -> Result<Option<Vec<SubPath>>> {
    let mut subpaths = vec![];

    for segment in split_by_region(topology, route)? {
        let transponder = catalog.id_for(segment.region);
        let Some(pieces) = split_by_reach(&segment, catalog.get(transponder)) else {
            return Ok(None);
        };

        for (index, piece) in pieces.into_iter().enumerate() {
            subpaths.push(SubPath {
                segment: piece,
                transponder,
                regenerated: index > 0,
            });
        }
    }

    Ok(Some(subpaths))
}

#[cfg(test)]
mod tests {
    use crate::{
        topology::{FiberLink, NodeInfo},
        transponder::Modulation,
        Edge,
    };

    use super::*;

    fn chain(regions: &[&[Region]], lengths: &[f64]) -> (Topology, RouteCandidate) {
        let n = regions.len() + 1;
        let nodes = (0..n).map(|i| NodeInfo::new(i, "", &[])).collect();
        let links: Vec<FiberLink> = regions
            .iter()
            .zip(lengths)
            .enumerate()
            .map(|(i, (r, l))| FiberLink { edge: Edge::new(i, i + 1), length_km: *l, regions: r.to_vec() })
            .collect();
        let route = RouteCandidate::new(
            (0..n).collect(),
            links.iter().map(|l| l.edge).collect(),
            lengths.to_vec(),
        );
        (Topology::from_parts("chain", nodes, links).unwrap(), route)
    }

    #[test]
    fn region_change_starts_a_new_segment() {
        use Region::*;
        let (topology, route) = chain(
            &[&[Metro], &[Core, Metro], &[Core], &[Core], &[Metro]],
            &[10.0, 20.0, 30.0, 40.0, 50.0],
        );
        let segments = split_by_region(&topology, &route).unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[0].region, Metro);
        assert_eq!(segments[1].length_km(), 70.0);
        assert_eq!(segments[1].region, Core);
        assert_eq!(segments[2].region, Metro);
    }

    #[test]
    fn mixed_tags_alone_resolve_to_core() {
        let (topology, route) = chain(&[&[Region::Core, Region::Metro]], &[10.0]);
        let segments = split_by_region(&topology, &route).unwrap();
        assert_eq!(segments[0].region, Region::Core);
    }

    #[test]
    fn reach_split_minimises_regenerators() {
        let transponder = Transponder::new(
            "T",
            1.0,
            Region::Core,
            vec![
                Modulation::new("dense", 400.0, 4, 500.0),
                Modulation::new("robust", 100.0, 4, 1000.0),
            ],
        );
        let segment = Segment::new(
            (0..4).map(|i| Edge::new(i, i + 1)).collect(),
            vec![400.0, 400.0, 400.0, 400.0],
            Region::Core,
        );

        let parts = split_by_reach(&segment, &transponder).unwrap();
        assert_eq!(parts.len(), 2);
        for part in &parts {
            assert!(part.length_km() <= 1000.0);
        }
    }

    #[test]
    fn short_segment_is_not_split_and_overlong_link_fails() {
        let catalog = TransponderCatalog::default_catalog();
        let long_reach = catalog.transponder_for(Region::Core);

        let short = Segment::new(vec![Edge::new(0, 1)], vec![4000.0], Region::Core);
        assert_eq!(split_by_reach(&short, long_reach).unwrap().len(), 1);

        let overlong = Segment::new(vec![Edge::new(0, 1), Edge::new(1, 2)], vec![100.0, 4800.0], Region::Core);
        assert!(split_by_reach(&overlong, long_reach).is_none());
    }

    #[test]
    fn subpaths_mark_regeneration_points() {
        let (topology, route) = chain(&[&[Region::Core], &[Region::Core]], &[3000.0, 3000.0]);
        let catalog = TransponderCatalog::default_catalog();
        let subpaths = plan_subpaths(&topology, &catalog, &route).unwrap().unwrap();

        assert_eq!(subpaths.len(), 2);
        assert!(!subpaths[0].regenerated);
        assert!(subpaths[1].regenerated);
        assert_eq!(subpaths[1].segment.start().index(), 1);
    }
}
