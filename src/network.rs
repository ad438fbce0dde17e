use std::fmt::Display;

use fxhash::FxHashMap;

use crate::{
    config::Config,
    error::{Error, Result},
    np_core::{Segment, StateMatrix},
    topology::Topology,
    Edge,
};

mod fiber;
pub mod ip_link;
pub mod regenerator;
pub mod usage;

pub use fiber::Fiber;
pub use ip_link::{IPLinkPool, Lightpath, LightpathID, PlannedSegment};
pub use regenerator::compute_regenerator_positions;
pub use usage::UsageLedger;

/// Spectrum state of every fiber in the run. Owns the occupancy exclusively.
#[derive(Debug, Clone)]
pub struct Network {
    fibers: FxHashMap<Edge, Fiber>,
    /// Directed links, in topology order
    pub edges: Vec<Edge>,
    slots: usize,
}

impl Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for edge in &self.edges {
            if let Some(fiber) = self.fibers.get(edge) {
                writeln!(f, "{} | {} {:3}/{:3}", edge, fiber.state_matrix, fiber.count_used_slots(), fiber.total_slots())?;
            }
        }
        Ok(())
    }
}

impl Network {
    pub fn new(topology: &Topology, slots: usize) -> Self {
        let fibers = topology
            .links
            .iter()
            .map(|link| (link.edge, Fiber::new(link, slots)))
            .collect();

        Network {
            fibers,
            edges: topology.links.iter().map(|link| link.edge).collect(),
            slots,
        }
    }

    pub fn from_config(config: &Config, topology: &Topology) -> Result<Self> {
        if config.network.slots_per_fiber == 0 {
            return Err(Error::InvalidConfig("`slots_per_fiber` must be positive".to_string()));
        }
        Ok(Self::new(topology, config.network.slots_per_fiber))
    }

    pub fn get_fiber(&self, edge: &Edge) -> Result<&Fiber> {
        self.fibers.get(edge).ok_or(Error::UnknownLink(*edge))
    }

    /// Fibers in topology order.
    pub fn fibers(&self) -> impl Iterator<Item = &Fiber> {
        self.edges.iter().filter_map(|edge| self.fibers.get(edge))
    }

    /// Union of the occupancy of every fiber on the segment.
    fn segment_state_matrix(&self, segment: &Segment) -> Result<StateMatrix> {
        let mut target_state_matrix = StateMatrix::new(self.slots);
        for edge in &segment.edges {
            target_state_matrix |= &self.get_fiber(edge)?.state_matrix;
        }
        Ok(target_state_matrix)
    }

    /// Lowest slot `s` such that `[s, s + width)` is free on every fiber of the segment.
    pub fn first_fit_assign(&self, segment: &Segment, width: usize) -> Result<Option<usize>> {
        Ok(self.segment_state_matrix(segment)?.get_empty_contiguous_slots(width))
    }

    /// Marks `[slot, slot + width)` on every fiber of the segment as used by `owner`.
    ///
    /// Nothing is written if any cell is already occupied.
    pub fn allocate(&mut self, segment: &Segment, slot: usize, width: usize, owner: LightpathID) -> Result<()> {
        for edge in &segment.edges {
            if let Some(clash) = self.get_fiber(edge)?.find_clash(slot, width) {
                return Err(Error::SlotClash { edge: *edge, slot: clash });
            }
        }

        for edge in &segment.edges {
            if let Some(fiber) = self.fibers.get_mut(edge) {
                fiber.assign(slot, width, owner)?;
            }
        }

        Ok(())
    }

    /// Rebuilds the occupancy from the committed lightpaths and compares it with the allocator's.
    /// Every fiber must also record exactly the lightpaths crossing it.
    pub fn check_allocation_clashing(&self, pool: &IPLinkPool) -> Result<()> {
        let mut rebuilt: FxHashMap<Edge, StateMatrix> = self
            .edges
            .iter()
            .map(|edge| (*edge, StateMatrix::new(self.slots)))
            .collect();

        let mut crossings: FxHashMap<Edge, usize> = FxHashMap::default();
        for lightpath in pool.lightpaths() {
            for edge in &lightpath.segment.edges {
                if !self.get_fiber(edge)?.assigned_lightpath_ids.contains(&lightpath.id) {
                    return Err(Error::OwnerMismatch { edge: *edge, lightpath: lightpath.id.index() });
                }
                *crossings.entry(*edge).or_insert(0) += 1;

                let state_matrix = rebuilt.get_mut(edge).ok_or(Error::UnknownLink(*edge))?;
                for slot in lightpath.slot_head..lightpath.slot_head + lightpath.slot_width {
                    if slot >= state_matrix.slot_count() || state_matrix[slot] {
                        return Err(Error::SlotClash { edge: *edge, slot });
                    }
                    state_matrix[slot] = true;
                }
            }
        }

        for fiber in self.fibers() {
            if let Some(state_matrix) = rebuilt.get(&fiber.edge) {
                if let Some(slot) = (0..self.slots).find(|&s| state_matrix[s] != fiber.state_matrix[s]) {
                    return Err(Error::SlotClash { edge: fiber.edge, slot });
                }
            }

            let crossing = crossings.get(&fiber.edge).copied().unwrap_or(0);
            if crossing != fiber.assigned_lightpath_ids.len() {
                let stray = fiber.assigned_lightpath_ids.iter().map(|id| id.index()).max().unwrap_or(0);
                return Err(Error::OwnerMismatch { edge: fiber.edge, lightpath: stray });
            }
        }

        Ok(())
    }

    /// One row per fiber, 1 for used slots.
    pub fn occupancy_rows(&self) -> Vec<Vec<u8>> {
        self.fibers()
            .map(|fiber| fiber.state_matrix.iter().map(|&s| s as u8).collect())
            .collect()
    }
}
