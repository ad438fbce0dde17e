use fxhash::FxHashSet;

use crate::{
    error::{Error, Result},
    np_core::{Region, StateMatrix},
    topology::FiberLink,
    Edge,
};

use super::LightpathID;

#[derive(Debug, Clone)]
pub struct Fiber {
    pub edge: Edge,
    pub length_km: f64,
    pub regions: Vec<Region>,
    pub state_matrix: StateMatrix,
    pub assigned_lightpath_ids: FxHashSet<LightpathID>,
    pub occupancy: usize,
    pub residual: usize,
}

impl Fiber {
    pub fn new(link: &FiberLink, slots: usize) -> Fiber {
        Fiber {
            edge: link.edge,
            length_km: link.length_km,
            regions: link.regions.clone(),
            state_matrix: StateMatrix::new(slots),
            assigned_lightpath_ids: FxHashSet::default(),
            occupancy: 0,
            residual: slots,
        }
    }

    /// 使用中スロット数
    pub fn count_used_slots(&self) -> usize {
        self.occupancy
    }

    /// 総スロット数（使用中 + 空き）
    pub fn total_slots(&self) -> usize {
        self.occupancy + self.residual
    }

    /// First occupied slot in `[slot, slot + width)`, or the first slot past the grid.
    pub fn find_clash(&self, slot: usize, width: usize) -> Option<usize> {
        (slot..slot + width).find(|&s| s >= self.state_matrix.slot_count() || self.state_matrix[s])
    }

    pub fn assign(&mut self, slot: usize, width: usize, lightpath_id: LightpathID) -> Result<()> {
        if let Some(clash) = self.find_clash(slot, width) {
            return Err(Error::SlotClash { edge: self.edge, slot: clash });
        }

        for s in &mut self.state_matrix[slot..slot + width] {
            *s = true;
        }
        self.assigned_lightpath_ids.insert(lightpath_id);
        self.occupancy += width;
        self.residual -= width;

        Ok(())
    }
}
