use std::fmt::Display;

use fxhash::FxHashMap;

use crate::{
    error::{Error, Result},
    np_core::Segment,
    transponder::{Modulation, TransponderCatalog, TransponderID},
    SD,
};

use super::{usage::UsageLedger, Network};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightpathID(usize);

impl LightpathID {
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for LightpathID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LP{}", self.0)
    }
}

/// A segment the scheduler decided to serve with a new lightpath.
#[derive(Debug, Clone)]
pub struct PlannedSegment {
    pub segment: Segment,
    pub transponder: TransponderID,
    pub modulation: Modulation,
    /// First-fit result at evaluation time
    pub slot_head: usize,
    /// The segment starts at a regeneration point of a reach split
    pub regenerated: bool,
}

/// A provisioned optical channel, i.e. one IP link.
#[derive(Debug, Clone)]
pub struct Lightpath {
    pub id: LightpathID,
    pub sd: SD,
    pub segment: Segment,
    pub transponder: TransponderID,
    pub modulation: Modulation,
    pub slot_head: usize,
    pub slot_width: usize,
    /// Gbps still available to further demands
    pub spare_capacity: f64,
    pub demand_indices: Vec<usize>,
    pub regenerated: bool,
}

/// IP links keyed by ordered endpoint pair, with their lightpaths in creation order.
#[derive(Debug, Clone, Default)]
pub struct IPLinkPool {
    lightpaths: Vec<Lightpath>,
    ip_links: FxHashMap<SD, Vec<LightpathID>>,
    pub usage: UsageLedger,
}

impl IPLinkPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lightpaths(&self) -> &[Lightpath] {
        &self.lightpaths
    }

    pub fn get(&self, id: LightpathID) -> Option<&Lightpath> {
        self.lightpaths.get(id.0)
    }

    pub fn lightpaths_between(&self, sd: &SD) -> &[LightpathID] {
        self.ip_links.get(sd).map_or(&[][..], |ids| ids.as_slice())
    }

    /// First lightpath between `sd` able to carry `traffic` more Gbps.
    pub fn find_reusable(&self, sd: &SD, traffic: f64) -> Option<LightpathID> {
        self.lightpaths_between(sd)
            .iter()
            .copied()
            .find(|id| self.lightpaths[id.0].spare_capacity >= traffic)
    }

    /// Attaches the demand to the first lightpath between `sd` that can carry it.
    pub fn try_reuse(&mut self, sd: &SD, traffic: f64, demand_index: usize) -> Option<LightpathID> {
        let id = self.find_reusable(sd, traffic)?;
        let lightpath = &mut self.lightpaths[id.0];
        lightpath.spare_capacity -= traffic;
        lightpath.demand_indices.push(demand_index);
        Some(id)
    }

    /// Reuses the lightpath chosen at evaluation time.
    pub fn attach(&mut self, id: LightpathID, traffic: f64, demand_index: usize) -> Result<()> {
        let lightpath = match self.lightpaths.get_mut(id.0) {
            Some(lp) if lp.spare_capacity >= traffic => lp,
            _ => return Err(Error::StaleReuse(id.0)),
        };

        lightpath.spare_capacity -= traffic;
        lightpath.demand_indices.push(demand_index);
        Ok(())
    }

    /// Provisions one lightpath per planned segment for the demand.
    ///
    /// Spectrum is searched for every segment before anything is written, so
    /// either all lightpaths are created or the network is left untouched
    /// (`Ok(None)`).
    pub fn create_new(
        &mut self,
        network: &mut Network,
        planned: &[&PlannedSegment],
        catalog: &TransponderCatalog,
        demand_index: usize,
        traffic: f64,
    ) -> Result<Option<Vec<LightpathID>>> {
        let mut slot_heads = Vec::with_capacity(planned.len());
        for p in planned {
            match network.first_fit_assign(&p.segment, p.modulation.channel_spacing)? {
                Some(slot) => slot_heads.push(slot),
                None => return Ok(None),
            }
        }

        let mut created = Vec::with_capacity(planned.len());
        for (p, slot_head) in planned.iter().zip(slot_heads) {
            let id = LightpathID(self.lightpaths.len());
            network.allocate(&p.segment, slot_head, p.modulation.channel_spacing, id)?;

            let sd = p.segment.sd();
            self.lightpaths.push(Lightpath {
                id,
                sd,
                segment: p.segment.clone(),
                transponder: p.transponder,
                modulation: p.modulation.clone(),
                slot_head,
                slot_width: p.modulation.channel_spacing,
                spare_capacity: p.modulation.data_rate - traffic,
                demand_indices: vec![demand_index],
                regenerated: p.regenerated,
            });
            self.ip_links.entry(sd).or_default().push(id);
            self.usage.record_lightpath(&p.segment, p.transponder, catalog.get(p.transponder), p.regenerated);

            created.push(id);
        }

        Ok(Some(created))
    }
}
