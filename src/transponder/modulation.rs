use std::{cmp::Ordering, fmt::Display};

use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};

use super::Transponder;

/// One operating mode of a transponder type.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Modulation {
    pub format: String,
    /// Gbps
    pub data_rate: f64,
    /// Number of frequency slots consumed on every traversed fiber
    pub channel_spacing: usize,
    pub reach_km: f64,
}

impl Modulation {
    pub fn new(format: &str, data_rate: f64, channel_spacing: usize, reach_km: f64) -> Self {
        Self {
            format: format.to_string(),
            data_rate,
            channel_spacing,
            reach_km,
        }
    }

    /// Gbps per frequency slot.
    pub fn spectral_efficiency(&self) -> f64 {
        self.data_rate / self.channel_spacing as f64
    }

    pub fn reaches(&self, length_km: f64) -> bool {
        self.reach_km >= length_km
    }
}

impl Display for Modulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}G/{}slots/{}km", self.format, self.data_rate, self.channel_spacing, self.reach_km)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, StrumDisplay, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModulationObjective {
    HighestSpectralEfficiency,
    LowestSpectrumOccupancy,
}

impl ModulationObjective {
    /// `Less` when `a` is the better choice under this objective.
    fn compare(&self, a: &Modulation, b: &Modulation) -> Ordering {
        match self {
            ModulationObjective::HighestSpectralEfficiency => b.spectral_efficiency().total_cmp(&a.spectral_efficiency()),
            ModulationObjective::LowestSpectrumOccupancy => a
                .channel_spacing
                .cmp(&b.channel_spacing)
                .then_with(|| b.data_rate.total_cmp(&a.data_rate)),
        }
    }
}

/// Every modulation of `transponder` reaching `length_km`, best first under `objective`.
/// Ties keep catalog order.
pub fn ranked_modulations(length_km: f64, transponder: &Transponder, objective: ModulationObjective) -> Vec<&Modulation> {
    let mut ranked: Vec<&Modulation> = transponder.modulations.iter().filter(|m| m.reaches(length_km)).collect();
    ranked.sort_by(|a, b| objective.compare(a, b));
    ranked
}

/// Picks the modulation of `transponder` used for a segment of `length_km`.
/// `None` when no modulation reaches that far.
pub fn select_modulation(length_km: f64, transponder: &Transponder, objective: ModulationObjective) -> Option<&Modulation> {
    ranked_modulations(length_km, transponder, objective).into_iter().next()
}

#[cfg(test)]
mod tests {
    use crate::{np_core::Region, transponder::TransponderCatalog};

    use super::*;

    #[test]
    fn highest_efficiency_prefers_dense_formats_within_reach() {
        let catalog = TransponderCatalog::default_catalog();
        let long_reach = catalog.transponder_for(Region::Core);

        // 800G PCS64QAM over 100 slots reaches 150km
        let m = select_modulation(120.0, long_reach, ModulationObjective::HighestSpectralEfficiency).unwrap();
        assert_eq!(m.data_rate, 800.0);

        let m = select_modulation(2000.0, long_reach, ModulationObjective::HighestSpectralEfficiency).unwrap();
        assert_eq!(m.data_rate, 400.0);
        assert_eq!(m.reach_km, 2500.0);

        assert!(select_modulation(4800.0, long_reach, ModulationObjective::HighestSpectralEfficiency).is_none());
    }

    #[test]
    fn lowest_occupancy_prefers_narrow_channels_then_rate() {
        let catalog = TransponderCatalog::default_catalog();
        let long_reach = catalog.transponder_for(Region::Core);

        let m = select_modulation(80.0, long_reach, ModulationObjective::LowestSpectrumOccupancy).unwrap();
        assert_eq!(m.channel_spacing, 50);
        assert_eq!(m.data_rate, 300.0);

        let m = select_modulation(1000.0, long_reach, ModulationObjective::LowestSpectrumOccupancy).unwrap();
        assert_eq!(m.channel_spacing, 50);
        assert_eq!(m.data_rate, 100.0);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let transponder = Transponder::new(
            "T",
            1.0,
            Region::Metro,
            vec![
                Modulation::new("A", 200.0, 2, 500.0),
                Modulation::new("B", 200.0, 2, 500.0),
            ],
        );

        for objective in [ModulationObjective::HighestSpectralEfficiency, ModulationObjective::LowestSpectrumOccupancy] {
            for _ in 0..3 {
                assert_eq!(select_modulation(100.0, &transponder, objective).unwrap().format, "A");
            }
        }
    }

    #[test]
    fn objective_is_parsed_from_snake_case() {
        assert_eq!(
            "lowest_spectrum_occupancy".parse::<ModulationObjective>().unwrap(),
            ModulationObjective::LowestSpectrumOccupancy
        );
    }

    #[test]
    fn ranking_lists_every_reaching_format() {
        let catalog = TransponderCatalog::default_catalog();
        let long_reach = catalog.transponder_for(Region::Core);

        let ranked = ranked_modulations(1000.0, long_reach, ModulationObjective::LowestSpectrumOccupancy);
        assert!(ranked.iter().all(|m| m.reach_km >= 1000.0));
        assert_eq!(ranked[0].data_rate, 100.0);
        assert!(ranked.iter().any(|m| m.data_rate >= 200.0));
        for pair in ranked.windows(2) {
            assert!(pair[0].channel_spacing <= pair[1].channel_spacing);
        }

        assert!(ranked_modulations(4800.0, long_reach, ModulationObjective::HighestSpectralEfficiency).is_empty());
    }
}
