use std::fmt::Display;

use serde_derive::{Deserialize, Serialize};

use crate::{config::Config, error::{Error, Result}, np_core::Region};

pub mod modulation;

pub use modulation::{ranked_modulations, select_modulation, Modulation, ModulationObjective};

/// Entry of `[[transponders]]` in the configuration file.
pub type TransponderConfig = Transponder;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Transponder {
    pub name: String,
    pub cost: f64,
    /// Region whose segments this type serves
    pub region: Region,
    pub modulations: Vec<Modulation>,
}

impl Transponder {
    pub fn new(name: &str, cost: f64, region: Region, modulations: Vec<Modulation>) -> Self {
        Self {
            name: name.to_string(),
            cost,
            region,
            modulations,
        }
    }

    /// Longest reach over every modulation.
    pub fn max_reach(&self) -> f64 {
        self.modulations.iter().map(|m| m.reach_km).fold(0.0, f64::max)
    }

    fn validate(&self) -> Result<()> {
        if self.modulations.is_empty() {
            return Err(Error::InvalidCatalog(format!("`{}` has no modulation", self.name)));
        }
        if self.cost < 0.0 {
            return Err(Error::InvalidCatalog(format!("`{}` has a negative cost", self.name)));
        }
        for modulation in &self.modulations {
            if modulation.channel_spacing == 0 {
                return Err(Error::InvalidCatalog(format!("`{}` {}: channel spacing must be at least one slot", self.name, modulation.format)));
            }
            if modulation.reach_km <= 0.0 || modulation.data_rate <= 0.0 {
                return Err(Error::InvalidCatalog(format!("`{}` {}: reach and data rate must be positive", self.name, modulation.format)));
            }
        }
        Ok(())
    }
}

impl Display for Transponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, cost {})", self.name, self.region, self.cost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransponderID(usize);

impl TransponderID {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Transponder types available to the planner and the region each one serves.
#[derive(Debug, Clone)]
pub struct TransponderCatalog {
    transponders: Vec<Transponder>,
    core: TransponderID,
    metro: TransponderID,
}

impl TransponderCatalog {
    /// Validates `transponders` and maps every region to the type declared for it.
    pub fn new(transponders: Vec<Transponder>) -> Result<Self> {
        let mut core = None;
        let mut metro = None;

        for (index, transponder) in transponders.iter().enumerate() {
            transponder.validate()?;
            if transponders[..index].iter().any(|t| t.name == transponder.name) {
                return Err(Error::InvalidCatalog(format!("`{}` is declared twice", transponder.name)));
            }

            let slot = match transponder.region {
                Region::Core => &mut core,
                Region::Metro => &mut metro,
            };
            if slot.is_some() {
                return Err(Error::InvalidCatalog(format!("{} is served by more than one type", transponder.region)));
            }
            *slot = Some(TransponderID(index));
        }

        match (core, metro) {
            (Some(core), Some(metro)) => Ok(Self { transponders, core, metro }),
            (None, _) => Err(Error::InvalidCatalog("no transponder type serves CORE".to_string())),
            (_, None) => Err(Error::InvalidCatalog("no transponder type serves METRO".to_string())),
        }
    }

    /// ZR+ OEO for METRO segments, Long Reach OEO for CORE segments.
    pub fn default_catalog() -> Self {
        let zr_plus = Transponder::new(
            "ZR+ OEO",
            0.5,
            Region::Metro,
            vec![
                Modulation::new("16QAM", 400.0, 75, 600.0),
                Modulation::new("8QAM", 300.0, 75, 1800.0),
                Modulation::new("QPSK", 200.0, 75, 3000.0),
                Modulation::new("QPSK", 100.0, 75, 3000.0),
            ],
        );
        let long_reach = Transponder::new(
            "Long Reach OEO",
            1.0,
            Region::Core,
            vec![
                Modulation::new("PCS64QAM", 800.0, 100, 150.0),
                Modulation::new("PCS64QAM", 700.0, 100, 400.0),
                Modulation::new("16QAM", 600.0, 100, 700.0),
                Modulation::new("PCS16QAM", 500.0, 100, 1300.0),
                Modulation::new("PCS16QAM", 400.0, 100, 2500.0),
                Modulation::new("PCS16QAM", 300.0, 100, 4700.0),
                Modulation::new("64QAM", 300.0, 50, 100.0),
                Modulation::new("16QAM", 200.0, 50, 900.0),
                Modulation::new("QPSK", 100.0, 50, 3000.0),
            ],
        );

        Self {
            transponders: vec![zr_plus, long_reach],
            core: TransponderID(1),
            metro: TransponderID(0),
        }
    }

    /// Catalog of a run: `[[transponders]]` when given, the default otherwise,
    /// narrowed to one type in single-transponder mode.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = if config.transponders.is_empty() {
            Self::default_catalog()
        } else if config.policy.single_transponder_mode_enabled {
            // one type may be listed without a region partner
            for transponder in &config.transponders {
                transponder.validate()?;
            }
            Self {
                transponders: config.transponders.clone(),
                core: TransponderID(0),
                metro: TransponderID(0),
            }
        } else {
            Self::new(config.transponders.clone())?
        };

        if config.policy.single_transponder_mode_enabled {
            catalog.with_single_transponder(&config.policy.single_transponder_type)
        } else {
            Ok(catalog)
        }
    }

    /// Serves every region with the type called `name`.
    pub fn with_single_transponder(mut self, name: &str) -> Result<Self> {
        let id = self.find(name).ok_or_else(|| Error::UnknownTransponder(name.to_string()))?;
        self.core = id;
        self.metro = id;
        Ok(self)
    }

    pub fn find(&self, name: &str) -> Option<TransponderID> {
        self.transponders.iter().position(|t| t.name == name).map(TransponderID)
    }

    pub fn id_for(&self, region: Region) -> TransponderID {
        match region {
            Region::Core => self.core,
            Region::Metro => self.metro,
        }
    }

    pub fn transponder_for(&self, region: Region) -> &Transponder {
        self.get(self.id_for(region))
    }

    pub fn get(&self, id: TransponderID) -> &Transponder {
        &self.transponders[id.0]
    }
}
