//! IP-over-WDM planner
//!
//! Routing, spectrum and modulation assignment (RSMA) for IP demands over an
//! elastic optical network, with region-aware transponder selection,
//! regenerator placement and reuse of provisioned lightpaths.

pub mod config;
pub mod controller;
pub mod debugger;
pub mod demand;
pub mod error;
pub mod network;
pub mod np_core;
pub mod topology;
pub mod transponder;
pub mod utils;

pub use error::{Error, Result};
pub use np_core::{ Edge, Node, Region, Segment, SD };
