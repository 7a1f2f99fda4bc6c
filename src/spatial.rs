//! H3 bucketing of stops.

use std::collections::BTreeMap;

use h3o::{CellIndex, LatLng, Resolution};

use crate::error::{Error, Result};
use crate::model::Stop;

pub const DEFAULT_RESOLUTION: Resolution = Resolution::Nine;

pub struct SpatialIndexer {
    resolution: Resolution,
}

impl Default for SpatialIndexer {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl SpatialIndexer {
    pub fn new(resolution: u8) -> Result<Self> {
        let resolution = Resolution::try_from(resolution)
            .map_err(|_| Error::invalid_input(format!("invalid H3 resolution {}", resolution)))?;
        Ok(Self { resolution })
    }

    pub fn cell_of(&self, stop: &Stop) -> Result<CellIndex> {
        let ll = LatLng::new(stop.lat, stop.lon).map_err(|_| {
            Error::invalid_input(format!(
                "stop {} has invalid coordinates ({}, {})",
                stop.id, stop.lat, stop.lon
            ))
        })?;
        Ok(ll.to_cell(self.resolution))
    }

    /// Buckets stops by cell. Buckets come back in cell-index order and keep
    /// the input order of their stops; each stop records its cell.
    pub fn bucket(&self, stops: Vec<Stop>) -> Result<BTreeMap<CellIndex, Vec<Stop>>> {
        let mut map: BTreeMap<CellIndex, Vec<Stop>> = BTreeMap::new();
        for mut stop in stops {
            let cell = self.cell_of(&stop)?;
            stop.cell = Some(cell.to_string());
            map.entry(cell).or_default().push(stop);
        }
        Ok(map)
    }
}
