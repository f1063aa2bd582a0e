//! Scenario loader.
//!
//! A scenario describes the terrain, scenery and rides of a park. Rides are
//! laid out piece by piece from their first station; the loader builds the
//! [`World`] and records which status each ride should be asked for once a
//! catalog and configuration are available.

use std::path::Path;

use park_core::world::{RideEntryId, TileElement, TileMap};
use park_core::{
    CatalogOracle, Direction, InspectionInterval, LayoutBuilder, RideId, RideMode, RideStatus,
    RideType, TileCoordsXY, TileCoordsXYZ, TileCoordsXYZD, TrackElemType, World,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

fn default_surface_height() -> u8 {
    2
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSpec {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_surface_height")]
    pub surface_height: u8,
    /// `(x, y, level)` for every flooded tile.
    #[serde(default)]
    pub water: Vec<(i32, i32, u8)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneryPlacement {
    pub x: i32,
    pub y: i32,
    pub z: u8,
    pub height: u8,
    #[serde(default)]
    pub large: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideSpec {
    pub name: String,
    pub ride_type: RideType,
    /// Defaults to the first mode the type supports.
    #[serde(default)]
    pub mode: Option<RideMode>,
    #[serde(default)]
    pub subtype: Option<RideEntryId>,
    /// Origin of the first piece, `(x, y, z)` in tiles and element levels.
    pub start: (i32, i32, i32),
    #[serde(default)]
    pub direction: Direction,
    pub pieces: Vec<TrackElemType>,
    /// Indices into `pieces` that carry a chain lift.
    #[serde(default)]
    pub chain_lift: Vec<usize>,
    #[serde(default = "yes")]
    pub entrance: bool,
    #[serde(default = "yes")]
    pub exit: bool,
    #[serde(default)]
    pub lift_hill_speed: Option<u8>,
    #[serde(default)]
    pub trains: Option<u8>,
    #[serde(default)]
    pub cars_per_train: Option<u8>,
    #[serde(default)]
    pub inspection_interval: Option<InspectionInterval>,
    #[serde(default)]
    pub built_month: u32,
    /// Status requested after loading.
    #[serde(default)]
    pub status: Option<RideStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    pub map: MapSpec,
    #[serde(default)]
    pub scenery: Vec<SceneryPlacement>,
    #[serde(default)]
    pub rides: Vec<RideSpec>,
}

/// A ride created by a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRide {
    pub name: String,
    pub id: RideId,
    pub requested_status: Option<RideStatus>,
}

/// A loaded scenario, ready to simulate.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub world: World,
    pub rides: Vec<ScenarioRide>,
}

impl Scenario {
    pub fn ride(&self, name: &str) -> Option<RideId> {
        self.rides
            .iter()
            .find(|ride| ride.name == name)
            .map(|ride| ride.id)
    }
}

impl ScenarioSpec {
    /// Builds the world. `catalog` supplies default operating modes.
    pub fn build(&self, catalog: &dyn CatalogOracle) -> LoadResult<Scenario> {
        let mut map = TileMap::flat(self.map.width, self.map.height, self.map.surface_height);
        for &(x, y, level) in &self.map.water {
            map.set_water_height(TileCoordsXY::new(x, y), level);
        }
        for scenery in &self.scenery {
            let top = scenery.z.saturating_add(scenery.height);
            let element = if scenery.large {
                TileElement::large_scenery(scenery.z, top)
            } else {
                TileElement::small_scenery(scenery.z, top)
            };
            if !map.push(TileCoordsXY::new(scenery.x, scenery.y), element) {
                anyhow::bail!("scenery at ({}, {}) is off the map", scenery.x, scenery.y);
            }
        }

        let mut world = World::new(map, self.seed);
        let mut rides = Vec::with_capacity(self.rides.len());
        for spec in &self.rides {
            let id = build_ride(&mut world, catalog, spec)
                .map_err(|e| anyhow::anyhow!("ride '{}': {}", spec.name, e))?;
            rides.push(ScenarioRide {
                name: spec.name.clone(),
                id,
                requested_status: spec.status,
            });
        }
        tracing::debug!("scenario '{}' built with {} rides", self.name, rides.len());
        Ok(Scenario {
            name: self.name.clone(),
            world,
            rides,
        })
    }
}

fn build_ride(
    world: &mut World,
    catalog: &dyn CatalogOracle,
    spec: &RideSpec,
) -> LoadResult<RideId> {
    let descriptor = catalog
        .descriptor(spec.ride_type)
        .ok_or_else(|| anyhow::anyhow!("no descriptor for ride type {}", spec.ride_type))?;
    if let Some(subtype) = spec.subtype {
        if catalog.entry(subtype).is_none() {
            anyhow::bail!("no vehicle entry {}", subtype);
        }
    }
    let id = world
        .rides
        .create(spec.ride_type)
        .ok_or_else(|| anyhow::anyhow!("ride limit reached"))?;

    let (x, y, z) = spec.start;
    let mut builder = LayoutBuilder::new(id, TileCoordsXYZ::new(x, y, z), spec.direction);
    for (index, piece) in spec.pieces.iter().enumerate() {
        builder = builder.chain(spec.chain_lift.contains(&index)).piece(*piece);
    }
    let layout = builder.place(&mut world.map)?;

    let ride = world
        .rides
        .get_mut(id)
        .ok_or_else(|| anyhow::anyhow!("ride {} vanished", id))?;
    ride.subtype = spec.subtype;
    ride.mode = spec.mode.unwrap_or_else(|| descriptor.default_mode());
    ride.built_month = spec.built_month;
    if let Some(speed) = spec.lift_hill_speed {
        ride.lift_hill_speed = speed;
    }
    if let Some(trains) = spec.trains {
        ride.proposed_num_trains = trains;
    }
    if let Some(cars) = spec.cars_per_train {
        ride.proposed_num_cars_per_train = cars;
    }
    if let Some(interval) = spec.inspection_interval {
        ride.reliability.inspection_interval = interval;
    }

    for placed in &layout.stations {
        ride.register_station(placed);
        let start = placed.start;
        let side = |direction: Direction| {
            let tile = start.xy().step(direction);
            TileCoordsXYZD::new(tile.x, tile.y, start.z, direction.reverse())
        };
        let Some(station) = ride.station_mut(placed.index) else {
            continue;
        };
        if spec.entrance {
            station.entrance = Some(side(placed.direction.rotate_cw()));
        }
        if spec.exit {
            station.exit = Some(side(placed.direction.rotate_ccw()));
        }
    }
    Ok(id)
}

/// Loader for [`ScenarioSpec`] from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load_spec(path: &Path) -> LoadResult<ScenarioSpec> {
        let content = read_file(path)?;
        ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON {}: {}", path.display(), e))
    }

    pub fn load(path: &Path, catalog: &dyn CatalogOracle) -> LoadResult<Scenario> {
        Self::load_spec(path)?
            .build(catalog)
            .map_err(|e| anyhow::anyhow!("Failed to build scenario {}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use park_core::RideCatalog;
    use park_core::world::TileElementKind;
    use std::io::Write;

    const OVAL: &str = r#"(
        name: "oval",
        seed: 7,
        map: (width: 32, height: 32, water: [(1, 1, 4)]),
        scenery: [(x: 10, y: 10, z: 2, height: 6)],
        rides: [
            (
                name: "Looper",
                ride_type: looping_coaster,
                start: (3, 12, 2),
                direction: east,
                pieces: [
                    begin_station, end_station, right_quarter_turn3, right_quarter_turn3,
                    flat, flat, right_quarter_turn3, right_quarter_turn3,
                ],
                inspection_interval: Some(every_hour),
                status: Some(open),
            ),
        ],
    )"#;

    fn write(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn oval_scenario_builds_a_complete_ride() {
        let catalog = RideCatalog::builtin();
        let file = write(OVAL);
        let scenario = ScenarioLoader::load(file.path(), &catalog).expect("loads");

        assert_eq!(scenario.name, "oval");
        assert_eq!(scenario.world.seed, 7);
        let id = scenario.ride("Looper").expect("ride named");
        assert_eq!(scenario.rides[0].requested_status, Some(RideStatus::Open));

        let ride = scenario.world.rides.get(id).expect("ride built");
        assert_eq!(ride.mode, RideMode::ContinuousCircuit);
        assert_eq!(ride.reliability.inspection_interval, InspectionInterval::EveryHour);
        let (_, station) = ride.first_station().expect("station registered");
        assert!(station.entrance.is_some());
        assert!(station.exit.is_some());
        assert_ne!(station.entrance, station.exit);
    }

    #[test]
    fn scenery_and_water_are_placed() {
        let catalog = RideCatalog::builtin();
        let scenario = ScenarioLoader::load(write(OVAL).path(), &catalog).expect("loads");
        let map = &scenario.world.map;
        assert!(map
            .elements_at(TileCoordsXY::new(10, 10))
            .iter()
            .any(|element| element.kind == TileElementKind::SmallScenery));
        assert!(map
            .surface_at(TileCoordsXY::new(1, 1))
            .is_some_and(|surface| surface.kind == TileElementKind::Surface { water_height: 4 }));
    }

    #[test]
    fn unknown_ride_type_in_catalog_is_an_error() {
        let catalog = RideCatalog::new();
        let error = ScenarioLoader::load(write(OVAL).path(), &catalog).expect_err("no descriptor");
        assert!(error.to_string().contains("Looper"));
    }

    #[test]
    fn track_leaving_the_map_is_rejected() {
        let mut spec = ScenarioLoader::load_spec(write(OVAL).path()).expect("parses");
        spec.rides[0].start = (30, 12, 2);
        let error = spec.build(&RideCatalog::builtin()).expect_err("off the map");
        assert!(error.to_string().contains("leaves the map"));
    }
}
