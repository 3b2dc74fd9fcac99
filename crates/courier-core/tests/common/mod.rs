//! Shared fixtures for the `courier-core` integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::BTreeMap;

use courier_types::{Deadline, Job, JobId, LegendEntry, Position, Tile};
use courier_world::CityGrid;
use rust_decimal::Decimal;

/// Legend with passable streets and parks and blocked buildings.
pub fn legend() -> BTreeMap<Tile, LegendEntry> {
    let mut legend = BTreeMap::new();
    legend.insert(
        Tile::Street,
        LegendEntry {
            name: "calle".to_owned(),
            surface_weight: Some(1.0),
            blocked: false,
        },
    );
    legend.insert(
        Tile::Building,
        LegendEntry {
            name: "edificio".to_owned(),
            surface_weight: None,
            blocked: true,
        },
    );
    legend.insert(
        Tile::Park,
        LegendEntry {
            name: "parque".to_owned(),
            surface_weight: Some(0.95),
            blocked: false,
        },
    );
    legend
}

/// Build a grid from rows of tile codes, e.g. `["CCB", "CPC"]`.
pub fn grid(rows: &[&str]) -> CityGrid {
    let tiles: Vec<Vec<Tile>> = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| Tile::from_code(&c.to_string()).unwrap())
                .collect()
        })
        .collect();
    let height = u32::try_from(tiles.len()).unwrap();
    let width = u32::try_from(tiles.first().map_or(0, Vec::len)).unwrap();
    CityGrid::new(width, height, tiles, legend()).unwrap()
}

/// An all-street grid.
pub fn street_grid(width: usize, height: usize) -> CityGrid {
    let row = "C".repeat(width);
    let rows: Vec<&str> = (0..height).map(|_| row.as_str()).collect();
    grid(&rows)
}

/// A job with a TTL deadline.
pub fn job(
    id: &str,
    pickup: (i32, i32),
    dropoff: (i32, i32),
    weight: f64,
    payout: Decimal,
    release_time: f64,
) -> Job {
    Job {
        id: JobId::new(id),
        pickup: Position::from(pickup),
        dropoff: Position::from(dropoff),
        weight,
        payout,
        priority: 0,
        deadline: Deadline::Ttl,
        release_time,
    }
}
