//! The city grid: an immutable tile matrix with a per-tile legend.
//!
//! Rows are indexed by `y` (row 0 at the top), columns by `x`. Every tile
//! kind used in the matrix must have a legend entry, and every legend
//! surface weight must be a finite non-negative number; both are checked
//! once at construction so the queries below never have to.

use std::collections::BTreeMap;

use courier_types::{LegendEntry, Position, Tile};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Surface weight used when the legend does not specify one.
pub const DEFAULT_SURFACE_WEIGHT: f64 = 1.0;

/// A maximal rectangle of contiguous building tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingBlock {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
}

/// Unvalidated grid as it appears in map data.
#[derive(Debug, Clone, Deserialize)]
struct RawCityGrid {
    width: u32,
    height: u32,
    tiles: Vec<Vec<Tile>>,
    #[serde(default)]
    legend: BTreeMap<Tile, LegendEntry>,
}

impl TryFrom<RawCityGrid> for CityGrid {
    type Error = WorldError;

    fn try_from(raw: RawCityGrid) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height, raw.tiles, raw.legend)
    }
}

/// The static city map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCityGrid")]
pub struct CityGrid {
    width: u32,
    height: u32,
    tiles: Vec<Vec<Tile>>,
    legend: BTreeMap<Tile, LegendEntry>,
}

impl CityGrid {
    /// Build a grid, validating its shape and legend.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidConfiguration`] if the row count differs
    /// from `height`, any row length differs from `width`, a tile kind has no
    /// legend entry, or a surface weight is negative or not finite.
    pub fn new(
        width: u32,
        height: u32,
        tiles: Vec<Vec<Tile>>,
        legend: BTreeMap<Tile, LegendEntry>,
    ) -> Result<Self, WorldError> {
        let expected_rows = usize::try_from(height)
            .map_err(|_err| WorldError::invalid("height exceeds usize range"))?;
        let expected_cols = usize::try_from(width)
            .map_err(|_err| WorldError::invalid("width exceeds usize range"))?;

        if tiles.len() != expected_rows {
            return Err(WorldError::invalid(format!(
                "expected {expected_rows} rows, found {}",
                tiles.len()
            )));
        }
        for (y, row) in tiles.iter().enumerate() {
            if row.len() != expected_cols {
                return Err(WorldError::invalid(format!(
                    "row {y} has {} tiles, expected {expected_cols}",
                    row.len()
                )));
            }
            for tile in row {
                if !legend.contains_key(tile) {
                    return Err(WorldError::invalid(format!(
                        "tile code {} in row {y} has no legend entry",
                        tile.code()
                    )));
                }
            }
        }
        for (tile, entry) in &legend {
            if let Some(weight) = entry.surface_weight
                && (!weight.is_finite() || weight < 0.0)
            {
                return Err(WorldError::invalid(format!(
                    "legend entry {} has invalid surface weight {weight}",
                    tile.code()
                )));
            }
        }

        Ok(Self {
            width,
            height,
            tiles,
            legend,
        })
    }

    /// Grid width in tiles.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// The legend, keyed by tile kind.
    pub const fn legend(&self) -> &BTreeMap<Tile, LegendEntry> {
        &self.legend
    }

    /// Returns `true` if `position` lies inside the grid.
    pub fn contains(&self, position: Position) -> bool {
        self.index_of(position).is_some()
    }

    /// The tile kind at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `position` is outside the grid.
    pub fn tile_at(&self, position: Position) -> Result<Tile, WorldError> {
        self.index_of(position)
            .and_then(|(col, row)| self.tiles.get(row).and_then(|r| r.get(col)))
            .copied()
            .ok_or(WorldError::OutOfBounds {
                position,
                width: self.width,
                height: self.height,
            })
    }

    /// Whether the tile at `position` cannot be entered.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `position` is outside the grid.
    pub fn is_blocked(&self, position: Position) -> Result<bool, WorldError> {
        let tile = self.tile_at(position)?;
        Ok(self.legend.get(&tile).is_some_and(|entry| entry.blocked))
    }

    /// Surface speed weight of the tile at `position`, defaulting to `1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `position` is outside the grid.
    pub fn surface_weight(&self, position: Position) -> Result<f64, WorldError> {
        let tile = self.tile_at(position)?;
        Ok(self
            .legend
            .get(&tile)
            .and_then(|entry| entry.surface_weight)
            .unwrap_or(DEFAULT_SURFACE_WEIGHT))
    }

    /// First passable tile scanning rows top to bottom, columns left to right.
    pub fn first_passable(&self) -> Option<Position> {
        for (row, tiles) in self.tiles.iter().enumerate() {
            for (col, tile) in tiles.iter().enumerate() {
                let blocked = self.legend.get(tile).is_some_and(|entry| entry.blocked);
                if !blocked {
                    let x = i32::try_from(col).ok()?;
                    let y = i32::try_from(row).ok()?;
                    return Some(Position::new(x, y));
                }
            }
        }
        None
    }

    /// Group contiguous building tiles into rectangles.
    ///
    /// Scans row-major; from each unvisited building tile, extends right as
    /// far as possible, then extends down while the whole span stays
    /// unvisited buildings. Every building tile ends up in exactly one block.
    pub fn building_blocks(&self) -> Vec<BuildingBlock> {
        let mut visited: Vec<Vec<bool>> = self
            .tiles
            .iter()
            .map(|row| vec![false; row.len()])
            .collect();
        let mut blocks = Vec::new();

        let is_free_building = |visited: &[Vec<bool>], col: usize, row: usize| -> bool {
            let building = self
                .tiles
                .get(row)
                .and_then(|r| r.get(col))
                .is_some_and(|t| *t == Tile::Building);
            let seen = visited
                .get(row)
                .and_then(|r| r.get(col))
                .copied()
                .unwrap_or(true);
            building && !seen
        };

        for row in 0..self.tiles.len() {
            let cols = self.tiles.get(row).map_or(0, Vec::len);
            for col in 0..cols {
                if !is_free_building(&visited, col, row) {
                    continue;
                }

                let mut span: usize = 0;
                while is_free_building(&visited, col.saturating_add(span), row) {
                    span = span.saturating_add(1);
                }

                let mut depth: usize = 0;
                while (0..span).all(|dx| {
                    is_free_building(&visited, col.saturating_add(dx), row.saturating_add(depth))
                }) {
                    depth = depth.saturating_add(1);
                }

                for dy in 0..depth {
                    if let Some(r) = visited.get_mut(row.saturating_add(dy)) {
                        for dx in 0..span {
                            if let Some(cell) = r.get_mut(col.saturating_add(dx)) {
                                *cell = true;
                            }
                        }
                    }
                }

                if let (Ok(x), Ok(y), Ok(width), Ok(height)) = (
                    u32::try_from(col),
                    u32::try_from(row),
                    u32::try_from(span),
                    u32::try_from(depth),
                ) {
                    blocks.push(BuildingBlock {
                        x,
                        y,
                        width,
                        height,
                    });
                }
            }
        }

        blocks
    }

    /// Convert a position into `(column, row)` indices if it is in bounds.
    fn index_of(&self, position: Position) -> Option<(usize, usize)> {
        let col = u32::try_from(position.x).ok()?;
        let row = u32::try_from(position.y).ok()?;
        if col >= self.width || row >= self.height {
            return None;
        }
        Some((usize::try_from(col).ok()?, usize::try_from(row).ok()?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn legend() -> BTreeMap<Tile, LegendEntry> {
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

    fn parse_rows(rows: &[&str]) -> Vec<Vec<Tile>> {
        rows.iter()
            .map(|row| {
                row.chars()
                    .filter_map(|c| Tile::from_code(&c.to_string()))
                    .collect()
            })
            .collect()
    }

    fn grid(rows: &[&str]) -> CityGrid {
        let tiles = parse_rows(rows);
        let height = u32::try_from(tiles.len()).unwrap();
        let width = u32::try_from(tiles.first().map_or(0, Vec::len)).unwrap();
        CityGrid::new(width, height, tiles, legend()).unwrap()
    }

    #[test]
    fn blocked_lookup_follows_legend() {
        let g = grid(&["CBP", "CCC"]);
        assert!(!g.is_blocked(Position::new(0, 0)).unwrap());
        assert!(g.is_blocked(Position::new(1, 0)).unwrap());
        assert!(!g.is_blocked(Position::new(2, 0)).unwrap());
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let g = grid(&["CC", "CC"]);
        for pos in [
            Position::new(-1, 0),
            Position::new(0, -1),
            Position::new(2, 0),
            Position::new(0, 2),
        ] {
            assert!(matches!(
                g.is_blocked(pos),
                Err(WorldError::OutOfBounds { .. })
            ));
        }
    }

    #[test]
    fn surface_weight_defaults_to_one() {
        let g = grid(&["CBP"]);
        assert_eq!(g.surface_weight(Position::new(0, 0)).unwrap(), 1.0);
        assert_eq!(g.surface_weight(Position::new(1, 0)).unwrap(), 1.0);
        assert_eq!(g.surface_weight(Position::new(2, 0)).unwrap(), 0.95);
    }

    #[test]
    fn row_count_must_match_height() {
        let result = CityGrid::new(2, 3, parse_rows(&["CC", "CC"]), legend());
        assert!(matches!(
            result,
            Err(WorldError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn row_length_must_match_width() {
        let result = CityGrid::new(2, 2, parse_rows(&["CC", "C"]), legend());
        assert!(result.is_err());
    }

    #[test]
    fn every_tile_needs_a_legend_entry() {
        let mut partial = legend();
        partial.remove(&Tile::Park);
        let result = CityGrid::new(2, 1, parse_rows(&["CP"]), partial);
        assert!(result.is_err());
    }

    #[test]
    fn negative_surface_weight_is_rejected() {
        let mut bad = legend();
        if let Some(entry) = bad.get_mut(&Tile::Street) {
            entry.surface_weight = Some(-0.5);
        }
        let result = CityGrid::new(1, 1, parse_rows(&["C"]), bad);
        assert!(result.is_err());
    }

    #[test]
    fn first_passable_skips_blocked_tiles() {
        let g = grid(&["BBB", "BPC"]);
        assert_eq!(g.first_passable(), Some(Position::new(1, 1)));

        let walled = grid(&["BB"]);
        assert_eq!(walled.first_passable(), None);
    }

    #[test]
    fn building_blocks_cover_each_building_once() {
        let g = grid(&["BBC", "BBC", "CCB"]);
        let blocks = g.building_blocks();
        assert_eq!(
            blocks,
            vec![
                BuildingBlock {
                    x: 0,
                    y: 0,
                    width: 2,
                    height: 2
                },
                BuildingBlock {
                    x: 2,
                    y: 2,
                    width: 1,
                    height: 1
                },
            ]
        );
    }

    #[test]
    fn building_blocks_split_ragged_shapes() {
        // An L shape: the top row spans two columns, the second only one.
        let g = grid(&["BB", "BC"]);
        let blocks = g.building_blocks();
        let covered: u32 = blocks.iter().map(|b| b.width * b.height).sum();
        assert_eq!(covered, 3);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn deserializes_map_feed_shape() {
        let json = r#"{
            "width": 2,
            "height": 1,
            "tiles": [["C", "B"]],
            "legend": {
                "C": {"name": "calle", "surface_weight": 1.0},
                "B": {"name": "edificio", "blocked": true}
            }
        }"#;
        let g: CityGrid = serde_json::from_str(json).unwrap();
        assert!(g.is_blocked(Position::new(1, 0)).unwrap());
    }

    #[test]
    fn deserialization_runs_validation() {
        let json = r#"{"width": 3, "height": 1, "tiles": [["C"]], "legend": {"C": {"name": "calle"}}}"#;
        let result: Result<CityGrid, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
