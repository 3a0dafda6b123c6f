//! Lookups over a finished tile, used by callers that want numbers about one building
//! rather than the whole geometry tree.

use crate::data::geometry::{LatLong, Line};
use crate::data::semantic::{Building, TileMapData};
use crate::data::tags::{BuildingKind, ColorProperty, LanduseKind, RoofShape};
use crate::shape::{self, Space, GLOBAL_AREA_SCALE};
use crate::tile::TileBounds;

/// Zoom level used when reporting the tile around a building.
pub const BUILDING_TILE_ZOOM: u8 = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingEnvironment {
    pub position: LatLong,
    /// Scaled global area, see [`GLOBAL_AREA_SCALE`].
    pub building_area: f64,
    pub kind: BuildingKind,
    pub roof_shape: RoofShape,
    pub is_roof_shape_known: bool,
    /// Zero unless the data gave a height.
    pub height: i32,
    pub is_height_known: bool,
    pub landuse_kind: LanduseKind,
    pub building_color: ColorProperty,
    pub is_building_color_known: bool,
    pub roof_color: ColorProperty,
    pub is_roof_color_known: bool,
    /// Mean scaled area of the other buildings in the tile, zero when there are none.
    pub average_building_area_nearby: f64,
    pub building_count_nearby: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingLocation {
    pub position: LatLong,
    pub area: f64,
}

/// Outline of a building with at least one coordinate.
fn outline(building: &Building) -> Option<&Line> {
    building.element.geometry.main_segment().filter(|line| !line.is_empty())
}

fn first_position(line: &Line) -> Option<LatLong> {
    line.coordinates().first().map(|coordinate| coordinate.global)
}

fn scaled_area(line: &Line) -> f64 {
    shape::scaled_area(line, Space::Global, GLOBAL_AREA_SCALE)
}

/// Describes the building with `id` and the buildings around it. `None` when the tile has
/// no building with that id and an outline.
pub fn building_environment(data: &TileMapData, id: i64) -> Option<BuildingEnvironment> {
    let mut found = None;
    let mut total_area = 0.0;
    let mut count = 0usize;

    for building in &data.buildings {
        let Some(line) = outline(building) else { continue };
        if building.element.id != id {
            total_area += scaled_area(line);
            count += 1;
            continue;
        }
        found = Some(BuildingEnvironment {
            position: first_position(line)?,
            building_area: scaled_area(line),
            kind: building.kind,
            roof_shape: building.roof_shape,
            is_roof_shape_known: building.roof_shape.is_known(),
            height: if building.is_height_known { building.height } else { 0 },
            is_height_known: building.is_height_known,
            landuse_kind: building.landuse(data).map_or(LanduseKind::Unknown, |landuse| landuse.kind),
            building_color: building.building_color,
            is_building_color_known: building.building_color.is_known(),
            roof_color: building.roof_color,
            is_roof_color_known: building.roof_color.is_known(),
            average_building_area_nearby: 0.0,
            building_count_nearby: 0,
        });
    }

    let mut environment = found?;
    if count > 0 {
        environment.average_building_area_nearby = total_area / count as f64;
        environment.building_count_nearby = count;
    }
    Some(environment)
}

/// First coordinate and scaled area of the first building in the tile.
pub fn building_location(data: &TileMapData) -> Option<BuildingLocation> {
    let line = outline(data.buildings.first()?)?;
    Some(BuildingLocation {
        position: first_position(line)?,
        area: scaled_area(line),
    })
}

pub fn tile_bounds_for_point(latitude: f64, longitude: f64, zoom: u8) -> TileBounds {
    TileBounds::containing(LatLong::new(latitude, longitude), zoom)
}

/// The [`BUILDING_TILE_ZOOM`] tile around the first building in the tile.
pub fn building_tile_bounds(data: &TileMapData) -> Option<TileBounds> {
    let location = building_location(data)?;
    Some(tile_bounds_for_point(location.position.latitude, location.position.longitude, BUILDING_TILE_ZOOM))
}
