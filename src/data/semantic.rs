use crate::data::geometry::Geometry;
use crate::data::tags::{
    BuildingKind, BuildingMaterial, ColorProperty, LanduseKind, PathSurfaceMaterial, PathType, RoofShape,
};

/// Identity and geometry shared by every element kind.
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct MapElement {
    pub name: String,
    pub id: i64,
    pub area: Option<i64>,
    pub geometry: Geometry,
}

#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct Path {
    pub element: MapElement,
    pub path_type: PathType,
    pub surface_material: PathSurfaceMaterial,
    pub lane_count: i32,
    pub width: i32,
    pub is_one_way: bool,
}

#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct Landuse {
    pub element: MapElement,
    pub kind: LanduseKind,
}

#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct Building {
    pub element: MapElement,
    pub kind: BuildingKind,
    pub roof_shape: RoofShape,
    pub material: BuildingMaterial,
    pub building_color: ColorProperty,
    pub roof_color: ColorProperty,
    pub min_height: i32,
    pub height: i32,
    pub levels: i32,
    pub roof_height: i32,
    /// The data gave a height; false when it was derived from levels or defaulted.
    pub is_height_known: bool,
    /// Index into [`TileMapData::landuse`] of the area this building stands in.
    pub belonging_landuse: Option<u32>,
}

impl Building {
    pub fn landuse<'a>(&self, data: &'a TileMapData) -> Option<&'a Landuse> {
        data.landuse.get(self.belonging_landuse? as usize)
    }
}

/// Height and level count of a building after defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingHeight {
    pub height: i32,
    pub levels: i32,
    pub is_height_known: bool,
}

impl BuildingHeight {
    /// Zero means "not given" for both inputs. With neither given the building gets one level;
    /// with one given the other is derived through `height_per_level`.
    pub fn resolve(height: i32, levels: i32, height_per_level: i32) -> Self {
        let per_level = height_per_level.max(1);
        match (height > 0, levels > 0) {
            (true, true) => BuildingHeight { height, levels, is_height_known: true },
            (true, false) => BuildingHeight {
                height,
                levels: (height / per_level).max(1),
                is_height_known: true,
            },
            (false, true) => BuildingHeight {
                height: levels.saturating_mul(per_level),
                levels,
                is_height_known: false,
            },
            (false, false) => BuildingHeight {
                height: per_level,
                levels: 1,
                is_height_known: false,
            },
        }
    }
}

/// Everything extracted from one tile. The four collections own their elements independently.
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct TileMapData {
    pub paths: Vec<Path>,
    pub buildings: Vec<Building>,
    pub landuse: Vec<Landuse>,
    pub water: Vec<MapElement>,
}

impl TileMapData {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.buildings.is_empty() && self.landuse.is_empty() && self.water.is_empty()
    }

    pub fn building(&self, id: i64) -> Option<&Building> {
        self.buildings.iter().find(|building| building.element.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_defaults() {
        assert_eq!(
            BuildingHeight::resolve(0, 0, 30),
            BuildingHeight { height: 30, levels: 1, is_height_known: false }
        );
        assert_eq!(
            BuildingHeight::resolve(60, 0, 30),
            BuildingHeight { height: 60, levels: 2, is_height_known: true }
        );
        assert_eq!(
            BuildingHeight::resolve(0, 3, 30),
            BuildingHeight { height: 90, levels: 3, is_height_known: false }
        );
        assert_eq!(
            BuildingHeight::resolve(45, 5, 30),
            BuildingHeight { height: 45, levels: 5, is_height_known: true }
        );
        assert_eq!(BuildingHeight::resolve(10, 0, 30).levels, 1);
    }

    #[test]
    fn huge_level_counts_saturate() {
        let resolved = BuildingHeight::resolve(0, i32::MAX, 30);
        assert_eq!(resolved.height, i32::MAX);
        assert_eq!(resolved.levels, i32::MAX);
        assert!(!resolved.is_height_known);
        assert_eq!(BuildingHeight::resolve(0, 100_000_000, 30).height, i32::MAX);
    }
}
