use log::{debug, info};
use regex::Regex;

use crate::config::ParseOptions;
use crate::data::geometry::Geometry;
use crate::data::osm::{Component, ElementInfo, OsmMapData};
use crate::data::semantic::{Building, BuildingHeight, Landuse, MapElement, Path, TileMapData};
use crate::data::tags::{
    BuildingKind, BuildingMaterial, ColorProperty, LanduseKind, PathSurfaceMaterial, PathType, RoofShape,
};
use crate::errors::Result;
use crate::etl::osm_geometry::GeometryBuilder;
use crate::shape::{self, Space, GLOBAL_AREA_SCALE};
use crate::tile::TileBounds;

/// Sorts cached OSM elements into the four tile collections.
pub struct SemanticMapBuilder<'a> {
    geometry: GeometryBuilder<'a>,
    options: ParseOptions,
    leading_number: Regex,
}

impl<'a> SemanticMapBuilder<'a> {
    pub fn new(data: &'a OsmMapData, bounds: &'a TileBounds, options: ParseOptions) -> Result<Self> {
        Ok(SemanticMapBuilder {
            geometry: GeometryBuilder::new(data, bounds),
            options,
            leading_number: Regex::new(r"^\s*(?<value>\d+(?:\.\d+)?)")?,
        })
    }

    /// Leading decimal of a tag value such as "12.5 m". Missing or unparseable values are 0.
    fn measure(&self, info: &ElementInfo, key: &str) -> i32 {
        info.tag(key)
            .and_then(|value| self.leading_number.captures(value))
            .and_then(|captures| captures.name("value"))
            .and_then(|value| value.as_str().parse::<f64>().ok())
            .map_or(0, |value| value.round() as i32)
    }

    fn element(&self, info: &ElementInfo, geometry: Geometry) -> MapElement {
        let area = geometry.main_segment()
            .filter(|line| line.is_closed())
            .map(|line| shape::scaled_area(line, Space::Global, GLOBAL_AREA_SCALE).round() as i64);
        MapElement {
            name: info.tag("name").unwrap_or_default().to_string(),
            id: info.id,
            area,
            geometry,
        }
    }

    fn path(&self, info: &ElementInfo, element: MapElement) -> Path {
        let lane_count = info.tag("lanes")
            .and_then(|lanes| lanes.trim().parse::<i32>().ok())
            .filter(|lanes| *lanes > 0)
            .unwrap_or(1);
        let is_one_way = ["yes", "true", "1", "-1"].iter().any(|value| info.has_kv_pair("oneway", value));
        Path {
            element,
            path_type: PathType::from_tag(info.tag("highway").unwrap_or_default()),
            surface_material: PathSurfaceMaterial::from_tag(info.tag("surface").unwrap_or_default()),
            lane_count,
            width: self.measure(info, "width"),
            is_one_way,
        }
    }

    fn building(&self, info: &ElementInfo, element: MapElement) -> Building {
        let kind = info.tag("building")
            .or_else(|| info.tag("building:part"))
            .map_or(BuildingKind::Unknown, BuildingKind::from_tag);
        let colour = |british: &str, american: &str| {
            info.tag(british)
                .or_else(|| info.tag(american))
                .map_or(ColorProperty::Unknown, ColorProperty::from_colour_tag)
        };
        let levels = info.tag("building:levels")
            .and_then(|levels| levels.trim().parse::<f64>().ok())
            .map_or(0, |levels| levels.round() as i32);
        let height = BuildingHeight::resolve(self.measure(info, "height"), levels, self.options.height_per_level);

        Building {
            element,
            kind,
            roof_shape: RoofShape::from_tag(info.tag("roof:shape").unwrap_or_default()),
            material: BuildingMaterial::from_tag(info.tag("building:material").unwrap_or_default()),
            building_color: colour("building:colour", "building:color"),
            roof_color: colour("roof:colour", "roof:color"),
            min_height: self.measure(info, "min_height"),
            height: height.height,
            levels: height.levels,
            roof_height: self.measure(info, "roof:height"),
            is_height_known: height.is_height_known,
            belonging_landuse: None,
        }
    }

    fn process_component(&self, output: &mut TileMapData, component: Component) {
        let info = component.info();
        let is_path = info.is_path();
        let is_landuse = info.is_landuse();
        let is_building = info.is_building();
        let is_water = info.is_water();
        if !(is_path || is_landuse || is_building || is_water) {
            return;
        }

        let Some(geometry) = self.geometry.build(component) else {
            debug!(id = info.id; "Tagged element has no geometry");
            return;
        };
        let element = self.element(info, geometry);

        if is_path {
            output.paths.push(self.path(info, element.clone()));
        }
        if is_landuse {
            output.landuse.push(Landuse {
                element: element.clone(),
                kind: LanduseKind::from_tag(info.tag("landuse").unwrap_or_default()),
            });
        }
        if is_building {
            output.buildings.push(self.building(info, element.clone()));
        }
        if is_water {
            output.water.push(element);
        }
    }

    /// Nodes on their own are not classified; they only show up inside relation geometry.
    pub fn build(&self, data: &OsmMapData) -> TileMapData {
        let mut output = TileMapData::default();
        for component in data.components() {
            if matches!(component, Component::Node(_)) {
                continue;
            }
            self.process_component(&mut output, component);
        }
        assign_landuse(&mut output);

        info!(
            paths = output.paths.len(),
            buildings = output.buildings.len(),
            landuse = output.landuse.len(),
            water = output.water.len();
            "Classified tile elements"
        );
        output
    }
}

pub fn build_tile_map(data: &OsmMapData, bounds: &TileBounds, options: &ParseOptions) -> Result<TileMapData> {
    Ok(SemanticMapBuilder::new(data, bounds, *options)?.build(data))
}

/// Points every building at the smallest landuse area containing its reference point.
pub fn assign_landuse(output: &mut TileMapData) {
    let landuse_areas: Vec<f64> = output.landuse.iter()
        .map(|landuse| landuse.element.geometry.main_segment().map_or(f64::INFINITY, |line| shape::area(line, Space::Local)))
        .collect();

    for building in &mut output.buildings {
        let Some(point) = building.element.geometry.reference_point() else {
            continue;
        };
        building.belonging_landuse = output.landuse.iter()
            .enumerate()
            .filter(|(_, landuse)| {
                let geometry = &landuse.element.geometry;
                geometry.main_segment().is_some_and(|outer| {
                    outer.is_closed() && shape::contains_point_with_holes(outer, geometry.hole_segments(), point)
                })
            })
            .min_by(|(a, _), (b, _)| landuse_areas[*a].total_cmp(&landuse_areas[*b]))
            .map(|(idx, _)| idx as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geometry::LatLong;
    use crate::data::osm::{Member, MemberRef, Node, Relation, Way};
    use crate::etl::multigon;

    fn bounds() -> TileBounds {
        TileBounds::new(LatLong::new(1.0, 0.0), LatLong::new(0.0, 1.0))
    }

    fn add_node(data: &mut OsmMapData, id: i64, lat: f64, lon: f64) {
        data.nodes.insert(id, Node { info: ElementInfo::new(id), coordinate: LatLong::new(lat, lon) });
    }

    fn add_way(data: &mut OsmMapData, id: i64, nodes: &[i64], tags: &[(&str, &str)]) {
        let mut info = ElementInfo::new(id);
        for (k, v) in tags {
            info.tags.insert(k.to_string(), v.to_string());
        }
        data.ways.insert(id, Way { info, nodes: nodes.to_vec() });
    }

    /// A square per corner set, closed back on its first node.
    fn add_square(data: &mut OsmMapData, id: i64, first_node: i64, min: f64, max: f64, tags: &[(&str, &str)]) {
        add_node(data, first_node, min, min);
        add_node(data, first_node + 1, max, min);
        add_node(data, first_node + 2, max, max);
        add_node(data, first_node + 3, min, max);
        let nodes = [first_node, first_node + 1, first_node + 2, first_node + 3, first_node];
        add_way(data, id, &nodes, tags);
    }

    fn build(data: &OsmMapData) -> TileMapData {
        build_tile_map(data, &bounds(), &ParseOptions::default()).unwrap()
    }

    #[test]
    fn classifies_by_tag_keys() {
        let mut data = OsmMapData::default();
        add_square(&mut data, 1, 10, 0.1, 0.2, &[("building", "house"), ("name", "Home")]);
        add_square(&mut data, 2, 20, 0.3, 0.4, &[("landuse", "forest")]);
        add_square(&mut data, 3, 30, 0.5, 0.6, &[("natural", "water")]);
        add_way(&mut data, 4, &[10, 20], &[("highway", "residential")]);
        add_square(&mut data, 5, 50, 0.7, 0.8, &[("amenity", "bench")]);

        let map = build(&data);
        assert_eq!(map.buildings.len(), 1);
        assert_eq!(map.landuse.len(), 1);
        assert_eq!(map.water.len(), 1);
        assert_eq!(map.paths.len(), 1);

        let building = &map.buildings[0];
        assert_eq!(building.element.name, "Home");
        assert_eq!(building.kind, BuildingKind::House);
        assert_eq!(map.landuse[0].kind, LanduseKind::Forest);
        assert_eq!(map.paths[0].path_type, PathType::Residential);
        assert_eq!(map.paths[0].element.area, None);
        assert!(building.element.area.is_some_and(|area| area > 0));
    }

    #[test]
    fn building_attributes() {
        let mut data = OsmMapData::default();
        add_square(&mut data, 1, 10, 0.1, 0.2, &[
            ("building", "yes"),
            ("height", "12.4 m"),
            ("min_height", "3"),
            ("roof:height", "2.5"),
            ("roof:shape", "gabled"),
            ("building:material", "brick"),
            ("building:colour", "Grey"),
            ("roof:color", "#FF0000"),
        ]);
        add_square(&mut data, 2, 20, 0.3, 0.4, &[("building:part", "yes"), ("building:levels", "4")]);

        let map = build(&data);
        let tall = map.building(1).unwrap();
        assert_eq!(tall.height, 12);
        assert!(tall.is_height_known);
        assert_eq!(tall.levels, 1);
        assert_eq!(tall.min_height, 3);
        assert_eq!(tall.roof_height, 3);
        assert_eq!(tall.roof_shape, RoofShape::Gabled);
        assert_eq!(tall.material, BuildingMaterial::Brick);
        assert_eq!(tall.building_color, ColorProperty::Gray);
        assert_eq!(tall.roof_color, ColorProperty::Red);

        let part = map.building(2).unwrap();
        assert_eq!(part.kind, BuildingKind::Yes);
        assert_eq!(part.levels, 4);
        assert_eq!(part.height, 120);
        assert!(!part.is_height_known);
        assert_eq!(part.roof_shape, RoofShape::Unknown);
    }

    #[test]
    fn path_attributes() {
        let mut data = OsmMapData::default();
        add_node(&mut data, 1, 0.1, 0.1);
        add_node(&mut data, 2, 0.2, 0.2);
        add_way(&mut data, 3, &[1, 2], &[
            ("highway", "primary"),
            ("lanes", "2"),
            ("width", "7.5"),
            ("oneway", "-1"),
            ("surface", "asphalt"),
        ]);
        add_way(&mut data, 4, &[1, 2], &[("highway", "motorway_link"), ("lanes", "many"), ("oneway", "no")]);

        let map = build(&data);
        let primary = map.paths.iter().find(|p| p.element.id == 3).unwrap();
        assert_eq!(primary.lane_count, 2);
        assert_eq!(primary.width, 8);
        assert!(primary.is_one_way);
        assert_eq!(primary.surface_material, PathSurfaceMaterial::Asphalt);

        let link = map.paths.iter().find(|p| p.element.id == 4).unwrap();
        assert_eq!(link.path_type, PathType::Unknown);
        assert_eq!(link.lane_count, 1);
        assert!(!link.is_one_way);
    }

    #[test]
    fn buildings_get_the_smallest_enclosing_landuse() {
        let mut data = OsmMapData::default();
        add_square(&mut data, 1, 10, 0.1, 0.9, &[("landuse", "residential")]);
        add_square(&mut data, 2, 20, 0.2, 0.5, &[("landuse", "retail")]);
        add_square(&mut data, 3, 30, 0.3, 0.4, &[("building", "retail")]);
        add_square(&mut data, 4, 40, 0.6, 0.7, &[("building", "house")]);
        add_square(&mut data, 5, 50, 0.92, 0.95, &[("building", "shed")]);

        let map = build(&data);
        let kind = |id| map.building(id).and_then(|b| b.landuse(&map)).map(|l| l.kind);
        assert_eq!(kind(3), Some(LanduseKind::Retail));
        assert_eq!(kind(4), Some(LanduseKind::Residential));
        assert_eq!(kind(5), None);
    }

    #[test]
    fn multipolygon_building() {
        let mut data = OsmMapData::default();
        add_node(&mut data, 1, 0.1, 0.1);
        add_node(&mut data, 2, 0.1, 0.3);
        add_node(&mut data, 3, 0.3, 0.2);
        add_way(&mut data, 10, &[1, 2], &[]);
        add_way(&mut data, 11, &[3, 2], &[]);
        add_way(&mut data, 12, &[3, 1], &[]);

        let mut relation = Relation::new(ElementInfo::new(100));
        relation.info.tags.insert("building".to_string(), "church".to_string());
        for way in [10, 11, 12] {
            relation.add_member(Member { component: MemberRef::Way(way), role: "outer".to_string() });
        }
        relation.multigon_cache = multigon::stitch_outer_ring(&relation, &data.ways);
        data.relations.insert(100, relation);

        let map = build(&data);
        assert_eq!(map.buildings.len(), 1);
        let church = map.building(100).unwrap();
        assert_eq!(church.kind, BuildingKind::Church);
        let Geometry::Polygon(polygon) = &church.element.geometry else { panic!("expected polygon") };
        assert_eq!(polygon.outer.len(), 3);
        assert!(polygon.outer.is_closed());
    }
}
