//! Reader for the tile JSON format: `{"water": layer, "buildings": layer}` where each layer
//! is a GeoJSON feature collection.
//!
//! Every object level runs its own scan loop. Keys are read at bracket depth one of that
//! level, known keys hand the cursor to the parser for their value, and anything else is
//! stepped over by the loop itself.

use log::{debug, info};

use crate::config::ParseOptions;
use crate::data::geometry::{Coordinate, Geometry, LatLong, Line, Polygon};
use crate::data::semantic::{Building, BuildingHeight, MapElement, TileMapData};
use crate::data::tags::{BuildingKind, BuildingMaterial, ColorProperty, RoofShape};
use crate::errors::Result;
use crate::scan::{is_number, Cursor, ScanState};
use crate::tile::TileBounds;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TileJsonData {
    pub water: MapLayer,
    pub buildings: MapLayer,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MapLayer {
    pub layer_type: String,
    pub features: Vec<Feature>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Feature {
    pub feature_type: String,
    pub id: Option<i64>,
    pub geometry: FeatureGeometry,
    pub properties: Properties,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FeatureGeometry {
    pub geometry_type: String,
    /// One line per innermost coordinate list, in document order.
    pub shapes: Vec<Line>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Properties {
    pub kind: String,
    pub kind_detail: String,
    pub name: String,
    pub area: i64,
}

/// Reads a key whose opening quote is under the cursor and moves onto its value.
fn read_key(cursor: &mut Cursor, state: &mut ScanState) -> String {
    state.flip_in_string();
    let key = cursor.parse_string();
    cursor.seek_to_value();
    key
}

/// Values of the wrong type are left for the caller's loop to step over.
fn string_value(cursor: &mut Cursor) -> Option<String> {
    if cursor.peek() == Some(b'"') {
        Some(cursor.parse_string())
    } else {
        cursor.step_back();
        None
    }
}

fn integer_value(cursor: &mut Cursor) -> Option<i64> {
    if cursor.peek().is_some_and(is_number) {
        Some(cursor.parse_i64())
    } else {
        cursor.step_back();
        None
    }
}

fn opens(cursor: &mut Cursor, open: u8) -> bool {
    if cursor.peek() == Some(open) {
        true
    } else {
        cursor.step_back();
        false
    }
}

fn parse_shapes(cursor: &mut Cursor, bounds: &TileBounds) -> Vec<Line> {
    let mut state = ScanState::new();
    let mut shapes = Vec::new();
    let mut current: Vec<Coordinate> = Vec::new();
    let mut max_depth = 0;

    while let Some(byte) = cursor.peek() {
        state.update(byte);
        max_depth = max_depth.max(state.array_depth());
        // Closing a ring leaves the array two levels above the coordinate pairs.
        if byte == b']' && state.array_depth() == max_depth - 2 && !current.is_empty() {
            shapes.push(finish_shape(std::mem::take(&mut current)));
        }
        if is_number(byte) {
            let longitude = cursor.parse_f64();
            cursor.advance();
            cursor.seek_to_next_number();
            let latitude = cursor.parse_f64();
            current.push(bounds.project(LatLong::new(latitude, longitude)));
        }
        if state.is_in_valid_state() {
            break;
        }
        cursor.advance();
    }

    if !current.is_empty() {
        shapes.push(finish_shape(current));
    }
    shapes
}

fn finish_shape(coordinates: Vec<Coordinate>) -> Line {
    let is_closed = match (coordinates.first(), coordinates.last()) {
        (Some(first), Some(last)) => coordinates.len() > 2 && first.global.approx_eq(&last.global),
        _ => false,
    };
    Line::new(coordinates, is_closed)
}

fn parse_geometry(cursor: &mut Cursor, bounds: &TileBounds) -> FeatureGeometry {
    let mut state = ScanState::new();
    let mut geometry = FeatureGeometry::default();

    while let Some(byte) = cursor.peek() {
        state.update(byte);
        if byte == b'"' && state.bracket_depth() == 1 {
            match read_key(cursor, &mut state).as_str() {
                "type" => {
                    if let Some(value) = string_value(cursor) {
                        geometry.geometry_type = value;
                    }
                }
                "coordinates" => {
                    if opens(cursor, b'[') {
                        geometry.shapes = parse_shapes(cursor, bounds);
                    }
                }
                _ => cursor.step_back(),
            }
        }
        if state.is_in_valid_state() {
            break;
        }
        cursor.advance();
    }
    geometry
}

fn parse_properties(cursor: &mut Cursor) -> Properties {
    let mut state = ScanState::new();
    let mut properties = Properties::default();

    while let Some(byte) = cursor.peek() {
        state.update(byte);
        if byte == b'"' && state.bracket_depth() == 1 {
            match read_key(cursor, &mut state).as_str() {
                "kind" => properties.kind = string_value(cursor).unwrap_or_default(),
                "kind_detail" => properties.kind_detail = string_value(cursor).unwrap_or_default(),
                "name" => properties.name = string_value(cursor).unwrap_or_default(),
                "area" => properties.area = integer_value(cursor).unwrap_or_default(),
                _ => cursor.step_back(),
            }
        }
        if state.is_in_valid_state() {
            break;
        }
        cursor.advance();
    }
    properties
}

fn parse_feature(cursor: &mut Cursor, bounds: &TileBounds) -> Feature {
    let mut state = ScanState::new();
    let mut feature = Feature::default();

    while let Some(byte) = cursor.peek() {
        state.update(byte);
        if byte == b'"' && state.bracket_depth() == 1 {
            match read_key(cursor, &mut state).as_str() {
                "type" => feature.feature_type = string_value(cursor).unwrap_or_default(),
                "id" => feature.id = integer_value(cursor),
                "geometry" => {
                    if opens(cursor, b'{') {
                        feature.geometry = parse_geometry(cursor, bounds);
                    }
                }
                "properties" => {
                    if opens(cursor, b'{') {
                        feature.properties = parse_properties(cursor);
                    }
                }
                _ => cursor.step_back(),
            }
        }
        if state.is_in_valid_state() {
            break;
        }
        cursor.advance();
    }
    feature
}

fn parse_feature_array(cursor: &mut Cursor, bounds: &TileBounds) -> Vec<Feature> {
    let mut state = ScanState::new();
    let mut features = Vec::new();

    while let Some(byte) = cursor.peek() {
        state.update(byte);
        if byte == b'{' && state.bracket_depth() == 1 {
            features.push(parse_feature(cursor, bounds));
            // The feature consumed its own closing bracket.
            state.undo_bracket_increment();
        }
        if state.is_in_valid_state() {
            break;
        }
        cursor.advance();
    }
    features
}

fn parse_layer(cursor: &mut Cursor, bounds: &TileBounds) -> MapLayer {
    let mut state = ScanState::new();
    let mut layer = MapLayer::default();

    while let Some(byte) = cursor.peek() {
        state.update(byte);
        if byte == b'"' && state.bracket_depth() == 1 {
            match read_key(cursor, &mut state).as_str() {
                "type" => layer.layer_type = string_value(cursor).unwrap_or_default(),
                "features" => {
                    if opens(cursor, b'[') {
                        layer.features = parse_feature_array(cursor, bounds);
                    }
                }
                _ => cursor.step_back(),
            }
        }
        if state.is_in_valid_state() {
            break;
        }
        cursor.advance();
    }
    layer
}

/// Scans the whole document. Only empty input fails; anything the scanner does not
/// recognise is skipped.
pub fn parse_tile_json(text: &str, bounds: &TileBounds) -> Result<TileJsonData> {
    if text.trim().is_empty() {
        return Err("Empty tile JSON document".into());
    }

    let mut cursor = Cursor::new(text);
    let mut state = ScanState::new();
    let mut data = TileJsonData::default();

    while let Some(byte) = cursor.peek() {
        state.update(byte);
        if byte == b'"' && state.bracket_depth() == 1 {
            match read_key(&mut cursor, &mut state).as_str() {
                "water" => {
                    if opens(&mut cursor, b'{') {
                        data.water = parse_layer(&mut cursor, bounds);
                    }
                }
                "buildings" => {
                    if opens(&mut cursor, b'{') {
                        data.buildings = parse_layer(&mut cursor, bounds);
                    }
                }
                _ => cursor.step_back(),
            }
        }
        cursor.advance();
    }

    info!(
        water = data.water.features.len(),
        buildings = data.buildings.features.len();
        "Loaded tile JSON document"
    );
    Ok(data)
}

impl FeatureGeometry {
    /// Polygons keep their first shape as the outline and the rest as holes. Multi-part
    /// geometries become a composite of their shapes.
    pub fn to_geometry(&self) -> Option<Geometry> {
        let first = self.shapes.first()?;
        let geometry = match self.geometry_type.as_str() {
            "Point" => Geometry::Point(*first.coordinates().first()?),
            "Polygon" => Geometry::Polygon(Polygon {
                outer: first.clone(),
                inner: self.shapes[1..].to_vec(),
                unstitched_fragments: 0,
            }),
            _ if self.shapes.len() == 1 => Geometry::Ring(first.clone()),
            _ => Geometry::composite(self.shapes.iter().cloned().map(Geometry::Ring).collect()),
        };
        Some(geometry)
    }
}

impl Feature {
    fn element(&self, fallback_id: usize) -> Option<MapElement> {
        let Some(geometry) = self.geometry.to_geometry() else {
            debug!(fallback_id = fallback_id; "Feature without coordinates");
            return None;
        };
        Some(MapElement {
            name: self.properties.name.clone(),
            id: self.id.unwrap_or(fallback_id as i64),
            area: Some(self.properties.area),
            geometry,
        })
    }

    fn building_kind(&self) -> BuildingKind {
        let detail = BuildingKind::from_tag(&self.properties.kind_detail);
        if detail.is_known() {
            return detail;
        }
        match self.properties.kind.as_str() {
            "building" | "building_part" => BuildingKind::Yes,
            _ => BuildingKind::Unknown,
        }
    }
}

impl TileJsonData {
    /// Features without an id are numbered by their position in the layer.
    pub fn to_tile_map(&self, options: &ParseOptions) -> TileMapData {
        let mut output = TileMapData::default();
        output.water = self.water.features.iter()
            .enumerate()
            .filter_map(|(idx, feature)| feature.element(idx))
            .collect();

        let height = BuildingHeight::resolve(0, 0, options.height_per_level);
        output.buildings = self.buildings.features.iter()
            .enumerate()
            .filter_map(|(idx, feature)| {
                Some(Building {
                    element: feature.element(idx)?,
                    kind: feature.building_kind(),
                    roof_shape: RoofShape::Unknown,
                    material: BuildingMaterial::Unknown,
                    building_color: ColorProperty::Unknown,
                    roof_color: ColorProperty::Unknown,
                    min_height: 0,
                    height: height.height,
                    levels: height.levels,
                    roof_height: 0,
                    is_height_known: height.is_height_known,
                    belonging_landuse: None,
                })
            })
            .collect();
        output
    }
}
