//! Reads map data for one web-map tile, from OSM XML or from tile JSON, into typed paths,
//! buildings, landuse areas and water with coordinates projected into tile-local space.

pub mod archive;
pub mod config;
pub mod data;
pub mod errors;
pub mod etl;
pub mod query;
pub mod scan;
pub mod shape;
pub mod tile;

use log::info;

use crate::config::ParseOptions;
use crate::data::semantic::TileMapData;
use crate::errors::Result;
use crate::etl::{parse_geojson, parse_osm, semantic_map};
use crate::tile::TileBounds;

/// Parses an OSM XML document for tile `(tile_x, tile_y)` at `options.zoom`.
pub fn parse_osm_tile(text: &str, tile_x: i32, tile_y: i32, options: &ParseOptions) -> Result<TileMapData> {
    info!(tile_x = tile_x, tile_y = tile_y, zoom = options.zoom; "Parsing OSM tile");
    let bounds = TileBounds::for_tile(tile_x, tile_y, options.zoom);
    let data = parse_osm::load_osm_document(text)?;
    semantic_map::build_tile_map(&data, &bounds, options)
}

/// Parses a tile JSON document. Only water and buildings exist in this format.
pub fn parse_geojson_tile(text: &str, tile_x: i32, tile_y: i32, options: &ParseOptions) -> Result<TileMapData> {
    info!(tile_x = tile_x, tile_y = tile_y, zoom = options.zoom; "Parsing tile JSON");
    let bounds = TileBounds::for_tile(tile_x, tile_y, options.zoom);
    let data = parse_geojson::parse_tile_json(text, &bounds)?;
    Ok(data.to_tile_map(options))
}
