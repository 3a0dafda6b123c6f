use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::errors::Result;

pub const DEFAULT_ZOOM: u8 = 16;
/// Height in world units assumed for one building level.
pub const DEFAULT_HEIGHT_PER_LEVEL: i32 = 30;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Osm,
    GeoJson,
}

/// Settings for one run of the tile harness, read from a JSON file.
#[derive(Deserialize, Debug, Clone)]
pub struct UserConfig {
    pub data_path: String,
    pub dest_path: String,
    pub format: InputFormat,
    pub tile_x: i32,
    pub tile_y: i32,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_height_per_level")]
    pub height_per_level: i32,
    #[serde(default = "default_write_archive")]
    pub write_archive: bool,
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_height_per_level() -> i32 {
    DEFAULT_HEIGHT_PER_LEVEL
}

fn default_write_archive() -> bool {
    true
}

impl UserConfig {
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            zoom: self.zoom,
            height_per_level: self.height_per_level,
        }
    }
}

/// Tunables the parsers need. Everything else about a parse comes from the document itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub zoom: u8,
    pub height_per_level: i32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            zoom: DEFAULT_ZOOM,
            height_per_level: DEFAULT_HEIGHT_PER_LEVEL,
        }
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config: UserConfig = serde_json::from_str(r#"{
            "data_path": "data/tile.osm",
            "dest_path": "output",
            "format": "osm",
            "tile_x": 36232,
            "tile_y": 22913
        }"#).unwrap();

        assert_eq!(config.format, InputFormat::Osm);
        assert_eq!(config.zoom, DEFAULT_ZOOM);
        assert!(config.write_archive);
        assert_eq!(config.parse_options(), ParseOptions::default());
    }

    #[test]
    fn config_geojson_format() {
        let config: UserConfig = serde_json::from_str(r#"{
            "data_path": "data/example.json",
            "dest_path": "output",
            "format": "geojson",
            "tile_x": 1,
            "tile_y": 2,
            "zoom": 14,
            "height_per_level": 3,
            "write_archive": false
        }"#).unwrap();

        assert_eq!(config.format, InputFormat::GeoJson);
        assert_eq!(config.parse_options(), ParseOptions { zoom: 14, height_per_level: 3 });
        assert!(!config.write_archive);
    }
}
