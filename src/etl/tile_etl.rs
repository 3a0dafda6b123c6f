use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::archive::{self, ARCHIVE_FILE_NAME};
use crate::config::{InputFormat, UserConfig};
use crate::data::semantic::TileMapData;
use crate::errors::Result;
use crate::etl::Etl;

pub const ETL_NAME: &str = "tile_map";

/// Parses the configured document for one tile and caches the result as an archive.
pub struct TileEtl {
    config: UserConfig,
}

impl TileEtl {
    pub fn new(config: &UserConfig) -> Self {
        TileEtl { config: config.clone() }
    }

    pub fn output_path(dir: &Path) -> PathBuf {
        dir.join(ARCHIVE_FILE_NAME)
    }

    /// Reads a tile written by an earlier run.
    pub fn read_cached(dir: &Path) -> Result<TileMapData> {
        let mut input_file = File::open(Self::output_path(dir))?;
        let mut buf_vec: Vec<u8> = Vec::new();
        input_file.read_to_end(&mut buf_vec)?;
        archive::from_bytes(&buf_vec)
    }
}

impl Etl for TileEtl {
    type Input = String;
    type Output = TileMapData;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        Ok(self.config.write_archive && Self::output_path(dir).try_exists()?)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        let path = Self::output_path(dir);
        if path.try_exists()? {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        Ok(fs::read_to_string(&self.config.data_path)?)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let options = self.config.parse_options();
        match self.config.format {
            InputFormat::Osm => crate::parse_osm_tile(&input, self.config.tile_x, self.config.tile_y, &options),
            InputFormat::GeoJson => crate::parse_geojson_tile(&input, self.config.tile_x, self.config.tile_y, &options),
        }
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        if !self.config.write_archive {
            info!(buildings = output.buildings.len(); "Archive disabled, discarding tile");
            return Ok(());
        }
        let bytes = archive::to_bytes(&output)?;
        let mut output_file = File::create(Self::output_path(dir))?;
        output_file.write_all(&bytes)?;
        Ok(())
    }
}
