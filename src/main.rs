use std::env;
use std::fs::create_dir_all;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use tile_map::config::{load_user_config, UserConfig};
use tile_map::errors::Result;
use tile_map::etl::tile_etl::TileEtl;
use tile_map::etl::Etl;

const DEFAULT_CONFIG_PATH: &str = "config.json";

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let input_fname = Path::new(&config.data_path)
        .file_stem()
        .ok_or("Could not get input file name")?;
    let output_dir = Path::new(&config.dest_path)
        .join(input_fname)
        .join(format!("{}_{}_{}", config.zoom, config.tile_x, config.tile_y));
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging() {
    Builder::with_level("info")
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

fn main() -> Result<()> {
    setup_logging();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(Path::new(&config_path))?;
    let output_dir = create_output_dir(&user_config)?;

    let mut etl = TileEtl::new(&user_config);
    etl.process(&output_dir)?;

    if user_config.write_archive {
        let tile = TileEtl::read_cached(&output_dir)?;
        info!(
            paths = tile.paths.len(),
            buildings = tile.buildings.len(),
            landuse = tile.landuse.len(),
            water = tile.water.len();
            "Read tile from cache"
        );
    }

    Ok(())
}
