use crate::data::semantic::TileMapData;
use crate::errors::Result;

pub const ARCHIVE_FILE_NAME: &str = "tile_map.rkyv";

pub fn to_bytes(data: &TileMapData) -> Result<Vec<u8>> {
    let bytes = rkyv::to_bytes::<_, 256>(data)
        .map_err(|err| format!("Could not serialize tile map: {err:?}"))?;
    Ok(bytes.to_vec())
}

/// Validates the archive before deserializing it, so truncated or foreign files are an error.
pub fn from_bytes(bytes: &[u8]) -> Result<TileMapData> {
    // Archived data must be read from an aligned buffer.
    let mut aligned = rkyv::AlignedVec::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);
    let data = rkyv::from_bytes::<TileMapData>(&aligned)
        .map_err(|err| format!("Could not read tile map archive: {err:?}"))?;
    Ok(data)
}
