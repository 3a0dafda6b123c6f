//! Web-Mercator tile math and the projection into tile-local space.

use std::f64::consts::PI;

use crate::data::geometry::{Coordinate, LatLong, Vec2};

fn tile_count(zoom: u8) -> f64 {
    2f64.powi(i32::from(zoom))
}

pub fn longitude_to_tile_x(longitude: f64, zoom: u8) -> i32 {
    ((longitude + 180.0) / 360.0 * tile_count(zoom)).floor() as i32
}

pub fn latitude_to_tile_y(latitude: f64, zoom: u8) -> i32 {
    let lat_rad = latitude.to_radians();
    ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * tile_count(zoom)).floor() as i32
}

/// North-west corner of the tile.
pub fn tile_to_lat_long(x: i32, y: i32, zoom: u8) -> LatLong {
    corner(f64::from(x), f64::from(y), zoom)
}

fn corner(x: f64, y: f64, zoom: u8) -> LatLong {
    let n = PI - 2.0 * PI * y / tile_count(zoom);
    let latitude = (0.5 * (n.exp() - (-n).exp())).atan().to_degrees();
    let longitude = x / tile_count(zoom) * 360.0 - 180.0;
    LatLong { latitude, longitude }
}

/// `(max - value) / (max - min)`. Returns `min` for an empty range.
pub fn range_mapped_value(value: f64, min: f64, max: f64) -> f64 {
    let denominator = max - min;
    if denominator == 0.0 {
        return min;
    }
    (max - value) / denominator
}

/// Corners of one tile. `lower` is the tile's own north-west corner, `upper` the north-west
/// corner of the diagonal neighbour, i.e. this tile's south-east corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub lower: LatLong,
    pub upper: LatLong,
}

impl TileBounds {
    pub fn new(lower: LatLong, upper: LatLong) -> Self {
        TileBounds { lower, upper }
    }

    /// Indices outside `0..2^zoom` are not rejected; they give bounds beyond the map edge.
    pub fn for_tile(x: i32, y: i32, zoom: u8) -> Self {
        let (x, y) = (f64::from(x), f64::from(y));
        TileBounds {
            lower: corner(x, y, zoom),
            upper: corner(x + 1.0, y + 1.0, zoom),
        }
    }

    /// Bounds of the tile at `zoom` containing the given point.
    pub fn containing(position: LatLong, zoom: u8) -> Self {
        let x = longitude_to_tile_x(position.longitude, zoom);
        let y = latitude_to_tile_y(position.latitude, zoom);
        TileBounds::for_tile(x, y, zoom)
    }

    /// Local x runs from 1 at the west edge to 0 at the east edge, local y from 0 at the north
    /// edge to 1 at the south edge.
    pub fn project(&self, position: LatLong) -> Coordinate {
        Coordinate {
            global: position,
            local: Vec2 {
                x: range_mapped_value(position.longitude, self.lower.longitude, self.upper.longitude),
                y: range_mapped_value(position.latitude, self.upper.latitude, self.lower.latitude),
            },
        }
    }

    pub fn center(&self) -> LatLong {
        LatLong {
            latitude: (self.lower.latitude + self.upper.latitude) / 2.0,
            longitude: (self.lower.longitude + self.upper.longitude) / 2.0,
        }
    }
}
