pub mod geometry;
pub mod osm;
pub mod semantic;
pub mod tags;

pub use self::geometry::{Coordinate, Geometry, LatLong, Line, Polygon, Vec2};
pub use self::osm::OsmMapData;
pub use self::semantic::{Building, BuildingHeight, Landuse, MapElement, Path, TileMapData};
