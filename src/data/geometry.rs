use crate::shape;

/// Geographic position. Equality is exact; use [`LatLong::approx_eq`] when comparing computed values.
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, Copy, PartialEq)]
#[archive(check_bytes)]
pub struct LatLong {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLong {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        LatLong { latitude, longitude }
    }

    pub fn approx_eq(&self, other: &LatLong) -> bool {
        let tolerance = f64::EPSILON * 100.0;
        (self.latitude - other.latitude).abs() < tolerance
            && (self.longitude - other.longitude).abs() < tolerance
    }
}

fn repeats_start(coordinates: &[Coordinate]) -> bool {
    match (coordinates.first(), coordinates.last()) {
        (Some(first), Some(last)) => first.global.approx_eq(&last.global),
        _ => false,
    }
}

/// Position inside the tile after range mapping. Roughly `[0, 1]` on both axes for points in the tile.
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, Copy, PartialEq)]
#[archive(check_bytes)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }
}

#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, Copy, PartialEq)]
#[archive(check_bytes)]
pub struct Coordinate {
    pub global: LatLong,
    pub local: Vec2,
}

/// An ordered run of coordinates. Closed lines do not repeat their first coordinate at the end.
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct Line {
    coordinates: Vec<Coordinate>,
    is_closed: bool,
    is_clockwise: bool,
}

impl Line {
    /// Builds a line and derives its orientation from the local coordinates. A trailing
    /// coordinate at the first one's position is dropped when `is_closed` is set.
    pub fn new(mut coordinates: Vec<Coordinate>, is_closed: bool) -> Self {
        if is_closed && coordinates.len() > 1 && repeats_start(&coordinates) {
            coordinates.pop();
        }
        let is_clockwise = shape::is_clockwise(&coordinates);
        Line {
            coordinates,
            is_closed,
            is_clockwise,
        }
    }

    /// Coordinates in storage order.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    pub fn is_clockwise(&self) -> bool {
        self.is_clockwise
    }

    /// The i-th coordinate in clockwise order, whichever way the line is stored.
    pub fn coordinate(&self, i: usize) -> Option<&Coordinate> {
        if i >= self.coordinates.len() {
            return None;
        }
        if self.is_clockwise {
            self.coordinates.get(i)
        } else {
            self.coordinates.get(self.coordinates.len() - 1 - i)
        }
    }

    pub fn clockwise(&self) -> impl Iterator<Item = &Coordinate> + '_ {
        (0..self.coordinates.len()).filter_map(move |i| self.coordinate(i))
    }

    /// Average of the local positions. Used as the reference point for containment lookups.
    pub fn local_center(&self) -> Option<Vec2> {
        if self.coordinates.is_empty() {
            return None;
        }
        let count = self.coordinates.len() as f64;
        let (x, y) = self.coordinates.iter()
            .fold((0.0, 0.0), |(x, y), c| (x + c.local.x, y + c.local.y));
        Some(Vec2::new(x / count, y / count))
    }
}

#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct Polygon {
    pub outer: Line,
    pub inner: Vec<Line>,
    /// Relation members that belong to this polygon but were not stitched into `outer`:
    /// leftover outer fragments plus every inner member.
    pub unstitched_fragments: u32,
}

/// Geometry of a map element.
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Clone, PartialEq)]
#[archive(bound(serialize = "__S: rkyv::ser::ScratchSpace + rkyv::ser::Serializer"))]
#[archive(check_bytes)]
#[archive_attr(check_bytes(
    bound = "__C: rkyv::validation::ArchiveContext, <__C as rkyv::Fallible>::Error: std::error::Error"
))]
pub enum Geometry {
    Point(Coordinate),
    Ring(Line),
    Polygon(Polygon),
    /// Heterogeneous members of a relation that is not a multipolygon.
    Composite {
        #[omit_bounds]
        #[archive_attr(omit_bounds)]
        components: Vec<Geometry>,
        active: u32,
    },
}

impl Geometry {
    pub fn composite(components: Vec<Geometry>) -> Self {
        Geometry::Composite { components, active: 0 }
    }

    /// The outer line. A bare point has none; a composite answers for its active component.
    pub fn main_segment(&self) -> Option<&Line> {
        match self {
            Geometry::Point(_) => None,
            Geometry::Ring(line) => Some(line),
            Geometry::Polygon(polygon) => Some(&polygon.outer),
            Geometry::Composite { .. } => self.active_component()?.main_segment(),
        }
    }

    pub fn hole_segments(&self) -> &[Line] {
        match self {
            Geometry::Point(_) | Geometry::Ring(_) => &[],
            Geometry::Polygon(polygon) => &polygon.inner,
            Geometry::Composite { .. } => self.active_component()
                .map_or(&[] as &[Line], Geometry::hole_segments),
        }
    }

    pub fn component_count(&self) -> usize {
        match self {
            Geometry::Composite { components, .. } => components.len(),
            _ => 1,
        }
    }

    pub fn active_component(&self) -> Option<&Geometry> {
        match self {
            Geometry::Composite { components, active } => components.get(*active as usize),
            _ => Some(self),
        }
    }

    /// Selects which component of a composite answers segment queries. Returns false and
    /// leaves the selection alone when the index is out of range or this is not a composite.
    pub fn set_active_index(&mut self, index: usize) -> bool {
        match self {
            Geometry::Composite { components, active } if index < components.len() => {
                *active = index as u32;
                true
            }
            _ => false,
        }
    }

    /// A point to represent this geometry in containment lookups.
    pub fn reference_point(&self) -> Option<Vec2> {
        match self {
            Geometry::Point(coordinate) => Some(coordinate.local),
            _ => self.main_segment()?.local_center(),
        }
    }
}
