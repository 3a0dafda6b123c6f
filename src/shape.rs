//! Orientation, area and containment over rings.
//!
//! Local coordinates come out of the tile projection with both axes inverted relative to
//! longitude/latitude (see [`crate::tile`]). Inverting both axes is a half-turn, so a ring has
//! the same orientation in local and in global space, while "clockwise" here means clockwise
//! with the y axis pointing up.

use crate::data::geometry::{Coordinate, Line, Vec2};

/// Scale applied to global (degree squared) areas to get the integer areas stored on elements.
pub const GLOBAL_AREA_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// Projected tile-local positions.
    Local,
    /// Longitude as x, latitude as y.
    Global,
}

fn position(coordinate: &Coordinate, space: Space) -> (f64, f64) {
    match space {
        Space::Local => (coordinate.local.x, coordinate.local.y),
        Space::Global => (coordinate.global.longitude, coordinate.global.latitude),
    }
}

/// Raw shoelace sum, `(x[next] - x[i]) * (y[next] + y[i])` over every edge including the one
/// closing the ring. This is twice the signed area, positive for clockwise rings.
pub fn shoelace_sum(coordinates: &[Coordinate], space: Space) -> f64 {
    let count = coordinates.len();
    (0..count)
        .map(|i| {
            let (x0, y0) = position(&coordinates[i], space);
            let (x1, y1) = position(&coordinates[(i + 1) % count], space);
            (x1 - x0) * (y1 + y0)
        })
        .sum()
}

pub fn is_clockwise(coordinates: &[Coordinate]) -> bool {
    shoelace_sum(coordinates, Space::Local) > 0.0
}

/// Unsigned area of the ring in the units of `space`.
pub fn area(line: &Line, space: Space) -> f64 {
    shoelace_sum(line.coordinates(), space).abs() / 2.0
}

/// Unsigned area multiplied by `scale`. Callers working in [`Space::Global`] usually want
/// [`GLOBAL_AREA_SCALE`].
pub fn scaled_area(line: &Line, space: Space, scale: f64) -> f64 {
    area(line, space) * scale
}

/// Even-odd ray cast in local space. Edges with no height never count as crossings, and the
/// result for self-intersecting rings is whatever the crossing count says.
pub fn contains_point(line: &Line, point: Vec2) -> bool {
    let coordinates = line.coordinates();
    let count = coordinates.len();
    if count < 3 {
        return false;
    }

    let mut inside = false;
    let mut previous = coordinates[count - 1].local;
    for coordinate in coordinates {
        let current = coordinate.local;
        let height = previous.y - current.y;
        if height != 0.0 && (current.y > point.y) != (previous.y > point.y) {
            let crossing_x = (previous.x - current.x) * (point.y - current.y) / height + current.x;
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        previous = current;
    }
    inside
}

/// Containment that also respects holes: inside the outer ring and outside every hole.
pub fn contains_point_with_holes(outer: &Line, holes: &[Line], point: Vec2) -> bool {
    contains_point(outer, point) && !holes.iter().any(|hole| contains_point(hole, point))
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::data::geometry::LatLong;
    use crate::tile::TileBounds;

    fn local(x: f64, y: f64) -> Coordinate {
        Coordinate {
            global: LatLong::new(y, x),
            local: Vec2::new(x, y),
        }
    }

    fn ring(pts: &[(f64, f64)]) -> Line {
        Line::new(pts.iter().map(|(x, y)| local(*x, *y)).collect(), true)
    }

    #[test]
    fn orientation_follows_shoelace_sign() {
        // Up, right, down: clockwise with y pointing up.
        let cw = ring(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]);
        assert!(cw.is_clockwise());
        assert_eq!(shoelace_sum(cw.coordinates(), Space::Local), 8.0);
        assert_eq!(area(&cw, Space::Local), 4.0);

        let ccw = ring(&[(2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)]);
        assert!(!ccw.is_clockwise());
        assert_eq!(area(&ccw, Space::Local), 4.0);
        assert_eq!(scaled_area(&ccw, Space::Local, 10.0), 40.0);
    }

    #[test]
    fn orientation_matches_sign_for_random_triangles() {
        let mut rng = XorShiftRng::from_seed([42; 16]);
        for _ in 0..500 {
            let pts: Vec<(f64, f64)> = (0..3).map(|_| (rng.gen::<f64>(), rng.gen::<f64>())).collect();
            let line = ring(&pts);
            let sum = shoelace_sum(line.coordinates(), Space::Local);
            if sum.abs() < 1e-9 {
                continue;
            }
            assert_eq!(line.is_clockwise(), sum > 0.0);
        }
    }

    #[test]
    fn projection_inverts_both_axes_so_orientation_survives() {
        let bounds = TileBounds::for_tile(36232, 22913, 16);
        let lat0 = bounds.upper.latitude;
        let lon0 = bounds.lower.longitude;
        let dlat = (bounds.lower.latitude - bounds.upper.latitude) / 4.0;
        let dlon = (bounds.upper.longitude - bounds.lower.longitude) / 4.0;

        // Clockwise with north up: north, then east, then south.
        let geographic = [
            LatLong::new(lat0 + dlat, lon0 + dlon),
            LatLong::new(lat0 + 3.0 * dlat, lon0 + dlon),
            LatLong::new(lat0 + 3.0 * dlat, lon0 + 3.0 * dlon),
            LatLong::new(lat0 + dlat, lon0 + 3.0 * dlon),
        ];
        let coordinates: Vec<_> = geographic.iter().map(|ll| bounds.project(*ll)).collect();

        // Local x shrinks going east and local y grows going south.
        assert!(coordinates[2].local.x < coordinates[1].local.x);
        assert!(coordinates[0].local.y > coordinates[1].local.y);

        let global = shoelace_sum(&coordinates, Space::Global);
        let local = shoelace_sum(&coordinates, Space::Local);
        assert!(global > 0.0);
        assert!(local > 0.0);
        assert!(Line::new(coordinates, true).is_clockwise());
    }

    #[test]
    fn convex_polygon_containment() {
        let hexagon = ring(&[
            (0.25, 0.0), (0.75, 0.0), (1.0, 0.5), (0.75, 1.0), (0.25, 1.0), (0.0, 0.5),
        ]);
        let mut rng = XorShiftRng::from_seed([7; 16]);
        for _ in 0..500 {
            // Strictly inside the inner square of the hexagon.
            let inside = Vec2::new(0.3 + rng.gen::<f64>() * 0.4, 0.05 + rng.gen::<f64>() * 0.9);
            assert!(contains_point(&hexagon, inside), "{inside:?}");

            // Outside the bounding box.
            let outside = Vec2::new(1.0 + rng.gen::<f64>() + 1e-6, rng.gen::<f64>() * 3.0 - 1.0);
            assert!(!contains_point(&hexagon, outside), "{outside:?}");
            let below = Vec2::new(rng.gen::<f64>(), -1e-6 - rng.gen::<f64>());
            assert!(!contains_point(&hexagon, below), "{below:?}");
        }
    }

    #[test]
    fn horizontal_edges_do_not_divide_by_zero() {
        // Two vertices share y = 0.5, the query point's y.
        let shape = ring(&[(0.0, 0.0), (0.0, 0.5), (1.0, 0.5), (1.0, 1.0), (2.0, 1.0), (2.0, 0.0)]);
        let on_edge_height = Vec2::new(0.5, 0.5);
        let _ = contains_point(&shape, on_edge_height);
        assert!(contains_point(&shape, Vec2::new(1.5, 0.5)));
        assert!(!contains_point(&shape, Vec2::new(3.0, 0.5)));

        let flat = ring(&[(0.0, 0.5), (1.0, 0.5), (2.0, 0.5)]);
        assert!(!contains_point(&flat, Vec2::new(0.5, 0.5)));
    }

    #[test]
    fn holes_exclude_points() {
        let outer = ring(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)]);
        let hole = ring(&[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]);
        assert!(contains_point_with_holes(&outer, &[], Vec2::new(2.0, 2.0)));
        assert!(!contains_point_with_holes(&outer, &[hole.clone()], Vec2::new(2.0, 2.0)));
        assert!(contains_point_with_holes(&outer, &[hole], Vec2::new(0.5, 2.0)));
    }

    #[test]
    fn degenerate_rings_are_never_containers() {
        let pair = ring(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(!contains_point(&pair, Vec2::new(0.5, 0.5)));
        assert_eq!(shoelace_sum(&[], Space::Local), 0.0);
    }
}
