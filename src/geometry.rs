//! Planar geometry used for zone containment checks.
//!
//! Points are `(x, y)` tuples; callers pass longitude as `x` and latitude as `y`.

/// Distance under which a point counts as lying on a polygon edge
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Computes the 2D cross product to determine the orientation of a point relative to a line.
///
/// Returns a positive value if the point is to the left of the line (counter-clockwise),
/// negative if to the right (clockwise), and zero if collinear.
#[must_use]
pub fn cross_product_2d(line_start: (f64, f64), line_end: (f64, f64), point: (f64, f64)) -> f64 {
    (line_end.0 - line_start.0) * (point.1 - line_start.1) -
    (line_end.1 - line_start.1) * (point.0 - line_start.0)
}

/// Calculates the minimum distance from a point to a line segment.
///
/// # Arguments
/// * `point` - The point to measure from
/// * `seg_start` - Starting point of the line segment
/// * `seg_end` - Ending point of the line segment
#[must_use]
pub fn point_to_line_segment_distance(point: (f64, f64), seg_start: (f64, f64), seg_end: (f64, f64)) -> f64 {
    let dx = seg_end.0 - seg_start.0;
    let dy = seg_end.1 - seg_start.1;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        let px = point.0 - seg_start.0;
        let py = point.1 - seg_start.1;
        return (px * px + py * py).sqrt();
    }

    let t = ((point.0 - seg_start.0) * dx + (point.1 - seg_start.1) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest_x = seg_start.0 + t * dx;
    let closest_y = seg_start.1 + t * dy;

    let px = point.0 - closest_x;
    let py = point.1 - closest_y;
    (px * px + py * py).sqrt()
}

/// Checks whether a point lies inside a simple polygon.
///
/// Uses ray casting; points on an edge count as inside. Polygons with fewer
/// than three vertices contain nothing.
///
/// # Examples
/// ```
/// use route_desk::geometry::point_in_polygon;
///
/// let square = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
/// assert!(point_in_polygon((2.0, 2.0), &square));
/// assert!(!point_in_polygon((5.0, 2.0), &square));
/// ```
#[must_use]
pub fn point_in_polygon(point: (f64, f64), polygon: &[(f64, f64)]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];

        if point_to_line_segment_distance(point, a, b) < BOUNDARY_EPSILON {
            return true;
        }

        // Edge straddles the horizontal ray through the point
        if (a.1 > point.1) != (b.1 > point.1) {
            let orientation = cross_product_2d(b, a, point);
            // Ray crosses the edge when the point is on the correct side given edge direction
            if (orientation > 0.0) == (a.1 > b.1) {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]
    }

    #[test]
    fn test_cross_product_orientation() {
        assert!(cross_product_2d((0.0, 0.0), (1.0, 0.0), (0.5, 1.0)) > 0.0);
        assert!(cross_product_2d((0.0, 0.0), (1.0, 0.0), (0.5, -1.0)) < 0.0);
        assert_eq!(cross_product_2d((0.0, 0.0), (1.0, 0.0), (2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_point_in_square() {
        assert!(point_in_polygon((1.0, 1.0), &square()));
        assert!(point_in_polygon((3.9, 0.1), &square()));
        assert!(!point_in_polygon((-0.1, 2.0), &square()));
        assert!(!point_in_polygon((2.0, 4.5), &square()));
    }

    #[test]
    fn test_point_on_boundary_is_inside() {
        assert!(point_in_polygon((0.0, 2.0), &square()));
        assert!(point_in_polygon((4.0, 4.0), &square()));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upwards
        let u_shape = vec![
            (0.0, 0.0), (6.0, 0.0), (6.0, 6.0), (4.0, 6.0),
            (4.0, 2.0), (2.0, 2.0), (2.0, 6.0), (0.0, 6.0),
        ];
        assert!(point_in_polygon((1.0, 5.0), &u_shape));
        assert!(point_in_polygon((5.0, 5.0), &u_shape));
        assert!(!point_in_polygon((3.0, 4.0), &u_shape));
        assert!(point_in_polygon((3.0, 1.0), &u_shape));
    }

    #[test]
    fn test_degenerate_polygon() {
        assert!(!point_in_polygon((0.0, 0.0), &[(0.0, 0.0), (1.0, 1.0)]));
    }

    #[test]
    fn test_point_to_segment_distance() {
        let d = point_to_line_segment_distance((0.0, 1.0), (-1.0, 0.0), (1.0, 0.0));
        assert!((d - 1.0).abs() < 1e-10);
        let d = point_to_line_segment_distance((3.0, 0.0), (-1.0, 0.0), (1.0, 0.0));
        assert!((d - 2.0).abs() < 1e-10);
    }
}
