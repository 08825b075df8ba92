//! Winding-number point-in-polygon test
//!
//! Works on the 2-D projection of a contour into its own surface basis.
//! Each contour vertex is assigned a quadrant relative to the test point;
//! walking the closed contour, quadrant changes accumulate quarter turns.
//! A jump across two quadrants is resolved by the orientation of the edge
//! relative to the point. Points on the contour itself count as inside.

use nalgebra::Vector2;

/// Quadrant of `node` around `point`
///
/// The half-open bounds put every node that differs from `point` in exactly
/// one quadrant, so axis-aligned edges are never counted twice.
fn quadrant(point: &Vector2<f64>, node: &Vector2<f64>) -> i32 {
    if node.x > point.x && node.y >= point.y {
        0
    } else if node.x <= point.x && node.y > point.y {
        1
    } else if node.x < point.x && node.y <= point.y {
        2
    } else {
        3
    }
}

/// z-component of `(prev - point) × (next - point)`
fn orientation(point: &Vector2<f64>, prev: &Vector2<f64>, next: &Vector2<f64>) -> f64 {
    let a = prev - point;
    let b = next - point;
    a.x * b.y - a.y * b.x
}

/// Quarter turns swept by the edge `prev -> next`, or `None` if `point`
/// lies on the edge
fn winding_change(point: &Vector2<f64>, prev: &Vector2<f64>, next: &Vector2<f64>) -> Option<i32> {
    match (quadrant(point, next) - quadrant(point, prev)).rem_euclid(4) {
        0 => Some(0),
        1 => Some(1),
        3 => Some(-1),
        _ => {
            let cross = orientation(point, prev, next);
            if cross == 0.0 {
                None
            } else if cross > 0.0 {
                Some(2)
            } else {
                Some(-2)
            }
        }
    }
}

/// True if `point` is enclosed by (or lies on) the closed `contour`
pub fn contains(point: &Vector2<f64>, contour: &[Vector2<f64>]) -> bool {
    let n = contour.len();
    if n < 3 {
        return false;
    }

    let mut quarter_turns = 0;
    for (idx, prev) in contour.iter().enumerate() {
        if prev == point {
            return true;
        }
        let next = &contour[(idx + 1) % n];
        match winding_change(point, prev, next) {
            Some(change) => quarter_turns += change,
            None => return true,
        }
    }

    (quarter_turns / 4) % 2 != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn square() -> Vec<Vector2<f64>> {
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ]
    }

    // Concave "L": the notch (1..2, 1..2) is outside
    fn l_shape() -> Vec<Vector2<f64>> {
        vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 0.0),
            Vector2::new(2.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 2.0),
            Vector2::new(0.0, 2.0),
        ]
    }

    #[rstest]
    #[case(0.5, 0.5, true)]
    #[case(0.001, 0.999, true)]
    #[case(1.5, 0.5, false)]
    #[case(-0.1, 0.5, false)]
    #[case(0.5, 12.0, false)]
    #[case(2.0, 2.0, false)]
    fn test_square(#[case] x: f64, #[case] y: f64, #[case] inside: bool) {
        let contour = square();
        assert_eq!(contains(&Vector2::new(x, y), &contour), inside);
        // Winding direction does not change membership
        let reversed: Vec<_> = contour.into_iter().rev().collect();
        assert_eq!(contains(&Vector2::new(x, y), &reversed), inside);
    }

    #[rstest]
    #[case(0.5, 0.5, true)]
    #[case(1.5, 0.5, true)]
    #[case(0.5, 1.5, true)]
    #[case(1.5, 1.5, false)]
    #[case(1.01, 1.01, false)]
    #[case(2.5, 0.5, false)]
    fn test_concave_polygon(#[case] x: f64, #[case] y: f64, #[case] inside: bool) {
        assert_eq!(contains(&Vector2::new(x, y), &l_shape()), inside);
    }

    #[rstest]
    #[case(0.5, 0.0)]
    #[case(1.0, 0.5)]
    #[case(0.0, 0.3)]
    #[case(0.0, 0.0)]
    #[case(1.0, 1.0)]
    fn test_boundary_points_are_inside(#[case] x: f64, #[case] y: f64) {
        assert!(contains(&Vector2::new(x, y), &square()));
    }

    #[test]
    fn test_triangle() {
        let tri = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(0.0, 3.0),
        ];
        assert!(contains(&Vector2::new(1.0, 1.0), &tri));
        assert!(!contains(&Vector2::new(3.0, 2.0), &tri));
    }

    #[test]
    fn test_degenerate_contour() {
        let line = vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)];
        assert!(!contains(&Vector2::new(0.5, 0.0), &line));
    }
}
