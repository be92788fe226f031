use ops_core::{Point2, Polygon2};

/// Convex hull by Andrew's monotone chain.
///
/// Vertices come out counter-clockwise, starting at the lowest-x
/// (then lowest-y) point. Collinear and duplicate points are dropped. Fewer
/// than three distinct points are returned as-is (sorted).
pub fn convex_hull(points: &[Point2]) -> Polygon2 {
    let mut pts: Vec<Point2> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return Polygon2::new(pts);
    }

    let mut lower = half_hull(pts.iter().copied());
    let mut upper = half_hull(pts.iter().rev().copied());
    // Each chain ends where the other starts.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    Polygon2::new(lower)
}

fn half_hull(points: impl Iterator<Item = Point2>) -> Vec<Point2> {
    let mut chain: Vec<Point2> = Vec::new();
    for p in points {
        while let [.., a, b] = chain[..] {
            if (b - a).cross(p - b) > 0.0 {
                break;
            }
            chain.pop();
        }
        chain.push(p);
    }
    chain
}

#[cfg(test)]
mod tests {
    use ops_core::Point2;

    use super::convex_hull;

    #[test]
    fn square_with_interior_and_collinear_points() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(
            hull.vertices,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 2.0),
                Point2::new(0.0, 2.0),
            ]
        );
        assert!(hull.signed_area() > 0.0);
        assert!((hull.area() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(convex_hull(&[]).is_empty());
        let two = convex_hull(&[Point2::new(1.0, 1.0), Point2::new(0.0, 0.0)]);
        assert_eq!(two.vertices, vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        let line = convex_hull(&[
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        ]);
        assert_eq!(line.area(), 0.0);
    }
}
