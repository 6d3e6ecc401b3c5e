/// Ray-casting point-in-ring test.
/// The ring does not need to repeat its first point at the end.
pub fn point_in_ring(lon: f64, lat: f64, ring: &[(f64, f64)]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];

        if ((yi > lat) != (yj > lat))
            && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Axis-aligned bounding box of a ring, as (min_lon, min_lat, max_lon, max_lat)
pub fn ring_bbox(ring: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    let mut bbox = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for &(lon, lat) in ring {
        bbox.0 = bbox.0.min(lon);
        bbox.1 = bbox.1.min(lat);
        bbox.2 = bbox.2.max(lon);
        bbox.3 = bbox.3.max(lat);
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
    }

    #[test]
    fn test_point_inside_square() {
        assert!(point_in_ring(5.0, 5.0, &square()));
    }

    #[test]
    fn test_point_outside_square() {
        assert!(!point_in_ring(15.0, 5.0, &square()));
        assert!(!point_in_ring(5.0, -1.0, &square()));
    }

    #[test]
    fn test_degenerate_ring() {
        assert!(!point_in_ring(0.0, 0.0, &[(1.0, 1.0), (2.0, 2.0)]));
    }

    #[test]
    fn test_ring_bbox() {
        let (min_lon, min_lat, max_lon, max_lat) = ring_bbox(&square());
        assert_eq!((min_lon, min_lat, max_lon, max_lat), (0.0, 0.0, 10.0, 10.0));
    }
}
