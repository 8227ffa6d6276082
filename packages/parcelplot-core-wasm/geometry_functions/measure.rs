use geo::{Area, BoundingRect, Centroid, EuclideanLength};
use geo_types::{Coord, Polygon};

// Measurements taken on a polygon's closed exterior ring in a projected,
// metric coordinate system. A ring with N vertices (closing vertex included)
// has N - 1 sides; the geometry library keeps the ring closed for us.

// Euclidean length of every side, in ring order
pub fn side_lengths(polygon: &Polygon<f64>) -> Vec<f64> {
    polygon
        .exterior()
        .lines()
        .map(|line| line.euclidean_length())
        .collect()
}

// Midpoint of every side, parallel to side_lengths
pub fn side_midpoints(polygon: &Polygon<f64>) -> Vec<Coord<f64>> {
    polygon
        .exterior()
        .lines()
        .map(|line| Coord {
            x: (line.start.x + line.end.x) / 2.0,
            y: (line.start.y + line.end.y) / 2.0,
        })
        .collect()
}

// Unsigned area of the polygon, holes subtracted
pub fn area(polygon: &Polygon<f64>) -> f64 {
    polygon.unsigned_area()
}

// Anchor point for the area label: the centroid, or the bounding-box center
// when the centroid is undefined (degenerate ring)
pub fn area_label_anchor(polygon: &Polygon<f64>) -> Coord<f64> {
    if let Some(centroid) = polygon.centroid() {
        return Coord {
            x: centroid.x(),
            y: centroid.y(),
        };
    }
    match polygon.bounding_rect() {
        Some(rect) => rect.center(),
        None => Coord { x: 0.0, y: 0.0 },
    }
}
