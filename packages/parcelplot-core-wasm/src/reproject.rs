use geo::MapCoords;
use geo_types::{Coord, MultiPolygon};

// Forward Transverse Mercator on the WGS84 ellipsoid (Snyder series),
// fixed to UTM zone 33N (EPSG:32633). Implemented directly instead of
// binding a C projection library, which does not build for wasm.

// WGS84 ellipsoid
const SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;

// UTM zone 33, northern hemisphere
const SCALE_FACTOR: f64 = 0.9996;
const CENTRAL_MERIDIAN_DEG: f64 = 15.0;
const FALSE_EASTING_M: f64 = 500_000.0;
const FALSE_NORTHING_M: f64 = 0.0;

// First eccentricity squared
fn eccentricity_squared() -> f64 {
    FLATTENING * (2.0 - FLATTENING)
}

// Meridian arc length from the equator to the given latitude (radians)
fn meridian_arc(lat: f64) -> f64 {
    let e2 = eccentricity_squared();
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    SEMI_MAJOR_AXIS_M
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat).sin())
}

// Project one WGS84 lon/lat coordinate (degrees) to UTM zone 33N meters
pub fn lnglat_to_utm33n(lng: f64, lat: f64) -> (f64, f64) {
    let e2 = eccentricity_squared();
    let ep2 = e2 / (1.0 - e2);

    let lat_rad = lat.to_radians();
    let dlng = (lng - CENTRAL_MERIDIAN_DEG).to_radians();

    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let tan_lat = lat_rad.tan();

    // Radius of curvature in the prime vertical
    let nu = SEMI_MAJOR_AXIS_M / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t = tan_lat * tan_lat;
    let c = ep2 * cos_lat * cos_lat;
    let a = dlng * cos_lat;

    let easting = FALSE_EASTING_M
        + SCALE_FACTOR
            * nu
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);

    let northing = FALSE_NORTHING_M
        + SCALE_FACTOR
            * (meridian_arc(lat_rad)
                + nu * tan_lat
                    * (a * a / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6)
                            / 720.0));

    (easting, northing)
}

// Reproject every coordinate of a multi-polygon into the target zone
pub fn reproject_multi_polygon(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    geometry.map_coords(|Coord { x, y }| {
        let (easting, northing) = lnglat_to_utm33n(x, y);
        Coord {
            x: easting,
            y: northing,
        }
    })
}
