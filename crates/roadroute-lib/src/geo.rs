//! Great-circle distance helpers and coordinate keys.

/// Mean Earth radius in metres used by [`haversine_distance`].
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance in metres between two points given in
/// degrees.
///
/// Symmetric, zero for identical points and satisfies the triangle
/// inequality, which is what makes it a consistent A* heuristic for graphs
/// whose edge weights were produced by this same function.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi * 0.5).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda * 0.5).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.min(1.0).sqrt().asin();
    EARTH_RADIUS_M * c
}

/// Canonical node identifier for a `(longitude, latitude)` pair.
///
/// Ingestion and endpoint lookup must agree on this encoding so that two
/// features sharing a vertex end up on the same node. Whole numbers keep a
/// trailing `.0`, so `(1, 2)` is written `"(1.0, 2.0)"`.
pub fn node_key(lon: f64, lat: f64) -> String {
    format!("({}, {})", coordinate(lon), coordinate(lat))
}

fn coordinate(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
