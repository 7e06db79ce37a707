//! AOI coordinate validation.

use serde_json::Value;

/// Returns true when every position in every ring is a valid
/// (longitude, latitude) pair. Total over all inputs: empty or malformed
/// input yields false, never a panic.
pub fn verify_coordinates(rings: &[Vec<[f64; 2]>]) -> bool {
    if rings.is_empty() {
        return false;
    }
    rings.iter().all(|ring| {
        !ring.is_empty()
            && ring.iter().all(|&[lon, lat]| {
                lon.is_finite()
                    && lat.is_finite()
                    && (-180.0..=180.0).contains(&lon)
                    && (-90.0..=90.0).contains(&lat)
            })
    })
}

/// Validates a raw JSON coordinates value as it arrives from the command
/// line override. Accepts a single ring (`[[lon, lat], ...]`) or a list
/// of rings, and returns the normalized ring list when valid.
pub fn verify_coordinates_value(value: &Value) -> Option<Vec<Vec<[f64; 2]>>> {
    let rings: Vec<Vec<[f64; 2]>> = match serde_json::from_value(value.clone()) {
        Ok(rings) => rings,
        Err(_) => {
            // Single-ring shorthand.
            let ring: Vec<[f64; 2]> = serde_json::from_value(value.clone()).ok()?;
            vec![ring]
        }
    };
    verify_coordinates(&rings).then_some(rings)
}
