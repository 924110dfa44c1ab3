//! Deterministic seeding of a circular cluster on the integer lattice.

use nalgebra::{Point2, Vector2};

use crate::body::Body;
use crate::error::ConfigError;
use crate::vector::{perpendicular_cw, unit_or_zero};

/// Canvas center, using integer division so odd sizes round down
pub fn canvas_center(width: u32, height: u32) -> Point2<f64> {
    Point2::new((width / 2) as f64, (height / 2) as f64)
}

/// Number of bodies [`circular_cluster`] seeds for `radius`
///
/// Counts lattice offsets with `i² + j² ≤ r²`, minus the origin.
pub fn cluster_size(radius: u32) -> usize {
    let r = radius as i64;
    let r_sq = r * r;
    (-r..=r)
        .map(|i| (-r..=r).filter(|j| i * i + j * j <= r_sq).count())
        .sum::<usize>()
        - 1
}

/// Seeds one body on every lattice point of a disc around `center`
///
/// Points are visited with `i` from `-radius` to `radius` (outer loop) and
/// `j` likewise (inner loop); the origin is skipped. Each body starts moving
/// clockwise about the center, along `(j, -i)` scaled to `speed`.
///
/// # Examples
///
/// ```
/// use nalgebra::Point2;
/// use starsim::cluster::circular_cluster;
///
/// // Radius 1 gives the four-body diamond
/// let bodies = circular_cluster(1, Point2::new(50.0, 50.0), 0.5, 1.0).unwrap();
/// assert_eq!(bodies.len(), 4);
/// assert_eq!(bodies[0].position, Point2::new(49.0, 50.0));
/// ```
pub fn circular_cluster(
    radius: u32,
    center: Point2<f64>,
    speed: f64,
    mass: f64,
) -> Result<Vec<Body>, ConfigError> {
    if radius == 0 {
        return Err(ConfigError::ZeroClusterRadius);
    }

    let r = radius as i64;
    let r_sq = r * r;

    (-r..=r)
        .flat_map(|i| (-r..=r).map(move |j| (i, j)))
        .filter(|&(i, j)| (i, j) != (0, 0) && i * i + j * j <= r_sq)
        .map(|(i, j)| {
            let offset = Vector2::new(i as f64, j as f64);
            let velocity = unit_or_zero(perpendicular_cw(offset)) * speed;
            Body::new(center + offset, velocity, mass)
        })
        .collect()
}
