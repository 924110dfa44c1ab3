use approx::assert_relative_eq;
use nalgebra::{Point2, Vector2};

use crate::body::Body;
use crate::config::{ModelKind, SimulationConfig};
use crate::forces::{ExactGravity, ForceModel, Gravity, Newtonian};

fn at(x: f64, y: f64, mass: f64) -> Body {
    Body::new(Point2::new(x, y), Vector2::zeros(), mass).unwrap()
}

#[test]
fn test_pair_force_points_toward_other() {
    let law = Newtonian::new(1.0, 0.0);
    let f = law.pair_force(Point2::new(0.0, 0.0), 1.0, Point2::new(0.0, -2.0), 1.0);

    assert_eq!(f.x, 0.0);
    assert_relative_eq!(f.y, -0.25);
}

#[test]
fn test_pair_force_inverse_square() {
    let law = Newtonian::new(1.0, 0.0);
    let origin = Point2::origin();

    let near = law.pair_force(origin, 1.0, Point2::new(1.0, 0.0), 1.0);
    let far = law.pair_force(origin, 1.0, Point2::new(2.0, 0.0), 1.0);

    assert_relative_eq!(near.x / far.x, 4.0, max_relative = 1e-12);
}

#[test]
fn test_softening_caps_close_force() {
    let soft = Newtonian::new(1.0, 1.0);
    let f = soft.pair_force(Point2::origin(), 1.0, Point2::new(1e-6, 0.0), 1.0);

    assert!(f.x > 0.0);
    assert!(f.x < 1e-5);
}

#[test]
fn test_coincident_without_softening_is_zero() {
    let law = Newtonian::new(1.0, 0.0);
    let p = Point2::new(3.0, 3.0);

    assert_eq!(law.pair_force(p, 1.0, p, 1.0), Vector2::zeros());
    assert_eq!(law.pair_potential(p, 1.0, p, 1.0), 0.0);
}

#[test]
fn test_newtons_third_law() {
    let bodies = vec![at(0.0, 0.0, 1.0), at(3.0, 4.0, 2.0), at(-2.0, 1.0, 0.5)];
    let gravity = ExactGravity::new(Newtonian::new(0.01, 0.5));

    let forces = gravity.forces(&bodies);
    let net = forces.iter().fold(Vector2::zeros(), |acc, f| acc + f);

    assert_eq!(forces.len(), bodies.len());
    assert!(net.magnitude() < 1e-15);
}

#[test]
fn test_single_body_feels_nothing() {
    let gravity = ExactGravity::new(Newtonian::new(1.0, 0.0));
    let forces = gravity.forces(&[at(1.0, 1.0, 1.0)]);

    assert_eq!(forces, vec![Vector2::zeros()]);
}

#[test]
fn test_colocated_bodies_are_finite() {
    let bodies = vec![at(5.0, 5.0, 1.0), at(5.0, 5.0, 1.0), at(6.0, 5.0, 1.0)];

    for softening in [0.0, 0.5] {
        let gravity = ExactGravity::new(Newtonian::new(0.01, softening));
        for f in gravity.forces(&bodies) {
            assert!(f.x.is_finite() && f.y.is_finite());
        }
    }
}

#[test]
fn test_potential_energy_of_pair() {
    let bodies = vec![at(0.0, 0.0, 2.0), at(3.0, 4.0, 3.0)];
    let gravity = ExactGravity::new(Newtonian::new(1.0, 0.0));

    assert_relative_eq!(gravity.potential_energy(&bodies), -6.0 / 5.0);
}

#[test]
fn test_gravity_from_config() {
    let mut config = SimulationConfig::default();
    let exact = Gravity::from_config(&config);
    assert_eq!(exact.kind(), ModelKind::Exact);

    config.model = ModelKind::BarnesHut;
    config.theta = 0.7;
    match Gravity::from_config(&config) {
        Gravity::BarnesHut(tree) => {
            assert_eq!(tree.theta, 0.7);
            assert_eq!(tree.law, Newtonian::new(0.01, 0.5));
        }
        other => panic!("expected Barnes-Hut, got {:?}", other),
    }
}

#[test]
fn test_gravity_dispatches_to_variant() {
    let bodies = vec![at(0.0, 0.0, 1.0), at(2.0, 0.0, 1.0)];
    let law = Newtonian::new(1.0, 0.0);

    let direct = ExactGravity::new(law).forces(&bodies);
    let wrapped = Gravity::Exact(ExactGravity::new(law)).forces(&bodies);

    assert_eq!(direct, wrapped);
}
