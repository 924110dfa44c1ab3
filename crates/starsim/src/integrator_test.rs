use approx::assert_relative_eq;
use nalgebra::{Point2, Vector2};

use crate::body::{Body, total_kinetic_energy, total_momentum};
use crate::forces::{ExactGravity, ForceModel, Newtonian};
use crate::integrator::{ExplicitEuler, Integrator, SymplecticEuler};

/// Light body on a near-circular orbit around a heavy one, center of mass at rest
fn make_orbit() -> Vec<Body> {
    vec![
        Body::new(Point2::new(0.0, 0.0), Vector2::new(0.0, -0.01), 1000.0).unwrap(),
        Body::new(Point2::new(10.0, 0.0), Vector2::new(0.0, 10.0), 1.0).unwrap(),
    ]
}

fn total_energy(bodies: &[Body], force: &dyn ForceModel) -> f64 {
    total_kinetic_energy(bodies) + force.potential_energy(bodies)
}

fn integrate(
    integrator: &dyn Integrator,
    bodies: &mut [Body],
    dt: f64,
    n_steps: usize,
    force: &dyn ForceModel,
) {
    for _ in 0..n_steps {
        let forces = force.forces(bodies);
        integrator.advance(bodies, &forces, dt);
    }
}

fn energy_drift(integrator: &dyn Integrator) -> f64 {
    let mut bodies = make_orbit();
    let force = ExactGravity::new(Newtonian::new(1.0, 0.0));

    let initial = total_energy(&bodies, &force);
    integrate(integrator, &mut bodies, 0.01, 2000, &force);
    let last = total_energy(&bodies, &force);

    ((last - initial) / initial).abs()
}

#[test]
fn test_symplectic_kick_then_drift() {
    let mut bodies = [Body::new(Point2::new(1.0, 1.0), Vector2::new(1.0, 0.0), 2.0).unwrap()];
    let forces = [Vector2::new(2.0, -4.0)];

    SymplecticEuler.advance(&mut bodies, &forces, 0.5);

    assert_eq!(bodies[0].velocity, Vector2::new(1.5, -1.0));
    assert_eq!(bodies[0].position, Point2::new(1.75, 0.5));
}

#[test]
fn test_explicit_drift_then_kick() {
    let mut bodies = [Body::new(Point2::new(1.0, 1.0), Vector2::new(1.0, 0.0), 2.0).unwrap()];
    let forces = [Vector2::new(2.0, -4.0)];

    ExplicitEuler.advance(&mut bodies, &forces, 0.5);

    assert_eq!(bodies[0].position, Point2::new(1.5, 1.0));
    assert_eq!(bodies[0].velocity, Vector2::new(1.5, -1.0));
}

#[test]
fn test_zero_force_moves_in_straight_line() {
    let mut bodies = [Body::new(Point2::new(0.0, 0.0), Vector2::new(0.5, -0.25), 1.0).unwrap()];

    for _ in 0..4 {
        SymplecticEuler.advance(&mut bodies, &[Vector2::zeros()], 1.0);
    }

    assert_relative_eq!(bodies[0].position.x, 2.0);
    assert_relative_eq!(bodies[0].position.y, -1.0);
}

#[test]
fn test_symplectic_conserves_energy() {
    let drift = energy_drift(&SymplecticEuler);
    assert!(drift < 1e-3, "Energy drift: {:.2e}", drift);
}

#[test]
fn test_symplectic_beats_explicit() {
    let symplectic = energy_drift(&SymplecticEuler);
    let explicit = energy_drift(&ExplicitEuler);

    assert!(
        explicit > 10.0 * symplectic,
        "explicit {:.2e} vs symplectic {:.2e}",
        explicit,
        symplectic
    );
}

#[test]
fn test_momentum_conserved_over_orbit() {
    let mut bodies = make_orbit();
    let force = ExactGravity::new(Newtonian::new(1.0, 0.0));

    let initial = total_momentum(&bodies);
    integrate(&SymplecticEuler, &mut bodies, 0.01, 500, &force);
    let last = total_momentum(&bodies);

    assert!((last - initial).magnitude() < 1e-9);
}
