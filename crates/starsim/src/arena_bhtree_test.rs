use approx::assert_relative_eq;
use nalgebra::{Point2, Vector2};

use crate::arena_bhtree::{BHTree, MAX_DEPTH, Massive, NodeKind, Square};
use crate::forces::Newtonian;

#[derive(Clone, Copy)]
struct TestBody {
    pos: Point2<f64>,
    mass: f64,
}

impl Massive for TestBody {
    fn position(&self) -> Point2<f64> {
        self.pos
    }

    fn mass(&self) -> f64 {
        self.mass
    }
}

fn body(x: f64, y: f64, mass: f64) -> TestBody {
    TestBody {
        pos: Point2::new(x, y),
        mass,
    }
}

/// Irregular but deterministic scatter with varied masses
fn scatter(n: usize) -> Vec<TestBody> {
    (0..n)
        .map(|i| {
            let k = i as f64;
            body(
                (k * 7.3).sin() * 40.0 + k * 0.1,
                (k * 3.1).cos() * 25.0 - k * 0.2,
                1.0 + (i % 5) as f64 * 0.5,
            )
        })
        .collect()
}

#[test]
fn test_empty_tree() {
    let bodies: Vec<TestBody> = vec![];
    let tree = BHTree::build(&bodies);

    assert_eq!(tree.node_count(), 1);
    let root = tree.node(tree.root());
    assert_eq!(root.kind, NodeKind::Empty);
    assert_eq!(root.total_mass, 0.0);
}

#[test]
fn test_single_body() {
    let bodies = vec![body(1.0, 2.0, 3.0)];
    let tree = BHTree::build(&bodies);

    assert_eq!(tree.node_count(), 1);
    let root = tree.node(tree.root());
    assert_eq!(root.kind, NodeKind::Leaf { body_index: 0 });
    assert_eq!(root.total_mass, 3.0);
    assert_eq!(root.center_of_mass, Point2::new(1.0, 2.0));

    // Nothing else to feel
    let law = Newtonian::new(1.0, 0.0);
    assert_eq!(tree.force_on(0, 0.5, &law), Vector2::zeros());
}

#[test]
fn test_enclosing_square_contains_all_bodies() {
    let bodies = scatter(50);
    let square = Square::enclosing(&bodies);

    assert!(bodies.iter().all(|b| square.contains(&b.pos)));
    assert!(square.half_width >= 0.5);
}

#[test]
fn test_every_body_stored_once() {
    let bodies = scatter(64);
    let tree = BHTree::build(&bodies);

    let mut stored = tree.subtree_bodies(tree.root());
    stored.sort_unstable();

    assert_eq!(stored, (0..bodies.len()).collect::<Vec<_>>());
}

#[test]
fn test_aggregates_match_subtree_bodies() {
    let bodies = scatter(80);
    let tree = BHTree::build(&bodies);

    for id in tree.node_ids() {
        let node = tree.node(id);
        let members = tree.subtree_bodies(id);

        let mass: f64 = members.iter().map(|&i| bodies[i].mass).sum();
        assert_relative_eq!(node.total_mass, mass, max_relative = 1e-12);

        if mass > 0.0 {
            let weighted = members
                .iter()
                .fold(Vector2::zeros(), |acc, &i| acc + bodies[i].pos.coords * bodies[i].mass);
            let com = weighted / mass;
            assert_relative_eq!(node.center_of_mass.x, com.x, epsilon = 1e-9);
            assert_relative_eq!(node.center_of_mass.y, com.y, epsilon = 1e-9);
        } else {
            assert_eq!(node.kind, NodeKind::Empty);
        }
    }
}

#[test]
fn test_children_pushed_after_parent() {
    let bodies = scatter(40);
    let tree = BHTree::build(&bodies);

    for id in tree.node_ids() {
        if let NodeKind::Internal { children } = &tree.node(id).kind {
            assert!(children.iter().all(|c| c.index() > id.index()));
        }
    }
}

#[test]
fn test_coincident_bodies_share_a_bucket() {
    let bodies = vec![
        body(5.0, 5.0, 1.0),
        body(5.0, 5.0, 2.0),
        body(-5.0, -5.0, 1.0),
        body(5.0, 5.0, 1.0),
    ];
    let tree = BHTree::build(&bodies);

    let bucket = tree
        .node_ids()
        .find_map(|id| match &tree.node(id).kind {
            NodeKind::Bucket { body_indices } => Some(body_indices.clone()),
            _ => None,
        })
        .expect("coincident bodies should end up in a bucket");
    assert_eq!(bucket, vec![0, 1, 3]);

    // The tree stops splitting at the depth limit
    assert!(tree.node_count() <= 1 + 4 * (MAX_DEPTH + 1));

    let law = Newtonian::new(1.0, 0.1);
    for i in 0..bodies.len() {
        let f = tree.force_on(i, 0.5, &law);
        assert!(f.x.is_finite() && f.y.is_finite());
    }
}

#[test]
fn test_zero_theta_matches_pairwise_sum() {
    let bodies = scatter(30);
    let tree = BHTree::build(&bodies);
    let law = Newtonian::new(0.5, 0.2);

    for (i, b) in bodies.iter().enumerate() {
        let direct = bodies
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .fold(Vector2::zeros(), |acc, (_, o)| {
                acc + law.pair_force(b.pos, b.mass, o.pos, o.mass)
            });
        let tree_force = tree.force_on(i, 0.0, &law);

        assert_relative_eq!(tree_force.x, direct.x, epsilon = 1e-12, max_relative = 1e-9);
        assert_relative_eq!(tree_force.y, direct.y, epsilon = 1e-12, max_relative = 1e-9);
    }
}

#[test]
fn test_distant_group_pulls_toward_its_center() {
    let bodies = vec![
        body(0.0, 0.0, 1.0),
        body(100.0, 1.0, 1.0),
        body(101.0, -1.0, 1.0),
        body(99.0, 0.0, 1.0),
    ];
    let tree = BHTree::build(&bodies);
    let law = Newtonian::new(1.0, 0.0);

    let f = tree.force_on(0, 1.0, &law);
    assert!(f.x > 0.0);
    assert!(f.y.abs() < f.x * 0.01);
}
