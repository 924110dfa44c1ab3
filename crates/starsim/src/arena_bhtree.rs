//! Arena-based Barnes-Hut quadtree.
//!
//! Nodes are stored contiguously in a `Vec` and reference each other by
//! index, so a tree is one allocation that is built, queried and dropped as a
//! unit. The engine builds a fresh tree every step; nothing is carried over.
//!
//! # Construction
//!
//! 1. A padded bounding square is computed around all bodies.
//! 2. Bodies are inserted one at a time, in slice order. Inserting into an
//!    occupied leaf splits it into four children and moves the resident down.
//!    At [`MAX_DEPTH`] a leaf becomes a bucket instead, which is how
//!    coincident bodies are handled.
//! 3. Total mass and center of mass are aggregated bottom-up. Children are
//!    always pushed after their parent, so one reverse sweep over the arena
//!    visits every child before its parent.
//!
//! # Example
//!
//! ```rust
//! use nalgebra::{Point2, Vector2};
//! use starsim::arena_bhtree::BHTree;
//! use starsim::body::Body;
//! use starsim::forces::Newtonian;
//!
//! let bodies = vec![
//!     Body::new(Point2::new(0.0, 0.0), Vector2::zeros(), 10.0).unwrap(),
//!     Body::new(Point2::new(5.0, 0.0), Vector2::zeros(), 1.0).unwrap(),
//! ];
//!
//! let tree = BHTree::build(&bodies);
//! let law = Newtonian::new(1.0, 0.0);
//!
//! // The light body is pulled toward the heavy one
//! let force = tree.force_on(1, 0.5, &law);
//! assert!(force.x < 0.0);
//! ```

use nalgebra::{Point2, Vector2};

use crate::forces::Newtonian;

/// Depth at which leaves stop splitting and collect bodies in a bucket.
pub const MAX_DEPTH: usize = 30;

/// Relative padding added around the bodies' extent
const PADDING: f64 = 0.01;

/// Smallest root half-width, so one body (or a coincident set) still gets a
/// non-degenerate square
const MIN_HALF_WIDTH: f64 = 0.5;

/// Objects that can be placed in the tree: a position and a mass.
pub trait Massive: Copy {
    fn position(&self) -> Point2<f64>;

    fn mass(&self) -> f64;
}

/// An axis-aligned square region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Square {
    pub center: Point2<f64>,
    pub half_width: f64,
}

impl Square {
    pub fn new(center: Point2<f64>, half_width: f64) -> Self {
        Self { center, half_width }
    }

    /// Smallest padded square enclosing every body.
    pub fn enclosing<B: Massive>(bodies: &[B]) -> Self {
        if bodies.is_empty() {
            return Self::new(Point2::origin(), MIN_HALF_WIDTH);
        }

        let (min, max) = bodies.iter().fold(
            (
                Point2::new(f64::INFINITY, f64::INFINITY),
                Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(min, max), body| {
                let p = body.position();
                (
                    Point2::new(min.x.min(p.x), min.y.min(p.y)),
                    Point2::new(max.x.max(p.x), max.y.max(p.y)),
                )
            },
        );

        let extent = (max.x - min.x).max(max.y - min.y);
        let half_width = (0.5 * extent * (1.0 + PADDING)).max(MIN_HALF_WIDTH);
        Self::new(nalgebra::center(&min, &max), half_width)
    }

    /// Side length
    pub fn size(&self) -> f64 {
        2.0 * self.half_width
    }

    /// True when `p` lies inside or on the border
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        (p.x - self.center.x).abs() <= self.half_width
            && (p.y - self.center.y).abs() <= self.half_width
    }

    /// Quadrant (0-3) a point belongs to.
    ///
    /// ```text
    /// +-------+-------+
    /// |   2   |   3   |
    /// +-------+-------+
    /// |   0   |   1   |
    /// +-------+-------+
    /// ```
    fn quadrant(&self, p: &Point2<f64>) -> usize {
        let east = (p.x >= self.center.x) as usize;
        let north = (p.y >= self.center.y) as usize;
        east | (north << 1)
    }

    /// Sub-square for a quadrant, same numbering as `quadrant`
    fn child(&self, quadrant: usize) -> Self {
        let h = 0.5 * self.half_width;
        let dx = if quadrant & 1 != 0 { h } else { -h };
        let dy = if quadrant & 2 != 0 { h } else { -h };
        Self::new(
            Point2::new(self.center.x + dx, self.center.y + dy),
            h,
        )
    }
}

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize, "NodeId overflow");
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node holds.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// No bodies in this region
    Empty,

    /// Exactly one body
    Leaf { body_index: u32 },

    /// Several bodies at [`MAX_DEPTH`], too close to separate
    Bucket { body_indices: Vec<u32> },

    /// Four children: [south-west, south-east, north-west, north-east]
    Internal { children: [NodeId; 4] },
}

/// A region of space with its aggregated mass.
#[derive(Clone, Debug)]
pub struct Node {
    pub bounds: Square,
    /// Sum of the masses of every body in the subtree
    pub total_mass: f64,
    /// Mass-weighted mean position of the subtree (the square's center when empty)
    pub center_of_mass: Point2<f64>,
    pub kind: NodeKind,
}

impl Node {
    fn empty(bounds: Square) -> Self {
        Self {
            bounds,
            total_mass: 0.0,
            center_of_mass: bounds.center,
            kind: NodeKind::Empty,
        }
    }
}

/// Outcome of looking at one node during insertion
enum Slot {
    Vacant,
    Occupied(u32),
    Crowded,
    Descend(NodeId),
}

/// Barnes-Hut quadtree over a borrowed body slice.
///
/// The tree stores indices into `bodies`, so it is only meaningful while the
/// slice is unchanged; the lifetime ties it to that borrow.
pub struct BHTree<'a, B: Massive> {
    nodes: Vec<Node>,
    bodies: &'a [B],
    root: NodeId,
}

impl<'a, B: Massive> BHTree<'a, B> {
    /// Builds a tree over `bodies` inside their enclosing square.
    pub fn build(bodies: &'a [B]) -> Self {
        let bounds = Square::enclosing(bodies);
        let mut tree = BHTree {
            nodes: Vec::with_capacity(2 * bodies.len() + 1),
            bodies,
            root: NodeId::new(0),
        };
        tree.nodes.push(Node::empty(bounds));

        for index in 0..bodies.len() {
            tree.insert(index as u32);
        }
        tree.aggregate();

        tree
    }

    fn insert(&mut self, body_index: u32) {
        let pos = self.bodies[body_index as usize].position();
        let mut id = self.root;
        let mut depth = 0;

        loop {
            let node = &self.nodes[id.index()];
            let slot = match &node.kind {
                NodeKind::Empty => Slot::Vacant,
                NodeKind::Leaf { body_index } => Slot::Occupied(*body_index),
                NodeKind::Bucket { .. } => Slot::Crowded,
                NodeKind::Internal { children } => {
                    Slot::Descend(children[node.bounds.quadrant(&pos)])
                }
            };

            match slot {
                Slot::Vacant => {
                    self.nodes[id.index()].kind = NodeKind::Leaf { body_index };
                    return;
                }
                Slot::Crowded => {
                    if let NodeKind::Bucket { body_indices } = &mut self.nodes[id.index()].kind {
                        body_indices.push(body_index);
                    }
                    return;
                }
                Slot::Occupied(resident) if depth >= MAX_DEPTH => {
                    self.nodes[id.index()].kind = NodeKind::Bucket {
                        body_indices: vec![resident, body_index],
                    };
                    return;
                }
                // Node is internal after the split; the next pass descends
                Slot::Occupied(resident) => self.split(id, resident),
                Slot::Descend(child) => {
                    id = child;
                    depth += 1;
                }
            }
        }
    }

    /// Turns a single-body leaf into an internal node with four children and
    /// moves the resident body into its quadrant.
    fn split(&mut self, id: NodeId, resident: u32) {
        let bounds = self.nodes[id.index()].bounds;
        let first = self.nodes.len();

        self.nodes
            .extend((0..4).map(|q| Node::empty(bounds.child(q))));

        let q = bounds.quadrant(&self.bodies[resident as usize].position());
        self.nodes[first + q].kind = NodeKind::Leaf {
            body_index: resident,
        };

        let children = std::array::from_fn(|q| NodeId::new(first + q));
        self.nodes[id.index()].kind = NodeKind::Internal { children };
    }

    fn aggregate(&mut self) {
        for index in (0..self.nodes.len()).rev() {
            let node = &self.nodes[index];
            let fallback = node.bounds.center;

            let (total_mass, center_of_mass) = match &node.kind {
                NodeKind::Empty => (0.0, fallback),
                NodeKind::Leaf { body_index } => {
                    let body = &self.bodies[*body_index as usize];
                    (body.mass(), body.position())
                }
                NodeKind::Bucket { body_indices } => weighted_mean(
                    body_indices.iter().map(|&i| {
                        let body = &self.bodies[i as usize];
                        (body.mass(), body.position())
                    }),
                    fallback,
                ),
                NodeKind::Internal { children } => weighted_mean(
                    children.iter().map(|child| {
                        let child = &self.nodes[child.index()];
                        (child.total_mass, child.center_of_mass)
                    }),
                    fallback,
                ),
            };

            let node = &mut self.nodes[index];
            node.total_mass = total_mass;
            node.center_of_mass = center_of_mass;
        }
    }

    /// Net force on body `target` from every other body in the tree.
    ///
    /// An internal node that does not contain the target is treated as a
    /// single mass at its center of mass when `size / distance < theta`.
    /// Everything else is opened down to leaves, which interact exactly;
    /// the target's own leaf contributes nothing.
    ///
    /// # Arguments
    ///
    /// * `target` - Index of the body in the slice the tree was built from
    /// * `theta` - Opening angle: 0 is exact, larger is faster and coarser
    /// * `law` - Pairwise force law
    pub fn force_on(&self, target: usize, theta: f64, law: &Newtonian) -> Vector2<f64> {
        let body = &self.bodies[target];
        self.force_recursive(
            self.root,
            target as u32,
            body.position(),
            body.mass(),
            theta,
            law,
        )
    }

    fn force_recursive(
        &self,
        id: NodeId,
        target: u32,
        pos: Point2<f64>,
        mass: f64,
        theta: f64,
        law: &Newtonian,
    ) -> Vector2<f64> {
        let node = &self.nodes[id.index()];

        match &node.kind {
            NodeKind::Empty => Vector2::zeros(),

            NodeKind::Leaf { body_index } if *body_index == target => Vector2::zeros(),

            NodeKind::Leaf { body_index } => {
                let other = &self.bodies[*body_index as usize];
                law.pair_force(pos, mass, other.position(), other.mass())
            }

            NodeKind::Bucket { body_indices } => body_indices
                .iter()
                .filter(|&&i| i != target)
                .map(|&i| {
                    let other = &self.bodies[i as usize];
                    law.pair_force(pos, mass, other.position(), other.mass())
                })
                .fold(Vector2::zeros(), |a, b| a + b),

            NodeKind::Internal { children } => {
                let distance = (node.center_of_mass - pos).magnitude();

                // s/d < θ written without the division, so d = 0 simply opens the node
                if !node.bounds.contains(&pos) && node.bounds.size() < theta * distance {
                    law.pair_force(pos, mass, node.center_of_mass, node.total_mass)
                } else {
                    children
                        .iter()
                        .map(|&child| self.force_recursive(child, target, pos, mass, theta, law))
                        .fold(Vector2::zeros(), |a, b| a + b)
                }
            }
        }
    }

    /// Indices of every body stored below `id`
    pub fn subtree_bodies(&self, id: NodeId) -> Vec<usize> {
        let mut result = Vec::new();
        self.collect_bodies(id, &mut result);
        result
    }

    fn collect_bodies(&self, id: NodeId, result: &mut Vec<usize>) {
        match &self.nodes[id.index()].kind {
            NodeKind::Empty => {}
            NodeKind::Leaf { body_index } => result.push(*body_index as usize),
            NodeKind::Bucket { body_indices } => {
                result.extend(body_indices.iter().map(|&i| i as usize))
            }
            NodeKind::Internal { children } => {
                for &child in children {
                    self.collect_bodies(child, result);
                }
            }
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Node ids in arena order (root first)
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Number of nodes in the arena (for diagnostics)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }
}

fn weighted_mean(
    items: impl Iterator<Item = (f64, Point2<f64>)>,
    fallback: Point2<f64>,
) -> (f64, Point2<f64>) {
    let (mass, weighted) = items.fold((0.0f64, Vector2::zeros()), |(m, w), (mi, pi)| {
        (m + mi, w + pi.coords * mi)
    });

    if mass > 0.0 {
        (mass, Point2::from(weighted / mass))
    } else {
        (0.0, fallback)
    }
}
