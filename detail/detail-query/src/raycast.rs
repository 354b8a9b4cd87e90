//! Finite-segment intersection against a candidate mesh.

use crate::{QueryError, QueryResult};
use detail_mesh::{Aabb, SurfaceMesh};
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

const MAX_LEAF_SIZE: usize = 8;
const SEGMENT_EPSILON: f64 = 1e-10;

/// BVH node over triangle bounds.
#[derive(Debug)]
enum Node {
    Leaf {
        bbox: Aabb,
        triangles: SmallVec<[u32; 8]>,
    },
    Internal {
        bbox: Aabb,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Accelerated finite-segment intersection queries against a fixed mesh.
///
/// The displacement baker probes the auxiliary high-detail surface with
/// short segments along interpolated normals; this structure answers those
/// probes via a median-split BVH over the candidate mesh's triangles.
///
/// # Example
///
/// ```
/// use detail_mesh::{SurfaceMesh, SurfaceVertex};
/// use detail_query::SegmentTester;
/// use nalgebra::Point3;
///
/// let mut mesh = SurfaceMesh::new();
/// mesh.vertices.push(SurfaceVertex::from_coords(-1.0, -1.0, 0.5));
/// mesh.vertices.push(SurfaceVertex::from_coords(2.0, -1.0, 0.5));
/// mesh.vertices.push(SurfaceVertex::from_coords(0.0, 2.0, 0.5));
/// mesh.faces.push([0, 1, 2]);
///
/// let tester = SegmentTester::new(&mesh).unwrap();
/// let hit = tester
///     .intersect(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0))
///     .unwrap();
/// assert!((hit.z - 0.5).abs() < 1e-10);
/// ```
#[derive(Debug)]
pub struct SegmentTester {
    root: Node,
    triangles: Vec<[Point3<f64>; 3]>,
}

impl SegmentTester {
    /// Build the acceleration structure over a candidate mesh.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyMesh`] if the mesh has no faces.
    pub fn new(mesh: &SurfaceMesh) -> QueryResult<Self> {
        if mesh.faces.is_empty() {
            return Err(QueryError::EmptyMesh);
        }

        let triangles: Vec<[Point3<f64>; 3]> = mesh
            .faces
            .iter()
            .map(|face| {
                [
                    mesh.vertices[face[0] as usize].position,
                    mesh.vertices[face[1] as usize].position,
                    mesh.vertices[face[2] as usize].position,
                ]
            })
            .collect();

        let bounds: Vec<Aabb> = triangles
            .iter()
            .map(|tri| Aabb::from_points(tri.iter()))
            .collect();
        let indices: Vec<usize> = (0..triangles.len()).collect();
        let root = build_recursive(&bounds, indices);

        Ok(Self { root, triangles })
    }

    /// Nearest intersection of the segment `origin -> end` with the mesh.
    ///
    /// Returns the hit point closest to `origin`, or `None` if no triangle
    /// intersects the segment. Hits at parameter `t <= ~0` (behind or at
    /// the origin) are ignored, as are hits past the end point.
    #[must_use]
    pub fn intersect(&self, origin: Point3<f64>, end: Point3<f64>) -> Option<Point3<f64>> {
        let direction = end - origin;
        if direction.norm_squared() < SEGMENT_EPSILON {
            return None;
        }

        let mut best_t: Option<f64> = None;
        self.intersect_node(&self.root, origin, direction, &mut best_t);
        best_t.map(|t| origin + direction * t)
    }

    fn intersect_node(
        &self,
        node: &Node,
        origin: Point3<f64>,
        direction: Vector3<f64>,
        best_t: &mut Option<f64>,
    ) {
        let t_max = best_t.unwrap_or(1.0);
        if !segment_hits_aabb(node.bbox(), origin, direction, t_max) {
            return;
        }
        match node {
            Node::Leaf { triangles, .. } => {
                for &tri_idx in triangles {
                    let [v0, v1, v2] = self.triangles[tri_idx as usize];
                    if let Some(t) = segment_triangle_intersect(origin, direction, v0, v1, v2) {
                        if best_t.is_none_or(|b| t < b) {
                            *best_t = Some(t);
                        }
                    }
                }
            }
            Node::Internal { left, right, .. } => {
                self.intersect_node(left, origin, direction, best_t);
                self.intersect_node(right, origin, direction, best_t);
            }
        }
    }
}

fn build_recursive(bounds: &[Aabb], indices: Vec<usize>) -> Node {
    let mut bbox = Aabb::empty();
    for &i in &indices {
        bbox.expand_point(&bounds[i].min);
        bbox.expand_point(&bounds[i].max);
    }

    if indices.len() <= MAX_LEAF_SIZE {
        #[allow(clippy::cast_possible_truncation)]
        let triangles: SmallVec<[u32; 8]> = indices.iter().map(|&i| i as u32).collect();
        return Node::Leaf { bbox, triangles };
    }

    // Split along the longest axis at the median triangle center.
    let extent = bbox.max - bbox.min;
    let axis = if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    };

    let mut sorted = indices;
    sorted.sort_by(|&a, &b| {
        let ca = nalgebra::center(&bounds[a].min, &bounds[a].max)[axis];
        let cb = nalgebra::center(&bounds[b].min, &bounds[b].max)[axis];
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid = sorted.len() / 2;
    let right_indices = sorted.split_off(mid);
    let left = build_recursive(bounds, sorted);
    let right = build_recursive(bounds, right_indices);

    Node::Internal {
        bbox,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Slab test for segment/AABB overlap within `t` in `[0, t_max]`.
fn segment_hits_aabb(
    bbox: &Aabb,
    origin: Point3<f64>,
    direction: Vector3<f64>,
    t_max: f64,
) -> bool {
    let mut t0 = 0.0f64;
    let mut t1 = t_max;
    for axis in 0..3 {
        let d = direction[axis];
        let o = origin[axis];
        if d.abs() < SEGMENT_EPSILON {
            if o < bbox.min[axis] || o > bbox.max[axis] {
                return false;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut near = (bbox.min[axis] - o) * inv;
        let mut far = (bbox.max[axis] - o) * inv;
        if near > far {
            std::mem::swap(&mut near, &mut far);
        }
        t0 = t0.max(near);
        t1 = t1.min(far);
        if t0 > t1 {
            return false;
        }
    }
    true
}

/// Möller–Trumbore restricted to the segment parameter range `(ε, 1]`.
fn segment_triangle_intersect(
    origin: Point3<f64>,
    direction: Vector3<f64>,
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
) -> Option<f64> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = direction.cross(&edge2);
    let a = edge1.dot(&h);

    // Segment is parallel to the triangle plane
    if a.abs() < SEGMENT_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    if t > SEGMENT_EPSILON && t <= 1.0 {
        Some(t)
    } else {
        None
    }
}
