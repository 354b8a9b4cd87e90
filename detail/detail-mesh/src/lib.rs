//! Core mesh types for the detail-transfer pipeline.
//!
//! This crate provides the foundational types consumed by the bake and
//! synthesis crates:
//!
//! - [`SurfaceMesh`] - An indexed triangle mesh with per-vertex normals
//! - [`VertexChannels`] - A strongly-typed per-vertex attribute registry
//! - [`Aabb`] - Axis-aligned bounding box with a probe radius
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no engine or GUI dependencies. It can be
//! used from CLI tools, servers and tests alike.
//!
//! # Attribute Channels
//!
//! Geometric feature providers (height, symmetry, occlusion, curvature)
//! run outside this workspace and deposit their outputs into
//! [`VertexChannels`]. The registry is validated once at pipeline start via
//! [`VertexChannels::validate_features`]; downstream rasters never perform
//! per-access lookups by name.
//!
//! # Example
//!
//! ```
//! use detail_mesh::{SurfaceMesh, SurfaceVertex};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut mesh = SurfaceMesh::new();
//! mesh.vertices.push(SurfaceVertex::new(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Vector3::z(),
//! ));
//! mesh.vertices.push(SurfaceVertex::new(
//!     Point3::new(1.0, 0.0, 0.0),
//!     Vector3::z(),
//! ));
//! mesh.vertices.push(SurfaceVertex::new(
//!     Point3::new(0.0, 1.0, 0.0),
//!     Vector3::z(),
//! ));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod channels;
mod error;
mod mesh;
mod vertex;

pub use bounds::Aabb;
pub use channels::VertexChannels;
pub use error::{MeshError, MeshResult};
pub use mesh::{displaced_copy, SurfaceMesh};
pub use vertex::SurfaceVertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};
