//! Plain indexed-triangle geometry export.

use detail_mesh::SurfaceMesh;
use std::io::{self, Write};

/// Write the mesh as OBJ-style `v`/`f` records.
///
/// Positions only; faces use 1-based indices. Attribute channels are not
/// emitted.
///
/// # Errors
///
/// Propagates I/O failures from the writer.
pub fn write_obj<W: Write>(writer: &mut W, mesh: &SurfaceMesh) -> io::Result<()> {
    for vertex in &mesh.vertices {
        writeln!(
            writer,
            "v {} {} {}",
            vertex.position.x, vertex.position.y, vertex.position.z
        )?;
    }
    for face in &mesh.faces {
        writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
    }
    Ok(())
}

/// Output file name with a timestamp suffix, e.g.
/// `model_20260830-153000.obj`.
#[must_use]
pub fn timestamped_name(prefix: &str) -> String {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    format!("{prefix}_{stamp}.obj")
}

#[cfg(test)]
mod tests {
    use super::*;
    use detail_mesh::SurfaceVertex;

    #[test]
    fn test_write_obj() {
        let mut mesh = SurfaceMesh::new();
        mesh.vertices.push(SurfaceVertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(SurfaceVertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(SurfaceVertex::from_coords(0.0, 1.0, 0.5));
        mesh.faces.push([0, 1, 2]);

        let mut buffer = Vec::new();
        write_obj(&mut buffer, &mesh).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "v 0 0 0\nv 1 0 0\nv 0 1 0.5\nf 1 2 3\n");
    }

    #[test]
    fn test_timestamped_name_shape() {
        let name = timestamped_name("synth");
        assert!(name.starts_with("synth_"));
        assert!(name.ends_with(".obj"));
        // prefix + '_' + YYYYmmdd-HHMMSS + ".obj"
        assert_eq!(name.len(), "synth_".len() + 15 + 4);
    }
}
