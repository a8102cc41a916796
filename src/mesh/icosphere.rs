//! Subdivided icosahedron generator.

use glam::Vec3;
use std::collections::HashMap;

use super::{Mesh, RestShape};

/// Build an icosphere of `radius` with `detail` subdivision passes
///
/// Each pass splits every triangle into four, projecting new vertices onto the
/// sphere. Shared edges reuse their midpoint, so the result has
/// `10 * 4^detail + 2` vertices and `20 * 4^detail` triangles.
pub fn icosphere(radius: f32, detail: u32) -> Mesh {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;

    let mut vertices: Vec<Vec3> = [
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ]
    .iter()
    .map(|&p| Vec3::from_array(p).normalize())
    .collect();

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..detail {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut next = Vec::with_capacity(faces.len() * 4);

        for &[a, b, c] in &faces {
            let ab = midpoint(&mut vertices, &mut midpoints, a, b);
            let bc = midpoint(&mut vertices, &mut midpoints, b, c);
            let ca = midpoint(&mut vertices, &mut midpoints, c, a);

            next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        faces = next;
    }

    Mesh {
        rest: RestShape::new(vertices.into_iter().map(|v| v * radius).collect()),
        indices: faces.into_iter().flatten().collect(),
    }
}

/// Index of the unit-sphere midpoint of edge (a, b), creating it once
fn midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = (a.min(b), a.max(b));
    *cache.entry(key).or_insert_with(|| {
        let mid = (vertices[a as usize] + vertices[b as usize]).normalize();
        vertices.push(mid);
        (vertices.len() - 1) as u32
    })
}
