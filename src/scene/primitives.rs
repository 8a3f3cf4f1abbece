//! Procedural mesh generators
//!
//! Layouts follow the usual WebGL conventions: counter-clockwise front faces,
//! +Y up, UV origin bottom-left.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Triangle mesh with per-vertex normals and UVs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    revision: u64,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bumped whenever vertex data is rewritten in place
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mark_dirty(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        self.uvs.push(uv);
        index
    }
}

/// Flat rectangle in the XY plane facing +Z, centred on the origin
pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let grid_x = width_segments.max(1);
    let grid_y = height_segments.max(1);
    let seg_w = width / grid_x as f32;
    let seg_h = height / grid_y as f32;

    let mut mesh = Mesh::default();

    for iy in 0..=grid_y {
        let y = iy as f32 * seg_h - height * 0.5;
        for ix in 0..=grid_x {
            let x = ix as f32 * seg_w - width * 0.5;
            mesh.push_vertex(
                Vec3::new(x, -y, 0.0),
                Vec3::Z,
                [ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32],
            );
        }
    }

    let row = grid_x + 1;
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = ix + 1 + row * (iy + 1);
            let d = ix + 1 + row * iy;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    mesh
}

const PHI: f32 = 1.618_034;

pub fn icosahedron(radius: f32) -> Mesh {
    let t = PHI;
    let vertices = [
        [-1.0, t, 0.0], [1.0, t, 0.0], [-1.0, -t, 0.0], [1.0, -t, 0.0],
        [0.0, -1.0, t], [0.0, 1.0, t], [0.0, -1.0, -t], [0.0, 1.0, -t],
        [t, 0.0, -1.0], [t, 0.0, 1.0], [-t, 0.0, -1.0], [-t, 0.0, 1.0],
    ];
    let faces = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];
    polyhedron(&vertices, &faces, radius)
}

pub fn octahedron(radius: f32) -> Mesh {
    let vertices = [
        [1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, -1.0],
    ];
    let faces = [
        [0, 2, 4], [0, 4, 3], [0, 3, 5], [0, 5, 2],
        [1, 2, 5], [1, 5, 3], [1, 3, 4], [1, 4, 2],
    ];
    polyhedron(&vertices, &faces, radius)
}

pub fn tetrahedron(radius: f32) -> Mesh {
    let vertices = [[1.0, 1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [1.0, -1.0, -1.0]];
    let faces = [[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]];
    polyhedron(&vertices, &faces, radius)
}

pub fn dodecahedron(radius: f32) -> Mesh {
    let t = PHI;
    let r = 1.0 / t;
    let vertices = [
        [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
        [0.0, -r, -t], [0.0, -r, t], [0.0, r, -t], [0.0, r, t],
        [-r, -t, 0.0], [-r, t, 0.0], [r, -t, 0.0], [r, t, 0.0],
        [-t, 0.0, -r], [t, 0.0, -r], [-t, 0.0, r], [t, 0.0, r],
    ];
    let faces = [
        [3, 11, 7], [3, 7, 15], [3, 15, 13],
        [7, 19, 17], [7, 17, 6], [7, 6, 15],
        [17, 4, 8], [17, 8, 10], [17, 10, 6],
        [8, 0, 16], [8, 16, 2], [8, 2, 10],
        [0, 12, 1], [0, 1, 18], [0, 18, 16],
        [6, 10, 2], [6, 2, 13], [6, 13, 15],
        [2, 16, 18], [2, 18, 3], [2, 3, 13],
        [18, 1, 9], [18, 9, 11], [18, 11, 3],
        [4, 14, 12], [4, 12, 0], [4, 0, 8],
        [11, 9, 5], [11, 5, 19], [11, 19, 7],
        [19, 5, 14], [19, 14, 4], [19, 4, 17],
        [1, 12, 14], [1, 14, 5], [1, 5, 9],
    ];
    polyhedron(&vertices, &faces, radius)
}

/// Flat-shaded polyhedron with every vertex projected onto `radius`
fn polyhedron(vertices: &[[f32; 3]], faces: &[[usize; 3]], radius: f32) -> Mesh {
    let mut mesh = Mesh::default();

    for face in faces {
        let mut corners = face.map(|i| Vec3::from_array(vertices[i]).normalize() * radius);
        let mut normal = (corners[1] - corners[0]).cross(corners[2] - corners[0]).normalize_or_zero();

        let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
        if normal.dot(centroid) < 0.0 {
            corners.swap(1, 2);
            normal = -normal;
        }

        for corner in corners {
            let index = mesh.push_vertex(corner, normal, spherical_uv(corner));
            mesh.indices.push(index);
        }
    }

    mesh
}

fn spherical_uv(p: Vec3) -> [f32; 2] {
    let u = p.z.atan2(-p.x) / TAU + 0.5;
    let v = (-p.y).atan2((p.x * p.x + p.z * p.z).sqrt()) / PI + 0.5;
    [u, v]
}

/// Torus around the Z axis
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Mesh {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);
    let mut mesh = Mesh::default();

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let ring = radius + tube * v.cos();
            let position = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
            let centre = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            mesh.push_vertex(
                position,
                (position - centre).normalize_or_zero(),
                [i as f32 / tubular as f32, j as f32 / radial as f32],
            );
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    mesh
}

/// Cone along +Y with its apex at `height / 2` and a closed base
pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Mesh {
    let radial = radial_segments.max(3);
    let half = height * 0.5;
    let slope = radius / height;
    let mut mesh = Mesh::default();

    // Side: row 0 is the apex ring, row 1 the base ring
    let mut rows = [Vec::new(), Vec::new()];
    for (y, row) in rows.iter_mut().enumerate() {
        let v = y as f32;
        let ring_radius = v * radius;
        for x in 0..=radial {
            let u = x as f32 / radial as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();
            row.push(mesh.push_vertex(
                Vec3::new(ring_radius * sin, -v * height + half, ring_radius * cos),
                Vec3::new(sin, slope, cos).normalize(),
                [u, 1.0 - v],
            ));
        }
    }
    for x in 0..radial as usize {
        let b = rows[1][x];
        let c = rows[1][x + 1];
        let d = rows[0][x + 1];
        mesh.indices.extend_from_slice(&[b, c, d]);
    }

    // Base cap
    let centre_start = mesh.positions.len() as u32;
    for _ in 0..radial {
        mesh.push_vertex(Vec3::new(0.0, -half, 0.0), Vec3::NEG_Y, [0.5, 0.5]);
    }
    let rim_start = mesh.positions.len() as u32;
    for x in 0..=radial {
        let theta = x as f32 / radial as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push_vertex(
            Vec3::new(radius * sin, -half, radius * cos),
            Vec3::NEG_Y,
            [cos * 0.5 + 0.5, 0.5 - sin * 0.5],
        );
    }
    for x in 0..radial {
        let c = centre_start + x;
        let i = rim_start + x;
        mesh.indices.extend_from_slice(&[i + 1, i, c]);
    }

    mesh
}
