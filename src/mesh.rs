use std::f32::consts::{PI, TAU};

use anyhow::{bail, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// GPU ready mesh buffers.
///
/// Vertices are laid out as `position.xyz` followed by `normal.xyz`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub const STRIDE: usize = 6;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let start = index * Self::STRIDE;
        Vec3::from_slice(&self.vertices[start..start + 3])
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let start = index * Self::STRIDE + 3;
        Vec3::from_slice(&self.vertices[start..start + 3])
    }

    /// Flips normals and winding so the surface is seen from inside.
    pub fn inverted(mut self) -> Self {
        for chunk in self.vertices.chunks_exact_mut(Self::STRIDE) {
            chunk[3] = -chunk[3];
            chunk[4] = -chunk[4];
            chunk[5] = -chunk[5];
        }
        for triangle in self.indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }
        self
    }
}

/// Builds a unit UV sphere with `segments` slices and `rings` stacks.
pub fn uv_sphere(segments: u32, rings: u32) -> Result<Mesh> {
    if segments < 3 || rings < 2 {
        bail!("a sphere needs at least 3 segments and 2 rings");
    }

    let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize * Mesh::STRIDE);
    for ring in 0..=rings {
        let theta = ring as f32 / rings as f32 * PI;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for segment in 0..=segments {
            let phi = segment as f32 / segments as f32 * TAU;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let normal = Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi);
            vertices.extend_from_slice(&[normal.x, normal.y, normal.z]);
            vertices.extend_from_slice(&[normal.x, normal.y, normal.z]);
        }
    }

    let columns = segments + 1;
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * columns + segment;
            let b = a + columns;
            // skip the degenerate triangle at each pole
            if ring != 0 {
                indices.extend_from_slice(&[a, a + 1, b]);
            }
            if ring != rings - 1 {
                indices.extend_from_slice(&[a + 1, b + 1, b]);
            }
        }
    }

    Ok(Mesh { vertices, indices })
}
