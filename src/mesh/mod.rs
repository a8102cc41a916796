//! Blob geometry: the rest shape and its per-tick deformation.

mod deform;
mod icosphere;

use glam::Vec3;

pub use deform::{deform, deform_into, DeformationEngine};
pub use icosphere::icosphere;

/// Undeformed reference geometry, captured once and never mutated
#[derive(Debug, Clone, PartialEq)]
pub struct RestShape {
    positions: Vec<Vec3>,
}

impl RestShape {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self { positions }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Indexed triangle mesh (rest positions + counter-clockwise triangles)
#[derive(Debug, Clone)]
pub struct Mesh {
    pub rest: RestShape,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
