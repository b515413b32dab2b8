//! Data model shared by the generator, the store and the render loop.

use bytemuck::{Pod, Zeroable};

/// A mesh vertex, ready for the GPU.
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Unit normal.
    pub normal: [f32; 3],
}

/// One gear wheel as an indexed triangle list.
///
/// Flat-shaded faces carry their own copies of shared corner positions so
/// every vertex of such a face holds the face normal. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct GearMesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GearMesh {
    pub(crate) fn from_parts(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Vertex data.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle list indices into [`vertices`](Self::vertices).
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Iterate the triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [&Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                &self.vertices[tri[0] as usize],
                &self.vertices[tri[1] as usize],
                &self.vertices[tri[2] as usize],
            ]
        })
    }

    /// True for a mesh with no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Global view rotation in degrees, changed by the arrow keys.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewState {
    /// Rotation about X.
    pub rot_x: f32,
    /// Rotation about Y.
    pub rot_y: f32,
    /// Rotation about Z.
    pub rot_z: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            rot_x: 20.0,
            rot_y: 30.0,
            rot_z: 0.0,
        }
    }
}

/// Spin angle in degrees, kept in `[0, 3600)`.
pub const ANGLE_PERIOD: f64 = 3600.0;

/// Gear spin state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Animation {
    angle: f64,
    /// Whether the clock advances the spin angle.
    pub enabled: bool,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            angle: 0.0,
            enabled: true,
        }
    }
}

impl Animation {
    /// Current spin angle in degrees.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Advance the spin angle, wrapping into `[0, 3600)`.
    pub fn advance(&mut self, degrees: f64) {
        let next = (self.angle + degrees).rem_euclid(ANGLE_PERIOD);
        // rem_euclid can round up to the period itself for tiny negatives.
        self.angle = if next >= ANGLE_PERIOD { 0.0 } else { next };
    }

    /// Pause or resume.
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}
