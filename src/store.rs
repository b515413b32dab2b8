//! The three gear meshes, uploaded once, and their placement in the scene.
//!
//! Meshes are generated on the CPU by [`geometry::gear`] and uploaded as
//! static vertex/index buffers with their material color attached. After
//! [`GearStore::build`] nothing changes until [`GearStore::release`].

use std::sync::Arc;

use glam::Vec3;
use glow::HasContext;

use crate::color::{Color, GearColors};
use crate::error::GearsError;
use crate::geometry::{self, GearSpec};
use crate::types::{GearMesh, Vertex};

/// Opaque reference to a mesh held by a [`GearStore`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GearHandle(usize);

impl GearHandle {
    /// Position of the mesh in build order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// How one mesh is placed and spun in the scene.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GearInstance {
    /// Mesh to draw.
    pub mesh: GearHandle,
    /// Position of the gear's axle.
    pub translation: Vec3,
    /// Spin relative to the global angle.
    pub spin_multiplier: f32,
    /// Spin offset in degrees, so neighboring teeth interlock.
    pub phase: f32,
}

impl GearInstance {
    /// Spin about Z, in degrees, for the global animation angle.
    #[must_use]
    pub fn spin(&self, angle: f32) -> f32 {
        angle * self.spin_multiplier + self.phase
    }
}

/// Blueprint for one gear: shape, color and placement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GearModel {
    /// Shape.
    pub spec: GearSpec,
    /// Ambient-and-diffuse material.
    pub color: Color,
    /// Position of the axle.
    pub translation: Vec3,
    /// Spin relative to the global angle.
    pub spin_multiplier: f32,
    /// Spin offset in degrees.
    pub phase: f32,
}

/// The fixed three-gear layout: a large red driver meshing with a green and
/// a blue gear that turn twice as fast the other way.
#[must_use]
pub fn scene_models(colors: &GearColors) -> [GearModel; 3] {
    [
        GearModel {
            spec: GearSpec {
                inner_radius: 1.0,
                outer_radius: 4.0,
                width: 1.0,
                teeth: 20,
                tooth_depth: 0.7,
            },
            color: colors.red,
            translation: Vec3::new(-3.0, -2.0, 0.0),
            spin_multiplier: 1.0,
            phase: 0.0,
        },
        GearModel {
            spec: GearSpec {
                inner_radius: 0.5,
                outer_radius: 2.0,
                width: 2.0,
                teeth: 10,
                tooth_depth: 0.7,
            },
            color: colors.green,
            translation: Vec3::new(3.1, -2.0, 0.0),
            spin_multiplier: -2.0,
            phase: -9.0,
        },
        GearModel {
            spec: GearSpec {
                inner_radius: 1.3,
                outer_radius: 2.0,
                width: 0.5,
                teeth: 10,
                tooth_depth: 0.7,
            },
            color: colors.blue,
            translation: Vec3::new(-3.1, 4.2, 0.0),
            spin_multiplier: -2.0,
            phase: -25.0,
        },
    ]
}

/// Instances for `models`, with handles assigned in build order.
#[must_use]
pub fn instances(models: &[GearModel; 3]) -> [GearInstance; 3] {
    let mut index = 0;
    models.map(|model| {
        let instance = GearInstance {
            mesh: GearHandle(index),
            translation: model.translation,
            spin_multiplier: model.spin_multiplier,
            phase: model.phase,
        };
        index += 1;
        instance
    })
}

/// One mesh resident on the GPU.
pub struct GpuMesh {
    /// Vertex array with position (location 0) and normal (location 1).
    pub vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    /// Number of indices to draw as triangles.
    pub index_count: i32,
    /// Ambient-and-diffuse material color.
    pub color: Color,
}

/// Owns the uploaded gear meshes.
pub struct GearStore {
    gl: Arc<glow::Context>,
    meshes: Vec<GpuMesh>,
}

impl GearStore {
    /// Generate and upload the three gears.
    ///
    /// # Safety
    ///
    /// `gl` must be current. [`release`](Self::release) must be called with
    /// the same context before it is destroyed.
    ///
    /// # Errors
    ///
    /// [`GearsError::Gl`] if a buffer or vertex array cannot be created.
    pub unsafe fn build(
        gl: Arc<glow::Context>,
        models: &[GearModel; 3],
    ) -> Result<(Self, [GearInstance; 3]), GearsError> {
        let mut store = Self {
            gl,
            meshes: Vec::with_capacity(models.len()),
        };
        for model in models {
            let mesh = geometry::gear(&model.spec);
            let uploaded = unsafe { store.upload(&mesh, model.color) };
            match uploaded {
                Ok(gpu) => store.meshes.push(gpu),
                Err(err) => {
                    unsafe { store.release() };
                    return Err(err);
                }
            }
        }
        tracing::info!(meshes = store.meshes.len(), "gear meshes uploaded");
        Ok((store, instances(models)))
    }

    /// Upload one mesh into fresh static buffers.
    unsafe fn upload(&self, mesh: &GearMesh, color: Color) -> Result<GpuMesh, GearsError> {
        let gl = &self.gl;
        let index_count = i32::try_from(mesh.indices().len())
            .map_err(|_| GearsError::Gl("index count exceeds i32::MAX".into()))?;

        unsafe {
            let vao = gl.create_vertex_array().map_err(GearsError::Gl)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(err) => {
                    gl.delete_vertex_array(vao);
                    return Err(GearsError::Gl(err));
                }
            };
            let ebo = match gl.create_buffer() {
                Ok(ebo) => ebo,
                Err(err) => {
                    gl.delete_buffer(vbo);
                    gl.delete_vertex_array(vao);
                    return Err(GearsError::Gl(err));
                }
            };

            gl.bind_vertex_array(Some(vao));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(mesh.vertices()),
                glow::STATIC_DRAW,
            );

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(mesh.indices()),
                glow::STATIC_DRAW,
            );

            // Vertex is 24 bytes; the normal follows three position floats.
            #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let stride = std::mem::size_of::<Vertex>() as i32;
            #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let normal_offset = std::mem::size_of::<[f32; 3]>() as i32;

            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, normal_offset);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(GpuMesh {
                vao,
                vbo,
                ebo,
                index_count,
                color,
            })
        }
    }

    /// Look up a mesh by handle.
    #[must_use]
    pub fn get(&self, handle: GearHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle.0)
    }

    /// Delete every GL object owned by the store.
    ///
    /// # Safety
    ///
    /// Must be called with the context used to build the store, exactly once.
    pub unsafe fn release(self) {
        let gl = &self.gl;
        for mesh in &self.meshes {
            unsafe {
                gl.delete_vertex_array(mesh.vao);
                gl.delete_buffer(mesh.vbo);
                gl.delete_buffer(mesh.ebo);
            }
        }
        tracing::debug!(meshes = self.meshes.len(), "gear meshes released");
    }
}
