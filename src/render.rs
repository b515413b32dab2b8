//! The renderer: walks the gear scene once per eye and issues draw calls.
//!
//! Scene traversal is separated from GL through [`GearCanvas`], so the
//! transform order and the pass structure can be checked without a context.
//! [`GearRenderer`] is the glow-backed implementation that owns the shader
//! program and the [`GearStore`].

use std::sync::Arc;

use glam::{Mat3, Mat4, Vec3};
use glow::HasContext;

use crate::color::{Color, GearColors};
use crate::error::GearsError;
use crate::projection::{Eye, Projection, StereoParams, TransformStack};
use crate::shaders;
use crate::store::{self, GearHandle, GearInstance, GearStore};
use crate::types::ViewState;

/// Eye-space direction towards the single directional light.
pub const LIGHT_DIRECTION: Vec3 = Vec3::new(5.0, 5.0, 10.0);

/// Target of a scene pass.
pub trait GearCanvas {
    /// Start drawing one eye's image with the given projection.
    fn begin_pass(&mut self, eye: Eye, projection: Mat4);

    /// Draw one gear mesh with the given modelview matrix.
    fn draw_gear(&mut self, mesh: GearHandle, modelview: Mat4);
}

/// Draw every gear once per pass of `projection`.
///
/// Each pass shifts the eye sideways, applies the view rotation, then places
/// and spins every gear in order. `stack` is returned to the depth it had on
/// entry.
pub fn render_scene(
    canvas: &mut impl GearCanvas,
    stack: &mut TransformStack,
    projection: &Projection,
    view: &ViewState,
    instances: &[GearInstance],
    angle: f32,
) {
    for pass in projection.passes() {
        canvas.begin_pass(pass.eye, pass.projection);

        stack.push();
        stack.translate(Vec3::new(pass.eye_shift, 0.0, 0.0));
        stack.rotate(view.rot_x, Vec3::X);
        stack.rotate(view.rot_y, Vec3::Y);
        stack.rotate(view.rot_z, Vec3::Z);

        for instance in instances {
            stack.push();
            stack.translate(instance.translation);
            stack.rotate(instance.spin(angle), Vec3::Z);
            canvas.draw_gear(instance.mesh, stack.top());
            stack.pop();
        }

        stack.pop();
    }
}

/// Cached uniform locations for the gear program.
struct GearUniforms {
    projection: glow::UniformLocation,
    modelview: glow::UniformLocation,
    normal: glow::UniformLocation,
    light_dir: glow::UniformLocation,
    color: glow::UniformLocation,
}

impl GearUniforms {
    unsafe fn locate(gl: &glow::Context, program: glow::Program) -> Result<Self, GearsError> {
        let find = |name: &str| {
            unsafe { gl.get_uniform_location(program, name) }
                .ok_or_else(|| GearsError::Shader(format!("{name} missing from gear shader")))
        };
        Ok(Self {
            projection: find("u_projection")?,
            modelview: find("u_modelview")?,
            normal: find("u_normal")?,
            light_dir: find("u_light_dir")?,
            color: find("u_color")?,
        })
    }
}

/// Renders the three gears with glow.
///
/// # Example
///
/// ```no_run
/// # use glow_gears::{GearRenderer, RenderSession};
/// # use glow_gears::color::GearColors;
/// # use std::sync::Arc;
/// # fn example(gl: Arc<glow::Context>, session: &RenderSession) {
/// // During setup (with a current GL context):
/// let mut renderer =
///     unsafe { GearRenderer::new(gl, &GearColors::default(), None, [300, 300]) }.unwrap();
///
/// // Each frame:
/// unsafe { renderer.render(&session.view, session.angle()) };
/// # }
/// ```
pub struct GearRenderer {
    gl: Arc<glow::Context>,
    program: glow::Program,
    uniforms: GearUniforms,
    store: GearStore,
    instances: [GearInstance; 3],
    stereo: Option<StereoParams>,
    projection: Projection,
    background: Color,
}

impl GearRenderer {
    /// Compile the shader, upload the gears and set fixed GL state.
    ///
    /// # Safety
    ///
    /// The `gl` context must be current and valid. The caller must ensure
    /// that [`destroy`](Self::destroy) is called before the context is
    /// dropped.
    ///
    /// # Errors
    ///
    /// [`GearsError::Shader`] if the program does not build, or
    /// [`GearsError::Gl`] if a buffer cannot be created.
    pub unsafe fn new(
        gl: Arc<glow::Context>,
        colors: &GearColors,
        stereo: Option<StereoParams>,
        [width, height]: [u32; 2],
    ) -> Result<Self, GearsError> {
        let program = unsafe {
            shaders::compile_program(&gl, shaders::GEAR_VERTEX_SRC, shaders::GEAR_FRAGMENT_SRC)?
        };
        let uniforms = match unsafe { GearUniforms::locate(&gl, program) } {
            Ok(uniforms) => uniforms,
            Err(err) => {
                unsafe { gl.delete_program(program) };
                return Err(err);
            }
        };

        let models = store::scene_models(colors);
        let (store, instances) = match unsafe { GearStore::build(Arc::clone(&gl), &models) } {
            Ok(built) => built,
            Err(err) => {
                unsafe { gl.delete_program(program) };
                return Err(err);
            }
        };

        unsafe {
            gl.enable(glow::CULL_FACE);
            gl.front_face(glow::CCW);
            gl.enable(glow::DEPTH_TEST);

            gl.use_program(Some(program));
            gl.uniform_3_f32(
                Some(&uniforms.light_dir),
                LIGHT_DIRECTION.x,
                LIGHT_DIRECTION.y,
                LIGHT_DIRECTION.z,
            );
        }

        let mut renderer = Self {
            gl,
            program,
            uniforms,
            store,
            instances,
            stereo,
            projection: Projection::new(width, height, stereo),
            background: colors.background,
        };
        unsafe { renderer.resize(width, height) };
        Ok(renderer)
    }

    /// Set the viewport and recompute the projection.
    ///
    /// # Safety
    ///
    /// Requires the context passed to [`new`](Self::new) to be current.
    pub unsafe fn resize(&mut self, width: u32, height: u32) {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        unsafe { self.gl.viewport(0, 0, w, h) };
        self.projection = Projection::new(width, height, self.stereo);
    }

    /// Draw one frame into the back buffer(s). The caller presents.
    ///
    /// # Safety
    ///
    /// Requires the context passed to [`new`](Self::new) to be current.
    pub unsafe fn render(&mut self, view: &ViewState, angle: f32) {
        unsafe { self.gl.use_program(Some(self.program)) };
        let mut canvas = GlCanvas {
            gl: &self.gl,
            uniforms: &self.uniforms,
            store: &self.store,
            background: self.background,
        };
        let mut stack = TransformStack::viewer();
        render_scene(
            &mut canvas,
            &mut stack,
            &self.projection,
            view,
            &self.instances,
            angle,
        );
        debug_assert_eq!(stack.depth(), 0, "unbalanced transform stack");
    }

    /// Clean up all GL resources owned by this renderer.
    ///
    /// # Safety
    ///
    /// Must be called with the same GL context that was used to create the
    /// renderer, and must be called exactly once.
    pub unsafe fn destroy(self) {
        unsafe {
            self.gl.use_program(None);
            self.gl.delete_program(self.program);
            self.store.release();
        }
    }
}

/// [`GearCanvas`] over the live context. Only built inside
/// [`GearRenderer::render`], whose contract guarantees a current context.
struct GlCanvas<'a> {
    gl: &'a glow::Context,
    uniforms: &'a GearUniforms,
    store: &'a GearStore,
    background: Color,
}

impl GearCanvas for GlCanvas<'_> {
    fn begin_pass(&mut self, eye: Eye, projection: Mat4) {
        let buffer = match eye {
            Eye::Mono => glow::BACK,
            Eye::Left => glow::BACK_LEFT,
            Eye::Right => glow::BACK_RIGHT,
        };
        let [r, g, b, a] = self.background.to_array();
        unsafe {
            self.gl.draw_buffer(buffer);
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            self.gl.uniform_matrix_4_f32_slice(
                Some(&self.uniforms.projection),
                false,
                &projection.to_cols_array(),
            );
        }
    }

    fn draw_gear(&mut self, mesh: GearHandle, modelview: Mat4) {
        let Some(mesh) = self.store.get(mesh) else {
            tracing::warn!(?mesh, "no such gear mesh");
            return;
        };
        let normal = Mat3::from_mat4(modelview).inverse().transpose();
        let [r, g, b, a] = mesh.color.to_array();
        unsafe {
            self.gl.uniform_matrix_4_f32_slice(
                Some(&self.uniforms.modelview),
                false,
                &modelview.to_cols_array(),
            );
            self.gl.uniform_matrix_3_f32_slice(
                Some(&self.uniforms.normal),
                false,
                &normal.to_cols_array(),
            );
            self.gl.uniform_4_f32(Some(&self.uniforms.color), r, g, b, a);
            self.gl.bind_vertex_array(Some(mesh.vao));
            self.gl
                .draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Pass(Eye),
        Draw(usize, Mat4),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl GearCanvas for Recorder {
        fn begin_pass(&mut self, eye: Eye, _projection: Mat4) {
            self.calls.push(Call::Pass(eye));
        }

        fn draw_gear(&mut self, mesh: GearHandle, modelview: Mat4) {
            self.calls.push(Call::Draw(mesh.index(), modelview));
        }
    }

    fn scene() -> [GearInstance; 3] {
        store::instances(&store::scene_models(&GearColors::default()))
    }

    fn record(projection: &Projection, view: &ViewState, angle: f32) -> Vec<Call> {
        let mut canvas = Recorder::default();
        let mut stack = TransformStack::viewer();
        render_scene(&mut canvas, &mut stack, projection, view, &scene(), angle);
        assert_eq!(stack.depth(), 0);
        canvas.calls
    }

    fn draws(calls: &[Call]) -> Vec<(usize, Mat4)> {
        calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw(index, m) => Some((*index, *m)),
                Call::Pass(_) => None,
            })
            .collect()
    }

    #[test]
    fn mono_draws_each_gear_once_in_order() {
        let calls = record(&Projection::new(300, 300, None), &ViewState::default(), 0.0);
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], Call::Pass(Eye::Mono));
        let order: Vec<usize> = draws(&calls).into_iter().map(|(i, _)| i).collect();
        assert_eq!(order, [0, 1, 2]);
    }

    #[test]
    fn stereo_repeats_the_scene_per_eye() {
        let projection = Projection::new(300, 300, Some(StereoParams::default()));
        let calls = record(&projection, &ViewState::default(), 12.0);
        assert_eq!(calls.len(), 8);
        assert_eq!(calls[0], Call::Pass(Eye::Left));
        assert_eq!(calls[4], Call::Pass(Eye::Right));

        // Same gears, shifted by the full eye separation between passes.
        let draws = draws(&calls);
        for (left, right) in draws[..3].iter().zip(&draws[3..]) {
            assert_eq!(left.0, right.0);
            let shift = left.1.transform_point3(Vec3::ZERO) - right.1.transform_point3(Vec3::ZERO);
            assert!(shift.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-4));
        }
    }

    #[test]
    fn gear_is_placed_then_spun_in_view_space() {
        let view = ViewState {
            rot_x: 0.0,
            rot_y: 0.0,
            rot_z: 0.0,
        };
        let calls = record(&Projection::new(300, 300, None), &view, 90.0);
        let (_, red) = draws(&calls)[0];
        assert!(red
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(-3.0, -2.0, -40.0), 1e-4));
        // Spun 90 degrees: +X on the gear now points along +Y.
        assert!(red
            .transform_point3(Vec3::X)
            .abs_diff_eq(Vec3::new(-3.0, -1.0, -40.0), 1e-4));
    }

    #[test]
    fn view_rotation_applies_before_gear_placement() {
        let view = ViewState {
            rot_x: 0.0,
            rot_y: 0.0,
            rot_z: 90.0,
        };
        let calls = record(&Projection::new(300, 300, None), &view, 0.0);
        let (_, red) = draws(&calls)[0];
        // (-3, -2) turned a quarter about Z is (2, -3).
        assert!(red
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(2.0, -3.0, -40.0), 1e-4));
    }

    #[test]
    fn stack_is_balanced_from_any_depth() {
        let mut canvas = Recorder::default();
        let mut stack = TransformStack::viewer();
        stack.push();
        stack.push();
        let projection = Projection::new(640, 480, Some(StereoParams::default()));
        render_scene(
            &mut canvas,
            &mut stack,
            &projection,
            &ViewState::default(),
            &scene(),
            1.0,
        );
        assert_eq!(stack.depth(), 2);
    }
}
