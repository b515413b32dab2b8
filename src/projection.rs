//! Projection matrices for mono and stereo viewing, and the modelview
//! transform stack used while walking the scene.

use glam::{Mat4, Vec3};

/// Near clip plane distance.
pub const Z_NEAR: f32 = 5.0;
/// Far clip plane distance.
pub const Z_FAR: f32 = 60.0;
/// Distance from the eye to the scene origin.
pub const VIEW_DISTANCE: f32 = 40.0;

/// Perspective matrix for the viewing volume bounded by the given planes,
/// identical to the classic `glFrustum`.
#[must_use]
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let width = right - left;
    let height = top - bottom;
    let depth = far - near;
    Mat4::from_cols_array(&[
        2.0 * near / width,
        0.0,
        0.0,
        0.0,
        0.0,
        2.0 * near / height,
        0.0,
        0.0,
        (right + left) / width,
        (top + bottom) / height,
        -(far + near) / depth,
        -1.0,
        0.0,
        0.0,
        -2.0 * far * near / depth,
        0.0,
    ])
}

/// Eye separation and fixation distance for stereo rendering.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StereoParams {
    /// Distance between the eyes.
    pub eye_separation: f32,
    /// Distance to the plane where both eyes' images coincide.
    pub fix_point: f32,
}

impl Default for StereoParams {
    fn default() -> Self {
        Self {
            eye_separation: 5.0,
            fix_point: 40.0,
        }
    }
}

/// Horizontal near-plane bounds of the left eye, and the vertical half
/// extent shared by both eyes. The right eye uses `[-right, -left]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StereoFrustum {
    /// Left near-plane bound of the left eye.
    pub left: f32,
    /// Right near-plane bound of the left eye.
    pub right: f32,
    /// Vertical half extent, `height / width`.
    pub aspect: f32,
}

impl StereoFrustum {
    /// Bounds for a `width × height` viewport.
    #[must_use]
    pub fn new(width: u32, height: u32, params: StereoParams) -> Self {
        let aspect = aspect_ratio(width, height);
        let w = params.fix_point * (1.0 / 5.0);
        let half_sep = 0.5 * params.eye_separation;
        Self {
            left: -5.0 * ((w - half_sep) / params.fix_point),
            right: 5.0 * ((w + half_sep) / params.fix_point),
            aspect,
        }
    }

    /// `[left, right]` near-plane bounds for `eye`.
    #[must_use]
    pub fn bounds(&self, eye: Eye) -> [f32; 2] {
        match eye {
            Eye::Right => [-self.right, -self.left],
            Eye::Left | Eye::Mono => [self.left, self.right],
        }
    }

    /// Frustum matrix for `eye`.
    #[must_use]
    pub fn matrix(&self, eye: Eye) -> Mat4 {
        let [left, right] = self.bounds(eye);
        frustum(left, right, -self.aspect, self.aspect, Z_NEAR, Z_FAR)
    }
}

/// Which back buffer a pass draws into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Eye {
    /// Single back buffer.
    Mono,
    /// Left back buffer.
    Left,
    /// Right back buffer.
    Right,
}

/// One render pass: target buffer, projection, and lateral eye shift.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pass {
    /// Target buffer.
    pub eye: Eye,
    /// Projection matrix.
    pub projection: Mat4,
    /// Sideways modelview translation for this eye.
    pub eye_shift: f32,
}

/// Projection state recomputed on every resize.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Projection {
    /// One symmetric frustum.
    Mono(Mat4),
    /// Asymmetric frustums, one per eye.
    Stereo {
        /// Per-eye bounds.
        frustum: StereoFrustum,
        /// Eye separation and fix point.
        params: StereoParams,
    },
}

impl Projection {
    /// Projection for a `width × height` viewport.
    #[must_use]
    pub fn new(width: u32, height: u32, stereo: Option<StereoParams>) -> Self {
        let projection = match stereo {
            Some(params) => Self::Stereo {
                frustum: StereoFrustum::new(width, height, params),
                params,
            },
            None => {
                let h = aspect_ratio(width, height);
                Self::Mono(frustum(-1.0, 1.0, -h, h, Z_NEAR, Z_FAR))
            }
        };
        tracing::debug!(width, height, ?projection, "reshape");
        projection
    }

    /// The passes of one frame: one for mono, left then right for stereo.
    #[must_use]
    pub fn passes(&self) -> Vec<Pass> {
        match *self {
            Self::Mono(projection) => vec![Pass {
                eye: Eye::Mono,
                projection,
                eye_shift: 0.0,
            }],
            Self::Stereo { frustum, params } => {
                let half_sep = 0.5 * params.eye_separation;
                vec![
                    Pass {
                        eye: Eye::Left,
                        projection: frustum.matrix(Eye::Left),
                        eye_shift: half_sep,
                    },
                    Pass {
                        eye: Eye::Right,
                        projection: frustum.matrix(Eye::Right),
                        eye_shift: -half_sep,
                    },
                ]
            }
        }
    }
}

/// `height / width`, guarding a zero-width viewport.
#[expect(clippy::cast_precision_loss)]
fn aspect_ratio(width: u32, height: u32) -> f32 {
    height as f32 / width.max(1) as f32
}

/// Modelview matrix stack in the push/transform/pop style.
#[derive(Debug)]
pub struct TransformStack {
    stack: Vec<Mat4>,
}

impl TransformStack {
    /// A stack holding only `base`.
    #[must_use]
    pub fn new(base: Mat4) -> Self {
        Self { stack: vec![base] }
    }

    /// The eye-space base transform: the scene sits `VIEW_DISTANCE` away.
    #[must_use]
    pub fn viewer() -> Self {
        Self::new(Mat4::from_translation(Vec3::new(0.0, 0.0, -VIEW_DISTANCE)))
    }

    /// The current modelview matrix.
    #[must_use]
    pub fn top(&self) -> Mat4 {
        self.stack.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    /// Number of pushes not yet popped.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Duplicate the top level.
    pub fn push(&mut self) {
        self.stack.push(self.top());
    }

    /// Pop one level. The base level is never popped.
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Translate the top level.
    pub fn translate(&mut self, offset: Vec3) {
        self.post_multiply(Mat4::from_translation(offset));
    }

    /// Rotate by `degrees` about `axis` (a unit vector).
    pub fn rotate(&mut self, degrees: f32, axis: Vec3) {
        self.post_multiply(Mat4::from_axis_angle(axis, degrees.to_radians()));
    }

    fn post_multiply(&mut self, m: Mat4) {
        if let Some(top) = self.stack.last_mut() {
            *top *= m;
        }
    }
}
