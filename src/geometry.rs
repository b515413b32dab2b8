//! Procedural gear wheel generation.
//!
//! A gear is built from four groups of faces:
//!
//! 1. a front annulus at `z = +width/2` between the hole radius and the tooth
//!    root, plus one quad per tooth out to the tip radius,
//! 2. the same faces mirrored at `z = -width/2` with reversed winding,
//! 3. the outer wall following the tooth profile, one quad per profile edge,
//! 4. the inner cylinder around the hole, smooth-shaded.
//!
//! Each tooth period is split into four equal angular slots (the duty cycle
//! `da = 2π / teeth / 4`): rising flank, tip, falling flank, gap. Every corner
//! position is derived from an integer slot index so faces that share an edge
//! share bit-identical coordinates, and the mesh closes exactly.
//!
//! Arguments are not validated. Nonsensical inputs produce degenerate
//! geometry; zero teeth produce an empty mesh.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};

use crate::types::{GearMesh, Vertex};

/// Slots per tooth period.
const SLOTS_PER_TOOTH: u32 = 4;

/// Dimensions of one gear wheel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GearSpec {
    /// Radius of the hole at the center.
    pub inner_radius: f32,
    /// Radius at the middle of the teeth.
    pub outer_radius: f32,
    /// Thickness along the Z axis.
    pub width: f32,
    /// Number of teeth.
    pub teeth: u32,
    /// Radial height of a tooth.
    pub tooth_depth: f32,
}

impl GearSpec {
    /// Radius at the bottom of the teeth.
    #[must_use]
    pub fn root_radius(&self) -> f32 {
        self.outer_radius - self.tooth_depth / 2.0
    }

    /// Radius at the top of the teeth.
    #[must_use]
    pub fn tip_radius(&self) -> f32 {
        self.outer_radius + self.tooth_depth / 2.0
    }
}

/// Point on a ring of the gear at a given slot and depth.
struct Rings {
    slots: u32,
    da: f32,
    half_width: f32,
}

impl Rings {
    fn new(spec: &GearSpec) -> Self {
        let slots = spec.teeth * SLOTS_PER_TOOTH;
        #[expect(clippy::cast_precision_loss)]
        let da = TAU / slots as f32;
        Self {
            slots,
            da,
            half_width: spec.width * 0.5,
        }
    }

    /// Unit direction of a slot boundary. The last boundary wraps to slot 0.
    fn direction(&self, slot: u32) -> Vec2 {
        #[expect(clippy::cast_precision_loss)]
        let angle = (slot % self.slots) as f32 * self.da;
        let (sin, cos) = angle.sin_cos();
        Vec2::new(cos, sin)
    }

    fn front(&self, radius: f32, slot: u32) -> Vec3 {
        (self.direction(slot) * radius).extend(self.half_width)
    }

    fn back(&self, radius: f32, slot: u32) -> Vec3 {
        (self.direction(slot) * radius).extend(-self.half_width)
    }
}

/// Accumulates faces into an indexed triangle list.
#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = u32::try_from(self.vertices.len()).unwrap_or(u32::MAX);
        self.vertices.push(Vertex {
            position: position.to_array(),
            normal: normal.to_array(),
        });
        index
    }

    /// Flat triangle, counter-clockwise when seen from the front.
    fn triangle(&mut self, corners: [Vec3; 3], normal: Vec3) {
        for corner in corners {
            let index = self.push_vertex(corner, normal);
            self.indices.push(index);
        }
    }

    /// Flat quad, counter-clockwise when seen from the front.
    fn quad(&mut self, corners: [Vec3; 4], normal: Vec3) {
        self.smooth_quad(corners, [normal; 4]);
    }

    /// Quad with one normal per corner.
    fn smooth_quad(&mut self, corners: [Vec3; 4], normals: [Vec3; 4]) {
        let base = [0, 1, 2, 3].map(|i| self.push_vertex(corners[i], normals[i]));
        self.indices
            .extend_from_slice(&[base[0], base[1], base[2], base[0], base[2], base[3]]);
    }

    fn finish(self) -> GearMesh {
        GearMesh::from_parts(self.vertices, self.indices)
    }
}

/// Build the mesh of one gear wheel.
#[must_use]
pub fn gear(spec: &GearSpec) -> GearMesh {
    if spec.teeth == 0 {
        return GearMesh::default();
    }

    let rings = Rings::new(spec);
    let r0 = spec.inner_radius;
    let r1 = spec.root_radius();
    let r2 = spec.tip_radius();

    let mut mesh = MeshBuilder::default();

    // Front face: annulus wedge, gap quad, tooth quad.
    for tooth in 0..spec.teeth {
        let s = tooth * SLOTS_PER_TOOTH;
        let f = |radius, slot| rings.front(radius, slot);
        mesh.triangle([f(r0, s), f(r1, s), f(r1, s + 3)], Vec3::Z);
        mesh.quad([f(r0, s), f(r1, s + 3), f(r1, s + 4), f(r0, s + 4)], Vec3::Z);
        mesh.quad([f(r1, s), f(r2, s + 1), f(r2, s + 2), f(r1, s + 3)], Vec3::Z);
    }

    // Back face: same outline, opposite winding.
    for tooth in 0..spec.teeth {
        let s = tooth * SLOTS_PER_TOOTH;
        let b = |radius, slot| rings.back(radius, slot);
        mesh.triangle([b(r0, s), b(r1, s + 3), b(r1, s)], Vec3::NEG_Z);
        mesh.quad([b(r0, s), b(r0, s + 4), b(r1, s + 4), b(r1, s + 3)], Vec3::NEG_Z);
        mesh.quad([b(r1, s + 3), b(r2, s + 2), b(r2, s + 1), b(r1, s)], Vec3::NEG_Z);
    }

    // Outer wall along the tooth profile.
    for tooth in 0..spec.teeth {
        let s = tooth * SLOTS_PER_TOOTH;
        let profile = [(r1, s), (r2, s + 1), (r2, s + 2), (r1, s + 3), (r1, s + 4)];
        for pair in profile.windows(2) {
            let (ra, sa) = pair[0];
            let (rb, sb) = pair[1];
            let normal = edge_normal(rings.front(ra, sa), rings.front(rb, sb));
            mesh.quad(
                [
                    rings.front(ra, sa),
                    rings.back(ra, sa),
                    rings.back(rb, sb),
                    rings.front(rb, sb),
                ],
                normal,
            );
        }
    }

    // Inner cylinder, normals pointing at the axis.
    for tooth in 0..spec.teeth {
        let s = tooth * SLOTS_PER_TOOTH;
        let e = s + SLOTS_PER_TOOTH;
        let inward = |slot| (-rings.direction(slot)).extend(0.0);
        mesh.smooth_quad(
            [
                rings.back(r0, s),
                rings.front(r0, s),
                rings.front(r0, e),
                rings.back(r0, e),
            ],
            [inward(s), inward(s), inward(e), inward(e)],
        );
    }

    mesh.finish()
}

/// Outward normal of a counter-clockwise profile edge: its perpendicular
/// rotated a quarter turn clockwise, normalized.
fn edge_normal(from: Vec3, to: Vec3) -> Vec3 {
    let edge = to - from;
    Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    type Key = [u32; 3];

    fn key(p: [f32; 3]) -> Key {
        p.map(f32::to_bits)
    }

    fn specs() -> Vec<GearSpec> {
        let mut out = vec![
            GearSpec {
                inner_radius: 1.0,
                outer_radius: 4.0,
                width: 1.0,
                teeth: 20,
                tooth_depth: 0.7,
            },
            GearSpec {
                inner_radius: 0.5,
                outer_radius: 2.0,
                width: 2.0,
                teeth: 10,
                tooth_depth: 0.7,
            },
            GearSpec {
                inner_radius: 1.3,
                outer_radius: 2.0,
                width: 0.5,
                teeth: 10,
                tooth_depth: 0.7,
            },
        ];
        for teeth in 3..=32 {
            out.push(GearSpec {
                inner_radius: 0.75,
                outer_radius: 3.0,
                width: 1.5,
                teeth,
                tooth_depth: 0.5,
            });
        }
        out
    }

    /// Directed edge counts keyed by exact corner positions.
    fn directed_edges(mesh: &GearMesh) -> HashMap<(Key, Key), usize> {
        let mut edges = HashMap::new();
        for [a, b, c] in mesh.triangles() {
            for (from, to) in [(a, b), (b, c), (c, a)] {
                *edges
                    .entry((key(from.position), key(to.position)))
                    .or_insert(0) += 1;
            }
        }
        edges
    }

    #[test]
    fn mesh_is_closed_and_consistently_wound() {
        for spec in specs() {
            let mesh = gear(&spec);
            let edges = directed_edges(&mesh);
            for (&(from, to), &count) in &edges {
                assert_eq!(count, 1, "edge used twice in one direction for {spec:?}");
                assert_eq!(
                    edges.get(&(to, from)),
                    Some(&1),
                    "edge without a twin for {spec:?}"
                );
            }
        }
    }

    #[test]
    fn front_and_back_faces_mirror() {
        for spec in specs() {
            let mesh = gear(&spec);
            let half = spec.width * 0.5;
            let mut front = Vec::new();
            let mut back = Vec::new();
            for v in mesh.vertices() {
                if v.normal == [0.0, 0.0, 1.0] {
                    assert!((v.position[2] - half).abs() < f32::EPSILON);
                    front.push([v.position[0].to_bits(), v.position[1].to_bits()]);
                } else if v.normal == [0.0, 0.0, -1.0] {
                    assert!((v.position[2] + half).abs() < f32::EPSILON);
                    back.push([v.position[0].to_bits(), v.position[1].to_bits()]);
                }
            }
            front.sort_unstable();
            back.sort_unstable();
            assert!(!front.is_empty());
            assert_eq!(front, back, "faces differ for {spec:?}");
        }
    }

    #[test]
    fn vertex_normals_agree_with_winding() {
        for spec in specs() {
            let mesh = gear(&spec);
            for [a, b, c] in mesh.triangles() {
                let pa = Vec3::from_array(a.position);
                let pb = Vec3::from_array(b.position);
                let pc = Vec3::from_array(c.position);
                let face = (pb - pa).cross(pc - pa);
                if face.length() < 1e-6 {
                    continue;
                }
                for v in [a, b, c] {
                    let n = Vec3::from_array(v.normal);
                    assert!((n.length() - 1.0).abs() < 1e-5, "normal not unit");
                    assert!(face.dot(n) > 0.0, "normal faces inward for {spec:?}");
                }
            }
        }
    }

    #[test]
    fn inner_cylinder_is_smooth_and_points_inward() {
        let spec = specs()[0];
        let mesh = gear(&spec);
        let mut seen = 0;
        for v in mesh.vertices() {
            let radial = Vec2::new(v.position[0], v.position[1]);
            if v.normal[2] == 0.0 && (radial.length() - spec.inner_radius).abs() < 1e-5 {
                let n = Vec2::new(v.normal[0], v.normal[1]);
                assert!((n + radial.normalize()).length() < 1e-5);
                seen += 1;
            }
        }
        assert_eq!(seen, 4 * spec.teeth as usize);
    }

    #[test]
    fn counts_scale_with_teeth() {
        let spec = specs()[0];
        let mesh = gear(&spec);
        // Per tooth: 2 x (3 + 4 + 4) cap vertices, 4 wall quads, 1 cylinder quad.
        assert_eq!(mesh.vertices().len(), 42 * 20);
        assert_eq!(mesh.indices().len(), 60 * 20);
    }

    #[test]
    fn tips_reach_tip_radius() {
        let spec = specs()[1];
        let mesh = gear(&spec);
        let max = mesh
            .vertices()
            .iter()
            .map(|v| Vec2::new(v.position[0], v.position[1]).length())
            .fold(0.0_f32, f32::max);
        assert!((max - spec.tip_radius()).abs() < 1e-5);
    }

    #[test]
    fn zero_teeth_is_empty() {
        let mesh = gear(&GearSpec {
            inner_radius: 1.0,
            outer_radius: 2.0,
            width: 1.0,
            teeth: 0,
            tooth_depth: 0.5,
        });
        assert!(mesh.is_empty());
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        let mesh = gear(&GearSpec {
            inner_radius: -1.0,
            outer_radius: 0.0,
            width: 0.0,
            teeth: 1,
            tooth_depth: -3.0,
        });
        assert_eq!(mesh.indices().len(), 60);
    }
}
