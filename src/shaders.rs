//! GLSL shader sources and compilation helpers.
//!
//! The gear shaders target GLSL 1.40 (OpenGL 3.1) and reproduce classic
//! fixed-function lighting: one directional light, a global ambient term,
//! and a single ambient-and-diffuse material color per gear.

use glow::HasContext;

use crate::error::GearsError;

/// Vertex shader for gear meshes.
///
/// Lighting is evaluated per vertex in eye space. Flat faces carry their
/// face normal on every corner, so only the smooth inner cylinder shows a
/// gradient.
///
/// # Uniforms
///
/// | Name             | Type   | Description                                |
/// |------------------|--------|--------------------------------------------|
/// | `u_projection`   | `mat4` | Frustum for the current eye                |
/// | `u_modelview`    | `mat4` | View rotation, gear placement and spin     |
/// | `u_normal`       | `mat3` | Inverse transpose of the modelview's 3x3   |
/// | `u_light_dir`    | `vec3` | Eye-space light direction (unnormalized)   |
/// | `u_color`        | `vec4` | Ambient-and-diffuse material               |
pub const GEAR_VERTEX_SRC: &str = r"#version 140

in vec3 a_position;
in vec3 a_normal;

uniform mat4 u_projection;
uniform mat4 u_modelview;
uniform mat3 u_normal;
uniform vec3 u_light_dir;
uniform vec4 u_color;

out vec4 v_color;

const float AMBIENT = 0.2;

void main() {
    vec3 n = normalize(u_normal * a_normal);
    vec3 l = normalize(u_light_dir);
    float diffuse = max(dot(n, l), 0.0);

    v_color = vec4(u_color.rgb * (AMBIENT + diffuse), u_color.a);
    gl_Position = u_projection * u_modelview * vec4(a_position, 1.0);
}
";

/// Fragment shader for gear meshes: passes the lit vertex color through.
pub const GEAR_FRAGMENT_SRC: &str = r"#version 140

in vec4 v_color;

out vec4 frag_color;

void main() {
    frag_color = v_color;
}
";

/// Compile a shader program from vertex and fragment source strings.
///
/// Attribute locations are bound before linking: `a_position` to 0 and
/// `a_normal` to 1. The shader objects are deleted after a successful link,
/// so only the program handle needs to be cleaned up by the caller.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
///
/// # Errors
///
/// [`GearsError::Shader`] if compilation or linking fails.
pub unsafe fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, GearsError> {
    let program = unsafe { gl.create_program() }.map_err(GearsError::Shader)?;

    let vs = unsafe { compile_shader(gl, glow::VERTEX_SHADER, vertex_src) }?;
    let fs = match unsafe { compile_shader(gl, glow::FRAGMENT_SHADER, fragment_src) } {
        Ok(fs) => fs,
        Err(err) => {
            unsafe {
                gl.delete_shader(vs);
                gl.delete_program(program);
            }
            return Err(err);
        }
    };

    unsafe {
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.bind_attrib_location(program, 0, "a_position");
        gl.bind_attrib_location(program, 1, "a_normal");
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(GearsError::Shader(format!("program link error: {log}")));
        }

        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);
    }

    Ok(program)
}

/// Compile a single shader stage from source.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
unsafe fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
) -> Result<glow::Shader, GearsError> {
    unsafe {
        let shader = gl.create_shader(shader_type).map_err(GearsError::Shader)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(GearsError::Shader(format!("shader compile error: {log}")));
        }

        Ok(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_declare_glsl_140() {
        for src in [GEAR_VERTEX_SRC, GEAR_FRAGMENT_SRC] {
            assert!(src.starts_with("#version 140\n"));
        }
    }

    #[test]
    fn vertex_shader_declares_every_uniform_the_renderer_sets() {
        for name in [
            "u_projection",
            "u_modelview",
            "u_normal",
            "u_light_dir",
            "u_color",
        ] {
            assert!(
                GEAR_VERTEX_SRC.contains(&format!("uniform {}", uniform_type(name))),
                "missing {name}"
            );
        }
    }

    fn uniform_type(name: &str) -> String {
        let ty = match name {
            "u_projection" | "u_modelview" => "mat4",
            "u_normal" => "mat3",
            "u_light_dir" => "vec3",
            _ => "vec4",
        };
        format!("{ty} {name};")
    }
}
