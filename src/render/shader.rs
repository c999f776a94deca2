// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Program compilation and the vert x frag program matrix.  Every pairing
//! is linked ahead of time so switching shaders at draw time is a plain
//! lookup.

use std::collections::HashMap;

use glow::HasContext;
use log::info;

use crate::render::shader_source::{disk_source, FragShader, VertShader};

#[derive(Clone)]
pub struct ShaderProgram {
    pub program: glow::Program,
}

impl ShaderProgram {
    pub fn new(
        gl: &glow::Context,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, String> {
        unsafe {
            let vertex_shader = gl.create_shader(glow::VERTEX_SHADER)?;
            gl.shader_source(vertex_shader, vertex_source);
            gl.compile_shader(vertex_shader);
            if !gl.get_shader_compile_status(vertex_shader) {
                let log = gl.get_shader_info_log(vertex_shader);
                gl.delete_shader(vertex_shader);
                return Err(format!("Vertex shader compilation error: {}", log));
            }

            let fragment_shader = gl.create_shader(glow::FRAGMENT_SHADER)?;
            gl.shader_source(fragment_shader, fragment_source);
            gl.compile_shader(fragment_shader);
            if !gl.get_shader_compile_status(fragment_shader) {
                let log = gl.get_shader_info_log(fragment_shader);
                gl.delete_shader(vertex_shader);
                gl.delete_shader(fragment_shader);
                return Err(format!("Fragment shader compilation error: {}", log));
            }

            let program = gl.create_program()?;
            gl.attach_shader(program, vertex_shader);
            gl.attach_shader(program, fragment_shader);
            gl.link_program(program);
            let linked = gl.get_program_link_status(program);
            gl.detach_shader(program, vertex_shader);
            gl.detach_shader(program, fragment_shader);
            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);
            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(format!("Program linking error: {}", log));
            }

            Ok(Self { program })
        }
    }

    pub fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.use_program(Some(self.program));
        }
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.program);
        }
    }
}

/// One linked program per (vertex transform, fragment shader) pair.
pub struct ShaderMatrix {
    programs: HashMap<(VertShader, FragShader), ShaderProgram>,
}

impl ShaderMatrix {
    /// Compiles every pairing from the built-in sources.
    pub fn build(gl: &glow::Context) -> Result<Self, String> {
        let mut programs = HashMap::new();
        for vert in VertShader::ALL {
            for frag in FragShader::ALL {
                let program =
                    ShaderProgram::new(gl, vert.builtin_source(), frag.builtin_source())
                        .map_err(|e| {
                            format!("{}/{}: {}", vert.file_name(), frag.file_name(), e)
                        })?;
                programs.insert((vert, frag), program);
            }
        }
        Ok(Self { programs })
    }

    pub fn get(&self, vert: VertShader, frag: FragShader) -> &ShaderProgram {
        &self.programs[&(vert, frag)]
    }

    /// Recompiles every pairing from the shader directory on disk.  Either
    /// every program swaps or, on the first failure, none do.
    pub fn reload_from_disk(
        &mut self,
        gl: &glow::Context,
        shader_root: &str,
    ) -> Result<(), String> {
        let mut vert_sources = HashMap::new();
        for vert in VertShader::ALL {
            vert_sources.insert(vert, disk_source(shader_root, vert.file_name())?);
        }
        let mut frag_sources = HashMap::new();
        for frag in FragShader::ALL {
            frag_sources.insert(frag, disk_source(shader_root, frag.file_name())?);
        }

        let mut rebuilt = HashMap::new();
        for vert in VertShader::ALL {
            for frag in FragShader::ALL {
                match ShaderProgram::new(gl, &vert_sources[&vert], &frag_sources[&frag]) {
                    Ok(program) => {
                        rebuilt.insert((vert, frag), program);
                    }
                    Err(e) => {
                        for program in rebuilt.values() {
                            program.delete(gl);
                        }
                        return Err(format!(
                            "{}/{}: {}",
                            vert.file_name(),
                            frag.file_name(),
                            e
                        ));
                    }
                }
            }
        }

        for program in self.programs.values() {
            program.delete(gl);
        }
        self.programs = rebuilt;
        info!("shaders reloaded from '{}'", shader_root);
        Ok(())
    }

    pub fn delete_all(&mut self, gl: &glow::Context) {
        for program in self.programs.values() {
            program.delete(gl);
        }
        self.programs.clear();
    }
}
