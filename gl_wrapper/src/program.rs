use gl::types::{GLenum, GLuint};
use std::ffi::{c_char, CString};
use thiserror::Error;

const LOG_LEN: usize = 1024;

pub struct ProgramBuilder {
    vert: CString,
    frag: CString,
}

impl ProgramBuilder {
    pub fn new(vert_src: &str, frag_src: &str) -> Result<Self, PBError> {
        Ok(Self {
            vert: CString::new(vert_src).map_err(|_| PBError::InvalidSource)?,
            frag: CString::new(frag_src).map_err(|_| PBError::InvalidSource)?,
        })
    }

    pub fn build(self) -> Result<Program, PBError> {
        let vert = compile(gl::VERTEX_SHADER, &self.vert)?;
        let frag = match compile(gl::FRAGMENT_SHADER, &self.frag) {
            Ok(f) => f,
            Err(e) => {
                unsafe { gl::DeleteShader(vert) };
                return Err(e);
            }
        };

        let mut success: i32 = 0;

        unsafe {
            let program = gl::CreateProgram();
            gl::AttachShader(program, vert);
            gl::AttachShader(program, frag);
            gl::LinkProgram(program);

            gl::DeleteShader(vert);
            gl::DeleteShader(frag);

            gl::GetProgramiv(program, gl::LINK_STATUS, (&mut success) as *mut i32);
            if success != 1 {
                let mut buf = [0_u8; LOG_LEN];
                gl::GetProgramInfoLog(
                    program,
                    LOG_LEN as i32,
                    std::ptr::null_mut(),
                    buf.as_mut_ptr() as *mut c_char,
                );
                gl::DeleteProgram(program);

                return Err(PBError::Linking(log_to_string(&buf)));
            }

            Ok(Program { id: program })
        }
    }
}

fn compile(kind: GLenum, src: &CString) -> Result<GLuint, PBError> {
    let mut success: i32 = 0;

    unsafe {
        let shader = gl::CreateShader(kind);

        gl::ShaderSource(
            shader,
            1,
            (&src.as_ptr()) as *const *const c_char,
            std::ptr::null(),
        );

        gl::CompileShader(shader);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, (&mut success) as *mut i32);
        if success != 1 {
            let mut buf = [0_u8; LOG_LEN];
            gl::GetShaderInfoLog(
                shader,
                LOG_LEN as i32,
                std::ptr::null_mut(),
                buf.as_mut_ptr() as *mut c_char,
            );
            gl::DeleteShader(shader);

            return Err(PBError::Compilation(log_to_string(&buf)));
        }

        Ok(shader)
    }
}

/// Info logs are nul-terminated inside a fixed buffer.
fn log_to_string(buf: &[u8]) -> String {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());

    String::from_utf8_lossy(&buf[..end]).trim_end().to_string()
}

#[derive(Debug, Error)]
pub enum PBError {
    #[error("Shader source contains a nul byte")]
    InvalidSource,
    #[error("{0}")]
    Compilation(String),
    #[error("{0}")]
    Linking(String),
}

pub struct Program {
    id: GLuint,
}

impl Program {
    pub fn get_id(&self) -> GLuint {
        self.id
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        unsafe { gl::DeleteProgram(self.id) }
    }
}
