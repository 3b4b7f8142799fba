use crate::geometry::Geometry;
use crate::program::Program;

pub struct GlRenderer {
    current_program: u32,
}

impl GlRenderer {
    pub fn new() -> Self {
        Self { current_program: 0 }
    }

    pub fn draw(&mut self, geometry: &Geometry, program: &Program) {
        let p_id = program.get_id();
        if self.current_program != p_id {
            unsafe { gl::UseProgram(p_id) }
            self.current_program = p_id;
        }

        unsafe {
            gl::BindVertexArray(geometry.vao());
            gl::DrawArrays(gl::TRIANGLES, 0, geometry.vertices() as i32);
        }
    }

    /// Sets the viewport to the largest rectangle with the content's aspect ratio
    /// centered in the window.
    pub fn fit(&self, window: (u32, u32), content: (u32, u32)) {
        let v = letterbox(window, content);

        unsafe {
            gl::Viewport(v.x, v.y, v.width, v.height);
        }
    }

    pub fn clear_color(&self, r: f32, g: f32, b: f32) {
        unsafe {
            gl::ClearColor(r, g, b, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }
}

impl Default for GlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

pub fn letterbox(window: (u32, u32), content: (u32, u32)) -> Viewport {
    let (ww, wh) = (window.0 as u64, window.1 as u64);
    let (cw, ch) = (content.0 as u64, content.1 as u64);

    if cw == 0 || ch == 0 || ww == 0 || wh == 0 {
        return Viewport {
            x: 0,
            y: 0,
            width: ww as i32,
            height: wh as i32,
        };
    }

    // compare ww / wh against cw / ch without floats
    let (width, height) = if ww * ch > wh * cw {
        (wh * cw / ch, wh)
    } else {
        (ww, ww * ch / cw)
    };

    Viewport {
        x: ((ww - width) / 2) as i32,
        y: ((wh - height) / 2) as i32,
        width: width as i32,
        height: height as i32,
    }
}
