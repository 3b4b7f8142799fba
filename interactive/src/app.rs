use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};

use glutin_winit::DisplayBuilder;

use raw_window_handle::HasRawWindowHandle;

use std::ffi::CString;
use std::num::NonZeroU32;

use thiserror::Error;

use tracing::{debug, info};

use winit::dpi::{PhysicalSize, Size};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use mandelsplit::{FrameBuffer, PipelineError, SourceError};

use mandelsplit_common::job_loader::LoaderError;

use gl_wrapper::geometry::{GBError, Geometry};
use gl_wrapper::program::{PBError, Program, ProgramBuilder};
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::texture::{Texture2D, TextureError, TextureFilter, TextureFormats};

/// Window showing a single image until any key is pressed.
pub struct App {
    // GL objects go first, they are deleted while the context is still alive
    texture: Texture2D,
    program: Program,
    quad: Geometry,
    gl_window: GlWindow,
    gl_context: PossiblyCurrentContext,
    event_loop: EventLoop<()>,
}

impl App {
    pub fn new(fb: &FrameBuffer, title: &str, filter: TextureFilter) -> Result<Self, AppError> {
        if fb.is_empty() {
            return Err(AppError::EmptyImage);
        }

        let (width, height) = (fb.width() as u32, fb.height() as u32);

        let event_loop = EventLoop::new();
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(width, height)))
            .with_min_inner_size(Size::Physical(PhysicalSize::new(32, 32)))
            .with_title(title);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let template = ConfigTemplateBuilder::new();

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |configs| {
                configs
                    .reduce(|best, c| {
                        if c.num_samples() < best.num_samples() {
                            c
                        } else {
                            best
                        }
                    })
                    .expect("display reported success without any configs")
            })
            .map_err(|e| AppError::Display(e.to_string()))?;

        let window = window.ok_or(AppError::NoWindow)?;
        let handle = window.raw_window_handle();
        let gl_display = gl_config.display();

        let context_attr = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(handle));

        let gl_window = GlWindow::new(window, &gl_config)?;

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attr)? }
            .make_current(&gl_window.surface)?;

        gl::load_with(|s| {
            CString::new(s).map_or(std::ptr::null(), |s| {
                gl_display.get_proc_address(s.as_c_str()).cast()
            })
        });

        let texture = Texture2D::new(width, height, fb.as_bytes(), TextureFormats::RgbU8, filter)?;
        let program = ProgramBuilder::new(
            include_str!("gl_shaders/quad.glsl"),
            include_str!("gl_shaders/output.glsl"),
        )?
        .build()?;
        let quad = Geometry::quad()?;

        info!(width, height, title, "Opened window");

        Ok(Self {
            texture,
            program,
            quad,
            gl_window,
            gl_context,
            event_loop,
        })
    }

    /// Blocks until a key is pressed or the window is closed.
    pub fn run(mut self) -> Result<(), AppError> {
        let mut gl_renderer = GlRenderer::new();
        let image_size = self.texture.size();

        let window_size: (u32, u32) = self.gl_window.window.inner_size().into();
        gl_renderer.fit(window_size, image_size);

        let mut swap_error = None;

        self.event_loop
            .run_return(|event, _window_target, control_flow| {
                *control_flow = ControlFlow::Wait;
                match event {
                    Event::WindowEvent { event, .. } => match event {
                        WindowEvent::KeyboardInput {
                            input,
                            is_synthetic: false,
                            ..
                        } if input.state == ElementState::Pressed => {
                            debug!(key = ?input.virtual_keycode, "Key pressed");
                            control_flow.set_exit();
                        }
                        WindowEvent::CloseRequested => {
                            control_flow.set_exit();
                        }
                        WindowEvent::Resized(size) => {
                            if let (Some(w), Some(h)) =
                                (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                            {
                                self.gl_window.surface.resize(&self.gl_context, w, h);
                                gl_renderer.fit((size.width, size.height), image_size);
                                self.gl_window.window.request_redraw();
                            }
                        }
                        _ => (),
                    },
                    Event::RedrawRequested(_) => {
                        gl_renderer.clear_color(0.0, 0.0, 0.0);

                        self.texture.bind(0);
                        gl_renderer.draw(&self.quad, &self.program);

                        if let Err(e) = self.gl_window.surface.swap_buffers(&self.gl_context) {
                            swap_error = Some(e);
                            control_flow.set_exit();
                        }
                    }
                    _ => (),
                }
            });

        self.gl_window.window.set_visible(false);
        info!("Window closed");

        match swap_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &Config) -> Result<Self, AppError> {
        let size = window.inner_size();
        let (width, height) = match (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            (Some(w), Some(h)) => (w, h),
            _ => return Err(AppError::ZeroSizedWindow(size.width, size.height)),
        };

        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            window.raw_window_handle(),
            width,
            height,
        );

        let surface = unsafe { config.display().create_window_surface(config, &attrs)? };

        Ok(Self { window, surface })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not read job description: {0}")]
    Job(#[from] LoaderError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Could not open display: {0}")]
    Display(String),
    #[error("Display did not create a window")]
    NoWindow,
    #[error("OpenGL error: {0}")]
    Glutin(#[from] glutin::error::Error),
    #[error("Could not upload image: {0}")]
    Texture(#[from] TextureError),
    #[error("Could not build shader program: {0}")]
    Program(#[from] PBError),
    #[error("Could not build geometry: {0}")]
    Geometry(#[from] GBError),
    #[error("Image has no pixels, nothing to show")]
    EmptyImage,
    #[error("Window was created with a zero size of {0}x{1}")]
    ZeroSizedWindow(u32, u32),
}
