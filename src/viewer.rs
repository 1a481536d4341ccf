//! Standalone desk-scene window backed by winit.
//!
//! ```no_run
//! # use desk_scene::Viewer;
//! Viewer::builder()
//!     .with_title("Desk Scene")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    error::DeskError,
    gpu::render_context::RenderContext,
    input::{InputEvent, InputProcessor, MouseButton},
    options::Options,
    renderer::SceneRenderer,
    scene::FrameContext,
    util::frame_timing::FrameTiming,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: Option<String>,
}

impl ViewerBuilder {
    /// Create a builder with default options and the options' title.
    fn new() -> Self {
        Self {
            options: None,
            title: None,
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title, overriding the options.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        let mut options = self.options.unwrap_or_default();
        if let Some(title) = self.title {
            options.window.title = title;
        }
        Viewer { options }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that displays the desk scene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed or Escape is pressed.
    ///
    /// # Errors
    ///
    /// The first initialization failure (window, GPU, shader, texture), or
    /// [`DeskError::Viewer`] if the event loop itself fails.
    pub fn run(self) -> Result<(), DeskError> {
        let event_loop =
            EventLoop::new().map_err(|e| DeskError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            state: None,
            init_error: None,
            cursor_captured: false,
            options: self.options,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| DeskError::Viewer(e.to_string()))?;

        app.init_error.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Everything that exists once the window and GPU are up.
struct ViewerState {
    context: RenderContext,
    renderer: SceneRenderer,
    frame: FrameContext,
    input: InputProcessor,
    timing: FrameTiming,
}

impl ViewerState {
    fn new(window: Arc<Window>, options: &Options) -> Result<Self, DeskError> {
        let inner = window.inner_size();
        let context = pollster::block_on(RenderContext::new(
            window,
            viewport_size(inner),
        ))?;
        let renderer = SceneRenderer::new(&context, &options.textures.directory)?;
        Ok(Self {
            context,
            renderer,
            frame: FrameContext::new(options),
            input: InputProcessor::with_key_bindings(options.keybindings.clone()),
            timing: FrameTiming::new(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.renderer.resize(&self.context.device, width, height);
    }

    fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let dt = self.timing.tick();
        self.input.apply_held(&mut self.frame, dt);
        self.frame.advance(dt);

        let output = self.context.get_next_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.render(&self.context, &self.frame, &view);
        output.present();
        Ok(())
    }
}

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    state: Option<ViewerState>,
    init_error: Option<DeskError>,
    /// Cursor is grabbed and hidden; look comes from raw device motion.
    cursor_captured: bool,
    options: Options,
}

/// Surface size for a window inner size, never zero.
fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: DeskError) {
        log::error!("{error}");
        self.init_error = Some(error);
        event_loop.exit();
    }

    /// Grab and hide the cursor. Returns `false` when the platform refuses
    /// both grab modes, in which case the cursor stays visible.
    fn capture_cursor(window: &Window) -> bool {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(e) = grabbed {
            log::warn!("Cursor capture unavailable: {e}");
            return false;
        }
        window.set_cursor_visible(false);
        true
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.init_error.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.options.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.options.window.width,
                self.options.window.height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, DeskError::WindowCreationFailed(e.to_string()));
                return;
            }
        };

        match ViewerState::new(window.clone(), &self.options) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        }

        if self.options.window.capture_cursor {
            self.cursor_captured = Self::capture_cursor(&window);
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        // Guard: both window and GPU state must be initialised.
        let (Some(window), Some(state)) = (&self.window, &mut self.state) else {
            return;
        };

        match event {
            WindowEvent::Resized(event_size) => {
                let (vp_w, vp_h) = viewport_size(event_size);
                state.resize(vp_w, vp_h);
            }

            WindowEvent::Focused(false) => state.input.release_all(),

            WindowEvent::RedrawRequested => {
                match state.redraw() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                        let (vp_w, vp_h) = viewport_size(window.inner_size());
                        state.resize(vp_w, vp_h);
                    }
                    Err(e) => {
                        log::error!("render error: {e:?}");
                    }
                }
                window.request_redraw();
            }

            WindowEvent::MouseInput {
                button,
                state: button_state,
                ..
            } => {
                state.input.handle_event(
                    InputEvent::MouseButton {
                        button: MouseButton::from(button),
                        pressed: button_state == ElementState::Pressed,
                    },
                    &mut state.frame,
                );
            }

            WindowEvent::CursorMoved { position, .. } if !self.cursor_captured => {
                state.input.handle_event(
                    InputEvent::CursorMoved {
                        x: position.x as f32,
                        y: position.y as f32,
                    },
                    &mut state.frame,
                );
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                state.input.handle_event(
                    InputEvent::Scroll {
                        delta: scroll_delta,
                    },
                    &mut state.frame,
                );
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let key_str = format!("{code:?}");
                let pressed = event.state == ElementState::Pressed;
                let _ = state.input.handle_key(&key_str, pressed, &mut state.frame);
                if state.frame.exit_requested {
                    event_loop.exit();
                }
            }

            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if !self.cursor_captured {
            return;
        }
        let (Some(state), DeviceEvent::MouseMotion { delta: (dx, dy) }) =
            (&mut self.state, event)
        else {
            return;
        };
        state.input.handle_event(
            InputEvent::MouseDelta {
                dx: dx as f32,
                dy: dy as f32,
            },
            &mut state.frame,
        );
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.renderer.destroy();
        }
    }
}
