use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Ime, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as OsWindow, WindowId};

use super::{EventCallback, NativeWindow, Window, WindowProps};
use crate::event::{Event, EventKind};
use crate::graphics::{FrameStatus, GraphicsConfig, GraphicsContext, SurfaceHost};
use crate::input::{from_winit_key, from_winit_mouse_button, InputState};

/// Window backed by winit, with a Vulkan graphics context.
///
/// The event loop is driven with `pump_app_events` so the application keeps
/// ownership of the main loop.
pub struct WinitWindow {
    handler: Handler,
    event_loop: EventLoop<()>,
}

struct Handler {
    title: String,
    initial_size: LogicalSize<f64>,
    graphics: GraphicsConfig,

    // Declared before `window` so the context is dropped first.
    context: Option<GraphicsContext>,
    window: Option<Rc<OsWindow>>,

    input: Rc<RefCell<InputState>>,
    callback: Option<EventCallback>,
    size: PhysicalSize<u32>,
    vsync: bool,
    close_requested: bool,
    init_error: Option<anyhow::Error>,
    terminated: bool,
}

impl WinitWindow {
    pub fn new(props: WindowProps) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        let mut handler = Handler {
            title: props.title,
            initial_size: LogicalSize::new(f64::from(props.width), f64::from(props.height)),
            vsync: props.graphics.vsync,
            graphics: props.graphics,
            context: None,
            window: None,
            input: Rc::default(),
            callback: None,
            size: PhysicalSize::new(props.width, props.height),
            close_requested: false,
            init_error: None,
            terminated: false,
        };

        // The OS window only exists after the loop delivered `resumed`.
        while handler.window.is_none() {
            if let Some(err) = handler.init_error.take() {
                return Err(err);
            }
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::ZERO), &mut handler)
            {
                return Err(handler
                    .init_error
                    .take()
                    .unwrap_or_else(|| anyhow!("event loop exited during startup ({code})")));
            }
        }

        core_info!(
            "window \"{}\" created ({}x{})",
            handler.title,
            handler.size.width,
            handler.size.height
        );
        Ok(Self {
            handler,
            event_loop,
        })
    }

    fn render_frame(&mut self) {
        let Some(mut context) = self.handler.context.take() else {
            return;
        };

        let mut host = PumpHost {
            event_loop: &mut self.event_loop,
            handler: &mut self.handler,
        };
        let result = context.render(&mut host);
        self.handler.context = Some(context);

        match result {
            Ok(FrameStatus::Presented) => {}
            Ok(status) => core_debug!("frame {status:?}"),
            Err(err) => core_panic!("frame rendering failed: {err}"),
        }
    }
}

impl Window for WinitWindow {
    fn on_update(&mut self) {
        if self.handler.terminated {
            return;
        }

        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler)
        {
            core_debug!("event loop exited with code {code}");
        }

        if !self.handler.close_requested {
            self.render_frame();
        }
    }

    fn width(&self) -> u32 {
        self.handler.size.width
    }

    fn height(&self) -> u32 {
        self.handler.size.height
    }

    fn set_event_callback(&mut self, callback: EventCallback) {
        self.handler.callback = Some(callback);
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.handler.vsync = enabled;
        if let Some(context) = self.handler.context.as_mut() {
            context.set_vsync(enabled);
        }
    }

    fn is_vsync(&self) -> bool {
        self.handler.vsync
    }

    fn terminate(&mut self) {
        if self.handler.terminated {
            return;
        }
        self.handler.terminated = true;

        if let Some(mut context) = self.handler.context.take() {
            context.terminate();
        }
        self.handler.window = None;
        self.handler.input.borrow_mut().focused = false;
        core_info!("window \"{}\" terminated", self.handler.title);
    }

    fn native_window(&self) -> NativeWindow {
        let window = self
            .handler
            .window
            .as_ref()
            .map(Rc::downgrade)
            .unwrap_or_default();
        NativeWindow::new(Rc::clone(&self.handler.input), window)
    }
}

impl Drop for WinitWindow {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl Handler {
    fn dispatch(&mut self, kind: EventKind) {
        let mut event = Event::new(kind);
        // Polling from inside the callback sees this event already applied.
        self.input.borrow_mut().apply_event(&event);
        if let Some(callback) = self.callback.as_mut() {
            callback(&mut event);
        }
    }

    fn create_os_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = OsWindow::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let context = GraphicsContext::new(&window, self.graphics.clone())
            .context("failed to create the graphics context")?;

        self.size = window.inner_size();
        self.context = Some(context);
        self.window = Some(Rc::new(window));
        Ok(())
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.terminated {
            return;
        }

        if let Err(err) = self.create_os_window(event_loop) {
            core_error!("{err:#}");
            self.init_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) => {
                self.size = *size;
                if let Some(context) = self.context.as_mut() {
                    context.signal_framebuffer_resized();
                }
            }
            _ => {}
        }

        let mut translated = Vec::new();
        translate_window_event(&event, |kind| translated.push(kind));
        for kind in translated {
            self.dispatch(kind);
        }
    }
}

/// Lets a swapchain rebuild block on the event loop while minimized.
struct PumpHost<'a> {
    event_loop: &'a mut EventLoop<()>,
    handler: &'a mut Handler,
}

impl SurfaceHost for PumpHost<'_> {
    fn framebuffer_size(&self) -> PhysicalSize<u32> {
        self.handler.size
    }

    fn wait_events(&mut self) {
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(None, self.handler) {
            core_debug!("event loop exited with code {code}");
            self.handler.close_requested = true;
        }
    }

    fn close_requested(&self) -> bool {
        self.handler.close_requested
    }
}

/// Maps one winit event onto zero or more engine events, in platform order.
fn translate_window_event(event: &WindowEvent, mut emit: impl FnMut(EventKind)) {
    match event {
        WindowEvent::CloseRequested => emit(EventKind::WindowClose),

        WindowEvent::Resized(size) => emit(EventKind::WindowResize {
            width: size.width,
            height: size.height,
        }),

        WindowEvent::Moved(position) => emit(EventKind::WindowMoved {
            x: position.x,
            y: position.y,
        }),

        WindowEvent::Focused(true) => emit(EventKind::WindowFocus),
        WindowEvent::Focused(false) => emit(EventKind::WindowLostFocus),

        WindowEvent::KeyboardInput { event, .. } => {
            let key = from_winit_key(event.physical_key);
            match event.state {
                ElementState::Pressed => {
                    emit(EventKind::KeyPressed {
                        key,
                        repeat_count: u32::from(event.repeat),
                    });
                    if let Some(text) = &event.text {
                        text.chars()
                            .filter(|ch| !ch.is_control())
                            .for_each(|ch| emit(EventKind::KeyTyped { ch }));
                    }
                }
                ElementState::Released => emit(EventKind::KeyReleased { key }),
            }
        }

        WindowEvent::Ime(Ime::Commit(text)) => text
            .chars()
            .for_each(|ch| emit(EventKind::KeyTyped { ch })),

        WindowEvent::MouseInput { state, button, .. } => {
            let button = from_winit_mouse_button(*button);
            match state {
                ElementState::Pressed => emit(EventKind::MouseButtonPressed { button }),
                ElementState::Released => emit(EventKind::MouseButtonReleased { button }),
            }
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (offset_x, offset_y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(p) => (p.x as f32, p.y as f32),
            };
            emit(EventKind::MouseScrolled { offset_x, offset_y });
        }

        WindowEvent::CursorMoved { position, .. } => emit(EventKind::MouseMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),

        _ => {}
    }
}
