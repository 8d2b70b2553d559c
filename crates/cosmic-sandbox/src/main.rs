use std::path::PathBuf;

use cosmic_engine::app::{run_app, AppHandle};
use cosmic_engine::event::{Category, Event, EventKind};
use cosmic_engine::graphics::GraphicsConfig;
use cosmic_engine::input::{self, Key, MouseButton};
use cosmic_engine::layer::Layer;
use cosmic_engine::logging::LoggingConfig;
use cosmic_engine::window::{NativeWindow, WindowProps};
use cosmic_engine::{app_debug, app_info, app_notice};

/// Directory holding `vert.spv` / `frag.spv` for the triangle.
const SHADER_DIR_ENV: &str = "COSMIC_SHADER_DIR";

struct GameplayLayer {
    native: NativeWindow,
    app: AppHandle,
    frame: u64,
}

impl Layer for GameplayLayer {
    fn name(&self) -> &str {
        "gameplay"
    }

    fn on_attach(&mut self) {
        app_info!("gameplay attached; Escape quits, hold Space to boost");
    }

    fn on_detach(&mut self) {
        app_info!("gameplay detached after {} frames", self.frame);
    }

    fn on_update(&mut self) {
        self.frame += 1;
        if self.frame % 60 == 0 && input::is_key_pressed(Key::Space, &self.native) {
            app_debug!("boosting (frame {})", self.frame);
        }
    }

    fn on_event(&mut self, event: &mut Event) {
        if let EventKind::KeyPressed { key: Key::Escape, .. } = event.kind() {
            app_notice!("escape pressed, closing");
            self.app.request_close();
            event.set_handled();
        }
    }
}

/// Logs input while enabled. F3 toggles it.
struct DebugOverlay {
    native: NativeWindow,
    verbose: bool,
}

impl Layer for DebugOverlay {
    fn name(&self) -> &str {
        "debug-ui"
    }

    fn on_event(&mut self, event: &mut Event) {
        match event.kind() {
            EventKind::KeyPressed { key: Key::F3, repeat_count: 0 } => {
                self.verbose = !self.verbose;
                app_info!("input tracing {}", if self.verbose { "on" } else { "off" });
                event.set_handled();
            }
            EventKind::MouseButtonPressed { button: MouseButton::Left } if self.verbose => {
                app_debug!("click at {:?}", input::mouse_position(&self.native));
            }
            _ if self.verbose && event.is_in_category(Category::INPUT) => {
                app_debug!("{event}");
            }
            _ => {}
        }
    }
}

fn main() {
    let graphics = GraphicsConfig {
        application_name: "cosmic-sandbox".to_string(),
        shader_dir: std::env::var_os(SHADER_DIR_ENV).map(PathBuf::from),
        ..GraphicsConfig::default()
    };

    let props = WindowProps {
        title: "Cosmic Sandbox".to_string(),
        graphics,
        ..WindowProps::default()
    };

    run_app(props, LoggingConfig::default(), |app| {
        let native = app.window().native_window();
        app.push_layer(Box::new(GameplayLayer {
            native: native.clone(),
            app: app.handle(),
            frame: 0,
        }));
        app.push_overlay(Box::new(DebugOverlay {
            native,
            verbose: false,
        }));
    });
}
