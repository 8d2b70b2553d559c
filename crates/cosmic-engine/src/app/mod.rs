//! Application driver: owns the window, the layer stack and the main loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::event::{Category, Event, EventKind};
use crate::layer::{Layer, LayerStack};
use crate::logging::{init_logging, LoggingConfig};
use crate::window::{create_window, Window, WindowProps};

/// State shared between the application and the window's event callback.
#[derive(Default)]
pub struct AppCore {
    pub layers: LayerStack,
}

/// Cloneable handle that stops the main loop at the end of the current
/// iteration.
///
/// Usable from inside layer callbacks.
#[derive(Clone)]
pub struct AppHandle {
    running: Rc<Cell<bool>>,
}

impl AppHandle {
    pub fn request_close(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

pub struct Application {
    window: Box<dyn Window>,
    core: Rc<RefCell<AppCore>>,
    // Outside the RefCell: layers request a close while the core is borrowed.
    running: Rc<Cell<bool>>,
}

impl Application {
    /// Takes ownership of `window` and routes its events into the layer stack.
    pub fn new(mut window: Box<dyn Window>) -> Self {
        let core = Rc::new(RefCell::new(AppCore::default()));
        let running = Rc::new(Cell::new(false));

        let callback_core = Rc::clone(&core);
        let callback_running = Rc::clone(&running);
        window.set_event_callback(Box::new(move |event| {
            dispatch(&callback_core, &callback_running, event);
        }));

        Self {
            window,
            core,
            running,
        }
    }

    pub fn push_layer(&mut self, layer: Box<dyn Layer>) {
        self.core.borrow_mut().layers.push(layer);
    }

    pub fn push_overlay(&mut self, overlay: Box<dyn Layer>) {
        self.core.borrow_mut().layers.push_overlay(overlay);
    }

    pub fn handle(&self) -> AppHandle {
        AppHandle {
            running: Rc::clone(&self.running),
        }
    }

    pub fn request_close(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn window(&self) -> &dyn Window {
        self.window.as_ref()
    }

    pub fn window_mut(&mut self) -> &mut dyn Window {
        self.window.as_mut()
    }

    /// Routes one event as if the window had produced it.
    pub fn on_event(&mut self, event: &mut Event) {
        dispatch(&self.core, &self.running, event);
    }

    /// Runs until closed, then detaches every layer top-down and terminates
    /// the window.
    pub fn run(&mut self) {
        self.running.set(true);
        core_info!("application running");

        while self.running.get() {
            self.window.on_update();
            self.core
                .borrow_mut()
                .layers
                .for_each_ascending(|layer| layer.on_update());
        }

        self.core.borrow_mut().layers.clear();
        self.window.terminate();
        core_info!("application stopped");
    }
}

fn dispatch(core: &RefCell<AppCore>, running: &Cell<bool>, event: &mut Event) {
    if !event.is_in_category(Category::INPUT) {
        core_debug!("{event}");
    }

    if let EventKind::WindowClose = event.kind() {
        running.set(false);
        return;
    }

    let mut core = core.borrow_mut();
    let mut cursor = core.layers.top();
    while let Some(layer) = cursor.get() {
        layer.on_event(event);
        if event.is_handled() {
            break;
        }
        cursor.prev();
    }
}

/// Initializes logging, creates the window, lets `factory` populate the
/// application and runs it to completion.
///
/// Window or graphics initialization failure is fatal.
pub fn run_app(props: WindowProps, logging: LoggingConfig, factory: impl FnOnce(&mut Application)) {
    init_logging(logging);

    let window = match create_window(props) {
        Ok(window) => window,
        Err(err) => core_panic!("failed to create window: {err:#}"),
    };

    let mut app = Application::new(window);
    factory(&mut app);
    app.run();
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::event::EventType;
    use crate::window::{EventCallback, NativeWindow};

    type Journal = Rc<RefCell<Vec<String>>>;

    /// Replays one batch of events per `on_update`; closes itself once the
    /// script runs out.
    struct ScriptedWindow {
        script: VecDeque<Vec<EventKind>>,
        callback: Option<EventCallback>,
        journal: Journal,
    }

    impl ScriptedWindow {
        fn boxed(script: Vec<Vec<EventKind>>, journal: &Journal) -> Box<dyn Window> {
            Box::new(Self {
                script: script.into(),
                callback: None,
                journal: Rc::clone(journal),
            })
        }
    }

    impl Window for ScriptedWindow {
        fn on_update(&mut self) {
            self.journal.borrow_mut().push("frame".to_string());
            let batch = self.script.pop_front().unwrap_or_else(|| vec![EventKind::WindowClose]);
            let callback = self.callback.as_mut().expect("callback installed");
            for kind in batch {
                callback(&mut Event::new(kind));
            }
        }

        fn width(&self) -> u32 {
            640
        }

        fn height(&self) -> u32 {
            480
        }

        fn set_event_callback(&mut self, callback: EventCallback) {
            self.callback = Some(callback);
        }

        fn set_vsync(&mut self, _enabled: bool) {}

        fn is_vsync(&self) -> bool {
            true
        }

        fn terminate(&mut self) {
            self.journal.borrow_mut().push("terminate".to_string());
        }

        fn native_window(&self) -> NativeWindow {
            NativeWindow::detached()
        }
    }

    struct Recorder {
        name: &'static str,
        journal: Journal,
        handles: Option<EventType>,
        close_on_update: Option<AppHandle>,
    }

    impl Recorder {
        fn new(name: &'static str, journal: &Journal) -> Self {
            Self {
                name,
                journal: Rc::clone(journal),
                handles: None,
                close_on_update: None,
            }
        }

        fn handling(mut self, event_type: EventType) -> Self {
            self.handles = Some(event_type);
            self
        }

        fn log(&self, what: impl std::fmt::Display) {
            self.journal.borrow_mut().push(format!("{} {what}", self.name));
        }
    }

    impl Layer for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn on_detach(&mut self) {
            self.log("detach");
        }

        fn on_update(&mut self) {
            self.log("update");
            if let Some(handle) = &self.close_on_update {
                handle.request_close();
            }
        }

        fn on_event(&mut self, event: &mut Event) {
            self.log(format_args!("{:?}", event.event_type()));
            if self.handles == Some(event.event_type()) {
                event.set_handled();
            }
        }
    }

    fn entries(journal: &Journal) -> Vec<String> {
        journal.borrow().clone()
    }

    // ── dispatch ──────────────────────────────────────────────────────────

    #[test]
    fn events_flow_top_down() {
        let journal = Journal::default();
        let mut app = Application::new(ScriptedWindow::boxed(vec![], &journal));
        app.push_layer(Box::new(Recorder::new("gameplay", &journal)));
        app.push_overlay(Box::new(Recorder::new("debug-ui", &journal)));

        app.on_event(&mut Event::new(EventKind::WindowFocus));
        assert_eq!(entries(&journal), ["debug-ui WindowFocus", "gameplay WindowFocus"]);
    }

    #[test]
    fn handled_event_stops_at_the_handler() {
        let journal = Journal::default();
        let mut app = Application::new(ScriptedWindow::boxed(vec![], &journal));
        app.push_layer(Box::new(Recorder::new("gameplay", &journal)));
        app.push_overlay(Box::new(
            Recorder::new("debug-ui", &journal).handling(EventType::MouseMoved),
        ));

        let mut event = Event::new(EventKind::MouseMoved { x: 1.0, y: 2.0 });
        app.on_event(&mut event);

        assert!(event.is_handled());
        assert_eq!(entries(&journal), ["debug-ui MouseMoved"]);
    }

    #[test]
    fn window_close_reaches_no_layer() {
        let journal = Journal::default();
        let mut app = Application::new(ScriptedWindow::boxed(vec![], &journal));
        app.push_layer(Box::new(Recorder::new("gameplay", &journal)));
        app.running.set(true);

        app.on_event(&mut Event::new(EventKind::WindowClose));

        assert!(!app.is_running());
        assert!(entries(&journal).is_empty());
    }

    // ── run loop ──────────────────────────────────────────────────────────

    #[test]
    fn run_updates_bottom_up_then_detaches_top_down() {
        let journal = Journal::default();
        let script = vec![vec![EventKind::KeyTyped { ch: 'a' }]];
        let mut app = Application::new(ScriptedWindow::boxed(script, &journal));
        app.push_layer(Box::new(Recorder::new("gameplay", &journal)));
        app.push_overlay(Box::new(Recorder::new("debug-ui", &journal)));

        app.run();

        assert_eq!(
            entries(&journal),
            [
                "frame",
                "debug-ui KeyTyped",
                "gameplay KeyTyped",
                "gameplay update",
                "debug-ui update",
                // The script is exhausted: the window reports a close.
                "frame",
                "gameplay update",
                "debug-ui update",
                "debug-ui detach",
                "gameplay detach",
                "terminate",
            ]
        );
        assert_eq!(app.core.borrow().layers.len(), 0);
    }

    #[test]
    fn layers_can_request_close() {
        let journal = Journal::default();
        let script = vec![vec![], vec![], vec![]];
        let mut app = Application::new(ScriptedWindow::boxed(script, &journal));

        let mut closer = Recorder::new("closer", &journal);
        closer.close_on_update = Some(app.handle());
        app.push_layer(Box::new(closer));

        app.run();

        let frames = entries(&journal).iter().filter(|e| *e == "frame").count();
        assert_eq!(frames, 1);
        assert!(!app.handle().is_running());
    }
}
