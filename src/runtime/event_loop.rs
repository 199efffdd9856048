//! Single-threaded event loop.
//!
//! Terminal threads and application workers never touch application state.
//! They post [`LoopEvent`]s into one channel; the thread that owns the
//! [`TuiRuntime`] drains that channel and is the only one that calls into the
//! [`EventHandler`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use tracing::debug;

use crate::config::TuiConfig;
use crate::core::input::{parse_input_events, InputEvent};
use crate::core::terminal::Terminal;
use crate::render::{DiffRenderer, Frame};

const STOP_DRAIN_MAX_MS: u64 = 1000;
const STOP_DRAIN_IDLE_MS: u64 = 50;
const ALT_SCREEN_ENTER: &str = "\x1b[?1049h";
const ALT_SCREEN_LEAVE: &str = "\x1b[?1049l";
const BRACKETED_PASTE_ENABLE: &str = "\x1b[?2004h";
const BRACKETED_PASTE_DISABLE: &str = "\x1b[?2004l";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

/// Work item consumed by the loop thread.
#[derive(Debug)]
pub enum LoopEvent<E> {
    Input(String),
    Resize,
    App(E),
    Render,
    Stop,
}

/// Application side of the loop. Every method runs on the loop thread.
pub trait EventHandler<E> {
    fn on_input(&mut self, event: InputEvent);

    fn on_event(&mut self, event: E);

    fn on_resize(&mut self, _columns: u16, _rows: u16) {}

    fn render(&mut self, columns: usize, rows: usize) -> Frame;
}

/// Cloneable, thread-safe way to post work into a running loop.
pub struct RuntimeHandle<E> {
    sender: Sender<LoopEvent<E>>,
    stopped: Arc<AtomicBool>,
}

impl<E> Clone for RuntimeHandle<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            stopped: Arc::clone(&self.stopped),
        }
    }
}

impl<E> RuntimeHandle<E> {
    /// Posts an application event. Returns `false` if the loop has stopped and
    /// the event was discarded.
    pub fn dispatch(&self, event: E) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.sender.send(LoopEvent::App(event)).is_ok()
    }

    pub fn request_render(&self) {
        if !self.is_stopped() {
            let _ = self.sender.send(LoopEvent::Render);
        }
    }

    pub fn request_stop(&self) {
        let _ = self.sender.send(LoopEvent::Stop);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

pub struct TuiRuntime<T: Terminal, E> {
    terminal: T,
    renderer: DiffRenderer,
    sender: Sender<LoopEvent<E>>,
    receiver: Receiver<LoopEvent<E>>,
    stopped: Arc<AtomicBool>,
    stop_requested: bool,
    alternate_screen: bool,
    running: bool,
}

impl<T: Terminal, E: Send + 'static> TuiRuntime<T, E> {
    pub fn new(terminal: T, config: &TuiConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            terminal,
            renderer: DiffRenderer::new(),
            sender,
            receiver,
            stopped: Arc::new(AtomicBool::new(false)),
            stop_requested: false,
            alternate_screen: config.alternate_screen,
            running: false,
        }
    }

    pub fn handle(&self) -> RuntimeHandle<E> {
        RuntimeHandle {
            sender: self.sender.clone(),
            stopped: Arc::clone(&self.stopped),
        }
    }

    pub fn start(&mut self) -> std::io::Result<()> {
        let input_sender = self.sender.clone();
        let resize_sender = self.sender.clone();
        self.terminal.start(
            Box::new(move |data| {
                let _ = input_sender.send(LoopEvent::Input(data));
            }),
            Box::new(move || {
                let _ = resize_sender.send(LoopEvent::Resize);
            }),
        )?;

        self.running = true;
        self.stopped.store(false, Ordering::SeqCst);
        self.stop_requested = false;
        let mut prelude = String::new();
        if self.alternate_screen {
            prelude.push_str(ALT_SCREEN_ENTER);
        }
        prelude.push_str(BRACKETED_PASTE_ENABLE);
        prelude.push_str(HIDE_CURSOR);
        self.terminal.write(&prelude);
        self.renderer.request_full_redraw_next();
        let _ = self.sender.send(LoopEvent::Render);
        debug!(
            columns = self.terminal.columns(),
            rows = self.terminal.rows(),
            "terminal runtime started"
        );
        Ok(())
    }

    /// True once [`LoopEvent::Stop`] was processed or [`TuiRuntime::stop`] ran.
    pub fn stop_requested(&self) -> bool {
        self.stop_requested || !self.running
    }

    /// Blocks for at least one event, drains everything already queued, then
    /// renders once if anything changed.
    pub fn run_blocking_once<H: EventHandler<E>>(&mut self, handler: &mut H) {
        if !self.running {
            return;
        }
        let Ok(first) = self.receiver.recv() else {
            self.stop_requested = true;
            return;
        };

        let mut needs_render = self.apply(first, handler);
        while let Ok(event) = self.receiver.try_recv() {
            needs_render |= self.apply(event, handler);
        }

        if needs_render && !self.stop_requested {
            self.render_now(handler);
        }
    }

    /// Applies every queued event without blocking. Returns how many were applied.
    pub fn run_pending<H: EventHandler<E>>(&mut self, handler: &mut H) -> usize {
        let mut applied = 0;
        let mut needs_render = false;
        while let Ok(event) = self.receiver.try_recv() {
            needs_render |= self.apply(event, handler);
            applied += 1;
        }
        if needs_render && self.running && !self.stop_requested {
            self.render_now(handler);
        }
        applied
    }

    pub fn render_now<H: EventHandler<E>>(&mut self, handler: &mut H) {
        let columns = usize::from(self.terminal.columns());
        let rows = usize::from(self.terminal.rows());
        let frame = handler.render(columns, rows);
        let output = self.renderer.render(&frame, columns, rows);
        self.terminal.write(&output);
    }

    fn apply<H: EventHandler<E>>(&mut self, event: LoopEvent<E>, handler: &mut H) -> bool {
        match event {
            LoopEvent::Input(data) => {
                let events = parse_input_events(&data);
                let any = !events.is_empty();
                for event in events {
                    handler.on_input(event);
                }
                any
            }
            LoopEvent::Resize => {
                self.renderer.request_full_redraw_next();
                handler.on_resize(self.terminal.columns(), self.terminal.rows());
                true
            }
            LoopEvent::App(event) => {
                handler.on_event(event);
                true
            }
            LoopEvent::Render => true,
            LoopEvent::Stop => {
                self.stop_requested = true;
                false
            }
        }
    }

    /// Restores the terminal. Events dispatched after this point are discarded.
    pub fn stop(&mut self) -> std::io::Result<()> {
        self.stopped.store(true, Ordering::SeqCst);
        if !self.running {
            return Ok(());
        }
        self.running = false;

        let mut epilogue = String::from(SHOW_CURSOR);
        epilogue.push_str(BRACKETED_PASTE_DISABLE);
        if self.alternate_screen {
            epilogue.push_str(ALT_SCREEN_LEAVE);
        }
        self.terminal.write(&epilogue);
        self.terminal
            .drain_input(STOP_DRAIN_MAX_MS, STOP_DRAIN_IDLE_MS);
        let result = self.terminal.stop();

        let discarded = self.receiver.try_iter().count();
        if discarded > 0 {
            debug!(discarded, "discarded events queued at shutdown");
        }
        result
    }
}

impl<T: Terminal, E> Drop for TuiRuntime<T, E> {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if self.running {
            self.running = false;
            self.terminal.write(SHOW_CURSOR);
            let _ = self.terminal.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::Key;
    use crate::core::terminal::test_support::FakeTerminal;

    #[derive(Default)]
    struct Recorder {
        inputs: Vec<InputEvent>,
        events: Vec<u32>,
        renders: usize,
        resizes: usize,
    }

    impl EventHandler<u32> for Recorder {
        fn on_input(&mut self, event: InputEvent) {
            self.inputs.push(event);
        }

        fn on_event(&mut self, event: u32) {
            self.events.push(event);
        }

        fn on_resize(&mut self, _columns: u16, _rows: u16) {
            self.resizes += 1;
        }

        fn render(&mut self, _columns: usize, _rows: usize) -> Frame {
            self.renders += 1;
            Frame::new(vec![format!("events={}", self.events.len())])
        }
    }

    fn started_runtime() -> (TuiRuntime<FakeTerminal, u32>, FakeTerminal) {
        let terminal = FakeTerminal::new(40, 5);
        let probe = terminal.clone();
        let mut runtime = TuiRuntime::new(terminal, &TuiConfig::default());
        runtime.start().expect("start");
        (runtime, probe)
    }

    #[test]
    fn events_from_other_threads_are_applied_on_the_loop_thread() {
        let (mut runtime, _probe) = started_runtime();
        let handle = runtime.handle();
        let mut recorder = Recorder::default();

        let worker = std::thread::spawn(move || {
            assert!(handle.dispatch(7));
            assert!(handle.dispatch(8));
        });
        worker.join().expect("worker");

        runtime.run_blocking_once(&mut recorder);
        assert_eq!(recorder.events, vec![7, 8]);
        assert_eq!(recorder.renders, 1);
    }

    #[test]
    fn terminal_input_is_decoded_before_reaching_the_handler() {
        let (mut runtime, probe) = started_runtime();
        let mut recorder = Recorder::default();

        probe.send_input("hi\r");
        probe.send_resize();
        runtime.run_pending(&mut recorder);

        assert_eq!(
            recorder.inputs,
            vec![
                InputEvent::Text("hi".to_string()),
                InputEvent::Key(Key::Enter)
            ]
        );
        assert_eq!(recorder.resizes, 1);
        assert!(probe.take_output().contains("events=0"));
    }

    #[test]
    fn dispatch_after_stop_is_discarded() {
        let (mut runtime, probe) = started_runtime();
        let handle = runtime.handle();
        let mut recorder = Recorder::default();

        handle.request_stop();
        runtime.run_blocking_once(&mut recorder);
        assert!(runtime.stop_requested());

        runtime.stop().expect("stop");
        assert!(!handle.dispatch(1));
        assert!(recorder.events.is_empty());

        let state = probe.state.lock().expect("state lock");
        assert!(state.started && state.stopped && state.drained);
        assert!(state.output.contains(SHOW_CURSOR));
    }
}
