//! Rolling Logger
//!
//! Keeps the most recent log lines in a circular buffer so the application
//! can show or export them, and forwards every line to the platform sink
//! (browser console on wasm32, stderr elsewhere).
//!
//! `log` records are bridged into `tracing` when the logger is installed, so
//! crates using either facade end up in the same buffer.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("a global logger is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Fixed-capacity buffer of formatted lines; the oldest line is dropped first.
#[derive(Debug)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { lines: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

pub type SharedBuffer = Arc<Mutex<LogBuffer>>;

static GLOBAL_BUFFER: OnceLock<SharedBuffer> = OnceLock::new();

fn global_buffer() -> &'static SharedBuffer {
    GLOBAL_BUFFER.get_or_init(|| Arc::new(Mutex::new(LogBuffer::new(DEFAULT_CAPACITY))))
}

// ========================
// Layer
// ========================

/// Collects the message and the interesting fields of one event.
#[derive(Default)]
struct LineVisitor {
    message: String,
    target: Option<String>,
    fields: Vec<String>,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            name if name.starts_with("log.") => {}
            name => self.fields.push(format!("{}={:?}", name, value)),
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "log.target" => self.target = Some(value.to_string()),
            name if name.starts_with("log.") => {}
            name => self.fields.push(format!("{}={}", name, value)),
        }
    }
}

/// `tracing` layer writing into a [`LogBuffer`] and optionally to the
/// platform sink.
pub struct RollingLayer {
    app_name: String,
    buffer: SharedBuffer,
    echo: bool,
}

impl RollingLayer {
    pub fn new(app_name: impl Into<String>, buffer: SharedBuffer) -> Self {
        Self { app_name: app_name.into(), buffer, echo: true }
    }

    /// Keep lines in the buffer only.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }
}

impl<S: Subscriber> Layer<S> for RollingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let level = *event.metadata().level();
        let target = visitor.target.as_deref().unwrap_or_else(|| event.metadata().target());
        let mut message = visitor.message;
        if !visitor.fields.is_empty() {
            message = format!("{} {{{}}}", message, visitor.fields.join(" "));
        }

        let line = format_line(&timestamp(), &self.app_name, level, target, &message);
        if self.echo {
            emit(level, &line);
        }
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(line);
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

fn format_line(time: &str, app_name: &str, level: Level, target: &str, message: &str) -> String {
    format!("[{}] [{}] {:<5} {}: {}", time, app_name, level, target, message)
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&value),
        Level::WARN => web_sys::console::warn_1(&value),
        Level::INFO => web_sys::console::info_1(&value),
        _ => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{}", line);
}

// ========================
// Global API
// ========================

/// Install the global logger at `debug` level with the default capacity.
pub fn init_logger(app_name: &str) -> Result<(), LoggerError> {
    init_with_level(app_name, LevelFilter::DEBUG)
}

pub fn init_with_level(app_name: &str, level: LevelFilter) -> Result<(), LoggerError> {
    tracing_subscriber::registry()
        .with(RollingLayer::new(app_name, global_buffer().clone()).with_filter(level))
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;
    log::info!("{} logger initialized", app_name);
    Ok(())
}

/// Snapshot of the buffered lines, oldest first.
pub fn recent_lines() -> Vec<String> {
    global_buffer().lock().map(|b| b.lines()).unwrap_or_default()
}

pub fn clear() {
    if let Ok(mut buffer) = global_buffer().lock() {
        buffer.clear();
    }
}

pub fn info(message: &str) {
    log::info!("{}", message);
}

pub fn warn(message: &str) {
    log::warn!("{}", message);
}

pub fn error(message: &str) {
    log::error!("{}", message);
}
