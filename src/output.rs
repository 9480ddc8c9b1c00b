// ABOUTME: User-facing feedback for stackward commands, kept apart from tracing logs.
// ABOUTME: Normal prints progress lines, quiet prints results only, JSON prints one event per line.

use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Normal,
    /// Results and errors only, for CI logs.
    Quiet,
    /// JSON lines for scripting.
    Json,
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Seconds since `start_timer`, or zero when it was never started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    pub fn success(&self, message: &str) {
        match (self.mode, self.duration()) {
            (OutputMode::Json, _) => self.event(Stream::Stdout, "success", message),
            (OutputMode::Normal, Some(secs)) => println!("{message} ({secs:.1}s)"),
            _ => println!("{message}"),
        }
    }

    /// Warnings are dropped in quiet mode.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.event(Stream::Stderr, "warning", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Json => self.event(Stream::Stderr, "error", message),
            _ => eprintln!("Error: {message}"),
        }
    }

    /// Structured payload, JSON mode only.
    pub fn data<T: Serialize>(&self, event: &str, data: &T) {
        if self.mode == OutputMode::Json {
            emit(Stream::Stdout, &JsonData { event, data });
        }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    fn event(&self, stream: Stream, event: &str, message: &str) {
        emit(
            stream,
            &JsonEvent {
                event,
                message,
                duration_secs: self.duration(),
            },
        );
    }
}

fn emit<T: Serialize>(stream: Stream, record: &T) {
    let Ok(line) = serde_json::to_string(record) else {
        return;
    };
    match stream {
        Stream::Stdout => println!("{line}"),
        Stream::Stderr => eprintln!("{line}"),
    }
}

#[derive(Serialize)]
struct JsonData<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
