use std::fmt;

/// Class of a console record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Log,
    Info,
    Warn,
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Log
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Log => "log",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        })
    }
}

/// A single message emitted by the lexer, compiler or a running program
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub severity: Severity,
    pub message: String,
}

impl Record {
    pub fn new<S: Into<String>>(severity: Severity, message: S) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn log<S: Into<String>>(message: S) -> Self {
        Self::new(Severity::Log, message)
    }

    pub fn info<S: Into<String>>(message: S) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::new(Severity::Error, message)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Sink for diagnostics and program output. The core only ever writes to it.
pub trait Output {
    fn log(&mut self, message: &str);
    fn info(&mut self, message: &str);
    fn warn(&mut self, message: &str);
    fn error(&mut self, message: &str);

    /// Routes a record to the method matching its severity
    fn record(&mut self, record: &Record) {
        match record.severity {
            Severity::Log => self.log(&record.message),
            Severity::Info => self.info(&record.message),
            Severity::Warn => self.warn(&record.message),
            Severity::Error => self.error(&record.message),
        }
    }
}

impl<O: Output + ?Sized> Output for &mut O {
    fn log(&mut self, message: &str) {
        (**self).log(message)
    }

    fn info(&mut self, message: &str) {
        (**self).info(message)
    }

    fn warn(&mut self, message: &str) {
        (**self).warn(message)
    }

    fn error(&mut self, message: &str) {
        (**self).error(message)
    }
}

/// Keeps every record in order until a renderer drains it
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferedOutput {
    buffer: Vec<Record>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.buffer
    }

    /// Messages of one severity, in the order they were written
    pub fn messages(&self, severity: Severity) -> Vec<&str> {
        self.buffer
            .iter()
            .filter(|record| record.severity == severity)
            .map(|record| record.message.as_str())
            .collect()
    }

    /// Takes all buffered records, leaving the buffer empty
    pub fn drain(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn push(&mut self, severity: Severity, message: &str) {
        self.buffer.push(Record::new(severity, message));
    }
}

impl Output for BufferedOutput {
    fn log(&mut self, message: &str) {
        self.push(Severity::Log, message)
    }

    fn info(&mut self, message: &str) {
        self.push(Severity::Info, message)
    }

    fn warn(&mut self, message: &str) {
        self.push(Severity::Warn, message)
    }

    fn error(&mut self, message: &str) {
        self.push(Severity::Error, message)
    }
}

/// Forwards records to the `log` facade. Program output goes out at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOutput;

impl Output for LogOutput {
    fn log(&mut self, message: &str) {
        log::info!("{}", message);
    }

    fn info(&mut self, message: &str) {
        log::info!("{}", message);
    }

    fn warn(&mut self, message: &str) {
        log::warn!("{}", message);
    }

    fn error(&mut self, message: &str) {
        log::error!("{}", message);
    }
}
