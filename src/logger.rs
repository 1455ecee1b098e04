//! Multi-stream ring-buffer logger shown by the logger panel.
//!
//! Streams are created by name and live as long as the logger. Each keeps at
//! most `capacity` lines in chronological order; the oldest line is dropped
//! before a new one is pushed at capacity. Reading is paged newest-first.

use std::collections::VecDeque;

use hashbrown::HashMap;
use tracing::{trace, warn};

use crate::config::GuiConfig;
use crate::error::{GuiError, Result};
use crate::fmt::fmt_fixed_padded;
use crate::host::AlertHook;
use crate::time::Clock;

/// `[00012.345] `: seconds since the logger was created.
fn timestamp(secs: f64) -> String {
    format!("[{}] ", fmt_fixed_padded(secs, 3, 9))
}

pub struct Logger {
    streams: HashMap<String, VecDeque<String>>,
    order: Vec<String>,
    default_logger: String,
    capacity: usize,
    page_size: usize,
    dev_mode: bool,
    clock: Box<dyn Clock>,
    start_ms: f64,
    alert: AlertHook,
}

impl Logger {
    /// A logger with the configured default stream already registered.
    pub fn new(config: &GuiConfig, clock: impl Clock + 'static, alert: AlertHook) -> Self {
        let start_ms = clock.now_ms();
        let mut logger = Self {
            streams: HashMap::new(),
            order: Vec::new(),
            default_logger: config.default_logger.clone(),
            capacity: config.logger.capacity.max(1),
            page_size: config.logger.page_size.max(1),
            dev_mode: config.dev_mode,
            clock: Box::new(clock),
            start_ms,
            alert,
        };
        logger.add_logger(&config.default_logger);
        logger
    }

    /// Surface `message` through the alert hook without logging it.
    pub fn alert(&self, message: &str) {
        (self.alert)(message);
    }

    /// Create stream `name`. An existing name keeps its stream; the user is
    /// alerted and `false` is returned.
    pub fn add_logger(&mut self, name: &str) -> bool {
        if self.streams.contains_key(name) {
            warn!(logger = name, "logger already exists");
            (self.alert)(&format!("Logger \"{name}\" already exists"));
            return false;
        }
        self.streams.insert(name.to_string(), VecDeque::new());
        self.order.push(name.to_string());
        true
    }

    pub fn log(&mut self, message: &str, logger: &str, show_alert: bool) -> Result<()> {
        self.append(message, logger, show_alert, true)
    }

    /// Like [`Logger::log`], dropped unless dev mode is on.
    pub fn dev_log(&mut self, message: &str, logger: &str, show_alert: bool) -> Result<()> {
        if !self.dev_mode {
            return self.check(logger);
        }
        self.append(message, logger, show_alert, true)
    }

    pub fn log_no_time(&mut self, message: &str, logger: &str, show_alert: bool) -> Result<()> {
        self.append(message, logger, show_alert, false)
    }

    pub fn log_dev_no_time(
        &mut self,
        message: &str,
        logger: &str,
        show_alert: bool,
    ) -> Result<()> {
        if !self.dev_mode {
            return self.check(logger);
        }
        self.append(message, logger, show_alert, false)
    }

    fn check(&self, logger: &str) -> Result<()> {
        if self.streams.contains_key(logger) {
            Ok(())
        } else {
            Err(GuiError::UnknownLogger(logger.to_string()))
        }
    }

    fn append(
        &mut self,
        message: &str,
        logger: &str,
        show_alert: bool,
        stamped: bool,
    ) -> Result<()> {
        let line = if stamped {
            format!("{}{message}", timestamp(self.elapsed_secs()))
        } else {
            message.to_string()
        };
        let stream = self
            .streams
            .get_mut(logger)
            .ok_or_else(|| GuiError::UnknownLogger(logger.to_string()))?;
        if stream.len() >= self.capacity {
            stream.pop_front();
        }
        trace!(logger = %logger, "{line}");
        stream.push_back(line);

        if show_alert {
            (self.alert)(message);
        }
        Ok(())
    }

    /// Page `page` of `logger`, newest line first.
    ///
    /// The last page is clamped to the lines that remain. A page starting past
    /// the oldest line is empty; it is not folded back onto the last page.
    pub fn logs(&self, logger: &str, page: usize) -> Result<Vec<&str>> {
        let stream = self.stream(logger)?;
        let start = page.saturating_mul(self.page_size);
        if start >= stream.len() {
            return Ok(Vec::new());
        }
        let end = (start + self.page_size).min(stream.len());
        Ok(stream
            .iter()
            .rev()
            .skip(start)
            .take(end - start)
            .map(String::as_str)
            .collect())
    }

    fn stream(&self, logger: &str) -> Result<&VecDeque<String>> {
        self.streams
            .get(logger)
            .ok_or_else(|| GuiError::UnknownLogger(logger.to_string()))
    }

    /// Stream names in creation order.
    pub fn loggers(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self, logger: &str) -> Result<usize> {
        Ok(self.stream(logger)?.len())
    }

    /// Number of non-empty pages; an empty stream has one (empty) page.
    pub fn page_count(&self, logger: &str) -> Result<usize> {
        let len = self.stream(logger)?.len();
        Ok(len.div_ceil(self.page_size).max(1))
    }

    pub fn clear(&mut self, logger: &str) -> Result<()> {
        self.streams
            .get_mut(logger)
            .ok_or_else(|| GuiError::UnknownLogger(logger.to_string()))?
            .clear();
        Ok(())
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.clock.now_ms() - self.start_ms) / 1000.0
    }

    /// Stream registered at construction.
    pub fn default_logger(&self) -> &str {
        &self.default_logger
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn set_dev_mode(&mut self, on: bool) {
        self.dev_mode = on;
    }
}
