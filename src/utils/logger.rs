use std::sync::atomic::{AtomicU8, Ordering};

use crate::bindings::{jsLog, LogLevel};
use crate::wasm_bindgen;

static MAX_LOG_LEVEL: AtomicU8 = AtomicU8::new(LoggerLevel::Info as u8);

/// Maximum level under which logs are actually forwarded to the JavaScript
/// console, settable at runtime through the `Dispatcher` API.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum LoggerLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

/// Facade through which all logs of this crate go, so they all end up in the
/// JavaScript console with the right level.
pub struct Logger {}

impl Logger {
    pub fn set_logger_level(new_level: LoggerLevel) {
        MAX_LOG_LEVEL.store(new_level as u8, Ordering::Relaxed);
    }

    pub fn error(text: &str) {
        if Logger::enabled(LoggerLevel::Error) {
            jsLog(LogLevel::Error, text);
        }
    }

    pub fn warn(text: &str) {
        if Logger::enabled(LoggerLevel::Warn) {
            jsLog(LogLevel::Warn, text);
        }
    }

    pub fn info(text: &str) {
        if Logger::enabled(LoggerLevel::Info) {
            jsLog(LogLevel::Info, text);
        }
    }

    pub fn debug(text: &str) {
        if Logger::enabled(LoggerLevel::Debug) {
            jsLog(LogLevel::Debug, text);
        }
    }

    fn enabled(level: LoggerLevel) -> bool {
        MAX_LOG_LEVEL.load(Ordering::Relaxed) >= level as u8
    }
}
