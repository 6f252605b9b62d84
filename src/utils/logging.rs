//! Structured Logging with Sensitive Data Redaction
//!
//! Every line goes to stderr so stdout stays reserved for signed output.
//! Field values are redacted by key name:
//! - Key material is never printed
//! - Addresses keep a short prefix and suffix
//! - Digests and signatures are shortened

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn label(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a field value is shown, chosen from the field's key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redaction {
    /// Only the length survives
    Full,
    /// `0x2c7536...5c23`
    Address,
    /// `0xdaf5a779ae...4c8e53`
    Hash,
    Plain,
}

const SECRET_KEYS: &[&str] = &["private_key", "privatekey", "secret", "key_hex", "signing_key"];
const ADDRESS_KEYS: &[&str] = &["address", "signer", "sender", "from", "to", "verifying_contract"];
const HASH_KEYS: &[&str] = &["hash", "digest", "signature", "raw"];

impl Redaction {
    pub fn for_key(key: &str) -> Self {
        let key = key.to_ascii_lowercase();
        let matches = |names: &[&str]| names.iter().any(|name| key.contains(name));

        if matches(SECRET_KEYS) {
            Redaction::Full
        } else if matches(ADDRESS_KEYS) {
            Redaction::Address
        } else if matches(HASH_KEYS) {
            Redaction::Hash
        } else {
            Redaction::Plain
        }
    }

    pub fn apply(self, value: &str) -> String {
        let value = value.trim();
        if value.is_empty() {
            return "[EMPTY]".to_string();
        }

        match self {
            Redaction::Full if value.len() <= 4 => "[REDACTED]".to_string(),
            Redaction::Full => format!("[REDACTED:{}chars]", value.len()),
            Redaction::Address => shorten(value, 6, 4).unwrap_or_else(|| Redaction::Full.apply(value)),
            Redaction::Hash => shorten(value, 10, 6).unwrap_or_else(|| value.to_string()),
            Redaction::Plain => value.to_string(),
        }
    }
}

/// Keep `head` hex chars after an optional `0x` and the last `tail` chars
fn shorten(value: &str, head: usize, tail: usize) -> Option<String> {
    let prefix = if value.starts_with("0x") { 2 } else { 0 };
    let keep = prefix + head;
    if value.len() <= keep + tail + 3 || !value.is_ascii() {
        return None;
    }
    Some(format!("{}...{}", &value[..keep], &value[value.len() - tail..]))
}

#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, redacted according to its key
    pub fn field(self, key: &'static str, value: impl fmt::Display) -> Self {
        self.field_with(key, value, Redaction::for_key(key))
    }

    pub fn redacted_field(self, key: &'static str, value: impl fmt::Display) -> Self {
        self.field_with(key, value, Redaction::Full)
    }

    fn field_with(mut self, key: &'static str, value: impl fmt::Display, redaction: Redaction) -> Self {
        self.fields.push((key, redaction.apply(&value.to_string())));
        self
    }

    /// The line without its timestamp
    pub fn render(&self) -> String {
        let mut line = format!("{} [{}] {}", self.level, self.module, self.message);
        for (i, (key, value)) in self.fields.iter().enumerate() {
            line.push_str(if i == 0 { " | " } else { " " });
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }

    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        eprintln!("[{}] {}", timestamp, self.render());
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! log_at {
    ($level:ident, $module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::$level,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// `log_debug!("tx", "payload hashed", digest = hex::encode(d))`
#[macro_export]
macro_rules! log_debug {
    ($($args:tt)*) => { $crate::log_at!(Debug, $($args)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($args:tt)*) => { $crate::log_at!(Info, $($args)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($args:tt)*) => { $crate::log_at!(Warn, $($args)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($args:tt)*) => { $crate::log_at!(Error, $($args)*) };
}
