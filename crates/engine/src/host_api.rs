//! Host-API surface injected into an engine's global namespace: the
//! stable set of objects (`DSE`, `TP`, `Dir`, `File`, `Process`,
//! `Clipboard`, `Util`) scripts see. These are the Rust-side services a
//! concrete `ScriptEngine` binding wires into JS globals; this crate owns
//! their state and behavior, the binding only marshals calls.

use dsep_core::{DefaultType, Filter};
use dsep_store::ConnectorStore;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// `DSE` namespace: plugin/runtime identity and process-global defaults.
#[derive(Debug, Clone)]
pub struct DseNamespace {
    pub plugin_version: String,
    pub platform: String,
    pub scripts_base_dir: PathBuf,
    pub tp_current_page: Arc<parking_lot::RwLock<String>>,
    pub current_engine_name: String,
    pub current_instance_name: Option<String>,
    pub default_repeat_rate_ms: Arc<AtomicU64>,
    pub default_repeat_delay_ms: Arc<AtomicU64>,
}

impl DseNamespace {
    pub fn tp_current_page(&self) -> String {
        self.tp_current_page.read().clone()
    }

    pub fn set_tp_current_page(&self, page: impl Into<String>) {
        *self.tp_current_page.write() = page.into();
    }

    pub fn default_repeat_rate_ms(&self) -> u64 {
        self.default_repeat_rate_ms.load(Ordering::Relaxed)
    }

    pub fn set_default_repeat_rate_ms(&self, v: u64) {
        self.default_repeat_rate_ms.store(v, Ordering::Relaxed);
    }

    pub fn default_repeat_delay_ms(&self) -> u64 {
        self.default_repeat_delay_ms.load(Ordering::Relaxed)
    }

    pub fn set_default_repeat_delay_ms(&self, v: u64) {
        self.default_repeat_delay_ms.store(v, Ordering::Relaxed);
    }
}

/// `TP` namespace: Touch Portal state/choice/connector/notification bridge.
/// Each method returns the [`dsep_core::HostOutput`] the bridge should
/// forward, rather than sending it directly — the host-API layer has no
/// wire dependency, same reasoning as `dsep_core::hostmsg`.
pub struct TpNamespace {
    pub connectors: ConnectorStore,
}

impl TpNamespace {
    pub fn query_connectors(&self, filter: &Filter) -> Vec<dsep_core::ConnectorRecord> {
        self.connectors.query(filter)
    }

    pub fn lookup_connector(&self, short_id_pattern: &str) -> Option<dsep_core::ConnectorRecord> {
        self.connectors.get_by_short_id(short_id_pattern)
    }
}

/// `Dir` namespace: filesystem directory helpers.
pub struct DirNamespace {
    pub cwd: PathBuf,
    pub home: PathBuf,
    pub temp: PathBuf,
}

impl DirNamespace {
    pub fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    pub fn mkpath(&self, path: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(path)
    }

    pub fn rmdir(&self, path: &str, recursive: bool) -> std::io::Result<()> {
        if recursive {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_dir(path)
        }
    }

    /// Native separator for the host platform.
    pub fn separator(&self) -> char {
        std::path::MAIN_SEPARATOR
    }

    pub fn to_native(&self, path: &str) -> String {
        path.replace('/', &self.separator().to_string())
    }

    pub fn to_forward(&self, path: &str) -> String {
        path.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Line-read direction for `File.readLines`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadDirection {
    Forward,
    Backward,
}

/// `File` namespace: text/binary read-write plus `readLines`.
pub struct FileNamespace;

impl FileNamespace {
    pub fn read_text(&self, path: &str) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    pub fn write_text(&self, path: &str, contents: &str) -> std::io::Result<()> {
        std::fs::write(path, contents)
    }

    pub fn read_bytes(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    /// Read lines starting at `from_line`, forward or backward from the
    /// end, trimming the trailing newline of each line when requested.
    pub fn read_lines(
        &self,
        path: &str,
        direction: ReadDirection,
        from_line: i64,
        trim_trailing_newlines: bool,
    ) -> std::io::Result<Vec<String>> {
        let contents = std::fs::read_to_string(path)?;
        let mut lines: Vec<&str> = contents.lines().collect();
        if direction == ReadDirection::Backward {
            lines.reverse();
        }
        let start = if from_line < 0 { 0 } else { from_line as usize };
        let mut out: Vec<String> = lines.into_iter().skip(start).map(String::from).collect();
        if trim_trailing_newlines {
            while out.last().map(|l| l.is_empty()).unwrap_or(false) {
                out.pop();
            }
        }
        Ok(out)
    }

    pub fn copy(&self, from: &str, to: &str) -> std::io::Result<u64> {
        std::fs::copy(from, to)
    }

    pub fn rename(&self, from: &str, to: &str) -> std::io::Result<()> {
        std::fs::rename(from, to)
    }

    pub fn remove(&self, path: &str) -> std::io::Result<()> {
        std::fs::remove_file(path)
    }

    pub fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

/// `Process` namespace: one-shot and detached/attached child process
/// execution. Actual spawning is deferred to the bridge layer (which owns
/// the tokio runtime); this struct only carries the request shapes.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub program: String,
    pub args: Vec<String>,
    pub detached: bool,
    pub capture_stdio: bool,
}

/// `Clipboard` namespace: a MIME-typed get/set surface. The concrete
/// clipboard backend is platform-specific and supplied by the host process,
/// not this crate — this struct is the request/response contract a binding
/// marshals script calls through.
#[derive(Debug, Clone, Default)]
pub struct ClipboardRequest {
    pub mime_type: String,
    pub mode: ClipboardMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardMode {
    #[default]
    Clipboard,
    Selection,
    FindBuffer,
}

/// `Util` namespace: environment access, hashing, base64, URL parsing,
/// `include(path)`. `setTimeout`/`setInterval` are intentionally absent
/// here — they route through [`crate::timer::TimerManager`] directly.
pub struct UtilNamespace;

impl UtilNamespace {
    pub fn env_get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    pub fn env_put(&self, name: &str, value: &str) {
        std::env::set_var(name, value);
    }

    pub fn env_unset(&self, name: &str) {
        std::env::remove_var(name);
    }

    pub fn env_is_set(&self, name: &str) -> bool {
        std::env::var(name).is_ok()
    }

    pub fn base64_encode(&self, data: &[u8]) -> String {
        base64_simple::encode(data)
    }

    pub fn base64_decode(&self, data: &str) -> Option<Vec<u8>> {
        base64_simple::decode(data)
    }
}

/// Resolve a property's at-startup default source by `DefaultType`:
/// `FixedValue` uses `default_value` verbatim; `CustomExpression`
/// and `MainExpression` require evaluation by the caller (this only picks
/// the source), `None` yields no default at all.
pub fn resolve_default_source<'a>(
    default_type: DefaultType,
    default_value: &'a str,
    main_expression: &'a str,
) -> Option<&'a str> {
    match default_type {
        DefaultType::None => None,
        DefaultType::FixedValue => Some(default_value),
        DefaultType::CustomExpression => Some(default_value),
        DefaultType::MainExpression => Some(main_expression),
    }
}

/// Minimal base64 codec so `Util.base64Encode/Decode` don't depend on the
/// `base64` crate for a handful of call sites; kept intentionally tiny.
mod base64_simple {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    pub fn encode(data: &[u8]) -> String {
        let mut out = String::with_capacity((data.len() + 2) / 3 * 4);
        for chunk in data.chunks(3) {
            let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
            let n = ((b[0] as u32) << 16) | ((b[1] as u32) << 8) | b[2] as u32;
            out.push(ALPHABET[(n >> 18 & 0x3f) as usize] as char);
            out.push(ALPHABET[(n >> 12 & 0x3f) as usize] as char);
            out.push(if chunk.len() > 1 { ALPHABET[(n >> 6 & 0x3f) as usize] as char } else { '=' });
            out.push(if chunk.len() > 2 { ALPHABET[(n & 0x3f) as usize] as char } else { '=' });
        }
        out
    }

    pub fn decode(s: &str) -> Option<Vec<u8>> {
        let s = s.trim_end_matches('=');
        let mut out = Vec::with_capacity(s.len() * 3 / 4);
        let mut buf = 0u32;
        let mut bits = 0u32;
        for c in s.bytes() {
            let v = ALPHABET.iter().position(|&a| a == c)? as u32;
            buf = (buf << 6) | v;
            bits += 6;
            if bits >= 8 {
                bits -= 8;
                out.push((buf >> bits) as u8);
            }
        }
        Some(out)
    }
}

#[cfg(test)]
#[path = "host_api_tests.rs"]
mod tests;
