//! Browser console logging.
//!
//! Installs a `tracing-subscriber` fmt layer whose writer forwards each
//! formatted event to the matching `console.*` method.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use wasm_bindgen::JsValue;

/// Filter used unless the page asks for another one.
pub const DEFAULT_DIRECTIVES: &str = "info,display_core=debug,display_app=debug";

/// Hands out one [`ConsoleWriter`] per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

/// Buffers a single formatted event and writes it to the console on drop.
#[derive(Debug)]
pub struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buffer);
        let line = JsValue::from_str(text.trim_end());

        if self.level == Level::ERROR {
            web_sys::console::error_1(&line);
        } else if self.level == Level::WARN {
            web_sys::console::warn_1(&line);
        } else if self.level == Level::INFO {
            web_sys::console::info_1(&line);
        } else if self.level == Level::DEBUG {
            web_sys::console::debug_1(&line);
        } else {
            web_sys::console::log_1(&line);
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buffer: Vec::new(),
        }
    }
}

/// Install the console subscriber. Later calls are no-ops.
///
/// Invalid directives fall back to [`DEFAULT_DIRECTIVES`].
pub fn init_logging(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|err| {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "Invalid log filter '{directives}': {err}"
        )));
        EnvFilter::new(DEFAULT_DIRECTIVES)
    });

    // wasm32-unknown-unknown has no system clock for the default timer.
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .with_writer(ConsoleMakeWriter);

    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Console logging already initialized");
    }
}
