use std::io::{self, Write};

use wasm_bindgen::JsValue;

/// `tracing` writer that forwards each formatted event to `console.log`.
#[derive(Default)]
pub(super) struct ConsoleWriter {
    buf: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let line = String::from_utf8_lossy(&self.buf);
            web_sys::console::log_1(&JsValue::from_str(line.trim_end()));
            self.buf.clear();
        }
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

pub(super) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleWriter::default)
        .without_time()
        .try_init();
}
