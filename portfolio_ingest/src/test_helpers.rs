use std::{fmt, io, sync::Arc};

use parking_lot::Mutex;
use tracing::{Level, subscriber::DefaultGuard};

/// Captures the events logged on the current thread at `WARN` and above, as plain text
///
/// Installed as the thread's default subscriber until dropped.
#[derive(Debug)]
pub(crate) struct TracingCapture {
    logs: Arc<Mutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

impl TracingCapture {
    pub(crate) fn new() -> Self {
        let logs = Arc::new(Mutex::new(Vec::new()));
        let writer = CaptureWriter(Arc::clone(&logs));
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self {
            logs,
            _guard: guard,
        }
    }
}

impl fmt::Display for TracingCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.logs.lock()))
    }
}

#[derive(Debug, Clone)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
