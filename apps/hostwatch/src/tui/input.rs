use std::io::{self, BufRead, BufReader, ErrorKind};
use std::str;
use std::thread;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info};

/// Lines buffered between the reader thread and the scheduler
const INPUT_BUFFER: usize = 16;

/// Spawn a thread that forwards operator input lines from stdin.
///
/// Runs on a plain OS thread: a blocking stdin read cannot be cancelled and
/// must not hold up runtime shutdown. The channel closes at end of file.
pub fn spawn_stdin_reader() -> io::Result<mpsc::Receiver<String>> {
    spawn_line_reader(BufReader::new(io::stdin()))
}

/// Spawn a thread that forwards each line of `reader` to the returned channel
pub fn spawn_line_reader<R>(reader: R) -> io::Result<mpsc::Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(INPUT_BUFFER);
    thread::Builder::new().name("input-reader".into()).spawn(move || forward_lines(reader, tx))?;
    Ok(rx)
}

/// Only end of input or a read error stops forwarding; a line that is not
/// UTF-8 is dropped.
fn forward_lines<R: BufRead>(mut reader: R, tx: mpsc::Sender<String>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                info!("Operator input closed");
                return;
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("Failed to read operator input: {}", e);
                return;
            }
        }

        let line = match str::from_utf8(&buf) {
            Ok(line) => line.trim_end_matches(['\n', '\r']).to_owned(),
            Err(e) => {
                debug!("Ignoring operator input that is not UTF-8: {}", e);
                continue;
            }
        };
        if tx.blocking_send(line).is_err() {
            return;
        }
    }
}

/// Bounded wait for one line of operator input
pub struct InputGate {
    rx: mpsc::Receiver<String>,
    window: Duration,
    closed: bool,
}

impl InputGate {
    pub fn new(rx: mpsc::Receiver<String>, window: Duration) -> Self {
        Self { rx, window, closed: false }
    }

    /// Wait up to the window for a line.
    ///
    /// Returns `None` when the window elapses. Once the input side has
    /// closed every call still takes the full window, so the caller's
    /// cadence does not change.
    pub async fn wait(&mut self) -> Option<String> {
        if self.closed {
            sleep(self.window).await;
            return None;
        }

        match timeout(self.window, self.rx.recv()).await {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                debug!("Input channel closed, falling back to timed refresh");
                self.closed = true;
                sleep(self.window).await;
                None
            }
            Err(_) => None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }
}
