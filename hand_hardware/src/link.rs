//! Byte-stream link to the hand.
//!
//! `write` never blocks the control loop: frames go into a bounded queue and a
//! dedicated thread pushes them into the underlying writer. Any I/O error
//! marks the link disconnected; the dispatcher then drops new writes until a
//! fresh link is opened.

use crossbeam_channel as xch;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::{LinkError, Result};
use hand_traits::Transport;

pub struct LinkTransport {
    tx: Option<xch::Sender<Vec<u8>>>,
    connected: Arc<AtomicBool>,
    written: Arc<AtomicU64>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl core::fmt::Debug for LinkTransport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LinkTransport")
            .field("connected", &self.connected.load(Ordering::Relaxed))
            .field("written", &self.written.load(Ordering::Relaxed))
            .finish()
    }
}

impl LinkTransport {
    /// Start the writer thread over `writer`.
    pub fn spawn<W>(writer: W, queue_depth: usize) -> Self
    where
        W: Write + Send + 'static,
    {
        let (tx, rx) = xch::bounded::<Vec<u8>>(queue_depth.max(1));
        let connected = Arc::new(AtomicBool::new(true));
        let written = Arc::new(AtomicU64::new(0));
        let conn = connected.clone();
        let count = written.clone();

        let join_handle = std::thread::spawn(move || {
            let mut writer = writer;
            for frame in rx {
                let res = writer.write_all(&frame).and_then(|()| writer.flush());
                match res {
                    Ok(()) => {
                        count.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "link writer failed; marking disconnected");
                        conn.store(false, Ordering::Release);
                        break;
                    }
                }
            }
            tracing::trace!("link writer thread exiting");
        });

        Self {
            tx: Some(tx),
            connected,
            written,
            join_handle: Some(join_handle),
        }
    }

    /// Open a device node (e.g. `/dev/rfcomm0`) for writing.
    pub fn open(path: &Path, queue_depth: usize) -> Result<Self> {
        let file = OpenOptions::new().write(true).open(path)?;
        tracing::info!(device = %path.display(), "link opened");
        Ok(Self::spawn(file, queue_depth))
    }

    /// Frames successfully handed to the writer so far.
    pub fn frames_written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    fn enqueue(&self, bytes: &[u8]) -> Result<()> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(LinkError::Disconnected);
        }
        let tx = self.tx.as_ref().ok_or(LinkError::Disconnected)?;
        tx.try_send(bytes.to_vec()).map_err(|e| match e {
            xch::TrySendError::Full(_) => LinkError::QueueFull,
            xch::TrySendError::Disconnected(_) => LinkError::Disconnected,
        })
    }
}

impl Transport for LinkTransport {
    fn write(&mut self, bytes: &[u8]) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.enqueue(bytes).map_err(Into::into)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Drop for LinkTransport {
    fn drop(&mut self) {
        // Closing the queue lets the writer drain and exit.
        drop(self.tx.take());
        if let Some(handle) = self.join_handle.take() {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "link writer thread panicked during shutdown");
            }
        }
    }
}
