pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Outbound link to the hand firmware.
///
/// Writes are fire-and-forget: nothing in this workspace waits for an
/// acknowledgement. `is_connected` gates whether a write is attempted at all.
pub trait Transport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn is_connected(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write(bytes)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
