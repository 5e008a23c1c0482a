use tokio::sync::mpsc;
use tracing::debug;

use crate::{KeyEvent, KeyEventSource};

/// Creates a bounded channel whose receiving end is polled by the controller.
pub fn key_channel(capacity: usize) -> (mpsc::Sender<KeyEvent>, ChannelKeySource) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelKeySource::new(rx))
}

pub struct ChannelKeySource {
    rx: mpsc::Receiver<KeyEvent>,
    closed: bool,
}

impl ChannelKeySource {
    pub fn new(rx: mpsc::Receiver<KeyEvent>) -> Self {
        Self { rx, closed: false }
    }

    /// True once every sender has been dropped and the queue is drained.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl KeyEventSource for ChannelKeySource {
    fn poll(&mut self) -> Option<KeyEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                if !self.closed {
                    debug!("key event channel closed");
                    self.closed = true;
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_order_then_reports_closed() {
        let (tx, mut source) = key_channel(4);
        tx.try_send(KeyEvent::pressed(3)).unwrap();
        tx.try_send(KeyEvent::released(3)).unwrap();

        assert_eq!(source.poll(), Some(KeyEvent::pressed(3)));
        assert_eq!(source.poll(), Some(KeyEvent::released(3)));
        assert_eq!(source.poll(), None);
        assert!(!source.is_closed());

        drop(tx);
        assert_eq!(source.poll(), None);
        assert!(source.is_closed());
    }
}
