use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Cross-context message channel carrying raw telemetry payloads.
///
/// Senders are cheap to clone and may live on other threads; the receiving
/// half stays with the event loop and is drained between events.
pub struct TelemetryChannel {
    sender: Sender<String>,
    receiver: Receiver<String>,
}

/// Producer handle for a [`TelemetryChannel`].
#[derive(Clone)]
pub struct TelemetrySender {
    inner: Sender<String>,
}

impl TelemetrySender {
    /// Post a payload. Returns `false` once the receiving side is gone.
    pub fn post(&self, payload: impl Into<String>) -> bool {
        self.inner.send(payload.into()).is_ok()
    }
}

impl Default for TelemetryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryChannel {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> TelemetrySender {
        TelemetrySender {
            inner: self.sender.clone(),
        }
    }

    /// Take every payload queued so far without blocking.
    pub fn drain(&self) -> Vec<String> {
        let mut payloads = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(payload) => payloads.push(payload),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        payloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_arrival_order() {
        let channel = TelemetryChannel::new();
        let sender = channel.sender();
        assert!(sender.post("a"));
        assert!(sender.clone().post("b"));
        assert_eq!(channel.drain(), vec!["a".to_string(), "b".to_string()]);
        assert!(channel.drain().is_empty());
    }

    #[test]
    fn senders_work_across_threads() {
        let channel = TelemetryChannel::new();
        let sender = channel.sender();
        std::thread::spawn(move || {
            sender.post(r#"{"seats":[]}"#);
        })
        .join()
        .unwrap();
        assert_eq!(channel.drain().len(), 1);
    }

    #[test]
    fn post_fails_after_channel_dropped() {
        let channel = TelemetryChannel::new();
        let sender = channel.sender();
        drop(channel);
        assert!(!sender.post("late"));
    }
}
