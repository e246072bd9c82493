use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// In-process fan-out of proctoring tab events. Publishing never waits on
/// observers and succeeds with nobody listening.
#[derive(Clone)]
pub struct ProctorBroadcaster {
    sender: broadcast::Sender<Value>,
}

impl Default for ProctorBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ProctorBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Stamps the payload with `at` (epoch millis) and sends it. Returns the
    /// event as sent.
    pub fn publish(&self, mut payload: Map<String, Value>) -> Value {
        payload.insert("at".to_string(), Value::from(Utc::now().timestamp_millis()));
        let event = Value::Object(payload);

        match self.sender.send(event.clone()) {
            Ok(receivers) => log::debug!("Tab event delivered to {} observers", receivers),
            Err(_) => log::debug!("Tab event dropped, no observers"),
        }
        event
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.sender.subscribe()
    }
}
