use crate::error::{BrokerError, SimulationError};
use crate::shared_data::Event;

/// Broker confirmation that a message was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgment {
    pub topic: String,
    pub partition: i32,
}

/// Minimal capability the simulator needs from a message broker.
///
/// `publish` blocks until the broker acknowledged (or refused) the message.
pub trait Broker {
    fn publish(&mut self, topic: &str, key: &str, payload: &[u8])
        -> Result<Acknowledgment, BrokerError>;
}

/// Result of sending one event.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    Delivered { topic: String, partition: i32 },
    Failed { topic: String, reason: String },
}

impl PublishOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, PublishOutcome::Delivered { .. })
    }
}

/// Encodes an event as a UTF-8 JSON object.
pub fn encode_event(event: &Event) -> Result<Vec<u8>, SimulationError> {
    Ok(serde_json::to_vec(event)?)
}

/// Sends serialized events through a [`Broker`], one at a time.
#[derive(Debug)]
pub struct Publisher<B> {
    broker: B,
}

impl<B: Broker> Publisher<B> {
    pub fn new(broker: B) -> Self {
        Self { broker }
    }

    /// Publishes `event` to `topic`, keyed by the event id.
    ///
    /// Delivery failures are logged and returned as [`PublishOutcome::Failed`];
    /// only an encoding failure is an `Err`.
    pub fn publish(&mut self, topic: &str, event: &Event) -> Result<PublishOutcome, SimulationError> {
        let payload = encode_event(event)?;
        let key = event.id().to_string();

        let outcome = match self.broker.publish(topic, &key, &payload) {
            Ok(ack) => {
                log::info!("Message delivered to {} [{}]", ack.topic, ack.partition);
                PublishOutcome::Delivered {
                    topic: ack.topic,
                    partition: ack.partition,
                }
            }
            Err(e) => {
                log::error!("Message delivery failed: {} (key {})", e, key);
                PublishOutcome::Failed {
                    topic: topic.to_string(),
                    reason: e.to_string(),
                }
            }
        };
        Ok(outcome)
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    pub fn into_inner(self) -> B {
        self.broker
    }
}
