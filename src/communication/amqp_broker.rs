//! RabbitMQ implementation of `Broker`. Each topic is a queue reached through the
//! default direct exchange; publisher confirms provide the delivery acknowledgment.

use crate::communication::publisher::{Acknowledgment, Broker};
use crate::error::BrokerError;
use amiquip::{
    AmqpProperties, Channel, Confirm, Connection, Exchange, Publish, QueueDeclareOptions,
};
use std::collections::HashSet;
use std::time::{Duration, Instant};

enum ConfirmPoll {
    Received(Confirm),
    TimedOut,
    Disconnected,
}

type ConfirmWait = Box<dyn FnMut(Duration) -> ConfirmPoll + Send>;

pub struct AmqpBroker {
    connection: Connection,
    channel: Channel,
    next_confirm: ConfirmWait,
    topics: HashSet<String>,
    ack_timeout: Duration,
    next_delivery_tag: u64,
}

impl AmqpBroker {
    /// Opens a connection, declares one queue per topic and enables
    /// publisher confirms.
    pub fn connect(url: &str, topics: &[&str], ack_timeout: Duration) -> Result<Self, BrokerError> {
        let mut connection = Connection::insecure_open(url)?;
        let channel = connection.open_channel(None)?;
        for topic in topics {
            channel.queue_declare(*topic, QueueDeclareOptions::default())?;
        }
        channel.enable_publisher_confirms()?;
        let confirms = channel.listen_for_publisher_confirms()?;
        let next_confirm: ConfirmWait = Box::new(move |timeout| match confirms.recv_timeout(timeout) {
            Ok(confirm) => ConfirmPoll::Received(confirm),
            Err(e) if e.is_timeout() => ConfirmPoll::TimedOut,
            Err(_) => ConfirmPoll::Disconnected,
        });

        log::info!("Connected to RabbitMQ at {} ({} topics)", url, topics.len());
        Ok(Self {
            connection,
            channel,
            next_confirm,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            ack_timeout,
            next_delivery_tag: 1,
        })
    }

    /// Closes the channel and the connection.
    pub fn close(self) -> Result<(), BrokerError> {
        self.channel.close()?;
        self.connection.close()?;
        log::info!("RabbitMQ connection closed");
        Ok(())
    }

    fn wait_for_confirm(&mut self, topic: &str, delivery_tag: u64) -> Result<(), BrokerError> {
        let deadline = Instant::now() + self.ack_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(BrokerError::AckTimeout {
                    topic: topic.to_string(),
                    timeout: self.ack_timeout,
                });
            }
            let confirm = match (self.next_confirm)(remaining) {
                ConfirmPoll::Received(confirm) => confirm,
                ConfirmPoll::TimedOut => continue,
                ConfirmPoll::Disconnected => {
                    return Err(BrokerError::Other(
                        "publisher confirm stream closed".to_string(),
                    ))
                }
            };
            let (payload, acked) = match confirm {
                Confirm::Ack(payload) => (payload, true),
                Confirm::Nack(payload) => (payload, false),
            };
            let covers_ours = payload.delivery_tag == delivery_tag
                || (payload.multiple && payload.delivery_tag > delivery_tag);
            if !covers_ours {
                // confirm for an earlier, abandoned message
                continue;
            }
            return if acked {
                Ok(())
            } else {
                Err(BrokerError::Nacked {
                    topic: topic.to_string(),
                })
            };
        }
    }
}

impl Broker for AmqpBroker {
    fn publish(
        &mut self,
        topic: &str,
        key: &str,
        payload: &[u8],
    ) -> Result<Acknowledgment, BrokerError> {
        if !self.topics.contains(topic) {
            return Err(BrokerError::UnknownTopic(topic.to_string()));
        }

        let properties = AmqpProperties::default()
            .with_message_id(key.to_string())
            .with_content_type("application/json".to_string());
        Exchange::direct(&self.channel).publish(Publish::with_properties(
            payload, topic, properties,
        ))?;

        let delivery_tag = self.next_delivery_tag;
        self.next_delivery_tag += 1;
        self.wait_for_confirm(topic, delivery_tag)?;

        // RabbitMQ queues are not partitioned.
        Ok(Acknowledgment {
            topic: topic.to_string(),
            partition: 0,
        })
    }
}
