pub mod amqp_broker;
pub mod publisher;
