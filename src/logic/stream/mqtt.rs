//! Live MQTT subscription
//!
//! Polls the rumqttc event loop from a single task and hands every publish to
//! the handler synchronously, so handler calls never overlap.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::time::Instant;

use super::{MessageHandler, StopCondition, StreamError, StreamStats};
use crate::logic::config::BrokerConfig;

/// Back-off before polling again after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Request channel capacity between client and event loop
const CHANNEL_CAPACITY: usize = 10;

/// Subscribe to `topic` and feed messages to `handler` until `stop` or Ctrl-C
pub async fn run_stream<H: MessageHandler + ?Sized>(
    broker: &BrokerConfig,
    topic: &str,
    handler: &mut H,
    stop: StopCondition,
) -> Result<StreamStats, StreamError> {
    let mut options = MqttOptions::new(broker.client_id.as_str(), broker.host.as_str(), broker.port);
    options.set_keep_alive(Duration::from_secs(broker.keep_alive_secs.max(5)));

    let (client, mut eventloop) = AsyncClient::new(options, CHANNEL_CAPACITY);

    let deadline = stop.duration.map(|d| Instant::now() + d);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stats = StreamStats::default();
    // Set after a connection error; polling resumes once it has passed
    let mut reconnect_at: Option<Instant> = None;

    log::info!("Connecting to {}:{} as '{}' (topic: {})",
        broker.host, broker.port, broker.client_id, topic);

    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                if let Err(e) = res {
                    log::warn!("Ctrl-C handler failed: {}", e);
                }
                log::info!("Interrupted - stopping stream");
                break;
            }
            _ = wait_until(deadline) => {
                log::info!("Run duration reached - stopping stream");
                break;
            }
            _ = wait_until(reconnect_at), if reconnect_at.is_some() => {
                reconnect_at = None;
            }
            event = eventloop.poll(), if reconnect_at.is_none() => match event {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // Subscriptions do not survive a reconnect with a clean session
                    log::info!("Connected to broker, subscribing to {}", topic);
                    client.try_subscribe(topic, QoS::AtMostOnce)?;
                }
                Ok(Event::Incoming(Packet::SubAck(_))) => {
                    log::info!("Subscribed to {}", topic);
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    stats.dispatch(handler, &publish.topic, &publish.payload);
                    if stop.samples_reached(stats.accepted) {
                        log::info!("Sample limit reached ({}) - stopping stream", stats.accepted);
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("MQTT connection error: {} - retrying in {:?}", e, RECONNECT_DELAY);
                    reconnect_at = Some(Instant::now() + RECONNECT_DELAY);
                }
            }
        }
    }

    if let Err(e) = client.try_disconnect() {
        log::debug!("Disconnect request not sent: {}", e);
    }

    log::info!("Stream closed: received={} accepted={}", stats.received, stats.accepted);
    Ok(stats)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
