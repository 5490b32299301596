// Publishes the latest accelerometer sample to an MQTT broker.
//
// Every publish interval the most recent sample of the feed is serialized as JSON and
// sent to `dcapp/<device_id>/accelerometer` with QoS 1. The rumqttc event loop is polled
// in its own task so a publish tick never interrupts a connection attempt; ConnAck marks
// the service connected, connection errors mark it disconnected until it reconnects.
// Stopping sends DISCONNECT and waits a bounded time for it to be flushed.

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;

use crate::constants::{DEFAULT_MQTT_PORT, TOPIC_PREFIX};
use crate::models::config::BroadcastConfig;
use crate::models::errors::BroadcastError;
use crate::models::feed::SampleFeed;
use crate::models::message::AccelMessage;
use crate::models::state::ServiceState;
use crate::models::status::ConnectionStatus;
use crate::ports::BroadcastPort;

const KEEP_ALIVE_SECS: u64 = 5;
const REQUEST_CHANNEL_CAPACITY: usize = 10;
const RECONNECT_DELAY_MILLIS: u64 = 1000;
const STOP_TIMEOUT_MILLIS: u64 = 2000;
const DISCONNECT_TIMEOUT_MILLIS: u64 = 500;

struct Worker {
    abort_signal: Arc<Notify>,
    handle: JoinHandle<()>,
}

/// MQTT publishing service
pub struct MqttBroadcaster {
    feed: SampleFeed,
    state: Arc<ServiceState>,
    worker: Mutex<Option<Worker>>,
}

impl MqttBroadcaster {
    pub fn new(feed: SampleFeed) -> Self {
        Self {
            feed,
            state: Arc::new(ServiceState::new()),
            worker: Mutex::new(None),
        }
    }
}

#[async_trait]
impl BroadcastPort for MqttBroadcaster {
    async fn start(&self, config: BroadcastConfig) -> Result<(), BroadcastError> {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            return Err(BroadcastError::AlreadyRunning);
        }

        log::info!(
            "Starting broadcast to {} every {} ms",
            config.broker_address.as_deref().unwrap_or("<none>"),
            config.rate.millis()
        );
        self.state.begin(&config);

        let abort_signal = Arc::new(Notify::new());
        let handle = tokio::spawn(run_publisher(
            config,
            self.feed.clone(),
            self.state.clone(),
            abort_signal.clone(),
        ));
        *worker = Some(Worker {
            abort_signal,
            handle,
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), BroadcastError> {
        let Some(mut worker) = self.worker.lock().await.take() else {
            return Ok(());
        };

        log::info!("Stopping broadcast...");
        worker.abort_signal.notify_one();
        let stop_timeout = Duration::from_millis(STOP_TIMEOUT_MILLIS);
        if tokio::time::timeout(stop_timeout, &mut worker.handle)
            .await
            .is_err()
        {
            log::warn!("Broadcast task didn't stop in time, aborting it");
            worker.handle.abort();
        }
        self.state.end();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state.is_running()
    }

    fn status(&self) -> ConnectionStatus {
        self.state.status()
    }

    fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.state.subscribe()
    }

    fn mark_connecting(&self) {
        self.state.set_status(ConnectionStatus::Connecting);
    }

    fn publish_rate_millis(&self) -> u64 {
        self.state.publish_rate_millis()
    }

    fn broker_address(&self) -> Option<String> {
        self.state.broker_address()
    }
}

/// Splits `host:port`. A missing port defaults to 1883, and `tcp://` / `mqtt://` schemes
/// are ignored.
pub(crate) fn parse_broker_address(address: Option<&str>) -> Result<(String, u16), BroadcastError> {
    let address = address.ok_or(BroadcastError::MissingAddress)?.trim();
    let address = address
        .strip_prefix("tcp://")
        .or_else(|| address.strip_prefix("mqtt://"))
        .unwrap_or(address);

    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| BroadcastError::InvalidAddress(address.to_string()))?;
            (host, port)
        }
        None => (address, DEFAULT_MQTT_PORT),
    };
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(BroadcastError::InvalidAddress(address.to_string()));
    }
    Ok((host.to_string(), port))
}

pub(crate) fn topic_for(device_id: &str) -> String {
    format!("{TOPIC_PREFIX}/{device_id}/accelerometer")
}

async fn run_publisher(
    config: BroadcastConfig,
    feed: SampleFeed,
    state: Arc<ServiceState>,
    abort_signal: Arc<Notify>,
) {
    let (host, port) = match parse_broker_address(config.broker_address.as_deref()) {
        Ok(address) => address,
        Err(e) => {
            log::error!("{e}");
            state.set_status(ConnectionStatus::Failed);
            return;
        }
    };

    let mut options = MqttOptions::new(config.device_id.clone(), host, port);
    options.set_keep_alive(Duration::from_secs(KEEP_ALIVE_SECS));
    let (client, eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);
    let mut connection = tokio::spawn(drive_connection(eventloop, state.clone()));

    let topic = topic_for(&config.device_id);
    let mut interval = tokio::time::interval(config.rate.period());

    loop {
        tokio::select! {
            _ = abort_signal.notified() => {
                break;
            }

            _ = interval.tick() => {
                let Some(sample) = feed.latest() else {
                    continue;
                };
                let message = AccelMessage::new(&config.device_id, &sample);
                match serde_json::to_vec(&message) {
                    Ok(payload) => {
                        // Full request queue means the broker is unreachable; the sample
                        // is dropped instead of blocking the tick
                        let result =
                            client.try_publish(topic.clone(), QoS::AtLeastOnce, false, payload);
                        if let Err(e) = result {
                            log::debug!("Dropping sample: {e}");
                        }
                    }
                    Err(e) => log::error!("{}", BroadcastError::Publish(e.to_string())),
                }
            }
        }
    }

    if let Err(e) = client.try_disconnect() {
        log::debug!("Error disconnecting: {e}");
    }
    let disconnect_timeout = Duration::from_millis(DISCONNECT_TIMEOUT_MILLIS);
    if tokio::time::timeout(disconnect_timeout, &mut connection)
        .await
        .is_err()
    {
        log::debug!("DISCONNECT not sent in time, dropping connection");
        connection.abort();
    }
}

/// Polls the event loop until DISCONNECT has been flushed to the broker
async fn drive_connection(mut eventloop: EventLoop, state: Arc<ServiceState>) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                state.set_status(ConnectionStatus::Connected);
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                log::debug!("Disconnected from broker");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Connection error: {e}");
                state.set_status(ConnectionStatus::Disconnected);
                tokio::time::sleep(Duration::from_millis(RECONNECT_DELAY_MILLIS)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::PublishRate;
    use bytes::BytesMut;
    use common::types::Sample3D;
    use rumqttc::{ConnAck, ConnectReturnCode, PubAck};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const MAX_PACKET_SIZE: usize = 10 * 1024;
    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Client connection accepted by a minimal in-process broker
    struct BrokerSide {
        stream: TcpStream,
        buffer: BytesMut,
    }

    impl BrokerSide {
        /// Accepts the client and answers its CONNECT with a successful CONNACK
        async fn accept(listener: &TcpListener, client_id: &str) -> Self {
            let (stream, _) = tokio::time::timeout(TEST_TIMEOUT, listener.accept())
                .await
                .expect("Client did not connect")
                .unwrap();
            let mut broker = Self {
                stream,
                buffer: BytesMut::new(),
            };

            let Packet::Connect(connect) = broker.next_packet().await else {
                panic!("Expected CONNECT");
            };
            assert_eq!(connect.client_id, client_id);
            broker.send_connack().await;
            broker
        }

        async fn next_packet(&mut self) -> Packet {
            loop {
                match rumqttc::mqttbytes::v4::read(&mut self.buffer, MAX_PACKET_SIZE) {
                    Ok(packet) => return packet,
                    Err(rumqttc::mqttbytes::Error::InsufficientBytes(_)) => {}
                    Err(e) => panic!("Malformed packet: {e}"),
                }
                let read = self.stream.read_buf(&mut self.buffer);
                let read = tokio::time::timeout(TEST_TIMEOUT, read)
                    .await
                    .expect("No packet received")
                    .unwrap();
                assert!(read > 0, "Client closed the connection");
            }
        }

        async fn send_connack(&mut self) {
            let mut out = BytesMut::new();
            ConnAck::new(ConnectReturnCode::Success, false)
                .write(&mut out)
                .unwrap();
            self.stream.write_all(&out).await.unwrap();
        }

        async fn send_puback(&mut self, pkid: u16) {
            let mut out = BytesMut::new();
            PubAck::new(pkid).write(&mut out).unwrap();
            self.stream.write_all(&out).await.unwrap();
        }
    }

    async fn start_with_local_broker(
        device_id: &str,
    ) -> (MqttBroadcaster, TcpListener, BroadcastConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let feed = SampleFeed::new();
        feed.update(Sample3D::new(1.5, [0.5, -1.0, 9.75]));
        let broadcaster = MqttBroadcaster::new(feed);
        let config = BroadcastConfig {
            device_id: device_id.to_string(),
            broker_address: Some(listener.local_addr().unwrap().to_string()),
            rate: PublishRate::new(4),
        };
        broadcaster.start(config.clone()).await.unwrap();
        (broadcaster, listener, config)
    }

    #[test]
    fn test_parse_broker_address() {
        assert_eq!(
            parse_broker_address(Some("192.168.0.164:1883")).unwrap(),
            ("192.168.0.164".to_string(), 1883)
        );
        assert_eq!(
            parse_broker_address(Some("tcp://broker.local:8883")).unwrap(),
            ("broker.local".to_string(), 8883)
        );
        assert_eq!(
            parse_broker_address(Some(" localhost ")).unwrap(),
            ("localhost".to_string(), DEFAULT_MQTT_PORT)
        );
    }

    #[test]
    fn test_parse_invalid_broker_address() {
        assert!(matches!(
            parse_broker_address(None),
            Err(BroadcastError::MissingAddress)
        ));
        assert!(matches!(
            parse_broker_address(Some("host:port")),
            Err(BroadcastError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_broker_address(Some(":1883")),
            Err(BroadcastError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_broker_address(Some("NO DATA")),
            Err(BroadcastError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_topic() {
        assert_eq!(topic_for("abc123"), "dcapp/abc123/accelerometer");
    }

    #[tokio::test]
    async fn test_invalid_address_reports_failure() {
        let broadcaster = MqttBroadcaster::new(SampleFeed::new());
        let config = BroadcastConfig {
            device_id: "test".to_string(),
            broker_address: Some("NO DATA".to_string()),
            rate: PublishRate::default(),
        };
        let mut status = broadcaster.subscribe_status();

        broadcaster.start(config.clone()).await.unwrap();
        assert!(broadcaster.is_running());
        assert_eq!(broadcaster.publish_rate_millis(), 1000);
        assert_eq!(broadcaster.broker_address(), Some("NO DATA".to_string()));

        let failed = tokio::time::timeout(
            Duration::from_secs(1),
            status.wait_for(|s| *s == ConnectionStatus::Failed),
        )
        .await
        .is_ok_and(|changed| changed.is_ok());
        assert!(failed);

        assert!(matches!(
            broadcaster.start(config).await,
            Err(BroadcastError::AlreadyRunning)
        ));

        broadcaster.stop().await.unwrap();
        assert!(!broadcaster.is_running());
        assert_eq!(broadcaster.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_publishes_latest_sample() {
        let (broadcaster, listener, _) = start_with_local_broker("abc").await;
        let mut status = broadcaster.subscribe_status();
        let mut broker = BrokerSide::accept(&listener, "abc").await;

        let connected = tokio::time::timeout(
            TEST_TIMEOUT,
            status.wait_for(|s| *s == ConnectionStatus::Connected),
        )
        .await
        .is_ok_and(|changed| changed.is_ok());
        assert!(connected);

        let publish = loop {
            if let Packet::Publish(publish) = broker.next_packet().await {
                break publish;
            }
        };
        assert_eq!(publish.topic, "dcapp/abc/accelerometer");
        assert_eq!(publish.qos, QoS::AtLeastOnce);
        let message: serde_json::Value = serde_json::from_slice(&publish.payload).unwrap();
        assert_eq!(
            message,
            serde_json::json!({
                "device_id": "abc",
                "timestamp": 1.5,
                "x": 0.5,
                "y": -1.0,
                "z": 9.75
            })
        );
        broker.send_puback(publish.pkid).await;

        broadcaster.stop().await.unwrap();
        assert_eq!(broadcaster.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_stop_sends_disconnect() {
        let (broadcaster, listener, _) = start_with_local_broker("abc").await;
        let mut broker = BrokerSide::accept(&listener, "abc").await;

        broadcaster.stop().await.unwrap();
        assert!(!broadcaster.is_running());

        while broker.next_packet().await != Packet::Disconnect {}
    }
}
