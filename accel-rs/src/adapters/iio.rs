// Acquisition from a Linux Industrial I/O (IIO) accelerometer through libiio.
//
// The accel channels of the device are read as
//   processed_value = (raw + offset) * scale
// and rotated by the mount matrix of the device when it exposes one.
//
// libiio handles are not shared between threads: the channels are opened and read on a
// blocking thread, and the acquisition loop asks it for one reading per tick.

use async_trait::async_trait;
use industrial_io::{Channel, ChannelType, Context, Device, Direction};
use nalgebra::{Matrix3, Vector3};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Notify};

use common::types::{Sample3D, XYZ};
use common::IMUSample;
use publisher::{Publishable, Publisher};

use crate::models::errors::AccelError;
use crate::ports::AccelerometerPort;

const AXES: [&str; 3] = ["x", "y", "z"];

/// Offset and scale of one accel channel
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisInfo {
    pub offset: i64,
    pub scale: f64,
}

impl Default for AxisInfo {
    fn default() -> Self {
        Self {
            offset: 0,
            scale: 1.0,
        }
    }
}

/// Everything needed to turn raw readings into m/s^2 in device coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct Calibration {
    pub axes: [AxisInfo; 3],
    pub mount_matrix: Matrix3<f64>,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            axes: [AxisInfo::default(); 3],
            mount_matrix: Matrix3::identity(),
        }
    }
}

impl Calibration {
    pub fn apply(&self, raw: [i64; 3]) -> XYZ {
        let mut values = [0f64; 3];
        for ((value, raw), info) in values.iter_mut().zip(raw).zip(self.axes.iter()) {
            *value = (raw + info.offset) as f64 * info.scale;
        }
        XYZ::from_vector(self.mount_matrix * Vector3::from(values))
    }
}

/// Blocking access to the accel channels of one device
pub trait RawAccelerometer {
    fn calibration(&self) -> &Calibration;

    /// Raw x, y and z readings
    fn read_raw(&self) -> Result<[i64; 3], AccelError>;

    fn read(&self) -> Result<XYZ, AccelError> {
        Ok(self.calibration().apply(self.read_raw()?))
    }
}

/// Accel channels of an IIO device
pub struct IioChannels {
    channels: [Channel; 3],
    calibration: Calibration,
}

impl IioChannels {
    /// Opens the accel channels of the IIO device `device_id` (e.g. `iio:device0`)
    pub fn open(device_id: &str) -> Result<Self, AccelError> {
        let ctx = Context::new()?;
        log::debug!("IIO context version: {}", ctx.version());

        let Some(device) = ctx.find_device(device_id) else {
            return Err(AccelError::SensorNotFound(device_id.to_string()));
        };

        let mount_matrix = match device.find_channel("mount", Direction::Input) {
            Some(mount) => {
                let matrix_str = mount.attr_read_str("matrix")?;
                log::debug!("Found mount matrix: {matrix_str}");
                parse_mount_matrix(&matrix_str)?
            }
            None => Matrix3::identity(),
        };

        let mut channels: Vec<(String, Channel)> = device
            .channels()
            .filter(|channel| channel.channel_type() == ChannelType::Accel)
            .filter_map(|channel| channel.id().map(|id| (id, channel)))
            .collect();

        let (x, x_info) = take_axis(&mut channels, AXES[0], device_id)?;
        let (y, y_info) = take_axis(&mut channels, AXES[1], device_id)?;
        let (z, z_info) = take_axis(&mut channels, AXES[2], device_id)?;

        Ok(Self {
            channels: [x, y, z],
            calibration: Calibration {
                axes: [x_info, y_info, z_info],
                mount_matrix,
            },
        })
    }
}

impl RawAccelerometer for IioChannels {
    fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    fn read_raw(&self) -> Result<[i64; 3], AccelError> {
        let mut raw = [0i64; 3];
        for (value, channel) in raw.iter_mut().zip(self.channels.iter()) {
            *value = channel.attr_read_int("raw")?;
        }
        Ok(raw)
    }
}

fn has_accel_channels(device: &Device) -> bool {
    device
        .channels()
        .any(|channel| channel.channel_type() == ChannelType::Accel)
}

/// Removes the channel of `axis` from `channels` and reads its offset and scale
fn take_axis(
    channels: &mut Vec<(String, Channel)>,
    axis: &str,
    device_id: &str,
) -> Result<(Channel, AxisInfo), AccelError> {
    let Some(index) = channels.iter().position(|(id, _)| id.ends_with(axis)) else {
        return Err(AccelError::SensorNotFound(format!(
            "{device_id} has no accel_{axis} channel"
        )));
    };
    let (id, channel) = channels.swap_remove(index);

    let offset = match channel.attr_read_int("offset") {
        Ok(v) => v,
        Err(e) => {
            log::debug!("Unable to read offset for channel {id}: {e}");
            0
        }
    };
    let scale = match channel.attr_read_float("scale") {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Unable to read scale for channel {id}: {e}");
            1.0
        }
    };
    log::debug!("Found accel channel {id}: scale={scale} offset={offset}");
    Ok((channel, AxisInfo { offset, scale }))
}

/// Parses a mount matrix with the format "1, 0, 0; 0, 1, 0; 0, 0, 1".
/// Rows are the sensor axes in device coordinates: x' = mxx * x + myx * y + mzx * z.
pub fn parse_mount_matrix(content: &str) -> Result<Matrix3<f64>, AccelError> {
    let values = content
        .trim()
        .split(';')
        .flat_map(|row| row.split(','))
        .map(|value| {
            value.trim().parse::<f64>().map_err(|e| {
                AccelError::IncorrectDataFormat(format!("{:?}: {e}", value.trim()))
            })
        })
        .collect::<Result<Vec<f64>, AccelError>>()?;
    if values.len() != 9 {
        return Err(AccelError::IncorrectDataFormat(format!(
            "mount matrix {:?}",
            content.trim()
        )));
    }
    Ok(Matrix3::from_row_slice(&values).transpose())
}

type OpenFn = dyn Fn() -> Result<Box<dyn RawAccelerometer>, AccelError> + Send + Sync;
type Reply = oneshot::Sender<Result<XYZ, AccelError>>;

/// Accelerometer exposed by the IIO subsystem
pub struct IioAccelerometer {
    device_id: String,
    open: Arc<OpenFn>,
    clock: Instant,
    tag: String,
}

impl IioAccelerometer {
    /// Finds the IIO device `device` (id or name) or, when None, the first device with
    /// accel channels. Returns SensorNotFound if there is none.
    pub fn discover(device: Option<&str>, tag: &str) -> Result<Self, AccelError> {
        let ctx = Context::new().map_err(|e| AccelError::SensorNotFound(e.to_string()))?;
        let found = match device {
            Some(name) => ctx.find_device(name),
            None => ctx.devices().find(has_accel_channels),
        };
        let Some(device_id) = found.and_then(|device| device.id()) else {
            return Err(AccelError::SensorNotFound(
                device.unwrap_or("no IIO device with accel channels").to_string(),
            ));
        };
        log::debug!("Using IIO accelerometer {device_id}");

        let id = device_id.clone();
        Ok(Self::with_opener(&device_id, tag, move || {
            IioChannels::open(&id)
                .map(|channels| Box::new(channels) as Box<dyn RawAccelerometer>)
        }))
    }

    /// Accelerometer whose channels are opened by `open` on the reading thread
    pub fn with_opener<F>(device_id: &str, tag: &str, open: F) -> Self
    where
        F: Fn() -> Result<Box<dyn RawAccelerometer>, AccelError> + Send + Sync + 'static,
    {
        Self {
            device_id: device_id.to_string(),
            open: Arc::new(open),
            clock: Instant::now(),
            tag: tag.to_string(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

/// Opens the channels and answers read requests until the request channel closes
fn serve_reads(
    open: Arc<OpenFn>,
    ready: oneshot::Sender<Result<(), AccelError>>,
    requests: mpsc::Receiver<Reply>,
) {
    let device = match open() {
        Ok(device) => device,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    if ready.send(Ok(())).is_err() {
        return;
    }
    while let Ok(reply) = requests.recv() {
        let _ = reply.send(device.read());
    }
}

#[async_trait]
impl AccelerometerPort for IioAccelerometer {
    async fn start(
        &self,
        period: Duration,
        abort_signal: Arc<Notify>,
        publisher: Publisher<Sample3D>,
    ) -> Result<(), AccelError> {
        let (request_tx, request_rx) = mpsc::channel::<Reply>();
        let (ready_tx, ready_rx) = oneshot::channel();
        let open = self.open.clone();
        let reader = tokio::task::spawn_blocking(move || serve_reads(open, ready_tx, request_rx));

        ready_rx
            .await
            .map_err(|_| AccelError::Other("IIO reader exited".to_string()))??;
        log::info!("Reading accelerometer {}", self.device_id);

        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = abort_signal.notified() => {
                    break;
                }

                _ = interval.tick() => {
                    let (reply_tx, reply_rx) = oneshot::channel();
                    if request_tx.send(reply_tx).is_err() {
                        break;
                    }
                    match reply_rx.await {
                        Ok(Ok(measurement)) => {
                            let timestamp = self.clock.elapsed().as_secs_f64();
                            let sample = Sample3D::from_measurement(timestamp, measurement);
                            publisher.notify_listeners(Arc::new(sample));
                        }
                        Ok(Err(e)) => log::error!("{e}"),
                        Err(_) => break,
                    }
                }
            }
        }

        drop(request_tx);
        if let Err(e) = reader.await {
            log::error!("IIO reader failed: {e}");
        }
        log::info!("Accelerometer stopped");
        Ok(())
    }

    fn get_tag(&self) -> &str {
        &self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use publisher::Listener;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct FakeAccel {
        calibration: Calibration,
        raw: Result<[i64; 3], String>,
    }

    impl RawAccelerometer for FakeAccel {
        fn calibration(&self) -> &Calibration {
            &self.calibration
        }

        fn read_raw(&self) -> Result<[i64; 3], AccelError> {
            self.raw.clone().map_err(AccelError::Read)
        }
    }

    fn fake_accelerometer(
        calibration: Calibration,
        raw: Result<[i64; 3], String>,
    ) -> IioAccelerometer {
        IioAccelerometer::with_opener("iio:device0", "Test", move || {
            Ok(Box::new(FakeAccel {
                calibration: calibration.clone(),
                raw: raw.clone(),
            }) as Box<dyn RawAccelerometer>)
        })
    }

    async fn collect_samples(accel: IioAccelerometer) -> (Result<(), AccelError>, Vec<Sample3D>) {
        let received: Arc<Mutex<Vec<Sample3D>>> = Arc::new(Mutex::new(Vec::new()));
        let publisher = Publisher::new();
        let mut listener = {
            let received = received.clone();
            Listener::new(move |_id: Uuid, value: Arc<Sample3D>| {
                received.lock().unwrap().push((*value).clone());
            })
        };
        publisher.register_listener(&mut listener);

        let abort_signal = Arc::new(Notify::new());
        let task = tokio::spawn({
            let abort_signal = abort_signal.clone();
            async move {
                accel
                    .start(Duration::from_millis(10), abort_signal, publisher)
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        abort_signal.notify_one();

        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("Accelerometer did not stop")
            .unwrap();
        let samples = received.lock().unwrap().clone();
        (result, samples)
    }

    #[test]
    fn test_parse_mount_matrix() {
        let m = parse_mount_matrix("0, 1, 0; -1, 0, 0; 0, 0, 1\n").unwrap();
        let rotated = m * Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(rotated, Vector3::new(-2.0, 1.0, 3.0));

        assert!(parse_mount_matrix("1, 0; 0, 1").is_err());
        assert!(parse_mount_matrix("1, 0, 0; 0, one, 0; 0, 0, 1").is_err());
    }

    #[test]
    fn test_calibration_apply() {
        let calibration = Calibration {
            axes: [
                AxisInfo {
                    offset: 0,
                    scale: 0.00981,
                },
                AxisInfo {
                    offset: 0,
                    scale: 0.00981,
                },
                AxisInfo {
                    offset: 2,
                    scale: 0.00981,
                },
            ],
            mount_matrix: Matrix3::identity(),
        };

        let xyz = calibration.apply([100, -50, 1000]);
        let expected = [0.981, -0.4905, 1002.0 * 0.00981];
        for (value, expected) in xyz.inner().iter().zip(expected.iter()) {
            assert!((value - expected).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_publishes_calibrated_samples() {
        let calibration = Calibration {
            mount_matrix: parse_mount_matrix("0, 1, 0; -1, 0, 0; 0, 0, 1").unwrap(),
            ..Default::default()
        };
        let accel = fake_accelerometer(calibration, Ok([1, 2, 3]));
        assert_eq!(accel.get_tag(), "Test");
        assert_eq!(accel.device_id(), "iio:device0");

        let (result, samples) = collect_samples(accel).await;
        assert!(result.is_ok());
        assert!(!samples.is_empty());
        assert!(samples
            .iter()
            .all(|sample| sample.get_measurement().inner() == [-2.0, 1.0, 3.0]));
        assert!(samples
            .windows(2)
            .all(|w| w[0].get_timestamp() <= w[1].get_timestamp()));
    }

    #[tokio::test]
    async fn test_read_errors_are_skipped() {
        let accel = fake_accelerometer(Calibration::default(), Err("EIO".to_string()));
        let (result, samples) = collect_samples(accel).await;
        assert!(result.is_ok());
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_open_failure() {
        let accel = IioAccelerometer::with_opener("iio:device9", "Test", || {
            Err(AccelError::SensorNotFound("iio:device9".to_string()))
        });
        let result = accel
            .start(Duration::from_millis(10), Arc::new(Notify::new()), Publisher::new())
            .await;
        assert!(matches!(result, Err(AccelError::SensorNotFound(_))));
    }
}
