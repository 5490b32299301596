use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use accel_rs::ports::AccelerometerPort;
use accel_rs::services::{self, AccelerometerService};
use accel_rs::AccelError;
use broadcast_rs::{BroadcastController, MqttBroadcaster, PublishRate, SampleFeed};
use common::{IMUSource, Sample3D};
use publisher::Listener;

use crate::cli::SourceKind;
use crate::device::device_id;
use crate::display::IP_NEEDED_MESSAGE;
use crate::prompt::{parse_line, Command, HELP};
use crate::screen::{Flow, MotionScreen};
use crate::settings::Settings;

const SENSOR_TAG: &str = "Accelerometer";
const SENSOR_STOP_TIMEOUT_MILLIS: u64 = 1000;

/// Running accelerometer service
struct Sensor {
    handle: JoinHandle<()>,
    stop: Box<dyn Fn() + Send>,
}

async fn register_listeners<C>(
    service: &AccelerometerService<C>,
    listeners: Vec<Listener<Sample3D>>,
) where
    C: AccelerometerPort,
{
    for mut listener in listeners {
        service.register_listener(&mut listener).await;
    }
}

async fn start_sensor(
    settings: &Settings,
    listeners: Vec<Listener<Sample3D>>,
) -> Result<Sensor, AccelError> {
    let period = settings.sampling_period_millis;
    match settings.source {
        SourceKind::Iio => {
            let device = settings.iio_device.as_deref();
            let (handle, service) = services::run_service(device, SENSOR_TAG, period)?;
            register_listeners(&service, listeners).await;
            Ok(Sensor {
                handle,
                stop: Box::new(move || service.stop()),
            })
        }
        SourceKind::Mock => {
            let (handle, service) =
                services::run_mock_service(SENSOR_TAG, period, settings.mock_noise, None)?;
            register_listeners(&service, listeners).await;
            Ok(Sensor {
                handle,
                stop: Box::new(move || service.stop()),
            })
        }
    }
}

fn print_lines(screen: &MotionScreen) {
    println!();
    for line in screen.lines() {
        println!("{line}");
    }
}

fn print_prompt() {
    println!("\n{IP_NEEDED_MESSAGE}");
}

/// Runs the accelerometer screen until `quit`, end of input or Ctrl+C
pub async fn run(settings: Settings) -> Result<(), Box<dyn Error + Send + Sync>> {
    let device_id = device_id(settings.device_id.as_deref());
    log::info!("Device id: {device_id}");

    let feed = SampleFeed::new();
    let broadcaster = Arc::new(MqttBroadcaster::new(feed.clone()));
    let controller = BroadcastController::new(
        broadcaster,
        &device_id,
        PublishRate::new(settings.rate),
        Duration::from_millis(settings.restart_delay_millis),
    );
    let mut screen = MotionScreen::new(controller);

    // Samples are handed over to this task, which owns the screen
    let (sample_tx, mut sample_rx) = mpsc::unbounded_channel::<Arc<Sample3D>>();
    let screen_listener = Listener::forwarding(sample_tx);

    let sensor = match start_sensor(&settings, vec![feed.listener(), screen_listener]).await {
        Ok(sensor) => Some(sensor),
        Err(e) => {
            log::warn!("Running without accelerometer: {e}");
            None
        }
    };

    if screen.start() {
        match settings.broker_address.clone() {
            Some(address) => {
                if let Err(e) = screen.handle(Command::ConfirmAddress(address)).await {
                    log::error!("{e}");
                }
            }
            None => print_prompt(),
        }
    }
    print_lines(&screen);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(sample) = sample_rx.recv() => {
                screen.on_sensor_changed(&sample);
                if !screen.prompt_open() {
                    print!("\r{}", screen.status_line());
                    std::io::stdout().flush()?;
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let command = match parse_line(&line, screen.prompt_open()) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                if command == Command::Help {
                    println!("{HELP}");
                }
                match screen.handle(command).await {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => log::error!("{e}"),
                }
                if screen.prompt_open() {
                    print_prompt();
                } else {
                    print_lines(&screen);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    log::info!("Shutting down");
    if let Err(e) = screen.shutdown().await {
        log::error!("Error stopping broadcast: {e}");
    }
    if let Some(mut sensor) = sensor {
        (sensor.stop)();
        let timeout = Duration::from_millis(SENSOR_STOP_TIMEOUT_MILLIS);
        if tokio::time::timeout(timeout, &mut sensor.handle).await.is_err() {
            sensor.handle.abort();
        }
    }
    Ok(())
}
