use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Where accelerometer samples come from
#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Linux IIO accelerometer read through libiio
    #[default]
    Iio,
    /// Simulated accelerometer at rest
    Mock,
}

/// Displays linear acceleration and publishes samples to an MQTT broker
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Broker address as host:port. When set, the address prompt is skipped.
    #[arg(short, long)]
    pub broker: Option<String>,

    /// Publish rate index (0: 1000 ms, 1: 500 ms, 2: 250 ms, 3: 100 ms, 4: 50 ms)
    #[arg(short, long)]
    pub rate: Option<usize>,

    /// Device identifier sent with every sample. Defaults to the machine id.
    #[arg(long)]
    pub device_id: Option<String>,

    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// IIO device id or name. Defaults to the first device with accel channels.
    #[arg(long)]
    pub iio_device: Option<String>,

    #[arg(long)]
    pub sampling_period_ms: Option<u64>,

    /// Delay before restarting the publisher after an address change
    #[arg(long)]
    pub restart_delay_ms: Option<u64>,

    /// Adds Gaussian noise to the mock accelerometer
    #[arg(long)]
    pub mock_noise: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "dcapp",
            "--broker",
            "192.168.0.164:1883",
            "--rate",
            "3",
            "--source",
            "mock",
            "--mock-noise",
        ]);
        assert_eq!(args.broker.as_deref(), Some("192.168.0.164:1883"));
        assert_eq!(args.rate, Some(3));
        assert_eq!(args.source, Some(SourceKind::Mock));
        assert!(args.mock_noise);
        assert!(args.config.is_none());
    }
}
