/// Publish interval presets, addressed by the rate index selected by the user.
pub const PUBLISH_RATES_MILLIS: [u64; 5] = [1000, 500, 250, 100, 50];

/// Delay between an address change and the restart of the publisher. Gives the
/// previous instance time to tear down its connection.
pub const CONNECTION_DELAY_MILLIS: u64 = 3000;

/// Address shown when the user dismisses the address prompt without ever entering one
pub const NO_ADDRESS: &str = "NO DATA";

pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const TOPIC_PREFIX: &str = "dcapp";
