//! Text shown on the screen

pub const IP_NEEDED_MESSAGE: &str =
    "Please enter the IP address of the host including the port. e.g. '192.168.0.164:1883'";
pub const HOST_IP_PREFIX: &str = "Host IP: ";
pub const PUBLISH_RATE_PREFIX: &str = "PublishRate (ms): ";
pub const CONNECTION_STATUS_PREFIX: &str = "Connection Status: ";

/// Formats `value` with four decimals and no leading zero, e.g. `.5000` or `12.3457`
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}∞");
    }

    let formatted = format!("{value:.4}");
    let (sign, digits) = match formatted.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", formatted.as_str()),
    };
    let digits = digits.strip_prefix('0').unwrap_or(digits);
    // A value that rounds to zero loses its sign
    if digits.bytes().all(|b| b == b'0' || b == b'.') {
        return digits.to_string();
    }
    format!("{sign}{digits}")
}
