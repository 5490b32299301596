/// Default polling period. Matches the "normal" delay of mobile sensor frameworks (200 ms).
pub const DEFAULT_SAMPLING_PERIOD_MILLIS: u64 = 200;
