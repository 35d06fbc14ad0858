use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub fn format_ms_rfc3339(epoch_ms: i64) -> Option<String> {
    if epoch_ms == 0 {
        return None;
    }
    let value = OffsetDateTime::from_unix_timestamp_nanos(epoch_ms as i128 * 1_000_000).ok()?;
    value.format(&Rfc3339).ok()
}

pub fn epoch_ms_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite())
                .map(|value| value as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}
