//! Raw exchange payloads to `Candle` / `Ticker`

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::models::indicators::{Candle, Ticker};

/// Field name, positional index and accepted object keys of each kline column
const KLINE_FIELDS: [(&str, usize, &[&str]); 6] = [
    ("openTime", 0, &["t", "openTime"]),
    ("open", 1, &["o", "open"]),
    ("high", 2, &["h", "high"]),
    ("low", 3, &["l", "low"]),
    ("close", 4, &["c", "close"]),
    ("volume", 5, &["v", "volume"]),
];

/// Map a klines payload to candles sorted ascending by open time
///
/// Rows are either positional arrays `[openTime, open, high, low, close, volume, ..]`
/// or objects keyed `t/o/h/l/c/v` or `openTime/open/high/low/close/volume`.
/// A single bad field rejects the whole payload.
pub fn normalize_klines(raw: &Value) -> Result<Vec<Candle>> {
    let rows = raw
        .as_array()
        .ok_or_else(|| Error::MalformedData("klines payload is not an array".to_string()))?;

    let mut candles = rows
        .iter()
        .enumerate()
        .map(|(row, value)| parse_kline_row(row, value))
        .collect::<Result<Vec<_>>>()?;

    candles.sort_by_key(|candle| candle.open_time);
    Ok(candles)
}

pub fn normalize_klines_slice(body: &[u8]) -> Result<Vec<Candle>> {
    let raw: Value = serde_json::from_slice(body)
        .map_err(|e| Error::MalformedData(format!("klines payload is not JSON: {}", e)))?;
    normalize_klines(&raw)
}

fn parse_kline_row(row: usize, value: &Value) -> Result<Candle> {
    let (time_name, time_index, time_keys) = KLINE_FIELDS[0];
    let time_field = row_field(row, value, time_index, time_keys)?;
    let open_time = time_field
        .and_then(as_timestamp)
        .ok_or_else(|| field_error(row, time_name, time_field))?;

    let mut prices = [0.0f64; 5];
    for (slot, (name, index, keys)) in prices.iter_mut().zip(KLINE_FIELDS[1..].iter()) {
        let field = row_field(row, value, *index, keys)?;
        *slot = field
            .and_then(as_finite)
            .ok_or_else(|| field_error(row, name, field))?;
    }

    let [open, high, low, close, volume] = prices;
    Ok(Candle::new(open, high, low, close, volume, open_time))
}

fn row_field<'a>(row: usize, value: &'a Value, index: usize, keys: &[&str]) -> Result<Option<&'a Value>> {
    match value {
        Value::Array(items) => Ok(items.get(index)),
        Value::Object(object) => Ok(lookup(object, keys)),
        _ => Err(Error::MalformedData(format!(
            "row {} is neither an array nor an object",
            row
        ))),
    }
}

/// Map a ticker object or an array of them
pub fn normalize_tickers(raw: &Value) -> Result<Vec<Ticker>> {
    match raw {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(row, item)| parse_ticker(row, item))
            .collect(),
        Value::Object(_) => Ok(vec![parse_ticker(0, raw)?]),
        _ => Err(Error::MalformedData(
            "ticker payload is neither an object nor an array".to_string(),
        )),
    }
}

fn parse_ticker(row: usize, value: &Value) -> Result<Ticker> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::MalformedData(format!("ticker row {} is not an object", row)))?;

    let symbol = object
        .get("symbol")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::MalformedData(format!("ticker row {} field symbol is missing", row)))?
        .to_string();
    let price_field = lookup(object, &["price", "lastPrice"]);
    let price = price_field
        .and_then(as_finite)
        .ok_or_else(|| field_error(row, "price", price_field))?;

    Ok(Ticker {
        symbol,
        price,
        price_change_percent: object.get("priceChangePercent").and_then(as_finite),
        volume: object.get("volume").and_then(as_finite),
    })
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

/// JSON number or numeric string, finite only
fn as_finite(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Integer millisecond timestamp as a JSON integer or integer string
fn as_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn field_error(row: usize, name: &str, value: Option<&Value>) -> Error {
    match value {
        None => Error::MalformedData(format!("row {} field {} is missing", row, name)),
        Some(v) => Error::MalformedData(format!("row {} field {} is not a valid number: {}", row, name, v)),
    }
}
