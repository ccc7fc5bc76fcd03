use coin_chart_wasm::domain::errors::AppError;
use coin_chart_wasm::infrastructure::wire::parse_quotes;
use serde_json::json;

#[test]
fn bare_list_of_candles() {
    let payload = json!([
        {"timestamp": 60, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10},
        {"timestamp": 120, "open": 1.5, "high": 2.5, "low": 1.0, "close": 2.0}
    ]);
    let quotes = parse_quotes(&payload.to_string()).unwrap();
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].volume, 10.0);
    assert_eq!(quotes[1].volume, 0.0);
    assert_eq!(quotes[1].close, 2.0);
}

#[test]
fn histo_envelope_with_provider_names() {
    let payload = json!({
        "Response": "Success",
        "Data": [
            {"time": 1_610_031_600, "open": 100.0, "high": 101.0, "low": 99.0, "close": 100.5, "volumefrom": 3.5},
            {"time": 1_610_031_660, "open": 100.5, "high": 102.0, "low": 100.0, "close": 101.5, "volumefrom": 1.0}
        ]
    });
    let quotes = parse_quotes(&payload.to_string()).unwrap();
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].timestamp, 1_610_031_600.0);
    assert_eq!(quotes[0].volume, 3.5);
}

#[test]
fn incomplete_and_inconsistent_entries_are_skipped() {
    let payload = json!([
        {"timestamp": 60, "open": 1.0, "high": 2.0, "low": 0.5},
        {"timestamp": 120, "open": 1.0, "high": 0.9, "low": 0.5, "close": 0.8},
        {"timestamp": 180, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5}
    ]);
    let quotes = parse_quotes(&payload.to_string()).unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].timestamp, 180.0);
}

#[test]
fn batches_going_back_in_time_are_rejected() {
    let payload = json!([
        {"timestamp": 180, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5},
        {"timestamp": 120, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5}
    ]);
    assert!(matches!(parse_quotes(&payload.to_string()), Err(AppError::ParseError(_))));
}

#[test]
fn garbage_is_a_parse_error() {
    assert!(matches!(parse_quotes("{\"Data\": 5}"), Err(AppError::ParseError(_))));
    assert!(matches!(parse_quotes("[1, 2"), Err(AppError::ParseError(_))));
}
