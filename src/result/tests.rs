use super::{AsyncReply, Bucket, HistogramData, RunResult};

const WORKER_RESULT: &str = r#"{
  "RunType": "HTTP",
  "Labels": "east-1",
  "StartTime": "2024-05-01T10:00:00.5-07:00",
  "RequestedQPS": "100",
  "ActualQPS": 99.5,
  "ActualDuration": 10000000000,
  "NumThreads": 4,
  "NumConnections": 4,
  "Version": "1.63.0",
  "DurationHistogram": {
    "Count": 10,
    "Min": 0.001,
    "Max": 0.009,
    "Sum": 0.05,
    "Avg": 0.005,
    "StdDev": 0.002,
    "Data": [
      {"Start": 0.001, "End": 0.004, "Percent": 40, "Count": 4},
      {"Start": 0.004, "End": 0.009, "Percent": 100, "Count": 6}
    ],
    "Percentiles": [{"Percentile": 50, "Value": 0.005}]
  },
  "ErrorsDurationHistogram": {"Count": 0, "Min": 0, "Max": 0, "Sum": 0, "Avg": 0, "StdDev": 0, "Data": null},
  "RetCodes": {"200": 990, "503": 5},
  "SocketCount": 4,
  "Sizes": null,
  "URL": "http://target:8080/"
}"#;

#[test]
fn parses_worker_result_and_keeps_unknown_fields() -> Result<(), String> {
    let result = RunResult::from_slice(WORKER_RESULT.as_bytes())
        .map_err(|err| format!("parse failed: {}", err))?;
    if !result.succeeded() {
        return Err("Expected success".to_owned());
    }
    if result.num_threads != 4 || result.num_connections != 4 || result.socket_count != 4 {
        return Err(format!("Unexpected scalars: {:?}", result));
    }
    if result.ret_codes.get("503") != Some(&5) {
        return Err(format!("Unexpected ret codes: {:?}", result.ret_codes));
    }
    let errors = result
        .errors_duration_histogram
        .as_ref()
        .ok_or("Missing errors histogram")?;
    if !errors.data.is_empty() {
        return Err("null Data should parse as empty".to_owned());
    }
    if result.sizes.is_some() {
        return Err("null Sizes should stay absent".to_owned());
    }
    if result.extra.get("RunType").and_then(|value| value.as_str()) != Some("HTTP") {
        return Err(format!("Extra fields lost: {:?}", result.extra));
    }
    let end = result.end_time().ok_or("Missing end time")?;
    if end.to_rfc3339() != "2024-05-01T10:00:10.500-07:00" {
        return Err(format!("Unexpected end time: {}", end.to_rfc3339()));
    }

    let encoded =
        serde_json::to_value(&result).map_err(|err| format!("encode failed: {}", err))?;
    if encoded.get("URL").and_then(|value| value.as_str()) != Some("http://target:8080/") {
        return Err("URL should be written back".to_owned());
    }
    if encoded.get("Exception").is_some() {
        return Err("Empty exception should be omitted".to_owned());
    }
    Ok(())
}

#[test]
fn exception_is_read() -> Result<(), String> {
    let result = RunResult::from_slice(br#"{"Exception": "connection refused"}"#)
        .map_err(|err| format!("parse failed: {}", err))?;
    if result.succeeded() || result.exception != "connection refused" {
        return Err(format!("Unexpected exception: {:?}", result.exception));
    }
    Ok(())
}

#[test]
fn async_reply_accepts_worker_field_names() -> Result<(), String> {
    let reply: AsyncReply = serde_json::from_str(
        r#"{"message":"started","RunID":42,"Count":1,"ResultID":"r-42","ResultURL":"http://10.0.0.7:8080/data/r-42.json"}"#,
    )
    .map_err(|err| format!("parse failed: {}", err))?;
    if !reply.is_started() || reply.run_id != 42 {
        return Err(format!("Unexpected run id: {}", reply.run_id));
    }
    if reply.result_url != "http://10.0.0.7:8080/data/r-42.json" {
        return Err(format!("Unexpected result url: {}", reply.result_url));
    }

    let missing: AsyncReply = serde_json::from_str(r#"{"message":"busy"}"#)
        .map_err(|err| format!("parse failed: {}", err))?;
    if missing.is_started() {
        return Err("Missing RunID must read as not started".to_owned());
    }
    Ok(())
}

#[test]
fn percentile_interpolates_inside_bucket() -> Result<(), String> {
    let data = HistogramData {
        count: 10,
        min: 0.0,
        max: 20.0,
        data: vec![
            Bucket {
                start: 0.0,
                end: 10.0,
                percent: 50.0,
                count: 5,
            },
            Bucket {
                start: 10.0,
                end: 20.0,
                percent: 100.0,
                count: 5,
            },
        ],
        ..HistogramData::default()
    };
    let p75 = data.value_at_percentile(75.0);
    if (p75 - 15.0).abs() > 1e-9 {
        return Err(format!("Unexpected p75: {}", p75));
    }
    let p100 = data.value_at_percentile(100.0);
    if (p100 - 20.0).abs() > 1e-9 {
        return Err(format!("Unexpected p100: {}", p100));
    }
    let low = data.value_at_percentile(5.0);
    if low.abs() > 1e-9 {
        return Err(format!("Lowest share should report min, got {}", low));
    }
    Ok(())
}

#[test]
fn empty_histogram_reports_zero() -> Result<(), String> {
    let value = HistogramData::default().value_at_percentile(50.0);
    if value.abs() > f64::EPSILON {
        return Err(format!("Expected 0, got {}", value));
    }
    Ok(())
}
