mod support;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::{Value, json};
use tempfile::tempdir;

use support::run_commander;

const RUN_TIMEOUT: Duration = Duration::from_secs(30);

fn worker_result(start: &str, qps: f64, buckets: &[(f64, f64, u64)]) -> Value {
    let total: u64 = buckets.iter().map(|(_, _, count)| count).sum();
    let mut cumulative = 0u64;
    let data: Vec<Value> = buckets
        .iter()
        .map(|(start, end, count)| {
            cumulative += count;
            json!({
                "Start": start,
                "End": end,
                "Percent": 100.0 * cumulative as f64 / total as f64,
                "Count": count,
            })
        })
        .collect();
    json!({
        "RunType": "HTTP",
        "Labels": "e2e",
        "StartTime": start,
        "ActualQPS": qps,
        "ActualDuration": 10_000_000_000_i64,
        "NumThreads": 4,
        "NumConnections": 4,
        "RetCodes": { "200": total },
        "DurationHistogram": {
            "Count": total,
            "Min": buckets.first().map_or(0.0, |bucket| bucket.0),
            "Max": buckets.last().map_or(0.0, |bucket| bucket.1),
            "Sum": 0.0,
            "Avg": 0.0,
            "StdDev": 0.0,
            "Data": data,
        },
    })
}

fn write_result(dir: &Path, name: &str, value: &Value) -> Result<(), String> {
    let bytes = serde_json::to_vec(value).map_err(|err| format!("encode failed: {}", err))?;
    fs::write(dir.join(name), bytes).map_err(|err| format!("write failed: {}", err))
}

#[test]
fn e2e_aggregate_prints_combined_result() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    write_result(
        dir.path(),
        "a.json",
        &worker_result("2024-05-01T10:00:00Z", 100.0, &[(0.0, 10.0, 5), (10.0, 20.0, 3)]),
    )?;
    write_result(
        dir.path(),
        "b.json",
        &worker_result("2024-05-01T10:00:05Z", 50.0, &[(0.0, 10.0, 2)]),
    )?;

    let (status, stdout, stderr) = run_commander(
        ["aggregate", &*dir.path().to_string_lossy()],
        RUN_TIMEOUT,
    )?;
    if !status.success() {
        return Err(format!("commander aggregate failed: {}", stderr));
    }
    let combined: Value =
        serde_json::from_str(&stdout).map_err(|err| format!("stdout is not JSON: {}", err))?;
    if combined["ActualQPS"].as_f64() != Some(150.0) || combined["NumThreads"].as_i64() != Some(8) {
        return Err(format!("Unexpected scalars: {}", combined));
    }
    if combined["ActualDuration"].as_i64() != Some(15_000_000_000) {
        return Err(format!("Unexpected duration: {}", combined["ActualDuration"]));
    }
    if combined["RetCodes"]["200"].as_i64() != Some(10) {
        return Err(format!("Unexpected ret codes: {}", combined["RetCodes"]));
    }
    if combined["Labels"].as_str() != Some("e2e") {
        return Err("Unmerged fields must be kept from the first result".to_owned());
    }
    let histogram = &combined["DurationHistogram"];
    if histogram["Count"].as_u64() != Some(10) {
        return Err(format!("Unexpected histogram count: {}", histogram["Count"]));
    }
    let counts: Vec<u64> = histogram["Data"]
        .as_array()
        .ok_or("Missing buckets")?
        .iter()
        .filter_map(|bucket| bucket["Count"].as_u64())
        .collect();
    if counts != [7, 3] {
        return Err(format!("Unexpected bucket counts: {:?}", counts));
    }
    let percentiles = histogram["Percentiles"]
        .as_array()
        .ok_or("Missing percentiles")?;
    if percentiles.len() != 5 {
        return Err(format!("Expected 5 percentiles, got {}", percentiles.len()));
    }
    Ok(())
}

#[test]
fn e2e_aggregate_reports_failed_runs() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    write_result(
        dir.path(),
        "ok.json",
        &worker_result("2024-05-01T10:00:00Z", 10.0, &[(0.0, 1.0, 4)]),
    )?;
    let mut failed = worker_result("2024-05-01T10:00:00Z", 999.0, &[(0.0, 1.0, 100)]);
    failed["Exception"] = json!("dial tcp: connection refused");
    write_result(dir.path(), "failed.json", &failed)?;

    let output = dir.path().join("combined.json");
    let (status, stdout, stderr) = run_commander(
        [
            "aggregate",
            &*dir.path().to_string_lossy(),
            "--output",
            &*output.to_string_lossy(),
            "--percentiles",
            "50,99",
        ],
        RUN_TIMEOUT,
    )?;
    if status.success() {
        return Err("A failed run must be reported with a non-zero exit".to_owned());
    }
    if !stderr.contains("Failed test at failed.json: dial tcp: connection refused") {
        return Err(format!("Failed run not reported: {}", stderr));
    }
    if !stdout.is_empty() {
        return Err(format!("Output file requested, stdout must stay empty: {}", stdout));
    }
    let written = fs::read_to_string(&output).map_err(|err| format!("missing output: {}", err))?;
    let combined: Value =
        serde_json::from_str(&written).map_err(|err| format!("output is not JSON: {}", err))?;
    if combined["ActualQPS"].as_f64() != Some(10.0) {
        return Err(format!("Failed run leaked into result: {}", combined["ActualQPS"]));
    }
    let percentiles = combined["DurationHistogram"]["Percentiles"]
        .as_array()
        .ok_or("Missing percentiles")?;
    if percentiles.len() != 2 {
        return Err(format!("Expected 2 percentiles, got {}", percentiles.len()));
    }
    Ok(())
}

#[test]
fn e2e_aggregate_empty_directory_fails() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let (status, stdout, stderr) = run_commander(
        ["aggregate", &*dir.path().to_string_lossy()],
        RUN_TIMEOUT,
    )?;
    if status.success() || !stdout.is_empty() {
        return Err("Nothing to merge must fail without output".to_owned());
    }
    if !stderr.contains("No mergeable results") {
        return Err(format!("Unexpected stderr: {}", stderr));
    }
    Ok(())
}
