use crate::result::RunResult;

/// Fold `next`'s scalar statistics into `combined`.
///
/// Rates, connection and thread counts, socket counts and per-status-code
/// counts are summed. The time window becomes the smallest one containing
/// both runs; runs that did not overlap inflate the merged duration.
/// Histograms are not touched here.
pub fn merge_scalars(combined: &mut RunResult, next: &RunResult) {
    combined.actual_qps += next.actual_qps;
    combined.num_connections = combined.num_connections.saturating_add(next.num_connections);
    combined.num_threads = combined.num_threads.saturating_add(next.num_threads);
    combined.socket_count = combined.socket_count.saturating_add(next.socket_count);
    for (code, count) in &next.ret_codes {
        let entry = combined.ret_codes.entry(code.clone()).or_default();
        *entry = entry.saturating_add(*count);
    }
    merge_window(combined, next);
}

fn merge_window(combined: &mut RunResult, next: &RunResult) {
    let (Some(start), Some(next_start)) = (combined.start_time, next.start_time) else {
        if combined.start_time.is_none() && next.start_time.is_some() {
            combined.start_time = next.start_time;
            combined.actual_duration = next.actual_duration;
        } else {
            combined.actual_duration = combined.actual_duration.max(next.actual_duration);
        }
        return;
    };

    let merged_start = start.min(next_start);
    let end_a = combined.end_time().unwrap_or(start);
    let end_b = next.end_time().unwrap_or(next_start);
    let end = end_a.max(end_b);
    if end_a.min(end_b) < start.max(next_start) {
        tracing::debug!(
            "Merging runs that do not overlap; combined duration spans the gap between them."
        );
    }
    combined.start_time = Some(merged_start);
    combined.actual_duration = end
        .signed_duration_since(merged_start)
        .num_nanoseconds()
        .unwrap_or(i64::MAX);
}
