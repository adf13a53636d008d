use serde::{Deserialize, Serialize};

/// Reply to an asynchronous start request.
///
/// `run_id == 0` means the worker did not start a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncReply {
    #[serde(rename = "RunID", alias = "runid", alias = "runID", default)]
    pub run_id: i64,
    #[serde(rename = "ResultURL", alias = "result_url", alias = "resultURL", default)]
    pub result_url: String,
    #[serde(rename = "ResultID", default, skip_serializing_if = "Option::is_none")]
    pub result_id: Option<String>,
    #[serde(rename = "Count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AsyncReply {
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.run_id != 0
    }
}
