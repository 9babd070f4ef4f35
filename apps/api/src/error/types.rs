use std::collections::BTreeMap;

use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    error: String,
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    details: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub(super) fn new(
        error: String,
        code: &'static str,
        details: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self {
            error,
            code: code.to_owned(),
            details,
        }
    }
}
