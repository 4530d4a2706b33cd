use serde::{Deserialize, Serialize};

/// Body for `POST /api/feedback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewFeedback {
    #[serde(rename = "toUserId")]
    pub to_user_id: String,
    #[serde(rename = "swapRequestId")]
    pub swap_request_id: String,
    pub rating: u8,
    pub message: String,
    pub skill: String,
}
