use serde::{Deserialize, Serialize};

/// Body for `POST /api/swap/request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewSwapRequest {
    #[serde(rename = "toUserId")]
    pub to_user_id: String,
    #[serde(rename = "offeredSkill")]
    pub offered_skill: String,
    #[serde(rename = "wantedSkill")]
    pub wanted_skill: String,
    pub availability: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The only transitions a recipient may apply to a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Accepted,
    Rejected,
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapStatus::Accepted => write!(f, "accepted"),
            SwapStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdate {
    pub status: SwapStatus,
}
