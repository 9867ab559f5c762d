use serde::Serialize;

/// Webhook response body for Present/CleanUp calls, echoing the request `uid`.
#[derive(Serialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
}

impl ChallengeResponse {
    pub(super) fn solved(uid: String) -> Self {
        Self { uid, success: true }
    }
}
