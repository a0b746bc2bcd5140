use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::invites::InviteOutcome;
use crate::auth::dto::PublicUser;

#[derive(Debug, Default, Deserialize)]
pub struct CreateGroupRequest {
    pub name: Option<String>,
}

/// Either a single `email`, a list of `emails`, or both.
#[derive(Debug, Default, Deserialize)]
pub struct InviteRequest {
    pub email: Option<String>,
    pub emails: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: Uuid,
    pub name: String,
    pub owner: Option<PublicUser>,
    pub total_members: usize,
    pub members: Vec<PublicUser>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub message: String,
    pub group_id: Uuid,
    pub results: Vec<InviteOutcome>,
}
