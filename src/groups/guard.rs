//! Membership checks for group-scoped reads and writes.

use tracing::warn;
use uuid::Uuid;

use super::repo::{Group, GroupRepo};
use crate::{
    error::{AppError, AppResult},
    scope::Scope,
};

/// True iff the actor owns the group or is listed as a member.
pub fn is_authorized(group: &Group, actor_id: Uuid) -> bool {
    group.owner_id == actor_id || group.member_ids.contains(&actor_id)
}

pub fn is_owner(group: &Group, actor_id: Uuid) -> bool {
    group.owner_id == actor_id
}

/// Loads the group for an owner or member. A missing group is reported the
/// same way as a foreign one.
pub async fn require_member(
    groups: &dyn GroupRepo,
    group_id: Uuid,
    actor_id: Uuid,
) -> AppResult<Group> {
    match groups.find(group_id).await? {
        Some(group) if is_authorized(&group, actor_id) => Ok(group),
        _ => {
            warn!(%group_id, %actor_id, "group access denied");
            Err(AppError::forbidden("Not a member of this group"))
        }
    }
}

/// Loads the group for its owner; membership alone is not enough.
pub async fn require_owner(
    groups: &dyn GroupRepo,
    group_id: Uuid,
    actor_id: Uuid,
    action: &str,
) -> AppResult<Group> {
    let group = groups
        .find(group_id)
        .await?
        .ok_or_else(|| AppError::not_found("Group not found"))?;
    if !is_owner(&group, actor_id) {
        warn!(%group_id, %actor_id, action, "owner-only action denied");
        return Err(AppError::forbidden(format!("Only owner can {action}")));
    }
    Ok(group)
}

/// Personal scope is always the actor's own; a group scope needs membership.
pub async fn authorize_scope(groups: &dyn GroupRepo, actor_id: Uuid, scope: Scope) -> AppResult<()> {
    match scope {
        Scope::Personal => Ok(()),
        Scope::Group(group_id) => require_member(groups, group_id, actor_id).await.map(|_| ()),
    }
}
