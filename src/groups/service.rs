use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateGroupRequest, GroupView},
    guard,
    repo::{Group, GroupRepo},
};
use crate::{
    auth::{dto::PublicUser, UserRepo},
    catalog::CatalogRepo,
    error::{AppError, AppResult},
};

#[instrument(skip(groups, req))]
pub async fn create_group(
    groups: &dyn GroupRepo,
    actor_id: Uuid,
    req: CreateGroupRequest,
    now: OffsetDateTime,
) -> AppResult<Group> {
    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::validation("Group name is required"))?;
    let group = Group::new(name, actor_id, now);
    groups.insert(&group).await?;
    info!(group_id = %group.id, "group created");
    Ok(group)
}

/// Groups the actor owns or belongs to, with public member info.
pub async fn list_groups(
    groups: &dyn GroupRepo,
    users: &dyn UserRepo,
    actor_id: Uuid,
) -> AppResult<Vec<GroupView>> {
    let list = groups.list_for_user(actor_id).await?;

    let mut ids: Vec<Uuid> = list
        .iter()
        .flat_map(|g| std::iter::once(g.owner_id).chain(g.member_ids.iter().copied()))
        .collect();
    ids.sort();
    ids.dedup();
    let people: HashMap<Uuid, PublicUser> = users
        .find_many(&ids)
        .await?
        .iter()
        .map(|u| (u.id, PublicUser::from(u)))
        .collect();

    Ok(list
        .into_iter()
        .map(|g| {
            let members: Vec<PublicUser> = g
                .member_ids
                .iter()
                .filter_map(|id| people.get(id).cloned())
                .collect();
            GroupView {
                id: g.id,
                name: g.name,
                owner: people.get(&g.owner_id).cloned(),
                total_members: g.member_ids.len(),
                members,
                created_at: g.created_at,
            }
        })
        .collect())
}

#[instrument(skip(groups))]
pub async fn remove_member(
    groups: &dyn GroupRepo,
    group_id: Uuid,
    actor_id: Uuid,
    member_id: Uuid,
) -> AppResult<()> {
    let group =
        guard::require_owner(groups, group_id, actor_id, "remove members from this group").await?;
    if member_id == group.owner_id {
        return Err(AppError::validation("Owner cannot be removed from the group"));
    }
    if !groups.remove_member(group_id, member_id).await? {
        return Err(AppError::not_found("Member not found in group"));
    }
    info!(%member_id, "member removed");
    Ok(())
}

#[instrument(skip(groups))]
pub async fn delete_group(groups: &dyn GroupRepo, group_id: Uuid, actor_id: Uuid) -> AppResult<()> {
    guard::require_owner(groups, group_id, actor_id, "delete this group").await?;
    if !groups.delete(group_id).await? {
        return Err(AppError::not_found("Group not found"));
    }
    info!("group deleted");
    Ok(())
}

/// Removes a group exercise and every set logged against it.
#[instrument(skip(groups, catalog))]
pub async fn delete_group_exercise(
    groups: &dyn GroupRepo,
    catalog: &dyn CatalogRepo,
    group_id: Uuid,
    actor_id: Uuid,
    exercise_id: Uuid,
) -> AppResult<()> {
    guard::require_owner(groups, group_id, actor_id, "delete exercise").await?;
    if !catalog.delete_group_exercise(group_id, exercise_id).await? {
        return Err(AppError::not_found("Exercise not found in this group"));
    }
    info!(%exercise_id, "group exercise deleted");
    Ok(())
}
