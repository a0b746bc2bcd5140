//! Owner-driven invitations: registered users join at once, others wait as
//! pending invites until they register.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{dto::InviteRequest, guard, repo::GroupRepo};
use crate::{
    auth::{credentials, UserRepo},
    error::{AppError, AppResult},
};

/// An invite for someone who has no account yet.
#[derive(Debug, Clone)]
pub struct PendingInvite {
    pub group_id: Uuid,
    pub group_name: String,
    pub email: String,
    pub inviter_name: String,
    pub register_url: String,
}

/// Delivers pending invites to their recipients.
#[async_trait]
pub trait InviteNotifier: Send + Sync {
    async fn notify(&self, invite: &PendingInvite) -> anyhow::Result<()>;
}

/// Records invites in the log instead of sending mail.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl InviteNotifier for LogNotifier {
    async fn notify(&self, invite: &PendingInvite) -> anyhow::Result<()> {
        info!(
            group_id = %invite.group_id,
            email = %invite.email,
            inviter = %invite.inviter_name,
            register_url = %invite.register_url,
            "group invite issued"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InviteStatus {
    AddedMember,
    InvitedPending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteOutcome {
    pub email: String,
    pub status: InviteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

/// Trims, lowercases and de-duplicates, keeping first-seen order.
pub fn normalize_emails(email: Option<String>, emails: Option<Vec<String>>) -> AppResult<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for raw in email.into_iter().chain(emails.unwrap_or_default()) {
        let mail = credentials::normalize_email(&raw);
        if mail.is_empty() || out.contains(&mail) {
            continue;
        }
        if !credentials::is_valid_email(&mail) {
            return Err(AppError::validation(format!("Invalid email: {mail}")));
        }
        out.push(mail);
    }
    if out.is_empty() {
        return Err(AppError::validation("At least one email is required"));
    }
    Ok(out)
}

/// Invites each address to the group. Only the owner may invite; the
/// addresses are checked after ownership.
#[instrument(skip(groups, users, notifier, req))]
pub async fn invite_members(
    groups: &dyn GroupRepo,
    users: &dyn UserRepo,
    notifier: &dyn InviteNotifier,
    register_url: &str,
    group_id: Uuid,
    actor_id: Uuid,
    req: InviteRequest,
) -> AppResult<Vec<InviteOutcome>> {
    let group = guard::require_owner(groups, group_id, actor_id, "invite members").await?;
    let emails = normalize_emails(req.email, req.emails)?;
    let inviter_name = users
        .find_by_id(actor_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_else(|| "Your friend".to_string());

    let mut results = Vec::with_capacity(emails.len());
    for email in emails {
        if let Some(user) = users.find_by_email(&email).await? {
            groups.add_member(group_id, user.id).await?;
            results.push(InviteOutcome {
                email,
                status: InviteStatus::AddedMember,
                user_id: Some(user.id),
            });
            continue;
        }

        groups.add_pending_invite(group_id, &email).await?;
        let invite = PendingInvite {
            group_id,
            group_name: group.name.clone(),
            email: email.clone(),
            inviter_name: inviter_name.clone(),
            register_url: register_url.to_string(),
        };
        // the invite stays pending even if delivery fails
        if let Err(e) = notifier.notify(&invite).await {
            warn!(error = %e, %email, "invite delivery failed");
        }
        results.push(InviteOutcome {
            email,
            status: InviteStatus::InvitedPending,
            user_id: None,
        });
    }

    info!(invited = results.len(), "invites processed");
    Ok(results)
}
