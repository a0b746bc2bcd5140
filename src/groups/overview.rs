//! Per-participant rollup of a group's sets for one exercise.

use std::collections::HashMap;

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use super::{guard, repo::GroupRepo};
use crate::{
    auth::{dto::PublicUser, UserRepo},
    catalog::CatalogRepo,
    error::{AppError, AppResult},
    scope::Scope,
    workouts::{SetLogEntry, SetLogRepo},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantTotals {
    pub actor_id: Uuid,
    pub total_sets: usize,
    pub total_weight: f64,
    pub latest_set: SetLogEntry,
}

/// Folds entries sorted newest first into one total per actor. The latest
/// set is the first entry seen for that actor.
pub fn participant_totals(entries: &[SetLogEntry]) -> Vec<ParticipantTotals> {
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    let mut totals: Vec<ParticipantTotals> = Vec::new();
    for e in entries {
        match index.get(&e.actor_id) {
            Some(&i) => {
                totals[i].total_sets += 1;
                totals[i].total_weight += e.weight_kg;
            }
            None => {
                index.insert(e.actor_id, totals.len());
                totals.push(ParticipantTotals {
                    actor_id: e.actor_id,
                    total_sets: 1,
                    total_weight: e.weight_kg,
                    latest_set: e.clone(),
                });
            }
        }
    }
    totals
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewExercise {
    pub id: Uuid,
    pub name: String,
    pub body_part_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user: PublicUser,
    pub total_sets: usize,
    pub total_weight: f64,
    pub latest_set: SetLogEntry,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupExerciseOverview {
    pub exercise: OverviewExercise,
    pub participants: Vec<Participant>,
    pub last_sets: Vec<SetLogEntry>,
}

/// Overview of one group exercise for a member of that group.
#[instrument(skip(groups, catalog, sets, users))]
pub async fn group_exercise_overview(
    groups: &dyn GroupRepo,
    catalog: &dyn CatalogRepo,
    sets: &dyn SetLogRepo,
    users: &dyn UserRepo,
    group_id: Uuid,
    exercise_id: Uuid,
    actor_id: Uuid,
) -> AppResult<GroupExerciseOverview> {
    guard::require_member(groups, group_id, actor_id).await?;
    let scope = Scope::Group(group_id);
    let exercise = catalog
        .find_exercise(actor_id, scope, exercise_id)
        .await?
        .ok_or_else(|| AppError::not_found("Exercise not found in this group"))?;

    let entries = sets.list_for_exercise(scope, exercise_id).await?;
    let totals = participant_totals(&entries);

    let ids: Vec<Uuid> = totals.iter().map(|t| t.actor_id).collect();
    let people: HashMap<Uuid, PublicUser> = users
        .find_many(&ids)
        .await?
        .iter()
        .map(|u| (u.id, PublicUser::from(u)))
        .collect();

    // accounts deleted since logging drop out of the rollup
    let participants = totals
        .into_iter()
        .filter_map(|t| {
            people.get(&t.actor_id).map(|user| Participant {
                user: user.clone(),
                total_sets: t.total_sets,
                total_weight: t.total_weight,
                latest_set: t.latest_set,
            })
        })
        .collect();

    Ok(GroupExerciseOverview {
        exercise: OverviewExercise {
            id: exercise.id,
            name: exercise.name,
            body_part_name: exercise.body_part_name,
        },
        participants,
        last_sets: entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{BodyPart, Exercise},
        groups::repo::Group,
        memory::MemoryStore,
        workouts::ledger::{admit_set, SetInput},
    };
    use time::{macros::datetime, Duration, OffsetDateTime};

    fn entry(actor: Uuid, set_number: i32, kg: f64, at: OffsetDateTime) -> SetLogEntry {
        SetLogEntry {
            id: Uuid::new_v4(),
            actor_id: actor,
            scope: Scope::Personal,
            exercise_id: Uuid::nil(),
            set_number,
            weight_kg: kg,
            reps: 8,
            performed_at: at,
        }
    }

    #[test]
    fn latest_set_is_first_seen_even_on_ties() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let t = datetime!(2024-01-01 10:00 +05:30);
        let first = entry(a, 2, 50.0, t);
        let entries = vec![first.clone(), entry(a, 1, 40.0, t), entry(b, 1, 30.0, t)];

        let totals = participant_totals(&entries);
        assert_eq!(totals.len(), 2);
        let ta = totals.iter().find(|p| p.actor_id == a).unwrap();
        assert_eq!(ta.total_sets, 2);
        assert_eq!(ta.total_weight, 90.0);
        assert_eq!(ta.latest_set, first);
    }

    async fn seed_group_exercise(store: &MemoryStore, group: &Group) -> Uuid {
        let now = group.created_at;
        let bp = BodyPart {
            id: Uuid::new_v4(),
            owner_id: group.owner_id,
            group_id: Some(group.id),
            name: "Back".into(),
            day: "Wednesday".into(),
            created_at: now,
        };
        store.insert_body_part(&bp).await.unwrap();
        let ex = Exercise {
            id: Uuid::new_v4(),
            owner_id: group.owner_id,
            group_id: Some(group.id),
            body_part_id: bp.id,
            body_part_name: bp.name.clone(),
            name: "Row".into(),
            created_at: now,
        };
        store.insert_exercise(&ex).await.unwrap();
        ex.id
    }

    async fn log(store: &MemoryStore, actor: Uuid, scope: Scope, exercise: Uuid, kg: f64, at: OffsetDateTime) {
        let input = SetInput {
            exercise_id: exercise,
            weight_kg: kg,
            reps: 10,
        };
        admit_set(store, store, actor, scope, input, at).await.unwrap();
    }

    #[tokio::test]
    async fn overview_rolls_up_members_and_excludes_personal_sets() {
        let store = MemoryStore::new();
        let owner = store.seed_user("Owner", "owner@mail.com").await;
        let member = store.seed_user("Member", "member@mail.com").await;
        let mut group = Group::new("Crew", owner.id, datetime!(2024-01-01 00:00 UTC));
        group.member_ids.push(member.id);
        store.seed_group(group.clone()).await;
        let exercise = seed_group_exercise(&store, &group).await;
        let t = datetime!(2024-04-10 07:00 +05:30);

        log(&store, owner.id, Scope::Group(group.id), exercise, 60.0, t).await;
        log(&store, owner.id, Scope::Group(group.id), exercise, 70.0, t + Duration::minutes(5)).await;
        log(&store, member.id, Scope::Group(group.id), exercise, 30.0, t + Duration::minutes(1)).await;
        // same exercise id used personally must not leak in
        log(&store, member.id, Scope::Personal, exercise, 999.0, t).await;

        let overview =
            group_exercise_overview(&store, &store, &store, &store, group.id, exercise, member.id)
                .await
                .unwrap();
        assert_eq!(overview.exercise.name, "Row");
        assert_eq!(overview.exercise.body_part_name, "Back");
        assert_eq!(overview.last_sets.len(), 3);
        assert_eq!(overview.last_sets[0].weight_kg, 70.0);

        let o = overview.participants.iter().find(|p| p.user.id == owner.id).unwrap();
        assert_eq!(o.total_sets, 2);
        assert_eq!(o.total_weight, 130.0);
        assert_eq!(o.latest_set.set_number, 2);
        let m = overview.participants.iter().find(|p| p.user.id == member.id).unwrap();
        assert_eq!(m.total_weight, 30.0);
    }

    #[tokio::test]
    async fn outsiders_are_forbidden() {
        let store = MemoryStore::new();
        let group = Group::new("Crew", Uuid::new_v4(), datetime!(2024-01-01 00:00 UTC));
        store.seed_group(group.clone()).await;
        let exercise = seed_group_exercise(&store, &group).await;

        let err = group_exercise_overview(&store, &store, &store, &store, group.id, exercise, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ScopeForbidden(_)));
    }

    #[tokio::test]
    async fn exercise_of_another_scope_is_not_found() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let group = Group::new("Crew", owner, datetime!(2024-01-01 00:00 UTC));
        let other = Group::new("Other", owner, datetime!(2024-01-01 00:00 UTC));
        store.seed_group(group.clone()).await;
        store.seed_group(other.clone()).await;
        let foreign = seed_group_exercise(&store, &other).await;

        let err = group_exercise_overview(&store, &store, &store, &store, group.id, foreign, owner)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
