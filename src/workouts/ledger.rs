//! Admission of new sets under the per-day cap.

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::repo::{Admission, NewSetLog, SetLogEntry, SetLogRepo};
use crate::{
    days::day_key,
    error::{AppError, AppResult},
    groups::{guard, GroupRepo},
    scope::Scope,
};

/// Sets one actor may log per exercise, scope and local day.
pub const DAILY_SET_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct SetInput {
    pub exercise_id: Uuid,
    pub weight_kg: f64,
    pub reps: i32,
}

fn validate(input: &SetInput) -> AppResult<()> {
    if !input.weight_kg.is_finite() || input.weight_kg < 0.0 {
        return Err(AppError::validation("'weightKg' must be a non-negative number"));
    }
    if input.reps < 1 {
        return Err(AppError::validation("'reps' must be at least 1"));
    }
    Ok(())
}

/// Admits one set for `actor_id` in `scope` at `now`.
///
/// Group scopes require membership, checked before the input. The entry gets
/// the next set number of its day; once the day holds `DAILY_SET_LIMIT`
/// entries the call fails with `DailySetLimitReached` and writes nothing.
pub async fn admit_set(
    sets: &dyn SetLogRepo,
    groups: &dyn GroupRepo,
    actor_id: Uuid,
    scope: Scope,
    input: SetInput,
    now: OffsetDateTime,
) -> AppResult<SetLogEntry> {
    guard::authorize_scope(groups, actor_id, scope).await?;
    admit_authorized(sets, actor_id, scope, input, now).await
}

/// [`admit_set`] for callers that already hold the actor's access to `scope`.
#[instrument(skip(sets))]
pub async fn admit_authorized(
    sets: &dyn SetLogRepo,
    actor_id: Uuid,
    scope: Scope,
    input: SetInput,
    now: OffsetDateTime,
) -> AppResult<SetLogEntry> {
    validate(&input)?;
    let day = day_key(now);
    let new = NewSetLog {
        actor_id,
        exercise_id: input.exercise_id,
        scope,
        weight_kg: input.weight_kg,
        reps: input.reps,
        performed_at: now,
    };

    match sets.append_capped(new, day, DAILY_SET_LIMIT).await? {
        Admission::Admitted(entry) => {
            info!(set_id = %entry.id, set_number = entry.set_number, %day, "set admitted");
            Ok(entry)
        }
        Admission::LimitReached => {
            warn!(%day, "daily set limit reached");
            Err(AppError::DailySetLimitReached)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{groups::repo::Group, memory::MemoryStore};
    use std::sync::Arc;
    use time::{macros::datetime, Duration};

    const NOW: OffsetDateTime = datetime!(2024-01-01 09:00:00 +05:30);

    fn input(exercise_id: Uuid) -> SetInput {
        SetInput {
            exercise_id,
            weight_kg: 50.0,
            reps: 8,
        }
    }

    #[tokio::test]
    async fn numbers_sets_then_stops_at_the_cap() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        let exercise = Uuid::new_v4();

        for expected in 1..=3 {
            let entry = admit_set(&store, &store, actor, Scope::Personal, input(exercise), NOW + Duration::minutes(expected))
                .await
                .expect("admitted");
            assert_eq!(entry.set_number, expected as i32);
        }

        let err = admit_set(&store, &store, actor, Scope::Personal, input(exercise), NOW + Duration::minutes(10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DailySetLimitReached));

        let stored = store
            .list_for_actor(actor, Scope::Personal, exercise, 0, 100)
            .await
            .unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn next_local_day_starts_again_at_one() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        let exercise = Uuid::new_v4();
        let late = datetime!(2024-01-01 23:59:59 +05:30);
        for _ in 0..3 {
            admit_set(&store, &store, actor, Scope::Personal, input(exercise), late)
                .await
                .unwrap();
        }
        let entry = admit_set(
            &store,
            &store,
            actor,
            Scope::Personal,
            input(exercise),
            datetime!(2024-01-02 00:00:01 +05:30),
        )
        .await
        .unwrap();
        assert_eq!(entry.set_number, 1);
    }

    #[tokio::test]
    async fn caps_are_independent_per_scope() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        let exercise = Uuid::new_v4();
        let group = Group::new("Crew", actor, NOW);
        store.seed_group(group.clone()).await;

        for _ in 0..3 {
            admit_set(&store, &store, actor, Scope::Personal, input(exercise), NOW)
                .await
                .unwrap();
        }
        let entry = admit_set(&store, &store, actor, Scope::Group(group.id), input(exercise), NOW)
            .await
            .unwrap();
        assert_eq!(entry.set_number, 1);
        assert_eq!(entry.scope, Scope::Group(group.id));
    }

    #[tokio::test]
    async fn non_members_are_forbidden_without_side_effects() {
        let store = MemoryStore::new();
        let group = Group::new("Crew", Uuid::new_v4(), NOW);
        store.seed_group(group.clone()).await;
        let outsider = Uuid::new_v4();
        let exercise = Uuid::new_v4();

        let err = admit_set(&store, &store, outsider, Scope::Group(group.id), input(exercise), NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ScopeForbidden(_)));
        assert!(store
            .list_for_exercise(Scope::Group(group.id), exercise)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn membership_is_checked_before_input() {
        let store = MemoryStore::new();
        let group = Group::new("Crew", Uuid::new_v4(), NOW);
        store.seed_group(group.clone()).await;
        let bad = SetInput {
            reps: 0,
            ..input(Uuid::new_v4())
        };
        let err = admit_set(&store, &store, Uuid::new_v4(), Scope::Group(group.id), bad, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ScopeForbidden(_)));
    }

    #[tokio::test]
    async fn rejects_invalid_input() {
        let store = MemoryStore::new();
        let bad_reps = SetInput {
            reps: 0,
            ..input(Uuid::new_v4())
        };
        let err = admit_set(&store, &store, Uuid::new_v4(), Scope::Personal, bad_reps, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let bad_weight = SetInput {
            weight_kg: -1.0,
            ..input(Uuid::new_v4())
        };
        let err = admit_set(&store, &store, Uuid::new_v4(), Scope::Personal, bad_weight, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn concurrent_admissions_never_exceed_the_cap() {
        let store = Arc::new(MemoryStore::new());
        let actor = Uuid::new_v4();
        let exercise = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                admit_set(&*store, &*store, actor, Scope::Personal, input(exercise), NOW).await
            }));
        }

        let mut admitted = Vec::new();
        let mut limited = 0;
        for handle in handles {
            match handle.await.expect("task") {
                Ok(entry) => admitted.push(entry.set_number),
                Err(AppError::DailySetLimitReached) => limited += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        admitted.sort();
        assert_eq!(admitted, vec![1, 2, 3]);
        assert_eq!(limited, 7);
    }
}
