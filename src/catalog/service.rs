use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{BodyPartWithExercises, CreateBodyPartRequest, CreateExerciseRequest, ExerciseSummary},
    repo::{BodyPart, CatalogRepo, Exercise},
};
use crate::{
    error::{AppError, AppResult},
    groups::{guard, GroupRepo},
    scope::Scope,
};

#[instrument(skip(catalog, groups, req))]
pub async fn create_body_part(
    catalog: &dyn CatalogRepo,
    groups: &dyn GroupRepo,
    actor_id: Uuid,
    scope: Scope,
    req: CreateBodyPartRequest,
    now: OffsetDateTime,
) -> AppResult<BodyPart> {
    guard::authorize_scope(groups, actor_id, scope).await?;

    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::validation("'name' is required"))?;
    let day = req
        .day
        .ok_or_else(|| AppError::validation("'day' is required and must be a string"))?;
    let day = day.trim();
    if day.is_empty() {
        return Err(AppError::validation("'day' cannot be empty"));
    }

    let body_part = BodyPart {
        id: Uuid::new_v4(),
        owner_id: actor_id,
        group_id: scope.group_id(),
        name,
        day: day.to_string(),
        created_at: now,
    };
    catalog.insert_body_part(&body_part).await?;
    info!(body_part_id = %body_part.id, "body part created");
    Ok(body_part)
}

#[instrument(skip(catalog, groups, req))]
pub async fn create_exercise(
    catalog: &dyn CatalogRepo,
    groups: &dyn GroupRepo,
    actor_id: Uuid,
    scope: Scope,
    req: CreateExerciseRequest,
    now: OffsetDateTime,
) -> AppResult<Exercise> {
    guard::authorize_scope(groups, actor_id, scope).await?;

    let (body_part_id, name) = match (req.body_part_id, req.name) {
        (Some(id), Some(name)) if !name.trim().is_empty() => (id, name.trim().to_string()),
        _ => return Err(AppError::validation("'bodyPartId' and 'name' are required")),
    };

    let body_part = catalog
        .find_body_part(actor_id, scope, body_part_id)
        .await?
        .ok_or_else(|| AppError::not_found("Body part not found in this scope"))?;

    let exercise = Exercise {
        id: Uuid::new_v4(),
        owner_id: actor_id,
        group_id: scope.group_id(),
        body_part_id: body_part.id,
        body_part_name: body_part.name,
        name,
        created_at: now,
    };
    catalog.insert_exercise(&exercise).await?;
    info!(exercise_id = %exercise.id, "exercise created");
    Ok(exercise)
}

/// Body parts of a scope, each with its exercises; both sorted by name.
pub async fn body_parts_with_exercises(
    catalog: &dyn CatalogRepo,
    groups: &dyn GroupRepo,
    actor_id: Uuid,
    scope: Scope,
) -> AppResult<Vec<BodyPartWithExercises>> {
    guard::authorize_scope(groups, actor_id, scope).await?;

    let body_parts = catalog.list_body_parts(actor_id, scope).await?;
    let mut by_part: HashMap<Uuid, Vec<ExerciseSummary>> = HashMap::new();
    for ex in catalog.list_exercises(actor_id, scope).await? {
        by_part.entry(ex.body_part_id).or_default().push(ExerciseSummary {
            id: ex.id,
            name: ex.name,
        });
    }

    Ok(body_parts
        .into_iter()
        .map(|bp| BodyPartWithExercises {
            exercises: by_part.remove(&bp.id).unwrap_or_default(),
            id: bp.id,
            name: bp.name,
            day: bp.day,
        })
        .collect())
}

/// Exercises of one body part in the given scope, sorted by name.
pub async fn exercises_for_body_part(
    catalog: &dyn CatalogRepo,
    actor_id: Uuid,
    scope: Scope,
    body_part_id: Uuid,
) -> AppResult<Vec<Exercise>> {
    let exercises = catalog.list_exercises(actor_id, scope).await?;
    Ok(exercises
        .into_iter()
        .filter(|e| e.body_part_id == body_part_id)
        .collect())
}

/// The exercise if it exists in `scope`, otherwise `NotFound`.
pub async fn require_exercise(
    catalog: &dyn CatalogRepo,
    actor_id: Uuid,
    scope: Scope,
    exercise_id: Uuid,
) -> AppResult<Exercise> {
    catalog
        .find_exercise(actor_id, scope, exercise_id)
        .await?
        .ok_or_else(|| AppError::not_found("Exercise not found in this scope"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{groups::repo::Group, memory::MemoryStore};
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-05-01 10:00:00 +05:30);

    fn body_part_req(name: &str, day: &str) -> CreateBodyPartRequest {
        CreateBodyPartRequest {
            name: Some(name.into()),
            day: Some(day.into()),
        }
    }

    #[tokio::test]
    async fn personal_catalog_lists_sorted_with_exercises() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        let legs = create_body_part(&store, &store, actor, Scope::Personal, body_part_req("Legs", "Monday"), NOW)
            .await
            .unwrap();
        create_body_part(&store, &store, actor, Scope::Personal, body_part_req("Chest", "Friday"), NOW)
            .await
            .unwrap();
        for name in ["Squat", "Lunge"] {
            create_exercise(
                &store,
                &store,
                actor,
                Scope::Personal,
                CreateExerciseRequest {
                    body_part_id: Some(legs.id),
                    name: Some(name.into()),
                },
                NOW,
            )
            .await
            .unwrap();
        }

        let listing = body_parts_with_exercises(&store, &store, actor, Scope::Personal)
            .await
            .unwrap();
        let names: Vec<_> = listing.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Chest", "Legs"]);
        let legs_ex: Vec<_> = listing[1].exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(legs_ex, ["Lunge", "Squat"]);
        assert!(listing[0].exercises.is_empty());

        let other = Uuid::new_v4();
        assert!(body_parts_with_exercises(&store, &store, other, Scope::Personal)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn blank_day_is_rejected() {
        let store = MemoryStore::new();
        let err = create_body_part(&store, &store, Uuid::new_v4(), Scope::Personal, body_part_req("Back", "  "), NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn exercise_needs_body_part_in_same_scope() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let group = Group::new("Morning crew", owner, NOW);
        store.seed_group(group.clone()).await;

        let personal = create_body_part(&store, &store, owner, Scope::Personal, body_part_req("Arms", "Tue"), NOW)
            .await
            .unwrap();
        let err = create_exercise(
            &store,
            &store,
            owner,
            Scope::Group(group.id),
            CreateExerciseRequest {
                body_part_id: Some(personal.id),
                name: Some("Curl".into()),
            },
            NOW,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn outsiders_cannot_create_in_a_group() {
        let store = MemoryStore::new();
        let group = Group::new("Closed", Uuid::new_v4(), NOW);
        store.seed_group(group.clone()).await;
        let err = create_body_part(
            &store,
            &store,
            Uuid::new_v4(),
            Scope::Group(group.id),
            body_part_req("Legs", "Mon"),
            NOW,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::ScopeForbidden(_)));
    }
}
