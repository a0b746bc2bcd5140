use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{NewNutrition, UpdateNutritionRequest},
    repo::{NutritionEntry, NutritionRepo},
};
use crate::{
    error::{AppError, AppResult},
    paging::Page,
};

#[instrument(skip(nutrition, new))]
pub async fn add_entry(
    nutrition: &dyn NutritionRepo,
    actor_id: Uuid,
    new: NewNutrition,
    now: OffsetDateTime,
) -> AppResult<NutritionEntry> {
    let entry = NutritionEntry {
        id: Uuid::new_v4(),
        actor_id,
        food_name: new.food_name,
        calories: new.calories,
        quantity: new.quantity,
        time: new.time,
        meal_type: new.meal_type,
        created_at: now,
    };
    nutrition.insert_entry(&entry).await?;
    info!(entry_id = %entry.id, meal = %entry.meal_type, "nutrition entry added");
    Ok(entry)
}

pub async fn list_entries(
    nutrition: &dyn NutritionRepo,
    actor_id: Uuid,
    page: Page,
) -> AppResult<Vec<NutritionEntry>> {
    Ok(nutrition.list_page(actor_id, page.offset(), page.limit).await?)
}

#[instrument(skip(nutrition, req))]
pub async fn update_entry(
    nutrition: &dyn NutritionRepo,
    actor_id: Uuid,
    id: Uuid,
    req: UpdateNutritionRequest,
) -> AppResult<NutritionEntry> {
    let not_found = || AppError::not_found("Nutrition entry not found");
    let mut entry = nutrition.find_entry(actor_id, id).await?.ok_or_else(not_found)?;
    req.apply(&mut entry)?;
    if !nutrition.update_entry(&entry).await? {
        return Err(not_found());
    }
    Ok(entry)
}

#[instrument(skip(nutrition))]
pub async fn delete_entry(nutrition: &dyn NutritionRepo, actor_id: Uuid, id: Uuid) -> AppResult<()> {
    if !nutrition.delete_entry(actor_id, id).await? {
        return Err(AppError::not_found("Nutrition entry not found"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::MemoryStore, nutrition::repo::MealType};
    use time::{macros::datetime, Duration};

    fn new_entry(food: &str, calories: f64) -> NewNutrition {
        NewNutrition {
            food_name: food.into(),
            calories,
            quantity: 1.0,
            time: "12:30".into(),
            meal_type: MealType::Lunch,
        }
    }

    #[tokio::test]
    async fn lists_newest_first_in_pages() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        let start = datetime!(2024-03-01 08:00 +05:30);
        for (i, food) in ["Eggs", "Rice", "Dal"].into_iter().enumerate() {
            add_entry(&store, actor, new_entry(food, 100.0), start + Duration::hours(i as i64))
                .await
                .unwrap();
        }

        let first = list_entries(&store, actor, Page::new(1, 2)).await.unwrap();
        let names: Vec<_> = first.iter().map(|e| e.food_name.as_str()).collect();
        assert_eq!(names, ["Dal", "Rice"]);
        let second = list_entries(&store, actor, Page::new(2, 2)).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].food_name, "Eggs");
    }

    #[tokio::test]
    async fn updates_and_deletes_only_own_entries() {
        let store = MemoryStore::new();
        let actor = Uuid::new_v4();
        let entry = add_entry(&store, actor, new_entry("Paneer", 300.0), datetime!(2024-03-01 20:00 +05:30))
            .await
            .unwrap();

        let stranger = Uuid::new_v4();
        let err = update_entry(&store, stranger, entry.id, UpdateNutritionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let updated = update_entry(
            &store,
            actor,
            entry.id,
            UpdateNutritionRequest {
                calories: Some(320.0),
                meal_type: Some("dinner".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.calories, 320.0);
        assert_eq!(updated.meal_type, MealType::Dinner);
        assert_eq!(updated.food_name, "Paneer");

        assert!(matches!(
            delete_entry(&store, stranger, entry.id).await,
            Err(AppError::NotFound(_))
        ));
        delete_entry(&store, actor, entry.id).await.unwrap();
        assert!(list_entries(&store, actor, Page::new(1, 10)).await.unwrap().is_empty());
    }
}
