use serde::Deserialize;

use super::repo::{MealType, NutritionEntry};
use crate::error::{AppError, AppResult};

fn parse_meal_type(raw: &str) -> AppResult<MealType> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid 'mealType': {raw}")))
}

fn check_amounts(calories: f64, quantity: f64) -> AppResult<()> {
    if !(calories.is_finite() && calories >= 0.0) {
        return Err(AppError::validation("'calories' must be a non-negative number"));
    }
    if !quantity.is_finite() {
        return Err(AppError::validation("'quantity' must be a number"));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNutritionRequest {
    pub food_name: Option<String>,
    pub calories: Option<f64>,
    pub quantity: Option<f64>,
    pub time: Option<String>,
    pub meal_type: Option<String>,
}

/// Validated fields of a new entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNutrition {
    pub food_name: String,
    pub calories: f64,
    pub quantity: f64,
    pub time: String,
    pub meal_type: MealType,
}

impl CreateNutritionRequest {
    pub fn validate(self) -> AppResult<NewNutrition> {
        let required = || {
            AppError::validation("'foodName', 'calories', 'quantity', 'time' and 'mealType' are required")
        };
        let food_name = self
            .food_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(required)?;
        let calories = self.calories.ok_or_else(required)?;
        let quantity = self.quantity.ok_or_else(required)?;
        let time = self
            .time
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(required)?;
        let meal_type = parse_meal_type(&self.meal_type.ok_or_else(required)?)?;
        check_amounts(calories, quantity)?;
        Ok(NewNutrition {
            food_name,
            calories,
            quantity,
            time,
            meal_type,
        })
    }
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNutritionRequest {
    pub food_name: Option<String>,
    pub calories: Option<f64>,
    pub quantity: Option<f64>,
    pub time: Option<String>,
    pub meal_type: Option<String>,
}

impl UpdateNutritionRequest {
    pub fn apply(self, entry: &mut NutritionEntry) -> AppResult<()> {
        if let Some(name) = self.food_name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("'foodName' cannot be empty"));
            }
            entry.food_name = name.to_string();
        }
        if let Some(calories) = self.calories {
            entry.calories = calories;
        }
        if let Some(quantity) = self.quantity {
            entry.quantity = quantity;
        }
        if let Some(time) = self.time {
            entry.time = time.trim().to_string();
        }
        if let Some(meal) = self.meal_type {
            entry.meal_type = parse_meal_type(&meal)?;
        }
        check_amounts(entry.calories, entry.quantity)
    }
}
