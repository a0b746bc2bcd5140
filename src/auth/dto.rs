use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use super::{credentials, repo::User};
use crate::error::{AppError, AppResult};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

/// Request body for registration; every field is required.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>, // YYYY-MM-DD
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub gym_timing: Option<String>,
}

/// Registration input after validation and normalization.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub gender: Gender,
    pub date_of_birth: Date,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gym_timing: String,
}

impl RegisterRequest {
    pub fn validate(self) -> AppResult<Registration> {
        let missing = || AppError::validation("All fields are required");
        let name = non_blank(self.name).ok_or_else(missing)?;
        let email = credentials::normalize_email(&self.email.ok_or_else(missing)?);
        let password = self.password.ok_or_else(missing)?;
        let gender = self.gender.ok_or_else(missing)?;
        let dob = self.date_of_birth.ok_or_else(missing)?;
        let age = self.age.ok_or_else(missing)?;
        let height_cm = self.height_cm.ok_or_else(missing)?;
        let weight_kg = self.weight_kg.ok_or_else(missing)?;
        let gym_timing = non_blank(self.gym_timing).ok_or_else(missing)?;

        if !credentials::is_valid_email(&email) {
            return Err(AppError::validation("Invalid email"));
        }
        if password.len() < credentials::MIN_PASSWORD_LEN {
            return Err(AppError::validation("Password too short"));
        }
        let date_of_birth = parse_date(&dob)?;
        if age <= 0 {
            return Err(AppError::validation("'age' must be positive"));
        }
        if !(height_cm.is_finite() && height_cm > 0.0) {
            return Err(AppError::validation("'heightCm' must be positive"));
        }
        if !(weight_kg.is_finite() && weight_kg > 0.0) {
            return Err(AppError::validation("'weightKg' must be positive"));
        }

        Ok(Registration {
            name,
            email,
            password,
            gender,
            date_of_birth,
            age,
            height_cm,
            weight_kg,
            gym_timing,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(raw: &str) -> AppResult<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::validation("'dateOfBirth' must be YYYY-MM-DD"))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub height_cm: Option<f64>,
    pub gender: Option<Gender>,
    pub gym_timing: Option<String>,
}

impl UpdateProfileRequest {
    /// Applies the changes to `user`; BMI is left for the caller to recompute.
    pub fn apply(self, user: &mut User) -> AppResult<()> {
        if let Some(name) = non_blank(self.name) {
            user.name = name;
        }
        if let Some(height) = self.height_cm {
            if !(height.is_finite() && height > 0.0) {
                return Err(AppError::validation("'heightCm' must be positive"));
            }
            user.height_cm = height;
        }
        if let Some(gender) = self.gender {
            user.gender = gender.as_str().to_string();
        }
        if let Some(timing) = non_blank(self.gym_timing) {
            user.gym_timing = timing;
        }
        Ok(())
    }
}

/// Returned after register, login or refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AccountView,
}

/// The account as its owner (or a fellow gym member) sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub gender: String,
    #[serde(with = "iso_date")]
    pub date_of_birth: Date,
    pub age: i32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub bmi: f64,
    pub gym_timing: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for AccountView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            image: u.image_url.clone(),
            gender: u.gender.clone(),
            date_of_birth: u.date_of_birth,
            age: u.age,
            height_cm: u.height_cm,
            weight_kg: u.current_weight_kg,
            bmi: u.current_bmi,
            gym_timing: u.gym_timing.clone(),
            created_at: u.created_at,
        }
    }
}

/// Minimal identity shown next to group activity.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            image: u.image_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
