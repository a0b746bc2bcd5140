//! In-process store behind every repository trait. Used for
//! `STORAGE_BACKEND=memory` and by the test suite.

use std::cmp::Reverse;

use async_trait::async_trait;
use time::{macros::date, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    auth::{User, UserRepo},
    catalog::{BodyPart, CatalogRepo, Exercise},
    days::{day_key, DayKey},
    groups::{Group, GroupRepo},
    nutrition::{NutritionEntry, NutritionRepo},
    scope::Scope,
    weight::{WeightLogEntry, WeightRepo},
    workouts::{
        repo::{Admission, NewSetLog},
        SetLogEntry, SetLogRepo,
    },
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    groups: Vec<Group>,
    body_parts: Vec<BodyPart>,
    exercises: Vec<Exercise>,
    sets: Vec<SetLogEntry>,
    weights: Vec<WeightLogEntry>,
    nutrition: Vec<NutritionEntry>,
}

impl Inner {
    /// Drops exercises whose body part is gone and sets whose exercise is gone.
    fn cascade(&mut self) {
        let body_parts = &self.body_parts;
        self.exercises
            .retain(|e| body_parts.iter().any(|b| b.id == e.body_part_id));
        let exercises = &self.exercises;
        self.sets
            .retain(|s| exercises.iter().any(|e| e.id == s.exercise_id));
    }

    fn remove_group_data(&mut self, group_id: Uuid) {
        self.groups.retain(|g| g.id != group_id);
        self.body_parts.retain(|b| b.group_id != Some(group_id));
        self.sets.retain(|s| s.scope != Scope::Group(group_id));
        self.cascade();
    }
}

/// Personal records match their owner; group records match their group.
fn in_scope(record: Scope, owner_id: Uuid, actor_id: Uuid, scope: Scope) -> bool {
    record == scope && (!scope.is_personal() || owner_id == actor_id)
}

/// Newest first; a stable sort keeps insertion order on full ties.
fn sort_newest_first(entries: &mut [SetLogEntry]) {
    entries.sort_by_key(|e| Reverse((e.performed_at, e.set_number)));
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_group(&self, group: Group) {
        self.inner.lock().await.groups.push(group);
    }

    /// Adds a user with fixed body data and no usable password.
    pub async fn seed_user(&self, name: &str, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            gender: "other".to_string(),
            date_of_birth: date!(1995 - 01 - 01),
            age: 29,
            height_cm: 170.0,
            current_weight_kg: 70.0,
            current_bmi: 24.2,
            gym_timing: "07:00 AM".to_string(),
            image_url: None,
            created_at: OffsetDateTime::now_utc(),
        };
        self.inner.lock().await.users.push(user.clone());
        user
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn register(&self, user: &User, seed: &WeightLogEntry) -> anyhow::Result<Option<Vec<Uuid>>> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        inner.users.push(user.clone());
        inner.weights.push(WeightLogEntry {
            actor_id: user.id,
            ..seed.clone()
        });

        let mut joined = Vec::new();
        for group in inner.groups.iter_mut() {
            let before = group.pending_invites.len();
            group.pending_invites.retain(|e| *e != user.email);
            if group.pending_invites.len() != before && !group.member_ids.contains(&user.id) {
                group.member_ids.push(user.id);
                joined.push(group.id);
            }
        }
        Ok(Some(joined))
    }

    async fn update_profile(&self, user: &User) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(stored) = inner.users.iter_mut().find(|u| u.id == user.id) {
            stored.name = user.name.clone();
            stored.gender = user.gender.clone();
            stored.height_cm = user.height_cm;
            stored.gym_timing = user.gym_timing.clone();
            stored.current_bmi = user.current_bmi;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        if inner.users.len() == before {
            return Ok(false);
        }

        let owned: Vec<Uuid> = inner
            .groups
            .iter()
            .filter(|g| g.owner_id == id)
            .map(|g| g.id)
            .collect();
        for group_id in owned {
            inner.remove_group_data(group_id);
        }
        for group in inner.groups.iter_mut() {
            group.member_ids.retain(|m| *m != id);
        }
        inner
            .body_parts
            .retain(|b| !(b.group_id.is_none() && b.owner_id == id));
        inner.sets.retain(|s| s.actor_id != id);
        inner.weights.retain(|w| w.actor_id != id);
        inner.nutrition.retain(|n| n.actor_id != id);
        inner.cascade();
        Ok(true)
    }
}

#[async_trait]
impl CatalogRepo for MemoryStore {
    async fn insert_body_part(&self, body_part: &BodyPart) -> anyhow::Result<()> {
        self.inner.lock().await.body_parts.push(body_part.clone());
        Ok(())
    }

    async fn insert_exercise(&self, exercise: &Exercise) -> anyhow::Result<()> {
        self.inner.lock().await.exercises.push(exercise.clone());
        Ok(())
    }

    async fn find_body_part(&self, actor_id: Uuid, scope: Scope, id: Uuid) -> anyhow::Result<Option<BodyPart>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .body_parts
            .iter()
            .find(|b| b.id == id && in_scope(b.scope(), b.owner_id, actor_id, scope))
            .cloned())
    }

    async fn find_exercise(&self, actor_id: Uuid, scope: Scope, id: Uuid) -> anyhow::Result<Option<Exercise>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .exercises
            .iter()
            .find(|e| e.id == id && in_scope(e.scope(), e.owner_id, actor_id, scope))
            .cloned())
    }

    async fn list_body_parts(&self, actor_id: Uuid, scope: Scope) -> anyhow::Result<Vec<BodyPart>> {
        let inner = self.inner.lock().await;
        let mut list: Vec<BodyPart> = inner
            .body_parts
            .iter()
            .filter(|b| in_scope(b.scope(), b.owner_id, actor_id, scope))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn list_exercises(&self, actor_id: Uuid, scope: Scope) -> anyhow::Result<Vec<Exercise>> {
        let inner = self.inner.lock().await;
        let mut list: Vec<Exercise> = inner
            .exercises
            .iter()
            .filter(|e| in_scope(e.scope(), e.owner_id, actor_id, scope))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    async fn delete_group_exercise(&self, group_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.exercises.len();
        inner
            .exercises
            .retain(|e| !(e.id == id && e.scope() == Scope::Group(group_id)));
        let removed = inner.exercises.len() != before;
        if removed {
            inner.sets.retain(|s| s.exercise_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl SetLogRepo for MemoryStore {
    async fn append_capped(&self, new: NewSetLog, day: DayKey, cap: usize) -> anyhow::Result<Admission> {
        // count and append under one lock
        let mut inner = self.inner.lock().await;
        let count = inner
            .sets
            .iter()
            .filter(|s| {
                s.actor_id == new.actor_id
                    && s.exercise_id == new.exercise_id
                    && s.scope == new.scope
                    && day_key(s.performed_at) == day
            })
            .count();
        if count >= cap {
            return Ok(Admission::LimitReached);
        }
        let entry = new.into_entry(count as i32 + 1);
        inner.sets.push(entry.clone());
        Ok(Admission::Admitted(entry))
    }

    async fn list_for_actor(
        &self,
        actor_id: Uuid,
        scope: Scope,
        exercise_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<SetLogEntry>> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<SetLogEntry> = inner
            .sets
            .iter()
            .filter(|s| s.actor_id == actor_id && s.scope == scope && s.exercise_id == exercise_id)
            .cloned()
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_for_exercise(&self, scope: Scope, exercise_id: Uuid) -> anyhow::Result<Vec<SetLogEntry>> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<SetLogEntry> = inner
            .sets
            .iter()
            .filter(|s| s.scope == scope && s.exercise_id == exercise_id)
            .cloned()
            .collect();
        sort_newest_first(&mut entries);
        Ok(entries)
    }
}

#[async_trait]
impl GroupRepo for MemoryStore {
    async fn insert(&self, group: &Group) -> anyhow::Result<()> {
        self.inner.lock().await.groups.push(group.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Group>> {
        let inner = self.inner.lock().await;
        Ok(inner.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Group>> {
        let inner = self.inner.lock().await;
        let mut list: Vec<Group> = inner
            .groups
            .iter()
            .filter(|g| g.owner_id == user_id || g.member_ids.contains(&user_id))
            .cloned()
            .collect();
        list.sort_by_key(|g| Reverse(g.created_at));
        Ok(list)
    }

    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(group) = inner.groups.iter_mut().find(|g| g.id == group_id) {
            if !group.member_ids.contains(&user_id) {
                group.member_ids.push(user_id);
            }
        }
        Ok(())
    }

    async fn add_pending_invite(&self, group_id: Uuid, email: &str) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(group) = inner.groups.iter_mut().find(|g| g.id == group_id) {
            if !group.pending_invites.iter().any(|e| e == email) {
                group.pending_invites.push(email.to_string());
            }
        }
        Ok(())
    }

    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().await;
        let Some(group) = inner.groups.iter_mut().find(|g| g.id == group_id) else {
            return Ok(false);
        };
        let before = group.member_ids.len();
        group.member_ids.retain(|m| *m != user_id);
        Ok(group.member_ids.len() != before)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().await;
        if !inner.groups.iter().any(|g| g.id == id) {
            return Ok(false);
        }
        inner.remove_group_data(id);
        Ok(true)
    }
}

#[async_trait]
impl WeightRepo for MemoryStore {
    async fn append(&self, entry: &WeightLogEntry) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().await;
        inner.weights.push(entry.clone());
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == entry.actor_id) {
            user.current_weight_kg = entry.weight_kg;
            user.current_bmi = entry.bmi;
        }
        Ok(())
    }

    async fn list_ascending(&self, actor_id: Uuid) -> anyhow::Result<Vec<WeightLogEntry>> {
        let inner = self.inner.lock().await;
        let mut logs: Vec<WeightLogEntry> = inner
            .weights
            .iter()
            .filter(|w| w.actor_id == actor_id)
            .cloned()
            .collect();
        logs.sort_by_key(|w| w.recorded_at);
        Ok(logs)
    }
}

#[async_trait]
impl NutritionRepo for MemoryStore {
    async fn insert_entry(&self, entry: &NutritionEntry) -> anyhow::Result<()> {
        self.inner.lock().await.nutrition.push(entry.clone());
        Ok(())
    }

    async fn find_entry(&self, actor_id: Uuid, id: Uuid) -> anyhow::Result<Option<NutritionEntry>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .nutrition
            .iter()
            .find(|n| n.id == id && n.actor_id == actor_id)
            .cloned())
    }

    async fn list_page(&self, actor_id: Uuid, offset: i64, limit: i64) -> anyhow::Result<Vec<NutritionEntry>> {
        let inner = self.inner.lock().await;
        let mut list: Vec<NutritionEntry> = inner
            .nutrition
            .iter()
            .filter(|n| n.actor_id == actor_id)
            .cloned()
            .collect();
        list.sort_by_key(|n| Reverse(n.created_at));
        Ok(list
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn list_all(&self, actor_id: Uuid) -> anyhow::Result<Vec<NutritionEntry>> {
        let inner = self.inner.lock().await;
        let mut list: Vec<NutritionEntry> = inner
            .nutrition
            .iter()
            .filter(|n| n.actor_id == actor_id)
            .cloned()
            .collect();
        list.sort_by_key(|n| n.created_at);
        Ok(list)
    }

    async fn update_entry(&self, entry: &NutritionEntry) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().await;
        match inner
            .nutrition
            .iter_mut()
            .find(|n| n.id == entry.id && n.actor_id == entry.actor_id)
        {
            Some(stored) => {
                *stored = entry.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_entry(&self, actor_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.nutrition.len();
        inner.nutrition.retain(|n| !(n.id == id && n.actor_id == actor_id));
        Ok(inner.nutrition.len() != before)
    }
}
