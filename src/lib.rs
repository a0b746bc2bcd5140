//! Workout, weight and nutrition tracking for individuals and gym groups.

pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod days;
pub mod db;
pub mod error;
pub mod extract;
pub mod groups;
pub mod memory;
pub mod nutrition;
pub mod paging;
pub mod profile;
pub mod scope;
pub mod state;
pub mod weight;
pub mod workouts;

#[cfg(test)]
mod tests;
