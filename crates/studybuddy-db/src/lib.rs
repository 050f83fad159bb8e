//! Study Buddy Database Layer
//!
//! Postgres access for persisted schedules, behind the `ScheduleStore` trait.

pub mod db;

pub use db::*;
