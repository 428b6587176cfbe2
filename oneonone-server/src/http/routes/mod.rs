//! Route handlers organized by resource

pub mod health;
pub mod join;
pub mod dashboard;
pub mod meetings;
pub mod talking_points;
pub mod organisations;
