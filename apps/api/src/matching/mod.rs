//! Match scoring and the recommendation pipeline built on it.

pub mod handlers;
pub mod issue_scoring;
pub mod mentor_scoring;
pub mod recommend;
pub mod repository;
pub mod weighted;
