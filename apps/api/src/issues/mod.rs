//! Issue Source: good-first-issue candidates from the tracked repositories.

pub mod handlers;
pub mod source;

pub use source::{fetch_candidate_issues, filter_recent, CandidateFeed};
