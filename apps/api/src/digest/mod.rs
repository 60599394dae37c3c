//! Change digest: diffs the stored good-first-issue snapshot against a fresh
//! fetch and notifies opted-in profiles.

pub mod changes;
pub mod handlers;
pub mod notifier;
pub mod runner;
