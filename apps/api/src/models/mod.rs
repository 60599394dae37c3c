pub mod issue;
pub mod language;
pub mod profile;
