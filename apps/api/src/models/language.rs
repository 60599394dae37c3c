use serde::{Deserialize, Deserializer, Serialize};

/// One language's share of an account's code, in percent.
///
/// A `Vec<LanguageShare>` is an affinity list: ordered most-used first,
/// percentages summing to roughly 100, or empty when nothing is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub lang: String,
    /// Accepts a JSON number or a numeric string such as `"60.00"`.
    #[serde(deserialize_with = "deserialize_percentage")]
    pub percentage: f64,
}

impl LanguageShare {
    pub fn new(lang: impl Into<String>, percentage: f64) -> Self {
        Self {
            lang: lang.into(),
            percentage,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Coerces string percentages to numbers. Anything unparseable or non-finite
/// becomes 0 so it contributes nothing to a score.
fn deserialize_percentage<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n,
        NumberOrString::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
    };
    Ok(if value.is_finite() { value } else { 0.0 })
}

/// Case-insensitive position of `lang` in an affinity list.
pub fn affinity_rank(affinity: &[LanguageShare], lang: &str) -> Option<usize> {
    affinity
        .iter()
        .position(|share| share.lang.eq_ignore_ascii_case(lang))
}
