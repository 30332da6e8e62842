use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which fields must be filled before a validate submit is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldPolicy {
    #[default]
    AllRequired,
    IdeaOnly,
}

impl FieldPolicy {
    pub fn enforces_required(&self) -> bool {
        matches!(self, FieldPolicy::AllRequired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Idea,
    TargetMarket,
    Location,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Idea, Field::TargetMarket, Field::Location];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Idea => "Business idea",
            Field::TargetMarket => "Target market",
            Field::Location => "Location",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Idea => write!(f, "idea"),
            Field::TargetMarket => write!(f, "market"),
            Field::Location => write!(f, "location"),
        }
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idea" => Ok(Field::Idea),
            "market" | "target-market" | "target_market" | "targetmarket" => Ok(Field::TargetMarket),
            "location" | "loc" => Ok(Field::Location),
            other => Err(format!("Unknown field '{}'", other)),
        }
    }
}

/// Current values of the idea form. Serializes to the validate request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub idea: String,
    pub target_market: String,
    pub location: String,
}

impl FormInput {
    pub fn new(idea: impl Into<String>, target_market: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            target_market: target_market.into(),
            location: location.into(),
        }
    }

    pub fn set_idea(&mut self, value: impl Into<String>) {
        self.idea = value.into();
    }

    pub fn set_target_market(&mut self, value: impl Into<String>) {
        self.target_market = value.into();
    }

    pub fn set_location(&mut self, value: impl Into<String>) {
        self.location = value.into();
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        match field {
            Field::Idea => self.set_idea(value),
            Field::TargetMarket => self.set_target_market(value),
            Field::Location => self.set_location(value),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Idea => &self.idea,
            Field::TargetMarket => &self.target_market,
            Field::Location => &self.location,
        }
    }

    /// True when every field is non-blank after trimming.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_setters_overwrite_unconditionally() {
        let mut input = FormInput::new("old idea", "old market", "old place");
        input.set_idea("  ");
        input.set(Field::TargetMarket, "<b>anything</b> goes ✓");
        input.set_location("");

        assert_eq!(input.idea, "  ");
        assert_eq!(input.target_market, "<b>anything</b> goes ✓");
        assert_eq!(input.location, "");
    }

    #[test]
    fn test_is_complete_trims_whitespace() {
        let mut input = FormInput::new("dog walking app", "urban professionals", "Austin");
        assert!(input.is_complete());

        input.set_location("   \t");
        assert!(!input.is_complete());
        assert_eq!(input.missing_fields(), vec![Field::Location]);
    }

    #[test]
    fn test_empty_form_is_missing_everything() {
        let input = FormInput::default();
        assert_eq!(input.missing_fields(), Field::ALL.to_vec());
    }

    #[test]
    fn test_field_from_str_aliases() {
        assert_eq!("Idea".parse::<Field>(), Ok(Field::Idea));
        assert_eq!("target-market".parse::<Field>(), Ok(Field::TargetMarket));
        assert_eq!("loc".parse::<Field>(), Ok(Field::Location));
        assert!("budget".parse::<Field>().is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let input = FormInput::new("a", "b", "c");
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"idea": "a", "targetMarket": "b", "location": "c"}));
    }

    #[test]
    fn test_policy_default_enforces_required() {
        assert!(FieldPolicy::default().enforces_required());
        assert!(!FieldPolicy::IdeaOnly.enforces_required());
    }
}
