use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::demographics::{AgeRange, Target, TargetGender};

/// An immutable advertisement entry with its targeting predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub age_range: AgeRange,
    pub target_gender: TargetGender,
    pub category: String,
    /// Opaque handle to the creative asset.
    pub media_ref: String,
    pub duration_seconds: u32,
}

impl AdRecord {
    /// True when `target.age` lies in the age range and the gender rule
    /// accepts `target.gender`.
    pub fn is_eligible_for(&self, target: &Target) -> bool {
        self.age_range.contains(target.age) && self.target_gender.matches(target.gender)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_seconds))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::ad;
    use super::*;
    use crate::shared::demographics::Gender;

    #[test]
    fn test_eligible_requires_age_and_gender() {
        let record = ad("1", 25, 45, TargetGender::Female, 15);
        assert!(record.is_eligible_for(&Target::new(30, Gender::Female)));
        assert!(!record.is_eligible_for(&Target::new(30, Gender::Male)));
        assert!(!record.is_eligible_for(&Target::new(50, Gender::Female)));
    }

    #[test]
    fn test_duration_conversion() {
        let record = ad("1", 0, 99, TargetGender::Both, 12);
        assert_eq!(record.duration(), Duration::from_secs(12));
    }

    #[test]
    fn test_deserializes_camel_case_fields() {
        let json = r#"{
            "id": "9",
            "title": "Coffee",
            "description": "Fresh roast",
            "ageRange": { "min": 18, "max": 99 },
            "targetGender": "both",
            "category": "Food",
            "mediaRef": "coffee.png",
            "durationSeconds": 8
        }"#;
        let record: AdRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "9");
        assert_eq!(record.age_range, AgeRange::new(18, 99));
        assert_eq!(record.target_gender, TargetGender::Both);
        assert_eq!(record.duration_seconds, 8);
    }
}
