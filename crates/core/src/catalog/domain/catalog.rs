use std::collections::HashSet;

use thiserror::Error;

use super::ad_record::AdRecord;
use crate::shared::demographics::{AgeRange, TargetGender};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog contains no advertisements")]
    Empty,
    #[error("duplicate advertisement id '{0}'")]
    DuplicateId(String),
    #[error("advertisement '{id}' has inverted age range {min}-{max}")]
    InvertedAgeRange { id: String, min: u32, max: u32 },
    #[error("advertisement '{0}' has a zero display duration")]
    ZeroDuration(String),
}

/// Validated, read-only advertisement table.
///
/// Non-empty by construction, so fallback selection always has a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    ads: Vec<AdRecord>,
}

impl Catalog {
    pub fn new(ads: Vec<AdRecord>) -> Result<Self, CatalogError> {
        if ads.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for ad in &ads {
            if !seen.insert(ad.id.as_str()) {
                return Err(CatalogError::DuplicateId(ad.id.clone()));
            }
            if !ad.age_range.is_valid() {
                return Err(CatalogError::InvertedAgeRange {
                    id: ad.id.clone(),
                    min: ad.age_range.min,
                    max: ad.age_range.max,
                });
            }
            if ad.duration_seconds == 0 {
                return Err(CatalogError::ZeroDuration(ad.id.clone()));
            }
        }
        Ok(Self { ads })
    }

    pub fn ads(&self) -> &[AdRecord] {
        &self.ads
    }

    pub fn len(&self) -> usize {
        self.ads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AdRecord> {
        self.ads.iter().find(|ad| ad.id == id)
    }
}

/// The four-entry demo catalog shipped with the console.
impl Default for Catalog {
    fn default() -> Self {
        let ad = |id: &str,
                  title: &str,
                  description: &str,
                  range: (u32, u32),
                  gender: TargetGender,
                  category: &str,
                  duration: u32| AdRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            age_range: AgeRange::new(range.0, range.1),
            target_gender: gender,
            category: category.to_string(),
            media_ref: "/api/placeholder/400/300".to_string(),
            duration_seconds: duration,
        };

        Self {
            ads: vec![
                ad(
                    "1",
                    "Premium Skincare Collection",
                    "Discover our anti-aging skincare line for radiant, youthful skin",
                    (25, 45),
                    TargetGender::Female,
                    "Beauty",
                    15,
                ),
                ad(
                    "2",
                    "Gaming Laptop Pro",
                    "Ultimate performance for gaming and content creation",
                    (18, 35),
                    TargetGender::Male,
                    "Technology",
                    10,
                ),
                ad(
                    "3",
                    "Retirement Planning Guide",
                    "Secure your financial future with our expert retirement solutions",
                    (50, 70),
                    TargetGender::Both,
                    "Finance",
                    20,
                ),
                ad(
                    "4",
                    "Fitness Tracker Pro",
                    "Monitor your health and achieve your fitness goals",
                    (20, 40),
                    TargetGender::Both,
                    "Health",
                    12,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::ad_record::fixtures::ad;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = Catalog::default();
        assert_eq!(Catalog::new(catalog.ads().to_vec()), Ok(catalog.clone()));
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_default_catalog_durations() {
        let catalog = Catalog::default();
        let durations: Vec<u32> = catalog.ads().iter().map(|a| a.duration_seconds).collect();
        assert_eq!(durations, vec![15, 10, 20, 12]);
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(Catalog::new(vec![]), Err(CatalogError::Empty));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = Catalog::new(vec![
            ad("a", 0, 10, TargetGender::Both, 5),
            ad("a", 20, 30, TargetGender::Male, 5),
        ]);
        assert_eq!(result, Err(CatalogError::DuplicateId("a".into())));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = Catalog::new(vec![ad("a", 40, 30, TargetGender::Both, 5)]);
        assert_eq!(
            result,
            Err(CatalogError::InvertedAgeRange {
                id: "a".into(),
                min: 40,
                max: 30
            })
        );
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = Catalog::new(vec![ad("a", 0, 10, TargetGender::Both, 0)]);
        assert_eq!(result, Err(CatalogError::ZeroDuration("a".into())));
    }

    #[test]
    fn test_get_by_id() {
        let catalog = Catalog::default();
        assert_eq!(catalog.get("3").unwrap().title, "Retirement Planning Guide");
        assert!(catalog.get("missing").is_none());
    }
}
