use super::ad_record::AdRecord;
use crate::shared::demographics::Target;

/// Returns every catalog entry eligible for `target`, in catalog order.
///
/// An entry matches when `target.age` lies inside its inclusive age range
/// and its target gender is `both` or equals `target.gender`. An empty
/// result is a normal outcome; callers decide how to fall back.
pub fn select_eligible(target: &Target, catalog: &[AdRecord]) -> Vec<AdRecord> {
    catalog
        .iter()
        .filter(|ad| ad.is_eligible_for(target))
        .cloned()
        .collect()
}
