pub mod ad_record;
pub mod catalog;
pub mod eligibility_filter;
