//! Static choices offered by the business profile select fields.

use crate::model::profile::ProfileField;

pub const BUSINESS_TYPES: &[&str] = &[
    "E-commerce",
    "SaaS/Software",
    "Consulting/Services",
    "Content Creation",
    "Freelancing",
    "Physical Products",
    "Real Estate",
    "Finance/Investment",
    "Healthcare",
    "Education",
    "Food & Beverage",
    "Retail",
    "Manufacturing",
    "Other",
];

pub const TIME_COMMITMENTS: &[&str] = &[
    "Part-time (10-20 hrs/week)",
    "Full-time (40+ hrs/week)",
    "Weekend warrior (5-10 hrs/week)",
    "Flexible/Variable",
    "Seeking to scale down current work",
    "This will be my main focus",
];

pub const CAPITAL_LEVELS: &[&str] = &[
    "Bootstrap ($0-1K)",
    "Self-funded ($1K-10K)",
    "Well-funded ($10K-50K)",
    "Heavily funded ($50K+)",
    "Seeking investment",
    "Already generating revenue",
];

pub const BUSINESS_STAGES: &[&str] = &[
    "Idea stage",
    "Research & validation",
    "Building MVP",
    "Early customers",
    "Growing revenue",
    "Scaling operations",
    "Established business",
];

pub const BUSINESS_MODELS: &[&str] = &[
    "B2B SaaS",
    "B2C Product",
    "Marketplace",
    "Subscription",
    "One-time purchase",
    "Service-based",
    "Advertising/Content",
    "Affiliate/Commission",
    "Licensing",
    "Other",
];

pub const REVENUE_GOALS: &[&str] = &[
    "$1K-5K/month",
    "$5K-10K/month",
    "$10K-25K/month",
    "$25K-50K/month",
    "$50K-100K/month",
    "$100K+/month",
    "Not revenue focused",
    "Exit/acquisition goal",
];

/// Returns the option list for a select field, `None` for free-form fields.
pub fn options_for(field: ProfileField) -> Option<&'static [&'static str]> {
    match field {
        ProfileField::BusinessType => Some(BUSINESS_TYPES),
        ProfileField::TimeCommitment => Some(TIME_COMMITMENTS),
        ProfileField::CapitalLevel => Some(CAPITAL_LEVELS),
        ProfileField::BusinessStage => Some(BUSINESS_STAGES),
        ProfileField::BusinessModel => Some(BUSINESS_MODELS),
        ProfileField::RevenueGoal => Some(REVENUE_GOALS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::options_for;
    use crate::model::profile::ProfileField;
    use std::collections::HashSet;

    #[test]
    fn free_form_fields_have_no_options() {
        assert!(options_for(ProfileField::TargetMarket).is_none());
        assert!(options_for(ProfileField::Name).is_none());
        assert!(options_for(ProfileField::StealthMode).is_none());
    }

    #[test]
    fn option_lists_have_no_duplicates() {
        for field in ProfileField::ALL {
            if let Some(options) = options_for(field) {
                let unique = options.iter().collect::<HashSet<_>>();
                assert_eq!(unique.len(), options.len(), "duplicates in {field}");
                assert!(options.iter().all(|option| !option.is_empty()));
            }
        }
    }
}
