//! Maps a member's email address to their institution.
//!
//! Resolution walks a fixed rule table in order and the first matching rule
//! wins, so table order is part of the contract. Unrecognized domains
//! resolve to `None`; callers treat that as a validation failure on signup
//! and profile update, not as a fault.

enum Rule {
    Suffix(&'static str),
    /// Matches addresses that start with the prefix and end with the suffix.
    PrefixSuffix(&'static str, &'static str),
}

const RULES: &[(Rule, &str)] = &[
    (Rule::Suffix("@students.au.edu.pk"), "Air University"),
    (Rule::Suffix("@students.nust.edu.pk"), "NUST"),
    (Rule::Suffix("@students.lums.edu.pk"), "LUMS"),
    (
        Rule::Suffix("@student.uet.edu.pk"),
        "University of Engineering and Technology",
    ),
    (
        Rule::Suffix("@student.pu.edu.pk"),
        "University of the Punjab",
    ),
    (
        Rule::Suffix("@student.iba.edu.pk"),
        "Institute of Business Administration",
    ),
    (
        Rule::Suffix("@student.gcu.edu.pk"),
        "Government College University",
    ),
    (Rule::Suffix("@student.uok.edu.pk"), "University of Karachi"),
    (Rule::Suffix("@student.qau.edu.pk"), "Quaid-i-Azam University"),
    (
        Rule::Suffix("@student.uetpeshawar.edu.pk"),
        "University of Engineering and Technology Peshawar",
    ),
    (Rule::Suffix("@student.uos.edu.pk"), "University of Sargodha"),
    (
        Rule::PrefixSuffix("campusbuzz07", "@gmail.com"),
        "Team CampusBuzz",
    ),
];

/// Resolves an email address to an institution name, or `None` when no rule
/// matches. Pure and total over the rule table.
pub fn resolve(email: &str) -> Option<&'static str> {
    for (rule, institution) in RULES {
        let matched = match rule {
            Rule::Suffix(suffix) => email.ends_with(suffix),
            Rule::PrefixSuffix(prefix, suffix) => {
                email.starts_with(prefix) && email.ends_with(suffix)
            }
        };
        if matched {
            return Some(institution);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_domains_resolve_deterministically() {
        assert_eq!(
            resolve("ali@students.nust.edu.pk"),
            Some("NUST")
        );
        assert_eq!(
            resolve("sara@student.pu.edu.pk"),
            Some("University of the Punjab")
        );
        // Same input, same answer.
        assert_eq!(
            resolve("ali@students.nust.edu.pk"),
            resolve("ali@students.nust.edu.pk")
        );
    }

    #[test]
    fn team_address_needs_both_prefix_and_suffix() {
        assert_eq!(
            resolve("campusbuzz07.admin@gmail.com"),
            Some("Team CampusBuzz")
        );
        assert_eq!(resolve("campusbuzz07@outlook.com"), None);
        assert_eq!(resolve("someone@gmail.com"), None);
    }

    #[test]
    fn unknown_domains_resolve_to_none() {
        assert_eq!(resolve("person@example.com"), None);
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("no-at-sign"), None);
    }
}
