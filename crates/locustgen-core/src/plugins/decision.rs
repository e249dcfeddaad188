//! Verdicts that carry their explanation
//!
//! A [`Decision`] is a boolean plus the reason for it, so that a rejection
//! can be logged with a useful message without threading strings around.

use std::fmt::{self, Display, Formatter};

/// Number of failed cases quoted verbatim by [`Decision::any`]
const MAX_QUOTED_FAILURES: usize = 5;

/// A yes/no verdict with its reason
///
/// Two decisions are equal when they agree on validity, whatever their
/// reasons.
#[derive(Debug, Clone, Eq)]
pub struct Decision {
    valid: bool,
    reason: String,
}

impl Decision {
    /// Positive verdict with the reason "ok"
    #[inline]
    #[must_use]
    pub fn yes() -> Self {
        Self::yes_because("ok")
    }

    #[inline]
    #[must_use]
    pub fn yes_because(reason: impl Into<String>) -> Self {
        Self {
            valid: true,
            reason: reason.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn no(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }

    /// Verdict following `condition`, with the same reason either way
    #[inline]
    #[must_use]
    pub fn whether(condition: bool, reason: impl Into<String>) -> Self {
        Self {
            valid: condition,
            reason: reason.into(),
        }
    }

    /// Keep a positive verdict as is; prefix the reason of a negative one
    #[must_use]
    pub fn context(self, reason: &str) -> Self {
        if self.valid {
            self
        } else {
            Self::no(format!("{reason}: {}", self.reason))
        }
    }

    /// First negative verdict, or [`Decision::yes`]
    #[must_use]
    pub fn all(decisions: impl IntoIterator<Item = Decision>) -> Self {
        decisions
            .into_iter()
            .find(|d| !d.valid)
            .unwrap_or_else(Self::yes)
    }

    /// First positive verdict (its reason prefixed by `reason` if given), or a
    /// negative verdict summarizing the failed cases
    #[must_use]
    pub fn any(decisions: impl IntoIterator<Item = Decision>, reason: Option<&str>) -> Self {
        let mut failures = Vec::new();
        let mut failed = 0usize;
        for decision in decisions {
            if decision.valid {
                return match reason {
                    Some(reason) => Self::yes_because(format!("{reason}: {}", decision.reason)),
                    None => decision,
                };
            }
            if failed < MAX_QUOTED_FAILURES {
                failures.push(decision.reason);
            }
            failed += 1;
        }
        let cases = if failed <= MAX_QUOTED_FAILURES {
            format!("{failures:?}")
        } else {
            format!("{failed} invalid cases")
        };
        match reason {
            Some(reason) => Self::no(format!("{reason}: no valid case: {cases}")),
            None => Self::no(format!("no valid case: {cases}")),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl PartialEq for Decision {
    fn eq(&self, other: &Self) -> bool {
        self.valid == other.valid
    }
}

impl From<Decision> for bool {
    fn from(d: Decision) -> Self {
        d.valid
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let verdict = if self.valid { "yes" } else { "no" };
        write!(f, "{verdict} ({})", self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_reason() {
        assert_eq!(Decision::yes(), Decision::yes_because("other"));
        assert_ne!(Decision::yes(), Decision::no("ok"));
    }

    #[test]
    fn whether_follows_condition() {
        assert!(Decision::whether(true, "r").is_valid());
        assert!(!Decision::whether(false, "r").is_valid());
    }

    #[test]
    fn context_prefixes_only_failures() {
        assert_eq!(Decision::yes().context("outer").reason(), "ok");
        assert_eq!(Decision::no("inner").context("outer").reason(), "outer: inner");
    }

    #[test]
    fn all_returns_first_failure() {
        let d = Decision::all([Decision::yes(), Decision::no("a"), Decision::no("b")]);
        assert_eq!(d.reason(), "a");
        assert!(Decision::all([]).is_valid());
    }

    #[test]
    fn any_returns_first_success() {
        let d = Decision::any([Decision::no("a"), Decision::yes_because("b")], Some("r"));
        assert!(d.is_valid());
        assert_eq!(d.reason(), "r: b");
    }

    #[test]
    fn any_quotes_few_failures() {
        let d = Decision::any([Decision::no("a"), Decision::no("b")], None);
        assert!(!d.is_valid());
        assert_eq!(d.reason(), r#"no valid case: ["a", "b"]"#);
    }

    #[test]
    fn any_counts_many_failures() {
        let d = Decision::any((0..7).map(|i| Decision::no(i.to_string())), Some("r"));
        assert_eq!(d.reason(), "r: no valid case: 7 invalid cases");
    }
}
