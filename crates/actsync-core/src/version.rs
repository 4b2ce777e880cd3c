//! Version selection
//!
//! Turns the tag list of an action repository plus an optional requested
//! ref into a version intent. This is pure: no provider calls, no clock.
//!
//! With no requested ref the "latest" rules apply:
//!
//! - floating major tags (`v4`) win over full versions, highest major first;
//! - otherwise the highest stable `vX.Y.Z` by semver ordering;
//! - pre-release, build-suffixed, and other tags are never selected.
//!
//! ```
//! use actsync_core::version::{select, VersionIntent};
//!
//! let intent = select(&["v4", "v4.1.2", "v3", "v3.6.0"], None).unwrap();
//! assert_eq!(intent, VersionIntent::Latest("v4".to_string()));
//!
//! let intent = select(&["v4.1.2", "v4.1.1", "v3.6.0"], None).unwrap();
//! assert_eq!(intent, VersionIntent::Latest("v4.1.2".to_string()));
//! ```

use serde::Serialize;

/// What the selector decided to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionIntent {
    /// Use the requested ref verbatim; the provider resolves it to a sha.
    Explicit(String),
    /// "Latest" semantics picked this tag.
    Latest(String),
}

impl VersionIntent {
    /// The ref to hand to the provider.
    pub fn reference(&self) -> &str {
        match self {
            Self::Explicit(r) | Self::Latest(r) => r,
        }
    }

    /// True when re-resolving later may yield a different commit.
    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Latest(_))
    }
}

/// Result of resolving an intent against a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    /// Full 40-hex commit sha.
    pub sha: String,
    /// Tag label if one was matched, else empty.
    pub tag: String,
    pub is_floating: bool,
}

/// Why "latest" could not be chosen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("no usable version tag")]
    NoUsableTag,

    #[error("ambiguous major version tags {tags:?} all map to v{major}")]
    AmbiguousMajor { major: u64, tags: Vec<String> },
}

/// Select a version intent from `tags` and an optional requested ref.
pub fn select<S: AsRef<str>>(
    tags: &[S],
    requested: Option<&str>,
) -> Result<VersionIntent, SelectError> {
    if let Some(requested) = requested {
        return Ok(VersionIntent::Explicit(requested.to_string()));
    }

    let mut majors: Vec<(u64, &str)> = Vec::new();
    let mut full: Vec<(semver::Version, &str)> = Vec::new();

    for tag in tags {
        let tag = tag.as_ref();
        if let Some(major) = parse_major_only(tag) {
            majors.push((major, tag));
        } else if let Some(version) = parse_full(tag) {
            full.push((version, tag));
        }
    }

    if let Some(highest) = majors.iter().map(|(major, _)| *major).max() {
        let mut winners: Vec<String> = majors
            .iter()
            .filter(|(major, _)| *major == highest)
            .map(|(_, tag)| tag.to_string())
            .collect();
        if winners.len() > 1 {
            winners.sort();
            winners.dedup();
        }
        return match winners.len() {
            1 => Ok(VersionIntent::Latest(winners.remove(0))),
            _ => Err(SelectError::AmbiguousMajor {
                major: highest,
                tags: winners,
            }),
        };
    }

    full.into_iter()
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, tag)| VersionIntent::Latest(tag.to_string()))
        .ok_or(SelectError::NoUsableTag)
}

/// `v<integer>`, nothing else.
fn parse_major_only(tag: &str) -> Option<u64> {
    let digits = tag.strip_prefix('v')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// `v<int>.<int>.<int>` with no pre-release or build suffix.
fn parse_full(tag: &str) -> Option<semver::Version> {
    let version = semver::Version::parse(tag.strip_prefix('v')?).ok()?;
    (version.pre.is_empty() && version.build.is_empty()).then_some(version)
}

/// Whether `value` is a full lower-case 40-hex commit sha.
pub fn is_full_sha(value: &str) -> bool {
    value.len() == 40 && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn latest(tag: &str) -> Result<VersionIntent, SelectError> {
        Ok(VersionIntent::Latest(tag.to_string()))
    }

    #[rstest]
    #[case(&["v4", "v4.1.2", "v3", "v3.6.0"], "v4")]
    #[case(&["v4.1.2", "v4.1.1", "v3.6.0"], "v4.1.2")]
    #[case(&["v1.10.0", "v1.9.9", "v1.2.30"], "v1.10.0")]
    #[case(&["v2", "v10", "v9"], "v10")]
    #[case(&["v3.0.0", "v4.0.0-beta.1", "v3.1.0+build.7"], "v3.0.0")]
    #[case(&["latest", "main", "v1", "release-2"], "v1")]
    fn selects_latest(#[case] tags: &[&str], #[case] expected: &str) {
        assert_eq!(select(tags, None), latest(expected));
    }

    #[rstest]
    #[case(&[])]
    #[case(&["main", "V4", "v4.1", "v4.1.2-rc.1", "4.0.0", "v", "v-1"])]
    fn no_usable_tag(#[case] tags: &[&str]) {
        assert_eq!(select(tags, None), Err(SelectError::NoUsableTag));
    }

    #[test]
    fn explicit_ref_bypasses_tag_matching() {
        let intent = select::<&str>(&[], Some("main")).unwrap();
        assert_eq!(intent, VersionIntent::Explicit("main".to_string()));
        assert!(!intent.is_floating());
        assert_eq!(intent.reference(), "main");
    }

    #[test]
    fn ambiguous_winning_major_is_an_error() {
        let result = select(&["v4", "v04", "v3"], None);
        assert_eq!(
            result,
            Err(SelectError::AmbiguousMajor {
                major: 4,
                tags: vec!["v04".to_string(), "v4".to_string()],
            })
        );
    }

    #[test]
    fn ambiguity_below_the_winner_is_ignored() {
        assert_eq!(select(&["v5", "v4", "v04"], None), latest("v5"));
    }

    #[rstest]
    #[case("0123456789abcdef0123456789abcdef01234567", true)]
    #[case("0123456789ABCDEF0123456789abcdef01234567", false)]
    #[case("0123456", false)]
    #[case("v4", false)]
    fn full_sha_detection(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_full_sha(value), expected);
    }

    fn tag_set() -> impl Strategy<Value = Vec<String>> {
        let major = (0u64..20).prop_map(|m| format!("v{m}"));
        let full = (0u64..20, 0u64..20, 0u64..20).prop_map(|(a, b, c)| format!("v{a}.{b}.{c}"));
        let noise = prop_oneof![Just("main".to_string()), Just("v1.0.0-rc.1".to_string())];
        prop::collection::btree_set(prop_oneof![major, full, noise], 0..24)
            .prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        #[test]
        fn selection_is_order_independent(tags in tag_set()) {
            let mut reversed = tags.clone();
            reversed.reverse();
            prop_assert_eq!(select(&tags, None), select(&reversed, None));
        }

        #[test]
        fn major_only_tags_always_win(tags in tag_set()) {
            let highest = tags.iter().filter_map(|t| parse_major_only(t)).max();
            if let Some(highest) = highest {
                prop_assert_eq!(select(&tags, None), latest(&format!("v{highest}")));
            }
        }

        #[test]
        fn full_tags_pick_semver_maximum(tags in tag_set()) {
            let full_only: Vec<String> = tags.into_iter().filter(|t| parse_full(t).is_some()).collect();
            let expected = full_only.iter().max_by_key(|t| parse_full(t));
            match expected {
                Some(tag) => prop_assert_eq!(select(&full_only, None), latest(tag)),
                None => prop_assert_eq!(select(&full_only, None), Err(SelectError::NoUsableTag)),
            }
        }
    }
}
