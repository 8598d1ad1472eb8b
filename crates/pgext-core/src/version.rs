//! Semantic version extraction from distribution package versions.
//!
//! Rules run in order; each one keeps the text before its first match, so
//! every stage can only shorten the string.

use std::sync::LazyLock;

use regex::Regex;

pub struct VersionRule {
    pub name: &'static str,
    pattern: Regex,
}

impl VersionRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("unable to compile version rule"),
        }
    }

    /// Returns the prefix of `version` before the first match, or the whole
    /// string when the rule does not match.
    pub fn apply<'a>(&self, version: &'a str) -> &'a str {
        match self.pattern.find(version) {
            Some(m) => &version[..m.start()],
            None => version,
        }
    }
}

pub static VERSION_RULES: LazyLock<[VersionRule; 3]> = LazyLock::new(|| {
    [
        // release tags starting with an uppercase letter: `-1PGDG`, `_2PIGSTY`
        VersionRule::new("release-tag", r"[-_]\d*[A-Z]"),
        // dotted distribution suffixes: `-1.el8`, `-1.pgdg24.04`
        VersionRule::new("dist-suffix", r"[-_]\d*\w*\."),
        VersionRule::new("separator", r"[-+]"),
    ]
});

pub fn extract_semantic_version(version: &str) -> String {
    VERSION_RULES
        .iter()
        .fold(version, |acc, rule| rule.apply(acc))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_semantic_version() {
        assert_eq!(extract_semantic_version("1.2.3-1.el8"), "1.2.3");
        assert_eq!(extract_semantic_version("2.0.0+dfsg-1"), "2.0.0");
        assert_eq!(extract_semantic_version("0.18.1"), "0.18.1");
        assert_eq!(extract_semantic_version("0.8.0-1.pgdg24.04+1"), "0.8.0");
        assert_eq!(extract_semantic_version("3.5.0-1PGDG.rhel9"), "3.5.0");
        assert_eq!(extract_semantic_version(""), "");
    }

    #[test]
    fn test_rules_individually() {
        let [tag, dist, sep] = &*VERSION_RULES;
        assert_eq!(tag.apply("1.7.0-1PIGSTY"), "1.7.0");
        assert_eq!(tag.apply("1.7.0-1.el9"), "1.7.0-1.el9");
        assert_eq!(dist.apply("1.7.0-1.el9"), "1.7.0");
        assert_eq!(dist.apply("2.0.0+dfsg-1"), "2.0.0+dfsg-1");
        assert_eq!(sep.apply("2.0.0+dfsg-1"), "2.0.0");
    }

    #[test]
    fn test_uppercase_suffix_is_truncated() {
        // versions with an uppercase pre-release tag lose it
        assert_eq!(extract_semantic_version("1.2.3_RC1"), "1.2.3");
    }
}
