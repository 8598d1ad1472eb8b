/// Parses an array literal into its trimmed, non-empty elements.
///
/// Accepts the PostgreSQL text form `{a,b,c}` as well as a bracketed
/// `[a, b, c]` list. Elements may be wrapped in single or double quotes.
/// Anything that is not a delimited literal parses as an empty list.
///
/// # Examples
///
/// ```
/// use pgext_utils::string::parse_array;
///
/// assert_eq!(parse_array("{postgis,plpgsql}"), vec!["postgis", "plpgsql"]);
/// assert_eq!(parse_array("[\"14\", \"15\"]"), vec!["14", "15"]);
/// assert!(parse_array("postgis").is_empty());
/// ```
pub fn parse_array(value: &str) -> Vec<String> {
    let value = value.trim();
    let inner = match (value.chars().next(), value.chars().last()) {
        (Some('{'), Some('}')) | (Some('['), Some(']')) if value.len() >= 2 => {
            &value[1..value.len() - 1]
        }
        _ => return Vec::new(),
    };

    inner
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\''))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Splits a whitespace separated list, skipping empty tokens.
pub fn split_words(value: &str) -> Vec<String> {
    value.split_whitespace().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_braces() {
        assert_eq!(parse_array("{a,b, c}"), vec!["a", "b", "c"]);
        assert_eq!(parse_array("{17,16,15}"), vec!["17", "16", "15"]);
        assert!(parse_array("{}").is_empty());
        assert!(parse_array("{ , }").is_empty());
    }

    #[test]
    fn test_parse_array_brackets_and_quotes() {
        assert_eq!(parse_array("['x', \"y\"]"), vec!["x", "y"]);
    }

    #[test]
    fn test_parse_array_invalid() {
        assert!(parse_array("").is_empty());
        assert!(parse_array("{unclosed").is_empty());
        assert!(parse_array("plain").is_empty());
        assert!(parse_array("{").is_empty());
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words("  pg_cron_$v*  postgresql-$v-cron "),
            vec!["pg_cron_$v*", "postgresql-$v-cron"]
        );
    }
}
