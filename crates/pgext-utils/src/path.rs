use std::{
    env,
    iter::Peekable,
    path::PathBuf,
    str::Chars,
};

use crate::error::{PathError, PathResult};

/// Resolves a path string that may contain environment variables.
///
/// Expands `$VAR` and `${VAR}`, resolves a leading `~` to the user's home
/// directory, and converts relative paths to absolute paths based on the
/// current working directory.
///
/// # Errors
///
/// * [`PathError::Empty`] if the path is empty
/// * [`PathError::CurrentDir`] if the current directory cannot be determined
/// * [`PathError::MissingEnvVar`] if a referenced variable is undefined
/// * [`PathError::UnclosedVariable`] if a `${` is never closed
///
/// # Example
///
/// ```
/// use pgext_utils::path::resolve_path;
///
/// let resolved = resolve_path("/var/lib/pgext/pgext.db").unwrap();
/// assert!(resolved.is_absolute());
/// ```
pub fn resolve_path(path: &str) -> PathResult<PathBuf> {
    let path = path.trim();

    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let path_buf = PathBuf::from(expand_variables(path)?);

    if path_buf.is_absolute() {
        Ok(path_buf)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path_buf))
            .map_err(PathError::CurrentDir)
    }
}

/// Returns the user's home directory from `HOME`, or `/` when unset.
pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Returns `XDG_CONFIG_HOME`, defaulting to `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns `XDG_DATA_HOME`, defaulting to `$HOME/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

fn expand_variables(path: &str) -> PathResult<String> {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let var_name = consume_until(&mut chars, '}')?;
                    expand_env_var(&var_name, &mut result, path)?;
                } else {
                    let var_name = consume_var_name(&mut chars);
                    if var_name.is_empty() {
                        result.push('$');
                    } else {
                        expand_env_var(&var_name, &mut result, path)?;
                    }
                }
            }
            '~' if result.is_empty() => result.push_str(&home_dir().to_string_lossy()),
            _ => result.push(c),
        }
    }

    Ok(result)
}

fn consume_until(chars: &mut Peekable<Chars>, delimiter: char) -> PathResult<String> {
    let mut var_name = String::new();

    for c in chars.by_ref() {
        if c == delimiter {
            return Ok(var_name);
        }
        var_name.push(c);
    }

    Err(PathError::UnclosedVariable {
        input: format!("${{{var_name}"),
    })
}

fn consume_var_name(chars: &mut Peekable<Chars>) -> String {
    let mut var_name = String::new();

    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            var_name.push(c);
            chars.next();
        } else {
            break;
        }
    }

    var_name
}

fn expand_env_var(var_name: &str, result: &mut String, original: &str) -> PathResult<()> {
    match var_name {
        "HOME" => result.push_str(&home_dir().to_string_lossy()),
        "XDG_CONFIG_HOME" => result.push_str(&xdg_config_home().to_string_lossy()),
        "XDG_DATA_HOME" => result.push_str(&xdg_data_home().to_string_lossy()),
        _ => {
            let value = env::var(var_name).map_err(|_| {
                PathError::MissingEnvVar {
                    input: original.into(),
                    var: var_name.into(),
                }
            })?;
            result.push_str(&value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_expand_variables_simple() {
        env::set_var("PGEXT_TEST_VAR", "test_value");
        let result = expand_variables("$PGEXT_TEST_VAR/path").unwrap();
        assert_eq!(result, "test_value/path");
        let result = expand_variables("${PGEXT_TEST_VAR}_x").unwrap();
        assert_eq!(result, "test_value_x");
        env::remove_var("PGEXT_TEST_VAR");
    }

    #[test]
    #[serial]
    fn test_expand_variables_missing() {
        env::remove_var("PGEXT_MISSING_VAR");
        let result = expand_variables("$PGEXT_MISSING_VAR/db");
        assert!(matches!(result, Err(PathError::MissingEnvVar { .. })));
    }

    #[test]
    fn test_expand_variables_unclosed() {
        let result = expand_variables("${HOME");
        assert!(matches!(result, Err(PathError::UnclosedVariable { .. })));
    }

    #[test]
    fn test_lone_dollar_is_kept() {
        assert_eq!(expand_variables("/tmp/$/x").unwrap(), "/tmp/$/x");
    }

    #[test]
    #[serial]
    fn test_resolve_tilde_and_relative() {
        env::set_var("HOME", "/home/pgext");
        assert_eq!(
            resolve_path("~/data").unwrap(),
            PathBuf::from("/home/pgext/data")
        );

        let relative = resolve_path("data/extension.csv").unwrap();
        assert!(relative.is_absolute());
        assert!(relative.ends_with("data/extension.csv"));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve_path("  "), Err(PathError::Empty)));
    }

    #[test]
    #[serial]
    fn test_xdg_defaults() {
        env::set_var("HOME", "/home/pgext");
        env::remove_var("XDG_CONFIG_HOME");
        env::remove_var("XDG_DATA_HOME");
        assert_eq!(xdg_config_home(), PathBuf::from("/home/pgext/.config"));
        assert_eq!(xdg_data_home(), PathBuf::from("/home/pgext/.local/share"));
    }
}
