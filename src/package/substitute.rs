// src/package/substitute.rs

//! `$VARIABLE` expansion for download URLs and git branch expressions
//!
//! Two variables are recognised: `BPM_PKG_NAME` and `BPM_PKG_VERSION`.
//! Both `$NAME` and `${NAME}` forms are accepted; any other variable
//! expands to an empty string. `$$` yields a literal `$`.

use super::PackageInfo;
use crate::error::{Error, Result};

const VAR_NAME: &str = "BPM_PKG_NAME";
const VAR_VERSION: &str = "BPM_PKG_VERSION";

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn lookup<'a>(name: &str, info: &'a PackageInfo) -> &'a str {
    match name {
        VAR_NAME => &info.name,
        VAR_VERSION => &info.version,
        _ => "",
    }
}

/// Expand package variables in `input`
pub fn substitute_package_vars(input: &str, info: &PackageInfo) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        match chars.peek().map(|&(_, next)| next) {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == '}' {
                        closed = true;
                        break;
                    }
                    name.push(ch);
                }
                let valid = name.chars().next().is_some_and(is_name_start)
                    && name.chars().all(is_name_char);
                if !closed || !valid {
                    return Err(Error::Substitution(input.to_string()));
                }
                out.push_str(lookup(&name, info));
            }
            Some(next) if is_name_start(next) => {
                let mut name = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if !is_name_char(ch) {
                        break;
                    }
                    name.push(ch);
                    chars.next();
                }
                out.push_str(lookup(&name, info));
            }
            _ => out.push('$'),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> PackageInfo {
        PackageInfo {
            name: "hello".to_string(),
            version: "2.12".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_both_forms() {
        let url = "https://ftp.gnu.org/gnu/$BPM_PKG_NAME/${BPM_PKG_NAME}-$BPM_PKG_VERSION.tar.gz";
        assert_eq!(
            substitute_package_vars(url, &info()).unwrap(),
            "https://ftp.gnu.org/gnu/hello/hello-2.12.tar.gz"
        );
    }

    #[test]
    fn test_unknown_variable_is_empty() {
        assert_eq!(substitute_package_vars("a$OTHER/b", &info()).unwrap(), "a/b");
    }

    #[test]
    fn test_literal_dollar() {
        assert_eq!(substitute_package_vars("cost $5 $$", &info()).unwrap(), "cost $5 $");
    }

    #[test]
    fn test_malformed_reference() {
        assert!(matches!(
            substitute_package_vars("v${BPM_PKG_VERSION", &info()),
            Err(Error::Substitution(_))
        ));
        assert!(matches!(
            substitute_package_vars("v${}", &info()),
            Err(Error::Substitution(_))
        ));
    }
}
