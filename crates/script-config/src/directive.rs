//! Script-level directives
//!
//! Directives are `name=value` pairs an analyzer extracts from a script:
//!
//! | directive | effect |
//! |---|---|
//! | `flag=<flag>` | enable a compiler flag |
//! | `noflag=<flag>` | disable a compiler flag |
//! | `option=<name>:<value>` | set a compiler option |
//! | `import=<name>` | add an import, e.g. `org.example.*` |
//! | `repository=<url>` | add a dependency repository |

use crate::error::{Error, Result};

/// A parsed directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    EnableFlag(String),
    DisableFlag(String),
    Option { name: String, value: String },
    Import(String),
    Repository(String),
}

impl Directive {
    /// Parse directive text
    pub fn parse(raw: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedDirective {
            directive: raw.to_string(),
            reason: reason.to_string(),
        };

        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| malformed("expected 'name=value'"))?;
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() {
            return Err(malformed("missing directive name"));
        }
        if value.is_empty() {
            return Err(malformed("missing directive value"));
        }

        match name {
            "flag" => Ok(Self::EnableFlag(value.to_string())),
            "noflag" => Ok(Self::DisableFlag(value.to_string())),
            "option" => {
                let (option, option_value) = value
                    .split_once(':')
                    .ok_or_else(|| malformed("expected 'option=name:value'"))?;
                let (option, option_value) = (option.trim(), option_value.trim());
                if option.is_empty() || option_value.is_empty() {
                    return Err(malformed("option name and value must not be empty"));
                }
                Ok(Self::Option {
                    name: option.to_string(),
                    value: option_value.to_string(),
                })
            }
            "import" => {
                if !is_valid_import(value) {
                    return Err(malformed("not a qualified name"));
                }
                Ok(Self::Import(value.to_string()))
            }
            "repository" => Ok(Self::Repository(value.to_string())),
            other => Err(malformed(&format!("unknown directive '{}'", other))),
        }
    }
}

/// Whether `import` is a dotted name, optionally ending in `.*`
pub fn is_valid_import(import: &str) -> bool {
    let path = import.strip_suffix(".*").unwrap_or(import);
    !path.is_empty() && path.split('.').all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("flag=progressive", Directive::EnableFlag("progressive".into()))]
    #[case(" noflag = progressive ", Directive::DisableFlag("progressive".into()))]
    #[case(
        "option=jvmTarget:17",
        Directive::Option { name: "jvmTarget".into(), value: "17".into() }
    )]
    #[case("import=org.example.*", Directive::Import("org.example.*".into()))]
    #[case(
        "repository=https://repo.example.org/maven",
        Directive::Repository("https://repo.example.org/maven".into())
    )]
    fn parse_valid(#[case] raw: &str, #[case] expected: Directive) {
        assert_eq!(Directive::parse(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("progressive")]
    #[case("=x")]
    #[case("flag=")]
    #[case("option=jvmTarget")]
    #[case("option=:17")]
    #[case("import=org..example")]
    #[case("import=1org.example")]
    #[case("turbo=on")]
    fn test_parse_invalid(#[case] raw: &str) {
        let err = Directive::parse(raw).unwrap_err();
        assert!(matches!(err, Error::MalformedDirective { .. }), "got: {}", err);
    }

    #[rstest]
    #[case("kotlin.*", true)]
    #[case("org.example.Util", true)]
    #[case("single", true)]
    #[case("*", false)]
    #[case("a.*.b", false)]
    #[case("", false)]
    fn test_import_validation(#[case] import: &str, #[case] valid: bool) {
        assert_eq!(is_valid_import(import), valid);
    }
}
