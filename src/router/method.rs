use http::Method;
use regex::Regex;

/// Which request methods a rule accepts.
#[derive(Debug, Clone, Default)]
pub enum MethodFilter {
    /// No filter; every method is accepted
    #[default]
    Any,
    /// Whole-token match, ignoring ASCII case
    Token(String),
    /// A caller-compiled regex, tested as given
    Pattern(Regex),
}

impl MethodFilter {
    /// Compile a method token. The literal `"all"` means no filter.
    #[must_use]
    pub fn compile(token: &str) -> Self {
        if token == "all" {
            MethodFilter::Any
        } else {
            MethodFilter::Token(token.to_string())
        }
    }

    #[inline]
    #[must_use]
    pub fn accepts(&self, method: &str) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Token(token) => token.eq_ignore_ascii_case(method),
            MethodFilter::Pattern(re) => re.is_match(method),
        }
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        matches!(self, MethodFilter::Any)
    }
}

impl std::fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodFilter::Any => f.write_str("ALL"),
            MethodFilter::Token(token) => f.write_str(&token.to_ascii_uppercase()),
            MethodFilter::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<&str> for MethodFilter {
    fn from(value: &str) -> Self {
        MethodFilter::compile(value)
    }
}

impl From<String> for MethodFilter {
    fn from(value: String) -> Self {
        MethodFilter::compile(&value)
    }
}

impl From<Method> for MethodFilter {
    fn from(value: Method) -> Self {
        MethodFilter::compile(value.as_str())
    }
}

impl From<Regex> for MethodFilter {
    fn from(value: Regex) -> Self {
        MethodFilter::Pattern(value)
    }
}

impl<T: Into<MethodFilter>> From<Option<T>> for MethodFilter {
    fn from(value: Option<T>) -> Self {
        value.map_or(MethodFilter::Any, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_any() {
        let filter = MethodFilter::from("all");
        assert!(filter.is_any());
        assert!(filter.accepts("GET"));
        assert!(filter.accepts("PROPFIND"));
    }

    #[test]
    fn test_absent_is_any() {
        assert!(MethodFilter::from(None::<&str>).is_any());
    }

    #[test]
    fn test_token_is_case_insensitive_whole_match() {
        let filter = MethodFilter::from("post");
        assert!(filter.accepts("POST"));
        assert!(filter.accepts("Post"));
        assert!(!filter.accepts("GET"));
        assert!(!filter.accepts("POSTX"));
        assert!(!filter.accepts("XPOST"));
    }

    #[test]
    fn test_http_method() {
        let filter = MethodFilter::from(Method::DELETE);
        assert!(filter.accepts("delete"));
        assert!(!filter.accepts("get"));
    }

    #[test]
    fn test_precompiled_pattern() {
        let filter = MethodFilter::from(Regex::new("^(GET|HEAD)$").unwrap());
        assert!(filter.accepts("GET"));
        assert!(filter.accepts("HEAD"));
        assert!(!filter.accepts("get"));
        assert_eq!(filter.to_string(), "/^(GET|HEAD)$/");
    }
}
