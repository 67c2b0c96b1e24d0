use regex::{Captures, Regex, RegexBuilder};
use std::sync::Arc;
use tracing::warn;

use super::template::Template;
use crate::error::PatternError;

/// What a caller registers a rule with: a declaration string or a regex it
/// compiled itself.
#[derive(Debug, Clone)]
pub enum RouteSource {
    Declaration(String),
    Regex(Regex),
}

impl From<&str> for RouteSource {
    fn from(value: &str) -> Self {
        RouteSource::Declaration(value.to_string())
    }
}

impl From<String> for RouteSource {
    fn from(value: String) -> Self {
        RouteSource::Declaration(value)
    }
}

impl From<&String> for RouteSource {
    fn from(value: &String) -> Self {
        RouteSource::Declaration(value.clone())
    }
}

impl From<Regex> for RouteSource {
    fn from(value: Regex) -> Self {
        RouteSource::Regex(value)
    }
}

/// Compiled path matcher with capture metadata.
///
/// Built once at registration and never modified. `param_names` is
/// positionally aligned with the capture groups of the regex; it is `None`
/// for matchers built from a caller-supplied regex, which are opaque.
#[derive(Debug, Clone)]
pub struct Matcher {
    /// `None` when the declaration did not render to a valid regex; such a
    /// matcher never matches
    regex: Option<Regex>,
    pattern: String,
    param_names: Option<Arc<[Option<Arc<str>>]>>,
    declaration: Option<String>,
}

impl Matcher {
    /// Compile a route declaration, failing if the rendered pattern is not a
    /// valid regex.
    ///
    /// # Example
    ///
    /// ```
    /// use routemux::pattern::Matcher;
    ///
    /// let m = Matcher::compile("/users/:id").unwrap();
    /// assert!(m.is_match("/USERS/42/"));
    /// assert!(!m.is_match("/users/42/posts"));
    /// ```
    pub fn compile(declaration: &str) -> Result<Self, PatternError> {
        let template = Template::parse(declaration);
        let pattern = template.render();
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| PatternError {
                declaration: declaration.to_string(),
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;

        let mut names = template.param_names();
        let groups = regex.captures_len() - 1;
        if names.len() != groups {
            warn!(
                declaration = %declaration,
                pattern = %pattern,
                names = names.len(),
                groups,
                "Parameter names out of step with capture groups"
            );
            names.resize(groups, None);
        }

        Ok(Matcher {
            regex: Some(regex),
            pattern,
            param_names: Some(names.into()),
            declaration: Some(declaration.to_string()),
        })
    }

    /// Compile a declaration, degrading to a never-matching matcher when the
    /// rendered pattern is rejected.
    #[must_use]
    pub fn compile_lenient(declaration: &str) -> Self {
        match Self::compile(declaration) {
            Ok(matcher) => matcher,
            Err(err) => {
                warn!(
                    declaration = %err.declaration,
                    pattern = %err.pattern,
                    error = %err.message,
                    "Route declaration failed to compile"
                );
                let template = Template::parse(declaration);
                Matcher {
                    regex: None,
                    pattern: err.pattern,
                    param_names: Some(template.param_names().into()),
                    declaration: Some(err.declaration),
                }
            }
        }
    }

    /// Wrap a caller-compiled regex unchanged.
    #[must_use]
    pub fn from_regex(regex: Regex) -> Self {
        Matcher {
            pattern: regex.as_str().to_string(),
            regex: Some(regex),
            param_names: None,
            declaration: None,
        }
    }

    #[must_use]
    pub fn from_source(source: RouteSource) -> Self {
        match source {
            RouteSource::Declaration(declaration) => Self::compile_lenient(&declaration),
            RouteSource::Regex(regex) => Self::from_regex(regex),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(path))
    }

    #[must_use]
    pub fn captures<'p>(&self, path: &'p str) -> Option<Captures<'p>> {
        self.regex.as_ref().and_then(|re| re.captures(path))
    }

    /// Parameter names by capture position (index 0 is the first group).
    #[must_use]
    pub fn param_names(&self) -> Option<&[Option<Arc<str>>]> {
        self.param_names.as_deref()
    }

    /// The regex source this matcher runs.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The declaration the matcher was compiled from, if any.
    #[must_use]
    pub fn declaration(&self) -> Option<&str> {
        self.declaration.as_deref()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(m: &Matcher) -> Vec<Option<&str>> {
        m.param_names()
            .unwrap_or_default()
            .iter()
            .map(|n| n.as_deref())
            .collect()
    }

    #[test]
    fn test_literal_declaration() {
        let m = Matcher::compile("/zoo/animals").unwrap();
        assert!(m.is_match("/zoo/animals"));
        assert!(m.is_match("/zoo/animals/"));
        assert!(m.is_match("/Zoo/ANIMALS"));
        assert!(!m.is_match("/zoo/animal"));
        assert!(!m.is_match("/zoo/animals/1"));
        assert!(!m.is_match("/zoo"));
        assert_eq!(m.declaration(), Some("/zoo/animals"));
    }

    #[test]
    fn test_dot_is_literal() {
        let m = Matcher::compile("/robots.txt").unwrap();
        assert!(m.is_match("/robots.txt"));
        assert!(!m.is_match("/robotsxtxt"));
    }

    #[test]
    fn test_param_never_spans_separator() {
        let m = Matcher::compile("/users/:id").unwrap();
        let caps = m.captures("/users/42").unwrap();
        assert_eq!(caps.get(1).map(|c| c.as_str()), Some("42"));
        assert!(!m.is_match("/users/42/extra"));
        assert!(!m.is_match("/users/"));
        assert_eq!(named(&m), vec![Some("id")]);
    }

    #[test]
    fn test_optional_param_absent() {
        let m = Matcher::compile("/files/:name?").unwrap();
        let caps = m.captures("/files").unwrap();
        assert!(caps.get(1).is_none());
        let caps = m.captures("/files/report").unwrap();
        assert_eq!(caps.get(1).map(|c| c.as_str()), Some("report"));
    }

    #[test]
    fn test_inline_pattern_restricts_segment() {
        let m = Matcher::compile(r"/items/:id(\d+)").unwrap();
        assert!(m.is_match("/items/123"));
        assert!(!m.is_match("/items/abc"));
    }

    #[test]
    fn test_wildcard_spans_separators() {
        let m = Matcher::compile("/search/*").unwrap();
        let caps = m.captures("/search/red/car").unwrap();
        assert_eq!(caps.get(1).map(|c| c.as_str()), Some("red/car"));
        assert!(!m.is_match("/search/"));
        assert_eq!(named(&m), vec![None]);
    }

    #[test]
    fn test_names_align_with_groups() {
        for decl in [
            "/a/*/b/:id/*",
            "/v/:ver((a|b)c)/:rest?",
            "/archive/(:year)?/:slug",
            "/x(y)/:id",
        ] {
            let m = Matcher::compile(decl).unwrap();
            let re = Regex::new(m.pattern()).unwrap();
            assert_eq!(
                m.param_names().unwrap().len(),
                re.captures_len() - 1,
                "misaligned names for {decl}"
            );
        }
    }

    #[test]
    fn test_invalid_declaration_degrades() {
        assert!(Matcher::compile("/broken)").is_err());
        let m = Matcher::compile_lenient("/broken)");
        assert!(!m.is_valid());
        assert!(!m.is_match("/broken)"));
        assert!(!m.is_match("/broken"));
        assert_eq!(m.declaration(), Some("/broken)"));
    }

    #[test]
    fn test_regex_source_is_opaque() {
        let m = Matcher::from_source(RouteSource::from(Regex::new(r"^/raw/(\d+)$").unwrap()));
        assert!(m.is_match("/raw/7"));
        assert!(m.param_names().is_none());
        assert!(m.declaration().is_none());
        assert_eq!(m.pattern(), r"^/raw/(\d+)$");
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let a = Matcher::compile("/u/:id/:tab?").unwrap();
        let b = Matcher::compile("/u/:id/:tab?").unwrap();
        assert_eq!(a.pattern(), b.pattern());
        assert_eq!(named(&a), named(&b));
    }
}
