//! Route declaration tokenizer.
//!
//! A declaration such as `/users/:id(\d+)/files/:name?` is split into an
//! ordered list of [`Segment`]s. Rendering and capture bookkeeping both walk
//! this list, so the order of rewrites is fixed by the token order rather
//! than by a chain of text substitutions.
//!
//! ```text
//! "/files/:name?"  →  [Literal("/files"), Param{slash, name, optional}, TrailingSlash]
//!                  →  ^/files(?:/([^/]+?))?/?$
//! ```

use std::sync::Arc;

/// Capture used when a parameter has no inline pattern: one or more
/// non-separator characters, lazily.
pub const DEFAULT_PARAM_PATTERN: &str = "([^/]+?)";

/// Capture emitted for every `*` in a declaration.
pub const WILDCARD_PATTERN: &str = "(.+)";

/// A named parameter token: `[/][.]:name[(pattern)][?]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// The token was preceded by a path separator
    pub slash: bool,
    /// The token carried a `.` format marker before the colon
    pub format: bool,
    /// Inline pattern including its outer parentheses, used verbatim
    pub pattern: Option<String>,
    /// Trailing `?`: the whole segment may be absent
    pub optional: bool,
}

impl Param {
    /// Number of capture slots this parameter occupies.
    fn capture_slots(&self) -> usize {
        match &self.pattern {
            Some(pattern) => capture_groups(pattern),
            None => 1,
        }
    }

    fn render(&self, out: &mut String) {
        let slash = if self.slash { "/" } else { "" };
        let format = if self.format { r"\." } else { "" };
        let pattern = self.pattern.as_deref().unwrap_or(DEFAULT_PARAM_PATTERN);
        if self.optional {
            // the separator moves inside the optional group so an absent
            // value does not leave a dangling `/`
            out.push_str("(?:");
            out.push_str(slash);
        } else {
            out.push_str(slash);
            out.push_str("(?:");
        }
        out.push_str(format);
        out.push_str(pattern);
        out.push(')');
        if self.optional {
            out.push('?');
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Declaration text. `.` is matched literally; every other character,
    /// including group punctuation such as `)?`, reaches the regex engine as written.
    Literal(String),
    /// `/(` opens a non-capturing group that starts with the separator
    GroupOpen,
    Param(Param),
    /// `*`, captured positionally without a name
    Wildcard,
    /// Implicit `/?` accepting an optional trailing separator
    TrailingSlash,
}

/// Ordered token list for one route declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Tokenize a route declaration. Never fails: text that does not form a
    /// parameter token is kept as a literal.
    #[must_use]
    pub fn parse(declaration: &str) -> Self {
        let mut parser = Parser {
            chars: declaration.chars().collect(),
            segments: Vec::new(),
            literal: String::new(),
        };
        parser.run();
        parser.flush();
        parser.segments.push(Segment::TrailingSlash);
        Template {
            segments: parser.segments,
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names aligned with the capture groups of the rendered
    /// pattern. Positions without a name (wildcards, raw groups, extra groups
    /// inside an inline pattern) are `None`.
    #[must_use]
    pub fn param_names(&self) -> Vec<Option<Arc<str>>> {
        let mut names = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    names.extend(std::iter::repeat_n(None, capture_groups(text)));
                }
                Segment::Param(param) => {
                    let slots = param.capture_slots();
                    if slots > 0 {
                        names.push(Some(Arc::from(param.name.as_str())));
                        names.extend(std::iter::repeat_n(None, slots - 1));
                    }
                }
                Segment::Wildcard => names.push(None),
                Segment::GroupOpen | Segment::TrailingSlash => {}
            }
        }
        names
    }

    /// Render the anchored regex source. Case-insensitivity is applied by
    /// the caller when the regex is built.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.segments.len() * 8 + 2);
        out.push('^');
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => render_literal(text, &mut out),
                Segment::GroupOpen => out.push_str("(?:"),
                Segment::Param(param) => param.render(&mut out),
                Segment::Wildcard => out.push_str(WILDCARD_PATTERN),
                Segment::TrailingSlash => out.push_str("/?"),
            }
        }
        out.push('$');
        out
    }
}

struct Parser {
    chars: Vec<char>,
    segments: Vec<Segment>,
    literal: String,
}

impl Parser {
    fn run(&mut self) {
        let mut i = 0;
        while i < self.chars.len() {
            i = match self.chars[i] {
                '/' => self.separator(i),
                '.' | ':' => match self.param_at(i, false) {
                    Some(end) => end,
                    None => {
                        self.literal.push(self.chars[i]);
                        i + 1
                    }
                },
                '*' => {
                    self.flush();
                    self.segments.push(Segment::Wildcard);
                    i + 1
                }
                '\\' => {
                    // escape pairs pass through untouched
                    self.literal.push('\\');
                    if let Some(&next) = self.chars.get(i + 1) {
                        self.literal.push(next);
                    }
                    i + 2
                }
                c => {
                    self.literal.push(c);
                    i + 1
                }
            };
        }
    }

    /// Handle a `/` at `i`; returns the next index to scan.
    fn separator(&mut self, i: usize) -> usize {
        let mut next = i + 1;
        if self.chars.get(next) == Some(&'(') && self.chars.get(next + 1) != Some(&'?') {
            self.flush();
            self.segments.push(Segment::GroupOpen);
            next += 1;
        }
        if let Some(end) = self.param_at(next, true) {
            return end;
        }
        self.literal.push('/');
        next
    }

    /// Try to read a parameter token starting at `start` (a `.` or `:`).
    /// On success the segment is pushed and the index past it returned.
    fn param_at(&mut self, start: usize, slash: bool) -> Option<usize> {
        let mut j = start;
        let format = self.chars.get(j) == Some(&'.') && self.chars.get(j + 1) == Some(&':');
        if format {
            j += 1;
        }
        if self.chars.get(j) != Some(&':') {
            return None;
        }
        j += 1;
        let name_start = j;
        while self.chars.get(j).is_some_and(|c| is_word(*c)) {
            j += 1;
        }
        if j == name_start {
            return None;
        }
        let name: String = self.chars[name_start..j].iter().collect();

        let mut pattern = None;
        if self.chars.get(j) == Some(&'(') {
            if let Some(close) = closing_paren(&self.chars, j) {
                pattern = Some(self.chars[j..=close].iter().collect());
                j = close + 1;
            }
        }

        let optional = self.chars.get(j) == Some(&'?');
        if optional {
            j += 1;
        }

        self.flush();
        self.segments.push(Segment::Param(Param {
            name,
            slash,
            format,
            pattern,
            optional,
        }));
        Some(j)
    }

    fn flush(&mut self) {
        if !self.literal.is_empty() {
            self.segments
                .push(Segment::Literal(std::mem::take(&mut self.literal)));
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Index of the `)` balancing the `(` at `open`, skipping escapes and
/// character classes.
fn closing_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut i = open;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Count the capturing groups opened in a fragment of regex source.
///
/// `(?:`, `(?i)` and look-around style groups do not capture; `(?P<n>` and
/// `(?<n>` do.
#[must_use]
pub fn capture_groups(source: &str) -> usize {
    let chars: Vec<char> = source.chars().collect();
    let mut count = 0;
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                if chars.get(i + 1) != Some(&'?') {
                    count += 1;
                } else {
                    let named = match (chars.get(i + 2), chars.get(i + 3)) {
                        (Some('P'), Some('<')) => true,
                        (Some('<'), Some(c)) => *c != '=' && *c != '!',
                        _ => false,
                    };
                    if named {
                        count += 1;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    count
}

fn render_literal(text: &str, out: &mut String) {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push('\\');
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '.' => out.push_str(r"\."),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(decl: &str) -> Vec<Option<String>> {
        Template::parse(decl)
            .param_names()
            .into_iter()
            .map(|n| n.map(|n| n.to_string()))
            .collect()
    }

    #[test]
    fn test_literal_only() {
        let t = Template::parse("/users/list");
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("/users/list".to_string()),
                Segment::TrailingSlash
            ]
        );
        assert_eq!(t.render(), "^/users/list/?$");
    }

    #[test]
    fn test_required_param_keeps_slash_outside() {
        let t = Template::parse("/users/:id");
        assert_eq!(t.render(), "^/users/(?:([^/]+?))/?$");
        assert_eq!(names("/users/:id"), vec![Some("id".to_string())]);
    }

    #[test]
    fn test_optional_param_pulls_slash_inside() {
        let t = Template::parse("/files/:name?");
        assert_eq!(t.render(), "^/files(?:/([^/]+?))?/?$");
    }

    #[test]
    fn test_inline_pattern_used_verbatim() {
        let t = Template::parse(r"/items/:id(\d+)");
        assert_eq!(t.render(), r"^/items/(?:(\d+))/?$");
        assert_eq!(names(r"/items/:id(\d+)"), vec![Some("id".to_string())]);
    }

    #[test]
    fn test_inline_pattern_with_nested_groups() {
        let t = Template::parse("/v/:ver((a|b)c)/x");
        assert_eq!(t.render(), "^/v/(?:((a|b)c))/x/?$");
        assert_eq!(names("/v/:ver((a|b)c)/x"), vec![Some("ver".to_string()), None]);
    }

    #[test]
    fn test_non_capturing_inline_pattern_binds_no_name() {
        let t = Template::parse(r"/items/:id(?:\d+)/:tab");
        assert_eq!(t.render(), r"^/items/(?:(?:\d+))/(?:([^/]+?))/?$");
        assert_eq!(names(r"/items/:id(?:\d+)/:tab"), vec![Some("tab".to_string())]);
    }

    #[test]
    fn test_format_marker() {
        let t = Template::parse("/report.:ext");
        assert_eq!(t.render(), r"^/report(?:\.([^/]+?))/?$");
        let t = Template::parse("/report.:ext?");
        assert_eq!(t.render(), r"^/report(?:\.([^/]+?))?/?$");
    }

    #[test]
    fn test_group_open_rescans_separator() {
        let t = Template::parse("/archive/(:year)?");
        assert_eq!(t.render(), "^/archive(?:/(?:([^/]+?)))?/?$");
        assert_eq!(names("/archive/(:year)?"), vec![Some("year".to_string())]);
    }

    #[test]
    fn test_group_open_literal() {
        let t = Template::parse("/list/(all)?");
        assert_eq!(t.render(), "^/list(?:/all)?/?$");
        assert!(names("/list/(all)?").is_empty());
    }

    #[test]
    fn test_wildcards_occupy_unnamed_slots() {
        let t = Template::parse("/a/*/b/:id/*");
        assert_eq!(t.render(), "^/a/(.+)/b/(?:([^/]+?))/(.+)/?$");
        assert_eq!(
            names("/a/*/b/:id/*"),
            vec![None, Some("id".to_string()), None]
        );
    }

    #[test]
    fn test_bare_group_is_unnamed_capture() {
        assert_eq!(names("/x(y)/:id"), vec![None, Some("id".to_string())]);
    }

    #[test]
    fn test_colon_without_name_is_literal() {
        let t = Template::parse("/time/12:/x");
        assert_eq!(t.render(), "^/time/12:/x/?$");
    }

    #[test]
    fn test_unbalanced_inline_pattern_falls_back_to_default() {
        let t = Template::parse("/a/:id(");
        match &t.segments()[1] {
            Segment::Param(p) => {
                assert_eq!(p.name, "id");
                assert!(p.pattern.is_none());
            }
            other => panic!("unexpected segment {other:?}"),
        }
    }

    #[test]
    fn test_capture_group_counting() {
        assert_eq!(capture_groups(r"(\d+)"), 1);
        assert_eq!(capture_groups("(?:a)(b)"), 1);
        assert_eq!(capture_groups("(?P<x>a)(?<y>b)"), 2);
        assert_eq!(capture_groups(r"\(a\)[(]"), 0);
        assert_eq!(capture_groups("(?i)"), 0);
    }
}
