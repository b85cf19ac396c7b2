//! Path pattern compilation and matching.
//!
//! A pattern is a literal path with three kinds of placeholders:
//!
//! | Syntax    | Matches                                   | Captured |
//! |-----------|-------------------------------------------|----------|
//! | `:name`   | one non-empty segment (no `/`)            | yes      |
//! | `:name?`  | an optional `/segment`, absorbing its `/` | if present |
//! | `*`       | any run of characters, including `/`      | no       |
//!
//! Everything else is matched literally. Parameter names are ASCII word
//! characters (`[A-Za-z0-9_]`); a `:` followed by no word character is a
//! literal colon. The pattern `*` on its own matches every path and is the
//! fallback route.
//!
//! A compiled [`PathPattern`] is anchored at both ends. Matching is
//! case-sensitive and captured values are percent-decoded.
//!
//! # Example
//!
//! ```
//! use web_navigator::PathPattern;
//!
//! let pattern = PathPattern::compile("/user/:userId/posts/:postId?").unwrap();
//!
//! let params = pattern.matches("/user/42/posts").unwrap().unwrap();
//! assert_eq!(params.get("userId"), Some("42"));
//! assert!(!params.contains("postId"));
//!
//! let params = pattern.matches("/user/42/posts/7").unwrap().unwrap();
//! assert_eq!(params.get("postId"), Some("7"));
//! ```

use crate::error::{DecodeError, PatternError};
use crate::params::{decode_uri_component, encode_uri_component, RouteParams};
use crate::trace_log;
use regex::{Regex, RegexBuilder};

/// Upper bound on the compiled automaton size.
const MAX_PATTERN_REGEX_SIZE: usize = 1 << 20;

/// Kind of a compiled pattern piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal text, matched exactly.
    Literal,
    /// `:name`
    Param,
    /// `:name?`, including the `/` before it.
    OptionalParam,
    /// `*`
    Wildcard,
}

/// One piece of a compiled pattern, in source order.
///
/// Literal pieces may span several path segments (`/users/` is one piece).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Literal text for [`SegmentKind::Literal`], parameter name for params,
    /// empty for wildcards.
    pub value: String,
}

impl Segment {
    fn literal(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Literal,
            value: text.into(),
        }
    }
}

/// A route pattern compiled to an anchored regular expression.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    param_names: Vec<String>,
    regex: Regex,
}

impl PathPattern {
    /// Compile a pattern string.
    ///
    /// Fails when a parameter name is used twice.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let segments = scan(pattern);

        let mut param_names: Vec<String> = Vec::new();
        for segment in &segments {
            if matches!(segment.kind, SegmentKind::Param | SegmentKind::OptionalParam) {
                if param_names.contains(&segment.value) {
                    return Err(PatternError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name: segment.value.clone(),
                    });
                }
                param_names.push(segment.value.clone());
            }
        }

        let regex_str = to_regex(&segments);
        trace_log!("Compiled pattern '{}' to '{}'", pattern, regex_str);

        let regex = RegexBuilder::new(&regex_str)
            .size_limit(MAX_PATTERN_REGEX_SIZE)
            .build()
            .map_err(|e| PatternError::Invalid {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            source: pattern.to_string(),
            segments,
            param_names,
            regex,
        })
    }

    /// The pattern string this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compiled pieces in source order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in the order they appear.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// `true` for the catch-all pattern `*`.
    pub fn is_fallback(&self) -> bool {
        self.source == "*"
    }

    /// Match a path, returning decoded parameters on success.
    ///
    /// Returns `Ok(None)` when the path does not match. Optional parameters
    /// that did not participate are absent from the result.
    pub fn matches(&self, path: &str) -> Result<Option<RouteParams>, DecodeError> {
        let Some(captures) = self.regex.captures(path) else {
            return Ok(None);
        };

        let mut params = RouteParams::new();
        for (index, name) in self.param_names.iter().enumerate() {
            if let Some(value) = captures.get(index + 1) {
                params.insert(name.as_str(), decode_uri_component(value.as_str())?);
            }
        }

        Ok(Some(params))
    }

    /// Build a concrete path from parameters.
    ///
    /// Values are percent-encoded. Wildcards expand to nothing. Returns the
    /// name of the first missing required parameter as the error.
    pub fn build(&self, params: &RouteParams) -> Result<String, String> {
        let mut path = String::new();
        for segment in &self.segments {
            match segment.kind {
                SegmentKind::Literal => path.push_str(&segment.value),
                SegmentKind::Param => {
                    let value = params
                        .get(&segment.value)
                        .ok_or_else(|| segment.value.clone())?;
                    path.push_str(&encode_uri_component(value));
                }
                SegmentKind::OptionalParam => {
                    if let Some(value) = params.get(&segment.value) {
                        path.push('/');
                        path.push_str(&encode_uri_component(value));
                    }
                }
                SegmentKind::Wildcard => {}
            }
        }
        Ok(path)
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PathPattern {}

/// Split a pattern into pieces.
fn scan(pattern: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }

                if name.is_empty() {
                    literal.push(':');
                    continue;
                }

                let optional = chars.peek() == Some(&'?');
                if optional {
                    chars.next();
                    // The optional group owns the slash in front of it.
                    if literal.ends_with('/') {
                        literal.pop();
                    } else if literal.is_empty() {
                        if let Some(prev) = segments.last_mut() {
                            if prev.kind == SegmentKind::Literal && prev.value.ends_with('/') {
                                prev.value.pop();
                            }
                        }
                    }
                }

                if !literal.is_empty() {
                    segments.push(Segment::literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment {
                    kind: if optional {
                        SegmentKind::OptionalParam
                    } else {
                        SegmentKind::Param
                    },
                    value: name,
                });
            }
            '*' => {
                if !literal.is_empty() {
                    segments.push(Segment::literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment {
                    kind: SegmentKind::Wildcard,
                    value: String::new(),
                });
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::literal(literal));
    }

    segments.retain(|s| s.kind != SegmentKind::Literal || !s.value.is_empty());
    segments
}

fn to_regex(segments: &[Segment]) -> String {
    let mut regex_str = String::from("(?s)^");
    for segment in segments {
        match segment.kind {
            SegmentKind::Literal => regex_str.push_str(&regex::escape(&segment.value)),
            SegmentKind::Param => regex_str.push_str("([^/]+)"),
            SegmentKind::OptionalParam => regex_str.push_str("(?:/([^/]+))?"),
            SegmentKind::Wildcard => regex_str.push_str(".*"),
        }
    }
    regex_str.push('$');
    regex_str
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> PathPattern {
        PathPattern::compile(pattern).unwrap()
    }

    #[test]
    fn test_literal_pattern() {
        let pattern = compile("/about");
        assert!(pattern.matches("/about").unwrap().is_some());
        assert!(pattern.matches("/about/team").unwrap().is_none());
        assert!(pattern.matches("/About").unwrap().is_none());
        assert!(pattern.param_names().is_empty());
    }

    #[test]
    fn test_root_pattern() {
        let pattern = compile("/");
        assert!(pattern.matches("/").unwrap().is_some());
        assert!(pattern.matches("").unwrap().is_none());
    }

    #[test]
    fn test_param_pattern() {
        let pattern = compile("/product/:id");
        let params = pattern.matches("/product/42").unwrap().unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert!(pattern.matches("/product/").unwrap().is_none());
        assert!(pattern.matches("/product/42/extra").unwrap().is_none());
    }

    #[test]
    fn test_optional_param_segments() {
        let pattern = compile("/user/:userId/posts/:postId?");
        assert_eq!(
            pattern.segments(),
            &[
                Segment::literal("/user/"),
                Segment {
                    kind: SegmentKind::Param,
                    value: "userId".into()
                },
                Segment::literal("/posts"),
                Segment {
                    kind: SegmentKind::OptionalParam,
                    value: "postId".into()
                },
            ]
        );
    }

    #[test]
    fn test_optional_param_absent_is_not_empty_string() {
        let pattern = compile("/user/:userId/posts/:postId?");
        let params = pattern.matches("/user/42/posts").unwrap().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("postId"), None);
        assert!(pattern.matches("/user/42/posts/").unwrap().is_none());
    }

    #[test]
    fn test_wildcard_not_captured() {
        let pattern = compile("/files/*");
        let params = pattern.matches("/files/a/b/c.txt").unwrap().unwrap();
        assert!(params.is_empty());
        assert!(pattern.matches("/files/").unwrap().is_some());
    }

    #[test]
    fn test_inline_wildcard() {
        let pattern = compile("/docs/*/edit");
        assert!(pattern.matches("/docs/a/b/edit").unwrap().is_some());
        assert!(pattern.matches("/docs/a/b").unwrap().is_none());
    }

    #[test]
    fn test_fallback_matches_everything() {
        let pattern = compile("*");
        assert!(pattern.is_fallback());
        assert!(pattern.matches("*").unwrap().is_some());
        assert!(pattern.matches("/any/thing").unwrap().is_some());
        assert!(pattern.matches("").unwrap().is_some());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = compile("/a.b/(c)/x+y?");
        assert!(pattern.matches("/a.b/(c)/x+y?").unwrap().is_some());
        assert!(pattern.matches("/aXb/(c)/x+y?").unwrap().is_none());
        assert!(pattern.matches("/a.b/c/xy").unwrap().is_none());
    }

    #[test]
    fn test_bare_colon_is_literal() {
        let pattern = compile("/time/:/now");
        assert!(pattern.param_names().is_empty());
        assert!(pattern.matches("/time/:/now").unwrap().is_some());
    }

    #[test]
    fn test_params_are_decoded() {
        let pattern = compile("/search/:term");
        let params = pattern.matches("/search/caf%C3%A9%20au%20lait").unwrap().unwrap();
        assert_eq!(params.get("term"), Some("café au lait"));
    }

    #[test]
    fn test_malformed_param_encoding_propagates() {
        let pattern = compile("/search/:term");
        assert!(pattern.matches("/search/100%").is_err());
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let error = PathPattern::compile("/a/:id/b/:id").unwrap_err();
        assert_eq!(
            error,
            PatternError::DuplicateParam {
                pattern: "/a/:id/b/:id".into(),
                name: "id".into()
            }
        );
    }

    #[test]
    fn test_build_round_trips() {
        let pattern = compile("/user/:userId/posts/:postId?");

        let params: RouteParams = [("userId", "a b")].into_iter().collect();
        let path = pattern.build(&params).unwrap();
        assert_eq!(path, "/user/a%20b/posts");
        assert_eq!(pattern.matches(&path).unwrap(), Some(params));

        let params: RouteParams = [("userId", "7"), ("postId", "9")].into_iter().collect();
        let path = pattern.build(&params).unwrap();
        assert_eq!(path, "/user/7/posts/9");
        assert_eq!(pattern.matches(&path).unwrap(), Some(params));
    }

    #[test]
    fn test_build_reports_missing_param() {
        let pattern = compile("/product/:id");
        assert_eq!(pattern.build(&RouteParams::new()), Err("id".to_string()));
    }
}
