//! Formatting model: prefixes, comments and padding wrappers.
//!
//! Everything between two significant tokens lives in a `Space`. Child
//! relationships that have formatting on one side are wrapped in
//! `LeftPadded`/`RightPadded`; delimited lists are `Container`s.

use serde::{Deserialize, Serialize};

use super::markers::Markers;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Space {
    pub comments: Vec<Comment>,
    pub whitespace: Option<String>,
}

impl Space {
    pub const EMPTY: Space = Space { comments: Vec::new(), whitespace: None };

    pub fn format(whitespace: impl Into<String>) -> Self {
        let whitespace = whitespace.into();
        Space {
            comments: Vec::new(),
            whitespace: if whitespace.is_empty() { None } else { Some(whitespace) },
        }
    }

    pub fn single_space() -> Self {
        Space::format(" ")
    }

    pub fn whitespace(&self) -> &str {
        self.whitespace.as_deref().unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty() && self.whitespace().is_empty()
    }

    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comments.push(comment);
        self
    }

    /// Writes the exact source text this space was parsed from.
    pub fn print_to(&self, out: &mut String) {
        out.push_str(self.whitespace());
        for comment in &self.comments {
            if comment.multiline {
                out.push_str("/*");
                out.push_str(&comment.text);
                out.push_str("*/");
            } else {
                out.push_str("//");
                out.push_str(&comment.text);
            }
            out.push_str(&comment.suffix);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub multiline: bool,
    /// Comment body without its delimiters.
    pub text: String,
    /// Whitespace following the comment up to the next comment or token.
    pub suffix: String,
    pub markers: Markers,
}

impl Comment {
    pub fn line(text: impl Into<String>, suffix: impl Into<String>) -> Self {
        Comment { multiline: false, text: text.into(), suffix: suffix.into(), markers: Markers::empty() }
    }

    pub fn block(text: impl Into<String>, suffix: impl Into<String>) -> Self {
        Comment { multiline: true, text: text.into(), suffix: suffix.into(), markers: Markers::empty() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeftPadded<T> {
    pub before: Space,
    pub element: T,
    pub markers: Markers,
}

impl<T> LeftPadded<T> {
    pub fn new(before: Space, element: T) -> Self {
        LeftPadded { before, element, markers: Markers::empty() }
    }

    pub fn with_element(&self, element: T) -> Self {
        LeftPadded { before: self.before.clone(), element, markers: self.markers.clone() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RightPadded<T> {
    pub element: T,
    pub after: Space,
    pub markers: Markers,
}

impl<T> RightPadded<T> {
    pub fn new(element: T, after: Space) -> Self {
        RightPadded { element, after, markers: Markers::empty() }
    }

    pub fn bare(element: T) -> Self {
        RightPadded::new(element, Space::EMPTY)
    }

    pub fn with_element(&self, element: T) -> Self {
        RightPadded { element, after: self.after.clone(), markers: self.markers.clone() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container<T> {
    pub before: Space,
    pub elements: Vec<RightPadded<T>>,
    pub markers: Markers,
}

impl<T> Container<T> {
    pub fn new(before: Space, elements: Vec<RightPadded<T>>) -> Self {
        Container { before, elements, markers: Markers::empty() }
    }

    pub fn empty() -> Self {
        Container::new(Space::EMPTY, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.elements.iter().map(|rp| &rp.element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_prints_whitespace_then_comments() {
        let space = Space::format("\n  ")
            .with_comment(Comment::line(" note", "\n"))
            .with_comment(Comment::block(" inline ", " "));
        let mut out = String::new();
        space.print_to(&mut out);
        assert_eq!(out, "\n  // note\n/* inline */ ");
    }

    #[test]
    fn test_empty_format_is_empty_space() {
        assert_eq!(Space::format(""), Space::EMPTY);
        assert!(Space::EMPTY.is_empty());
        assert!(!Space::single_space().is_empty());
    }

    #[test]
    fn test_padding_equality_includes_space() {
        let a = RightPadded::new(1, Space::single_space());
        let b = RightPadded::new(1, Space::EMPTY);
        assert_ne!(a, b);
        assert_eq!(a, a.with_element(1));
        let l = LeftPadded::new(Space::single_space(), "x");
        assert_eq!(l.with_element("y").before, Space::single_space());
    }
}
