//! Label selectors for broadcast triggers and state aggregation.

use crate::machine::Machine;

/// A parsed label selector.
///
/// A leading `.` matches against the class label instead of the instance
/// label. A trailing `*` turns an exact match into a prefix match.
///
/// ```rust
/// use automata::factory::LabelPattern;
///
/// let pattern = LabelPattern::parse(".PUMP*");
/// assert!(pattern.is_class());
/// assert!(pattern.is_prefix());
/// assert_eq!(pattern.text(), "PUMP");
/// assert!(pattern.matches_text("PUMPS"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPattern<'a> {
    text: &'a str,
    class: bool,
    prefix: bool,
}

impl<'a> LabelPattern<'a> {
    pub fn parse(pattern: &'a str) -> Self {
        let (class, rest) = match pattern.strip_prefix('.') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let (prefix, text) = match rest.strip_suffix('*') {
            Some(text) => (true, text),
            None => (false, rest),
        };
        Self {
            text,
            class,
            prefix,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn is_class(&self) -> bool {
        self.class
    }

    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    pub fn matches_text(&self, label: &str) -> bool {
        if self.prefix {
            label.starts_with(self.text)
        } else {
            label == self.text
        }
    }

    pub fn matches(&self, machine: &Machine) -> bool {
        if self.class {
            self.matches_text(machine.class_label())
        } else {
            self.matches_text(machine.label())
        }
    }
}
