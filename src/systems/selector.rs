//! Selector matching against live entities.
//!
//! The configuration surface addresses targets by CSS-flavored selector
//! strings. Entities opt in by carrying a [`Name`] (matched by `#name`) and/or
//! a [`Classes`] component (matched by `.class`). Supported dialect: `#name`,
//! `.class`, `*`, and compounds of those (`#save.primary`); combinators are
//! not supported.
use bevy::prelude::*;
use smallvec::SmallVec;

/// Class labels an entity can be selected by. Most targets carry a handful at
/// most, so the storage is inline up to four.
#[derive(Component, Clone, Debug, Default)]
pub struct Classes(SmallVec<[String; 4]>);

impl Classes {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(classes.into_iter().map(Into::into).collect())
    }

    pub(crate) fn from_static(classes: &[&'static str]) -> Self {
        Self::new(classes.iter().copied())
    }

    pub fn has(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum SelectorPart {
    Universal,
    Id(String),
    Class(String),
}

/// A parsed selector. Parsing happens once per configuration entry; matching
/// is evaluated against live entities on every event, never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    parts: SmallVec<[SelectorPart; 4]>,
}

impl Selector {
    /// Parse a selector string. Returns `None` for input outside the
    /// supported dialect; callers are expected to warn and disable the
    /// offending configuration entry rather than fail.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        if input == "*" {
            return Some(Self {
                parts: SmallVec::from_elem(SelectorPart::Universal, 1),
            });
        }

        let mut parts = SmallVec::new();
        let mut chars = input.chars().peekable();
        while let Some(prefix) = chars.next() {
            let token: String = {
                let mut token = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '#' || c == '.' {
                        break;
                    }
                    token.push(c);
                    chars.next();
                }
                token
            };
            if token.is_empty() || !token.chars().all(is_token_char) {
                return None;
            }
            match prefix {
                '#' => parts.push(SelectorPart::Id(token)),
                '.' => parts.push(SelectorPart::Class(token)),
                _ => return None,
            }
        }
        Some(Self { parts })
    }

    /// Test the selector against an entity's selectable facets. Every part of
    /// a compound must hold.
    pub fn matches(&self, name: Option<&Name>, classes: Option<&Classes>) -> bool {
        self.parts.iter().all(|part| match part {
            SelectorPart::Universal => true,
            SelectorPart::Id(id) => name.is_some_and(|n| n.as_str() == id),
            SelectorPart::Class(class) => classes.is_some_and(|c| c.has(class)),
        })
    }
}
