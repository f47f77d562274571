//! Ordered substring rule chains
//!
//! A rule chain is an explicit list of (matcher, result) pairs evaluated top to
//! bottom; the first matching rule wins. Tables that depend on precedence (the
//! item name canonicalizer, category inference) are written as chains so the
//! order is visible and testable on its own.
//!
//! Matching is substring search, optionally restricted to needles that start
//! a word (so "egg" does not fire inside "veggie"). Callers pass text that is
//! already lowercased; needles are lowercase.

/// How a rule decides whether it applies to a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// At least one needle occurs in the text
    Any(&'static [&'static str]),
    /// Every needle occurs in the text (in any order)
    All(&'static [&'static str]),
}

impl Matcher {
    pub fn matches(&self, text: &str) -> bool {
        self.matches_with(|n| text.contains(n))
    }

    /// Like [`Matcher::matches`], but a needle only counts where it starts a word
    pub fn matches_word_start(&self, text: &str) -> bool {
        self.matches_with(|n| contains_at_word_start(text, n))
    }

    fn matches_with(&self, found: impl Fn(&str) -> bool) -> bool {
        match self {
            Self::Any(needles) => needles.iter().any(|n| found(*n)),
            Self::All(needles) => !needles.is_empty() && needles.iter().all(|n| found(*n)),
        }
    }
}

/// Whether `needle` occurs at the start of `text` or right after a space
pub fn contains_at_word_start(text: &str, needle: &str) -> bool {
    text.match_indices(needle)
        .any(|(idx, _)| idx == 0 || text[..idx].ends_with(' '))
}

/// A single entry in a rule chain
#[derive(Debug, Clone, Copy)]
pub struct Rule<T: 'static> {
    pub matcher: Matcher,
    pub result: T,
}

impl<T> Rule<T> {
    pub const fn any(needles: &'static [&'static str], result: T) -> Self {
        Self {
            matcher: Matcher::Any(needles),
            result,
        }
    }

    pub const fn all(needles: &'static [&'static str], result: T) -> Self {
        Self {
            matcher: Matcher::All(needles),
            result,
        }
    }
}

/// First-match-wins list of rules
#[derive(Debug, Clone, Copy)]
pub struct RuleChain<T: 'static> {
    rules: &'static [Rule<T>],
    word_start: bool,
}

impl<T> RuleChain<T> {
    pub const fn new(rules: &'static [Rule<T>]) -> Self {
        Self {
            rules,
            word_start: false,
        }
    }

    /// Chain whose needles only match at the start of a word
    pub const fn at_word_starts(rules: &'static [Rule<T>]) -> Self {
        Self {
            rules,
            word_start: true,
        }
    }

    fn applies(&self, rule: &Rule<T>, text: &str) -> bool {
        if self.word_start {
            rule.matcher.matches_word_start(text)
        } else {
            rule.matcher.matches(text)
        }
    }

    /// Result of the first rule matching `text`
    pub fn first_match(&self, text: &str) -> Option<&T> {
        self.rules
            .iter()
            .find(|rule| self.applies(rule, text))
            .map(|rule| &rule.result)
    }

    /// Index of the first rule matching `text`
    pub fn position(&self, text: &str) -> Option<usize> {
        self.rules.iter().position(|rule| self.applies(rule, text))
    }

    pub fn rules(&self) -> &'static [Rule<T>] {
        self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
