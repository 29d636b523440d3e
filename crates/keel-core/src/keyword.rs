//! Operator keywords and their binding strength

use crate::GrammarError;
use std::fmt;
use std::str::FromStr;

/// An operator keyword of the sentence language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Then,
    Or,
    And,
    Set,
    Inc,
    Was,
    WasNot,
    Is,
    IsNot,
    IsNow,
    IsNotNow,
    HasChanged,
    HasNotChanged,
    GreaterThan,
    LessThan,
}

/// Keyword table ordered from weakest to strongest binding
///
/// The parser reduces from the strong end, so the weakest keyword of a
/// sentence ends up at the root of its tree.
pub const KEYWORDS: [(Keyword, &str); 15] = [
    (Keyword::Then, "then"),
    (Keyword::Or, "or"),
    (Keyword::And, "and"),
    (Keyword::Set, "set"),
    (Keyword::Inc, "inc"),
    (Keyword::Was, "was"),
    (Keyword::WasNot, "was not"),
    (Keyword::Is, "is"),
    (Keyword::IsNot, "is not"),
    (Keyword::IsNow, "is now"),
    (Keyword::IsNotNow, "is not now"),
    (Keyword::HasChanged, "has changed"),
    (Keyword::HasNotChanged, "has not changed"),
    (Keyword::GreaterThan, "greater than"),
    (Keyword::LessThan, "less than"),
];

impl Keyword {
    /// Look up a keyword by its phrase
    pub fn from_phrase(phrase: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(_, p)| *p == phrase)
            .map(|(keyword, _)| *keyword)
    }

    /// The phrase this keyword is written as
    pub fn phrase(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == self)
            .map(|(_, phrase)| *phrase)
            .unwrap_or_default()
    }

    /// Whether chains like `a and b and c` may be grouped either way
    pub fn is_associative(self) -> bool {
        matches!(self, Keyword::And | Keyword::Or)
    }

    /// Keywords that accept a placeholder as their right operand
    pub fn takes_placeholder(self) -> bool {
        matches!(
            self,
            Keyword::HasChanged | Keyword::HasNotChanged | Keyword::Inc
        )
    }

    /// Keywords that write to the field on their left
    pub fn is_assignment(self) -> bool {
        matches!(self, Keyword::Set | Keyword::Inc)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

impl FromStr for Keyword {
    type Err = GrammarError;

    fn from_str(phrase: &str) -> Result<Self, Self::Err> {
        Keyword::from_phrase(phrase).ok_or_else(|| GrammarError::UnknownOperator(phrase.to_string()))
    }
}
