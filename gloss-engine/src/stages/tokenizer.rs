//! Character-class tokeniser

use super::{annotate, feature};
use gloss_core::{features, AnnotationType, Document, Span, Stage, StageDescriptor, StageError};

/// Class of a scanned token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Word,
    Number,
    Punctuation,
    Symbol,
    Space,
    Control,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Word => "word",
            TokenKind::Number => "number",
            TokenKind::Punctuation => "punctuation",
            TokenKind::Symbol => "symbol",
            TokenKind::Space => "space",
            TokenKind::Control => "control",
        }
    }

    pub fn is_space(self) -> bool {
        matches!(self, TokenKind::Space | TokenKind::Control)
    }
}

/// A token found by [`scan`], in character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawToken {
    pub kind: TokenKind,
    pub span: Span,
}

fn is_punctuation(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | '(' | ')' | '[' | ']' | '{' | '}'
            | '-' | '/' | '\u{2013}' | '\u{2014}' | '\u{2026}' | '\u{00AB}' | '\u{00BB}'
            | '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}'
    )
}

/// Split text into words, numbers, punctuation, symbols and whitespace runs
///
/// Numbers keep internal `,` and `.` when digits follow (`25,000`, `3.5`).
/// Whitespace runs containing a line break are `Control`.
pub(crate) fn scan(text: &str) -> Vec<RawToken> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < n {
        let start = i;
        let c = chars[i];
        i += 1;

        let kind = if c.is_whitespace() {
            while i < n && chars[i].is_whitespace() {
                i += 1;
            }
            if chars[start..i].iter().any(|&c| c == '\n' || c == '\r') {
                TokenKind::Control
            } else {
                TokenKind::Space
            }
        } else if c.is_alphabetic() {
            while i < n && chars[i].is_alphanumeric() {
                i += 1;
            }
            TokenKind::Word
        } else if c.is_numeric() {
            while i < n {
                if chars[i].is_numeric() {
                    i += 1;
                } else if matches!(chars[i], ',' | '.') && i + 1 < n && chars[i + 1].is_numeric() {
                    i += 2;
                } else {
                    break;
                }
            }
            TokenKind::Number
        } else if is_punctuation(c) {
            TokenKind::Punctuation
        } else {
            TokenKind::Symbol
        };

        tokens.push(RawToken {
            kind,
            span: Span::new(start, i),
        });
    }

    tokens
}

/// Capitalisation pattern of a word
pub(crate) fn orthography(word: &str) -> &'static str {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return "lowercase";
    };
    let has_lower = word.chars().any(char::is_lowercase);
    let rest_upper = chars.any(char::is_uppercase);

    if !has_lower && first.is_uppercase() {
        if word.chars().count() > 1 {
            "allCaps"
        } else {
            "upperInitial"
        }
    } else if first.is_uppercase() && !rest_upper {
        "upperInitial"
    } else if !first.is_uppercase() && !rest_upper {
        "lowercase"
    } else {
        "mixedCaps"
    }
}

/// Produces `Token` and `SpaceToken` annotations covering the whole text
#[derive(Debug, Clone)]
pub struct Tokenizer {
    descriptor: StageDescriptor,
}

impl Tokenizer {
    /// Stage name
    pub const NAME: &'static str = "tokenizer";

    /// Create the tokeniser
    pub fn new() -> Self {
        let descriptor = StageDescriptor::new(Self::NAME).produces([
            AnnotationType::Token.layer(),
            AnnotationType::SpaceToken.layer(),
            AnnotationType::Token.feature(feature::STRING),
            AnnotationType::Token.feature(feature::KIND),
            AnnotationType::Token.feature(feature::ORTH),
            AnnotationType::Token.feature(feature::LENGTH),
        ]);
        Self { descriptor }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for Tokenizer {
    fn descriptor(&self) -> &StageDescriptor {
        &self.descriptor
    }

    fn run(&self, document: &mut Document) -> Result<(), StageError> {
        let raw = scan(document.text());

        for token in raw {
            let text = document.slice(token.span).unwrap_or_default().to_string();
            let mut features = features! {
                feature::STRING => text.as_str(),
                feature::KIND => token.kind.as_str(),
                feature::LENGTH => token.span.len(),
            };

            let ty = if token.kind.is_space() {
                AnnotationType::SpaceToken
            } else {
                if token.kind == TokenKind::Word {
                    features.insert(feature::ORTH.to_string(), orthography(&text).into());
                }
                AnnotationType::Token
            };

            annotate(document, Self::NAME, ty, token.span, features)?;
        }

        Ok(())
    }
}
