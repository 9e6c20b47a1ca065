//! # Receipt Documents
//!
//! A [`ReceiptDocument`] is an ordered sequence of [`Directive`]s — the
//! protocol-independent description of one printed receipt. It is a pure
//! value with no identity: composing the same record twice yields equal
//! documents.
//!
//! ## Well-formedness
//!
//! A well-formed document:
//!
//! - starts with [`Directive::InitPrinter`]
//! - ends with [`Directive::Cut`]
//! - sets alignment and size explicitly before the first text line, so no
//!   formatting is ever inherited silently from a previous document
//!
//! Documents built through [`ReceiptDocument::new`] and the push methods
//! satisfy the first rule by construction; [`ReceiptDocument::is_well_formed`]
//! checks all three.

use serde::{Deserialize, Serialize};

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Character size. The fixed layout only needs normal and double.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    #[default]
    Normal,
    Double,
}

/// One formatting or content instruction, prior to protocol encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    InitPrinter,
    SetAlign(Alignment),
    SetSize(TextSize),
    TextLine(String),
    FeedLine(u8),
    Cut,
}

/// An ordered sequence of directives describing one receipt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceiptDocument {
    directives: Vec<Directive>,
}

impl ReceiptDocument {
    /// Start a new document. The printer-init directive comes first.
    pub fn new() -> Self {
        Self {
            directives: vec![Directive::InitPrinter],
        }
    }

    /// Build a document from raw directives (no well-formedness check).
    pub fn from_directives(directives: Vec<Directive>) -> Self {
        Self { directives }
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn align(&mut self, alignment: Alignment) -> &mut Self {
        self.directives.push(Directive::SetAlign(alignment));
        self
    }

    pub fn size(&mut self, size: TextSize) -> &mut Self {
        self.directives.push(Directive::SetSize(size));
        self
    }

    pub fn text(&mut self, line: impl Into<String>) -> &mut Self {
        self.directives.push(Directive::TextLine(line.into()));
        self
    }

    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.directives.push(Directive::FeedLine(lines));
        self
    }

    pub fn cut(&mut self) -> &mut Self {
        self.directives.push(Directive::Cut);
        self
    }

    /// All text lines in order. Handy for tests and previews.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().filter_map(|d| match d {
            Directive::TextLine(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Check the document invariants described in the module docs.
    pub fn is_well_formed(&self) -> bool {
        if self.directives.first() != Some(&Directive::InitPrinter) {
            return false;
        }
        if self.directives.last() != Some(&Directive::Cut) {
            return false;
        }

        // Alignment and size must both be pinned before the first text line.
        let mut aligned = false;
        let mut sized = false;
        for directive in &self.directives {
            match directive {
                Directive::SetAlign(_) => aligned = true,
                Directive::SetSize(_) => sized = true,
                Directive::TextLine(_) if !(aligned && sized) => return false,
                _ => {}
            }
        }
        true
    }
}
