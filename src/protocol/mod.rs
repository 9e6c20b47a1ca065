//! # ESC/POS Protocol Implementation
//!
//! This module maps [`ReceiptDocument`](crate::document::ReceiptDocument)
//! directives onto the ESC/POS control-byte subset the shop's thermal
//! printers speak.
//!
//! ## Module Structure
//!
//! - [`encode`]: directive → byte sequence (pure, total)
//! - [`decode`]: byte sequence → directives, recovering directive
//!   boundaries for the supported subset
//!
//! ## Command Subset
//!
//! | Directive | ASCII | Hex |
//! |-----------|-------|-----|
//! | InitPrinter | ESC @ | 1B 40 |
//! | SetAlign(n) | ESC a n | 1B 61 n |
//! | SetSize | ESC ! n | 1B 21 n |
//! | TextLine(s) | s LF | .. 0A |
//! | FeedLine(n) | LF × n | 0A .. |
//! | Cut | GS V 0 | 1D 56 00 |
//!
//! Text is passed through byte-for-byte as UTF-8; this layer performs no
//! transliteration or code-page mapping. Consumers needing wire
//! compatibility must match these exact sequences.

pub mod decode;
pub mod encode;

pub use decode::{decode, DecodeError};
pub use encode::encode;

use serde::{Deserialize, Serialize};

use crate::document::ReceiptDocument;

/// ESC (Escape) — command prefix byte.
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) — extended command prefix.
pub const GS: u8 = 0x1D;

/// LF (Line Feed) — line terminator; prints the buffered line.
pub const LF: u8 = 0x0A;

/// Wire-format dialect selector.
///
/// ESC/POS is the single canonical encoding; the enum exists so a target
/// config can name its dialect without call-site changes if a printer
/// family ever needs another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    #[default]
    EscPos,
}

impl Dialect {
    /// Encode a document in this dialect.
    pub fn encode(&self, doc: &ReceiptDocument) -> Vec<u8> {
        match self {
            Self::EscPos => encode(doc),
        }
    }
}
