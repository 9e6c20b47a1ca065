//! # ESC/POS Subset Decoder
//!
//! Parses the byte stream produced by [`encode`](super::encode) back into
//! directive boundaries. This exists so the encoder's output can be
//! verified structurally (and inspected in previews) without a printer.
//!
//! ## Canonical form
//!
//! An empty `TextLine` and `FeedLine(1)` share the same wire encoding (a
//! bare LF), so the decoder resolves every bare-LF run to `FeedLine(n)`.
//! The composer only ever emits `FeedLine` for blank lines, which makes
//! composer output round-trip exactly.

use thiserror::Error;

use super::{ESC, GS, LF};
use crate::document::{Alignment, Directive, TextSize};

/// Decoding failures. Only byte streams from outside this crate can
/// trigger these; `decode(encode(doc))` never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated command at offset {0}")]
    Truncated(usize),

    #[error("unknown command byte {byte:#04x} at offset {at}")]
    UnknownCommand { at: usize, byte: u8 },

    #[error("invalid parameter {value:#04x} for {command} at offset {at}")]
    BadParameter {
        command: &'static str,
        at: usize,
        value: u8,
    },

    #[error("text is not valid UTF-8 at offset {0}")]
    InvalidUtf8(usize),
}

/// Decode an ESC/POS subset byte stream into directives.
pub fn decode(bytes: &[u8]) -> Result<Vec<Directive>, DecodeError> {
    let mut directives = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            ESC => {
                let (directive, len) = decode_esc(bytes, pos)?;
                directives.push(directive);
                pos += len;
            }
            GS => {
                let (directive, len) = decode_gs(bytes, pos)?;
                directives.push(directive);
                pos += len;
            }
            LF => {
                // A run of bare terminators is a feed.
                let mut run = 0usize;
                while pos < bytes.len() && bytes[pos] == LF && run < u8::MAX as usize {
                    run += 1;
                    pos += 1;
                }
                directives.push(Directive::FeedLine(run as u8));
            }
            _ => {
                // Text runs until the next terminator or command byte.
                let start = pos;
                while pos < bytes.len() && !matches!(bytes[pos], ESC | GS | LF) {
                    pos += 1;
                }
                let text = std::str::from_utf8(&bytes[start..pos])
                    .map_err(|_| DecodeError::InvalidUtf8(start))?;
                // Consume the terminator; a command byte or EOF may also end
                // the line (unterminated text still decodes).
                if pos < bytes.len() && bytes[pos] == LF {
                    pos += 1;
                }
                directives.push(Directive::TextLine(text.to_string()));
            }
        }
    }

    Ok(directives)
}

fn decode_esc(bytes: &[u8], at: usize) -> Result<(Directive, usize), DecodeError> {
    let Some(&selector) = bytes.get(at + 1) else {
        return Err(DecodeError::Truncated(at));
    };
    match selector {
        b'@' => Ok((Directive::InitPrinter, 2)),
        b'a' => {
            let n = *bytes.get(at + 2).ok_or(DecodeError::Truncated(at))?;
            let alignment = match n {
                0 => Alignment::Left,
                1 => Alignment::Center,
                2 => Alignment::Right,
                other => {
                    return Err(DecodeError::BadParameter {
                        command: "ESC a",
                        at,
                        value: other,
                    })
                }
            };
            Ok((Directive::SetAlign(alignment), 3))
        }
        b'!' => {
            let n = *bytes.get(at + 2).ok_or(DecodeError::Truncated(at))?;
            let size = match n {
                0x00 => TextSize::Normal,
                0x30 => TextSize::Double,
                other => {
                    return Err(DecodeError::BadParameter {
                        command: "ESC !",
                        at,
                        value: other,
                    })
                }
            };
            Ok((Directive::SetSize(size), 3))
        }
        other => Err(DecodeError::UnknownCommand {
            at: at + 1,
            byte: other,
        }),
    }
}

fn decode_gs(bytes: &[u8], at: usize) -> Result<(Directive, usize), DecodeError> {
    let Some(&selector) = bytes.get(at + 1) else {
        return Err(DecodeError::Truncated(at));
    };
    match selector {
        b'V' => {
            let n = *bytes.get(at + 2).ok_or(DecodeError::Truncated(at))?;
            if n != 0x00 {
                return Err(DecodeError::BadParameter {
                    command: "GS V",
                    at,
                    value: n,
                });
            }
            Ok((Directive::Cut, 3))
        }
        other => Err(DecodeError::UnknownCommand {
            at: at + 1,
            byte: other,
        }),
    }
}
