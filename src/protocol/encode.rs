//! # ESC/POS Command Builders
//!
//! One function per control sequence, plus [`encode`] which walks a
//! document and concatenates the sequences. Everything here is
//! deterministic, total and side-effect-free.

use super::{ESC, GS, LF};
use crate::document::{Alignment, Directive, ReceiptDocument, TextSize};

/// # Initialize Printer (ESC @)
///
/// Resets the printer to its power-on default state. Every document
/// starts with this so no formatting leaks in from the previous job.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Set Alignment (ESC a n)
///
/// | Format  | Bytes   |
/// |---------|---------|
/// | ASCII   | ESC a n |
/// | Hex     | 1B 61 n |
///
/// `n` is 0 (left), 1 (center) or 2 (right). Affects subsequent lines
/// until changed; reset by ESC @.
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    let n = match alignment {
        Alignment::Left => 0,
        Alignment::Center => 1,
        Alignment::Right => 2,
    };
    vec![ESC, b'a', n]
}

/// Size byte for ESC ! — double width + double height.
const SIZE_DOUBLE: u8 = 0x30;

/// Size byte for ESC ! — normal 1x1 characters.
const SIZE_NORMAL: u8 = 0x00;

/// # Set Character Size (ESC ! n)
///
/// | Format  | Bytes   |
/// |---------|---------|
/// | ASCII   | ESC ! n |
/// | Hex     | 1B 21 n |
///
/// The fixed layout uses exactly two sizes: `0x00` (normal) and `0x30`
/// (double width and height).
#[inline]
pub fn size(size: TextSize) -> Vec<u8> {
    let n = match size {
        TextSize::Normal => SIZE_NORMAL,
        TextSize::Double => SIZE_DOUBLE,
    };
    vec![ESC, b'!', n]
}

/// # Text Line
///
/// UTF-8 bytes of the text followed by one LF. Characters outside the
/// printer's code page pass through unescaped; charset handling is the
/// composer's concern.
#[inline]
pub fn text_line(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + 1);
    bytes.extend_from_slice(text.as_bytes());
    bytes.push(LF);
    bytes
}

/// # Feed Lines
///
/// `n` bare line terminators.
#[inline]
pub fn feed_line(n: u8) -> Vec<u8> {
    vec![LF; n as usize]
}

/// # Full Cut (GS V 0)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V NUL |
/// | Hex     | 1D 56 00 |
#[inline]
pub fn cut() -> Vec<u8> {
    vec![GS, b'V', 0x00]
}

/// Encode a whole document as one ESC/POS byte stream.
pub fn encode(doc: &ReceiptDocument) -> Vec<u8> {
    let mut out = Vec::new();
    for directive in doc.directives() {
        match directive {
            Directive::InitPrinter => out.extend(init()),
            Directive::SetAlign(a) => out.extend(align(*a)),
            Directive::SetSize(s) => out.extend(size(*s)),
            Directive::TextLine(text) => out.extend(text_line(text)),
            Directive::FeedLine(n) => out.extend(feed_line(*n)),
            Directive::Cut => out.extend(cut()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_align() {
        assert_eq!(align(Alignment::Left), vec![0x1B, 0x61, 0x00]);
        assert_eq!(align(Alignment::Center), vec![0x1B, 0x61, 0x01]);
        assert_eq!(align(Alignment::Right), vec![0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_size() {
        assert_eq!(size(TextSize::Normal), vec![0x1B, 0x21, 0x00]);
        assert_eq!(size(TextSize::Double), vec![0x1B, 0x21, 0x30]);
    }

    #[test]
    fn test_text_line_appends_terminator() {
        assert_eq!(text_line("CMS"), vec![b'C', b'M', b'S', 0x0A]);
        assert_eq!(text_line(""), vec![0x0A]);
    }

    #[test]
    fn test_text_passes_non_ascii_through() {
        // "Çmimi" — passed through as raw UTF-8, no transliteration.
        let bytes = text_line("Ç");
        assert_eq!(bytes, vec![0xC3, 0x87, 0x0A]);
    }

    #[test]
    fn test_feed_line() {
        assert_eq!(feed_line(0), Vec::<u8>::new());
        assert_eq!(feed_line(3), vec![0x0A, 0x0A, 0x0A]);
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut(), vec![0x1D, 0x56, 0x00]);
    }

    #[test]
    fn test_encode_concatenates_in_order() {
        let doc = ReceiptDocument::from_directives(vec![
            Directive::InitPrinter,
            Directive::SetAlign(Alignment::Center),
            Directive::TextLine("hi".to_string()),
            Directive::Cut,
        ]);
        assert_eq!(
            encode(&doc),
            vec![0x1B, 0x40, 0x1B, 0x61, 0x01, b'h', b'i', 0x0A, 0x1D, 0x56, 0x00]
        );
    }
}
