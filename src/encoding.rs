//! Text encoding detection for MML files
//!
//! MML files for MGSC are mostly Shift_JIS, but files edited on modern
//! systems arrive as UTF-8 or UTF-16. Detection runs the checks in a fixed
//! priority order (UTF-16LE, UTF-16BE, binary, ASCII, ISO-2022-JP, UTF-8,
//! EUC-JP, Shift_JIS); the first that accepts the data wins.
//!
//! MGSC itself only reads Shift_JIS, so text handed to the compiler is
//! encoded with [`encode_shift_jis`]; [`decode_text`] goes the other way
//! for files loaded from disk.

use std::borrow::Cow;

use encoding_rs::{Encoding, EUC_JP, ISO_2022_JP, SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8};
use thiserror::Error;

/// Encodings a TextDecoder can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf16Le,
    Utf16Be,
    Utf8,
    ShiftJis,
    EucJp,
    Iso2022Jp,
}

impl TextEncoding {
    /// Label accepted by the WHATWG TextDecoder
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::ShiftJis => "shift-jis",
            TextEncoding::EucJp => "euc-jp",
            TextEncoding::Iso2022Jp => "iso-2022-jp",
        }
    }

    pub fn codec(self) -> &'static Encoding {
        match self {
            TextEncoding::Utf16Le => UTF_16LE,
            TextEncoding::Utf16Be => UTF_16BE,
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::ShiftJis => SHIFT_JIS,
            TextEncoding::EucJp => EUC_JP,
            TextEncoding::Iso2022Jp => ISO_2022_JP,
        }
    }
}

/// Outcome of [`detect_encoding`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detected {
    Text(TextEncoding),
    /// Pure 7-bit ASCII, decodable as any of the supported encodings
    Ascii,
    /// Not text at all
    Binary,
}

impl Detected {
    pub fn label(self) -> &'static str {
        match self {
            Detected::Text(encoding) => encoding.label(),
            Detected::Ascii => "ascii",
            Detected::Binary => "binary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("{0} is ambiguous. Use utf-16le or utf-16be instead.")]
    Ambiguous(String),
    #[error("Input source is not a text.")]
    NotText,
}

const ESC: u8 = 0x1b;

pub fn detect_encoding(data: &[u8]) -> Option<Detected> {
    if is_utf16le(data) {
        return Some(Detected::Text(TextEncoding::Utf16Le));
    }
    if is_utf16be(data) {
        return Some(Detected::Text(TextEncoding::Utf16Be));
    }
    if is_binary(data) {
        return Some(Detected::Binary);
    }
    if is_ascii(data) {
        return Some(Detected::Ascii);
    }
    if is_jis(data) {
        return Some(Detected::Text(TextEncoding::Iso2022Jp));
    }
    if is_utf8(data) {
        return Some(Detected::Text(TextEncoding::Utf8));
    }
    if is_euc_jp(data) {
        return Some(Detected::Text(TextEncoding::EucJp));
    }
    if is_sjis(data) {
        return Some(Detected::Text(TextEncoding::ShiftJis));
    }
    None
}

/// Parse a user-supplied encoding name.
///
/// Case, `-` and `_` are ignored. Unknown names give `Ok(None)`; a bare
/// `utf16` is rejected because its byte order is unknown.
pub fn parse_encoding_label(text: &str) -> Result<Option<TextEncoding>, EncodingError> {
    let normalized: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect();

    let encoding = match normalized.as_str() {
        "utf16" => return Err(EncodingError::Ambiguous(text.to_string())),
        "utf16le" => TextEncoding::Utf16Le,
        "ucs2" | "utf16be" => TextEncoding::Utf16Be,
        "iso646" | "cp367" | "ascii" | "utf8" => TextEncoding::Utf8,
        "iso2022jp" | "jis" => TextEncoding::Iso2022Jp,
        "eucjp" => TextEncoding::EucJp,
        "sjis" | "shiftjis" | "cp932" | "ms932" => TextEncoding::ShiftJis,
        _ => return Ok(None),
    };
    Ok(Some(encoding))
}

/// Decode file bytes to text.
///
/// Without an explicit `encoding` the data is detected first. Binary data
/// (or an explicit `"binary"`) is rejected; ASCII, undetectable data and
/// unknown labels decode as UTF-8. A byte order mark of the chosen
/// encoding is dropped, as a TextDecoder would.
pub fn decode_text(data: &[u8], encoding: Option<&str>) -> Result<String, EncodingError> {
    let chosen = match encoding {
        Some(label) if label.trim().eq_ignore_ascii_case("binary") => {
            return Err(EncodingError::NotText)
        }
        Some(label) => parse_encoding_label(label)?,
        None => match detect_encoding(data) {
            Some(Detected::Binary) => return Err(EncodingError::NotText),
            Some(Detected::Text(encoding)) => Some(encoding),
            Some(Detected::Ascii) | None => None,
        },
    };

    let codec = chosen.unwrap_or(TextEncoding::Utf8).codec();
    let (text, had_errors) = codec.decode_with_bom_removal(data);
    if had_errors {
        log::warn!("malformed {} input replaced while decoding", codec.name());
    }
    Ok(text.into_owned())
}

/// Encode text as Shift_JIS for the compiler.
///
/// Characters with no Shift_JIS mapping come out as `&#N;` references.
pub fn encode_shift_jis(text: &str) -> Cow<'_, [u8]> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    if had_errors {
        log::warn!("source has characters outside Shift_JIS");
    }
    bytes
}

fn is_utf16le(data: &[u8]) -> bool {
    if data.starts_with(&[0xff, 0xfe]) {
        return true;
    }
    utf16_zero_pattern(data, 1)
}

fn is_utf16be(data: &[u8]) -> bool {
    if data.starts_with(&[0xfe, 0xff]) {
        return true;
    }
    utf16_zero_pattern(data, 0)
}

/// BOM-less UTF-16 guess: NULs only ever sit in the high byte of a code
/// unit (`high` is its offset within the pair), and at least half of the
/// code units are ASCII.
fn utf16_zero_pattern(data: &[u8], high: usize) -> bool {
    if data.len() < 2 || data.len() % 2 != 0 {
        return false;
    }
    let mut zero_high = 0;
    for pair in data.chunks_exact(2) {
        if pair[1 - high] == 0 {
            return false;
        }
        if pair[high] == 0 {
            zero_high += 1;
        }
    }
    zero_high * 2 >= data.len() / 2
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().enumerate().any(|(i, &b)| match b {
        b'\t' | b'\n' | 0x0c | b'\r' | ESC => false,
        // DOS end-of-file marker
        0x1a => i + 1 != data.len(),
        0x00..=0x1f | 0x7f => true,
        _ => false,
    })
}

fn is_ascii(data: &[u8]) -> bool {
    data.iter().all(|&b| b < 0x80 && b != ESC)
}

fn is_jis(data: &[u8]) -> bool {
    if data.iter().any(|&b| b >= 0x80) {
        return false;
    }
    data.windows(3).any(|w| {
        w[0] == ESC
            && matches!(
                (w[1], w[2]),
                (b'$', b'@') | (b'$', b'B') | (b'(', b'B') | (b'(', b'J') | (b'(', b'I') | (b'$', b'(')
            )
    })
}

fn is_utf8(data: &[u8]) -> bool {
    std::str::from_utf8(data).is_ok()
}

fn is_euc_jp(data: &[u8]) -> bool {
    let mut i = 0;
    while i < data.len() {
        let b = data[i];
        if b < 0x80 {
            i += 1;
            continue;
        }
        let width = match b {
            // half-width katakana
            0x8e => match data.get(i + 1) {
                Some(0xa1..=0xdf) => 2,
                _ => return false,
            },
            // JIS X 0212
            0x8f => match (data.get(i + 1), data.get(i + 2)) {
                (Some(0xa1..=0xfe), Some(0xa1..=0xfe)) => 3,
                _ => return false,
            },
            0xa1..=0xfe => match data.get(i + 1) {
                Some(0xa1..=0xfe) => 2,
                _ => return false,
            },
            _ => return false,
        };
        i += width;
    }
    true
}

fn is_sjis(data: &[u8]) -> bool {
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            0x00..=0x7f | 0xa1..=0xdf => i += 1,
            0x81..=0x9f | 0xe0..=0xfc => match data.get(i + 1) {
                Some(0x40..=0x7e) | Some(0x80..=0xfc) => i += 2,
                _ => return false,
            },
            _ => return false,
        }
    }
    true
}
