//! # NDEF Tag Decoding
//!
//! Turns the contents of a Norsa card into the card token the backend knows.
//!
//! ## Card Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NDEF message (one or more records)                                     │
//! │                                                                         │
//! │  Record header byte                                                    │
//! │  ┌────┬────┬────┬────┬────┬──────────┐                                  │
//! │  │ MB │ ME │ CF │ SR │ IL │ TNF (3b) │                                  │
//! │  └────┴────┴────┴────┴────┴──────────┘                                  │
//! │  type length │ payload length (1 or 4 bytes) │ [id length]             │
//! │  type │ [id] │ payload                                                 │
//! │                                                                         │
//! │  Norsa cards: TNF = 0x01 (well-known), type = "T" (text)               │
//! │                                                                         │
//! │  Text payload                                                          │
//! │  ┌────────────────────┬───────────────┬──────────────────────┐         │
//! │  │ status             │ language code │ text                 │         │
//! │  │ b7: UTF-16         │ "en"          │ card token           │         │
//! │  │ b0-5: lang length  │               │                      │         │
//! │  └────────────────────┴───────────────┴──────────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding is pure: the same tag always yields the same token or the same
//! error. Malformed input is reported as [`TagError::Parse`], never a panic.

use serde::{Deserialize, Serialize};

use crate::error::TagError;

const FLAG_MB: u8 = 0x80;
const FLAG_ME: u8 = 0x40;
const FLAG_CF: u8 = 0x20;
const FLAG_SR: u8 = 0x10;
const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

const TEXT_UTF16: u8 = 0x80;
const TEXT_LANG_MASK: u8 = 0x3F;

/// Record type of a well-known text record.
pub const RTD_TEXT: &[u8] = b"T";

// =============================================================================
// Types
// =============================================================================

/// Type Name Format of an NDEF record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tnf {
    Empty,
    WellKnown,
    MimeMedia,
    AbsoluteUri,
    External,
    Unknown,
    Unchanged,
    Reserved,
}

impl Tnf {
    fn from_bits(bits: u8) -> Self {
        match bits & TNF_MASK {
            0x00 => Tnf::Empty,
            0x01 => Tnf::WellKnown,
            0x02 => Tnf::MimeMedia,
            0x03 => Tnf::AbsoluteUri,
            0x04 => Tnf::External,
            0x05 => Tnf::Unknown,
            0x06 => Tnf::Unchanged,
            _ => Tnf::Reserved,
        }
    }

    fn bits(&self) -> u8 {
        match self {
            Tnf::Empty => 0x00,
            Tnf::WellKnown => 0x01,
            Tnf::MimeMedia => 0x02,
            Tnf::AbsoluteUri => 0x03,
            Tnf::External => 0x04,
            Tnf::Unknown => 0x05,
            Tnf::Unchanged => 0x06,
            Tnf::Reserved => 0x07,
        }
    }
}

/// One record of an NDEF message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdefRecord {
    pub tnf: Tnf,
    pub record_type: Vec<u8>,
    pub id: Vec<u8>,
    pub payload: Vec<u8>,
}

impl NdefRecord {
    /// True for a well-known text record.
    pub fn is_text(&self) -> bool {
        self.tnf == Tnf::WellKnown && self.record_type == RTD_TEXT
    }

    /// Builds a UTF-8 well-known text record.
    pub fn text(text: &str, language: &str) -> Self {
        let lang = language.as_bytes();
        let lang_len = lang.len().min(TEXT_LANG_MASK as usize);

        let mut payload = Vec::with_capacity(1 + lang_len + text.len());
        payload.push(lang_len as u8);
        payload.extend_from_slice(&lang[..lang_len]);
        payload.extend_from_slice(text.as_bytes());

        NdefRecord {
            tnf: Tnf::WellKnown,
            record_type: RTD_TEXT.to_vec(),
            id: Vec::new(),
            payload,
        }
    }
}

/// A tag as delivered by the NFC radio.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NfcTag {
    /// Hardware UID of the tag.
    pub id: Vec<u8>,
    /// Parsed NDEF records, empty if the tag is not NDEF-formatted.
    pub records: Vec<NdefRecord>,
}

impl NfcTag {
    /// Builds a tag from a raw NDEF message.
    pub fn from_message(id: Vec<u8>, message: &[u8]) -> Result<Self, TagError> {
        Ok(NfcTag {
            id,
            records: parse_message(message)?,
        })
    }

    /// Hex form of the UID for logs.
    pub fn id_hex(&self) -> String {
        self.id.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Extracts the card token from a tag.
///
/// ## Rules
/// - The first well-known text record is used; other records are ignored
/// - No text record → [`TagError::NoTextRecord`]
/// - Text that is empty after trimming → [`TagError::InvalidTagContent`]
/// - The token is returned trimmed
pub fn decode_tag(tag: &NfcTag) -> Result<String, TagError> {
    let record = tag
        .records
        .iter()
        .find(|r| r.is_text())
        .ok_or(TagError::NoTextRecord)?;

    let text = decode_text_payload(&record.payload)?;
    let token = text.trim();

    if token.is_empty() {
        return Err(TagError::InvalidTagContent);
    }

    Ok(token.to_string())
}

/// Parses raw NDEF bytes and extracts the card token.
pub fn decode_message(bytes: &[u8]) -> Result<String, TagError> {
    let records = parse_message(bytes)?;
    decode_tag(&NfcTag {
        id: Vec::new(),
        records,
    })
}

/// Decodes the payload of a well-known text record.
pub fn decode_text_payload(payload: &[u8]) -> Result<String, TagError> {
    let (&status, rest) = payload
        .split_first()
        .ok_or_else(|| TagError::parse("Text record payload is empty"))?;

    let lang_len = (status & TEXT_LANG_MASK) as usize;
    if rest.len() < lang_len {
        return Err(TagError::parse(format!(
            "Text record language code length {} exceeds payload",
            lang_len
        )));
    }
    let text = &rest[lang_len..];

    if status & TEXT_UTF16 != 0 {
        decode_utf16(text)
    } else {
        String::from_utf8(text.to_vec())
            .map_err(|_| TagError::parse("Text record is not valid UTF-8"))
    }
}

fn decode_utf16(bytes: &[u8]) -> Result<String, TagError> {
    if bytes.len() % 2 != 0 {
        return Err(TagError::parse("UTF-16 text record has an odd byte length"));
    }

    let (little_endian, body) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (true, rest),
        [0xFE, 0xFF, rest @ ..] => (false, rest),
        _ => (false, bytes),
    };

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    String::from_utf16(&units).map_err(|_| TagError::parse("Text record is not valid UTF-16"))
}

// =============================================================================
// Message Framing
// =============================================================================

/// Parses an NDEF message into records.
///
/// Chunked records (CF) are rejected: Norsa cards never use them.
pub fn parse_message(bytes: &[u8]) -> Result<Vec<NdefRecord>, TagError> {
    if bytes.is_empty() {
        return Err(TagError::parse("NDEF message is empty"));
    }

    let mut cursor = Cursor { bytes, pos: 0 };
    let mut records = Vec::new();

    loop {
        let header = cursor.take_u8("record header")?;

        if records.is_empty() && header & FLAG_MB == 0 {
            return Err(TagError::parse("First NDEF record is missing the message-begin flag"));
        }
        if header & FLAG_CF != 0 {
            return Err(TagError::parse("Chunked NDEF records are not supported"));
        }

        let type_len = cursor.take_u8("type length")? as usize;
        let payload_len = if header & FLAG_SR != 0 {
            cursor.take_u8("payload length")? as usize
        } else {
            let b = cursor.take(4, "payload length")?;
            u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize
        };
        let id_len = if header & FLAG_IL != 0 {
            cursor.take_u8("id length")? as usize
        } else {
            0
        };

        let record_type = cursor.take(type_len, "record type")?.to_vec();
        let id = cursor.take(id_len, "record id")?.to_vec();
        let payload = cursor.take(payload_len, "record payload")?.to_vec();

        records.push(NdefRecord {
            tnf: Tnf::from_bits(header),
            record_type,
            id,
            payload,
        });

        if header & FLAG_ME != 0 {
            break;
        }
        if cursor.remaining() == 0 {
            return Err(TagError::parse("NDEF message ended without the message-end flag"));
        }
    }

    if cursor.remaining() != 0 {
        return Err(TagError::parse("Trailing bytes after NDEF message end"));
    }

    Ok(records)
}

/// Serialises records into an NDEF message.
///
/// Short-record form is used whenever the payload fits in one length byte.
pub fn encode_message(records: &[NdefRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    let last = records.len().saturating_sub(1);

    for (index, record) in records.iter().enumerate() {
        let short = record.payload.len() <= u8::MAX as usize;
        let mut header = record.tnf.bits();
        if index == 0 {
            header |= FLAG_MB;
        }
        if index == last {
            header |= FLAG_ME;
        }
        if short {
            header |= FLAG_SR;
        }
        if !record.id.is_empty() {
            header |= FLAG_IL;
        }

        out.push(header);
        out.push(record.record_type.len() as u8);
        if short {
            out.push(record.payload.len() as u8);
        } else {
            out.extend_from_slice(&(record.payload.len() as u32).to_be_bytes());
        }
        if !record.id.is_empty() {
            out.push(record.id.len() as u8);
        }
        out.extend_from_slice(&record.record_type);
        out.extend_from_slice(&record.id);
        out.extend_from_slice(&record.payload);
    }

    out
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], TagError> {
        if self.remaining() < len {
            return Err(TagError::parse(format!("NDEF message truncated in {}", what)));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_u8(&mut self, what: &str) -> Result<u8, TagError> {
        Ok(self.take(1, what)?[0])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn text_tag(text: &str) -> NfcTag {
        NfcTag {
            id: vec![0x04, 0xA1, 0xB2, 0xC3],
            records: vec![NdefRecord::text(text, "en")],
        }
    }

    #[test]
    fn test_decode_plain_text_tag() {
        assert_eq!(decode_tag(&text_tag("NRS-000123")).unwrap(), "NRS-000123");
        assert_eq!(decode_tag(&text_tag("  NRS-9 \n")).unwrap(), "NRS-9");
    }

    #[test]
    fn test_decode_is_idempotent() {
        let tag = text_tag("NRS-42");
        assert_eq!(decode_tag(&tag), decode_tag(&tag));

        let garbage = NfcTag {
            id: vec![],
            records: vec![NdefRecord {
                tnf: Tnf::WellKnown,
                record_type: RTD_TEXT.to_vec(),
                id: vec![],
                payload: vec![0x02, b'e'],
            }],
        };
        assert_eq!(decode_tag(&garbage), decode_tag(&garbage));
    }

    #[test]
    fn test_whitespace_text_is_invalid_content() {
        assert_eq!(decode_tag(&text_tag("   ")), Err(TagError::InvalidTagContent));
        assert_eq!(decode_tag(&text_tag("")), Err(TagError::InvalidTagContent));
    }

    #[test]
    fn test_missing_text_record() {
        let uri_only = NfcTag {
            id: vec![1],
            records: vec![NdefRecord {
                tnf: Tnf::WellKnown,
                record_type: b"U".to_vec(),
                id: vec![],
                payload: b"\x04norsa.cw".to_vec(),
            }],
        };
        assert_eq!(decode_tag(&uri_only), Err(TagError::NoTextRecord));
        assert_eq!(decode_tag(&NfcTag::default()), Err(TagError::NoTextRecord));
    }

    #[test]
    fn test_first_text_record_wins() {
        let tag = NfcTag {
            id: vec![],
            records: vec![
                NdefRecord {
                    tnf: Tnf::MimeMedia,
                    record_type: b"text/plain".to_vec(),
                    id: vec![],
                    payload: b"ignored".to_vec(),
                },
                NdefRecord::text("first", "en"),
                NdefRecord::text("second", "en"),
            ],
        };
        assert_eq!(decode_tag(&tag).unwrap(), "first");
    }

    #[test]
    fn test_language_length_overflow_is_parse_error() {
        let result = decode_text_payload(&[0x05, b'e', b'n']);
        assert!(matches!(result, Err(TagError::Parse(_))));
        assert!(matches!(decode_text_payload(&[]), Err(TagError::Parse(_))));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let result = decode_text_payload(&[0x02, b'e', b'n', 0xC3, 0x28]);
        assert!(matches!(result, Err(TagError::Parse(_))));
    }

    #[test]
    fn test_utf16_payloads() {
        let mut be = vec![TEXT_UTF16 | 0x02, b'e', b'n'];
        for unit in "NRS-7".encode_utf16() {
            be.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text_payload(&be).unwrap(), "NRS-7");

        let mut le = vec![TEXT_UTF16 | 0x02, b'e', b'n', 0xFF, 0xFE];
        for unit in "NRS-7".encode_utf16() {
            le.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_text_payload(&le).unwrap(), "NRS-7");

        let odd = vec![TEXT_UTF16, 0x00, 0x41, 0x00];
        assert!(matches!(decode_text_payload(&odd), Err(TagError::Parse(_))));
    }

    #[test]
    fn test_known_wire_bytes() {
        // D1 01 09 54 02 65 6E "NRS-42"
        let bytes = [
            0xD1, 0x01, 0x09, 0x54, 0x02, b'e', b'n', b'N', b'R', b'S', b'-', b'4', b'2',
        ];
        assert_eq!(decode_message(&bytes).unwrap(), "NRS-42");
        assert_eq!(encode_message(&[NdefRecord::text("NRS-42", "en")]), bytes.to_vec());
    }

    #[test]
    fn test_long_record_form() {
        let token = "X".repeat(300);
        let bytes = encode_message(&[NdefRecord::text(&token, "en")]);
        assert_eq!(bytes[0] & FLAG_SR, 0);
        assert_eq!(decode_message(&bytes).unwrap(), token);
    }

    #[test]
    fn test_malformed_framing() {
        assert!(matches!(parse_message(&[]), Err(TagError::Parse(_))));
        // Missing MB
        assert!(matches!(
            parse_message(&[0x51, 0x01, 0x00, 0x54]),
            Err(TagError::Parse(_))
        ));
        // Payload length runs past the end
        assert!(matches!(
            parse_message(&[0xD1, 0x01, 0x20, 0x54, 0x02]),
            Err(TagError::Parse(_))
        ));
        // Chunked
        assert!(matches!(
            parse_message(&[0xF1, 0x01, 0x00, 0x54]),
            Err(TagError::Parse(_))
        ));
        // No ME and nothing left
        assert!(matches!(
            parse_message(&[0x91, 0x01, 0x00, 0x54]),
            Err(TagError::Parse(_))
        ));
        // Trailing bytes
        assert!(matches!(
            parse_message(&[0xD1, 0x01, 0x00, 0x54, 0xAA]),
            Err(TagError::Parse(_))
        ));
    }

    #[test]
    fn test_tag_id_hex() {
        assert_eq!(text_tag("x").id_hex(), "04A1B2C3");
    }
}
