//! Fixed-width field codec.
//!
//! A CNAB line is a plain concatenation of fixed-width fields with no
//! delimiters. Numeric fields are left-padded with `'0'`, text fields are
//! right-padded with spaces, and oversized values are truncated to the
//! declared width (with a warning, since truncating a monetary value
//! silently changes it).

use crate::error::{CnabError, Result};
use log::warn;
use serde::Deserialize;
use std::fmt;

/// Filler character used by lenient rendering for fields with no value.
///
/// A run of `?` makes missing fields easy to spot in a debugging render
/// while keeping every line at its declared width.
pub const FILLER: char = '?';

/// The two FEBRABAN field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Digits only; left-padded with `'0'` on encode, parsed as an integer
    /// on decode.
    Num,
    /// Free text; right-padded with spaces on encode, kept verbatim
    /// (including trailing pad) on decode.
    Text,
}

/// Immutable description of one fixed-width field within a line layout.
///
/// Order within the layout is significant: it defines the encode
/// concatenation order and the decode slicing order. `offset` is the
/// field's position within its own line, starting at 0.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    /// Field name, unique within its layout.
    pub name: String,

    /// Byte offset of the field within the line.
    #[serde(default)]
    pub offset: usize,

    /// Field width in characters; always greater than zero.
    pub width: usize,

    /// Numeric or text treatment for padding and parsing.
    pub kind: FieldKind,

    /// Optional preloaded value (bank constants, record type discriminators,
    /// blank filler). Populated into the template at block construction.
    #[serde(default)]
    pub default: Option<FieldData>,
}

/// A typed field value.
///
/// Numeric fields hold an `i64`, which covers the 18-digit totals used by
/// the 240-byte layouts. Values are re-measured against the field width at
/// encode time, never before.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldData {
    /// Integer value for a `num` field.
    Num(i64),
    /// Text value for a `text` field.
    Text(String),
}

impl fmt::Display for FieldData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldData::Num(n) => write!(f, "{}", n),
            FieldData::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for FieldData {
    fn from(value: i64) -> Self {
        FieldData::Num(value)
    }
}

impl From<&str> for FieldData {
    fn from(value: &str) -> Self {
        FieldData::Text(value.to_string())
    }
}

impl From<String> for FieldData {
    fn from(value: String) -> Self {
        FieldData::Text(value)
    }
}

/// Encodes one field value to exactly `spec.width` characters.
///
/// A missing value fails with [`CnabError::MissingValue`] in strict mode
/// and renders as a run of [`FILLER`] otherwise. Values longer than the
/// width are truncated to the first `width` characters. Numeric fields
/// are unsigned in this format; a negative value fails with
/// [`CnabError::InvalidValue`] since its rendered form could never decode
/// back.
pub fn encode_field(spec: &FieldSpec, value: Option<&FieldData>, strict: bool) -> Result<String> {
    if let Some(FieldData::Num(n)) = value {
        if *n < 0 {
            return Err(CnabError::InvalidValue {
                field: spec.name.clone(),
                value: n.to_string(),
            });
        }
    }

    let raw = match value {
        Some(v) => v.to_string(),
        None if strict => {
            return Err(CnabError::MissingValue {
                field: spec.name.clone(),
            })
        }
        None => return Ok(FILLER.to_string().repeat(spec.width)),
    };

    let len = raw.chars().count();
    if len > spec.width {
        warn!(
            "field `{}`: value `{}` exceeds width {}, truncating",
            spec.name, raw, spec.width
        );
        return Ok(raw.chars().take(spec.width).collect());
    }

    Ok(match spec.kind {
        FieldKind::Num => format!("{:0>width$}", raw, width = spec.width),
        FieldKind::Text => format!("{:<width$}", raw, width = spec.width),
    })
}

/// Decodes one field from its raw slice of a line.
///
/// Numeric slices must be all digits; text slices are kept verbatim so
/// that re-encoding reproduces the input byte for byte. `line_no` is only
/// used for error context.
pub fn decode_field(spec: &FieldSpec, slice: &str, line_no: usize) -> Result<FieldData> {
    match spec.kind {
        FieldKind::Num => {
            if slice.is_empty() || !slice.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CnabError::TypeMismatch {
                    line: line_no,
                    field: spec.name.clone(),
                    found: slice.to_string(),
                });
            }
            let parsed = slice.parse::<i64>().map_err(|_| CnabError::TypeMismatch {
                line: line_no,
                field: spec.name.clone(),
                found: slice.to_string(),
            })?;
            Ok(FieldData::Num(parsed))
        }
        FieldKind::Text => Ok(FieldData::Text(slice.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, width: usize, kind: FieldKind) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            offset: 0,
            width,
            kind,
            default: None,
        }
    }

    #[test]
    fn test_numeric_left_pads_with_zeros() {
        let s = spec("valor", 5, FieldKind::Num);
        let out = encode_field(&s, Some(&FieldData::Num(7)), true).unwrap();
        assert_eq!(out, "00007");
    }

    #[test]
    fn test_text_right_pads_with_spaces() {
        let s = spec("nome", 5, FieldKind::Text);
        let out = encode_field(&s, Some(&FieldData::Text("AB".to_string())), true).unwrap();
        assert_eq!(out, "AB   ");
    }

    #[test]
    fn test_width_postcondition_holds_for_all_lengths() {
        for (value, width) in [("A", 5), ("ABCDE", 5), ("ABCDEFGH", 5)] {
            let s = spec("campo", width, FieldKind::Text);
            let out = encode_field(&s, Some(&FieldData::Text(value.to_string())), true).unwrap();
            assert_eq!(out.chars().count(), width);
        }
    }

    #[test]
    fn test_oversized_value_truncates_silently() {
        let s = spec("valor", 3, FieldKind::Num);
        let out = encode_field(&s, Some(&FieldData::Num(123456)), true).unwrap();
        assert_eq!(out, "123");
    }

    #[test]
    fn test_negative_numeric_value_rejected() {
        let s = spec("valor", 5, FieldKind::Num);
        let err = encode_field(&s, Some(&FieldData::Num(-5)), true).unwrap_err();
        match err {
            CnabError::InvalidValue { field, value } => {
                assert_eq!(field, "valor");
                assert_eq!(value, "-5");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
        // lenient mode rejects it too; only missing values are softened
        assert!(encode_field(&s, Some(&FieldData::Num(-5)), false).is_err());
    }

    #[test]
    fn test_missing_value_strict_fails() {
        let s = spec("valor", 4, FieldKind::Num);
        let err = encode_field(&s, None, true).unwrap_err();
        assert!(matches!(err, CnabError::MissingValue { field } if field == "valor"));
    }

    #[test]
    fn test_missing_value_lenient_fills() {
        let s = spec("valor", 4, FieldKind::Num);
        let out = encode_field(&s, None, false).unwrap();
        assert_eq!(out, "????");
    }

    #[test]
    fn test_decode_numeric() {
        let s = spec("valor", 5, FieldKind::Num);
        assert_eq!(decode_field(&s, "00350", 1).unwrap(), FieldData::Num(350));
    }

    #[test]
    fn test_decode_numeric_rejects_non_digits() {
        let s = spec("valor", 5, FieldKind::Num);
        let err = decode_field(&s, "00a50", 3).unwrap_err();
        match err {
            CnabError::TypeMismatch { line, field, found } => {
                assert_eq!(line, 3);
                assert_eq!(field, "valor");
                assert_eq!(found, "00a50");
            }
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_text_keeps_trailing_pad() {
        let s = spec("nome", 5, FieldKind::Text);
        let decoded = decode_field(&s, "AB   ", 1).unwrap();
        assert_eq!(decoded, FieldData::Text("AB   ".to_string()));
    }

    #[test]
    fn test_filler_run_fails_numeric_decode() {
        let s = spec("valor", 4, FieldKind::Num);
        assert!(decode_field(&s, "????", 1).is_err());
    }
}
