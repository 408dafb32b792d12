//! Live field templates for one CNAB line.
//!
//! A [`Template`] is the mutable instantiation of an ordered field layout
//! for one concrete block line. It is loaded once at block construction
//! and never re-loaded; callers (or the decoder) set values by field name.

use crate::error::{CnabError, Result};
use crate::field::{decode_field, encode_field, FieldData, FieldSpec};

/// One field slot: the immutable spec plus the current value.
#[derive(Debug, Clone)]
pub struct FieldValue {
    /// Layout description for this field.
    pub spec: FieldSpec,
    /// Current value, if any. `None` renders as filler in lenient mode
    /// and fails strict rendering.
    pub value: Option<FieldData>,
}

/// Ordered `name → value` mapping for one line of a CNAB block.
#[derive(Debug, Clone)]
pub struct Template {
    /// Layout identifier this template was loaded from, kept for error context.
    layout: String,
    fields: Vec<FieldValue>,
}

impl Template {
    /// Instantiates a template from an ordered spec list, preloading any
    /// declared defaults.
    pub fn from_specs(layout: &str, specs: &[FieldSpec]) -> Self {
        Template {
            layout: layout.to_string(),
            fields: specs
                .iter()
                .map(|spec| FieldValue {
                    spec: spec.clone(),
                    value: spec.default.clone(),
                })
                .collect(),
        }
    }

    /// Layout identifier this template was loaded from.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// `true` if the layout declared no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total line width: the sum of all field widths.
    pub fn width(&self) -> usize {
        self.fields.iter().map(|f| f.spec.width).sum()
    }

    /// All field slots in layout order.
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.iter_mut().find(|f| f.spec.name == name)
    }

    /// Returns the current value of a field, or `None` if the field is
    /// unset or not declared by this layout.
    pub fn get(&self, name: &str) -> Option<&FieldData> {
        self.fields
            .iter()
            .find(|f| f.spec.name == name)
            .and_then(|f| f.value.as_ref())
    }

    /// Sets a field by name.
    ///
    /// Fails with [`CnabError::SchemaFieldAbsent`] if the layout does not
    /// declare the field.
    pub fn set(&mut self, name: &str, value: impl Into<FieldData>) -> Result<()> {
        let layout = self.layout.clone();
        match self.find_mut(name) {
            Some(field) => {
                field.value = Some(value.into());
                Ok(())
            }
            None => Err(CnabError::SchemaFieldAbsent {
                layout,
                field: name.to_string(),
            }),
        }
    }

    /// Reads a field as an integer for aggregate maintenance.
    ///
    /// Fails with [`CnabError::SchemaFieldAbsent`] if the layout does not
    /// declare the field. An unset field (or a text value) reads as 0, so
    /// aggregates can be recomputed over partially populated records.
    pub fn num(&self, name: &str) -> Result<i64> {
        let field = self
            .fields
            .iter()
            .find(|f| f.spec.name == name)
            .ok_or_else(|| CnabError::SchemaFieldAbsent {
                layout: self.layout.clone(),
                field: name.to_string(),
            })?;
        Ok(match field.value {
            Some(FieldData::Num(n)) => n,
            _ => 0,
        })
    }

    /// Encodes the template into one fixed-width line (without terminator).
    pub fn encode(&self, strict: bool) -> Result<String> {
        let mut line = String::with_capacity(self.width());
        for field in &self.fields {
            line.push_str(&encode_field(&field.spec, field.value.as_ref(), strict)?);
        }
        Ok(line)
    }

    /// Decodes one raw line into this template, slicing each field at
    /// `[offset, offset + width)`. `line_no` is carried for error context.
    pub fn decode_line(&mut self, line: &str, line_no: usize) -> Result<()> {
        for field in &mut self.fields {
            let start = field.spec.offset;
            let end = start + field.spec.width;
            let slice = line.get(start..end).ok_or_else(|| CnabError::MalformedStructure {
                line: line_no,
                reason: format!(
                    "line is {} chars, field `{}` needs {}..{}",
                    line.len(),
                    field.spec.name,
                    start,
                    end
                ),
            })?;
            field.value = Some(decode_field(&field.spec, slice, line_no)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    fn specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec {
                name: "banco".to_string(),
                offset: 0,
                width: 3,
                kind: FieldKind::Num,
                default: Some(FieldData::Num(341)),
            },
            FieldSpec {
                name: "valor".to_string(),
                offset: 3,
                width: 5,
                kind: FieldKind::Num,
                default: None,
            },
            FieldSpec {
                name: "nome".to_string(),
                offset: 8,
                width: 6,
                kind: FieldKind::Text,
                default: None,
            },
        ]
    }

    #[test]
    fn test_defaults_preloaded_at_construction() {
        let t = Template::from_specs("teste", &specs());
        assert_eq!(t.get("banco"), Some(&FieldData::Num(341)));
        assert_eq!(t.get("valor"), None);
    }

    #[test]
    fn test_set_and_get_by_name() {
        let mut t = Template::from_specs("teste", &specs());
        t.set("valor", 350i64).unwrap();
        t.set("nome", "MARIA").unwrap();
        assert_eq!(t.get("valor"), Some(&FieldData::Num(350)));
        assert_eq!(t.get("nome"), Some(&FieldData::Text("MARIA".to_string())));
    }

    #[test]
    fn test_set_unknown_field_fails() {
        let mut t = Template::from_specs("teste", &specs());
        let err = t.set("inexistente", 1i64).unwrap_err();
        match err {
            CnabError::SchemaFieldAbsent { layout, field } => {
                assert_eq!(layout, "teste");
                assert_eq!(field, "inexistente");
            }
            other => panic!("expected SchemaFieldAbsent, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_concatenates_in_layout_order() {
        let mut t = Template::from_specs("teste", &specs());
        t.set("valor", 42i64).unwrap();
        t.set("nome", "ANA").unwrap();
        assert_eq!(t.encode(true).unwrap(), "34100042ANA   ");
    }

    #[test]
    fn test_strict_encode_fails_on_unset_field() {
        let t = Template::from_specs("teste", &specs());
        assert!(matches!(
            t.encode(true),
            Err(CnabError::MissingValue { .. })
        ));
    }

    #[test]
    fn test_lenient_encode_fills_unset_fields() {
        let t = Template::from_specs("teste", &specs());
        assert_eq!(t.encode(false).unwrap(), "341???????????");
        assert_eq!(t.encode(false).unwrap().len(), t.width());
    }

    #[test]
    fn test_decode_line_round_trips() {
        let mut t = Template::from_specs("teste", &specs());
        t.decode_line("34100350JOSE  ", 1).unwrap();
        assert_eq!(t.get("valor"), Some(&FieldData::Num(350)));
        assert_eq!(t.get("nome"), Some(&FieldData::Text("JOSE  ".to_string())));
        assert_eq!(t.encode(true).unwrap(), "34100350JOSE  ");
    }

    #[test]
    fn test_decode_short_line_fails() {
        let mut t = Template::from_specs("teste", &specs());
        let err = t.decode_line("341003", 7).unwrap_err();
        assert!(matches!(err, CnabError::MalformedStructure { line: 7, .. }));
    }

    #[test]
    fn test_num_reads_zero_for_unset() {
        let t = Template::from_specs("teste", &specs());
        assert_eq!(t.num("valor").unwrap(), 0);
        assert!(t.num("inexistente").is_err());
    }
}
