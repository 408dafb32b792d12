//! Schema provider: layout registries and JSON catalog loading.
//!
//! Field layouts are data, not code. A [`LayoutCatalog`] maps layout
//! identifiers to ordered [`FieldSpec`] lists; the codec and block model
//! are driven entirely by what the catalog returns and never dispatch on
//! the identifier itself. Catalogs can be built programmatically (see the
//! [`crate::layouts`] built-ins) or loaded from a JSON document shaped
//! like the original template files.

use crate::error::{CnabError, Result};
use crate::field::FieldSpec;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

/// Record segment letter, per the FEBRABAN detail-record taxonomy.
///
/// Segment A carries a payment and participates in batch value totals and
/// payment sequencing; segment B is auxiliary data attached to the
/// preceding payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Segment {
    /// Payment-bearing detail record.
    A,
    /// Auxiliary detail record.
    B,
}

impl Segment {
    /// `true` for segments that carry a payment value.
    pub fn is_payment(self) -> bool {
        matches!(self, Segment::A)
    }
}

/// Identifies the three layouts a reader decodes a file against.
#[derive(Debug, Clone)]
pub struct LayoutSet {
    /// Container layout id for the file header/trailer.
    pub file: String,
    /// Container layout id for batch headers/trailers.
    pub batch: String,
    /// Record layout id for detail lines.
    pub record: String,
}

/// Supplies ordered field layouts by identifier.
///
/// Implementations must guarantee field order and offsets as declared;
/// the codec trusts them completely and does not cross-validate
/// `offset + width` monotonicity.
pub trait SchemaProvider {
    /// Header and trailer specs for a container layout.
    fn container_layout(&self, id: &str) -> Result<(&[FieldSpec], &[FieldSpec])>;

    /// Content specs and segment tag for a record layout.
    fn record_layout(&self, id: &str) -> Result<(&[FieldSpec], Segment)>;
}

/// In-memory layout registry.
#[derive(Debug, Default)]
pub struct LayoutCatalog {
    containers: HashMap<String, (Vec<FieldSpec>, Vec<FieldSpec>)>,
    records: HashMap<String, (Vec<FieldSpec>, Segment)>,
}

/// Assigns cumulative offsets in declared order. Layout authors only give
/// widths; the offset of each field is the sum of the widths before it.
fn sequence(mut specs: Vec<FieldSpec>) -> Vec<FieldSpec> {
    let mut offset = 0;
    for spec in &mut specs {
        spec.offset = offset;
        offset += spec.width;
    }
    specs
}

impl LayoutCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a container layout (header + trailer templates).
    pub fn register_container(
        &mut self,
        id: &str,
        header: Vec<FieldSpec>,
        trailer: Vec<FieldSpec>,
    ) {
        self.containers
            .insert(id.to_string(), (sequence(header), sequence(trailer)));
    }

    /// Registers a record layout with its segment tag.
    pub fn register_record(&mut self, id: &str, fields: Vec<FieldSpec>, segment: Segment) {
        self.records
            .insert(id.to_string(), (sequence(fields), segment));
    }

    /// Loads a catalog from a JSON document.
    ///
    /// The document mirrors the original template files: per layout id, an
    /// ordered array of `{name, width, kind, default?}` entries. Offsets
    /// are computed cumulatively from the declared order.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: CatalogDoc = serde_json::from_str(json)?;
        Ok(Self::from_doc(doc))
    }

    /// Loads a catalog from any reader producing the JSON document format.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let doc: CatalogDoc = serde_json::from_reader(reader)?;
        Ok(Self::from_doc(doc))
    }

    fn from_doc(doc: CatalogDoc) -> Self {
        let mut catalog = Self::new();
        for (id, def) in doc.containers {
            catalog.register_container(&id, def.header, def.trailer);
        }
        for (id, def) in doc.records {
            catalog.register_record(&id, def.fields, def.segment);
        }
        catalog
    }
}

impl SchemaProvider for LayoutCatalog {
    fn container_layout(&self, id: &str) -> Result<(&[FieldSpec], &[FieldSpec])> {
        self.containers
            .get(id)
            .map(|(h, t)| (h.as_slice(), t.as_slice()))
            .ok_or_else(|| CnabError::UnknownLayout {
                id: id.to_string(),
                shape: "container",
            })
    }

    fn record_layout(&self, id: &str) -> Result<(&[FieldSpec], Segment)> {
        self.records
            .get(id)
            .map(|(f, s)| (f.as_slice(), *s))
            .ok_or_else(|| CnabError::UnknownLayout {
                id: id.to_string(),
                shape: "record",
            })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    containers: HashMap<String, ContainerDef>,
    #[serde(default)]
    records: HashMap<String, RecordDef>,
}

#[derive(Debug, Deserialize)]
struct ContainerDef {
    header: Vec<FieldSpec>,
    trailer: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
struct RecordDef {
    segment: Segment,
    fields: Vec<FieldSpec>,
}
