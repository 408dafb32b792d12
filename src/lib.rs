//! # CNAB 240 codec
//!
//! Encoder/decoder for CNAB 240 payment batch files (remessa), the
//! fixed-width interchange format specified by FEBRABAN for Brazilian
//! banks.
//!
//! ## Design Principles
//!
//! - **Layouts are data**: field layouts are ordered spec lists loaded
//!   from a [`schema::SchemaProvider`]; no behavior hangs off a layout id
//! - **Append-only containers**: batches and files only grow, and every
//!   `add` recomputes the container's aggregate trailer fields from scratch
//! - **Exact round-trip**: strict render → parse → strict render is
//!   byte-identical for files built through `add`
//!
//! ## Example
//!
//! ```
//! use cnab240::{layouts, Batch, CnabFile, Record};
//!
//! let catalog = layouts::itau();
//! let mut file = CnabFile::new(&catalog, layouts::FILE_LAYOUT).unwrap();
//! let mut batch = Batch::new(&catalog, layouts::BATCH_LAYOUT).unwrap();
//!
//! let mut record = Record::new(&catalog, layouts::RECORD_LAYOUT).unwrap();
//! record.content_mut().set("valor_pagamento", 35000i64).unwrap();
//! batch.add(record).unwrap();
//! file.add(batch).unwrap();
//!
//! // Lenient render fills unset fields with `?` for inspection
//! let text = file.render(false).unwrap();
//! assert_eq!(text.lines().count(), 5);
//! ```

pub mod block;
pub mod error;
pub mod field;
pub mod layouts;
pub mod reader;
pub mod schema;
pub mod template;

pub use block::{Batch, Block, CnabFile, Record, Shape, LINE_ENDING};
pub use error::{CnabError, Result};
pub use field::{FieldData, FieldKind, FieldSpec};
pub use reader::{classify, CnabReader, LineRole};
pub use schema::{LayoutCatalog, LayoutSet, SchemaProvider, Segment};
pub use template::{FieldValue, Template};
