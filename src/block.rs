//! Block model: records, batches and files, plus the `add` protocol that
//! keeps aggregate trailer fields consistent.
//!
//! A CNAB file is three levels deep: the file holds batches, a batch holds
//! detail records, and both bounded levels carry a header and trailer line.
//! Containers are append-only; every `add` recomputes the container's
//! aggregates from scratch over the full child sequence, so recomputation
//! is idempotent and order-independent.
//!
//! Aggregate refresh does not cascade upward: a file's totals only change
//! when the file itself receives an `add` call. Callers that mutate a
//! batch already inside a file control the refresh timing through the next
//! `add` on the file.

use crate::error::{CnabError, Result};
use crate::schema::{SchemaProvider, Segment};
use crate::template::Template;

/// Line terminator applied uniformly to rendered output.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Line terminator applied uniformly to rendered output.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Batch code field, stamped with the batch's 1-based position in the file.
pub const BATCH_CODE: &str = "codigo_lote";
/// Record sequence field, 1-based among payment-bearing siblings.
pub const RECORD_SEQUENCE: &str = "numero_registro";
/// Batch/file trailer field counting structural lines (children + 2).
pub const RECORD_COUNT: &str = "total_qtd_registros";
/// Batch trailer field summing payment values over segment A records.
pub const PAYMENT_TOTAL: &str = "total_valor_pagtos";
/// File trailer field counting attached batches.
pub const BATCH_COUNT: &str = "total_qtd_lotes";
/// Payment value field on a detail record.
pub const PAYMENT_VALUE: &str = "valor_pagamento";

/// A leaf detail record: one template, one line, no children.
#[derive(Debug, Clone)]
pub struct Record {
    layout: String,
    segment: Segment,
    content: Template,
}

impl Record {
    /// Loads a record from its layout.
    pub fn new(provider: &dyn SchemaProvider, layout_id: &str) -> Result<Self> {
        let (specs, segment) = provider.record_layout(layout_id)?;
        Ok(Record {
            layout: layout_id.to_string(),
            segment,
            content: Template::from_specs(layout_id, specs),
        })
    }

    /// Layout identifier this record was constructed from.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Segment tag of this record.
    pub fn segment(&self) -> Segment {
        self.segment
    }

    /// `true` if this record carries a payment value.
    pub fn is_payment(&self) -> bool {
        self.segment.is_payment()
    }

    /// The record's single content template.
    pub fn content(&self) -> &Template {
        &self.content
    }

    /// Mutable access to the content template for field population.
    pub fn content_mut(&mut self) -> &mut Template {
        &mut self.content
    }

    /// Renders the record as one terminated line.
    pub fn render(&self, strict: bool) -> Result<String> {
        Ok(self.content.encode(strict)? + LINE_ENDING)
    }
}

/// A batch of detail records bounded by a header and trailer line.
#[derive(Debug, Clone)]
pub struct Batch {
    layout: String,
    header: Template,
    trailer: Template,
    records: Vec<Record>,
}

impl Batch {
    /// Loads an empty batch from its container layout.
    pub fn new(provider: &dyn SchemaProvider, layout_id: &str) -> Result<Self> {
        let (header, trailer) = provider.container_layout(layout_id)?;
        Ok(Batch {
            layout: layout_id.to_string(),
            header: Template::from_specs(layout_id, header),
            trailer: Template::from_specs(layout_id, trailer),
            records: Vec::new(),
        })
    }

    /// Layout identifier this batch was constructed from.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Header template.
    pub fn header(&self) -> &Template {
        &self.header
    }

    /// Mutable header template.
    pub fn header_mut(&mut self) -> &mut Template {
        &mut self.header
    }

    /// Trailer template.
    pub fn trailer(&self) -> &Template {
        &self.trailer
    }

    /// Mutable trailer template.
    pub fn trailer_mut(&mut self) -> &mut Template {
        &mut self.trailer
    }

    /// Records attached so far, in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access to attached records. The batch's aggregates do not
    /// refresh when a record changes; they refresh on the batch's next `add`.
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    fn ensure_enclosed(&self) -> Result<()> {
        if self.header.is_empty() || self.trailer.is_empty() {
            return Err(CnabError::MissingHeaderOrTrailer {
                layout: self.layout.clone(),
            });
        }
        Ok(())
    }

    /// Appends a record and refreshes the batch's derived fields.
    ///
    /// Sets the record's sequence number (1-based among payment-bearing
    /// records; auxiliary records carry the number of the payment they
    /// follow), stamps the batch code, and recomputes the trailer's record
    /// count and payment total over the full record list.
    pub fn add(&mut self, record: Record) -> Result<()> {
        self.ensure_enclosed()?;
        self.records.push(record);
        self.renumber()?;
        self.recompute_trailer()
    }

    /// Rewrites sequence numbers and batch codes on every record. The
    /// batch code is provisional until the batch lands in a file, which
    /// stamps the final 1-based position.
    fn renumber(&mut self) -> Result<()> {
        let code = self.header.num(BATCH_CODE)?;
        let mut sequence = 0i64;
        for record in &mut self.records {
            if record.is_payment() {
                sequence += 1;
            }
            record.content.set(RECORD_SEQUENCE, sequence)?;
            record.content.set(BATCH_CODE, code)?;
        }
        Ok(())
    }

    /// Recomputes the trailer aggregates from scratch: record count is the
    /// number of detail lines plus 2 for the header and trailer, and the
    /// payment total sums `valor_pagamento` over payment-bearing records.
    fn recompute_trailer(&mut self) -> Result<()> {
        let mut total = 0i64;
        for record in &self.records {
            if record.is_payment() {
                total += record.content.num(PAYMENT_VALUE)?;
            }
        }
        self.trailer.set(RECORD_COUNT, self.records.len() as i64 + 2)?;
        self.trailer.set(PAYMENT_TOTAL, total)
    }

    /// Stamps the batch's 1-based file position onto its header, trailer
    /// and every record. Called by the owning file's `add`.
    fn stamp_batch_code(&mut self, code: i64) -> Result<()> {
        self.header.set(BATCH_CODE, code)?;
        self.trailer.set(BATCH_CODE, code)?;
        for record in &mut self.records {
            record.content.set(BATCH_CODE, code)?;
        }
        Ok(())
    }

    /// Structural line count recorded in the trailer (records + 2).
    pub fn record_count(&self) -> Result<i64> {
        self.trailer.num(RECORD_COUNT)
    }

    /// Renders header, records and trailer as terminated lines.
    pub fn render(&self, strict: bool) -> Result<String> {
        let mut out = self.header.encode(strict)?;
        out.push_str(LINE_ENDING);
        for record in &self.records {
            out.push_str(&record.render(strict)?);
        }
        out.push_str(&self.trailer.encode(strict)?);
        out.push_str(LINE_ENDING);
        Ok(out)
    }
}

/// A remessa file: batches bounded by a file header and trailer line.
#[derive(Debug, Clone)]
pub struct CnabFile {
    layout: String,
    header: Template,
    trailer: Template,
    batches: Vec<Batch>,
}

impl CnabFile {
    /// Loads an empty file from its container layout.
    pub fn new(provider: &dyn SchemaProvider, layout_id: &str) -> Result<Self> {
        let (header, trailer) = provider.container_layout(layout_id)?;
        Ok(CnabFile {
            layout: layout_id.to_string(),
            header: Template::from_specs(layout_id, header),
            trailer: Template::from_specs(layout_id, trailer),
            batches: Vec::new(),
        })
    }

    /// Layout identifier this file was constructed from.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Header template.
    pub fn header(&self) -> &Template {
        &self.header
    }

    /// Mutable header template.
    pub fn header_mut(&mut self) -> &mut Template {
        &mut self.header
    }

    /// Trailer template.
    pub fn trailer(&self) -> &Template {
        &self.trailer
    }

    /// Mutable trailer template.
    pub fn trailer_mut(&mut self) -> &mut Template {
        &mut self.trailer
    }

    /// Batches attached so far, in insertion order.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Mutable access to attached batches. The file's own aggregates do
    /// not refresh when an inner batch changes; they refresh on the file's
    /// next `add`.
    pub fn batches_mut(&mut self) -> &mut [Batch] {
        &mut self.batches
    }

    fn ensure_enclosed(&self) -> Result<()> {
        if self.header.is_empty() || self.trailer.is_empty() {
            return Err(CnabError::MissingHeaderOrTrailer {
                layout: self.layout.clone(),
            });
        }
        Ok(())
    }

    /// Appends a batch and refreshes the file's derived fields.
    ///
    /// Every attached batch is stamped with its 1-based position as the
    /// batch code (header, trailer and all records), then the file trailer
    /// totals are recomputed from scratch.
    pub fn add(&mut self, batch: Batch) -> Result<()> {
        self.ensure_enclosed()?;
        self.batches.push(batch);
        for (index, batch) in self.batches.iter_mut().enumerate() {
            batch.stamp_batch_code(index as i64 + 1)?;
        }
        self.recompute_trailer()
    }

    /// Recomputes the trailer aggregates: batch count, and total line
    /// count as 2 plus each batch's own (already correct) record count.
    fn recompute_trailer(&mut self) -> Result<()> {
        let mut lines = 2i64;
        for batch in &self.batches {
            lines += batch.record_count()?;
        }
        self.trailer.set(BATCH_COUNT, self.batches.len() as i64)?;
        self.trailer.set(RECORD_COUNT, lines)
    }

    /// Renders the whole file: header, each batch, trailer, one terminated
    /// fixed-width line each, depth-first.
    pub fn render(&self, strict: bool) -> Result<String> {
        let mut out = self.header.encode(strict)?;
        out.push_str(LINE_ENDING);
        for batch in &self.batches {
            out.push_str(&batch.render(strict)?);
        }
        out.push_str(&self.trailer.encode(strict)?);
        out.push_str(LINE_ENDING);
        Ok(out)
    }
}

/// Block shape selector for generic construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Leaf detail record.
    Record,
    /// Batch container.
    Batch,
    /// File container.
    File,
}

/// Tagged-variant surface over the three block shapes.
///
/// Layout identifiers never select behavior; every variant runs the same
/// generic codec driven by the loaded field specs.
#[derive(Debug, Clone)]
pub enum Block {
    /// Leaf detail record.
    Record(Record),
    /// Batch of records.
    Batch(Batch),
    /// Whole remessa file.
    File(CnabFile),
}

impl Block {
    /// Constructs a block of the requested shape from a layout identifier.
    pub fn construct(
        provider: &dyn SchemaProvider,
        layout_id: &str,
        shape: Shape,
    ) -> Result<Self> {
        match shape {
            Shape::Record => Record::new(provider, layout_id).map(Block::Record),
            Shape::Batch => Batch::new(provider, layout_id).map(Block::Batch),
            Shape::File => CnabFile::new(provider, layout_id).map(Block::File),
        }
    }

    /// Shape of this block.
    pub fn shape(&self) -> Shape {
        match self {
            Block::Record(_) => Shape::Record,
            Block::Batch(_) => Shape::Batch,
            Block::File(_) => Shape::File,
        }
    }

    fn shape_name(&self) -> &'static str {
        match self {
            Block::Record(_) => "record",
            Block::Batch(_) => "batch",
            Block::File(_) => "file",
        }
    }

    /// Appends a child block.
    ///
    /// Records accept no children at all; containers accept only the child
    /// shape one level below them. Anything else is a caller logic error.
    pub fn add(&mut self, child: Block) -> Result<()> {
        match (self, child) {
            (Block::Batch(batch), Block::Record(record)) => batch.add(record),
            (Block::File(file), Block::Batch(batch)) => file.add(batch),
            (parent @ Block::Record(_), _) => Err(CnabError::OperationNotSupported {
                operation: "add",
                shape: parent.shape_name(),
            }),
            (parent, child) => Err(CnabError::OperationNotSupported {
                operation: match child {
                    Block::Record(_) => "add(record)",
                    Block::Batch(_) => "add(batch)",
                    Block::File(_) => "add(file)",
                },
                shape: parent.shape_name(),
            }),
        }
    }

    /// Renders the block and everything below it.
    pub fn render(&self, strict: bool) -> Result<String> {
        match self {
            Block::Record(record) => record.render(strict),
            Block::Batch(batch) => batch.render(strict),
            Block::File(file) => file.render(strict),
        }
    }
}
