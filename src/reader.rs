//! Line classification and tree building for reading remessa files.
//!
//! Reading is a single forward pass: split the input into non-blank
//! lines, force the first and last into file header/trailer, and walk the
//! interior with a per-batch state machine (`AwaitHeader` →
//! `AwaitRecordOrTrailer` → closed). Every line decodes against the
//! layout for its detected role.

use crate::block::{Batch, CnabFile, Record};
use crate::error::{CnabError, Result};
use crate::schema::{LayoutSet, SchemaProvider};
use log::debug;

/// Byte index of the record-type discriminator within a line.
pub const DISCRIMINATOR_INDEX: usize = 7;

/// Minimum non-blank lines in a viable file: file header, batch header,
/// one record, batch trailer, file trailer.
pub const MIN_LINES: usize = 5;

/// Structural role of one line, as detected from its discriminator byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// File header (record type 0).
    FileHeader,
    /// File trailer (record type 9).
    FileTrailer,
    /// Batch header (record type 1).
    BatchHeader,
    /// Batch trailer (record type 5).
    BatchTrailer,
    /// Detail record (record type 3).
    DetailRecord,
}

/// Classifies a line by its discriminator byte.
///
/// Returns `None` for lines too short to carry a discriminator or with an
/// unknown record type. The first and last physical lines of a file are
/// always treated as file header/trailer by the builder regardless of
/// what this returns.
pub fn classify(line: &str) -> Option<LineRole> {
    match line.as_bytes().get(DISCRIMINATOR_INDEX)? {
        b'0' => Some(LineRole::FileHeader),
        b'1' => Some(LineRole::BatchHeader),
        b'3' => Some(LineRole::DetailRecord),
        b'5' => Some(LineRole::BatchTrailer),
        b'9' => Some(LineRole::FileTrailer),
        _ => None,
    }
}

/// Reconstructs a [`CnabFile`] from raw text against a fixed layout set.
pub struct CnabReader<'a> {
    provider: &'a dyn SchemaProvider,
    layouts: LayoutSet,
}

impl<'a> CnabReader<'a> {
    /// Creates a reader decoding against the given provider and layouts.
    pub fn new(provider: &'a dyn SchemaProvider, layouts: LayoutSet) -> Self {
        CnabReader { provider, layouts }
    }

    /// Parses raw text into a fully populated file tree.
    ///
    /// Blank and whitespace-only lines are skipped. Batches and records
    /// are attached through the normal `add` protocol, so position fields
    /// are re-stamped; trailer lines are decoded after the adds they
    /// bound, so decoded aggregate values win over recomputed ones. No
    /// check is made that the two agree; round-trip validation is the
    /// caller's affair. A failed parse must not be treated as a valid
    /// partial tree.
    pub fn parse(&self, input: &str) -> Result<CnabFile> {
        let lines: Vec<(usize, &str)> = input
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        if lines.len() < MIN_LINES {
            return Err(CnabError::TooFewLines { found: lines.len() });
        }

        let mut file = CnabFile::new(self.provider, &self.layouts.file)?;
        let (first_no, first) = lines[0];
        file.header_mut().decode_line(first, first_no)?;

        let interior = &lines[1..lines.len() - 1];
        let mut index = 0;
        while index < interior.len() {
            let (line_no, line) = interior[index];
            match classify(line) {
                Some(LineRole::BatchHeader) => {}
                Some(LineRole::DetailRecord) => {
                    return Err(CnabError::MalformedStructure {
                        line: line_no,
                        reason: "detail record before any batch header".to_string(),
                    })
                }
                _ => {
                    return Err(CnabError::MalformedStructure {
                        line: line_no,
                        reason: "expected a batch header".to_string(),
                    })
                }
            }

            let mut batch = Batch::new(self.provider, &self.layouts.batch)?;
            batch.header_mut().decode_line(line, line_no)?;
            index += 1;

            // AwaitRecordOrTrailer until the batch trailer closes the batch
            loop {
                let Some(&(line_no, line)) = interior.get(index) else {
                    let (last_no, _) = interior[interior.len() - 1];
                    return Err(CnabError::MalformedStructure {
                        line: last_no,
                        reason: "batch was never closed by a batch trailer".to_string(),
                    });
                };
                match classify(line) {
                    Some(LineRole::DetailRecord) => {
                        let mut record = Record::new(self.provider, &self.layouts.record)?;
                        record.content_mut().decode_line(line, line_no)?;
                        batch.add(record)?;
                        index += 1;
                    }
                    Some(LineRole::BatchTrailer) => {
                        batch.trailer_mut().decode_line(line, line_no)?;
                        file.add(batch)?;
                        index += 1;
                        break;
                    }
                    _ => {
                        return Err(CnabError::MalformedStructure {
                            line: line_no,
                            reason: "expected a detail record or batch trailer".to_string(),
                        })
                    }
                }
            }
        }

        let (last_no, last) = lines[lines.len() - 1];
        file.trailer_mut().decode_line(last, last_no)?;

        debug!(
            "parsed file: {} batches, {} non-blank lines",
            file.batches().len(),
            lines.len()
        );
        Ok(file)
    }
}
