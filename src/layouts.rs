//! Built-in Itaú CNAB 240 remessa layouts.
//!
//! Every line is 240 characters wide and starts with the same three
//! fields: `codigo_banco` (3), `codigo_lote` (4) and `tipo_registro` (1),
//! which puts the record-type discriminator at byte 7 of every line.
//! Record types: 0 file header, 1 batch header, 3 detail record, 5 batch
//! trailer, 9 file trailer.
//!
//! Only the payment batch (TED/PIX/credit-in-account) and the segment A
//! detail record are implemented; boleto batches are a separate layout
//! family.

use crate::field::{FieldData, FieldKind, FieldSpec};
use crate::schema::{LayoutCatalog, LayoutSet, Segment};

/// Container layout id for the Itaú file header/trailer.
pub const FILE_LAYOUT: &str = "itau_240_arquivo";

/// Container layout id for the Itaú payment batch header/trailer.
pub const BATCH_LAYOUT: &str = "itau_240_lote_pagamento";

/// Record layout id for the Itaú segment A detail record.
pub const RECORD_LAYOUT: &str = "itau_240_registro_seg_a";

/// Expected width of every line in this layout family.
pub const LINE_WIDTH: usize = 240;

fn num(name: &str, width: usize) -> FieldSpec {
    FieldSpec {
        name: name.to_string(),
        offset: 0,
        width,
        kind: FieldKind::Num,
        default: None,
    }
}

fn num_d(name: &str, width: usize, default: i64) -> FieldSpec {
    FieldSpec {
        default: Some(FieldData::Num(default)),
        ..num(name, width)
    }
}

fn text(name: &str, width: usize) -> FieldSpec {
    FieldSpec {
        name: name.to_string(),
        offset: 0,
        width,
        kind: FieldKind::Text,
        default: None,
    }
}

fn text_d(name: &str, width: usize, default: &str) -> FieldSpec {
    FieldSpec {
        default: Some(FieldData::Text(default.to_string())),
        ..text(name, width)
    }
}

fn file_header() -> Vec<FieldSpec> {
    vec![
        num_d("codigo_banco", 3, 341),
        num_d("codigo_lote", 4, 0),
        num_d("tipo_registro", 1, 0),
        text_d("brancos_1", 6, ""),
        num_d("layout_arquivo", 3, 81),
        num("empresa_tipo_inscricao", 1),
        num("empresa_numero_inscricao", 14),
        text_d("brancos_2", 20, ""),
        num("agencia", 5),
        text_d("brancos_3", 1, ""),
        num("conta", 12),
        text_d("brancos_4", 1, ""),
        num("dac", 1),
        text("nome_empresa", 30),
        text_d("nome_banco", 30, "BANCO ITAU SA"),
        text_d("brancos_5", 10, ""),
        num_d("codigo_remessa_retorno", 1, 1),
        num("data_geracao", 8),
        num("hora_geracao", 6),
        text_d("brancos_6", 83, ""),
    ]
}

fn file_trailer() -> Vec<FieldSpec> {
    vec![
        num_d("codigo_banco", 3, 341),
        num_d("codigo_lote", 4, 9999),
        num_d("tipo_registro", 1, 9),
        text_d("brancos_1", 9, ""),
        num_d("total_qtd_lotes", 6, 0),
        num_d("total_qtd_registros", 6, 0),
        text_d("brancos_2", 211, ""),
    ]
}

fn batch_header() -> Vec<FieldSpec> {
    vec![
        num_d("codigo_banco", 3, 341),
        num_d("codigo_lote", 4, 0),
        num_d("tipo_registro", 1, 1),
        text_d("tipo_operacao", 1, "C"),
        num("tipo_pagamento", 2),
        num("forma_pagamento", 2),
        num_d("layout_lote", 3, 40),
        text_d("brancos_1", 1, ""),
        num("empresa_tipo_inscricao", 1),
        num("empresa_numero_inscricao", 14),
        text_d("brancos_2", 4, ""),
        num("agencia", 5),
        text_d("brancos_3", 1, ""),
        num("conta", 12),
        text_d("brancos_4", 1, ""),
        num("dac", 1),
        text("nome_empresa", 30),
        text_d("finalidade_lote", 30, ""),
        text_d("historico", 10, ""),
        text_d("endereco", 30, ""),
        num_d("numero", 5, 0),
        text_d("complemento", 15, ""),
        text_d("cidade", 20, ""),
        num_d("cep", 8, 0),
        text_d("estado", 2, ""),
        text_d("brancos_5", 34, ""),
    ]
}

fn batch_trailer() -> Vec<FieldSpec> {
    vec![
        num_d("codigo_banco", 3, 341),
        num_d("codigo_lote", 4, 0),
        num_d("tipo_registro", 1, 5),
        text_d("brancos_1", 9, ""),
        num_d("total_qtd_registros", 6, 0),
        num_d("total_valor_pagtos", 18, 0),
        num_d("qtd_moedas", 18, 0),
        text_d("brancos_2", 181, ""),
    ]
}

fn record_segment_a() -> Vec<FieldSpec> {
    vec![
        num_d("codigo_banco", 3, 341),
        num_d("codigo_lote", 4, 0),
        num_d("tipo_registro", 1, 3),
        num_d("numero_registro", 5, 0),
        text_d("segmento", 1, "A"),
        num_d("tipo_movimento", 3, 0),
        num("camara", 3),
        num("banco_favorecido", 3),
        num("agencia_favorecida", 6),
        num("conta_favorecida", 13),
        text_d("dac_favorecido", 1, ""),
        text("nome_favorecido", 30),
        text("seu_numero", 20),
        num("data_pagamento", 8),
        text_d("moeda", 3, "REA"),
        text_d("brancos_1", 15, ""),
        num("valor_pagamento", 15),
        text_d("nosso_numero", 15, ""),
        text_d("brancos_2", 5, ""),
        num_d("data_efetivacao", 8, 0),
        num_d("valor_efetivacao", 15, 0),
        text_d("informacoes", 40, ""),
        text_d("brancos_3", 23, ""),
    ]
}

/// Builds the catalog of built-in Itaú 240 layouts.
pub fn itau() -> LayoutCatalog {
    let mut catalog = LayoutCatalog::new();
    catalog.register_container(FILE_LAYOUT, file_header(), file_trailer());
    catalog.register_container(BATCH_LAYOUT, batch_header(), batch_trailer());
    catalog.register_record(RECORD_LAYOUT, record_segment_a(), Segment::A);
    catalog
}

impl LayoutSet {
    /// Layout set naming the built-in Itaú 240 layouts.
    pub fn itau() -> Self {
        LayoutSet {
            file: FILE_LAYOUT.to_string(),
            batch: BATCH_LAYOUT.to_string(),
            record: RECORD_LAYOUT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaProvider;

    fn width(specs: &[FieldSpec]) -> usize {
        specs.iter().map(|s| s.width).sum()
    }

    #[test]
    fn test_all_templates_are_240_wide() {
        for specs in [
            file_header(),
            file_trailer(),
            batch_header(),
            batch_trailer(),
            record_segment_a(),
        ] {
            assert_eq!(width(&specs), LINE_WIDTH);
        }
    }

    #[test]
    fn test_detail_lines_match_surrounding_lines() {
        // A detail line longer than the header/trailer lines around it
        // would make the whole file unparseable by the bank
        assert_eq!(width(&record_segment_a()), width(&batch_header()));
        assert_eq!(width(&record_segment_a()), width(&file_header()));
    }

    #[test]
    fn test_discriminator_sits_at_byte_7() {
        let catalog = itau();
        let (fh, ft) = catalog.container_layout(FILE_LAYOUT).unwrap();
        let (bh, bt) = catalog.container_layout(BATCH_LAYOUT).unwrap();
        let (rec, _) = catalog.record_layout(RECORD_LAYOUT).unwrap();

        for specs in [fh, ft, bh, bt, rec] {
            let tipo = specs.iter().find(|s| s.name == "tipo_registro").unwrap();
            assert_eq!(tipo.offset, 7);
            assert_eq!(tipo.width, 1);
        }
    }

    #[test]
    fn test_record_type_defaults() {
        let catalog = itau();
        let (fh, ft) = catalog.container_layout(FILE_LAYOUT).unwrap();
        let (bh, bt) = catalog.container_layout(BATCH_LAYOUT).unwrap();
        let (rec, segment) = catalog.record_layout(RECORD_LAYOUT).unwrap();

        let tipo = |specs: &[FieldSpec]| {
            specs
                .iter()
                .find(|s| s.name == "tipo_registro")
                .and_then(|s| s.default.clone())
        };
        assert_eq!(tipo(fh), Some(FieldData::Num(0)));
        assert_eq!(tipo(bh), Some(FieldData::Num(1)));
        assert_eq!(tipo(rec), Some(FieldData::Num(3)));
        assert_eq!(tipo(bt), Some(FieldData::Num(5)));
        assert_eq!(tipo(ft), Some(FieldData::Num(9)));
        assert!(segment.is_payment());
    }
}
