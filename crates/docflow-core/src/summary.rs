//! One-sentence renderings of records, used as the embedded document text.
//!
//! A blank optional field renders as `Nenurodyta`. Fields the record loader
//! defaults (amounts and quantities default to `"0"`) are never blank after
//! loading, so a missing quantity renders as `0 t`.

use crate::record::{ContractRecord, DocumentRecord, InvoiceRecord};

const NOT_SPECIFIED: &str = "Nenurodyta";

/// Render a record into a short Lithuanian sentence.
pub fn summarize(record: &DocumentRecord) -> String {
    match record {
        DocumentRecord::Invoice(invoice) => invoice_summary(invoice),
        DocumentRecord::Contract(contract) => contract_summary(contract),
    }
}

/// Only the first line item is rendered; the full list stays in the metadata.
pub fn invoice_summary(invoice: &InvoiceRecord) -> String {
    let mut text = format!(
        "PVM sąskaita faktūra Nr. {} išrašyta {}. Pardavėjas: {}. Gavėjas: {}. Bendra mokėtina suma: {} EUR. ",
        invoice.numeris,
        invoice.data,
        invoice.pardavejas.pavadinimas,
        invoice.gavejas.pavadinimas,
        invoice.sumos.viso_su_pvm_eur,
    );

    if let Some(item) = invoice.prekes.first() {
        text.push_str("Prekės sąrašas: ");
        let quantity = match or_not_specified(&item.kiekis_t) {
            NOT_SPECIFIED => NOT_SPECIFIED.to_string(),
            tonnes => format!("{} t", tonnes),
        };
        text.push_str(&format!(
            "{}, Kiekis: {}, Viso: {} EUR. ",
            item.pavadinimas, quantity, item.viso_eur,
        ));
    }

    text.trim().to_string()
}

pub fn contract_summary(contract: &ContractRecord) -> String {
    let text = format!(
        "Dokumento tipas: Sutartis, Nr. {}, Sudarymo data: {}. \
         Sutarties tipas: {}. \
         Šalis A (Teikėjas/Pardavėjas): {} (Įm. kodas: {}). \
         Šalis B (Gavėjas/Pirkėjas): {} (Įm. kodas: {}). \
         Galiojimo terminas: {}. \
         Bendra vertė: {} EUR. \
         Mokestis už paslaugas/prekes: {}. ",
        contract.numeris,
        contract.sudarymo_data,
        or_not_specified(&contract.sutarties_tipas),
        contract.salis_a.pavadinimas,
        contract.salis_a.imones_kodas,
        contract.salis_b.pavadinimas,
        contract.salis_b.imones_kodas,
        or_not_specified(&contract.galiojimo_terminas),
        contract.bendra_suma_eur,
        or_not_specified(&contract.mokestis_uz_paslaugas),
    );

    text.trim().to_string()
}

/// `Nenurodyta` for blank text, otherwise the value unchanged.
fn or_not_specified(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_SPECIFIED
    } else {
        value
    }
}
