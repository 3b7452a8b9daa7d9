//! Structured field extraction from document text.

use crate::error::{IngestError, IngestResult};
use docflow_core::{DocumentRecord, DocumentType};
use docflow_llm::TextGenerator;
use std::sync::Arc;
use tracing::{debug, warn};

/// Characters of a malformed reply kept in the log.
const EXCERPT_CHARS: usize = 500;

const INVOICE_INSTRUCTIONS: &str = r#"Jūs esate dirbtinio intelekto asistentas, specializuojasi sąskaitų faktūrų duomenų ištraukime.
Išanalizuokite šį sąskaitos faktūros tekstą ir ištraukite visą struktūrizuotą informaciją.

Atsakymą pateikite TIK JSON formatu, be jokių papildomų paaiškinimų ar teksto.
Niekada neįtraukite papildomų žodžių, frazių ar Markdown formatavimo (pvz., ```json) prieš JSON pradžią ar po pabaigos.

Štai JSON struktūra, kurią turite naudoti:
{
  "dokumento_tipas": "PVM sąskaita faktūra",
  "numeris": "Sąskaitos numeris",
  "data": "Sąskaitos data (YYYY-MM-DD formatu)",
  "pardavejas": {
    "pavadinimas": "Pardavėjo pavadinimas",
    "imones_kodas": "Įmonės kodas",
    "pvm_kodas": "PVM kodas",
    "adresas": "Adresas",
    "bankas": "Bankas",
    "saskaitos_numeris": "Sąskaitos numeris"
  },
  "gavejas": {
    "pavadinimas": "Gavėjo pavadinimas",
    "imones_kodas": "Įmonės kodas",
    "pvm_kodas": "PVM kodas",
    "adresas": "Adresas"
  },
  "prekes": [
    {
      "pavadinimas": "Prekės pavadinimas",
      "vezimas": "Važtaraščio numeris (jei nurodytas)",
      "kiekis_t": "Kiekis tonomis (skaičius, naudokite tašką kaip dešimtainį skirtuką)",
      "vieneto_kaina_eur": "Vieneto kaina eurais (skaičius, naudokite tašką kaip dešimtainį skirtuką)",
      "viso_eur": "Bendra kaina eurais (skaičius, naudokite tašką kaip dešimtainį skirtuką)"
    }
  ],
  "sumos": {
    "viso_be_pvm_eur": "Bendra suma be PVM (skaičius, naudokite tašką kaip dešimtainį skirtuką)",
    "pvm_suma_eur": "PVM suma (skaičius, naudokite tašką kaip dešimtainį skirtuką)",
    "viso_su_pvm_eur": "Bendra suma su PVM (skaičius, naudokite tašką kaip dešimtainį skirtuką)"
  },
  "apmoketi_iki": "Apmokėjimo terminas (YYYY-MM-DD formatu)"
}

Jei skaitinės reikšmės nerandamos, naudokite '0'. Jei tekstiniai laukai nerandami, palikite juos tuščius "".
Įsitikinkite, kad grąžinate tik JSON kodą.
NEĮTRAUKITE JOKIŲ PAPILDOMŲ KOMENTARŲ AR TEKSTO UŽ JSON STRUKTŪROS RIBŲ.

Sąskaitos faktūros tekstas:"#;

const CONTRACT_INSTRUCTIONS: &str = r#"Jūs esate dirbtinio intelekto asistentas, specializuojasi sutarčių duomenų ištraukime.
Išanalizuokite šį sutarties tekstą ir ištraukite pagrindinius parametrus.

Atsakymą pateikite TIK JSON formatu, be jokių papildomų paaiškinimų ar teksto.
Niekada neįtraukite papildomų žodžių, frazių ar Markdown formatavimo (pvz., ```json) prieš JSON pradžią ar po pabaigos.

Štai JSON struktūra, kurią turite naudoti:
{
  "dokumento_tipas": "Sutartis",
  "numeris": "Sutarties numeris (jei nurodytas)",
  "sudarymo_data": "Sutarties sudarymo data (YYYY-MM-DD formatu)",
  "sutarties_tipas": "Pirkimo-pardavimo, Nuomos, Paslaugų teikimo ar pan.",
  "salis_a": {
    "pavadinimas": "Šalies A (Pardavėjo/Nuomotojo/Teikėjo) pavadinimas",
    "imones_kodas": "Įmonės kodas",
    "adresas": "Adresas"
  },
  "salis_b": {
    "pavadinimas": "Šalies B (Pirkėjo/Nuomininko/Gavėjo) pavadinimas",
    "imones_kodas": "Įmonės kodas",
    "adresas": "Adresas"
  },
  "galiojimo_terminas": "Sutarties galiojimo terminas (pvz., 1 metai, Iki 2025-12-31, Neterminuota)",
  "bendra_suma_eur": "Bendra sutarties vertė eurais (skaičius, naudokite tašką kaip dešimtainį skirtuką. Jei nenaudojama, naudokite '0')",
  "mokestis_uz_paslaugas": "Mokestis už paslaugas/prekes (detalesnis aprašymas, pvz., '1200 EUR per mėnesį', '1.5 EUR už vienetą')"
}

Jei skaitinės reikšmės nerandamos, naudokite '0'. Jei tekstiniai laukai nerandami, palikite juos tuščius "".
Įsitikinkite, kad grąžinate tik JSON kodą.
NEĮTRAUKITE JOKIŲ PAPILDOMŲ KOMENTARŲ AR TEKSTO UŽ JSON STRUKTŪROS RIBŲ.

Sutarties tekstas:"#;

/// Asks the model for a typed record of a classified document.
#[derive(Clone)]
pub struct FieldExtractor {
    generator: Arc<dyn TextGenerator>,
}

impl FieldExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Extract a record, reporting why it failed.
    pub async fn try_extract(&self, text: &str, doc_type: DocumentType) -> IngestResult<DocumentRecord> {
        debug!("Using the {} extraction prompt", doc_type);
        let reply = self
            .generator
            .generate_text(&extraction_prompt(doc_type, text))
            .await?;

        let json = locate_json(&reply);
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            warn!(
                "Could not decode the model reply as JSON: {}. Reply starts with:\n{}",
                e,
                excerpt(&reply)
            );
            IngestError::MalformedOutput(e.to_string())
        })?;

        Ok(DocumentRecord::from_value(doc_type, value)?)
    }

    /// Extract a record; every failure is logged and becomes `None`.
    pub async fn extract(&self, text: &str, doc_type: DocumentType) -> Option<DocumentRecord> {
        match self.try_extract(text, doc_type).await {
            Ok(record) => Some(record),
            Err(IngestError::MalformedOutput(_)) => None,
            Err(e) => {
                warn!("Field extraction failed: {}", e);
                None
            }
        }
    }
}

/// Extraction prompt for a document type.
pub fn extraction_prompt(doc_type: DocumentType, text: &str) -> String {
    let instructions = match doc_type {
        DocumentType::Invoice => INVOICE_INSTRUCTIONS,
        DocumentType::Contract => CONTRACT_INSTRUCTIONS,
    };
    format!("{}\n```\n{}\n```\n", instructions, text)
}

/// Best-effort location of the JSON object inside a free-form reply.
///
/// Takes the span from the first `{` to the last `}`. Without such a span,
/// leading fence markers and surrounding backticks are stripped instead.
pub fn locate_json(reply: &str) -> &str {
    let trimmed = reply.trim();

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
        .trim_start_matches(|c: char| "`json".contains(c))
        .trim_matches('`')
        .trim()
}

fn excerpt(text: &str) -> String {
    let mut excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
    if text.chars().count() > EXCERPT_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    const RECORD: &str = r#"{"dokumento_tipas": "PVM sąskaita faktūra", "numeris": "GR-1", "prekes": [{"pavadinimas": "Kviečiai", "kiekis_t": 12.5}]}"#;

    #[test]
    fn test_locate_json_in_fenced_reply() {
        let reply = format!("```json\n{}\n```", RECORD);
        assert_eq!(locate_json(&reply), RECORD);
    }

    #[test]
    fn test_locate_json_with_prose() {
        let reply = format!("Štai duomenys:\n{}\nTikiuosi, padėjo!", RECORD);
        assert_eq!(locate_json(&reply), RECORD);
    }

    #[test]
    fn test_locate_json_fallback_strips_fences() {
        assert_eq!(locate_json("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(locate_json("Atsiprašau, negaliu."), "Atsiprašau, negaliu.");
    }

    #[test]
    fn test_prompt_selection() {
        let invoice = extraction_prompt(DocumentType::Invoice, "TEKSTAS");
        assert!(invoice.contains("\"apmoketi_iki\""));
        assert!(invoice.ends_with("Sąskaitos faktūros tekstas:\n```\nTEKSTAS\n```\n"));

        let contract = extraction_prompt(DocumentType::Contract, "TEKSTAS");
        assert!(contract.contains("\"mokestis_uz_paslaugas\""));
        assert!(!contract.contains("\"prekes\""));
    }

    #[tokio::test]
    async fn test_extract_recovers_record_from_fenced_reply() {
        let generator = Arc::new(ScriptedGenerator::replies([format!("```json\n{}\n```", RECORD)]));
        let extractor = FieldExtractor::new(generator);

        let record = extractor.extract("...", DocumentType::Invoice).await.unwrap();
        let DocumentRecord::Invoice(invoice) = record else {
            panic!("expected invoice");
        };
        assert_eq!(invoice.numeris, "GR-1");
        assert_eq!(invoice.prekes[0].kiekis_t, "12.5");
        assert_eq!(invoice.sumos.viso_su_pvm_eur, "0");
    }

    #[tokio::test]
    async fn test_malformed_reply_yields_none() {
        let generator = Arc::new(ScriptedGenerator::replies(["{\"numeris\": \"GR-1\",,}"]));
        let extractor = FieldExtractor::new(generator.clone());

        let result = extractor.try_extract("...", DocumentType::Invoice).await;
        assert!(matches!(result, Err(IngestError::MalformedOutput(_))));

        let generator = Arc::new(ScriptedGenerator::replies(["Atsiprašau, negaliu."]));
        let extractor = FieldExtractor::new(generator);
        assert!(extractor.extract("...", DocumentType::Contract).await.is_none());
    }

    #[tokio::test]
    async fn test_service_failure_yields_none() {
        let extractor = FieldExtractor::new(Arc::new(ScriptedGenerator::unreachable()));
        assert!(extractor.extract("...", DocumentType::Invoice).await.is_none());
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let long = "ą".repeat(600);
        let short = excerpt(&long);
        assert_eq!(short.chars().count(), EXCERPT_CHARS + 3);
    }
}
