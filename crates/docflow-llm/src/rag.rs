//! Context and prompt assembly for question answering.
//!
//! Every stored document is sent to the model. There is no ranking: the
//! context is the whole store, tagged by document type.

/// Separator placed between context entries.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// One stored document handed to the answer model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextItem {
    /// Type tag rendered in brackets, e.g. `SUTARTIS`.
    pub tag: String,
    /// Stored document text.
    pub content: String,
}

impl ContextItem {
    pub fn new(tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            content: content.into(),
        }
    }
}

/// Join items as `[TAG]: content` blocks. `None` when there is nothing to join.
pub fn build_context(items: &[ContextItem]) -> Option<String> {
    if items.is_empty() {
        return None;
    }

    let blocks: Vec<String> = items
        .iter()
        .map(|item| format!("[{}]: {}", item.tag, item.content))
        .collect();

    Some(blocks.join(CONTEXT_SEPARATOR))
}

/// Instruction prompt for the local answer model.
pub fn build_answer_prompt(context: &str, question: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("[INST]\n");
    prompt.push_str("Jūs esate dirbtinio intelekto asistentas, specializuojantis verslo dokumentų (sąskaitų faktūrų ir sutarčių) analizėje.\n");
    prompt.push_str("Atsakykite į vartotojo klausimą TIKSLIAI remdamiesi pateiktu kontekstu. Kontekste dokumentai yra pažymėti žymėmis [SĄSKAITA FAKTŪRA] arba [SUTARTIS].\n");
    prompt.push_str("Būkite konkretus, išsamus ir nurodykite dokumentų tipus, kai atsakote.\n");
    prompt.push_str("Nekurkite jokios informacijos, kurios nėra pateiktuose dokumentuose.\n");
    prompt.push_str("Galutinį atsakymą PRIVALOTE pateikti lietuvių kalba.\n\n");

    prompt.push_str("Kontekstas (įvairūs verslo dokumentai):\n");
    prompt.push_str(context);
    prompt.push_str("\n\n");

    prompt.push_str("Vartotojo klausimas:\n");
    prompt.push_str(question);
    prompt.push_str("\n[/INST]\n");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_context_tags_and_separates() {
        let items = vec![
            ContextItem::new("SĄSKAITA FAKTŪRA", "PVM sąskaita faktūra Nr. 1"),
            ContextItem::new("SUTARTIS", "Dokumento tipas: Sutartis, Nr. S-7"),
        ];

        let context = build_context(&items).unwrap();
        assert_eq!(
            context,
            "[SĄSKAITA FAKTŪRA]: PVM sąskaita faktūra Nr. 1\n\n---\n\n[SUTARTIS]: Dokumento tipas: Sutartis, Nr. S-7"
        );
    }

    #[test]
    fn test_build_context_empty() {
        assert_eq!(build_context(&[]), None);
    }

    #[test]
    fn test_answer_prompt_contains_context_and_question() {
        let prompt = build_answer_prompt("[SUTARTIS]: Nuoma", "Kokia nuomos kaina?");

        assert!(prompt.starts_with("[INST]"));
        assert!(prompt.trim_end().ends_with("[/INST]"));
        assert!(prompt.contains("[SUTARTIS]: Nuoma"));
        assert!(prompt.contains("Vartotojo klausimas:\nKokia nuomos kaina?"));
        assert!(prompt.contains("PRIVALOTE pateikti lietuvių kalba"));
    }
}
