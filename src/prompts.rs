//! Prompt templates sent to the generation service and the fixed fallback reply.
//!
//! Keeping the wording here makes it easy to tune the consultant persona and
//! the yes/no instruction without touching the composer or the oracle.

/// Reply text used when the generation call fails.
pub const FALLBACK_REPLY: &str = "Ошибка при обращении к сервису. Попробуйте позже.";

/// Normalized prefixes counted as a positive equivalence judgment.
pub const AFFIRMATIVE_PREFIXES: &[&str] = &["да", "yes"];

/// Prompt asking for a short consultant answer grounded in the catalog.
pub fn consultant_prompt(catalog_context: &str, utterance: &str) -> String {
    format!(
        "Ты — консультант по продуктам. Отвечай кратко и понятно.\n\
         Информация о продуктах:\n\
         {catalog_context}\n\
         \n\
         Вопрос клиента: {utterance}\n"
    )
}

/// Prompt asking for a bare "Да"/"Нет" on whether `utterance` means `phrase`.
pub fn equivalence_prompt(utterance: &str, phrase: &str) -> String {
    format!(
        "Ответь \"Да\" или \"Нет\". \
         Считается ли запрос \"{utterance}\" эквивалентным заболеванию \"{phrase}\"?\n\
         Не объясняй. Просто ответь: Да или Нет.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consultant_prompt_embeds_context_and_question() {
        let prompt = consultant_prompt("X: Y", "что от мигрени?");
        assert!(prompt.contains("Информация о продуктах:\nX: Y\n"));
        assert!(prompt.ends_with("Вопрос клиента: что от мигрени?\n"));
    }

    #[test]
    fn equivalence_prompt_quotes_both_sides() {
        let prompt = equivalence_prompt("болит голова", "мигрень");
        assert!(prompt.contains("\"болит голова\""));
        assert!(prompt.contains("\"мигрень\""));
    }
}
