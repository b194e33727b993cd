//! Built-in grounded-answer prompt.
//!
//! The template confines the model to the retrieved context and prescribes
//! one exact refusal sentence, with three few-shot refusals (a general
//! knowledge question, an out-of-domain statistic, a request for an opinion).

use crate::types::PromptDefinition;

/// Identifier of the built-in prompt.
pub const DEFAULT_PROMPT_ID: &str = "docent.grounded";

/// Template slot receiving the assembled retrieval context.
pub const CONTEXT_SLOT: &str = "contexto";

/// Template slot receiving the user's question.
pub const QUESTION_SLOT: &str = "pergunta";

/// The exact sentence the model must reply with when the context lacks the answer.
pub const REFUSAL_SENTENCE: &str = "Não tenho informações necessárias para responder sua pergunta.";

/// Built-in template text.
pub const DEFAULT_TEMPLATE: &str = r#"
CONTEXTO:
{{contexto}}

REGRAS:
- Responda somente com base no CONTEXTO.
- Se a informação não estiver explicitamente no CONTEXTO, responda:
  "Não tenho informações necessárias para responder sua pergunta."
- Nunca invente ou use conhecimento externo.
- Nunca produza opiniões ou interpretações além do que está escrito.

EXEMPLOS DE PERGUNTAS FORA DO CONTEXTO:
Pergunta: "Qual é a capital da França?"
Resposta: "Não tenho informações necessárias para responder sua pergunta."

Pergunta: "Quantos clientes temos em 2024?"
Resposta: "Não tenho informações necessárias para responder sua pergunta."

Pergunta: "Você acha isso bom ou ruim?"
Resposta: "Não tenho informações necessárias para responder sua pergunta."

PERGUNTA DO USUÁRIO:
{{pergunta}}

RESPONDA A "PERGUNTA DO USUÁRIO"
"#;

/// The built-in prompt definition.
pub fn default_definition() -> PromptDefinition {
    PromptDefinition {
        id: DEFAULT_PROMPT_ID.to_string(),
        title: "Grounded answer".to_string(),
        api_version: "1.0".to_string(),
        created_by: "docent".to_string(),
        system: None,
        template: DEFAULT_TEMPLATE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_carries_refusal_sentence() {
        // Rule plus three few-shot answers
        assert_eq!(DEFAULT_TEMPLATE.matches(REFUSAL_SENTENCE).count(), 4);
    }

    #[test]
    fn test_template_has_both_slots_once() {
        assert_eq!(DEFAULT_TEMPLATE.matches("{{contexto}}").count(), 1);
        assert_eq!(DEFAULT_TEMPLATE.matches("{{pergunta}}").count(), 1);
    }

    #[test]
    fn test_context_precedes_question() {
        let ctx = DEFAULT_TEMPLATE.find("{{contexto}}").unwrap();
        let question = DEFAULT_TEMPLATE.find("{{pergunta}}").unwrap();
        assert!(ctx < question);
    }
}
