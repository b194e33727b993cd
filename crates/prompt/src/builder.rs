//! Rendering prompt definitions into the text sent for generation.

use crate::grounded::{CONTEXT_SLOT, QUESTION_SLOT};
use crate::types::{BuiltPrompt, PromptDefinition};
use docent_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition, the assembled context and the question.
///
/// Both values are inserted verbatim; an empty context still renders so the
/// model sees the refusal rule with nothing to answer from.
///
/// # Example
/// ```
/// use docent_prompt::{build_prompt, grounded::default_definition};
///
/// let built = build_prompt(&default_definition(), "Rust is fast.", "Is Rust fast?").unwrap();
/// assert!(built.user.contains("Rust is fast."));
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    context: &str,
    question: &str,
) -> AppResult<BuiltPrompt> {
    tracing::debug!(
        "Building prompt {} ({} context chars)",
        definition.id,
        context.len()
    );

    let mut variables = HashMap::new();
    variables.insert(CONTEXT_SLOT.to_string(), context.to_string());
    variables.insert(QUESTION_SLOT.to_string(), question.to_string());

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        definition.system.clone(),
        user,
        definition.id.clone(),
        !context.is_empty(),
        variables,
    ))
}

/// Render a Handlebars template with variables.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text: context must reach the model unescaped
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounded::{default_definition, REFUSAL_SENTENCE};

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("pergunta".to_string(), "Hello, world!".to_string());

        let result = render_template("Pergunta: {{pergunta}}", &vars).unwrap();
        assert_eq!(result, "Pergunta: Hello, world!");
    }

    #[test]
    fn test_context_is_not_escaped() {
        let context = "a < b && \"quoted\" --- <tag>";
        let built = build_prompt(&default_definition(), context, "q").unwrap();
        assert!(built.user.contains(context));
    }

    #[test]
    fn test_default_prompt_rendering() {
        let built = build_prompt(
            &default_definition(),
            "The capital of Freedonia is Freedonia City.",
            "What is the capital of Freedonia?",
        )
        .unwrap();

        assert!(built
            .user
            .contains("CONTEXTO:\nThe capital of Freedonia is Freedonia City.\n"));
        assert!(built
            .user
            .contains("PERGUNTA DO USUÁRIO:\nWhat is the capital of Freedonia?\n"));
        assert!(built.user.contains(REFUSAL_SENTENCE));
        assert!(built.metadata.context_included);
        assert_eq!(built.system, None);
    }

    #[test]
    fn test_empty_context_still_renders() {
        let built = build_prompt(&default_definition(), "", "Anything?").unwrap();
        assert!(built.user.contains("CONTEXTO:\n\n"));
        assert!(!built.metadata.context_included);
    }

    #[test]
    fn test_invalid_template_is_prompt_error() {
        let vars = HashMap::new();
        assert!(matches!(
            render_template("{{#if}}", &vars),
            Err(AppError::Prompt(_))
        ));
    }
}
