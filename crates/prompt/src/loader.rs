//! Loading prompt overrides from `.docent/prompts/<id>.yml`.

use crate::grounded::{default_definition, CONTEXT_SLOT, QUESTION_SLOT};
use crate::types::PromptDefinition;
use docent_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".docent").join("prompts")
}

/// Load a prompt definition by ID from the workspace.
///
/// # Example
/// ```no_run
/// use docent_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "manual.strict")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        let available = list_prompts(workspace_path)?;
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?} (available: {})",
            prompt_file,
            if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            }
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Pick the prompt for answering: the named override or the built-in one.
pub fn resolve_prompt(
    workspace_path: &Path,
    prompt_id: Option<&str>,
) -> AppResult<PromptDefinition> {
    match prompt_id {
        Some(id) => load_prompt(workspace_path, id),
        None => Ok(default_definition()),
    }
}

/// List all prompt IDs available in the workspace, sorted.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let prompts_dir = prompts_dir(workspace_path);

    if !prompts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
pub fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    for slot in [CONTEXT_SLOT, QUESTION_SLOT] {
        if !references_slot(&def.template, slot) {
            return Err(AppError::Prompt(format!(
                "Prompt {} must reference {{{{{}}}}} in its template",
                def.id, slot
            )));
        }
    }

    Ok(())
}

/// Whether the template contains a `{{slot}}` expression (whitespace and
/// triple braces tolerated).
fn references_slot(template: &str, slot: &str) -> bool {
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return false;
        };
        let inner = after[..end].trim_matches(|c: char| c == '{' || c == '~' || c.is_whitespace());
        if inner == slot {
            return true;
        }
        rest = &after[end + 2..];
    }
    false
}
