//! Ask command handler.
//!
//! With words on the command line, answers one question. Without, runs an
//! interactive loop until an exit word, Ctrl-C or Ctrl-D.

use crate::input::{InputHandler, Line, EXIT_TOKENS};
use clap::Args;
use docent_core::{config::AppConfig, AppError, AppResult};
use docent_knowledge::Rag;

/// Ask questions about the ingested document
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Question to ask; omit to start an interactive session
    pub question: Vec<String>,

    /// Print the answer and its sources as JSON (single question only)
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let rag = docent_knowledge::build_rag(config).await?;

        if self.question.is_empty() {
            return interactive(&rag, config).await;
        }

        let question = self.question.join(" ");
        let response = rag.ask_detailed(&question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            match response.answer {
                Some(answer) => println!("{}", answer),
                None => eprintln!("{}", blank_hint()),
            }
        }

        Ok(())
    }
}

fn blank_hint() -> String {
    format!(
        "Type a question, or {} to leave.",
        EXIT_TOKENS.join(" / ")
    )
}

/// Message for a failed interactive turn; service failures invite a retry.
fn turn_error(e: &AppError) -> String {
    if e.is_external() {
        format!("Service unavailable, try again: {}", e)
    } else {
        format!("Error: {}", e)
    }
}

/// Read questions until the user leaves. A failed turn is reported and the
/// loop goes on.
async fn interactive(rag: &Rag, config: &AppConfig) -> AppResult<()> {
    let mut input = InputHandler::new(config.docent_dir().join("history"))
        .map_err(|e| AppError::Other(e.to_string()))?;

    println!("{}", blank_hint());

    loop {
        let line = input
            .read_line()
            .map_err(|e| AppError::Other(e.to_string()))?;

        match line {
            Line::Exit => break,
            Line::Blank => println!("{}", blank_hint()),
            Line::Question(question) => match rag.ask(&question).await {
                Ok(Some(answer)) => println!("{}\n", answer),
                Ok(None) => println!("{}", blank_hint()),
                Err(e) => {
                    tracing::warn!("Question failed: {}", e);
                    eprintln!("{}\n", turn_error(&e));
                }
            },
        }
    }

    if let Err(e) = input.save_history() {
        tracing::warn!("Could not save history: {}", e);
    }

    Ok(())
}
