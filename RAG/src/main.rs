// Command-line access to the collaborators, for trying a PDF without the
// HTTP server in ../api

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use pdf_rag::{extract_pdf_text, GeminiService, QueryService};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pdf_rag",
    about = "Extract text from a PDF or ask Gemini a question about it",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the text layer of a PDF
    Extract {
        /// PDF file to read
        pdf: PathBuf,
    },

    /// Answer a question using the most relevant passages of a PDF
    Ask {
        /// PDF file to query
        pdf: PathBuf,

        /// Question; several words are joined with spaces
        #[arg(required = true)]
        question: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Extract { pdf } => {
            let text = extract_pdf_text(&pdf).await?;
            if text.trim().is_empty() {
                bail!("No text found in {}", pdf.display());
            }
            println!("{}", text);
        }
        Command::Ask { pdf, question } => {
            let (dir, name) = match (pdf.parent(), pdf.file_name()) {
                (Some(dir), Some(name)) => (dir, name.to_string_lossy().to_string()),
                _ => bail!("Not a file path: {}", pdf.display()),
            };

            let query_service = QueryService::new(GeminiService::from_env()?, dir)?;
            let answer = query_service.process_query(&name, &question.join(" ")).await?;
            println!("{}", answer);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_takes_a_path() {
        let cli = Cli::try_parse_from(["pdf_rag", "extract", "docs/policy.pdf"]).unwrap();
        match cli.command {
            Command::Extract { pdf } => assert_eq!(pdf, PathBuf::from("docs/policy.pdf")),
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_ask_collects_question_words() {
        let cli = Cli::try_parse_from(["pdf_rag", "ask", "policy.pdf", "what", "is", "covered?"]).unwrap();
        match cli.command {
            Command::Ask { pdf, question } => {
                assert_eq!(pdf, PathBuf::from("policy.pdf"));
                assert_eq!(question.join(" "), "what is covered?");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_ask_requires_a_question() {
        assert!(Cli::try_parse_from(["pdf_rag", "ask", "policy.pdf"]).is_err());
        assert!(Cli::try_parse_from(["pdf_rag"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
