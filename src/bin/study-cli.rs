use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use study_sdk::{StudyClient, StudyOptions};

#[derive(Parser)]
#[command(name = "study-cli")]
#[command(about = "Call the study-material backend through the proxy", long_about = None)]
struct Cli {
    /// Proxy mount URL.
    #[arg(short, long, default_value = "http://localhost:8080/api/proxy")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate summary, flashcards and quiz from a PDF
    Pack {
        file: PathBuf,
        #[arg(long, default_value_t = 10)]
        cards: u32,
        #[arg(long, default_value_t = 6)]
        questions: u32,
        #[arg(long, default_value = "medium")]
        difficulty: String,
    },
    /// Recommend videos for key points
    Videos {
        #[arg(required = true)]
        key_points: Vec<String>,
        #[arg(long, default_value_t = 8)]
        max_results: u32,
    },
    /// Ask a question about extracted text
    Ask {
        /// File holding the extracted text
        #[arg(long)]
        text_file: PathBuf,
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = StudyClient::new(&cli.url);

    match cli.command {
        Commands::Pack { file, cards, questions, difficulty } => {
            let pdf = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let options = StudyOptions {
                num_cards: cards,
                num_questions: questions,
                difficulty,
                ..StudyOptions::default()
            };
            let material = client.study_material(&file_name, pdf, &options).await?;
            print_json(&material)?;
        }
        Commands::Videos { key_points, max_results } => {
            let videos = client.recommend_videos(&key_points, max_results).await?;
            print_json(&videos)?;
        }
        Commands::Ask { text_file, question } => {
            let text = tokio::fs::read_to_string(&text_file).await?;
            let answer = client.ask_question(&text, &question).await?;
            println!("{}", answer);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
