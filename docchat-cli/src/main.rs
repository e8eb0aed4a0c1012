//! `docchat`: chat with your documents from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docchat_cli::{AppConfig, Assistant};
use docchat_rag::RetrievalStrategy;
use docchat_session::ChatUpdate;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Answer questions from the documents uploaded to each chat", version)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage chats
    #[command(subcommand)]
    Chat(ChatCommand),

    /// Manage a chat's documents
    #[command(subcommand)]
    Doc(DocCommand),

    /// Ask a question in a chat
    Ask {
        /// Chat id
        chat: Uuid,

        /// The question
        question: String,

        /// Retrieval strategy: 1 plain, 2 query expansion, 3 relevance validated
        #[arg(short, long, default_value = "1")]
        strategy: RetrievalStrategy,

        /// Topic used to score relevance with strategy 3 (defaults to the question)
        #[arg(long)]
        theme: Option<String>,

        /// Also print the retrieved chunks
        #[arg(long)]
        sources: bool,
    },

    /// Inspect the shared index
    #[command(subcommand)]
    Index(IndexCommand),
}

#[derive(Subcommand)]
enum ChatCommand {
    /// Create a chat
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short = 'p', long, default_value = "")]
        system_prompt: String,
    },
    /// List chats
    List,
    /// Show a chat and its conversation
    Show { chat: Uuid },
    /// Change a chat's name, description or system prompt
    Update {
        chat: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short = 'p', long)]
        system_prompt: Option<String>,
    },
    /// Delete a chat and its documents
    Delete { chat: Uuid },
}

#[derive(Subcommand)]
enum DocCommand {
    /// Upload files into a chat (only .txt files are indexed)
    Upload {
        chat: Uuid,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List a chat's documents
    List { chat: Uuid },
    /// Delete a document from a chat
    Delete { chat: Uuid, doc_id: String },
}

#[derive(Subcommand)]
enum IndexCommand {
    /// Print index counters as JSON
    Stats,
    /// Run the consistency check
    Verify,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let assistant = Assistant::open(&cli.config).await.context("failed to start docchat")?;

    match cli.command {
        Commands::Chat(command) => run_chat(&assistant, command).await,
        Commands::Doc(command) => run_doc(&assistant, command).await,
        Commands::Ask { chat, question, strategy, theme, sources } => {
            let answer = assistant
                .ask(chat, &question, strategy, theme.as_deref())
                .await
                .with_context(|| format!("failed to answer in chat {chat}"))?;
            println!("{}", answer.text);
            if sources {
                for source in &answer.sources {
                    println!(
                        "\n--- {} #{} (distance {:.4})\n{}",
                        source.chunk.doc_name, source.chunk.chunk_index, source.distance, source.chunk.text
                    );
                }
            }
            Ok(())
        }
        Commands::Index(IndexCommand::Stats) => {
            println!("{}", serde_json::to_string_pretty(&assistant.stats().await)?);
            Ok(())
        }
        Commands::Index(IndexCommand::Verify) => {
            assistant.verify().await.context("index is inconsistent")?;
            println!("index is consistent");
            Ok(())
        }
    }
}

async fn run_chat(assistant: &Assistant, command: ChatCommand) -> Result<()> {
    match command {
        ChatCommand::Create { name, description, system_prompt } => {
            let chat = assistant.create_chat(&name, &description, &system_prompt).await?;
            println!("{}", chat.id);
        }
        ChatCommand::List => {
            for chat in assistant.list_chats().await {
                println!("{}\t{}\t{}", chat.id, chat.name, chat.description);
            }
        }
        ChatCommand::Show { chat } => {
            let chat = assistant.chat(chat).await?;
            println!("{}\t{}\n{}", chat.name, chat.database_id, chat.description);
            if !chat.system_prompt.is_empty() {
                println!("system prompt: {}", chat.system_prompt);
            }
            for message in chat.conversation() {
                println!("\n[{}]\n{}", message.role, message.content);
            }
        }
        ChatCommand::Update { chat, name, description, system_prompt } => {
            let update = ChatUpdate { name, description, system_prompt };
            let chat = assistant.update_chat(chat, update).await?;
            println!("updated {}", chat.id);
        }
        ChatCommand::Delete { chat } => {
            let deleted = assistant.delete_chat(chat).await?;
            println!("deleted {} and {} chunks", deleted.chat.name, deleted.purged_chunks);
        }
    }
    Ok(())
}

async fn run_doc(assistant: &Assistant, command: DocCommand) -> Result<()> {
    match command {
        DocCommand::Upload { chat, files } => {
            let report = assistant.upload_paths(chat, &files).await?;
            for doc in &report.documents {
                println!("indexed {}\t{}\t{} chunks", doc.doc_id, doc.doc_name, doc.chunk_count);
            }
            for skipped in &report.skipped {
                eprintln!("skipped {}: {}", skipped.name, skipped.reason);
            }
        }
        DocCommand::List { chat } => {
            for doc in assistant.documents(chat).await? {
                println!(
                    "{}\t{}\t{} bytes\t{}\t{} chunks",
                    doc.doc_id, doc.doc_name, doc.doc_size, doc.doc_date, doc.chunk_count
                );
            }
        }
        DocCommand::Delete { chat, doc_id } => {
            let removed = assistant.delete_document(chat, &doc_id).await?;
            if removed == 0 {
                println!("no document {doc_id} in chat {chat}");
            } else {
                println!("deleted {doc_id} ({removed} chunks)");
            }
        }
    }
    Ok(())
}
