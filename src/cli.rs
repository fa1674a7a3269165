//! CLI interface for apprentice

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::filter::Blacklist;
use crate::knowledge::KnowledgeBase;
use crate::matcher::Matcher;

#[derive(Parser)]
#[command(name = "apprentice")]
#[command(about = "Teachable question-answering assistant with fuzzy matching and persistent memory", long_about = None)]
#[command(version)]
struct Cli {
    /// Override the knowledge file path for this invocation
    #[arg(short, long, value_name = "FILE", env = "APPRENTICE_KNOWLEDGE_FILE")]
    knowledge: Option<PathBuf>,

    /// Override the blacklist file path for this invocation
    #[arg(short, long, value_name = "FILE", env = "APPRENTICE_BLACKLIST_FILE")]
    blacklist: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive question session (default when no command given)
    Chat,
    /// Ask a single question and print the stored answer
    Ask {
        /// The question to match against stored entries
        question: String,
    },
    /// Create the starter knowledge and blacklist files
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
    /// Inspect or extend the stored question/answer pairs
    Knowledge {
        #[command(subcommand)]
        command: KnowledgeCommands,
    },
    /// Configure the assistant
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the match threshold (0.0 to 1.0)
        #[arg(long, value_name = "THRESHOLD")]
        set_threshold: Option<f64>,
        /// Set the knowledge file path
        #[arg(long, value_name = "FILE")]
        set_knowledge_file: Option<String>,
        /// Set the blacklist file path
        #[arg(long, value_name = "FILE")]
        set_blacklist_file: Option<String>,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
enum KnowledgeCommands {
    /// List all stored pairs
    List,
    /// Add a pair directly, with the same moderation as the chat loop
    Add {
        question: String,
        answer: String,
    },
    /// Show entry count and storage location
    Stats,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;
    if let Some(path) = cli.knowledge {
        cfg.storage.knowledge_file = path;
    }
    if let Some(path) = cli.blacklist {
        cfg.storage.blacklist_file = path;
    }

    // Default to the interactive session if no command given
    match cli.command {
        None | Some(Commands::Chat) => {
            crate::interactive::run_session(&cfg).await?;
        }
        Some(Commands::Ask { question }) => {
            ask(&cfg, &question)?;
        }
        Some(Commands::Init { force }) => {
            init(&cfg, force)?;
        }
        Some(Commands::Knowledge { command }) => match command {
            KnowledgeCommands::List => list_knowledge(&cfg)?,
            KnowledgeCommands::Add { question, answer } => add_knowledge(&cfg, &question, &answer)?,
            KnowledgeCommands::Stats => knowledge_stats(&cfg)?,
        },
        Some(Commands::Config {
            show,
            set_threshold,
            set_knowledge_file,
            set_blacklist_file,
            reset,
        }) => {
            if let Some(threshold) = set_threshold {
                config::set_threshold(threshold)?;
            } else if let Some(path) = set_knowledge_file {
                config::set_knowledge_file(&path)?;
            } else if let Some(path) = set_blacklist_file {
                config::set_blacklist_file(&path)?;
            } else if reset {
                config::reset_config()?;
            } else if show {
                config::show_config()?;
            } else {
                println!("Configuration options:");
                println!("  --show                     Display current configuration");
                println!("  --set-threshold <t>        Set the match threshold (0.0 to 1.0)");
                println!("  --set-knowledge-file <p>   Set the knowledge file path");
                println!("  --set-blacklist-file <p>   Set the blacklist file path");
                println!("  --reset                    Reset configuration to defaults");
            }
        }
    }

    Ok(())
}

/// One-shot query: match and print, never learn, never save
fn ask(cfg: &Config, question: &str) -> Result<()> {
    let knowledge = KnowledgeBase::load(&cfg.storage.knowledge_file)
        .context("Failed to load the knowledge base")?;
    let matcher = Matcher::new().with_threshold(cfg.matcher.threshold);

    match matcher
        .find_best_match(&knowledge, question)
        .and_then(|q| knowledge.answer_for(q))
    {
        Some(answer) => println!("{answer}"),
        None => println!("No stored answer is close enough to that question."),
    }

    Ok(())
}

/// Create the starter knowledge document and an empty blacklist
fn init(cfg: &Config, force: bool) -> Result<()> {
    let knowledge_path = &cfg.storage.knowledge_file;
    if knowledge_path.exists() && !force {
        println!(
            "Knowledge file already exists: {} (use --force to overwrite)",
            knowledge_path.display()
        );
    } else {
        KnowledgeBase::create(knowledge_path).context("Failed to create the knowledge file")?;
        println!("Created empty knowledge file: {}", knowledge_path.display());
    }

    let blacklist_path = &cfg.storage.blacklist_file;
    if blacklist_path.exists() && !force {
        println!(
            "Blacklist file already exists: {} (use --force to overwrite)",
            blacklist_path.display()
        );
    } else {
        if let Some(parent) = blacklist_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create the data directory")?;
        }
        std::fs::write(blacklist_path, "")
            .with_context(|| format!("Failed to write {}", blacklist_path.display()))?;
        println!("Created empty blacklist file: {}", blacklist_path.display());
    }

    Ok(())
}

fn list_knowledge(cfg: &Config) -> Result<()> {
    let knowledge = KnowledgeBase::load(&cfg.storage.knowledge_file)
        .context("Failed to load the knowledge base")?;

    if knowledge.is_empty() {
        println!("No stored entries.");
        return Ok(());
    }

    for (i, entry) in knowledge.entries().iter().enumerate() {
        println!("{:>4}. Q: {}", i + 1, entry.question);
        println!("      A: {}", entry.answer);
    }

    Ok(())
}

/// Append a pair from the command line, running the blacklist first
fn add_knowledge(cfg: &Config, question: &str, answer: &str) -> Result<()> {
    let blacklist = Blacklist::load(&cfg.storage.blacklist_file)
        .context("Failed to load the blacklist")?;
    if !blacklist.is_appropriate(answer) {
        anyhow::bail!("Answer contains a blacklisted term; not stored");
    }

    let mut knowledge = KnowledgeBase::load(&cfg.storage.knowledge_file)
        .context("Failed to load the knowledge base")?;
    knowledge.append(question, answer);
    knowledge.save().context("Failed to save the knowledge base")?;

    println!("Stored answer for: {question}");
    Ok(())
}

fn knowledge_stats(cfg: &Config) -> Result<()> {
    let knowledge = KnowledgeBase::load(&cfg.storage.knowledge_file)
        .context("Failed to load the knowledge base")?;

    println!("Entries:  {}", knowledge.len());
    println!("Location: {}", knowledge.path().display());

    Ok(())
}
