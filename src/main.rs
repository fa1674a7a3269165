//! Apprentice - Teachable Q&A Assistant
//!
//! Answers free-text questions from a learned knowledge file and asks to
//! be taught when it does not know the answer.

// Use the library crate for all modules
use apprentice::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (WARN level by default, use RUST_LOG=info for debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    // Run CLI
    cli::run().await
}
