//! Interactive session - prompt loop with fuzzy matching and teach-back
//!
//! Reads a question per line, answers it from the knowledge base when a
//! stored question is close enough, and otherwise asks the user to teach
//! the answer. The knowledge base is persisted on normal exit and on
//! interrupt.

use std::io::{self, BufRead, IsTerminal};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use rustyline::error::ReadlineError;
use tracing::info;

use crate::config::Config;
use crate::filter::Blacklist;
use crate::knowledge::KnowledgeBase;
use crate::matcher::Matcher;

/// Ends the session and persists the knowledge base (case-insensitive)
pub const EXIT_KEYWORD: &str = "end";

/// Declines to teach an answer for an unmatched question (case-insensitive)
pub const SKIP_KEYWORD: &str = "skip";

const PROMPT: &str = "\x1b[32m❯\x1b[0m ";
const TEACH_PROMPT: &str = "\x1b[33mteach ❯\x1b[0m ";

/// What happened to a taught answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnOutcome {
    /// Appended to the in-memory knowledge base
    Learned,
    /// The user declined to teach (skip keyword or empty input)
    Skipped,
    /// The answer contained a blacklisted term and was discarded
    Rejected,
}

/// Answer for `input`, resolved through fuzzy matching then exact lookup
pub fn lookup_answer(base: &KnowledgeBase, matcher: &Matcher, input: &str) -> Option<String> {
    let question = matcher.find_best_match(base, input)?;
    base.answer_for(question).map(str::to_string)
}

/// Moderate and store a taught answer for `question`
pub fn try_learn(
    base: &mut KnowledgeBase,
    blacklist: &Blacklist,
    question: &str,
    answer: &str,
) -> LearnOutcome {
    if answer.is_empty() || answer.eq_ignore_ascii_case(SKIP_KEYWORD) {
        return LearnOutcome::Skipped;
    }
    if !blacklist.is_appropriate(answer) {
        return LearnOutcome::Rejected;
    }
    base.append(question, answer);
    info!(%question, "Learned new answer");
    LearnOutcome::Learned
}

/// Run a full interactive (or piped) question session.
///
/// The knowledge base is shared with the interrupt hook so SIGINT outside
/// the line editor performs the same save-and-exit as a normal shutdown.
pub async fn run_session(config: &Config) -> Result<()> {
    let knowledge = KnowledgeBase::load(&config.storage.knowledge_file)
        .context("Failed to load the knowledge base")?;
    let blacklist = Blacklist::load(&config.storage.blacklist_file)
        .context("Failed to load the blacklist")?;
    let matcher = Matcher::new().with_threshold(config.matcher.threshold);

    let knowledge = Arc::new(Mutex::new(knowledge));
    spawn_interrupt_hook(knowledge.clone());

    let mut session = Session {
        knowledge: knowledge.clone(),
        blacklist,
        matcher,
        learned: 0,
    };

    if io::stdin().is_terminal() {
        session.run_repl()?;
    } else {
        session.run_piped()?;
    }

    let store = lock(&knowledge);
    store.save().context("Failed to save the knowledge base")?;
    print_success(&format!(
        "Saved {} entries to {}",
        store.len(),
        store.path().display()
    ));
    if session.learned > 0 {
        print_success(&format!(
            "Learned {} new answer(s) this session",
            session.learned
        ));
    }

    Ok(())
}

/// Persist-and-exit hook for SIGINT delivered outside the line editor.
///
/// Inside `readline` the terminal is in raw mode and Ctrl-C surfaces as
/// `ReadlineError::Interrupted`; this hook covers the cooked-mode window
/// between reads and the piped-input mode. Both shutdown paths call the
/// same idempotent save.
fn spawn_interrupt_hook(knowledge: Arc<Mutex<KnowledgeBase>>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        let store = lock(&knowledge);
        match store.save() {
            Ok(()) => {
                println!();
                print_success("Interrupted - knowledge base saved");
                std::process::exit(0);
            }
            Err(e) => {
                print_error(&format!("✗ Failed to save on interrupt: {e}"));
                std::process::exit(1);
            }
        }
    });
}

/// A poisoned lock still holds valid entries; the shutdown paths must be
/// able to save regardless
fn lock(knowledge: &Arc<Mutex<KnowledgeBase>>) -> MutexGuard<'_, KnowledgeBase> {
    knowledge
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Session {
    knowledge: Arc<Mutex<KnowledgeBase>>,
    blacklist: Blacklist,
    matcher: Matcher,
    learned: usize,
}

impl Session {
    /// Main loop with rustyline
    fn run_repl(&mut self) -> Result<()> {
        {
            let store = lock(&self.knowledge);
            print_banner(
                store.len(),
                self.blacklist.len(),
                self.matcher.threshold(),
                store.path(),
            );
        }

        let config = rustyline::Config::builder().auto_add_history(true).build();
        let mut rl = rustyline::DefaultEditor::with_config(config)?;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    if input.eq_ignore_ascii_case(EXIT_KEYWORD) {
                        break;
                    }

                    match self.answer(input) {
                        Some(answer) => print_answer(&answer),
                        None => {
                            print_info("I don't know the answer to that one. Can you teach me?");
                            print_dim(&format!("Type an answer, or '{SKIP_KEYWORD}' to move on"));
                            match rl.readline(TEACH_PROMPT) {
                                Ok(reply) => self.teach(input, reply.trim()),
                                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                                Err(err) => return Err(err.into()),
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    break;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    /// Same state machine driven by piped stdin; the line after an
    /// unmatched question is consumed as the teaching input
    fn run_piped(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();

        while let Some(line) = lines.next() {
            let line = line.context("Failed to read from stdin")?;
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case(EXIT_KEYWORD) {
                break;
            }

            match self.answer(input) {
                Some(answer) => println!("{answer}"),
                None => {
                    println!("I don't know the answer to that one.");
                    match lines.next() {
                        Some(reply) => {
                            let reply = reply.context("Failed to read from stdin")?;
                            self.teach(input, reply.trim());
                        }
                        None => break,
                    }
                }
            }
        }

        Ok(())
    }

    fn answer(&self, input: &str) -> Option<String> {
        let store = lock(&self.knowledge);
        lookup_answer(&store, &self.matcher, input)
    }

    fn teach(&mut self, question: &str, reply: &str) {
        let mut store = lock(&self.knowledge);
        match try_learn(&mut store, &self.blacklist, question, reply) {
            LearnOutcome::Learned => {
                self.learned += 1;
                print_success("Thanks, I learned something new.");
            }
            LearnOutcome::Skipped => {}
            LearnOutcome::Rejected => {
                print_error("Sorry, that answer is not appropriate.");
            }
        }
    }
}

fn print_banner(entries: usize, terms: usize, threshold: f64, path: &Path) {
    println!();
    println!("  \x1b[1mapprentice v{}\x1b[0m", crate::VERSION);
    println!(
        "  \x1b[90m{} stored answers · {} blocked terms · match threshold {:.2}\x1b[0m",
        entries, terms, threshold
    );
    println!("  \x1b[90m{}\x1b[0m", path.display());
    println!(
        "  \x1b[90mType '{}' to finish; Ctrl-C saves and exits\x1b[0m",
        EXIT_KEYWORD
    );
    println!();
}

/// Print colored output
fn print_colored(text: &str, color: Color) {
    let _ = execute!(
        io::stdout(),
        SetForegroundColor(color),
        Print(text),
        Print("\n"),
        ResetColor
    );
}

/// Print a stored answer
fn print_answer(text: &str) {
    print_colored(text, Color::Cyan);
}

/// Print an info message
fn print_info(text: &str) {
    print_colored(text, Color::Cyan);
}

/// Print a dimmed line
fn print_dim(text: &str) {
    print_colored(text, Color::DarkGrey);
}

/// Print a success message
fn print_success(text: &str) {
    print_colored(text, Color::Green);
}

/// Print an error message
fn print_error(text: &str) {
    print_colored(text, Color::Red);
}
