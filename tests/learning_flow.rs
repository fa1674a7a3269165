//! End-to-end learning flow against on-disk fixtures

use std::path::PathBuf;

use apprentice::filter::Blacklist;
use apprentice::interactive::{try_learn, LearnOutcome};
use apprentice::knowledge::KnowledgeBase;
use apprentice::matcher::Matcher;

fn fixture(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("knowledge.json");
    std::fs::write(
        &path,
        r#"{"questions":[{"question":"hi there","answer":"hello!"}]}"#,
    )
    .unwrap();
    path
}

#[test]
fn close_question_is_answered_from_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let base = KnowledgeBase::load(&fixture(&dir)).unwrap();
    let matcher = Matcher::new();

    let matched = matcher.find_best_match(&base, "hi their").unwrap();
    assert_eq!(matched, "hi there");
    assert_eq!(base.answer_for(matched), Some("hello!"));
}

#[test]
fn unmatched_question_learns_and_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir);
    let mut base = KnowledgeBase::load(&path).unwrap();
    let matcher = Matcher::new();
    let blacklist = Blacklist::from_terms(["badword"]);

    let question = "completely unrelated text";
    assert!(matcher.find_best_match(&base, question).is_none());

    let outcome = try_learn(&mut base, &blacklist, question, "a brand new answer");
    assert_eq!(outcome, LearnOutcome::Learned);
    base.save().unwrap();

    let reloaded = KnowledgeBase::load(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.answer_for(question), Some("a brand new answer"));
    // the original entry keeps its place at the front
    assert_eq!(reloaded.entries()[0].question, "hi there");

    // the learned pair is now matchable like any other
    assert_eq!(
        matcher.find_best_match(&reloaded, "completely unrelated texts"),
        Some(question)
    );
}

#[test]
fn inappropriate_answer_leaves_the_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir);
    let mut base = KnowledgeBase::load(&path).unwrap();
    let blacklist = Blacklist::from_terms(["badword"]);

    let outcome = try_learn(
        &mut base,
        &blacklist,
        "completely unrelated text",
        "this is badword",
    );
    assert_eq!(outcome, LearnOutcome::Rejected);
    base.save().unwrap();

    let reloaded = KnowledgeBase::load(&path).unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.entries()[0].answer, "hello!");
}

#[test]
fn skipped_teaching_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir);
    let mut base = KnowledgeBase::load(&path).unwrap();
    let blacklist = Blacklist::from_terms(["badword"]);

    let outcome = try_learn(&mut base, &blacklist, "completely unrelated text", "skip");
    assert_eq!(outcome, LearnOutcome::Skipped);
    assert_eq!(base.len(), 1);
}

#[test]
fn interrupt_style_double_save_keeps_one_learned_pair() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir);
    let mut base = KnowledgeBase::load(&path).unwrap();
    let blacklist = Blacklist::from_terms(["badword"]);

    try_learn(&mut base, &blacklist, "new question", "new answer");

    // interrupt hook and normal shutdown both call save
    base.save().unwrap();
    base.save().unwrap();

    let reloaded = KnowledgeBase::load(&path).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.entries()[1].question, "new question");
    assert_eq!(reloaded.entries()[1].answer, "new answer");
}
