// Integration tests for final-deal evaluation

mod common;

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use common::{settings, write_game, ScriptedClient};
use parley::deal::{extract_deal, score, Deal};
use parley::driver::{run_experiment, score_session};
use parley::game::UtilityTable;
use parley::session::OpenMode;

#[tokio::test]
async fn test_final_vote_is_scored() {
    let game = TempDir::new().unwrap();
    write_game(game.path());
    let settings = settings(4);

    let client = Arc::new(ScriptedClient::new("the final deal is A1, B2"));
    let report = run_experiment(&settings, game.path(), OpenMode::Create, client)
        .await
        .unwrap();

    let eval = report.evaluation.unwrap();
    assert_eq!(eval.deal.slots(), &["A1", "B2"]);
    assert_eq!(eval.score_of("Alice"), Some(60));
    assert_eq!(eval.score_of("Bob"), Some(100));
    assert_eq!(eval.score_of("Carol"), Some(60));
    assert!(eval.passed);

    // Scoring the persisted session gives the same verdict.
    let rescored = score_session(&settings, game.path()).unwrap();
    assert_eq!(rescored.deal, eval.deal);
    assert_eq!(rescored.passed, eval.passed);
}

#[tokio::test]
async fn test_scoring_uses_session_copy_of_game() {
    let game = TempDir::new().unwrap();
    write_game(game.path());
    let settings = settings(4);

    let client = Arc::new(ScriptedClient::new("the final deal is A1, B2"));
    run_experiment(&settings, game.path(), OpenMode::Create, client)
        .await
        .unwrap();

    // Editing the game afterwards must not change the recorded outcome.
    fs::write(game.path().join("scores_files/alice.txt"), "1,1\n1,1\n60\n").unwrap();
    fs::write(game.path().join("initial_deal.txt"), "A2, B2\n").unwrap();

    let eval = score_session(&settings, game.path()).unwrap();
    assert_eq!(eval.score_of("Alice"), Some(60));
    assert!(eval.passed);

    let copy = settings.session_dir(game.path()).join("scores_files/alice.txt");
    assert_eq!(fs::read_to_string(copy).unwrap(), "10,50\n10,50\n60\n");
}

#[tokio::test]
async fn test_resume_keeps_original_game() {
    let game = TempDir::new().unwrap();
    write_game(game.path());
    let settings = settings(4);

    let flaky = Arc::new(ScriptedClient::new("A1, B2").failing_from(2));
    assert!(run_experiment(&settings, game.path(), OpenMode::Create, flaky)
        .await
        .is_err());

    fs::write(game.path().join("scores_files/alice.txt"), "1,1\n1,1\n60\n").unwrap();

    let client = Arc::new(ScriptedClient::new("A1, B2"));
    let report = run_experiment(&settings, game.path(), OpenMode::Resume, client)
        .await
        .unwrap();
    assert_eq!(report.evaluation.unwrap().score_of("Alice"), Some(60));
}

#[tokio::test]
async fn test_veto_blocks_deal() {
    let game = TempDir::new().unwrap();
    write_game(game.path());
    let settings = settings(2);

    // Alice (p1) gets 20 from A1, B1.
    let client = Arc::new(ScriptedClient::new("A1, B1"));
    let report = run_experiment(&settings, game.path(), OpenMode::Create, client)
        .await
        .unwrap();

    let eval = report.evaluation.unwrap();
    assert_eq!(eval.score_of("Alice"), Some(20));
    assert!(!eval.passed);
}

#[tokio::test]
async fn test_incomplete_final_deal_scores_zero() {
    let game = TempDir::new().unwrap();
    write_game(game.path());
    let settings = settings(2);

    let client = Arc::new(ScriptedClient::new("let's settle on B2"));
    let report = run_experiment(&settings, game.path(), OpenMode::Create, client)
        .await
        .unwrap();

    let eval = report.evaluation.unwrap();
    assert_eq!(eval.issues_suggested, 1);
    assert!(eval.scores.iter().all(|s| s.score == 0));
    assert!(!eval.passed);
}

#[test]
fn test_reference_scores() {
    let table = UtilityTable::from_rows(
        vec![
            vec![10, 20, 30],
            vec![5, 15, 25],
            vec![1, 2, 3],
            vec![4, 8, 12],
            vec![6, 9, 18],
        ],
        0,
    );

    let (deal, suggested) = extract_deal("We agree on A2,\nB1, C3 and D2 with E1.", 5);
    assert_eq!(suggested, 5);
    assert_eq!(score(&table, &deal, 5), 42);

    let gap = Deal::from_slots(["A2", "B3", "", "D1", "E2"]);
    assert_eq!(score(&table, &gap, 5), 0);
}

#[test]
fn test_extract_is_idempotent_over_canonical_form() {
    for text in [
        "A1 B2 C3",
        "I'd take C2 then A3, never B9, maybe A1",
        "nothing here",
        "B1\nA2\r\nC1",
    ] {
        let (deal, _) = extract_deal(text, 3);
        let (again, _) = extract_deal(&deal.canonical(), 3);
        assert_eq!(again, deal, "not idempotent for {text:?}");
    }
}
