// Shared fixtures: a scripted completion client and a small game directory

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use parley::config::ExperimentSettings;
use parley::providers::{CompletionClient, CompletionRequest};

pub const MODERATOR_MODEL: &str = "moderator-model";

/// Answers every request from a script and records what it was asked.
///
/// Participants are told apart by model name (one model per party in the
/// fixture game). Responses carry a private scratchpad and plan tagged with
/// the model and call number so leaks are easy to spot.
pub struct ScriptedClient {
    answer: String,
    moderator_reply: String,
    fail_on_call: Option<usize>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            moderator_reply: "<PARTY>Carol</PARTY>".to_string(),
            fail_on_call: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_moderator_reply(mut self, reply: &str) -> Self {
        self.moderator_reply = reply.to_string();
        self
    }

    /// Fail the `call`-th request (0-based) and every one after it.
    pub fn failing_from(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        if self.fail_on_call.is_some_and(|n| call >= n) {
            bail!("scripted outage at call {}", call);
        }

        if request.model == MODERATOR_MODEL {
            return Ok(format!(
                "<SCRATCHPAD>moderator thinking {call}</SCRATCHPAD>{}<PLAN>moderator-plan-{call}</PLAN>",
                self.moderator_reply
            ));
        }

        Ok(format!(
            "<SCRATCHPAD>scratch-{model}-{call}</SCRATCHPAD><ANSWER>{model} says {answer}</ANSWER><PLAN>plan-{model}-{call}</PLAN>",
            model = request.model,
            answer = self.answer,
        ))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Three parties over two issues.
///
/// | party | role | A      | B      | min |
/// |-------|------|--------|--------|-----|
/// | Alice | p1   | 10, 50 | 10, 50 | 60  |
/// | Bob   | p2   | 50, 10 | 10, 50 | 60  |
/// | Carol | -    | 50, 10 | 50, 10 | 60  |
pub fn write_game(dir: &Path) {
    fs::create_dir_all(dir.join("scores_files")).unwrap();
    fs::write(
        dir.join("config.txt"),
        "Alice,alice,p1,cooperative,alice\n\
         Bob,bob,p2,greedy,bob\n\
         Carol,carol,member,cooperative,carol\n",
    )
    .unwrap();
    fs::write(dir.join("scores_files/alice.txt"), "10,50\n10,50\n60\n").unwrap();
    fs::write(dir.join("scores_files/bob.txt"), "50,10\n10,50\n60\n").unwrap();
    fs::write(dir.join("scores_files/carol.txt"), "50,10\n50,10\n60\n").unwrap();
    fs::write(dir.join("initial_deal.txt"), "A1, B1\n").unwrap();
}

pub fn settings(rounds_num: usize) -> ExperimentSettings {
    ExperimentSettings {
        exp_name: "test".to_string(),
        agents_num: 3,
        issues_num: 2,
        rounds_num,
        window_size: 2,
        moderator_model: MODERATOR_MODEL.to_string(),
        seed: Some(42),
        ..Default::default()
    }
}
