// Personalized history view
//
// Plan notes and scratchpads are stored verbatim in the history. This is the
// only place that decides what a speaker gets to see of them.

use crate::markup::{self, Tag};
use crate::session::History;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewEntry {
    pub speaker: String,
    pub round: usize,
    /// Public text only.
    pub text: String,
}

/// What one speaker sees of the history before their turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalizedView {
    /// Last `window_size` records before the round, oldest first.
    pub entries: Vec<ViewEntry>,
    /// Last plan from the speaker's own most recent record, if it had one.
    pub previous_plan: Option<String>,
}

impl PersonalizedView {
    /// Build the view of `history` for `speaker` at `round`.
    ///
    /// `speaker` is `None` for an observer with no records of its own (the
    /// moderator), which never gets a previous plan from this history.
    pub fn build(
        speaker: Option<&str>,
        history: &History,
        round: usize,
        window_size: usize,
    ) -> Self {
        let prior: Vec<_> = history.before_round(round).collect();
        let skip = prior.len().saturating_sub(window_size);

        let entries = prior[skip..]
            .iter()
            .map(|turn| ViewEntry {
                speaker: turn.speaker.clone(),
                round: turn.round,
                text: markup::public_text(&turn.response),
            })
            .collect();

        let previous_plan = speaker.and_then(|name| {
            prior
                .iter()
                .rev()
                .find(|turn| turn.speaker == name)
                .and_then(|turn| markup::last(&turn.response, Tag::Plan))
                .map(|plan| plan.trim().to_string())
                .filter(|plan| !plan.is_empty())
        });

        Self {
            entries,
            previous_plan,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as `Name: text`, one per line.
    pub fn format(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}", e.speaker, e.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TurnRecord;

    fn turn(speaker: &str, round: usize, response: &str) -> TurnRecord {
        let record = TurnRecord::new(speaker, round, "prompt", response);
        if round == 0 {
            record.with_round_assignment(vec![speaker.to_string()])
        } else {
            record
        }
    }

    fn history() -> History {
        History::from_turns(vec![
            turn(
                "Alice",
                0,
                "<SCRATCHPAD>A2 is mine</SCRATCHPAD><ANSWER>I propose A1, B1</ANSWER><PLAN>push A2 later</PLAN>",
            ),
            turn(
                "Bob",
                1,
                "<ANSWER>B2 please</ANSWER><PLAN>bob secret plan</PLAN>",
            ),
            turn("Carol", 2, "no tags at all <PLAN>carol plan</PLAN>"),
            turn(
                "Alice",
                3,
                "<ANSWER>fine, A1 B2</ANSWER><PLAN>first</PLAN><PLAN>concede C</PLAN>",
            ),
            turn("Bob", 4, "<ANSWER>agreed</ANSWER>"),
        ])
    }

    #[test]
    fn test_window_is_chronological_suffix() {
        let view = PersonalizedView::build(Some("Carol"), &history(), 5, 3);
        let rounds: Vec<usize> = view.entries.iter().map(|e| e.round).collect();
        assert_eq!(rounds, vec![2, 3, 4]);
        assert_eq!(view.entries[0].text, "no tags at all");
    }

    #[test]
    fn test_only_rounds_before_current() {
        let view = PersonalizedView::build(Some("Carol"), &history(), 2, 10);
        assert_eq!(view.entries.len(), 2);
        assert!(view.format().starts_with("Alice: I propose A1, B1"));
    }

    #[test]
    fn test_previous_plan_outside_window() {
        // Bob's last turn with a plan is round 4 (no plan) -> none
        let view = PersonalizedView::build(Some("Bob"), &history(), 5, 1);
        assert_eq!(view.previous_plan, None);

        // Alice's round 3 record is outside a window of 1 but still surfaces
        let view = PersonalizedView::build(Some("Alice"), &history(), 5, 1);
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.previous_plan.as_deref(), Some("concede C"));
    }

    #[test]
    fn test_other_plans_never_visible() {
        let h = history();
        for round in 0..=5 {
            for window in 1..=6 {
                let view = PersonalizedView::build(Some("Carol"), &h, round, window);
                let rendered = format!("{}{:?}", view.format(), view.previous_plan);
                for secret in ["push A2 later", "bob secret plan", "concede C", "A2 is mine"] {
                    assert!(!rendered.contains(secret), "{secret} leaked at {round}/{window}");
                }
            }
        }
    }

    #[test]
    fn test_answer_drafted_in_scratchpad_not_shown() {
        let h = History::from_turns(vec![turn(
            "Alice",
            0,
            "<SCRATCHPAD>draft <ANSWER>my min is 61, A2 B2</ANSWER> no, too revealing</SCRATCHPAD>\
             <ANSWER>A1, B2</ANSWER>",
        )]);
        let view = PersonalizedView::build(Some("Bob"), &h, 1, 6);
        assert_eq!(view.format(), "Alice: A1, B2");
        assert!(!view.format().contains("61"));
    }

    #[test]
    fn test_observer_has_no_previous_plan() {
        let view = PersonalizedView::build(None, &history(), 5, 6);
        assert!(view.previous_plan.is_none());
        assert_eq!(view.entries.len(), 5);
    }
}
