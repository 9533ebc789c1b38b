//! crates/deep_content_core/src/workflow.rs
//!
//! The linear step sequence of the content workflow:
//! idea → follow-up questions → research → final content.
//!
//! Each step's entry guard checks for the presence of the upstream state it
//! needs; entering a step without it (including out-of-order entry by direct
//! navigation) is treated as the missing-state case and restarts the
//! workflow at the first step.

use crate::domain::{ContentDraft, Question};

/// One step of the content workflow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Idea,
    Questions,
    Research,
    Content,
}

/// The outcome of an entry guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// All upstream state is present; the step may be entered.
    Proceed,
    /// Required state is missing; restart at the idea step.
    RestartAtIdea,
}

/// Transient workflow state carried between steps.
#[derive(Debug, Clone, Default)]
pub struct ContentWorkflow {
    draft: Option<ContentDraft>,
    questions: Option<Vec<Question>>,
}

impl ContentWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completes the idea step.
    pub fn set_draft(&mut self, draft: ContentDraft) {
        self.draft = Some(draft);
    }

    /// Completes the questions step. Once stored here the questions are
    /// treated as immutable inputs to the research stage.
    pub fn set_questions(&mut self, questions: Vec<Question>) {
        self.questions = Some(questions);
    }

    pub fn draft(&self) -> Option<&ContentDraft> {
        self.draft.as_ref()
    }

    pub fn questions(&self) -> Option<&[Question]> {
        self.questions.as_deref()
    }

    /// Checks whether `step` may be entered with the state gathered so far.
    pub fn entry_guard(&self, step: WorkflowStep) -> GuardOutcome {
        let ready = match step {
            WorkflowStep::Idea => true,
            WorkflowStep::Questions => self.draft.is_some(),
            WorkflowStep::Research | WorkflowStep::Content => {
                self.draft.is_some() && self.questions.is_some()
            }
        };
        if ready {
            GuardOutcome::Proceed
        } else {
            GuardOutcome::RestartAtIdea
        }
    }

    /// "Start over": clears all transient state.
    pub fn start_over(&mut self) {
        self.draft = None;
        self.questions = None;
    }
}
