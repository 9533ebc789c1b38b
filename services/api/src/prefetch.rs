//! services/api/src/prefetch.rs
//!
//! A per-user single-slot cache for speculatively generated follow-up
//! questions. The client fires a prefetch as soon as the idea step is
//! complete; by the time the user reaches the questions step the result is
//! usually ready and the foreground request skips the provider round trip.
//!
//! Each user holds exactly one slot. Starting a new prefetch bumps the
//! slot's generation, cancels the in-flight task, and discards any stored
//! result, so a stale prefetch can never be served for a newer draft. A
//! stored result is consumed at most once and only when the requesting
//! draft matches the one it was generated for.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use deep_content_core::domain::{ContentDraft, Question};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::adapters::questions::QuestionGenerator;

struct Slot {
    generation: u64,
    token: CancellationToken,
    draft: ContentDraft,
    result: Option<Vec<Question>>,
}

/// The shared prefetch cache. Lock scope never spans an await.
#[derive(Default)]
pub struct QuestionPrefetcher {
    slots: Mutex<HashMap<Uuid, Slot>>,
}

impl QuestionPrefetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the user's slot for a new draft: cancels any in-flight
    /// prefetch, discards its result, and returns the generation and token
    /// the new background task should run under.
    fn begin(&self, user_id: Uuid, draft: ContentDraft) -> (u64, CancellationToken) {
        let mut slots = self.lock_slots();
        let token = CancellationToken::new();
        let generation = match slots.get(&user_id) {
            Some(previous) => {
                previous.token.cancel();
                previous.generation + 1
            }
            None => 1,
        };
        slots.insert(
            user_id,
            Slot {
                generation,
                token: token.clone(),
                draft,
                result: None,
            },
        );
        (generation, token)
    }

    /// Stores a finished result, unless the slot has been superseded since
    /// the task started.
    fn store(&self, user_id: Uuid, generation: u64, questions: Vec<Question>) {
        let mut slots = self.lock_slots();
        if let Some(slot) = slots.get_mut(&user_id) {
            if slot.generation == generation {
                slot.result = Some(questions);
            } else {
                debug!(%user_id, generation, "discarding superseded prefetch result");
            }
        }
    }

    /// Consumes a stored result when it matches the requested draft.
    /// Returns `None` for a different draft, an unfinished prefetch, or an
    /// already-consumed slot.
    pub fn take_fresh(&self, user_id: Uuid, draft: &ContentDraft) -> Option<Vec<Question>> {
        let mut slots = self.lock_slots();
        let slot = slots.get_mut(&user_id)?;
        if &slot.draft != draft {
            return None;
        }
        slot.result.take()
    }

    /// Kicks off a background prefetch for `draft`. Failures are swallowed:
    /// the foreground questions request simply runs the provider call itself.
    pub fn spawn(
        self: &Arc<Self>,
        generator: Arc<QuestionGenerator>,
        user_id: Uuid,
        draft: ContentDraft,
    ) {
        let (generation, token) = self.begin(user_id, draft.clone());
        let prefetcher = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(%user_id, generation, "prefetch cancelled by a newer draft");
                }
                outcome = generator.generate(&draft) => match outcome {
                    Ok(questions) => prefetcher.store(user_id, generation, questions),
                    Err(e) => warn!(%user_id, error = %e, "question prefetch failed"),
                },
            }
        });
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Slot>> {
        match self.slots.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(idea: &str) -> ContentDraft {
        ContentDraft {
            content_type: "Blog Post".to_string(),
            idea: idea.to_string(),
            transcript: String::new(),
        }
    }

    fn questions(text: &str) -> Vec<Question> {
        vec![Question::unanswered(0, text)]
    }

    #[test]
    fn stored_result_is_consumed_once_for_the_matching_draft() {
        let prefetcher = QuestionPrefetcher::new();
        let user = Uuid::new_v4();
        let (generation, _token) = prefetcher.begin(user, draft("remote work"));
        prefetcher.store(user, generation, questions("What is your goal?"));

        let first = prefetcher.take_fresh(user, &draft("remote work"));
        assert_eq!(first.unwrap()[0].text, "What is your goal?");
        assert!(prefetcher.take_fresh(user, &draft("remote work")).is_none());
    }

    #[test]
    fn result_for_a_different_draft_is_not_served() {
        let prefetcher = QuestionPrefetcher::new();
        let user = Uuid::new_v4();
        let (generation, _token) = prefetcher.begin(user, draft("remote work"));
        prefetcher.store(user, generation, questions("What is your goal?"));

        assert!(prefetcher.take_fresh(user, &draft("office culture")).is_none());
        // The original draft can still consume it.
        assert!(prefetcher.take_fresh(user, &draft("remote work")).is_some());
    }

    #[test]
    fn a_new_prefetch_supersedes_the_old_slot() {
        let prefetcher = QuestionPrefetcher::new();
        let user = Uuid::new_v4();
        let (old_generation, old_token) = prefetcher.begin(user, draft("remote work"));
        let (new_generation, _token) = prefetcher.begin(user, draft("office culture"));

        assert!(old_token.is_cancelled());
        assert_eq!(new_generation, old_generation + 1);

        // A late store from the superseded task is discarded.
        prefetcher.store(user, old_generation, questions("stale question"));
        assert!(prefetcher.take_fresh(user, &draft("remote work")).is_none());
        assert!(prefetcher.take_fresh(user, &draft("office culture")).is_none());

        // The current generation can still land its result.
        prefetcher.store(user, new_generation, questions("fresh question"));
        assert_eq!(
            prefetcher
                .take_fresh(user, &draft("office culture"))
                .unwrap()[0]
                .text,
            "fresh question"
        );
    }

    #[test]
    fn slots_are_isolated_per_user() {
        let prefetcher = QuestionPrefetcher::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let (generation, _token) = prefetcher.begin(alice, draft("remote work"));
        prefetcher.store(alice, generation, questions("What is your goal?"));

        assert!(prefetcher.take_fresh(bob, &draft("remote work")).is_none());
        assert!(prefetcher.take_fresh(alice, &draft("remote work")).is_some());
    }
}
