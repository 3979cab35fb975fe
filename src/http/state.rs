use std::sync::Arc;

use crate::coalesce::{FormFiller, QuestionEvaluator};
use crate::lifecycle::SessionSupervisor;
use crate::llm::LlmService;
use crate::session::{Mode, SessionStore};
use crate::storage::KeyValueStore;
use crate::usage::UsageLedger;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub sessions: SessionStore,
    pub supervisor: Arc<SessionSupervisor>,
    pub usage: Arc<UsageLedger>,
    pub form: Arc<FormFiller>,
    pub questions: Arc<QuestionEvaluator>,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, llm: Arc<dyn LlmService>) -> Self {
        let sessions = SessionStore::new(Arc::clone(&store));

        // Questions survive restarts with the realtime session record.
        let persisted_questions = sessions.load(Mode::Realtime).questions;

        Self {
            supervisor: Arc::new(SessionSupervisor::new()),
            usage: Arc::new(UsageLedger::new(Arc::clone(&store))),
            form: Arc::new(FormFiller::new(Arc::clone(&llm))),
            questions: Arc::new(QuestionEvaluator::with_questions(llm, persisted_questions)),
            sessions,
            store,
        }
    }
}
