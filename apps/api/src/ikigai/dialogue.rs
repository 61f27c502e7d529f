//! The Ikigai questionnaire as a linear state machine: four phases of four
//! prompts each, one answer per prompt.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::ikigai::summary::generate_summary;
use crate::models::ikigai::{IkigaiCategory, IkigaiData};

pub const PHASE_COUNT: usize = 4;
pub const QUESTIONS_PER_PHASE: usize = 4;

#[derive(Debug)]
pub struct Phase {
    pub title: &'static str,
    pub category: IkigaiCategory,
    pub questions: [&'static str; QUESTIONS_PER_PHASE],
}

pub static PHASES: [Phase; PHASE_COUNT] = [
    Phase {
        title: "What I Love",
        category: IkigaiCategory::WhatILove,
        questions: [
            "What activities make you lose track of time?",
            "What topics do you love learning about?",
            "What would you do if money wasn't a concern?",
            "What brings you joy and excitement?",
        ],
    },
    Phase {
        title: "What I'm Good At",
        category: IkigaiCategory::WhatImGoodAt,
        questions: [
            "What skills do others often compliment you on?",
            "What tasks do you find easy that others struggle with?",
            "What have you been doing for a long time?",
            "What achievements are you most proud of?",
        ],
    },
    Phase {
        title: "What the World Needs",
        category: IkigaiCategory::WhatTheWorldNeeds,
        questions: [
            "What problems in the world do you want to solve?",
            "What needs do you see in your community?",
            "What changes would you like to see in the world?",
            "What causes are you passionate about?",
        ],
    },
    Phase {
        title: "What I Can Be Paid For",
        category: IkigaiCategory::WhatICanBePaidFor,
        questions: [
            "What skills do you have that people would pay for?",
            "What services have you provided in the past?",
            "What expertise have you developed?",
            "What value can you create for others?",
        ],
    },
];

pub const TOTAL_QUESTIONS: usize = PHASE_COUNT * QUESTIONS_PER_PHASE;

const WELCOME: &str = "Welcome! Let's discover your Ikigai together. I'll ask you questions about different aspects of your life, and we'll map them out in real-time.";
const OPENING_QUESTION: &str =
    "First, let's explore what you love. What activities make you lose track of time?";
const COMPLETED: &str =
    "Congratulations! You've completed all phases. Here's your Ikigai summary:";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Bot,
    User,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Message {
    pub speaker: Speaker,
    pub content: String,
}

impl Message {
    fn bot(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            content: content.into(),
        }
    }
}

/// The full list of a category after an answer was added to it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryUpdate {
    pub category: IkigaiCategory,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Blank input; nothing changed.
    Ignored,
    /// The questionnaire had already finished; nothing changed.
    AlreadyComplete,
    NextQuestion { update: CategoryUpdate },
    NextPhase { update: CategoryUpdate, phase: &'static str },
    Completed { update: CategoryUpdate, summary: String },
}

impl AnswerOutcome {
    pub fn update(&self) -> Option<&CategoryUpdate> {
        match self {
            AnswerOutcome::Ignored | AnswerOutcome::AlreadyComplete => None,
            AnswerOutcome::NextQuestion { update }
            | AnswerOutcome::NextPhase { update, .. }
            | AnswerOutcome::Completed { update, .. } => Some(update),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IkigaiDialogue {
    phase_index: usize,
    question_index: usize,
    answers: IkigaiData,
    transcript: Vec<Message>,
    complete: bool,
}

impl Default for IkigaiDialogue {
    fn default() -> Self {
        Self::new()
    }
}

impl IkigaiDialogue {
    pub fn new() -> Self {
        Self {
            phase_index: 0,
            question_index: 0,
            answers: IkigaiData::default(),
            transcript: vec![Message::bot(WELCOME), Message::bot(OPENING_QUESTION)],
            complete: false,
        }
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn answers(&self) -> &IkigaiData {
        &self.answers
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn current_phase(&self) -> &'static Phase {
        &PHASES[self.phase_index]
    }

    /// The prompt awaiting an answer, or `None` once complete.
    pub fn current_question(&self) -> Option<&'static str> {
        (!self.complete).then(|| self.current_phase().questions[self.question_index])
    }

    /// Answers recorded so far.
    pub fn answered(&self) -> usize {
        if self.complete {
            TOTAL_QUESTIONS
        } else {
            self.phase_index * QUESTIONS_PER_PHASE + self.question_index
        }
    }

    pub fn submit(&mut self, input: &str) -> AnswerOutcome {
        let answer = input.trim();
        if answer.is_empty() {
            return AnswerOutcome::Ignored;
        }
        if self.complete {
            return AnswerOutcome::AlreadyComplete;
        }

        self.transcript.push(Message {
            speaker: Speaker::User,
            content: answer.to_string(),
        });
        let phase = self.current_phase();
        let items = self.answers.items_mut(phase.category);
        items.push(answer.to_string());
        let update = CategoryUpdate {
            category: phase.category,
            items: items.clone(),
        };

        if self.question_index + 1 < QUESTIONS_PER_PHASE {
            self.question_index += 1;
            self.transcript
                .push(Message::bot(phase.questions[self.question_index]));
            AnswerOutcome::NextQuestion { update }
        } else if self.phase_index + 1 < PHASE_COUNT {
            self.phase_index += 1;
            self.question_index = 0;
            let next = self.current_phase();
            self.transcript.push(Message::bot(format!(
                "Great! You've completed the {} phase. Let's move on to {}.",
                phase.title, next.title
            )));
            self.transcript.push(Message::bot(next.questions[0]));
            AnswerOutcome::NextPhase {
                update,
                phase: next.title,
            }
        } else {
            self.complete = true;
            let summary = generate_summary(&self.answers);
            self.answers.summary = Some(summary.clone());
            self.transcript.push(Message::bot(COMPLETED));
            self.transcript.push(Message::bot(summary.clone()));
            AnswerOutcome::Completed { update, summary }
        }
    }
}

/// Snapshot of a dialogue for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueView {
    pub phase_index: usize,
    pub question_index: usize,
    pub phase_title: &'static str,
    pub current_question: Option<&'static str>,
    pub answered: usize,
    pub total_questions: usize,
    pub complete: bool,
    pub answers: IkigaiData,
    pub transcript: Vec<Message>,
}

impl From<&IkigaiDialogue> for DialogueView {
    fn from(d: &IkigaiDialogue) -> Self {
        Self {
            phase_index: d.phase_index,
            question_index: d.question_index,
            phase_title: d.current_phase().title,
            current_question: d.current_question(),
            answered: d.answered(),
            total_questions: TOTAL_QUESTIONS,
            complete: d.complete,
            answers: d.answers.clone(),
            transcript: d.transcript.clone(),
        }
    }
}

/// In-progress dialogues, one per user. Answers for one user are serialized.
#[derive(Default)]
pub struct DialogueRegistry {
    dialogues: RwLock<HashMap<Uuid, Arc<Mutex<IkigaiDialogue>>>>,
}

impl DialogueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's dialogue, starting a fresh one if none is running.
    pub async fn start_or_resume(&self, user_id: Uuid) -> DialogueView {
        let slot = self
            .dialogues
            .write()
            .await
            .entry(user_id)
            .or_default()
            .clone();
        let dialogue = slot.lock().await;
        DialogueView::from(&*dialogue)
    }

    async fn slot(&self, user_id: Uuid) -> Option<Arc<Mutex<IkigaiDialogue>>> {
        self.dialogues.read().await.get(&user_id).cloned()
    }

    pub async fn get(&self, user_id: Uuid) -> Option<DialogueView> {
        let slot = self.slot(user_id).await?;
        let dialogue = slot.lock().await;
        Some(DialogueView::from(&*dialogue))
    }

    /// Feeds an answer to the user's dialogue and hands the outcome to
    /// `persist`. The dialogue only advances once `persist` succeeds.
    /// `None` if no dialogue is running.
    pub async fn answer<F, Fut, E>(
        &self,
        user_id: Uuid,
        input: &str,
        persist: F,
    ) -> Option<Result<(AnswerOutcome, DialogueView), E>>
    where
        F: FnOnce(AnswerOutcome) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let slot = self.slot(user_id).await?;
        let mut dialogue = slot.lock().await;

        let mut next = dialogue.clone();
        let outcome = next.submit(input);
        if let Err(e) = persist(outcome.clone()).await {
            return Some(Err(e));
        }
        *dialogue = next;
        Some(Ok((outcome, DialogueView::from(&*dialogue))))
    }

    pub async fn reset(&self, user_id: Uuid) -> bool {
        self.dialogues.write().await.remove(&user_id).is_some()
    }
}
