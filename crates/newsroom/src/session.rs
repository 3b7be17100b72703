//! Per-user session state machine.
//!
//! A [`Session`] is driven exclusively by [`SessionEvent`]s. Applying an event
//! mutates the session and returns a [`Transition`] naming the phase change and
//! at most one [`Effect`] the caller must carry out (start a generation, write
//! the click log). Rendering is separate: [`Session::view`] describes what the
//! page should show for the current state.
//!
//! ```text
//!  LoggedOut --login ok--> Idle --valid submit--> Generating --article--> ShowingResult
//!      ^                    ^  \                      |  \                    |
//!      |                    |   `-invalid submit-'    |   `-failure-> Idle    |
//!      `-------------------- logout (from any logged-in phase) ---------------'
//! ```
//!
//! Invariants:
//!
//! - the counter exists only while logged in, starts at zero on every login and
//!   increments once per submission that passes validation;
//! - at most one generation is in flight; submissions while `Generating` are
//!   rejected;
//! - a generation result is accepted only if its ticket matches the in-flight
//!   one, so results that outlive a logout are dropped.

use serde::{Deserialize, Serialize};

use crate::{
    ArticleForm, ArticleText, ClickCount, CredentialChecker, GenerationError, GenerationTicket,
    Instruction, NewsdeskError, SessionId,
};

/// Message shown once after a login success.
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful!";

// ---------------------------------------------------------------------------
// States and events
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Login form is shown.
    LoggedOut,
    /// Main form is shown with no article.
    Idle,
    /// A generation request is in flight.
    Generating,
    /// The last generated article is shown.
    ShowingResult,
}

impl SessionPhase {
    /// Returns `true` for every phase except [`SessionPhase::LoggedOut`].
    pub fn is_logged_in(self) -> bool {
        !matches!(self, SessionPhase::LoggedOut)
    }
}

/// Something that happened to a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The login form was submitted.
    LoginSubmit {
        /// Username as typed.
        username: String,
        /// Password as typed.
        password: String,
    },
    /// "Generate Article" was clicked with these form values.
    GenerateSubmit(ArticleForm),
    /// The generation gateway finished a request.
    GenerationFinished {
        /// Ticket handed out with the matching [`Effect::StartGeneration`].
        ticket: GenerationTicket,
        /// What the gateway produced.
        outcome: Result<ArticleText, GenerationError>,
    },
    /// "Logout" was clicked.
    LogoutClick,
}

impl SessionEvent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::LoginSubmit { .. } => "login_submit",
            SessionEvent::GenerateSubmit(_) => "generate_submit",
            SessionEvent::GenerationFinished { .. } => "generation_finished",
            SessionEvent::LogoutClick => "logout_click",
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call the generation gateway and report back with
    /// [`SessionEvent::GenerationFinished`] carrying `ticket`.
    StartGeneration {
        /// Identifies this request.
        ticket: GenerationTicket,
        /// What to generate.
        instruction: Instruction,
    },
    /// Append a click log entry for a logout.
    RecordClicks {
        /// Counter value at the moment of logout.
        counter: ClickCount,
    },
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Phase before the event.
    pub from: SessionPhase,
    /// Phase after the event.
    pub to: SessionPhase,
    /// Work the caller must perform.
    pub effect: Option<Effect>,
}

// ---------------------------------------------------------------------------
// Render descriptor
// ---------------------------------------------------------------------------

/// Tone of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Confirmation.
    Success,
    /// Something the user must fix or know went wrong.
    Error,
}

/// Inline message displayed above the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Tone.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// A success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// An error notice built from the error's display text.
    pub fn error(err: &NewsdeskError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.to_string(),
        }
    }
}

/// What the result pane shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPane {
    /// No article yet.
    Placeholder,
    /// A request is in flight.
    Generating,
    /// The generated article (markdown), with a copy action.
    Article(ArticleText),
}

/// What the page should render for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// The login form.
    Login {
        /// Message from the last login attempt, if any.
        notice: Option<Notice>,
    },
    /// The main form and result pane.
    Desk {
        /// Current form values.
        form: ArticleForm,
        /// Accepted submissions so far in this login.
        counter: ClickCount,
        /// Result pane contents.
        pane: ResultPane,
        /// Message from the last event, if any.
        notice: Option<Notice>,
    },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One user's state across repeated form submissions.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    phase: SessionPhase,
    counter: Option<ClickCount>,
    form: ArticleForm,
    result: Option<ArticleText>,
    notice: Option<Notice>,
    in_flight: Option<GenerationTicket>,
    last_ticket: GenerationTicket,
}

impl Session {
    /// Creates a logged-out session.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            phase: SessionPhase::LoggedOut,
            counter: None,
            form: ArticleForm::default(),
            result: None,
            notice: None,
            in_flight: None,
            last_ticket: GenerationTicket::new(0),
        }
    }

    /// This session's id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Click counter; `None` while logged out.
    pub fn counter(&self) -> Option<ClickCount> {
        self.counter
    }

    /// Ticket of the generation currently in flight, if any.
    pub fn in_flight(&self) -> Option<GenerationTicket> {
        self.in_flight
    }

    /// Applies `event` and reports the resulting transition.
    pub fn apply(&mut self, event: SessionEvent, checker: &CredentialChecker) -> Transition {
        let from = self.phase;

        // A stale generation result must not disturb whatever the user is
        // looking at now, including its notice.
        if let SessionEvent::GenerationFinished { ticket, .. } = &event {
            if self.phase != SessionPhase::Generating || self.in_flight != Some(*ticket) {
                tracing::debug!(session = %self.id, %ticket, "dropping stale generation result");
                return self.transition(from, None);
            }
        }

        self.notice = None;
        let effect = match event {
            SessionEvent::LoginSubmit { username, password } => {
                self.on_login(&username, &password, checker);
                None
            }
            SessionEvent::GenerateSubmit(form) => self.on_generate(form),
            SessionEvent::GenerationFinished { outcome, .. } => {
                self.on_finished(outcome);
                None
            }
            SessionEvent::LogoutClick => self.on_logout(),
        };

        self.transition(from, effect)
    }

    /// Describes what should be rendered for the current state.
    pub fn view(&self) -> View {
        if !self.phase.is_logged_in() {
            return View::Login {
                notice: self.notice.clone(),
            };
        }

        let pane = match (self.phase, &self.result) {
            (SessionPhase::Generating, _) => ResultPane::Generating,
            (_, Some(article)) => ResultPane::Article(article.clone()),
            (_, None) => ResultPane::Placeholder,
        };

        View::Desk {
            form: self.form.clone(),
            counter: self.counter.unwrap_or_default(),
            pane,
            notice: self.notice.clone(),
        }
    }

    fn on_login(&mut self, username: &str, password: &str, checker: &CredentialChecker) {
        if self.phase.is_logged_in() {
            return;
        }
        if checker.check(username, password) {
            self.phase = SessionPhase::Idle;
            self.counter.get_or_insert_with(ClickCount::zero);
            self.notice = Some(Notice::success(LOGIN_SUCCESS_MESSAGE));
        } else {
            self.notice = Some(Notice::error(&NewsdeskError::InvalidCredentials));
        }
    }

    fn on_generate(&mut self, form: ArticleForm) -> Option<Effect> {
        match self.phase {
            SessionPhase::LoggedOut => {
                self.notice = Some(Notice::error(&NewsdeskError::NotLoggedIn));
                None
            }
            SessionPhase::Generating => {
                self.notice = Some(Notice::error(&NewsdeskError::GenerationInProgress));
                None
            }
            SessionPhase::Idle | SessionPhase::ShowingResult => {
                self.result = None;
                let built = form.build();
                self.form = form;
                match built {
                    Err(err) => {
                        self.phase = SessionPhase::Idle;
                        self.notice = Some(Notice::error(&NewsdeskError::Validation(err)));
                        None
                    }
                    Ok(request) => {
                        self.counter = Some(self.counter.unwrap_or_default().incremented());
                        self.last_ticket = self.last_ticket.next();
                        self.in_flight = Some(self.last_ticket);
                        self.phase = SessionPhase::Generating;
                        Some(Effect::StartGeneration {
                            ticket: self.last_ticket,
                            instruction: request.instruction(),
                        })
                    }
                }
            }
        }
    }

    fn on_finished(&mut self, outcome: Result<ArticleText, GenerationError>) {
        self.in_flight = None;
        match outcome {
            Ok(article) => {
                self.result = Some(article);
                self.phase = SessionPhase::ShowingResult;
            }
            Err(err) => {
                self.phase = SessionPhase::Idle;
                self.notice = Some(Notice::error(&NewsdeskError::Generation(err)));
            }
        }
    }

    fn on_logout(&mut self) -> Option<Effect> {
        if !self.phase.is_logged_in() {
            return None;
        }
        let counter = self.counter.take().unwrap_or_default();
        self.phase = SessionPhase::LoggedOut;
        self.form = ArticleForm::default();
        self.result = None;
        self.in_flight = None;
        Some(Effect::RecordClicks { counter })
    }

    fn transition(&self, from: SessionPhase, effect: Option<Effect>) -> Transition {
        Transition {
            from,
            to: self.phase,
            effect,
        }
    }
}
