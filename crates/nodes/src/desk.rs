//! The newsdesk controller.
//!
//! [`Newsdesk`] hosts every live [`Session`] in the process and is the only
//! place events are applied to them. It carries out the [`Effect`]s the state
//! machine requests:
//!
//! - `StartGeneration` spawns a task that calls the [`GenerationGateway`] and
//!   feeds the outcome back as [`SessionEvent::GenerationFinished`];
//! - `RecordClicks` appends to the [`ClickLog`]; a failed write is logged as a
//!   warning and the logout still completes.
//!
//! Sessions are independent: each has its own state and its own single
//! generation slot. Sessions untouched for [`SESSION_IDLE_TTL`] are dropped the
//! next time a new session is opened.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use newsroom::{
    ClickCount, ClickLog, ClickLogEntry, CredentialChecker, Effect, GenerationGateway,
    GenerationTicket, Instruction, Session, SessionEvent, SessionId, SessionPhase, Timestamp,
    View,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How long an untouched session is kept.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

struct Slot {
    session: Session,
    last_seen: Instant,
}

impl Slot {
    fn new(id: SessionId) -> Self {
        Self {
            session: Session::new(id),
            last_seen: Instant::now(),
        }
    }
}

struct DeskInner {
    checker: CredentialChecker,
    gateway: Arc<dyn GenerationGateway>,
    click_log: Arc<dyn ClickLog>,
    sessions: Mutex<HashMap<SessionId, Slot>>,
    generations: Mutex<HashMap<SessionId, (GenerationTicket, JoinHandle<()>)>>,
    shutdown: CancellationToken,
}

/// Session registry and effect executor. Cheap to clone.
#[derive(Clone)]
pub struct Newsdesk {
    inner: Arc<DeskInner>,
}

impl Newsdesk {
    /// Creates a desk with no sessions.
    pub fn new(
        checker: CredentialChecker,
        gateway: Arc<dyn GenerationGateway>,
        click_log: Arc<dyn ClickLog>,
    ) -> Self {
        Self {
            inner: Arc::new(DeskInner {
                checker,
                gateway,
                click_log,
                sessions: Mutex::new(HashMap::new()),
                generations: Mutex::new(HashMap::new()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Returns `candidate` if it names a live session, otherwise opens a new
    /// one. The flag is `true` when a session was created.
    pub async fn resolve(&self, candidate: Option<SessionId>) -> (SessionId, bool) {
        let mut sessions = self.inner.sessions.lock().await;
        if let Some(id) = candidate {
            if let Some(slot) = sessions.get_mut(&id) {
                slot.last_seen = Instant::now();
                return (id, false);
            }
        }

        let before = sessions.len();
        sessions.retain(|_, slot| {
            slot.session.phase() == SessionPhase::Generating
                || slot.last_seen.elapsed() < SESSION_IDLE_TTL
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(pruned, "dropped idle sessions");
        }

        let id = SessionId::new_random();
        sessions.insert(id, Slot::new(id));
        info!(session = %id, live = sessions.len(), "session opened");
        (id, true)
    }

    /// Describes what `id` should currently render. Unknown ids render as a
    /// fresh logged-out session.
    pub async fn view(&self, id: SessionId) -> View {
        let sessions = self.inner.sessions.lock().await;
        match sessions.get(&id) {
            Some(slot) => slot.session.view(),
            None => Session::new(id).view(),
        }
    }

    /// Applies a user event to session `id` and returns the resulting view.
    ///
    /// An unknown id is registered on the spot, so a stale cookie behaves like
    /// a first visit.
    pub async fn dispatch(&self, id: SessionId, event: SessionEvent) -> View {
        let (effect, view) = self.inner.apply(id, event).await;
        match effect {
            Some(Effect::StartGeneration {
                ticket,
                instruction,
            }) => self.spawn_generation(id, ticket, instruction).await,
            Some(Effect::RecordClicks { counter }) => self.inner.record_clicks(id, counter).await,
            None => {}
        }
        view
    }

    /// Waits until the generation currently running for `id` (if any) has
    /// reported back.
    pub async fn wait_for_generation(&self, id: SessionId) {
        let tracked = self.inner.generations.lock().await.remove(&id);
        if let Some((_, handle)) = tracked {
            if let Err(err) = handle.await {
                error!(session = %id, error = %err, "generation task aborted");
            }
        }
    }

    /// Number of sessions currently hosted.
    pub async fn session_count(&self) -> usize {
        self.inner.sessions.lock().await.len()
    }

    /// Number of generation tasks that have not yet reported back.
    pub async fn pending_generations(&self) -> usize {
        self.inner.generations.lock().await.len()
    }

    /// Cancels every in-flight generation. Used on process shutdown.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    async fn spawn_generation(&self, id: SessionId, ticket: GenerationTicket, instruction: Instruction) {
        let inner = Arc::clone(&self.inner);
        let cancel = self.inner.shutdown.child_token();
        // Held across the spawn so the task cannot untrack itself before it
        // has been tracked.
        let mut generations = self.inner.generations.lock().await;
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let outcome = inner.gateway.generate(&instruction, cancel).await;
            match &outcome {
                Ok(_) => info!(
                    session = %id,
                    %ticket,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "generation succeeded"
                ),
                Err(err) => error!(
                    session = %id,
                    %ticket,
                    error = %err,
                    retry = ?err.retry_policy(),
                    "generation failed"
                ),
            }
            inner
                .apply(id, SessionEvent::GenerationFinished { ticket, outcome })
                .await;
            inner.untrack(id, ticket).await;
        });
        generations.insert(id, (ticket, handle));
    }
}

impl DeskInner {
    async fn apply(&self, id: SessionId, event: SessionEvent) -> (Option<Effect>, View) {
        let mut sessions = self.sessions.lock().await;
        let slot = sessions.entry(id).or_insert_with(|| Slot::new(id));
        slot.last_seen = Instant::now();

        let name = event.name();
        let transition = slot.session.apply(event, &self.checker);
        if transition.from != transition.to {
            info!(
                session = %id,
                event = name,
                from = ?transition.from,
                to = ?transition.to,
                "session transition"
            );
        }
        (transition.effect, slot.session.view())
    }

    /// Drops the tracked handle for `id` if it still belongs to `ticket`.
    async fn untrack(&self, id: SessionId, ticket: GenerationTicket) {
        let mut generations = self.generations.lock().await;
        if matches!(generations.get(&id), Some((current, _)) if *current == ticket) {
            generations.remove(&id);
        }
    }

    async fn record_clicks(&self, id: SessionId, counter: ClickCount) {
        let entry = ClickLogEntry {
            timestamp: Timestamp::now(),
            counter,
        };
        let click_log = Arc::clone(&self.click_log);
        match tokio::task::spawn_blocking(move || click_log.append(&entry)).await {
            Ok(Ok(())) => info!(session = %id, %counter, "click count recorded"),
            Ok(Err(err)) => warn!(session = %id, %counter, error = %err, "click count not recorded"),
            Err(err) => warn!(session = %id, %counter, error = %err, "click log writer panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use newsroom::{ArticleForm, ArticleText, ClickLogError, GenerationError, ResultPane};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    /// Answers with the instruction's topic line, optionally holding each
    /// request until `gate` is notified.
    struct TestGateway {
        gate: Option<Notify>,
    }

    #[async_trait]
    impl GenerationGateway for TestGateway {
        async fn generate(
            &self,
            instruction: &Instruction,
            cancel: CancellationToken,
        ) -> Result<ArticleText, GenerationError> {
            if let Some(gate) = &self.gate {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
                    _ = gate.notified() => {}
                }
            }
            let first = instruction.as_str().lines().next().unwrap_or_default();
            Ok(ArticleText::new(first).unwrap())
        }
    }

    #[derive(Default)]
    struct MemoryLog {
        entries: StdMutex<Vec<ClickLogEntry>>,
        fail: bool,
    }

    impl ClickLog for MemoryLog {
        fn append(&self, entry: &ClickLogEntry) -> Result<(), ClickLogError> {
            if self.fail {
                return Err(ClickLogError {
                    path: "click_log.txt".into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            self.entries.lock().unwrap().push(*entry);
            Ok(())
        }
    }

    fn desk(gateway: Arc<TestGateway>, log: Arc<MemoryLog>) -> Newsdesk {
        Newsdesk::new(
            CredentialChecker::new(Some("u".into()), Some("p".into())),
            gateway,
            log,
        )
    }

    fn gated() -> Arc<TestGateway> {
        Arc::new(TestGateway {
            gate: Some(Notify::new()),
        })
    }

    fn instant() -> Arc<TestGateway> {
        Arc::new(TestGateway { gate: None })
    }

    fn login() -> SessionEvent {
        SessionEvent::LoginSubmit {
            username: "u".into(),
            password: "p".into(),
        }
    }

    fn generate(topic: &str) -> SessionEvent {
        SessionEvent::GenerateSubmit(ArticleForm {
            topic: topic.into(),
            ..ArticleForm::default()
        })
    }

    #[tokio::test]
    async fn resolve_reuses_known_sessions() {
        let desk = desk(gated(), Arc::default());
        let (id, created) = desk.resolve(None).await;
        assert!(created);
        assert_eq!(desk.resolve(Some(id)).await, (id, false));

        let (other, created) = desk.resolve(Some(SessionId::new_random())).await;
        assert!(created);
        assert_ne!(other, id);
        assert_eq!(desk.session_count().await, 2);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let desk = desk(instant(), Arc::default());
        let (a, _) = desk.resolve(None).await;
        let (b, _) = desk.resolve(None).await;

        desk.dispatch(a, login()).await;
        desk.dispatch(a, generate("Alpha")).await;

        assert!(matches!(desk.view(b).await, View::Login { .. }));
        desk.dispatch(b, login()).await;
        desk.dispatch(b, generate("Beta")).await;

        desk.wait_for_generation(a).await;
        desk.wait_for_generation(b).await;

        for (id, topic) in [(a, "Alpha"), (b, "Beta")] {
            match desk.view(id).await {
                View::Desk {
                    pane: ResultPane::Article(text),
                    ..
                } => assert_eq!(text.as_str(), format!("Topic: {topic}")),
                other => panic!("unexpected view {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn logout_during_generation_logs_current_counter() {
        let gateway = gated();
        let log = Arc::new(MemoryLog::default());
        let desk = desk(gateway.clone(), log.clone());
        let (id, _) = desk.resolve(None).await;

        desk.dispatch(id, login()).await;
        desk.dispatch(id, generate("Late")).await;
        let view = desk.dispatch(id, SessionEvent::LogoutClick).await;
        assert_eq!(view, View::Login { notice: None });

        if let Some(gate) = &gateway.gate {
            gate.notify_one();
        }
        desk.wait_for_generation(id).await;

        assert!(matches!(desk.view(id).await, View::Login { .. }));
        let entries = log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].counter, ClickCount::new(1));
    }

    #[tokio::test]
    async fn click_log_failure_does_not_block_logout() {
        let log = Arc::new(MemoryLog {
            fail: true,
            ..MemoryLog::default()
        });
        let desk = desk(gated(), log);
        let (id, _) = desk.resolve(None).await;
        desk.dispatch(id, login()).await;
        let view = desk.dispatch(id, SessionEvent::LogoutClick).await;
        assert!(matches!(view, View::Login { .. }));
    }

    #[tokio::test]
    async fn finished_generations_are_untracked() {
        let desk = desk(instant(), Arc::default());
        let mut ids = Vec::new();
        for n in 0..50 {
            let (id, _) = desk.resolve(None).await;
            desk.dispatch(id, login()).await;
            desk.dispatch(id, generate(&format!("Topic {n}"))).await;
            ids.push(id);
        }

        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while desk.pending_generations().await > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("generation handles were not released");

        for id in ids {
            assert!(matches!(
                desk.view(id).await,
                View::Desk {
                    pane: ResultPane::Article(_),
                    ..
                }
            ));
        }
    }

    #[tokio::test]
    async fn superseded_generation_does_not_untrack_its_successor() {
        let gateway = gated();
        let desk = desk(gateway.clone(), Arc::default());
        let (id, _) = desk.resolve(None).await;

        desk.dispatch(id, login()).await;
        desk.dispatch(id, generate("First")).await;
        desk.dispatch(id, SessionEvent::LogoutClick).await;
        desk.dispatch(id, login()).await;
        desk.dispatch(id, generate("Second")).await;
        assert_eq!(desk.pending_generations().await, 1);

        // Releases the first request only; the second is still waiting.
        if let Some(gate) = &gateway.gate {
            gate.notify_one();
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(desk.pending_generations().await, 1);
        assert!(matches!(
            desk.view(id).await,
            View::Desk {
                pane: ResultPane::Generating,
                ..
            }
        ));

        if let Some(gate) = &gateway.gate {
            gate.notify_one();
        }
        desk.wait_for_generation(id).await;
        match desk.view(id).await {
            View::Desk {
                pane: ResultPane::Article(text),
                ..
            } => assert_eq!(text.as_str(), "Topic: Second"),
            other => panic!("unexpected view {other:?}"),
        }
        assert_eq!(desk.pending_generations().await, 0);
    }

    #[tokio::test]
    async fn click_log_write_happens_before_logout_returns() {
        let log = Arc::new(MemoryLog::default());
        let desk = desk(instant(), log.clone());
        let (id, _) = desk.resolve(None).await;
        desk.dispatch(id, login()).await;
        desk.dispatch(id, SessionEvent::LogoutClick).await;
        assert_eq!(log.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn shutdown_cancels_in_flight_generation() {
        let desk = desk(gated(), Arc::default());
        let (id, _) = desk.resolve(None).await;
        desk.dispatch(id, login()).await;
        desk.dispatch(id, generate("Never")).await;

        desk.shutdown();
        desk.wait_for_generation(id).await;

        match desk.view(id).await {
            View::Desk {
                notice: Some(n),
                pane,
                ..
            } => {
                assert_eq!(pane, ResultPane::Placeholder);
                assert!(n.message.contains("cancelled"));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }
}
