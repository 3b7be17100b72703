//! Full login → generate → logout cycles through the public `Newsdesk` API.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use newsroom::{
    ArticleForm, ArticleText, ClickCount, ClickLog, ClickLogEntry, ClickLogError, Completion,
    CompletionRequest, CredentialChecker, FetchError, GenerationError, GenerationGateway,
    Instruction, LlmError, LlmProvider, ModelName, ReferenceLink, ResultPane, SessionEvent,
    SourceDocument, SourceFetcher, TokenUsage, View,
};
use nodes::{EditorialPipeline, Newsdesk};
use tokio_util::sync::CancellationToken;

struct FixedGateway {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl GenerationGateway for FixedGateway {
    async fn generate(
        &self,
        instruction: &Instruction,
        _cancel: CancellationToken,
    ) -> Result<ArticleText, GenerationError> {
        self.seen.lock().unwrap().push(instruction.as_str().to_string());
        Ok(ArticleText::new("ARTICLE TEXT").unwrap())
    }
}

#[derive(Default)]
struct MemoryLog {
    entries: Mutex<Vec<ClickLogEntry>>,
}

impl ClickLog for MemoryLog {
    fn append(&self, entry: &ClickLogEntry) -> Result<(), ClickLogError> {
        self.entries.lock().unwrap().push(*entry);
        Ok(())
    }
}

fn checker() -> CredentialChecker {
    CredentialChecker::new(Some("admin".into()), Some("letmein".into()))
}

fn login() -> SessionEvent {
    SessionEvent::LoginSubmit {
        username: "admin".into(),
        password: "letmein".into(),
    }
}

fn form(topic: &str, word_limit: u32) -> ArticleForm {
    ArticleForm {
        topic: topic.into(),
        word_limit,
        wants_links: false,
        links: Vec::new(),
    }
}

#[tokio::test]
async fn generated_article_is_shown_and_counted() {
    let gateway = Arc::new(FixedGateway {
        seen: Mutex::new(Vec::new()),
    });
    let log = Arc::new(MemoryLog::default());
    let desk = Newsdesk::new(checker(), gateway.clone(), log.clone());
    let (id, _) = desk.resolve(None).await;

    desk.dispatch(id, login()).await;
    desk.dispatch(id, SessionEvent::GenerateSubmit(form("Test", 300))).await;
    desk.wait_for_generation(id).await;

    match desk.view(id).await {
        View::Desk { pane, counter, .. } => {
            assert_eq!(pane, ResultPane::Article(ArticleText::new("ARTICLE TEXT").unwrap()));
            assert_eq!(counter, ClickCount::new(1));
        }
        other => panic!("unexpected view {other:?}"),
    }
    assert_eq!(
        gateway.seen.lock().unwrap().clone(),
        vec!["Topic: Test\nReference Links:\nNo reference links provided.\nWord Limit:300".to_string()]
    );
}

#[tokio::test]
async fn counter_is_logged_on_logout_and_reset_on_login() {
    let gateway = Arc::new(FixedGateway {
        seen: Mutex::new(Vec::new()),
    });
    let log = Arc::new(MemoryLog::default());
    let desk = Newsdesk::new(checker(), gateway, log.clone());
    let (id, _) = desk.resolve(None).await;

    desk.dispatch(id, login()).await;
    for _ in 0..3 {
        desk.dispatch(id, SessionEvent::GenerateSubmit(form("Again", 500))).await;
        desk.wait_for_generation(id).await;
    }
    // Rejected submissions do not count.
    desk.dispatch(id, SessionEvent::GenerateSubmit(form("", 500))).await;
    desk.dispatch(id, SessionEvent::LogoutClick).await;

    desk.dispatch(id, login()).await;
    match desk.view(id).await {
        View::Desk { counter, .. } => assert_eq!(counter, ClickCount::zero()),
        other => panic!("unexpected view {other:?}"),
    }
    desk.dispatch(id, SessionEvent::LogoutClick).await;

    let counters: Vec<u32> = log
        .entries
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.counter.as_u32())
        .collect();
    assert_eq!(counters, vec![3, 0]);
}

// ---------------------------------------------------------------------------
// Same cycle through the real writer/editor pipeline with fake providers.
// ---------------------------------------------------------------------------

struct EchoProvider {
    calls: Mutex<Vec<CompletionRequest>>,
}

#[async_trait]
impl LlmProvider for EchoProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(request);
        let text = if calls.len() % 2 == 1 {
            "draft body"
        } else {
            "# Edited\n\nfinal body"
        };
        Ok(Completion {
            text: text.into(),
            usage: TokenUsage::default(),
        })
    }
}

struct StaticFetcher;

#[async_trait]
impl SourceFetcher for StaticFetcher {
    async fn fetch(&self, link: &ReferenceLink) -> Result<SourceDocument, FetchError> {
        Ok(SourceDocument {
            link: link.clone(),
            text: "source body".into(),
        })
    }
}

#[tokio::test]
async fn editorial_pipeline_drives_the_desk() {
    let provider = Arc::new(EchoProvider {
        calls: Mutex::new(Vec::new()),
    });
    let pipeline = EditorialPipeline::new(
        provider.clone(),
        Arc::new(StaticFetcher),
        ModelName::new("gpt-4o").unwrap(),
    );
    let desk = Newsdesk::new(checker(), Arc::new(pipeline), Arc::new(MemoryLog::default()));
    let (id, _) = desk.resolve(None).await;

    desk.dispatch(id, login()).await;
    let submitted = ArticleForm {
        topic: "Emergence of AI".into(),
        word_limit: 500,
        wants_links: true,
        links: vec!["http://a".into(), "http://b".into()],
    };
    desk.dispatch(id, SessionEvent::GenerateSubmit(submitted)).await;
    desk.wait_for_generation(id).await;

    match desk.view(id).await {
        View::Desk {
            pane: ResultPane::Article(text),
            ..
        } => assert!(text.as_str().starts_with("# Edited")),
        other => panic!("unexpected view {other:?}"),
    }

    let calls = provider.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    let writer_input = &calls[0].messages[1].content;
    assert!(writer_input.starts_with(
        "Topic: Emergence of AI\nReference Links:\nhttp://a\nhttp://b\nWord Limit:500"
    ));
    assert!(writer_input.contains("source body"));
    assert!(calls[1].messages[1].content.contains("draft body"));
}
