use std::sync::Arc;

use assistant::contract::model::PdfUpload;
use assistant::domain::error::DomainError;
use assistant::domain::service::{Service, ServiceConfig, NOT_A_PDF, NO_FILE, PROMPT_REQUIRED};
use bytes::Bytes;
use folio_kit::AccessToken;
use futures::StreamExt;
use platform::memory::{MemoryAuth, MemoryObjectStore, ScriptedModel};
use platform::{AuthUser, ContentPart, Models, ProviderError};
use serde_json::Map;

const TOKEN: &str = "tok-lin";
const USER_ID: &str = "u-lin";

struct Fixture {
    auth: Arc<MemoryAuth>,
    store: Arc<MemoryObjectStore>,
    text: Arc<ScriptedModel>,
    vision: Arc<ScriptedModel>,
    svc: Service,
}

fn fixture_with(text: ScriptedModel, vision: ScriptedModel) -> Fixture {
    let user = AuthUser {
        id: USER_ID.into(),
        email: None,
        user_metadata: Map::new(),
    };
    let auth = Arc::new(MemoryAuth::new().with_session(TOKEN, user));
    let store = Arc::new(MemoryObjectStore::new("https://cdn.test"));
    let text = Arc::new(text);
    let vision = Arc::new(vision);
    let svc = Service::new(
        auth.clone(),
        store.clone(),
        Models {
            text: text.clone(),
            vision: vision.clone(),
        },
        ServiceConfig::default(),
    );
    Fixture {
        auth,
        store,
        text,
        vision,
        svc,
    }
}

fn fixture() -> Fixture {
    fixture_with(ScriptedModel::new("text"), ScriptedModel::new("vision"))
}

fn token() -> AccessToken {
    AccessToken::new(TOKEN)
}

fn pdf(name: &str) -> Option<PdfUpload> {
    Some(PdfUpload {
        file_name: name.into(),
        data: Bytes::from_static(b"%PDF-1.7\n%%EOF"),
    })
}

impl Fixture {
    fn remote_calls(&self) -> usize {
        self.auth.calls() + self.store.calls() + self.text.calls() + self.vision.calls()
    }
}

async fn collect(stream: platform::TextStream) -> Vec<Result<String, ProviderError>> {
    stream.collect().await
}

#[tokio::test]
async fn generate_returns_full_text() {
    let f = fixture_with(
        ScriptedModel::new("text").with_reply("Leaves drift and fall"),
        ScriptedModel::new("vision"),
    );
    let out = f.svc.generate(Some("haiku please")).await.unwrap();
    assert_eq!(out, "Leaves drift and fall");
    assert_eq!(f.text.calls(), 1);
    assert_eq!(f.vision.calls(), 0);
}

#[tokio::test]
async fn generate_rejects_empty_or_missing_prompt_without_calls() {
    let f = fixture();
    for prompt in [None, Some("")] {
        assert_eq!(
            f.svc.generate(prompt).await,
            Err(DomainError::BadInput(PROMPT_REQUIRED.into()))
        );
    }
    assert_eq!(f.text.calls(), 0);
}

#[tokio::test]
async fn generate_failure_is_inference_error() {
    let f = fixture_with(
        ScriptedModel::new("text").failing_with(ProviderError::Api {
            status: 429,
            message: "rate limited".into(),
        }),
        ScriptedModel::new("vision"),
    );
    assert_eq!(
        f.svc.generate(Some("hi")).await,
        Err(DomainError::Inference("rate limited".into()))
    );
}

#[tokio::test]
async fn analyze_checks_run_in_order_without_remote_calls() {
    let f = fixture();

    let err = f.svc.analyze_pdf(None, None).await.err().unwrap();
    assert_eq!(err, DomainError::BadInput(NO_FILE.into()));

    let err = f.svc.analyze_pdf(None, pdf("report.docx")).await.err().unwrap();
    assert_eq!(err, DomainError::BadInput(NOT_A_PDF.into()));

    let err = f
        .svc
        .analyze_pdf(Some(&token()), pdf(""))
        .await
        .err()
        .unwrap();
    assert_eq!(err, DomainError::BadInput(NOT_A_PDF.into()));

    let err = f.svc.analyze_pdf(None, pdf("report.PDF")).await.err().unwrap();
    assert_eq!(err, DomainError::NotAuthenticated);

    assert_eq!(f.remote_calls(), 0);
}

#[tokio::test]
async fn analyze_stores_document_then_streams_summary() {
    let f = fixture_with(
        ScriptedModel::new("text"),
        ScriptedModel::new("vision").with_chunks(&["# Summary\n", "Two sections."]),
    );

    let stream = f
        .svc
        .analyze_pdf(Some(&token()), pdf("Q3 report (draft).pdf"))
        .await
        .unwrap();
    let chunks: Vec<String> = collect(stream)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(chunks, vec!["# Summary\n", "Two sections."]);

    let paths = f.store.paths("pdfs");
    assert_eq!(paths.len(), 1);
    let path = &paths[0];
    let name = path.strip_prefix("u-lin/").unwrap();
    let (stamp, rest) = name.split_once('-').unwrap();
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(rest, "Q3_report__draft_.pdf");

    let stored = f.store.get("pdfs", path).unwrap();
    assert_eq!(stored.content_type, "application/pdf");

    let seen = f.vision.seen_messages();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].role, "user");
    match &seen[0].content[..] {
        [ContentPart::Text(instruction), ContentPart::File {
            media_type, data, ..
        }] => {
            assert!(instruction.starts_with("Please analyze the PDF"));
            assert_eq!(media_type, "application/pdf");
            assert_eq!(&data[..], b"%PDF-1.7\n%%EOF");
        }
        other => panic!("unexpected message content: {other:?}"),
    }
    assert_eq!(f.text.calls(), 0);
}

#[tokio::test]
async fn upload_failure_stops_before_the_model() {
    let f = fixture();
    f.store.fail_uploads_with(ProviderError::Api {
        status: 413,
        message: "The object exceeded the maximum allowed size".into(),
    });

    let err = f
        .svc
        .analyze_pdf(Some(&token()), pdf("big.pdf"))
        .await
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        "Error uploading file: The object exceeded the maximum allowed size"
    );
    assert_eq!(f.vision.calls(), 0);
}

#[tokio::test]
async fn rejected_session_is_not_authenticated() {
    let f = fixture();
    let err = f
        .svc
        .analyze_pdf(Some(&AccessToken::new("stale")), pdf("a.pdf"))
        .await
        .err()
        .unwrap();
    assert_eq!(err, DomainError::NotAuthenticated);
    assert_eq!(f.store.calls(), 0);
}

#[tokio::test]
async fn stream_open_failure_keeps_the_stored_copy() {
    let f = fixture_with(
        ScriptedModel::new("text"),
        ScriptedModel::new("vision").failing_with(ProviderError::Api {
            status: 400,
            message: "Unsupported MIME type".into(),
        }),
    );
    let err = f
        .svc
        .analyze_pdf(Some(&token()), pdf("a.pdf"))
        .await
        .err()
        .unwrap();
    assert_eq!(err, DomainError::Inference("Unsupported MIME type".into()));
    assert_eq!(f.store.paths("pdfs").len(), 1);
}

#[tokio::test]
async fn mid_stream_failure_arrives_as_stream_item() {
    let f = fixture_with(
        ScriptedModel::new("text"),
        ScriptedModel::new("vision")
            .with_chunks(&["partial"])
            .failing_mid_stream(ProviderError::Transport("connection reset".into())),
    );
    let stream = f
        .svc
        .analyze_pdf(Some(&token()), pdf("a.pdf"))
        .await
        .unwrap();
    let items = collect(stream).await;
    assert_eq!(
        items,
        vec![
            Ok("partial".to_string()),
            Err(ProviderError::Transport("connection reset".into()))
        ]
    );
}
