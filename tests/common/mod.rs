#![allow(dead_code)]

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;

use edumind_backend::core::config::{AppPaths, ConfigService};
use edumind_backend::llm::{LlmProvider, LlmService};
use edumind_backend::server;
use edumind_backend::state::AppState;

pub use edumind_backend::testing::{pdf_with_pages, FakeLlm};

pub const LESSON_PLAN_TEMPLATE: &str =
    "Lesson plan. Topic: <INSERT_TOPIC_HERE>, Grade: <INSERT_GRADE_LEVEL_HERE>";

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub llm: Arc<FakeLlm>,
    pub root: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serves the real router over a scratch project directory. Only the
/// lesson plan template exists; the worksheet template is missing.
pub async fn spawn_app(llm: FakeLlm) -> TestApp {
    spawn_app_with_secrets(llm, None).await
}

pub async fn spawn_app_with_secrets(llm: FakeLlm, secrets: Option<&str>) -> TestApp {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("prompts")).unwrap();
    fs::write(
        root.path().join("prompts/prompt_lessonplan.txt"),
        LESSON_PLAN_TEMPLATE,
    )
    .unwrap();

    let paths = Arc::new(AppPaths::from_dirs(
        root.path().to_path_buf(),
        root.path().join("data"),
    ));
    if let Some(secrets) = secrets {
        fs::write(&paths.secrets_path, secrets).unwrap();
    }

    let config = ConfigService::new(paths.clone());
    let settings = config.load_settings().unwrap();
    let llm = Arc::new(llm);
    let provider: Arc<dyn LlmProvider> = llm.clone();
    let state = AppState::with_llm(paths, config, settings, LlmService::new(provider));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server::router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        llm,
        root,
    }
}

pub fn pdf_part(bytes: Vec<u8>, file_name: &str) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str("application/pdf")
        .unwrap()
}
