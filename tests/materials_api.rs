mod common;

use reqwest::multipart::Form;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{pdf_part, pdf_with_pages, spawn_app, spawn_app_with_secrets, FakeLlm};

#[tokio::test]
async fn health_reports_ok() {
    let app = spawn_app(FakeLlm::new(&[])).await;

    let body: Value = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn status_reports_templates_and_backend() {
    let app = spawn_app(FakeLlm::new(&[])).await;

    let body: Value = app
        .client
        .get(app.url("/api/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["backend"]["provider"], "fake");
    assert_eq!(body["backend"]["models"], json!(["fake"]));
    assert_eq!(body["backend"]["reachable"], true);
    assert_eq!(body["templates"]["lesson_plan"], true);
    assert_eq!(body["templates"]["worksheet"], false);
    assert_eq!(body["sessions"], 0);
}

#[tokio::test]
async fn lesson_plan_prompt_is_filled_from_template() {
    let app = spawn_app(FakeLlm::new(&[]).replying("1. Objectives ...")).await;

    let response = app
        .client
        .post(app.url("/api/materials"))
        .json(&json!({ "topic": "Fractions", "grade_level": "3rd", "kind": "lesson_plan" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "lesson_plan");
    assert_eq!(body["content"], "1. Objectives ...");
    assert_eq!(
        app.llm.prompts(),
        vec!["Lesson plan. Topic: Fractions, Grade: 3rd".to_string()]
    );
}

#[tokio::test]
async fn blank_topic_is_a_warning_and_nothing_is_generated() {
    let app = spawn_app(FakeLlm::new(&[]).replying("unused")).await;

    let response = app
        .client
        .post(app.url("/api/materials"))
        .json(&json!({ "topic": "   ", "grade_level": "5th", "kind": "worksheet" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["warning"], "Please enter both a topic and a grade level.");
    assert!(app.llm.prompts().is_empty());
}

#[tokio::test]
async fn missing_template_is_sent_as_placeholder_text() {
    let app = spawn_app(FakeLlm::new(&[]).replying("ok")).await;

    let response = app
        .client
        .post(app.url("/api/materials"))
        .json(&json!({ "topic": "Volcanoes", "grade_level": "6th", "kind": "worksheet" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let prompts = app.llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("Error: "));
    assert!(prompts[0].ends_with("prompt_worksheet.txt not found."));
}

#[tokio::test]
async fn extract_returns_reviewable_text() {
    let app = spawn_app(FakeLlm::new(&[])).await;
    let pdf = pdf_with_pages(&["Rivers carry sediment", "Deltas form at the mouth"]);

    let response = app
        .client
        .post(app.url("/api/materials/extract"))
        .multipart(Form::new().part("file", pdf_part(pdf, "rivers.pdf")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["file_name"], "rivers.pdf");
    assert_eq!(body["pages"], 2);
    assert_eq!(body["chunks"], 2);
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("sediment"));
    assert!(text.contains("\n\n"));
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn unreadable_upload_extracts_to_empty_text_with_error() {
    let app = spawn_app(FakeLlm::new(&[])).await;

    let response = app
        .client
        .post(app.url("/api/materials/extract"))
        .multipart(Form::new().part("file", pdf_part(b"garbage".to_vec(), "broken.pdf")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["text"], "");
    assert_eq!(body["chunks"], 0);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn extract_without_file_is_bad_request() {
    let app = spawn_app(FakeLlm::new(&[])).await;

    let response = app
        .client
        .post(app.url("/api/materials/extract"))
        .multipart(Form::new().text("note", "no file here"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn worksheet_from_text_uses_practice_problem_prompt() {
    let app = spawn_app(FakeLlm::new(&[]).replying("Q1 ...")).await;

    let response = app
        .client
        .post(app.url("/api/materials/from-text"))
        .json(&json!({ "text": "Deltas form at river mouths.", "kind": "worksheet" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.llm.prompts(),
        vec![
            "Generate 10 practice problems for students based on the following material:\n\nDeltas form at river mouths."
                .to_string()
        ]
    );
}

#[tokio::test]
async fn empty_material_text_is_a_warning() {
    let app = spawn_app(FakeLlm::new(&[])).await;

    let response = app
        .client
        .post(app.url("/api/materials/from-text"))
        .json(&json!({ "text": "\n  ", "kind": "lesson_plan" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["warning"], "Please enter or upload some content.");
    assert!(app.llm.prompts().is_empty());
}

#[tokio::test]
async fn backend_failure_is_bad_gateway() {
    let app = spawn_app(FakeLlm::new(&[]).failing()).await;

    let response = app
        .client
        .post(app.url("/api/materials"))
        .json(&json!({ "topic": "Fractions", "grade_level": "3rd", "kind": "lesson_plan" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("model server unavailable"));
}

#[tokio::test]
async fn evaluation_flags_sentences_with_not() {
    let app = spawn_app(FakeLlm::new(&[]).replying("Are you sure about that?")).await;

    let response = app
        .client
        .post(app.url("/api/evaluations"))
        .json(&json!({ "answers": "A spider is not an insect. Not so. Bees make honey." }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["sentences_checked"], 3);
    let flagged = body["flagged"].as_array().unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["sentence"], "A spider is not an insect.");
    assert_eq!(flagged[0]["follow_up"], "Are you sure about that?");
}

#[tokio::test]
async fn blank_answers_are_a_warning() {
    let app = spawn_app(FakeLlm::new(&[])).await;

    let response = app
        .client
        .post(app.url("/api/evaluations"))
        .json(&json!({ "answers": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["warning"], "Please enter the student's answers.");
}

#[tokio::test]
async fn config_read_out_masks_secrets() {
    let secrets = "llm:\n  api_key: sk-classroom\n";
    let app = spawn_app_with_secrets(FakeLlm::new(&[]), Some(secrets)).await;

    let body: Value = app
        .client
        .get(app.url("/api/config"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["llm"]["api_key"], "****");
    assert_eq!(body["llm"]["model"], "phi3");
    assert_eq!(body["rag"]["top_k"], 4);
}
