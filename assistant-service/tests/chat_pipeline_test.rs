//! End-to-end tests of the success path of the chat pipeline.

mod common;

use assistant_service::models::chat::Role;
use assistant_service::services::providers::RetrievedContext;
use assistant_service::services::providers::mock::{
    MockGenerationProvider, MockRetrievalProvider,
};
use common::{TestApp, fixture_context};
use serde_json::json;

#[tokio::test]
async fn answers_with_citations_usage_and_costs() {
    let app = TestApp::spawn(
        MockRetrievalProvider::returning(fixture_context()),
        MockGenerationProvider::returning(
            "You accrue vacation days monthly, see the Personeelshandboek.",
            100,
            50,
        ),
    )
    .await;

    let response = app
        .post_chat(json!({
            "message": "Hoeveel vakantiedagen heb ik?",
            "conversationHistory": [],
            "language": "nl",
            "sessionId": "session-1"
        }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(
        body["message"],
        "You accrue vacation days monthly, see the Personeelshandboek."
    );
    assert_eq!(body["citations"].as_array().unwrap().len(), 3);
    assert_eq!(
        body["citations"][0]["references"][0]["sourceDocument"],
        "Personeelshandboek"
    );
    assert_eq!(body["citations"][2]["references"][0]["pages"][0], 2);

    // Usage is the provider's reported count, and totals must add up.
    assert_eq!(body["usage"]["prompt_tokens"], 100);
    assert_eq!(body["usage"]["completion_tokens"], 50);
    assert_eq!(body["usage"]["total_tokens"], 150);

    // 100 input at $2.50/M + 50 output at $10/M, retrieval 1200 at $8/M.
    let generation = &body["costBreakdown"]["generation"];
    assert!((generation["cost"].as_f64().unwrap() - 0.00075).abs() < 1e-9);
    let retrieval = &body["costBreakdown"]["retrieval"];
    assert_eq!(retrieval["tokens"], 1200);
    assert!((retrieval["cost"].as_f64().unwrap() - 0.0096).abs() < 1e-9);
    assert!((body["costBreakdown"]["total_cost"].as_f64().unwrap() - 0.01035).abs() < 1e-9);
    assert!(body["costBreakdown"]["response_time_seconds"].is_number());

    // One call each, strictly sequential.
    assert_eq!(app.retrieval.calls(), 1);
    assert_eq!(app.generation.calls(), 1);

    // The audit record was written before the response went out.
    let records = app.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].session_id, "session-1");
    assert_eq!(records[0].question, "Hoeveel vakantiedagen heb ik?");
    assert_eq!(records[0].citations_count, 3);
    assert_eq!(records[0].generation_total_tokens, 150);
    assert_eq!(
        records[0].generation_input_tokens + records[0].generation_output_tokens,
        records[0].generation_total_tokens
    );
    assert_eq!(body["logId"], "mem-1");
}

#[tokio::test]
async fn strips_history_to_role_content_and_orders_messages() {
    let app = TestApp::spawn(
        MockRetrievalProvider::returning(fixture_context()),
        MockGenerationProvider::returning("ok", 10, 5),
    )
    .await;

    let response = app
        .post_chat(json!({
            "message": "En hoe zit het met ziekteverlof?",
            "conversationHistory": [
                {
                    "role": "user",
                    "content": "Hoeveel vakantiedagen heb ik?",
                    "citations": [{"references": []}]
                },
                {
                    "role": "assistant",
                    "content": "25 dagen per jaar.",
                    "logId": "abc123"
                }
            ],
            "language": "nl"
        }))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let messages = app.generation.last_messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[0].content.contains("Vacation days accrue monthly."));
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "Hoeveel vakantiedagen heb ik?");
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(messages[2].content, "25 dagen per jaar.");
    assert_eq!(messages[3].role, Role::User);
    assert_eq!(messages[3].content, "En hoe zit het met ziekteverlof?");

    // Only role/content survive serialization toward the backend.
    let serialized = serde_json::to_value(&messages[1]).unwrap();
    assert_eq!(
        serialized,
        json!({"role": "user", "content": "Hoeveel vakantiedagen heb ik?"})
    );
}

#[tokio::test]
async fn empty_retrieval_result_is_not_an_error() {
    let app = TestApp::spawn(
        MockRetrievalProvider::returning(RetrievedContext::default()),
        MockGenerationProvider::returning("Nothing relevant found.", 20, 10),
    )
    .await;

    let response = app
        .post_chat(json!({
            "message": "Wat is het weer morgen?",
            "conversationHistory": []
        }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["citations"].as_array().unwrap().len(), 0);
    assert_eq!(body["costBreakdown"]["retrieval"]["tokens"], 0);
    assert_eq!(app.generation.calls(), 1);

    // The composer handled the empty context; the system prompt still went out.
    let messages = app.generation.last_messages();
    assert_eq!(messages[0].role, Role::System);
    assert!(
        messages[0]
            .content
            .contains("Context from the HR documentation:")
    );
}

#[tokio::test]
async fn missing_session_id_is_recorded_with_fallback_marker() {
    let app = TestApp::spawn(
        MockRetrievalProvider::returning(fixture_context()),
        MockGenerationProvider::returning("ok", 10, 5),
    )
    .await;

    let response = app
        .post_chat(json!({
            "message": "Hoe vraag ik verlof aan?"
        }))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let records = app.audit.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].session_id, "NO_SESSION_ID");
    assert_eq!(records[0].language, "nl");
}

#[tokio::test]
async fn audit_write_failure_does_not_fail_the_request() {
    let audit = assistant_service::services::audit::MemoryAuditLog::new();
    audit.fail_writes(true);

    let app = TestApp::spawn_with_audit(
        MockRetrievalProvider::returning(fixture_context()),
        MockGenerationProvider::returning("Answer text.", 10, 5),
        audit,
    )
    .await;

    let response = app
        .post_chat(json!({
            "message": "Hoeveel vakantiedagen heb ik?"
        }))
        .await;

    // The answer still goes out, with a null log id.
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Answer text.");
    assert!(body["logId"].is_null());
    assert_eq!(app.audit.records().len(), 0);
}
