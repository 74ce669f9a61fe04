//! Cancellation semantics: confirmation, best-effort races, and the
//! cooperative token.
//!
//! Run with: cargo test --test cancellation_test

use std::sync::Arc;

use async_trait::async_trait;

use xml_bridge_client::client::{InProcessResolver, ResolverApi, ResolverScript};
use xml_bridge_client::session::SessionController;
use xml_bridge_client::{
    BridgeError, CancelToken, Decision, DecisionChooser, DecisionType, OptionValue, Resolution,
    SessionStatus,
};

const SOURCE: &str = "<cmme><piece/></cmme>";
const CONVERTED: &str = "<converted/>";

fn decision(id: &str) -> Decision {
    Decision {
        id: id.to_string(),
        kind: DecisionType::AmbiguousNotation,
        description: format!("how should {} be read", id),
        context: "measure 2".into(),
        impact: None,
        options: vec![OptionValue::from("plain"), OptionValue::from("ornamented")],
        default_option: None,
    }
}

fn controller_with(script: ResolverScript) -> (Arc<InProcessResolver>, SessionController) {
    let resolver = Arc::new(InProcessResolver::new(script));
    let api: Arc<dyn ResolverApi> = resolver.clone();
    (resolver, SessionController::new(api))
}

#[tokio::test]
async fn test_cancel_before_any_resolution() {
    let script = ResolverScript::new(vec![decision("dec-a")], CONVERTED);
    let (resolver, mut controller) = controller_with(script);

    controller.start(SOURCE, "cmme", "mei").await.unwrap();
    let status = controller
        .cancel(Some("picked the wrong file"), true)
        .await
        .unwrap();

    assert_eq!(status, SessionStatus::Cancelled);
    assert!(controller.history().is_empty());
    assert_eq!(
        resolver.cancel_reasons().await,
        vec![Some("picked the wrong file".to_string())]
    );

    // No further operations are accepted.
    let err = controller.next_decision().await.unwrap_err();
    assert!(matches!(err, BridgeError::UserInput { .. }));
    let err = controller
        .resolve(Resolution::new("dec-a", OptionValue::from("plain")))
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::UserInput { .. }));
}

#[tokio::test]
async fn test_unconfirmed_cancel_is_rejected() {
    let script = ResolverScript::new(vec![decision("dec-a")], CONVERTED);
    let (resolver, mut controller) = controller_with(script);

    controller.start(SOURCE, "cmme", "mei").await.unwrap();
    let err = controller.cancel(None, false).await.unwrap_err();
    assert!(matches!(err, BridgeError::UserInput { .. }));

    // Still active, and the resolver never saw a cancel.
    assert!(controller.session().unwrap().is_active());
    assert!(resolver.cancel_reasons().await.is_empty());
}

#[tokio::test]
async fn test_cancel_on_completed_session_is_noop() {
    let script = ResolverScript::new(vec![decision("dec-a")], CONVERTED);
    let (resolver, mut controller) = controller_with(script);

    controller.start(SOURCE, "cmme", "mei").await.unwrap();
    controller
        .resolve(Resolution::new("dec-a", OptionValue::from("plain")))
        .await
        .unwrap();
    assert_eq!(
        controller.session().unwrap().status,
        SessionStatus::Completed
    );

    let status = controller.cancel(Some("too late"), true).await.unwrap();
    assert_eq!(status, SessionStatus::Completed);
    assert!(resolver.cancel_reasons().await.is_empty());
}

#[tokio::test]
async fn test_cancel_loses_race_against_server_completion() {
    let script = ResolverScript::new(vec![decision("dec-a")], CONVERTED);
    let (resolver, mut controller) = controller_with(script);

    let session = controller.start(SOURCE, "cmme", "mei").await.unwrap();
    // The session finishes server-side between the user's click and the
    // cancel request landing.
    resolver.complete_server_side(&session.id).await.unwrap();

    let status = controller.cancel(Some("changed my mind"), true).await.unwrap();
    assert_eq!(status, SessionStatus::Completed);
    assert_eq!(
        controller.session().unwrap().status,
        SessionStatus::Completed,
        "a server-reported completed must never be forced to cancelled"
    );
    assert_eq!(
        controller.session().unwrap().artifact().unwrap().content,
        CONVERTED
    );
    assert!(resolver.cancel_reasons().await.is_empty());
}

/// Picks the first option and trips the token, simulating a user hitting
/// cancel while a resolution is in flight.
struct CancellingChooser {
    token: CancelToken,
}

#[async_trait]
impl DecisionChooser for CancellingChooser {
    async fn choose(&self, d: &Decision) -> xml_bridge_client::Result<Resolution> {
        self.token.cancel();
        Ok(Resolution::new(d.id.clone(), d.options[0].clone()))
    }
}

#[tokio::test]
async fn test_token_stops_loop_between_steps() {
    let script = ResolverScript::new(vec![decision("dec-a"), decision("dec-b")], CONVERTED);
    let (resolver, mut controller) = controller_with(script);

    controller.start(SOURCE, "cmme", "mei").await.unwrap();
    let token = CancelToken::new();
    let chooser = CancellingChooser {
        token: token.clone(),
    };

    let outcome = controller.run_to_completion(&chooser, &token).await.unwrap();
    assert!(outcome.is_none(), "loop must stop without an artifact");

    // The in-flight resolution still applied; only future calls stopped.
    assert_eq!(controller.history().len(), 1);
    assert_eq!(resolver.recorded_resolve_requests().await.len(), 1);
    assert!(controller.session().unwrap().is_active());

    // An explicit confirmed cancel then terminates the session.
    let status = controller.cancel(None, true).await.unwrap();
    assert_eq!(status, SessionStatus::Cancelled);
}

#[tokio::test]
async fn test_pre_cancelled_token_issues_no_calls() {
    let script = ResolverScript::new(vec![decision("dec-a")], CONVERTED);
    let (resolver, mut controller) = controller_with(script);

    controller.start(SOURCE, "cmme", "mei").await.unwrap();
    let token = CancelToken::new();
    token.cancel();

    let outcome = controller
        .run_to_completion(&CancellingChooser { token: token.clone() }, &token)
        .await
        .unwrap();
    assert!(outcome.is_none());
    assert!(resolver.recorded_resolve_requests().await.is_empty());
    assert!(controller.history().is_empty());
}

#[tokio::test]
async fn test_cancelled_session_cannot_be_completed() {
    let script = ResolverScript::new(vec![decision("dec-a")], CONVERTED);
    let (_resolver, mut controller) = controller_with(script);

    controller.start(SOURCE, "cmme", "mei").await.unwrap();
    controller.cancel(None, true).await.unwrap();

    let err = controller.ensure_completed().await.unwrap_err();
    assert!(matches!(err, BridgeError::UserInput { .. }));
}
