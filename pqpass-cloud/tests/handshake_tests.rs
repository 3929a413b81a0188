mod support;

use pqpass_cloud::handshake::authenticate;
use pqpass_cloud::{CloudError, HandshakeStage};
use pqpass_crypto::kem;
use pqpass_types::ClientEx;
use pretty_assertions::assert_eq;
use support::{TOKEN, VerifySignature, api, challenge, mount_handshake, registered_client};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stage_of(err: CloudError) -> HandshakeStage {
    match err {
        CloudError::AuthenticationFailed { stage, .. } => stage,
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
}

async fn mount_challenge(server: &MockServer, client: &ClientEx) {
    let id = client.id().unwrap();
    Mock::given(method("GET"))
        .and(path(format!("/challenge/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(challenge()))
        .mount(server)
        .await;
}

async fn mount_verify(server: &MockServer, client: &ClientEx) {
    let id = client.id().unwrap();
    Mock::given(method("POST"))
        .and(path(format!("/verify/{id}")))
        .respond_with(VerifySignature {
            public: client.identity.di_public.clone(),
        })
        .mount(server)
        .await;
}

async fn mount_sync(server: &MockServer, client: &ClientEx, response: ResponseTemplate) {
    let id = client.id().unwrap();
    Mock::given(method("GET"))
        .and(path(format!("/sync/{id}")))
        .and(header("authorization", TOKEN))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Runs the handshake and checks that a failure left the secret alone.
async fn fail_with(server: &MockServer, client: &ClientEx) -> HandshakeStage {
    let mut secrets = client.secrets.clone();
    let err = authenticate(&api(server), client.id().unwrap(), &mut secrets)
        .await
        .unwrap_err();
    assert_eq!(secrets, client.secrets);
    stage_of(err)
}

// --- Success ---

#[tokio::test]
async fn handshake_stores_session_secret() {
    support::init_tracing();
    let server = MockServer::start().await;
    let client = registered_client();
    let expected = mount_handshake(&server, &client).await;

    let mut secrets = client.secrets.clone();
    let session = authenticate(&api(&server), client.id().unwrap(), &mut secrets)
        .await
        .unwrap();

    assert_eq!(session.owner(), client.id().unwrap());
    assert_eq!(secrets.secret, Some(expected));
}

#[tokio::test]
async fn session_debug_does_not_leak_token() {
    let server = MockServer::start().await;
    let mut client = registered_client();
    let (_, session) = support::login(&server, &mut client).await;
    assert!(!format!("{session:?}").contains(TOKEN));
}

// --- Stage failures ---

#[tokio::test]
async fn challenge_failure() {
    let server = MockServer::start().await;
    let client = registered_client();
    Mock::given(method("GET"))
        .and(path(format!("/challenge/{}", client.id().unwrap())))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    assert_eq!(fail_with(&server, &client).await, HandshakeStage::Challenge);
}

#[tokio::test]
async fn malformed_challenge_body() {
    let server = MockServer::start().await;
    let client = registered_client();
    Mock::given(method("GET"))
        .and(path(format!("/challenge/{}", client.id().unwrap())))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    assert_eq!(fail_with(&server, &client).await, HandshakeStage::Challenge);
}

#[tokio::test]
async fn rejected_signature_fails_verify() {
    let server = MockServer::start().await;
    let client = registered_client();
    let impostor = registered_client();
    mount_challenge(&server, &client).await;
    // Server holds a different verifying key than the one signing.
    Mock::given(method("POST"))
        .and(path(format!("/verify/{}", client.id().unwrap())))
        .respond_with(VerifySignature {
            public: impostor.identity.di_public.clone(),
        })
        .mount(&server)
        .await;
    assert_eq!(fail_with(&server, &client).await, HandshakeStage::Verify);
}

#[tokio::test]
async fn missing_cookie_fails_token() {
    let server = MockServer::start().await;
    let client = registered_client();
    mount_challenge(&server, &client).await;
    Mock::given(method("POST"))
        .and(path(format!("/verify/{}", client.id().unwrap())))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    assert_eq!(fail_with(&server, &client).await, HandshakeStage::Token);
}

#[tokio::test]
async fn foreign_cookie_fails_token() {
    let server = MockServer::start().await;
    let client = registered_client();
    mount_challenge(&server, &client).await;
    Mock::given(method("POST"))
        .and(path(format!("/verify/{}", client.id().unwrap())))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=abc; Path=/"))
        .mount(&server)
        .await;
    assert_eq!(fail_with(&server, &client).await, HandshakeStage::Token);
}

#[tokio::test]
async fn sync_failure() {
    let server = MockServer::start().await;
    let client = registered_client();
    mount_challenge(&server, &client).await;
    mount_verify(&server, &client).await;
    mount_sync(&server, &client, ResponseTemplate::new(503)).await;
    assert_eq!(fail_with(&server, &client).await, HandshakeStage::Sync);
}

#[tokio::test]
async fn sync_requires_raw_token_header() {
    let server = MockServer::start().await;
    let client = registered_client();
    mount_challenge(&server, &client).await;
    mount_verify(&server, &client).await;
    let (ciphertext, _) = kem::encapsulate(&client.secrets.ky_public).unwrap();
    // Only a bearer-prefixed header would match; the client sends the raw
    // token, so the request falls through to a 404.
    Mock::given(method("GET"))
        .and(path(format!("/sync/{}", client.id().unwrap())))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(ciphertext))
        .mount(&server)
        .await;
    assert_eq!(fail_with(&server, &client).await, HandshakeStage::Sync);
}

#[tokio::test]
async fn short_kem_ciphertext_fails_decapsulate() {
    let server = MockServer::start().await;
    let client = registered_client();
    mount_challenge(&server, &client).await;
    mount_verify(&server, &client).await;
    mount_sync(
        &server,
        &client,
        ResponseTemplate::new(200).set_body_json(vec![0u8; 16]),
    )
    .await;
    assert_eq!(fail_with(&server, &client).await, HandshakeStage::Decapsulate);
}
