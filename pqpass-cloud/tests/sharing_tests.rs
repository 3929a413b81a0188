mod support;

use pqpass_cloud::CloudError;
use pqpass_cloud::sharing::ShareManager;
use pqpass_cloud::types::CreateShareRequest;
use pqpass_crypto::{kem, open_share};
use pqpass_types::{PasswordRecord, ShareRecord, ShareStatus, TypesError, Uuid};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use support::{TOKEN, login, registered_client};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record() -> PasswordRecord {
    let mut r = PasswordRecord::new("shared-secret", "team@example.com");
    r.description = Some("staging database".into());
    r
}

async fn mount_status(server: &MockServer, owner: Uuid, share_id: Uuid, status: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/share_status/{owner}/{share_id}")))
        .and(header("authorization", TOKEN))
        .and(body_json(serde_json::json!({ "status": status })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

// --- Create ---

#[tokio::test]
async fn create_share_encapsulates_to_recipient() {
    support::init_tracing();
    let server = MockServer::start().await;
    let mut owner = registered_client();
    let recipient = registered_client();
    let recipient_id = recipient.id().unwrap();
    let (api, session) = login(&server, &mut owner).await;

    Mock::given(method("GET"))
        .and(path(format!("/public_key/{recipient_id}")))
        .and(header("authorization", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bytes": recipient.identity.ky_public.as_bytes().to_vec(),
        })))
        .mount(&server)
        .await;
    let share_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/share/{}", owner.id().unwrap())))
        .respond_with(ResponseTemplate::new(200).set_body_json(share_id.to_string()))
        .mount(&server)
        .await;

    let manager = ShareManager::new(Arc::new(api));
    let (id, share) = manager
        .create_share(&session, recipient_id, &record())
        .await
        .unwrap();
    assert_eq!(id, share_id);
    assert_eq!(share.status(), ShareStatus::Pending);

    let requests = server.received_requests().await.unwrap();
    let body = requests
        .iter()
        .find(|r| r.url.path().starts_with("/share/"))
        .map(|r| serde_json::from_slice::<CreateShareRequest>(&r.body).unwrap())
        .unwrap();
    assert_eq!(body.recipient, recipient_id.to_string());
    assert_eq!(body.kem_ciphertext, share.kem_ciphertext);

    let shared = kem::decapsulate(&recipient.secrets.ky_secret, &body.kem_ciphertext).unwrap();
    assert_eq!(open_share(&shared, &body.password).unwrap(), record());
}

#[tokio::test]
async fn create_share_rejects_bad_public_key() {
    let server = MockServer::start().await;
    let mut owner = registered_client();
    let (api, session) = login(&server, &mut owner).await;
    let recipient_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/public_key/{recipient_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bytes": [1, 2, 3] })))
        .mount(&server)
        .await;

    let manager = ShareManager::new(Arc::new(api));
    let err = manager
        .create_share(&session, recipient_id, &record())
        .await
        .unwrap_err();
    assert!(matches!(err, CloudError::Share(_)));
}

#[tokio::test]
async fn create_share_unknown_recipient() {
    let server = MockServer::start().await;
    let mut owner = registered_client();
    let (api, session) = login(&server, &mut owner).await;

    let manager = ShareManager::new(Arc::new(api));
    let err = manager
        .create_share(&session, Uuid::new_v4(), &record())
        .await
        .unwrap_err();
    assert!(matches!(err, CloudError::Share(_)));
}

// --- Incoming ---

#[tokio::test]
async fn incoming_shares_skip_invalid_ids() {
    let server = MockServer::start().await;
    let mut recipient = registered_client();
    let (api, session) = login(&server, &mut recipient).await;

    let (ct, shared) = kem::encapsulate(&recipient.secrets.ky_public).unwrap();
    let share = ShareRecord::new(ct, pqpass_crypto::seal_for_share(&shared, &record()).unwrap());
    let good_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/shared/{}", recipient.id().unwrap())))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "shares": [[share, good_id.to_string()], [share, "bogus"]],
        })))
        .mount(&server)
        .await;

    let manager = ShareManager::new(Arc::new(api));
    let incoming = manager.incoming_shares(&session).await.unwrap();
    assert_eq!(incoming, vec![(share, good_id)]);
}

// --- Accept / reject ---

fn pending_share_for(recipient: &pqpass_types::ClientEx) -> ShareRecord {
    let (ct, shared) = kem::encapsulate(&recipient.secrets.ky_public).unwrap();
    ShareRecord::new(ct, pqpass_crypto::seal_for_share(&shared, &record()).unwrap())
}

#[tokio::test]
async fn accept_opens_and_reports() {
    let server = MockServer::start().await;
    let mut recipient = registered_client();
    let (api, session) = login(&server, &mut recipient).await;
    let share_id = Uuid::new_v4();
    mount_status(&server, recipient.id().unwrap(), share_id, "accepted").await;

    let mut share = pending_share_for(&recipient);
    let manager = ShareManager::new(Arc::new(api));
    let opened = manager
        .accept_share(&session, &recipient.secrets, share_id, &mut share)
        .await
        .unwrap();
    assert_eq!(opened, record());
    assert_eq!(share.status(), ShareStatus::Accepted);
}

#[tokio::test]
async fn accepted_share_cannot_be_accepted_again() {
    let server = MockServer::start().await;
    let mut recipient = registered_client();
    let (api, session) = login(&server, &mut recipient).await;
    let share_id = Uuid::new_v4();
    mount_status(&server, recipient.id().unwrap(), share_id, "accepted").await;

    let mut share = pending_share_for(&recipient);
    let manager = ShareManager::new(Arc::new(api));
    manager
        .accept_share(&session, &recipient.secrets, share_id, &mut share)
        .await
        .unwrap();
    let err = manager
        .accept_share(&session, &recipient.secrets, share_id, &mut share)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CloudError::Types(TypesError::InvalidShareTransition { .. })
    ));
}

#[tokio::test]
async fn rejected_share_is_terminal() {
    let server = MockServer::start().await;
    let mut recipient = registered_client();
    let (api, session) = login(&server, &mut recipient).await;
    let share_id = Uuid::new_v4();
    mount_status(&server, recipient.id().unwrap(), share_id, "rejected").await;

    let mut share = pending_share_for(&recipient);
    let manager = ShareManager::new(Arc::new(api));
    manager
        .reject_share(&session, share_id, &mut share)
        .await
        .unwrap();
    assert_eq!(share.status(), ShareStatus::Rejected);

    let err = manager
        .accept_share(&session, &recipient.secrets, share_id, &mut share)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CloudError::Types(TypesError::InvalidShareTransition {
            from: ShareStatus::Rejected,
            to: ShareStatus::Accepted,
        })
    ));
    assert!(manager.reject_share(&session, share_id, &mut share).await.is_err());
}

#[tokio::test]
async fn share_for_someone_else_does_not_open() {
    let server = MockServer::start().await;
    let mut recipient = registered_client();
    let intended = registered_client();
    let (api, session) = login(&server, &mut recipient).await;

    let mut share = pending_share_for(&intended);
    let manager = ShareManager::new(Arc::new(api));
    let err = manager
        .accept_share(&session, &recipient.secrets, Uuid::new_v4(), &mut share)
        .await
        .unwrap_err();
    assert!(matches!(err, CloudError::Crypto(_)));
    assert_eq!(share.status(), ShareStatus::Pending);
}

#[tokio::test]
async fn failed_accept_report_leaves_share_pending() {
    let server = MockServer::start().await;
    let mut recipient = registered_client();
    let (api, session) = login(&server, &mut recipient).await;
    let owner = recipient.id().unwrap();
    let share_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/share_status/{owner}/{share_id}")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_status(&server, owner, share_id, "accepted").await;

    let mut share = pending_share_for(&recipient);
    let manager = ShareManager::new(Arc::new(api));
    let err = manager
        .accept_share(&session, &recipient.secrets, share_id, &mut share)
        .await
        .unwrap_err();
    assert!(matches!(err, CloudError::Share(_)));
    assert_eq!(share.status(), ShareStatus::Pending);

    let opened = manager
        .accept_share(&session, &recipient.secrets, share_id, &mut share)
        .await
        .unwrap();
    assert_eq!(opened, record());
    assert_eq!(share.status(), ShareStatus::Accepted);
}

#[tokio::test]
async fn failed_reject_report_leaves_share_pending() {
    let server = MockServer::start().await;
    let mut recipient = registered_client();
    let (api, session) = login(&server, &mut recipient).await;
    let owner = recipient.id().unwrap();
    let share_id = Uuid::new_v4();
    Mock::given(method("POST"))
        .and(path(format!("/share_status/{owner}/{share_id}")))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_status(&server, owner, share_id, "rejected").await;

    let mut share = pending_share_for(&recipient);
    let manager = ShareManager::new(Arc::new(api));
    assert!(manager.reject_share(&session, share_id, &mut share).await.is_err());
    assert_eq!(share.status(), ShareStatus::Pending);

    manager
        .reject_share(&session, share_id, &mut share)
        .await
        .unwrap();
    assert_eq!(share.status(), ShareStatus::Rejected);
}
