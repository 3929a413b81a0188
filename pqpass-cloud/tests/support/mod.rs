//! Shared helpers for tests against a mocked pqpass server.

#![allow(dead_code)]

use pqpass_cloud::api_client::CloudApiClient;
use pqpass_cloud::handshake::{self, Session};
use pqpass_cloud::types::{CreateUserRequest, CreateUserResponse};
use pqpass_cloud::CloudConfig;
use pqpass_crypto::{kem, seal_record, sign, wrap_outer};
use pqpass_types::{
    ClientEx, ClientIdentity, DiPublic, EncryptedPassword, PasswordRecord, SessionSecret, Uuid,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TOKEN: &str = "tok-123";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn challenge() -> Vec<u8> {
    (0u8..32).collect()
}

pub fn config(server: &MockServer) -> CloudConfig {
    CloudConfig {
        api_base_url: server.uri(),
        ..CloudConfig::default()
    }
}

pub fn api(server: &MockServer) -> CloudApiClient {
    CloudApiClient::new(config(server)).unwrap()
}

/// A locally generated client with a server id already assigned.
pub fn registered_client() -> ClientEx {
    let secrets = pqpass_crypto::generate_client_secrets().unwrap();
    let mut identity = ClientIdentity::unregistered(
        "a@b.com",
        secrets.ky_public.clone(),
        secrets.di_public.clone(),
    );
    identity.assign_id(Uuid::new_v4()).unwrap();
    ClientEx::new(secrets, identity)
}

// --- Responders ---

/// Accepts the verify call only if the body is a valid signature of
/// [`challenge`] under `public`.
pub struct VerifySignature {
    pub public: DiPublic,
}

impl Respond for VerifySignature {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        let Ok(signature) = serde_json::from_slice::<Vec<u8>>(&req.body) else {
            return ResponseTemplate::new(400);
        };
        if sign::verify(&self.public, &challenge(), &signature) {
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("token={TOKEN}; Path=/; HttpOnly").as_str())
        } else {
            ResponseTemplate::new(401)
        }
    }
}

/// Registers whatever keys the client sends under a fixed id.
pub struct EchoRegistration {
    pub id: Uuid,
}

impl Respond for EchoRegistration {
    fn respond(&self, req: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<CreateUserRequest>(&req.body) else {
            return ResponseTemplate::new(400);
        };
        ResponseTemplate::new(200).set_body_json(CreateUserResponse {
            id: self.id.to_string(),
            email: body.email,
            ky_p: body.ky_p,
            di_p: body.di_p,
        })
    }
}

// --- Handshake ---

/// Mounts challenge, verify and sync for `client`. Returns the session
/// secret the server encapsulated.
pub async fn mount_handshake(server: &MockServer, client: &ClientEx) -> SessionSecret {
    let id = client.id().unwrap();
    Mock::given(method("GET"))
        .and(path(format!("/challenge/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(challenge()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/verify/{id}")))
        .respond_with(VerifySignature {
            public: client.identity.di_public.clone(),
        })
        .mount(server)
        .await;

    let (ciphertext, secret) = kem::encapsulate(&client.secrets.ky_public).unwrap();
    Mock::given(method("GET"))
        .and(path(format!("/sync/{id}")))
        .and(header("authorization", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(ciphertext))
        .mount(server)
        .await;
    secret
}

/// Runs a full mocked handshake. `client` ends up holding the session secret.
pub async fn login(server: &MockServer, client: &mut ClientEx) -> (CloudApiClient, Session) {
    mount_handshake(server, client).await;
    let api = api(server);
    let id = client.id().unwrap();
    let session = handshake::authenticate(&api, id, &mut client.secrets)
        .await
        .unwrap();
    (api, session)
}

// --- Envelopes ---

/// Envelope as the server delivers it: client inner layer, outer layer
/// under the session secret.
pub fn server_envelope(client: &ClientEx, record: &PasswordRecord) -> EncryptedPassword {
    let session = client.secrets.secret.as_ref().unwrap();
    let inner = seal_record(&client.secrets.ky_secret, record).unwrap();
    wrap_outer(session.as_ref(), &inner).unwrap()
}

pub async fn mount_send_all(
    server: &MockServer,
    owner: Uuid,
    entries: Vec<(EncryptedPassword, String)>,
) {
    Mock::given(method("GET"))
        .and(path(format!("/send_all/{owner}")))
        .and(header("authorization", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "passwords": entries,
        })))
        .mount(server)
        .await;
}
