use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use dashmap::DashMap;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use rand::{thread_rng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::BlogError;
use crate::models::{Post, User};
use crate::repositories::user_repository;
use crate::AppState;

// --- Challenge Nonce Storage ---

const CHALLENGE_TTL: Duration = Duration::from_secs(60 * 5);
const NONCE_LENGTH: usize = 32;

#[derive(Debug, Clone)]
struct ChallengeNonce {
    nonce: Vec<u8>,
    expires_at: Instant,
}

/// Outstanding login challenges. Each nonce can be redeemed exactly once.
#[derive(Debug, Clone)]
pub struct ChallengeStore {
    challenges: Arc<DashMap<Uuid, ChallengeNonce>>,
}

impl ChallengeStore {
    /// Creates the store and spawns its purge task; requires a tokio runtime.
    pub fn new() -> Self {
        let store = Self {
            challenges: Arc::new(DashMap::new()),
        };
        let store_clone = store.clone();
        tokio::spawn(async move {
            store_clone.purge_expired_periodically().await;
        });
        store
    }

    /// Generates a new challenge, stores it, and returns the ID and nonce.
    pub fn generate(&self) -> (Uuid, Vec<u8>) {
        let challenge_id = Uuid::new_v4();
        let mut nonce = vec![0u8; NONCE_LENGTH];
        thread_rng().fill_bytes(&mut nonce);

        self.challenges.insert(
            challenge_id,
            ChallengeNonce {
                nonce: nonce.clone(),
                expires_at: Instant::now() + CHALLENGE_TTL,
            },
        );

        (challenge_id, nonce)
    }

    /// Removes and returns the nonce if it exists and has not expired.
    pub fn use_challenge(&self, challenge_id: Uuid) -> Option<Vec<u8>> {
        self.challenges
            .remove_if(&challenge_id, |_, challenge| {
                challenge.expires_at > Instant::now()
            })
            .map(|(_id, challenge)| challenge.nonce)
    }

    fn purge_expired(&self) {
        self.challenges
            .retain(|_, challenge| challenge.expires_at > Instant::now());
    }

    async fn purge_expired_periodically(&self) {
        let mut interval = tokio::time::interval(CHALLENGE_TTL);
        loop {
            interval.tick().await;
            self.purge_expired();
        }
    }
}

impl Default for ChallengeStore {
    fn default() -> Self {
        Self::new()
    }
}

// --- Auth Endpoints ---

#[derive(Serialize, Deserialize, Debug)]
pub struct ChallengeResponse {
    pub challenge_id: Uuid,
    pub nonce_base64: String,
}

/// Handler to generate and return a new authentication challenge.
pub async fn get_challenge_handler(State(state): State<AppState>) -> Json<ChallengeResponse> {
    let (id, nonce) = state.challenge_store.generate();
    Json(ChallengeResponse {
        challenge_id: id,
        nonce_base64: BASE64_STANDARD.encode(&nonce),
    })
}

// --- Error Types ---

#[derive(Debug, Error, Clone)]
pub enum AuthError {
    #[error("Missing or invalid authentication header(s)")]
    MissingOrInvalidHeaders,

    #[error("Invalid Base64 encoding")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Invalid public key format")]
    InvalidPublicKey,

    #[error("Invalid signature format")]
    InvalidSignature,

    #[error("Invalid challenge ID or challenge expired")]
    InvalidOrExpiredChallenge,

    #[error("Signature verification failed")]
    VerificationFailed,

    #[error("No user is registered for this key")]
    UnknownUser,

    #[error("Internal server error during authentication")]
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingOrInvalidHeaders => StatusCode::UNAUTHORIZED,
            AuthError::InvalidBase64(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidPublicKey => StatusCode::BAD_REQUEST,
            AuthError::InvalidSignature => StatusCode::BAD_REQUEST,
            AuthError::InvalidOrExpiredChallenge => StatusCode::UNAUTHORIZED,
            AuthError::VerificationFailed => StatusCode::UNAUTHORIZED,
            AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// --- Verified Key Extractor ---

/// Proof that the caller holds the private half of this ed25519 key.
/// Does not imply the key belongs to a registered user.
#[derive(Debug, Clone)]
pub struct VerifiedKey(pub Vec<u8>);

pub const HEADER_PUBKEY: &str = "X-Blog-Pubkey-Base64";
pub const HEADER_SIGNATURE: &str = "X-Blog-Signature-Base64";
pub const HEADER_CHALLENGE_ID: &str = "X-Blog-Challenge-ID";

fn header_str<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AuthError> {
    parts
        .headers
        .get(name)
        .ok_or(AuthError::MissingOrInvalidHeaders)?
        .to_str()
        .map_err(|_| AuthError::MissingOrInvalidHeaders)
}

#[async_trait]
impl<S> FromRequestParts<S> for VerifiedKey
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The challenge is consumed on first use, so repeat extraction must hit the cache.
        if let Some(cached_result) = parts.extensions.get::<Result<Self, Self::Rejection>>() {
            debug!("[Auth Extractor] Using cached VerifiedKey result.");
            return cached_result.clone();
        }

        let app_state = AppState::from_ref(state);
        let challenge_store = &app_state.challenge_store;

        let result = (|| -> Result<Self, AuthError> {
            let pubkey_b64 = header_str(parts, HEADER_PUBKEY)?;
            let signature_b64 = header_str(parts, HEADER_SIGNATURE)?;
            let challenge_id_str = header_str(parts, HEADER_CHALLENGE_ID)?;

            let pubkey_bytes = BASE64_STANDARD.decode(pubkey_b64)?;
            let signature_bytes = BASE64_STANDARD.decode(signature_b64)?;

            let challenge_id = Uuid::parse_str(challenge_id_str)
                .map_err(|_| AuthError::InvalidOrExpiredChallenge)?;

            let pubkey_array: &[u8; 32] = pubkey_bytes
                .as_slice()
                .try_into()
                .map_err(|_| AuthError::InvalidPublicKey)?;
            let verifying_key =
                VerifyingKey::from_bytes(pubkey_array).map_err(|_| AuthError::InvalidPublicKey)?;

            let signature_array: &[u8; 64] = signature_bytes
                .as_slice()
                .try_into()
                .map_err(|_| AuthError::InvalidSignature)?;
            let signature = Signature::from_bytes(signature_array);

            let nonce = challenge_store
                .use_challenge(challenge_id)
                .ok_or(AuthError::InvalidOrExpiredChallenge)?;

            verifying_key
                .verify(&nonce, &signature)
                .map_err(|_| AuthError::VerificationFailed)?;

            Ok(VerifiedKey(pubkey_bytes))
        })();

        parts.extensions.insert(result.clone());
        debug!("[Auth Extractor] Cached result: {:?}", result.is_ok());
        result
    }
}

// --- Authenticated User Extractor ---

/// A verified key that belongs to a registered user.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn username(&self) -> &str {
        &self.0.username
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = VerifiedKey::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);

        match user_repository::get_user_by_public_key(&app_state.db_pool, &key.0).await {
            Ok(Some(user)) => Ok(AuthenticatedUser(user)),
            Ok(None) => {
                debug!(pubkey = %BASE64_STANDARD.encode(&key.0), "Verified key has no registered user");
                Err(AuthError::UnknownUser)
            }
            Err(e) => {
                error!(error = %e, "Failed to look up user for verified key");
                Err(AuthError::InternalError)
            }
        }
    }
}

// --- Ownership ---

/// True when `requester` wrote `post`.
pub fn is_author(requester: &AuthenticatedUser, post: &Post) -> bool {
    requester.id() == post.author_id
}

/// Rejects with `Forbidden` unless `requester` wrote `post`.
pub fn require_author(requester: &AuthenticatedUser, post: &Post) -> Result<(), BlogError> {
    if is_author(requester, post) {
        Ok(())
    } else {
        warn!(
            post_id = post.id,
            user_id = requester.id(),
            actual_author = post.author_id,
            "User attempted to modify a post they did not write"
        );
        Err(BlogError::Forbidden)
    }
}
