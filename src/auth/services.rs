use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use regex::Regex;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub(crate) use crate::auth::claims::{Claims, TokenKind};
pub(crate) use crate::auth::dto::JwtKeys;
use crate::auth::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest};
use crate::auth::extractors::Session;
use crate::auth::password::{check_new_password, hash_password, verify_password};
use crate::auth::repo_types::User;
use crate::config::JwtConfig;
use crate::db::StoreError;
use crate::error::AppError;
use crate::profiles::{Profile, UserType};
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
            refresh_ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: Duration::from_secs((ttl_minutes.max(0) as u64) * 60),
            refresh_ttl: Duration::from_secs((refresh_ttl_minutes.max(0) as u64) * 60),
        }
    }
}

impl JwtKeys {
    fn sign_with_kind(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Access)
    }
    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign_with_kind(user_id, TokenKind::Refresh)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            anyhow::bail!("not a refresh token");
        }
        Ok(claims)
    }
}

/// Normalizes the email and checks every sign-up rule before anything is written.
pub(crate) fn validate_registration(payload: &mut RegisterRequest) -> Result<(), AppError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.full_name = payload.full_name.trim().to_string();

    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    check_new_password(&payload.password, &payload.confirm_password)
        .map_err(|msg| AppError::Validation(msg.into()))
}

fn issue_tokens(state: &AppState, user: &User, profile: &Profile) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id)?,
        refresh_token: keys.sign_refresh(user.id)?,
        user: PublicUser {
            id: user.id,
            email: user.email.clone(),
            full_name: profile.full_name.clone(),
            user_type: profile.user_type,
        },
    })
}

/// Profile for `user`, created with defaults when the row is missing.
async fn profile_or_default(state: &AppState, user: &User) -> Result<Profile, AppError> {
    match state.profiles.get(user.id).await? {
        Some(profile) => Ok(profile),
        None => {
            let profile = Profile::new_default(user.id, &user.email, "", UserType::Jobseeker);
            Ok(state.profiles.insert(profile).await?)
        }
    }
}

pub async fn register(
    state: &AppState,
    mut payload: RegisterRequest,
) -> Result<AuthResponse, AppError> {
    if let Err(e) = validate_registration(&mut payload) {
        warn!(email = %payload.email, error = %e, "registration rejected");
        return Err(e);
    }

    let hash = hash_password(&payload.password)?;
    let created = state
        .users
        .create_with_profile(&payload.email, &hash, &payload.full_name, payload.user_type)
        .await;
    let (user, profile) = match created {
        Ok(pair) => pair,
        Err(StoreError::Conflict) => {
            warn!(email = %payload.email, "email already registered");
            return Err(AppError::EmailTaken);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, user_type = %profile.user_type, "user registered");
    issue_tokens(state, &user, &profile)
}

pub async fn login(state: &AppState, mut payload: LoginRequest) -> Result<AuthResponse, AppError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation("Invalid email".into()));
    }

    let Some(user) = state.users.find_by_email(&payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let profile = profile_or_default(state, &user).await?;
    info!(user_id = %user.id, "user logged in");
    issue_tokens(state, &user, &profile)
}

pub async fn refresh(state: &AppState, refresh_token: &str) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys
        .verify_refresh(refresh_token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    if state.sessions.is_revoked(claims.jti).await? {
        return Err(AppError::Unauthorized("Session has been signed out".into()));
    }

    let user = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    let profile = profile_or_default(state, &user).await?;
    issue_tokens(state, &user, &profile)
}

/// Sign-out: the presented session id, and the paired refresh token when given, are
/// refused from now on.
pub async fn logout(
    state: &AppState,
    session: &Session,
    refresh_token: Option<&str>,
) -> Result<(), AppError> {
    state
        .sessions
        .revoke(session.jti, session.user_id, session.expires_at)
        .await?;

    if let Some(token) = refresh_token {
        let keys = JwtKeys::from_ref(state);
        match keys.verify_refresh(token) {
            Ok(claims) if claims.sub == session.user_id => {
                let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp as i64)
                    .unwrap_or(session.expires_at);
                state
                    .sessions
                    .revoke(claims.jti, claims.sub, expires_at)
                    .await?;
            }
            Ok(_) => warn!(user_id = %session.user_id, "refresh token belongs to another user"),
            Err(e) => debug!(error = %e, "ignoring invalid refresh token on logout"),
        }
    }

    info!(user_id = %session.user_id, "user signed out");
    Ok(())
}

pub async fn me(state: &AppState, session: &Session) -> Result<PublicUser, AppError> {
    let user = state
        .users
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    let profile = profile_or_default(state, &user).await?;
    Ok(PublicUser {
        id: user.id,
        email: user.email,
        full_name: profile.full_name,
        user_type: profile.user_type,
    })
}
