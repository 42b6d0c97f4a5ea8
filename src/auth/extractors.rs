use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use super::claims::TokenKind;
use super::dto::JwtKeys;
use crate::error::AppError;
use crate::profiles::UserType;
use crate::state::AppState;

/// Per-request session context: who is calling and in which role.
///
/// Built from the bearer token on every request; the role comes from the caller's
/// profile and falls back to job seeker when no profile exists yet.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub jti: Uuid,
    pub expires_at: OffsetDateTime,
    pub user_type: UserType,
}

impl Session {
    pub fn require(&self, user_type: UserType) -> Result<(), AppError> {
        if self.user_type == user_type {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "This action is only available to {} accounts",
                user_type
            )))
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header".into()))
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let keys = JwtKeys::from_ref(state);

        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

        if claims.kind != TokenKind::Access {
            return Err(AppError::Unauthorized("Access token required".into()));
        }

        if state.sessions.is_revoked(claims.jti).await? {
            return Err(AppError::Unauthorized("Session has been signed out".into()));
        }

        let user_type = state
            .profiles
            .get(claims.sub)
            .await?
            .map(|p| p.user_type)
            .unwrap_or_default();

        let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp as i64)
            .map_err(|_| AppError::Unauthorized("Invalid token expiry".into()))?;

        Ok(Session {
            user_id: claims.sub,
            jti: claims.jti,
            expires_at,
            user_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    use crate::testing;

    async fn extract(state: &AppState, header: Option<String>) -> Result<Session, AppError> {
        let mut builder = Request::builder().uri("/me");
        if let Some(h) = header {
            builder = builder.header("authorization", h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Session::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn resolves_role_from_profile() {
        let (state, store) = testing::test_state();
        let employer = testing::seed_user(&store, "hr@corp.co", UserType::Employer).await;

        let session = extract(&state, Some(testing::bearer(&state, employer)))
            .await
            .expect("session");
        assert_eq!(session.user_id, employer);
        assert_eq!(session.user_type, UserType::Employer);
        assert!(session.require(UserType::Employer).is_ok());
        assert!(matches!(
            session.require(UserType::Jobseeker),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn missing_profile_defaults_to_jobseeker() {
        let (state, _) = testing::test_state();
        let session = extract(&state, Some(testing::bearer(&state, Uuid::new_v4())))
            .await
            .expect("session");
        assert_eq!(session.user_type, UserType::Jobseeker);
    }

    #[tokio::test]
    async fn rejects_missing_and_refresh_tokens() {
        let (state, _) = testing::test_state();
        assert!(matches!(
            extract(&state, None).await,
            Err(AppError::Unauthorized(_))
        ));

        let keys = JwtKeys::from_ref(&state);
        let refresh = keys.sign_refresh(Uuid::new_v4()).unwrap();
        assert!(matches!(
            extract(&state, Some(format!("Bearer {refresh}"))).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn rejects_revoked_session() {
        let (state, _) = testing::test_state();
        let header = testing::bearer(&state, Uuid::new_v4());
        let session = extract(&state, Some(header.clone())).await.expect("session");

        state
            .sessions
            .revoke(session.jti, session.user_id, session.expires_at)
            .await
            .unwrap();

        assert!(matches!(
            extract(&state, Some(header)).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
