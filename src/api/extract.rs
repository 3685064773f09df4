use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::error::AppError;
use crate::utils::session_cache::{PlanningSession, SessionRegistry};

const MAX_SESSION_ID_LEN: usize = 64;

/// Session id taken from the `{session_id}` path segment.
pub struct SessionId(pub String);

fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl FromRequest for SessionId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let id = match req.match_info().get("session_id") {
            Some(id) => id,
            None => {
                return ready(Err(
                    AppError::BadRequest("Missing session id".to_string()).into()
                ));
            }
        };

        if !is_valid_session_id(id) {
            return ready(Err(AppError::BadRequest(format!(
                "Invalid session id '{}'",
                id
            ))
            .into()));
        }

        ready(Ok(SessionId(id.to_string())))
    }
}

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Looks the session up without creating it.
    pub async fn resolve(
        &self,
        registry: &SessionRegistry,
    ) -> Result<Arc<PlanningSession>, AppError> {
        registry
            .get(&self.0)
            .await
            .ok_or_else(|| AppError::SessionNotFound(self.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_charset() {
        assert!(is_valid_session_id("team-a_2024"));
        assert!(is_valid_session_id("3f1c2a4e-0d6b-4f7e-9a51-2b8c7d6e5f40"));
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id("a b"));
        assert!(!is_valid_session_id("é"));
        assert!(!is_valid_session_id(&"x".repeat(65)));
    }
}
