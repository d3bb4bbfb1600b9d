use tracing::warn;
use uuid::Uuid;

use super::extractors::AuthUser;
use crate::error::ApiError;

pub fn is_owner(resource_owner_id: Uuid, acting_user_id: Uuid) -> bool {
    resource_owner_id == acting_user_id
}

/// Must be checked before any mutation of the resource.
pub fn ensure_owner(resource_owner_id: Uuid, actor: &AuthUser) -> Result<(), ApiError> {
    if is_owner(resource_owner_id, actor.id) {
        return Ok(());
    }
    warn!(owner_id = %resource_owner_id, user_id = %actor.id, "ownership check failed");
    Err(ApiError::forbidden("only the author may modify this resource"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn owner_matches_only_itself() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(is_owner(a, a));
        assert!(!is_owner(a, b));
        assert!(!is_owner(b, a));
    }

    #[test]
    fn ensure_owner_forbids_strangers() {
        let owner = Uuid::new_v4();
        let stranger = AuthUser {
            id: Uuid::new_v4(),
            email: "s@x.com".into(),
        };
        let err = ensure_owner(owner, &stranger).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let me = AuthUser {
            id: owner,
            email: "o@x.com".into(),
        };
        assert!(ensure_owner(owner, &me).is_ok());
    }
}
