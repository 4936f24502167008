use uuid::Uuid;

use crate::errors::AppError;

/// Mutation of an owned resource is allowed only for its owner.
///
/// Callers run this after the resource was found, so a foreign post answers
/// `Unauthorized` rather than `PostNotFound`. That reveals the post exists.
pub fn ensure_owner(actor: Uuid, owner: Uuid) -> Result<(), AppError> {
    if actor == owner {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}
