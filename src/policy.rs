//! Who may change what.
//!
//! Resources are mutable by their owner or by an admin. Publishers may own a
//! single bootcamp; each identity may review a bootcamp once.

use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{Bootcamp, Course, Review};

pub trait Owned {
    const LABEL: &'static str;
    fn owner(&self) -> Uuid;
}

impl Owned for Bootcamp {
    const LABEL: &'static str = "bootcamp";
    fn owner(&self) -> Uuid {
        self.user
    }
}

impl Owned for Course {
    const LABEL: &'static str = "course";
    fn owner(&self) -> Uuid {
        self.user
    }
}

impl Owned for Review {
    const LABEL: &'static str = "review";
    fn owner(&self) -> Uuid {
        self.user
    }
}

pub fn can_mutate<R: Owned>(identity: &CurrentUser, resource: &R) -> bool {
    identity.is_admin() || resource.owner() == identity.id
}

/// `action` completes "not authorized to ... this <resource>", e.g. `update`.
pub fn ensure_can_mutate<R: Owned>(identity: &CurrentUser, resource: &R, action: &str) -> Result<(), ApiError> {
    if can_mutate(identity, resource) {
        Ok(())
    } else {
        tracing::debug!(user = %identity.id, owner = %resource.owner(), action, "ownership check failed");
        Err(ApiError::forbidden(format!(
            "User {} is not authorized to {} this {}",
            identity.id,
            action,
            R::LABEL
        )))
    }
}

/// Creation-time rule: a publisher who already owns a bootcamp may not add another.
pub fn ensure_can_publish(identity: &CurrentUser, owned_bootcamps: u64) -> Result<(), ApiError> {
    if !identity.is_admin() && owned_bootcamps > 0 {
        return Err(ApiError::bad_request(format!(
            "The user with ID {} has already published a bootcamp",
            identity.id
        )));
    }
    Ok(())
}

pub fn ensure_first_review(existing_reviews: u64) -> Result<(), ApiError> {
    if existing_reviews > 0 {
        return Err(ApiError::bad_request("You have already reviewed this bootcamp"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BootcampInput, Role};
    use axum::http::StatusCode;
    use serde_json::json;

    fn identity(role: Role) -> CurrentUser {
        CurrentUser { id: Uuid::new_v4(), name: "n".into(), email: "e@x.io".into(), role }
    }

    fn bootcamp_owned_by(owner: Uuid) -> Bootcamp {
        let input: BootcampInput = serde_json::from_value(json!({
            "name": "Devworks", "description": "d", "address": "a", "careers": ["Other"]
        }))
        .unwrap();
        Bootcamp::from_input(&input, owner)
    }

    #[test]
    fn ownership_matrix() {
        let owner = identity(Role::Publisher);
        let other_publisher = identity(Role::Publisher);
        let other_user = identity(Role::User);
        let admin = identity(Role::Admin);
        let camp = bootcamp_owned_by(owner.id);

        assert!(can_mutate(&owner, &camp));
        assert!(can_mutate(&admin, &camp));
        assert!(!can_mutate(&other_publisher, &camp));
        assert!(!can_mutate(&other_user, &camp));

        let err = ensure_can_mutate(&other_publisher, &camp, "update").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(err.message().ends_with("not authorized to update this bootcamp"));
    }

    #[test]
    fn publisher_may_own_one_bootcamp() {
        let publisher = identity(Role::Publisher);
        assert!(ensure_can_publish(&publisher, 0).is_ok());

        let err = ensure_can_publish(&publisher, 1).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("already published"));

        assert!(ensure_can_publish(&identity(Role::Admin), 3).is_ok());
    }

    #[test]
    fn one_review_per_bootcamp() {
        assert!(ensure_first_review(0).is_ok());
        assert_eq!(ensure_first_review(1).unwrap_err().status_code(), StatusCode::BAD_REQUEST);
    }
}
