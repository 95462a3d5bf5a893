use super::models::{self as users, RegisterUser, UpdateUser, UserProfile};
use crate::common::auth::Identity;
use crate::common::errors::{BusinessError, BusinessResult, DbErrorExt};
use crate::{duplicate_resource, not_found, validation_error};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, EntityTrait, QueryOrder};
use uuid::Uuid;

/// Profile lookup followed by the ownership check. Missing profiles are
/// reported before foreign ones.
async fn find_owned<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    auth_id: Uuid,
    action: &str,
) -> BusinessResult<users::Model> {
    let user = users::Entity::find_by_id(auth_id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("user"))?
        .ok_or_else(|| not_found!("user", auth_id))?;

    if !identity.owns(auth_id) {
        tracing::debug!(caller = %identity.auth_id, profile = %auth_id, action, "Refused access to another profile");
        return Err(BusinessError::Forbidden {
            action: action.to_string(),
            resource: "another user's profile".to_string(),
        });
    }
    Ok(user)
}

fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

pub async fn list_users<C: ConnectionTrait>(db: &C) -> BusinessResult<Vec<UserProfile>> {
    let users = users::Entity::find()
        .order_by_asc(users::Column::Username)
        .all(db)
        .await
        .map_err(|e| e.to_business_error("user"))?;
    Ok(users.into_iter().map(UserProfile::from).collect())
}

pub async fn get_profile<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    auth_id: Uuid,
) -> BusinessResult<UserProfile> {
    Ok(find_owned(db, identity, auth_id, "view").await?.into())
}

/// Create the caller's own profile
pub async fn register<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    request: RegisterUser,
) -> BusinessResult<UserProfile> {
    let email = request.email.trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return Err(validation_error!("email", "must be an email address"));
    }
    let username = request
        .username
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| username_from_email(&email));

    let existing = users::Entity::find_by_id(identity.auth_id)
        .one(db)
        .await
        .map_err(|e| e.to_business_error("user"))?;
    if existing.is_some() {
        return Err(duplicate_resource!("user", "auth_id"));
    }

    let user = users::ActiveModel {
        auth_id: Set(identity.auth_id),
        username: Set(username),
        email: Set(email),
    }
    .insert(db)
    .await
    .map_err(|e| e.to_business_error("user"))?;

    tracing::info!(user = %user.auth_id, "Registered user profile");
    Ok(user.into())
}

pub async fn update_username<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    auth_id: Uuid,
    request: UpdateUser,
) -> BusinessResult<UserProfile> {
    let user = find_owned(db, identity, auth_id, "edit").await?;
    let username = request.username.trim().to_string();
    if username.is_empty() {
        return Err(validation_error!("username", "must not be empty"));
    }

    let mut active: users::ActiveModel = user.into();
    active.username = Set(username);
    let updated = active
        .update(db)
        .await
        .map_err(|e| e.to_business_error("user"))?;
    Ok(updated.into())
}

pub async fn delete_profile<C: ConnectionTrait>(
    db: &C,
    identity: &Identity,
    auth_id: Uuid,
) -> BusinessResult<()> {
    find_owned(db, identity, auth_id, "delete").await?;
    users::Entity::delete_by_id(auth_id)
        .exec(db)
        .await
        .map_err(|e| e.to_business_error("user"))?;
    tracing::info!(user = %auth_id, "Deleted user profile");
    Ok(())
}
