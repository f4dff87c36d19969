use crate::models::User;
use crate::store::UserRepository;
use super::authenticator::AuthError;
use super::password::hash_password;

/// Provision the administrative account if it does not exist yet. Safe to run
/// on every start; an existing account keeps its current password.
pub async fn ensure_default_user(
    users: &dyn UserRepository,
    username: &str,
    password: &str,
) -> Result<bool, AuthError> {
    if users.find_by_username(username).await?.is_some() {
        tracing::debug!(username, "Default user already present");
        return Ok(false);
    }

    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))?;

    let created = users
        .create_if_absent(User {
            username: username.to_string(),
            password_hash,
        })
        .await?;

    if created {
        tracing::info!(username, "Default user created");
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_default_user_is_created_once() {
        let store = InMemoryStore::new();

        assert!(ensure_default_user(&store, "user2", "test2").await.unwrap());
        assert!(!ensure_default_user(&store, "user2", "changed").await.unwrap());

        let user = store.find_by_username("user2").await.unwrap().unwrap();
        assert_ne!(user.password_hash, "test2");
        assert!(verify_password("test2", &user.password_hash));
    }
}
