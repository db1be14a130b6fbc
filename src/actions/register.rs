use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::users::{CreateUser, SystemRole, User, UserRepository};
use crate::validators::{validate_email, FieldErrors, ValidationError};
use crate::HearthError;

/// Action to register a new user.
///
/// Validates the email, display name, and password, hashes the password
/// with Argon2id, and creates the account with the base `user` role.
pub struct RegisterAction<R, H = Argon2Hasher>
where
    R: UserRepository,
    H: PasswordHasher,
{
    repository: R,
    hasher: H,
}

impl<R: UserRepository> RegisterAction<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            hasher: Argon2Hasher::default(),
        }
    }
}

impl<R: UserRepository, H: PasswordHasher> RegisterAction<R, H> {
    pub fn with_hasher(repository: R, hasher: H) -> Self {
        Self { repository, hasher }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(name = "register", skip_all, err))]
    pub async fn execute(&self, email: &str, name: &str, password: &str) -> Result<User, HearthError> {
        let mut errors = FieldErrors::new();
        errors.check("email", validate_email(email));
        errors.check("name", validate_name(name));
        errors.check("password", validate_password(password));
        errors.into_result()?;

        if self.repository.find_by_email(email).await?.is_some() {
            return Err(HearthError::UserAlreadyExists);
        }

        let hashed = self.hasher.hash(password)?;

        let user = self
            .repository
            .create(CreateUser {
                email: email.to_owned(),
                name: name.trim().to_owned(),
                hashed_password: hashed,
                role: SystemRole::User,
            })
            .await?;

        log::info!(target: "hearth", "msg=\"user registered\", user_id={}", user.id);

        Ok(user)
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::NameEmpty);
    }
    if trimmed.len() > 100 {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }
    if password.len() < 8 {
        return Err(ValidationError::PasswordTooShort);
    }
    if password.len() > 128 {
        return Err(ValidationError::PasswordTooLong);
    }
    Ok(())
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::users::MockUserRepository;

    #[tokio::test]
    async fn test_register_success() {
        let repo = MockUserRepository::new();
        let action = RegisterAction::new(repo);

        let user = action
            .execute("safta@example.com", "Safta", "securepassword")
            .await
            .unwrap();

        assert_eq!(user.email, "safta@example.com");
        assert_eq!(user.role, SystemRole::User);
        assert_ne!(user.hashed_password, "securepassword");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let repo = MockUserRepository::new();
        let action = RegisterAction::new(repo);

        action
            .execute("safta@example.com", "Safta", "securepassword")
            .await
            .unwrap();

        let err = action
            .execute("safta@example.com", "Imposter", "otherpassword")
            .await
            .unwrap_err();
        assert_eq!(err, HearthError::UserAlreadyExists);
    }

    #[tokio::test]
    async fn test_register_collects_field_errors() {
        let repo = MockUserRepository::new();
        let action = RegisterAction::new(repo);

        let err = action.execute("notanemail", "", "short").await.unwrap_err();
        let HearthError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert!(fields.fields().contains_key("email"));
        assert!(fields.fields().contains_key("name"));
        assert!(fields.fields().contains_key("password"));
    }
}
