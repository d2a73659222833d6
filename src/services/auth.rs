//! Credential verification, role gating and the default owner bootstrap

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::{
    config::{AuthConfig, BootstrapConfig},
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{CreateUser, User},
    },
    repository::Repository,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Secret behind the stand-in hash checked for unknown emails
const UNKNOWN_ACCOUNT_SECRET: &[u8] = b"bibliotheca-no-such-account";

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    params: Params,
    /// Verified when the email is unknown, so both failures cost one Argon2 run
    dummy_hash: String,
}

impl AuthService {
    pub fn new(repository: Repository, config: &AuthConfig) -> AppResult<Self> {
        let params = Params::new(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Invalid argon2 parameters: {}", e)))?;

        let dummy_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
            .hash_password(UNKNOWN_ACCOUNT_SECRET, &SaltString::generate(&mut OsRng))
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        Ok(Self {
            repository,
            params,
            dummy_hash,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Resolve the user owning `email` and check `password` against its hash
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.repository.users.get_by_email(email).await? else {
            self.verify_hash(&self.dummy_hash, password);
            tracing::debug!("unknown email");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        };

        if !self.verify_hash(&user.password_hash, password) {
            tracing::debug!(user_id = user.id, "password mismatch");
            return Err(AppError::Authentication(INVALID_CREDENTIALS.to_string()));
        }

        Ok(user)
    }

    /// Reject a legitimate user whose role does not match the route group
    pub fn authorize(&self, user: &User, required: Role) -> AppResult<()> {
        if user.role != required {
            tracing::debug!(user_id = user.id, role = %user.role, required = %required, "role mismatch");
            return Err(AppError::Authorization(format!(
                "The {} role is required for this operation",
                required
            )));
        }
        Ok(())
    }

    /// Verify password against a PHC hash (constant-time comparison)
    fn verify_hash(&self, hash: &str, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!("unreadable password hash: {}", e);
                return false;
            }
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Make sure the default owner exists. Returns true when it had to be created.
    pub async fn ensure_default_owner(&self, config: &BootstrapConfig) -> AppResult<bool> {
        let existing = self
            .repository
            .users
            .find_member(&config.owner_email, Role::Owner, config.library_id)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let owner = CreateUser {
            name: config.owner_name.clone(),
            email: config.owner_email.clone(),
            contact: Some(config.owner_contact.clone()),
            role: Role::Owner,
            lib_id: config.library_id,
            password: config.owner_password.clone(),
        };
        let password_hash = self.hash_password(&owner.password)?;
        let created = self.repository.users.create(&owner, &password_hash).await?;

        tracing::info!(user_id = created.id, email = %created.email, "created default owner");
        Ok(true)
    }
}
