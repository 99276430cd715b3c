use tokio::task::{spawn_blocking, JoinError};

pub const DEFAULT_COST: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("password task failed: {0}")]
    Task(#[from] JoinError),
}

/// bcrypt hashing, run on the blocking pool so slow hashes never stall the runtime.
#[derive(Debug, Clone, Copy)]
pub struct Passwords {
    cost: u32,
}

impl Default for Passwords {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl Passwords {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_string();
        let cost = self.cost;

        Ok(spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();

        Ok(spawn_blocking(move || bcrypt::verify(password, &password_hash)).await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let passwords = Passwords::new(4);

        let hash = passwords.hash("correct horse").await.unwrap();

        assert_ne!(hash, "correct horse");
        assert!(passwords.verify("correct horse", &hash).await.unwrap());
        assert!(!passwords.verify("wrong horse", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn invalid_cost_is_an_error() {
        let err = Passwords::new(40).hash("pw").await.unwrap_err();
        assert!(matches!(err, PasswordError::Bcrypt(_)));
    }
}
