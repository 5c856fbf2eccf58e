use anyhow::Result;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use sqlx::PgPool;

/// Create a demo owner account from `SEED_OWNER_EMAIL` / `SEED_OWNER_PASSWORD`
/// when both are set and the account does not exist yet. Quietly does nothing
/// otherwise, so production deployments simply omit the variables.
pub async fn seed_owner(pool: &PgPool) -> Result<()> {
    let (Ok(email), Ok(password)) = (
        std::env::var("SEED_OWNER_EMAIL"),
        std::env::var("SEED_OWNER_PASSWORD"),
    ) else {
        return Ok(());
    };

    if super::find_user_by_email(pool, &email).await?.is_some() {
        tracing::info!("Seed owner {} already present, skipping", email);
        return Ok(());
    }

    let salt = SaltString::generate(rand_core::OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash seed password: {}", e))?
        .to_string();

    let name = std::env::var("SEED_OWNER_NAME").unwrap_or_else(|_| "Owner".to_string());
    super::create_user(pool, &email, &hash, &name).await?;
    tracing::info!("Seeded owner account {}", email);
    Ok(())
}
