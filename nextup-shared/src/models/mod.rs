/// Database models for NextUp
///
/// # Models
///
/// - `user`: League accounts with hashed credentials and an admin flag
/// - `season`: Time-boxed league periods; at most one active at a time
/// - `tryout`: Paid registrations keyed by (user, season)
///
/// # Example
///
/// ```no_run
/// use nextup_shared::models::user::{CreateUser, User};
/// use nextup_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         name: "Jordan".to_string(),
///         email: "jordan@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         is_admin: false,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod season;
pub mod tryout;
pub mod user;
