/// Route handlers for the API server
///
/// # Modules
///
/// - [`health`]: Liveness and database connectivity check
/// - [`auth`]: Registration, login, token refresh, logout
/// - [`seasons`]: Season listing and admin season management
/// - [`payments`]: Stripe webhook and client-side payment confirmation
/// - [`admin`]: User administration and platform stats

pub mod admin;
pub mod auth;
pub mod health;
pub mod payments;
pub mod seasons;
