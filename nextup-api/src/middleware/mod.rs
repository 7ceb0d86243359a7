/// Middleware modules for the API server
///
/// Authentication layers live in `nextup_shared::auth::middleware` and are
/// wired up in `app.rs`; this module holds the API-local middleware.

pub mod security;
