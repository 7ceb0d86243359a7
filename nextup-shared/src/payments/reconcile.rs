/// Checkout-to-registration reconciliation
///
/// Both payment ingress paths (the webhook and the client-side confirm
/// endpoint) call [`reconcile_checkout`] with a verified checkout session.
/// The function checks the session is paid, decodes the composite client
/// reference, verifies both referenced entities still exist, and records the
/// registration through the constraint-backed idempotent insert. Calling it
/// twice for the same session is safe; the second call reports
/// [`ReconcileOutcome::AlreadyRecorded`].

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{season::Season, tryout::Tryout, user::User};

use super::stripe::CheckoutSession;

/// Result of attempting to turn a checkout session into a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A new registration row was inserted
    Recorded,

    /// The registration already existed; nothing changed
    AlreadyRecorded,

    /// The session's payment status is not "paid"
    NotPaid,

    /// The client reference is missing or does not decode to two UUIDs
    BadReference,

    /// The reference decoded but the user or season no longer exists
    UnknownEntity,
}

/// Decodes a composite `"<user_id>|<season_id>"` client reference
///
/// Strict format: exactly one pipe, both halves valid UUIDs. Anything else
/// is `None`.
pub fn parse_client_reference(reference: &str) -> Option<(Uuid, Uuid)> {
    let mut parts = reference.split('|');
    let user_part = parts.next()?;
    let season_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let user_id = Uuid::parse_str(user_part).ok()?;
    let season_id = Uuid::parse_str(season_part).ok()?;
    Some((user_id, season_id))
}

/// True when a database error is a foreign-key violation (SQLSTATE 23503)
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23503"),
        _ => false,
    }
}

/// Records a paid checkout session as a tryout registration
///
/// The caller is responsible for having authenticated the session's origin
/// (webhook signature, or retrieval from the provider by ID); this function
/// only trusts the session contents it is given.
pub async fn reconcile_checkout(
    pool: &PgPool,
    session: &CheckoutSession,
) -> Result<ReconcileOutcome, sqlx::Error> {
    if session.payment_status != "paid" {
        tracing::info!(
            session_id = %session.id,
            payment_status = %session.payment_status,
            "Skipping unpaid checkout session"
        );
        return Ok(ReconcileOutcome::NotPaid);
    }

    let reference = match session.client_reference_id.as_deref() {
        Some(r) => r,
        None => {
            tracing::warn!(session_id = %session.id, "Paid session has no client reference");
            return Ok(ReconcileOutcome::BadReference);
        }
    };

    let (user_id, season_id) = match parse_client_reference(reference) {
        Some(pair) => pair,
        None => {
            tracing::warn!(
                session_id = %session.id,
                reference = %reference,
                "Paid session has an undecodable client reference"
            );
            return Ok(ReconcileOutcome::BadReference);
        }
    };

    // The user or season may have been deleted between checkout and
    // delivery; a dangling insert would violate the foreign keys anyway,
    // so check both up front and report a distinct outcome.
    if !User::exists(pool, user_id).await? || !Season::exists(pool, season_id).await? {
        tracing::warn!(
            session_id = %session.id,
            user_id = %user_id,
            season_id = %season_id,
            "Paid session references a missing user or season"
        );
        return Ok(ReconcileOutcome::UnknownEntity);
    }

    // A delete can still land between the existence check and the insert;
    // the foreign keys catch that window, and the outcome is the same
    // missing-entity case, not a retryable error.
    let inserted = match Tryout::record_paid(pool, user_id, season_id).await {
        Ok(inserted) => inserted,
        Err(err) if is_foreign_key_violation(&err) => {
            tracing::warn!(
                session_id = %session.id,
                user_id = %user_id,
                season_id = %season_id,
                "User or season deleted between existence check and insert"
            );
            return Ok(ReconcileOutcome::UnknownEntity);
        }
        Err(err) => return Err(err),
    };

    if inserted {
        tracing::info!(
            session_id = %session.id,
            user_id = %user_id,
            season_id = %season_id,
            "Recorded paid tryout registration"
        );
        Ok(ReconcileOutcome::Recorded)
    } else {
        tracing::info!(
            session_id = %session.id,
            user_id = %user_id,
            season_id = %season_id,
            "Registration already recorded, duplicate delivery ignored"
        );
        Ok(ReconcileOutcome::AlreadyRecorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_reference() {
        let user_id = Uuid::new_v4();
        let season_id = Uuid::new_v4();
        let reference = format!("{user_id}|{season_id}");

        assert_eq!(
            parse_client_reference(&reference),
            Some((user_id, season_id))
        );
    }

    #[test]
    fn test_parse_rejects_no_pipe() {
        assert_eq!(parse_client_reference("abc"), None);
        assert_eq!(parse_client_reference(&Uuid::new_v4().to_string()), None);
    }

    #[test]
    fn test_parse_rejects_extra_pipes() {
        let reference = format!("{}|{}|extra", Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(parse_client_reference(&reference), None);
    }

    #[test]
    fn test_parse_rejects_non_uuid_halves() {
        assert_eq!(parse_client_reference("not-a-uuid|also-not"), None);
        assert_eq!(
            parse_client_reference(&format!("{}|not-a-uuid", Uuid::new_v4())),
            None
        );
        assert_eq!(
            parse_client_reference(&format!("not-a-uuid|{}", Uuid::new_v4())),
            None
        );
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(parse_client_reference(""), None);
        assert_eq!(parse_client_reference("|"), None);
    }

    #[test]
    fn test_non_database_errors_are_not_fk_violations() {
        assert!(!is_foreign_key_violation(&sqlx::Error::RowNotFound));
        assert!(!is_foreign_key_violation(&sqlx::Error::PoolClosed));
    }

    // reconcile_checkout outcomes are exercised against a real database in
    // nextup-api/tests/store_tests.rs.
}
