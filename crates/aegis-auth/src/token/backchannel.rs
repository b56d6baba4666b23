//! CIBA / device flow polling state machine.
//!
//! Both backchannel flows share one shape at the token endpoint: the client
//! repeatedly polls with a handle (auth_req_id or device code), and the
//! server answers from one of three states — the authorization was granted,
//! it is still pending, or the handle no longer resolves at all.
//!
//! Pacing rule: the pending record stores the instant of the previous poll.
//! On the first poll that field is absent and defaults to "now", so elapsed
//! time computes to zero and the first poll always answers `slow_down`.
//! Every poll unconditionally stamps the record with the current instant.

use time::{Duration, OffsetDateTime};

use crate::error::AuthError;
use crate::storage::{PendingAuthorization, PendingStatus};

/// Pacing decision for a poll against a still-pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// The client waited long enough; keep waiting for the user.
    AuthorizationPending,
    /// The client polled too fast.
    SlowDown,
}

/// Evaluates one poll against a pending record and stamps its last-poll
/// instant.
#[must_use]
pub fn evaluate_poll(
    record: &mut PendingAuthorization,
    now: OffsetDateTime,
    interval: Duration,
) -> PollDecision {
    let last_poll = record.last_poll.unwrap_or(now);
    let elapsed = now - last_poll;
    record.last_poll = Some(now);

    if elapsed > interval {
        PollDecision::AuthorizationPending
    } else {
        PollDecision::SlowDown
    }
}

/// Maps a pending record to the error answered to the polling client,
/// updating the record's last-poll instant when pacing applies.
///
/// The caller persists the record afterwards.
#[must_use]
pub fn pending_error(
    record: &mut PendingAuthorization,
    now: OffsetDateTime,
    interval: Duration,
) -> AuthError {
    if record.status == PendingStatus::Pending && now > record.expires_at {
        return AuthError::expired_token("The authorization request has expired");
    }

    match record.status {
        PendingStatus::Pending => match evaluate_poll(record, now, interval) {
            PollDecision::AuthorizationPending => AuthError::AuthorizationPending,
            PollDecision::SlowDown => AuthError::SlowDown,
        },
        PendingStatus::Denied => {
            AuthError::access_denied("The end-user denied the authorization request")
        }
        PendingStatus::Expired => {
            AuthError::expired_token("The authorization request has expired")
        }
    }
}
