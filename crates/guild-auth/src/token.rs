//! Invitation token generation.

use uuid::Uuid;

/// Generate an unpredictable single-use invitation token.
///
/// Returns the canonical string form of a random (v4) UUID — 122 bits of
/// entropy from the OS RNG.
pub fn generate_invite_token() -> String {
    Uuid::new_v4().to_string()
}
