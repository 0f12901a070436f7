//! UUID utilities

use uuid::Uuid;

/// Length of the short per-request identifier
pub const SHORT_UID_LEN: usize = 8;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Short random identifier used to scope temp files and object keys to one request
///
/// First eight hex digits of a fresh UUIDv4.
pub fn short_uid() -> String {
    let mut s = generate().simple().to_string();
    s.truncate(SHORT_UID_LEN);
    s
}
