use uuid::Uuid;

/// Ticket codes read `DE-XXXXXXXX`: short enough to type at a physical
/// check-in desk, random enough that collisions are overwhelmingly unlikely.
pub const TICKET_PREFIX: &str = "DE";

/// Number of hex characters taken from the random segment.
const RANDOM_LEN: usize = 8;

/// Generate a fresh ticket code from the leading segment of a random UUID.
///
/// Stateless. Global uniqueness is enforced by the store's unique constraint
/// on `ticket_code`, not here; the engine retries with a new code if an
/// insert collides.
pub fn generate() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}-{}", TICKET_PREFIX, hex[..RANDOM_LEN].to_uppercase())
}
