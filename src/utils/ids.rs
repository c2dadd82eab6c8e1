use uuid::Uuid;

// ============================================================================
// External Identifiers
// ============================================================================
//
// Orders and payments carry human-readable string ids (ORD-/PAY- plus twelve
// digits). The digits are drawn from a v4 UUID rather than a timestamp, and
// the store enforces uniqueness on insert, so a collision surfaces as a
// conflict instead of silently overwriting a row.
//
// ============================================================================

const DIGITS: u128 = 1_000_000_000_000; // 12 digits

fn digits() -> u64 {
    (Uuid::new_v4().as_u128() % DIGITS) as u64
}

/// Externally-visible order id, e.g. "ORD-483920175266".
pub fn order_id() -> String {
    format!("ORD-{:012}", digits())
}

/// Externally-visible payment id, e.g. "PAY-107265998341".
pub fn payment_id() -> String {
    format!("PAY-{:012}", digits())
}
