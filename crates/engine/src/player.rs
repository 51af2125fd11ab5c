//! The capability interface a host player object must provide.

use uuid::Uuid;

/// Minimal view of a player, as far as the engine is concerned.
///
/// Game servers hand out several different player types (online player,
/// offline profile, command sender). The engine binds to none of them; hosts
/// wrap whatever they have in this trait and the engine only ever sees the
/// capabilities below.
pub trait PlayerHandle {
    /// Stable player identifier; doubles as the ledger account id.
    fn id(&self) -> Uuid;

    /// Human-readable name, used in log context and messages.
    fn display_name(&self) -> &str;

    /// Deliver a chat message to the player. Presentation layers decide
    /// when to call this; the engine itself never formats player-facing
    /// text.
    fn send_message(&self, message: &str);
}
