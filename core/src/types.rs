//! Shared primitive types used across the engine.

/// One simulation step. Turns only advance in response to player actions.
pub type Turn = u32;

/// An opaque participant identifier supplied by the host (e.g. a chat user id).
pub type UserId = String;

/// The host's key for one game instance (e.g. a chat channel id).
pub type ChannelId = String;

/// Leak identifier, unique and strictly increasing within one game.
pub type LeakId = u32;

/// Lower bound of every resource pool.
pub const RESOURCE_MIN: i32 = 0;

/// Upper bound of every resource pool.
pub const RESOURCE_MAX: i32 = 100;

/// Clamp a resource value into [RESOURCE_MIN, RESOURCE_MAX].
pub fn clamp_resource(value: i32) -> i32 {
    value.clamp(RESOURCE_MIN, RESOURCE_MAX)
}
