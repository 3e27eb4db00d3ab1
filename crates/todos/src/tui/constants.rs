//! Shared constants for the TUI to keep layout and timing in sync.

/// Interval in milliseconds between UI ticks/redraws.
pub const TUI_TICK_RATE_MS: u64 = 200;
/// Time-to-live in seconds for transient status messages.
pub const UI_MESSAGE_TTL_SECS: u64 = 5;
/// Capacity of the channel carrying completion events back to the UI.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
/// Highlight symbol shown beside the selected item.
pub const ITEM_LIST_HIGHLIGHT_SYMBOL: &str = "▶ ";
/// Placeholder of the new-item input.
pub const NEW_ITEM_PLACEHOLDER: &str = "What needs to be done?";
/// Placeholder of the inline rename editor.
pub const RENAME_PLACEHOLDER: &str = "Empty todo will be deleted";
/// Suffix of the row shown while a create is in flight.
pub const PENDING_ROW_SUFFIX: &str = "(adding…)";
/// Suffix of rows targeted by an in-flight mutation.
pub const LOADING_ROW_SUFFIX: &str = "…";
