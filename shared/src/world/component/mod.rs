pub mod error;
pub mod field_channel;
pub mod list_channel;
pub mod net_component;
pub mod synced_field;
pub mod synced_state;
