//! Audio delivery primitives.

pub mod relay;

pub use relay::{spawn_relay, RelayHandle, RelayStream};
