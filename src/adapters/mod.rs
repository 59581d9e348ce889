//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                    |
//! |------------|---------------|--------------------------------|
//! | `hardware` | InputPort     | embedded-hal input pins        |
//! |            | DrivePort     | embedded-hal PWM channels      |
//! |            | TimebasePort  | esp_timer periodic tick        |
//! | `log_sink` | EventSink     | Serial log output              |

pub mod hardware;
pub mod log_sink;
