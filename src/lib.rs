//! Bridge between IP cameras pushing "alarm server" notifications over TCP
//! and a Shinobi video-management backend.

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod net;
pub mod protocol;
pub mod telemetry;
pub mod types;

pub use dispatch::{DispatchOutcome, EventDispatcher, MotionTrigger};
pub use protocol::AlarmEvent;
