pub mod tcp;

pub use tcp::{accept_loop, bind_listener};
