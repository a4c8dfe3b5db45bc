//! Ports implemented by outer layers

mod storage;

pub use storage::{read_json, write_json, SessionStorage};
