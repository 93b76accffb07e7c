//! Transport Adapter - 语音传输实现

mod loopback;

pub use loopback::{LoopbackTransport, LoopbackTransportConfig};
