//! Wire log for RPC op batches.
//!
//! Every batch is recorded as one JSON line at TRACE level on the
//! `lst_js::wire` target, tagged with its direction:
//!
//! ```text
//! >>> SEND 3 ops
//! [{"state":"ADD","valueType":"org.openrewrite.javascript.tree.JS$CompilationUnit"},...]
//! ```
//!
//! Enable it with `LstConfig::wire_log` and a filter such as
//! `RUST_LOG=lst_js::wire=trace`.

use tracing::{trace, warn};

use super::RpcObjectData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
}

impl Direction {
    fn arrow(&self) -> &'static str {
        match self {
            Direction::Send => ">>> SEND",
            Direction::Receive => "<<< RECEIVE",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WireLog {
    enabled: bool,
}

impl WireLog {
    pub fn new(enabled: bool) -> Self {
        WireLog { enabled }
    }

    pub fn log_batch(&self, direction: Direction, batch: &[RpcObjectData]) {
        if !self.enabled || batch.is_empty() {
            return;
        }
        match serde_json::to_string(batch) {
            Ok(json) => trace!(target: "lst_js::wire", "{} {} ops\n{}", direction.arrow(), batch.len(), json),
            Err(e) => warn!(target: "lst_js::wire", "Failed to serialize {} batch: {}", direction.arrow(), e),
        }
    }
}
