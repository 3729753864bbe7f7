#![recursion_limit = "1024"]
//! Lossless semantic trees for JavaScript and TypeScript.
//!
//! - [`tree`]: immutable, structurally shared nodes that keep every byte of
//!   formatting, in a core namespace ([`tree::J`]) and a JavaScript extension
//!   namespace ([`tree::Js`])
//! - [`visitor`]: the async traversal engine and rewrite protocol
//! - [`compare`]: structural equivalence ignoring formatting and identity
//! - [`rpc`]: the diff/patch protocol that keeps trees in sync across a
//!   process boundary
//!
//! Call [`install`] once before traversing extension nodes or exchanging
//! trees over RPC.

pub mod compare;
pub mod config;
pub mod error;
pub mod logging;
pub mod print;
pub mod registry;
pub mod rpc;
pub mod serde_helpers;
pub mod tree;
pub mod visitor;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

pub use compare::{compare, Comparator};
pub use config::{LstConfig, UnknownKindPolicy};
pub use error::{LstError, Result};
pub use print::{print, Printer};
pub use rpc::{receive, send, RpcObjectData, RpcReceiver, RpcSender, RpcState};
pub use tree::{NodeId, Tree, TreeRef};
pub use visitor::{Cursor, JsVisitor, StopToken, TreeVisitor};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Registers the core kinds, the JavaScript extension adapter and the
/// JavaScript RPC codec with the process-wide registry. Idempotent.
pub fn install() {
    INSTALLED.get_or_init(|| {
        registry::register_core_kinds(tree::kind::j::ALL);
        registry::register_extension_kinds(tree::kind::js::ALL, Arc::new(visitor::js::JsAdapter));
        let kinds: Vec<tree::Kind> = tree::kind::j::ALL.iter().chain(tree::kind::js::ALL).copied().collect();
        registry::register_codecs(tree::kind::js::COMPILATION_UNIT, Arc::new(rpc::JsCodec), &kinds);
        info!("Registered {} core and {} JavaScript kinds", tree::kind::j::ALL.len(), tree::kind::js::ALL.len());
    });
}
