//! Process-wide node kind registry.
//!
//! Language extensions register the kinds they own together with:
//! - an [`ExtensionAdapter`] that lets the core traversal engine walk into
//!   their nodes without compile-time knowledge of them
//! - an [`RpcCodec`] keyed by the extension's root kind, used to frame whole
//!   compilation unit exchanges
//!
//! Registration happens once at startup (see [`crate::install`]); traversals
//! and RPC exchanges only read. Re-registering a kind overwrites the previous
//! entry.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::error::Result;
use crate::rpc::{RpcReceiveQueue, RpcSendQueue};
use crate::tree::{Kind, TreeRef};
use crate::visitor::{ChildVisitor, Cursor};

/// Walks the children of nodes in an extension namespace on behalf of a
/// visitor that only knows the core namespace.
#[async_trait]
pub trait ExtensionAdapter: Send + Sync {
    fn namespace(&self) -> &'static str;

    /// Visits every child of `tree` through `visitor` and returns the rebuilt
    /// node, or `tree` itself when no child changed. `cursor` points at `tree`.
    async fn visit_children(&self, tree: &TreeRef, visitor: &mut dyn ChildVisitor, cursor: &Cursor)
    -> Result<TreeRef>;
}

/// Sender/receiver pair for one extension's trees.
#[async_trait]
pub trait RpcCodec: Send + Sync {
    /// Emits `after` diffed against `before`, opening op through `EndOfObject`.
    async fn send(&self, after: &TreeRef, before: Option<&TreeRef>, q: &mut RpcSendQueue) -> Result<()>;

    /// Decodes one tree from `q`, patching `before` when the peer sends a change.
    async fn receive(&self, before: Option<&TreeRef>, q: &mut RpcReceiveQueue) -> Result<TreeRef>;
}

struct CodecEntry {
    root_kind: Kind,
    codec: Arc<dyn RpcCodec>,
}

static ADAPTERS: Lazy<DashMap<Kind, Arc<dyn ExtensionAdapter>>> = Lazy::new(DashMap::new);

/// Wire name to kind, for every kind known to this process.
static KIND_NAMES: Lazy<DashMap<&'static str, Kind>> = Lazy::new(DashMap::new);

static CODECS: Lazy<RwLock<Vec<CodecEntry>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Codec index by kind, pointing into `CODECS`.
static CODEC_BY_KIND: Lazy<DashMap<Kind, usize>> = Lazy::new(DashMap::new);

/// Registers `adapter` for every kind in `kinds`.
pub fn register_extension_kinds(kinds: &[Kind], adapter: Arc<dyn ExtensionAdapter>) {
    trace!("Registering extension adapter for namespace {}", adapter.namespace());
    for &kind in kinds {
        if ADAPTERS.insert(kind, Arc::clone(&adapter)).is_some() {
            trace!("Replaced adapter for kind {}", kind);
        }
        KIND_NAMES.insert(kind.as_str(), kind);
    }
    debug!(
        "Registered {} kinds for namespace {} (total adapters: {})",
        kinds.len(),
        adapter.namespace(),
        ADAPTERS.len()
    );
}

/// Makes core kinds resolvable by wire name. They need no adapter.
pub fn register_core_kinds(kinds: &[Kind]) {
    for &kind in kinds {
        KIND_NAMES.insert(kind.as_str(), kind);
    }
    debug!("Registered {} core kinds", kinds.len());
}

/// Associates `codec` with `root_kind` and with every kind in `kinds`.
pub fn register_codecs(root_kind: Kind, codec: Arc<dyn RpcCodec>, kinds: &[Kind]) {
    let mut codecs = CODECS.write();
    let index = match codecs.iter().position(|entry| entry.root_kind == root_kind) {
        Some(index) => {
            trace!("Replacing codec for root kind {}", root_kind);
            codecs[index].codec = codec;
            index
        }
        None => {
            codecs.push(CodecEntry { root_kind, codec });
            codecs.len() - 1
        }
    };
    CODEC_BY_KIND.insert(root_kind, index);
    for &kind in kinds {
        CODEC_BY_KIND.insert(kind, index);
    }
    debug!("Registered codec for root kind {} covering {} kinds", root_kind, kinds.len() + 1);
}

pub fn adapter_for(kind: Kind) -> Option<Arc<dyn ExtensionAdapter>> {
    ADAPTERS.get(&kind).map(|entry| Arc::clone(entry.value()))
}

pub fn codec_for(kind: Kind) -> Option<Arc<dyn RpcCodec>> {
    let index = *CODEC_BY_KIND.get(&kind)?.value();
    CODECS.read().get(index).map(|entry| Arc::clone(&entry.codec))
}

/// Looks up a kind by the name it travels under on the wire.
pub fn resolve_kind(name: &str) -> Option<Kind> {
    KIND_NAMES.get(name).map(|entry| *entry.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::kind;

    struct NamedAdapter(&'static str);

    #[async_trait]
    impl ExtensionAdapter for NamedAdapter {
        fn namespace(&self) -> &'static str {
            self.0
        }

        async fn visit_children(
            &self,
            tree: &TreeRef,
            _visitor: &mut dyn ChildVisitor,
            _cursor: &Cursor,
        ) -> Result<TreeRef> {
            Ok(tree.clone())
        }
    }

    const TEST_KIND: Kind = Kind::new("org.example.tree.X$Thing");

    #[test]
    fn test_later_registration_overwrites() {
        register_extension_kinds(&[TEST_KIND], Arc::new(NamedAdapter("first")));
        register_extension_kinds(&[TEST_KIND], Arc::new(NamedAdapter("second")));
        assert_eq!(adapter_for(TEST_KIND).map(|a| a.namespace()), Some("second"));
        assert_eq!(resolve_kind(TEST_KIND.as_str()), Some(TEST_KIND));
    }

    #[test]
    fn test_unregistered_lookups_are_none() {
        let missing = Kind::new("org.example.tree.X$Missing");
        assert!(adapter_for(missing).is_none());
        assert!(codec_for(missing).is_none());
        assert!(resolve_kind(missing.as_str()).is_none());
    }

    #[test]
    fn test_install_registers_core_and_extension_kinds() {
        crate::install();
        crate::install();
        assert!(adapter_for(kind::js::IMPORT).is_some());
        assert!(adapter_for(kind::j::BINARY).is_none());
        assert_eq!(resolve_kind(kind::j::BINARY.as_str()), Some(kind::j::BINARY));
        assert!(codec_for(kind::js::COMPILATION_UNIT).is_some());
        assert!(codec_for(kind::j::LITERAL).is_some());
    }
}
