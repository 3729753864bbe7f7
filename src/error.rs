//! Error taxonomy for traversal, comparison and RPC synchronization.
//!
//! Comparator mismatches are not errors; they are a `false` result. Everything
//! here is either a programming/version-skew problem (unknown kinds reaching the
//! traversal engine) or a protocol violation that aborts an RPC exchange.

use thiserror::Error;

use crate::rpc::RpcState;
use crate::tree::NodeId;

#[derive(Debug, Error)]
pub enum LstError {
    /// A node reached the traversal engine with a kind that no visitor method
    /// and no registered extension adapter handles.
    #[error("no visitor dispatch registered for kind `{kind}` (node {id})")]
    UnknownKind { kind: String, id: NodeId },

    /// A kind name arrived on the wire that is not registered locally.
    #[error("kind `{0}` is not registered with the kind registry")]
    UnregisteredKindName(String),

    /// The peer sent fewer ops than the schema of the node being decoded requires.
    #[error("RPC receive queue exhausted while decoding {context}")]
    QueueUnderrun { context: String },

    #[error("unexpected RPC op {state:?} while decoding {context}")]
    UnexpectedOp { state: RpcState, context: String },

    #[error("required field {context} was deleted or never sent")]
    MissingField { context: String },

    #[error("expected a `{expected}` node but found `{actual}`")]
    TypeMismatch { expected: String, actual: String },

    #[error("RPC type reference {0} was never defined")]
    UnknownReference(u32),

    #[error("malformed RPC value for {context}: {source}")]
    Codec {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("RPC channel closed before the exchange completed")]
    ChannelClosed,

    #[error("cannot print opaque node of foreign kind `{kind}`")]
    Unprintable { kind: String },

    #[error("cannot apply a change to opaque node of foreign kind `{kind}`")]
    OpaquePatch { kind: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LstError {
    pub(crate) fn codec(context: impl Into<String>, source: serde_json::Error) -> Self {
        LstError::Codec { context: context.into(), source }
    }

    pub(crate) fn underrun(context: impl Into<String>) -> Self {
        LstError::QueueUnderrun { context: context.into() }
    }

    pub(crate) fn missing(context: impl Into<String>) -> Self {
        LstError::MissingField { context: context.into() }
    }

    pub(crate) fn unexpected(state: RpcState, context: impl Into<String>) -> Self {
        LstError::UnexpectedOp { state, context: context.into() }
    }
}

pub type Result<T> = std::result::Result<T, LstError>;
