use async_trait::async_trait;

use crate::error::{LstError, Result};
use crate::registry::RpcCodec;
use crate::tree::TreeRef;
use crate::visitor::Cursor;

use super::receiver::JsReceiver;
use super::sender::JsSender;
use super::{RpcReceiveQueue, RpcSendQueue};

/// Wire codec for JavaScript compilation units and every node they contain.
#[derive(Debug, Default)]
pub struct JsCodec;

#[async_trait]
impl RpcCodec for JsCodec {
    async fn send(&self, after: &TreeRef, before: Option<&TreeRef>, q: &mut RpcSendQueue) -> Result<()> {
        let mut sender = JsSender;
        sender.send_tree(q, before, Some(after), &Cursor::root()).await
    }

    async fn receive(&self, before: Option<&TreeRef>, q: &mut RpcReceiveQueue) -> Result<TreeRef> {
        let mut receiver = JsReceiver::new();
        receiver.receive_tree(q, before, "root").await?.ok_or_else(|| LstError::missing("root"))
    }
}
