//! Outbound chain messages.
//!
//! A liquidation is either sent directly as [`MsgLiquidatePosition`] or,
//! when acting for a granter, packed into an [`Any`] and executed by the
//! grantee through [`MsgExec`].

use crate::error::{CoreError, Result};
use crate::order::DerivativeOrder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const MSG_LIQUIDATE_POSITION_TYPE_URL: &str = "/injective.exchange.v1beta1.MsgLiquidatePosition";
pub const MSG_EXEC_TYPE_URL: &str = "/cosmos.authz.v1beta1.MsgExec";

/// A message with a stable type URL.
pub trait TypedMessage: Serialize + DeserializeOwned {
    const TYPE_URL: &'static str;
}

/// Type-tagged serialized message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Any {
    pub type_url: String,
    pub value: Vec<u8>,
}

impl Any {
    /// Serialize `msg` and tag it with its type URL.
    pub fn pack<M: TypedMessage>(msg: &M) -> Result<Self> {
        Ok(Self {
            type_url: M::TYPE_URL.to_string(),
            value: serde_json::to_vec(msg)?,
        })
    }

    /// Decode the payload, checking the type URL first.
    pub fn unpack<M: TypedMessage>(&self) -> Result<M> {
        if self.type_url != M::TYPE_URL {
            return Err(CoreError::UnexpectedTypeUrl {
                expected: M::TYPE_URL.to_string(),
                actual: self.type_url.clone(),
            });
        }
        Ok(serde_json::from_slice(&self.value)?)
    }
}

/// Liquidate `subaccount_id`'s position in `market_id` with `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgLiquidatePosition {
    pub sender: String,
    pub subaccount_id: String,
    pub market_id: String,
    pub order: Option<DerivativeOrder>,
}

impl TypedMessage for MsgLiquidatePosition {
    const TYPE_URL: &'static str = MSG_LIQUIDATE_POSITION_TYPE_URL;
}

/// Execute pre-authorized messages on behalf of their granter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgExec {
    pub grantee: String,
    pub msgs: Vec<Any>,
}

impl TypedMessage for MsgExec {
    const TYPE_URL: &'static str = MSG_EXEC_TYPE_URL;
}

/// Message handed to the chain client for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum OutboundMessage {
    #[serde(rename = "/injective.exchange.v1beta1.MsgLiquidatePosition")]
    LiquidatePosition(MsgLiquidatePosition),
    #[serde(rename = "/cosmos.authz.v1beta1.MsgExec")]
    AuthzExec(MsgExec),
}

impl OutboundMessage {
    pub fn type_url(&self) -> &'static str {
        match self {
            Self::LiquidatePosition(_) => MsgLiquidatePosition::TYPE_URL,
            Self::AuthzExec(_) => MsgExec::TYPE_URL,
        }
    }

    /// Address that signs the transaction carrying this message.
    pub fn signer(&self) -> &str {
        match self {
            Self::LiquidatePosition(msg) => &msg.sender,
            Self::AuthzExec(msg) => &msg.grantee,
        }
    }

    /// The liquidation carried by this message, unpacking an authz wrapper.
    pub fn liquidation(&self) -> Result<MsgLiquidatePosition> {
        match self {
            Self::LiquidatePosition(msg) => Ok(msg.clone()),
            Self::AuthzExec(exec) => {
                let any = exec.msgs.first().ok_or_else(|| CoreError::UnexpectedTypeUrl {
                    expected: MsgLiquidatePosition::TYPE_URL.to_string(),
                    actual: "<empty MsgExec>".to_string(),
                })?;
                any.unpack()
            }
        }
    }
}
