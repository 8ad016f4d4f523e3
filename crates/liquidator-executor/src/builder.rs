//! Liquidation message construction.
//!
//! Without a granter the bot liquidates from its own subaccount and signs
//! directly. With a granter the order is placed from the granter's
//! subaccount, the liquidation message is packed into an `Any`, and the bot
//! executes it as grantee through `MsgExec`.

use crate::chain::ChainClient;
use crate::error::{ExecutorError, ExecutorResult};
use crate::sizer::{size_order, OrderSizingPolicy};
use liquidator_core::{
    AccountAddress, Any, ClientOrderId, DerivativeOrderData, MarketMetadata, MsgExec,
    MsgLiquidatePosition, OrderType, OutboundMessage, PositionSnapshot, SubaccountId,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Account the liquidation order is placed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountContext {
    pub address: AccountAddress,
    pub subaccount_id: SubaccountId,
}

impl AccountContext {
    pub fn new(address: AccountAddress, subaccount_index: u32) -> Self {
        let subaccount_id = address.subaccount(subaccount_index);
        Self {
            address,
            subaccount_id,
        }
    }
}

/// Who signs and whose funds back the liquidation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationContext {
    pub self_account: AccountContext,
    pub granter: Option<AccountContext>,
}

impl DelegationContext {
    pub fn direct(self_account: AccountContext) -> Self {
        Self {
            self_account,
            granter: None,
        }
    }

    pub fn delegated(self_account: AccountContext, granter: AccountContext) -> Self {
        Self {
            self_account,
            granter: Some(granter),
        }
    }

    pub fn is_delegated(&self) -> bool {
        self.granter.is_some()
    }

    /// Account whose address and subaccount appear in the order.
    pub fn order_account(&self) -> &AccountContext {
        self.granter.as_ref().unwrap_or(&self.self_account)
    }
}

/// Build the message liquidating `position` in `market`.
pub fn build_liquidation_message(
    chain: &dyn ChainClient,
    position: &PositionSnapshot,
    market: &MarketMetadata,
    policy: &OrderSizingPolicy,
    delegation: &DelegationContext,
) -> ExecutorResult<OutboundMessage> {
    let account = delegation.order_account();
    let liquidation = build_liquidate_position(chain, position, market, policy, account)?;

    if !delegation.is_delegated() {
        return Ok(OutboundMessage::LiquidatePosition(liquidation));
    }

    Ok(OutboundMessage::AuthzExec(MsgExec {
        grantee: delegation.self_account.address.to_string(),
        msgs: vec![Any::pack(&liquidation)?],
    }))
}

fn build_liquidate_position(
    chain: &dyn ChainClient,
    position: &PositionSnapshot,
    market: &MarketMetadata,
    policy: &OrderSizingPolicy,
    account: &AccountContext,
) -> ExecutorResult<MsgLiquidatePosition> {
    let quantity = size_order(position, policy, market)?;
    let mark_price = position.parsed_mark_price()?;
    let sender = account.address.to_string();

    let data = DerivativeOrderData {
        market_id: market.id.clone(),
        order_type: OrderType::for_liquidation(position.direction),
        quantity: market.quantity_from_chain_format(quantity),
        price: market.price_from_chain_format(mark_price)?,
        leverage: Decimal::ONE,
        fee_recipient: sender.clone(),
        cid: ClientOrderId::new(),
        is_reduce_only: false,
    };
    let order = chain.create_derivative_order(&account.subaccount_id, &data, market)?;

    debug!(
        market_id = %position.market_id,
        subaccount_id = %position.subaccount_id,
        order_type = %data.order_type,
        quantity = %order.order_info.quantity,
        price = %order.order_info.price,
        cid = %data.cid,
        "Built liquidation order"
    );

    Ok(MsgLiquidatePosition {
        sender,
        subaccount_id: position.subaccount_id.clone(),
        market_id: position.market_id.clone(),
        order: Some(order),
    })
}

/// Message builder bound to one chain client, policy and delegation.
pub struct MessageBuilder {
    chain: Arc<dyn ChainClient>,
    policy: OrderSizingPolicy,
    delegation: DelegationContext,
}

impl MessageBuilder {
    /// The chain client must sign as the delegation's own account.
    pub fn new(
        chain: Arc<dyn ChainClient>,
        policy: OrderSizingPolicy,
        delegation: DelegationContext,
    ) -> ExecutorResult<Self> {
        let configured = delegation.self_account.address.as_str();
        if chain.self_address() != configured {
            return Err(ExecutorError::SignerMismatch {
                chain: chain.self_address().to_string(),
                configured: configured.to_string(),
            });
        }
        Ok(Self {
            chain,
            policy,
            delegation,
        })
    }

    pub fn build(
        &self,
        position: &PositionSnapshot,
        market: &MarketMetadata,
    ) -> ExecutorResult<OutboundMessage> {
        build_liquidation_message(
            self.chain.as_ref(),
            position,
            market,
            &self.policy,
            &self.delegation,
        )
    }

    pub fn policy(&self) -> &OrderSizingPolicy {
        &self.policy
    }

    pub fn delegation(&self) -> &DelegationContext {
        &self.delegation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainClient;
    use crate::error::SizingError;
    use crate::test_support::{
        btc_usdt_perp, direct_delegation, granted_delegation, position, GRANTER_ADDRESS,
        GRANTER_SUBACCOUNT_3, SELF_ADDRESS, SELF_SUBACCOUNT_1,
    };
    use liquidator_core::{CoreError, MSG_LIQUIDATE_POSITION_TYPE_URL};
    use rust_decimal_macros::dec;

    fn build(
        position: &PositionSnapshot,
        policy: &OrderSizingPolicy,
        delegation: &DelegationContext,
    ) -> ExecutorResult<OutboundMessage> {
        let chain = MockChainClient::new(SELF_ADDRESS);
        build_liquidation_message(&chain, position, &btc_usdt_perp(), policy, delegation)
    }

    #[test]
    fn test_direct_message_for_long_position() {
        let pos = position("long", "1", "3400000000");
        let msg = build(&pos, &OrderSizingPolicy::unbounded(), &direct_delegation()).unwrap();

        let OutboundMessage::LiquidatePosition(liquidation) = msg else {
            panic!("expected direct message");
        };
        assert_eq!(liquidation.sender, SELF_ADDRESS);
        assert_eq!(liquidation.subaccount_id, pos.subaccount_id);
        assert_eq!(liquidation.market_id, pos.market_id);

        let order = liquidation.order.unwrap();
        assert_eq!(order.order_type, OrderType::Buy);
        assert_eq!(order.order_info.quantity, dec!(1));
        assert_eq!(order.order_info.price, dec!(3400000000));
        assert_eq!(order.margin, dec!(1) * dec!(3400000000));
        assert_eq!(order.order_info.subaccount_id.as_str(), SELF_SUBACCOUNT_1);
        assert_eq!(order.order_info.fee_recipient, SELF_ADDRESS);
    }

    #[test]
    fn test_short_position_uses_sell() {
        let pos = position("short", "1", "3400000000");
        let msg = build(&pos, &OrderSizingPolicy::unbounded(), &direct_delegation()).unwrap();
        let liquidation = msg.liquidation().unwrap();
        assert_eq!(liquidation.order.unwrap().order_type, OrderType::Sell);
    }

    #[test]
    fn test_delegated_message_wraps_granter_order() {
        let pos = position("long", "1", "3400000000");
        let msg = build(&pos, &OrderSizingPolicy::unbounded(), &granted_delegation()).unwrap();

        let OutboundMessage::AuthzExec(exec) = &msg else {
            panic!("expected authz wrapper");
        };
        assert_eq!(exec.grantee, SELF_ADDRESS);
        assert_eq!(exec.msgs.len(), 1);
        assert_eq!(exec.msgs[0].type_url, MSG_LIQUIDATE_POSITION_TYPE_URL);

        let inner = msg.liquidation().unwrap();
        assert_eq!(inner.sender, GRANTER_ADDRESS);
        assert_eq!(inner.subaccount_id, pos.subaccount_id);
        assert_eq!(inner.market_id, pos.market_id);

        let order = inner.order.unwrap();
        assert_eq!(order.order_info.subaccount_id.as_str(), GRANTER_SUBACCOUNT_3);
        assert_eq!(order.order_info.fee_recipient, GRANTER_ADDRESS);
        assert_eq!(order.order_info.quantity, dec!(1));
        assert_eq!(order.margin, dec!(3400000000));
    }

    #[test]
    fn test_client_ids_differ_for_identical_positions() {
        let pos = position("long", "1", "3400000000");
        let policy = OrderSizingPolicy::unbounded();
        let first = build(&pos, &policy, &direct_delegation()).unwrap();
        let second = build(&pos, &policy, &direct_delegation()).unwrap();

        let first_cid = first.liquidation().unwrap().order.unwrap().order_info.cid;
        let second_cid = second.liquidation().unwrap().order.unwrap().order_info.cid;
        assert_ne!(first_cid, second_cid);
    }

    #[test]
    fn test_capped_quantity_reaches_order() {
        let pos = position("long", "100", "100");
        let policy = OrderSizingPolicy::new(OrderSizingPolicy::UNBOUNDED, dec!(500));
        let msg = build(&pos, &policy, &direct_delegation()).unwrap();
        let order = msg.liquidation().unwrap().order.unwrap();
        assert!(order.order_info.quantity <= dec!(5));
    }

    #[test]
    fn test_sizing_failure_propagates() {
        let pos = position("long", "1", "0");
        let err = build(&pos, &OrderSizingPolicy::unbounded(), &direct_delegation()).unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Sizing(SizingError::NonPositiveMarkPrice(_))
        ));
    }

    #[test]
    fn test_oversized_margin_is_an_error_not_a_panic() {
        // 1e20 * 3400 * 10^6 does not fit in a decimal.
        let pos = position("long", "100000000000000000000", "3400000000");
        let err = build(&pos, &OrderSizingPolicy::unbounded(), &direct_delegation()).unwrap_err();
        assert!(matches!(err, ExecutorError::Message(CoreError::Overflow(_))));

        // 10M quote units on an 18-decimal quote token.
        let market = MarketMetadata {
            quote_decimals: 18,
            ..btc_usdt_perp()
        };
        let pos = position("long", "10000", "1000000000000000000000");
        let chain = MockChainClient::new(SELF_ADDRESS);
        let result = build_liquidation_message(
            &chain,
            &pos,
            &market,
            &OrderSizingPolicy::unbounded(),
            &direct_delegation(),
        );
        assert!(matches!(
            result,
            Err(ExecutorError::Message(CoreError::Overflow(_)))
        ));
    }

    #[test]
    fn test_message_builder_rejects_signer_mismatch() {
        let chain = Arc::new(MockChainClient::new(GRANTER_ADDRESS));
        let result = MessageBuilder::new(
            chain,
            OrderSizingPolicy::unbounded(),
            direct_delegation(),
        );
        assert!(matches!(result, Err(ExecutorError::SignerMismatch { .. })));
    }

    #[test]
    fn test_message_builder_builds() {
        let chain = Arc::new(MockChainClient::new(SELF_ADDRESS));
        let builder =
            MessageBuilder::new(chain, OrderSizingPolicy::unbounded(), granted_delegation())
                .unwrap();
        let msg = builder
            .build(&position("long", "1", "3400000000"), &btc_usdt_perp())
            .unwrap();
        assert_eq!(msg.signer(), SELF_ADDRESS);
        assert!(builder.delegation().is_delegated());
    }
}
