//! The prediction market contract as seen by the page.
//!
//! `MarketContract` is the port the controller talks to; `ChainContract`
//! implements it over any JSON-RPC [`Transport`].

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::abi;
use super::transport::{RpcError, Transport};
use super::types::{Market, PendingTx, Receipt, UserPosition};
use crate::clock;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("abi decode failed: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("transaction {0} reverted")]
    Reverted(B256),
}

/// Reads and writes against the deployed contract. Every write returns a
/// [`PendingTx`] that must go through [`MarketContract::confirm`] before
/// dependent reads are trusted.
#[allow(async_fn_in_trait)]
pub trait MarketContract {
    fn address(&self) -> Address;

    async fn market_count(&self) -> Result<u64, ContractError>;
    async fn market(&self, market_id: u64) -> Result<Market, ContractError>;
    async fn user_position(&self, market_id: u64, user: Address) -> Result<UserPosition, ContractError>;
    async fn potential_winnings(
        &self,
        market_id: u64,
        user: Address,
        predict_yes: bool,
    ) -> Result<U256, ContractError>;
    async fn owner(&self) -> Result<Address, ContractError>;
    async fn collected_fees(&self) -> Result<U256, ContractError>;

    async fn create_market(&self, question: &str, duration_minutes: u64) -> Result<PendingTx, ContractError>;
    async fn place_bet(&self, market_id: u64, predict_yes: bool, value: U256) -> Result<PendingTx, ContractError>;
    async fn claim_winnings(&self, market_id: u64) -> Result<PendingTx, ContractError>;
    async fn resolve_market(&self, market_id: u64, outcome: bool) -> Result<PendingTx, ContractError>;
    async fn withdraw_fees(&self) -> Result<PendingTx, ContractError>;

    /// Suspend until the transaction is mined. No timeout.
    async fn confirm(&self, tx: &PendingTx) -> Result<Receipt, ContractError>;
}

#[derive(Debug, Clone)]
pub struct ChainContract<T> {
    address: Address,
    /// Account that signs writes and is used as `from` on reads.
    from: Address,
    reads: T,
    writes: T,
    receipt_poll: Duration,
}

impl<T: Transport> ChainContract<T> {
    pub fn new(address: Address, from: Address, reads: T, writes: T, receipt_poll: Duration) -> Self {
        Self {
            address,
            from,
            reads,
            writes,
            receipt_poll,
        }
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<C::Return, ContractError> {
        let params = json!([{
            "from": self.from,
            "to": self.address,
            "data": Bytes::from(call.abi_encode()),
        }, "latest"]);
        let raw = self.reads.request("eth_call", params).await?;
        let data: Bytes = serde_json::from_value(raw)?;
        Ok(C::abi_decode_returns(&data)?)
    }

    async fn send<C: SolCall>(&self, call: C, value: U256) -> Result<PendingTx, ContractError> {
        let mut tx = json!({
            "from": self.from,
            "to": self.address,
            "data": Bytes::from(call.abi_encode()),
        });
        if !value.is_zero() {
            tx["value"] = json!(value);
        }
        let raw = self.writes.request("eth_sendTransaction", json!([tx])).await?;
        let hash: B256 = serde_json::from_value(raw)?;
        debug!(tx = %hash, function = C::SIGNATURE, "transaction submitted");
        Ok(PendingTx { hash })
    }
}

impl<T: Transport> MarketContract for ChainContract<T> {
    fn address(&self) -> Address {
        self.address
    }

    async fn market_count(&self) -> Result<u64, ContractError> {
        let count = self.call(abi::marketCountCall {}).await?;
        Ok(count.saturating_to())
    }

    async fn market(&self, market_id: u64) -> Result<Market, ContractError> {
        let ret = self
            .call(abi::getMarketCall { marketId: U256::from(market_id) })
            .await?;
        Ok(Market {
            id: market_id,
            question: ret.question,
            end_time: ret.endTime.saturating_to(),
            resolved: ret.resolved,
            outcome: ret.outcome,
            yes_stake: ret.yesStake,
            no_stake: ret.noStake,
            active: ret.active,
        })
    }

    async fn user_position(&self, market_id: u64, user: Address) -> Result<UserPosition, ContractError> {
        let ret = self
            .call(abi::getUserPositionCall { marketId: U256::from(market_id), user })
            .await?;
        Ok(UserPosition {
            yes_stake: ret.yesStake,
            no_stake: ret.noStake,
            claimed: ret.claimed,
        })
    }

    async fn potential_winnings(
        &self,
        market_id: u64,
        user: Address,
        predict_yes: bool,
    ) -> Result<U256, ContractError> {
        self.call(abi::calculatePotentialWinningsCall {
            marketId: U256::from(market_id),
            user,
            predictYes: predict_yes,
        })
        .await
    }

    async fn owner(&self) -> Result<Address, ContractError> {
        self.call(abi::ownerCall {}).await
    }

    async fn collected_fees(&self) -> Result<U256, ContractError> {
        self.call(abi::collectedFeesCall {}).await
    }

    async fn create_market(&self, question: &str, duration_minutes: u64) -> Result<PendingTx, ContractError> {
        let call = abi::createMarketCall {
            question: question.to_string(),
            durationMinutes: U256::from(duration_minutes),
        };
        self.send(call, U256::ZERO).await
    }

    async fn place_bet(&self, market_id: u64, predict_yes: bool, value: U256) -> Result<PendingTx, ContractError> {
        let call = abi::placeBetCall {
            marketId: U256::from(market_id),
            predictYes: predict_yes,
        };
        self.send(call, value).await
    }

    async fn claim_winnings(&self, market_id: u64) -> Result<PendingTx, ContractError> {
        self.send(abi::claimWinningsCall { marketId: U256::from(market_id) }, U256::ZERO)
            .await
    }

    async fn resolve_market(&self, market_id: u64, outcome: bool) -> Result<PendingTx, ContractError> {
        let call = abi::resolveMarketCall {
            marketId: U256::from(market_id),
            outcome,
        };
        self.send(call, U256::ZERO).await
    }

    async fn withdraw_fees(&self) -> Result<PendingTx, ContractError> {
        self.send(abi::withdrawFeesCall {}, U256::ZERO).await
    }

    async fn confirm(&self, tx: &PendingTx) -> Result<Receipt, ContractError> {
        let mut polls = 0u32;
        loop {
            let raw = self
                .writes
                .request("eth_getTransactionReceipt", json!([tx.hash]))
                .await?;
            if raw != Value::Null {
                let receipt: Receipt = serde_json::from_value(raw)?;
                debug!(tx = %tx.hash, polls, "transaction mined");
                if !receipt.succeeded() {
                    return Err(ContractError::Reverted(tx.hash));
                }
                return Ok(receipt);
            }
            polls += 1;
            clock::sleep(self.receipt_poll).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use alloy_sol_types::SolValue;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Handler = dyn Fn(&str, &Value) -> Result<Value, RpcError>;

    /// Answers each request through a closure and records what was asked.
    #[derive(Clone)]
    struct ScriptedTransport {
        handler: Rc<Handler>,
        calls: Rc<RefCell<Vec<(String, Value)>>>,
    }

    impl ScriptedTransport {
        fn new(handler: impl Fn(&str, &Value) -> Result<Value, RpcError> + 'static) -> Self {
            Self {
                handler: Rc::new(handler),
                calls: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.borrow().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
            self.calls.borrow_mut().push((method.to_string(), params.clone()));
            (self.handler)(method, &params)
        }
    }

    const CONTRACT: Address = address!("3353e8557e63bd506d54adda7dab122abc5a5b67");
    const USER: Address = address!("00000000000000000000000000000000000000aa");

    fn contract(transport: ScriptedTransport) -> ChainContract<ScriptedTransport> {
        ChainContract::new(CONTRACT, USER, transport.clone(), transport, Duration::ZERO)
    }

    fn hex(bytes: Vec<u8>) -> Value {
        json!(Bytes::from(bytes))
    }

    fn calldata(params: &Value) -> Bytes {
        serde_json::from_value(params[0]["data"].clone()).unwrap()
    }

    #[test]
    fn test_get_market_decodes_tuple() {
        let transport = ScriptedTransport::new(|_, params| {
            let data = calldata(params);
            assert_eq!(&data[..4], &abi::getMarketCall::SELECTOR[..]);
            let ret = (
                "Will FLR close above $0.05?".to_string(),
                U256::from(1_700_000_000u64),
                false,
                false,
                U256::from(3_000_000_000_000_000_000u64),
                U256::from(1_000_000_000_000_000_000u64),
                true,
            );
            Ok(hex(ret.abi_encode_params()))
        });
        let market = block_on(contract(transport.clone()).market(4)).unwrap();

        assert_eq!(market.id, 4);
        assert_eq!(market.question, "Will FLR close above $0.05?");
        assert_eq!(market.end_time, 1_700_000_000);
        assert!(market.active);
        assert_eq!(market.pool(), U256::from(4_000_000_000_000_000_000u64));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "eth_call");
        assert_eq!(calls[0].1[1], json!("latest"));
    }

    #[test]
    fn test_market_count_and_owner() {
        let transport = ScriptedTransport::new(|_, params| {
            let data = calldata(params);
            if data[..4] == abi::marketCountCall::SELECTOR[..] {
                Ok(hex(U256::from(2u8).abi_encode()))
            } else {
                Ok(hex(USER.abi_encode()))
            }
        });
        let contract = contract(transport);
        assert_eq!(block_on(contract.market_count()).unwrap(), 2);
        assert_eq!(block_on(contract.owner()).unwrap(), USER);
    }

    #[test]
    fn test_place_bet_sends_value() {
        let tx_hash = B256::repeat_byte(0x11);
        let transport = ScriptedTransport::new(move |method, _| {
            assert_eq!(method, "eth_sendTransaction");
            Ok(json!(tx_hash))
        });
        let value = U256::from(100_000_000_000_000_000u64);
        let pending = block_on(contract(transport.clone()).place_bet(1, true, value)).unwrap();
        assert_eq!(pending.hash, tx_hash);

        let calls = transport.calls();
        let tx = &calls[0].1[0];
        assert_eq!(serde_json::from_value::<U256>(tx["value"].clone()).unwrap(), value);
        assert_eq!(serde_json::from_value::<Address>(tx["to"].clone()).unwrap(), CONTRACT);
        let data: Bytes = serde_json::from_value(tx["data"].clone()).unwrap();
        assert_eq!(&data[..4], &abi::placeBetCall::SELECTOR[..]);
    }

    #[test]
    fn test_zero_value_write_omits_value() {
        let transport = ScriptedTransport::new(|_, _| Ok(json!(B256::repeat_byte(0x22))));
        block_on(contract(transport.clone()).withdraw_fees()).unwrap();
        assert!(transport.calls()[0].1[0].get("value").is_none());
    }

    #[test]
    fn test_confirm_polls_until_mined() {
        let polls = Rc::new(RefCell::new(0u32));
        let seen = polls.clone();
        let transport = ScriptedTransport::new(move |method, _| {
            assert_eq!(method, "eth_getTransactionReceipt");
            *seen.borrow_mut() += 1;
            if *seen.borrow() < 3 {
                return Ok(Value::Null);
            }
            Ok(json!({
                "transactionHash": B256::repeat_byte(0x33),
                "status": "0x1",
                "logs": []
            }))
        });
        let pending = PendingTx { hash: B256::repeat_byte(0x33) };
        let receipt = block_on(contract(transport).confirm(&pending)).unwrap();
        assert!(receipt.succeeded());
        assert_eq!(*polls.borrow(), 3);
    }

    #[test]
    fn test_confirm_reports_revert() {
        let transport = ScriptedTransport::new(|_, _| {
            Ok(json!({
                "transactionHash": B256::repeat_byte(0x44),
                "status": "0x0",
                "logs": []
            }))
        });
        let pending = PendingTx { hash: B256::repeat_byte(0x44) };
        let err = block_on(contract(transport).confirm(&pending)).unwrap_err();
        assert!(matches!(err, ContractError::Reverted(hash) if hash == pending.hash));
    }

    #[test]
    fn test_rejected_write_surfaces_rpc_error() {
        let transport = ScriptedTransport::new(|_, _| Err(RpcError::from_code(4001, "User denied")));
        let err = block_on(contract(transport).claim_winnings(0)).unwrap_err();
        assert!(matches!(err, ContractError::Rpc(RpcError::Rejected)));
    }
}
