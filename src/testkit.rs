//! In-memory wallet, contract and page used by controller tests.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolEvent;
use futures::channel::oneshot;
use futures::stream;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use crate::app::Host;
use crate::chain::abi;
use crate::chain::types::LogEntry;
use crate::chain::{
    ContractError, Market, MarketContract, PendingTx, Receipt, RpcError, UserPosition, Wallet,
    WalletEvent,
};
use crate::config::{Config, Settings};
use crate::notify::Notice;
use crate::view::{AdminView, MarketsView, WalletView};

pub const CONTRACT: Address = alloy_primitives::address!("3353E8557e63bd506d54AdDa7daB122aBc5a5b67");
pub const NOW: u64 = 1_742_000_000;

pub fn ether(milli: u64) -> U256 {
    U256::from(milli) * U256::from(1_000_000_000_000_000u64)
}

pub fn settings() -> Settings {
    Config::from_toml(&format!("[contract]\naddress = \"{CONTRACT}\"\n"))
        .and_then(|config| config.settings())
        .unwrap()
}

pub fn market(id: u64, end_time: u64) -> Market {
    Market {
        id,
        question: format!("Question {id}?"),
        end_time,
        resolved: false,
        outcome: false,
        yes_stake: ether(3_000),
        no_stake: ether(1_000),
        active: true,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    CreateMarket { question: String, minutes: u64 },
    PlaceBet { market_id: u64, predict_yes: bool, value: U256 },
    Claim { market_id: u64 },
    Resolve { market_id: u64, outcome: bool },
    WithdrawFees,
}

#[derive(Debug, Default)]
pub struct MarketState {
    pub markets: Vec<Market>,
    pub positions: HashMap<(u64, Address), UserPosition>,
    /// Projected payout per (market, side).
    pub winnings: HashMap<(u64, bool), U256>,
    pub owner: Address,
    pub fees: U256,
    /// Amount reported by the `WinningsClaimed` event.
    pub payout: U256,

    pub fail_count: bool,
    pub fail_owner: bool,
    pub fail_markets: HashSet<u64>,
    pub fail_positions: HashSet<u64>,
    pub fail_projections: HashSet<(u64, bool)>,
    pub reject_writes: bool,
    pub revert_writes: bool,

    /// Account the wallet bound this contract to.
    pub signer: Address,
    pub writes: Vec<Write>,
    pending: HashMap<B256, Write>,
    pub confirmed: Vec<B256>,
}

fn remote() -> ContractError {
    ContractError::Rpc(RpcError::Remote { code: -32000, message: "execution reverted".to_string() })
}

/// Contract double. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeMarket {
    pub state: Rc<RefCell<MarketState>>,
}

impl FakeMarket {
    fn read<T>(&self, fail: bool, value: impl FnOnce(&MarketState) -> T) -> Result<T, ContractError> {
        let state = self.state.borrow();
        if fail {
            return Err(remote());
        }
        Ok(value(&state))
    }

    fn submit(&self, write: Write) -> Result<PendingTx, ContractError> {
        let mut state = self.state.borrow_mut();
        if state.reject_writes {
            return Err(ContractError::Rpc(RpcError::Rejected));
        }
        let hash = B256::with_last_byte(state.writes.len() as u8 + 1);
        state.writes.push(write.clone());
        state.pending.insert(hash, write);
        Ok(PendingTx { hash })
    }
}

fn topic(value: U256) -> B256 {
    B256::from(value.to_be_bytes::<32>())
}

fn flag(value: bool) -> U256 {
    U256::from(value as u8)
}

fn words(values: &[U256]) -> Bytes {
    values.iter().flat_map(|v| v.to_be_bytes::<32>()).collect::<Vec<u8>>().into()
}

impl MarketContract for FakeMarket {
    fn address(&self) -> Address {
        CONTRACT
    }

    async fn market_count(&self) -> Result<u64, ContractError> {
        let fail = self.state.borrow().fail_count;
        self.read(fail, |s| s.markets.len() as u64)
    }

    async fn market(&self, market_id: u64) -> Result<Market, ContractError> {
        let fail = self.state.borrow().fail_markets.contains(&market_id);
        self.read(fail, |s| s.markets[market_id as usize].clone())
    }

    async fn user_position(&self, market_id: u64, user: Address) -> Result<UserPosition, ContractError> {
        let fail = self.state.borrow().fail_positions.contains(&market_id);
        self.read(fail, |s| s.positions.get(&(market_id, user)).copied().unwrap_or_default())
    }

    async fn potential_winnings(
        &self,
        market_id: u64,
        _user: Address,
        predict_yes: bool,
    ) -> Result<U256, ContractError> {
        let fail = self.state.borrow().fail_projections.contains(&(market_id, predict_yes));
        self.read(fail, |s| s.winnings.get(&(market_id, predict_yes)).copied().unwrap_or_default())
    }

    async fn owner(&self) -> Result<Address, ContractError> {
        let fail = self.state.borrow().fail_owner;
        self.read(fail, |s| s.owner)
    }

    async fn collected_fees(&self) -> Result<U256, ContractError> {
        self.read(false, |s| s.fees)
    }

    async fn create_market(&self, question: &str, duration_minutes: u64) -> Result<PendingTx, ContractError> {
        self.submit(Write::CreateMarket { question: question.to_string(), minutes: duration_minutes })
    }

    async fn place_bet(&self, market_id: u64, predict_yes: bool, value: U256) -> Result<PendingTx, ContractError> {
        self.submit(Write::PlaceBet { market_id, predict_yes, value })
    }

    async fn claim_winnings(&self, market_id: u64) -> Result<PendingTx, ContractError> {
        self.submit(Write::Claim { market_id })
    }

    async fn resolve_market(&self, market_id: u64, outcome: bool) -> Result<PendingTx, ContractError> {
        self.submit(Write::Resolve { market_id, outcome })
    }

    async fn withdraw_fees(&self) -> Result<PendingTx, ContractError> {
        self.submit(Write::WithdrawFees)
    }

    async fn confirm(&self, tx: &PendingTx) -> Result<Receipt, ContractError> {
        let mut state = self.state.borrow_mut();
        let write = state.pending.remove(&tx.hash).ok_or_else(remote)?;
        if state.revert_writes {
            return Err(ContractError::Reverted(tx.hash));
        }
        state.confirmed.push(tx.hash);

        let mut logs = Vec::new();
        match write {
            Write::CreateMarket { question, minutes } => {
                let id = state.markets.len() as u64;
                state.markets.push(Market {
                    question,
                    ..market(id, NOW + minutes * 60)
                });
                logs.push(LogEntry {
                    address: CONTRACT,
                    topics: vec![abi::MarketCreated::SIGNATURE_HASH, topic(U256::from(id))],
                    data: Bytes::new(),
                });
            }
            Write::PlaceBet { market_id, predict_yes, value } => {
                logs.push(LogEntry {
                    address: CONTRACT,
                    topics: vec![
                        abi::BetPlaced::SIGNATURE_HASH,
                        topic(U256::from(market_id)),
                        state.signer.into_word(),
                    ],
                    data: words(&[flag(predict_yes), value]),
                });
            }
            Write::Resolve { market_id, outcome } => {
                logs.push(LogEntry {
                    address: CONTRACT,
                    topics: vec![abi::MarketResolved::SIGNATURE_HASH, topic(U256::from(market_id))],
                    data: words(&[flag(outcome)]),
                });
            }
            Write::Claim { market_id } => {
                logs.push(LogEntry {
                    address: CONTRACT,
                    topics: vec![
                        abi::WinningsClaimed::SIGNATURE_HASH,
                        topic(U256::from(market_id)),
                        state.signer.into_word(),
                    ],
                    data: words(&[state.payout]),
                });
            }
            Write::WithdrawFees => state.fees = U256::ZERO,
        }
        Ok(Receipt { transaction_hash: tx.hash, status: None, logs })
    }
}

#[derive(Debug)]
pub struct WalletState {
    /// Availability checks that report no wallet before it appears. `None` = never.
    pub available_after: Option<u32>,
    pub checks: u32,
    pub accounts: Result<Vec<Address>, RpcError>,
    pub authorized: Vec<Address>,
    pub balance: U256,
    pub events: Vec<WalletEvent>,
    pub account_requests: u32,
    /// Holds `eth_requestAccounts` open until the sender fires.
    pub accounts_gate: Option<oneshot::Receiver<()>>,
    pub bound: Option<(Address, Address)>,
}

impl Default for WalletState {
    fn default() -> Self {
        Self {
            available_after: Some(0),
            checks: 0,
            accounts: Ok(Vec::new()),
            authorized: Vec::new(),
            balance: U256::ZERO,
            events: Vec::new(),
            account_requests: 0,
            accounts_gate: None,
            bound: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeWallet {
    pub state: Rc<RefCell<WalletState>>,
    pub market: FakeMarket,
}

impl FakeWallet {
    pub fn with_account(account: Address) -> Self {
        let wallet = Self::default();
        wallet.state.borrow_mut().accounts = Ok(vec![account]);
        wallet
    }
}

impl Wallet for FakeWallet {
    type Contract = FakeMarket;
    type Events = stream::Iter<std::vec::IntoIter<WalletEvent>>;

    fn is_available(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.checks += 1;
        match state.available_after {
            Some(after) => state.checks > after,
            None => false,
        }
    }

    fn subscribe(&self) -> Option<Self::Events> {
        let events = self.state.borrow().events.clone();
        Some(stream::iter(events))
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, RpcError> {
        let gate = {
            let mut state = self.state.borrow_mut();
            state.account_requests += 1;
            state.accounts_gate.take()
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.state.borrow().accounts.clone()
    }

    async fn authorized_accounts(&self) -> Result<Vec<Address>, RpcError> {
        Ok(self.state.borrow().authorized.clone())
    }

    async fn balance(&self, _account: Address) -> Result<U256, RpcError> {
        Ok(self.state.borrow().balance)
    }

    fn bind(&self, contract: Address, signer: Address) -> Option<Self::Contract> {
        self.state.borrow_mut().bound = Some((contract, signer));
        self.market.state.borrow_mut().signer = signer;
        Some(self.market.clone())
    }
}

/// Page double that records every region update.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub wallet: RefCell<Vec<WalletView>>,
    pub admin: RefCell<Vec<Option<AdminView>>>,
    pub markets: RefCell<Vec<MarketsView>>,
    pub notices: RefCell<Vec<Notice>>,
    pub prompts: RefCell<Vec<String>>,
    pub sleeps: RefCell<Vec<Duration>>,
    pub confirm_answer: Cell<bool>,
    pub reloads: Cell<u32>,
    pub form_resets: Cell<u32>,
    pub now: Cell<u64>,
}

impl RecordingHost {
    pub fn new() -> Self {
        let host = Self::default();
        host.confirm_answer.set(true);
        host.now.set(NOW);
        host
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }

    pub fn last_wallet(&self) -> Option<WalletView> {
        self.wallet.borrow().last().cloned()
    }

    pub fn last_admin(&self) -> Option<Option<AdminView>> {
        self.admin.borrow().last().cloned()
    }

    pub fn last_markets(&self) -> Option<MarketsView> {
        self.markets.borrow().last().cloned()
    }
}

impl Host for RecordingHost {
    fn show_wallet(&self, view: WalletView) {
        self.wallet.borrow_mut().push(view);
    }

    fn show_admin(&self, view: Option<AdminView>) {
        self.admin.borrow_mut().push(view);
    }

    fn show_markets(&self, view: MarketsView) {
        self.markets.borrow_mut().push(view);
    }

    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }

    fn reset_create_form(&self) {
        self.form_resets.set(self.form_resets.get() + 1);
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.confirm_answer.get()
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    fn now(&self) -> u64 {
        self.now.get()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}
