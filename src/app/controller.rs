use alloy_primitives::{Address, U256};
use futures::future::join_all;
use std::cell::{Cell, RefCell};
use tracing::{debug, error, info, warn};

use super::{ActionError, Host};
use crate::chain::{
    ContractError, ContractEvent, Market, MarketContract, PendingTx, RpcError, Wallet, WalletEvent,
};
use crate::config::Settings;
use crate::format::{format_amount, parse_amount};
use crate::notify::Notice;
use crate::view::market::side_label;
use crate::view::{
    AdminView, ConnectionStatus, Holding, MarketView, MarketsView, Viewer, WalletView,
};

/// Mutable state of one page session.
pub struct Session<C> {
    /// Contract handle bound to the connected signer.
    pub contract: Option<C>,
    pub address: Option<Address>,
    pub owner: Option<Address>,
    pub is_owner: bool,
}

impl<C> Default for Session<C> {
    fn default() -> Self {
        Self {
            contract: None,
            address: None,
            owner: None,
            is_owner: false,
        }
    }
}

impl<C> Session<C> {
    fn viewer(&self) -> Viewer {
        Viewer {
            address: self.address,
            is_owner: self.is_owner,
        }
    }
}

/// Single owner of session state. Every method takes `&self`; the session
/// borrow is never held across an await.
pub struct Controller<W: Wallet, H: Host> {
    settings: Settings,
    wallet: W,
    host: H,
    session: RefCell<Session<W::Contract>>,
    connecting: Cell<bool>,
}

impl<W: Wallet, H: Host> Controller<W, H> {
    pub fn new(settings: Settings, wallet: W, host: H) -> Self {
        Self {
            settings,
            wallet,
            host,
            session: RefCell::new(Session::default()),
            connecting: Cell::new(false),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Render the disconnected shell, wait for a wallet to be injected, and
    /// subscribe to its notifications. `None` if no wallet ever appears.
    pub async fn initialize(&self) -> Option<W::Events> {
        self.show_disconnected();

        if !self.detect_wallet().await {
            warn!(
                attempts = self.settings.wallet_poll_attempts,
                "no browser wallet detected, giving up"
            );
            return None;
        }
        let events = self.wallet.subscribe();

        if self.settings.auto_connect {
            match self.wallet.authorized_accounts().await {
                Ok(accounts) if !accounts.is_empty() => self.connect_wallet().await,
                Ok(_) => debug!("wallet present, page not yet authorized"),
                Err(e) => debug!(error = %e, "eth_accounts failed"),
            }
        }
        events
    }

    async fn detect_wallet(&self) -> bool {
        if self.wallet.is_available() {
            return true;
        }
        for attempt in 1..=self.settings.wallet_poll_attempts {
            self.host.sleep(self.settings.wallet_poll_interval).await;
            if self.wallet.is_available() {
                debug!(attempt, "wallet injected");
                return true;
            }
        }
        false
    }

    pub fn on_wallet_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::ChainChanged(chain) => {
                info!(chain = %chain, "network changed, reloading");
                self.host.reload();
            }
            WalletEvent::AccountsChanged(accounts) if accounts.is_empty() => {
                info!("wallet disconnected");
                *self.session.borrow_mut() = Session::default();
                self.show_disconnected();
            }
            WalletEvent::AccountsChanged(accounts) => {
                info!(account = %accounts[0], "account switched, reloading");
                self.host.reload();
            }
        }
    }

    fn show_disconnected(&self) {
        self.host.show_wallet(WalletView::disconnected(&self.settings.symbol));
        self.host.show_admin(None);
        self.host.show_markets(MarketsView::Disconnected);
    }

    // --- Actions ---

    pub async fn connect_wallet(&self) {
        if let Err(err) = self.try_connect().await {
            self.report("Failed to connect", err);
        }
    }

    pub async fn create_market(&self, question: &str, duration_minutes: &str) {
        if let Err(err) = self.try_create_market(question, duration_minutes).await {
            self.report("Failed to create market", err);
        }
    }

    pub async fn place_bet(&self, market_id: u64, predict_yes: bool, amount: &str) {
        if let Err(err) = self.try_place_bet(market_id, predict_yes, amount).await {
            self.report("Failed to place bet", err);
        }
    }

    pub async fn resolve_market(&self, market_id: u64, outcome: bool) {
        if let Err(err) = self.try_resolve_market(market_id, outcome).await {
            self.report("Failed to resolve market", err);
        }
    }

    pub async fn claim_winnings(&self, market_id: u64) {
        if let Err(err) = self.try_claim_winnings(market_id).await {
            self.report("Failed to claim winnings", err);
        }
    }

    pub async fn withdraw_fees(&self) {
        if let Err(err) = self.try_withdraw_fees().await {
            self.report("Failed to withdraw fees", err);
        }
    }

    /// Periodic refresh: markets, then balance. Failures are only logged.
    pub async fn refresh(&self) {
        if self.contract().is_none() {
            return;
        }
        if let Err(e) = self.read_markets().await {
            warn!(error = %e, "periodic market refresh failed");
        }
        if let Err(e) = self.refresh_wallet().await {
            debug!(error = %e, "balance refresh failed");
        }
    }

    fn report(&self, context: &str, err: ActionError) {
        error!(error = %err, "{context}");
        self.host.notify(Notice::error(err.notice_text(context)));
    }

    async fn try_connect(&self) -> Result<(), ActionError> {
        if !self.wallet.is_available() {
            return Err(ActionError::WalletMissing);
        }
        if self.connecting.replace(true) {
            return Err(ActionError::RequestPending);
        }
        let result = self.establish_session().await;
        self.connecting.set(false);
        result
    }

    async fn establish_session(&self) -> Result<(), ActionError> {
        let accounts = self.wallet.request_accounts().await.map_err(|e| match e {
            RpcError::Rejected => ActionError::ConnectionRejected,
            RpcError::Pending => ActionError::RequestPending,
            other => ActionError::Rpc(other),
        })?;
        let address = *accounts.first().ok_or(ActionError::NoAccounts)?;
        self.session.borrow_mut().address = Some(address);
        info!(account = %address, "wallet connected");

        let Some(contract_address) = self.settings.contract_address else {
            self.host.notify(Notice::error(
                "Contract address not configured. Deploy the contract and set [contract] address.",
            ));
            let balance = self.wallet.balance(address).await?;
            self.host.show_wallet(WalletView::connected(
                address,
                balance,
                ConnectionStatus::NoContract,
                false,
                &self.settings.symbol,
            ));
            return Ok(());
        };

        let contract = self
            .wallet
            .bind(contract_address, address)
            .ok_or(ActionError::WalletMissing)?;

        // Advisory only; the contract enforces owner-only calls itself.
        let owner = match contract.owner().await {
            Ok(owner) => Some(owner),
            Err(e) => {
                warn!(error = %e, "failed to read contract owner");
                None
            }
        };
        let is_owner = owner == Some(address);
        {
            let mut session = self.session.borrow_mut();
            session.contract = Some(contract);
            session.owner = owner;
            session.is_owner = is_owner;
        }

        if is_owner {
            info!("connected account owns the contract");
            self.host.show_admin(Some(AdminView::new(None, &self.settings.symbol)));
            self.update_fees().await;
        } else {
            self.host.show_admin(None);
        }

        self.refresh_wallet().await?;
        self.load_markets().await;
        self.host.notify(Notice::success("Wallet connected successfully"));
        Ok(())
    }

    async fn try_create_market(&self, question: &str, duration_minutes: &str) -> Result<(), ActionError> {
        let question = question.trim();
        let duration_minutes = duration_minutes.trim();
        if question.is_empty() || duration_minutes.is_empty() {
            return Err(ActionError::Invalid("Please fill all fields".to_string()));
        }
        let minutes = duration_minutes
            .parse::<u64>()
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| ActionError::Invalid("Duration must be a whole number of minutes".to_string()))?;
        let contract = self.contract().ok_or(ActionError::NotConnected)?;

        self.host.notify(Notice::info("Creating market..."));
        let tx = contract.create_market(question, minutes).await?;
        let events = self.settle(&contract, &tx).await?;

        self.host.reset_create_form();
        let created = events
            .into_iter()
            .find_map(|event| match event {
                ContractEvent::MarketCreated { market_id } => Some(market_id),
                _ => None,
            });
        info!(tx = %tx.hash, market_id = ?created, minutes, "market created");
        let message = match created {
            Some(id) => format!("Market #{id} created successfully"),
            None => "Market created successfully".to_string(),
        };
        self.host.notify(Notice::success(message));
        self.load_markets().await;
        Ok(())
    }

    async fn try_place_bet(&self, market_id: u64, predict_yes: bool, amount: &str) -> Result<(), ActionError> {
        let value = parse_amount(amount)
            .ok_or_else(|| ActionError::Invalid("Invalid bet amount".to_string()))?;
        if value < self.settings.min_bet {
            return Err(ActionError::Invalid(format!(
                "Minimum bet is {} {}",
                self.settings.min_bet_label, self.settings.symbol
            )));
        }
        let contract = self.contract().ok_or(ActionError::NotConnected)?;

        self.host.notify(Notice::info("Placing bet..."));
        let tx = contract.place_bet(market_id, predict_yes, value).await?;
        self.settle(&contract, &tx).await?;
        info!(tx = %tx.hash, market_id, side = side_label(predict_yes), wei = %value, "bet placed");

        self.host.notify(Notice::success("Bet placed successfully"));
        self.load_markets().await;
        self.refresh_wallet().await
    }

    async fn try_resolve_market(&self, market_id: u64, outcome: bool) -> Result<(), ActionError> {
        if !self.session.borrow().is_owner {
            return Err(ActionError::NotOwner("Only contract owner can resolve markets"));
        }
        let side = side_label(outcome);
        let prompt = format!("Are you sure you want to resolve Market #{market_id} as {side}?");
        if !self.host.confirm(&prompt) {
            debug!(market_id, "resolution cancelled");
            return Ok(());
        }
        let contract = self.contract().ok_or(ActionError::NotConnected)?;

        self.host.notify(Notice::info("Resolving market..."));
        let tx = contract.resolve_market(market_id, outcome).await?;
        self.settle(&contract, &tx).await?;
        info!(tx = %tx.hash, market_id, outcome = side, "market resolved");

        self.host.notify(Notice::success(format!("Market resolved as {side}")));
        self.load_markets().await;
        Ok(())
    }

    async fn try_claim_winnings(&self, market_id: u64) -> Result<(), ActionError> {
        let contract = self.contract().ok_or(ActionError::NotConnected)?;

        self.host.notify(Notice::info("Claiming winnings..."));
        let tx = contract.claim_winnings(market_id).await?;
        let events = self.settle(&contract, &tx).await?;

        let claimed = events
            .into_iter()
            .find_map(|event| match event {
                ContractEvent::WinningsClaimed { amount, .. } => Some(amount),
                _ => None,
            });
        info!(tx = %tx.hash, market_id, wei = ?claimed, "winnings claimed");
        let message = match claimed {
            Some(amount) => format!(
                "Claimed {} {}",
                format_amount(amount, 4),
                self.settings.symbol
            ),
            None => "Winnings claimed successfully".to_string(),
        };
        self.host.notify(Notice::success(message));
        self.load_markets().await;
        self.refresh_wallet().await
    }

    async fn try_withdraw_fees(&self) -> Result<(), ActionError> {
        if !self.session.borrow().is_owner {
            return Err(ActionError::NotOwner("Only contract owner can withdraw fees"));
        }
        let contract = self.contract().ok_or(ActionError::NotConnected)?;

        self.host.notify(Notice::info("Withdrawing fees..."));
        let tx = contract.withdraw_fees().await?;
        self.settle(&contract, &tx).await?;
        info!(tx = %tx.hash, "fees withdrawn");

        self.host.notify(Notice::success("Fees withdrawn successfully"));
        self.update_fees().await;
        self.refresh_wallet().await
    }

    /// Wait for `tx` to be mined and return the contract events it emitted.
    async fn settle(&self, contract: &W::Contract, tx: &PendingTx) -> Result<Vec<ContractEvent>, ActionError> {
        let receipt = contract.confirm(tx).await?;
        let events = receipt.events(contract.address());
        for event in &events {
            debug!(tx = %tx.hash, event = %event, "contract event");
        }
        Ok(events)
    }

    // --- Reads ---

    fn contract(&self) -> Option<W::Contract> {
        self.session.borrow().contract.clone()
    }

    /// Re-read the market list and replace the markets region.
    pub async fn load_markets(&self) {
        if let Err(e) = self.read_markets().await {
            error!(error = %e, "failed to read market count");
            self.host.notify(Notice::error("Failed to load markets"));
        }
    }

    /// Only an unreadable market count fails the whole list; the region is
    /// left untouched in that case.
    async fn read_markets(&self) -> Result<(), ContractError> {
        let Some(contract) = self.contract() else {
            return Ok(());
        };

        let count = contract.market_count().await?;
        let view = if count == 0 {
            MarketsView::Empty
        } else {
            let viewer = self.session.borrow().viewer();
            let now = self.host.now();
            let cards = join_all((0..count).map(|id| self.load_card(&contract, id, viewer, now))).await;
            let cards: Vec<MarketView> = cards.into_iter().flatten().collect();
            debug!(count, shown = cards.len(), "markets refreshed");
            MarketsView::Cards(cards)
        };
        self.host.show_markets(view);

        self.update_fees().await;
        Ok(())
    }

    /// One card, or `None` when the market is inactive or unreadable.
    async fn load_card(
        &self,
        contract: &W::Contract,
        market_id: u64,
        viewer: Viewer,
        now: u64,
    ) -> Option<MarketView> {
        let market = match contract.market(market_id).await {
            Ok(market) => market,
            Err(e) => {
                warn!(market_id, error = %e, "failed to load market");
                return None;
            }
        };
        if !market.active {
            return None;
        }

        let holding = match viewer.address {
            Some(user) => self.load_holding(contract, &market, user).await,
            None => None,
        };
        Some(MarketView::derive(
            &market,
            &viewer,
            holding.as_ref(),
            now,
            &self.settings.symbol,
        ))
    }

    /// The user's stake and projected payouts. A failed position read drops
    /// the position block; a failed projection drops only that projection.
    async fn load_holding(&self, contract: &W::Contract, market: &Market, user: Address) -> Option<Holding> {
        let position = match contract.user_position(market.id, user).await {
            Ok(position) => position,
            Err(e) => {
                warn!(market_id = market.id, error = %e, "failed to load position");
                return None;
            }
        };
        if !position.has_stake() {
            return None;
        }

        let mut holding = Holding {
            position,
            if_yes: None,
            if_no: None,
        };
        if !market.resolved && !market.pool().is_zero() {
            if !position.yes_stake.is_zero() {
                holding.if_yes = self.projection(contract, market.id, user, true).await;
            }
            if !position.no_stake.is_zero() {
                holding.if_no = self.projection(contract, market.id, user, false).await;
            }
        }
        Some(holding)
    }

    async fn projection(
        &self,
        contract: &W::Contract,
        market_id: u64,
        user: Address,
        predict_yes: bool,
    ) -> Option<U256> {
        contract
            .potential_winnings(market_id, user, predict_yes)
            .await
            .map_err(|e| warn!(market_id, side = side_label(predict_yes), error = %e, "failed to project winnings"))
            .ok()
    }

    /// Re-read collected fees into the admin panel. Owner only.
    async fn update_fees(&self) {
        let contract = {
            let session = self.session.borrow();
            if !session.is_owner {
                return;
            }
            session.contract.clone()
        };
        let Some(contract) = contract else {
            return;
        };
        match contract.collected_fees().await {
            Ok(fees) => self
                .host
                .show_admin(Some(AdminView::new(Some(fees), &self.settings.symbol))),
            Err(e) => warn!(error = %e, "failed to read collected fees"),
        }
    }

    async fn refresh_wallet(&self) -> Result<(), ActionError> {
        let (address, is_owner) = {
            let session = self.session.borrow();
            (session.address.ok_or(ActionError::NotConnected)?, session.is_owner)
        };
        let balance = self.wallet.balance(address).await?;
        self.host.show_wallet(WalletView::connected(
            address,
            balance,
            ConnectionStatus::Online,
            is_owner,
            &self.settings.symbol,
        ));
        Ok(())
    }
}
