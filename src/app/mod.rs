//! Application controller.
//!
//! `Controller` owns the session and sequences every wallet / contract
//! call. It never touches the DOM: derived view models are pushed into the
//! page through the [`Host`] trait, which the Dioxus page implements with
//! one signal per region.

pub mod controller;

pub use controller::{Controller, Session};

use std::time::Duration;
use thiserror::Error;

use crate::chain::{ContractError, RpcError};
use crate::notify::Notice;
use crate::view::{AdminView, MarketsView, WalletView};

/// The page the controller drives. Region updates are last-write-wins.
#[allow(async_fn_in_trait)]
pub trait Host {
    fn show_wallet(&self, view: WalletView);
    /// `None` hides the admin panel.
    fn show_admin(&self, view: Option<AdminView>);
    fn show_markets(&self, view: MarketsView);
    fn notify(&self, notice: Notice);
    /// Clear the create-market form back to its defaults.
    fn reset_create_form(&self);
    /// Blocking yes/no prompt.
    fn confirm(&self, prompt: &str) -> bool;
    /// Full page reload; drops all session state.
    fn reload(&self);
    /// Unix seconds.
    fn now(&self) -> u64;
    async fn sleep(&self, duration: Duration);
}

/// Why a user-initiated action did not complete.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("No browser wallet detected. Please install MetaMask.")]
    WalletMissing,
    #[error("Please check your wallet - connection request pending")]
    RequestPending,
    #[error("Connection rejected by user")]
    ConnectionRejected,
    #[error("No accounts found. Please unlock your wallet.")]
    NoAccounts,
    #[error("Please connect wallet first")]
    NotConnected,
    #[error("{0}")]
    NotOwner(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ActionError {
    /// Message for the notification surface. Guidance errors stand alone;
    /// remote failures are prefixed with what was being attempted.
    pub fn notice_text(&self, context: &str) -> String {
        match self {
            ActionError::Rpc(_) | ActionError::Contract(_) => format!("{context}: {self}"),
            _ => self.to_string(),
        }
    }
}
