//! View models for each page region.
//!
//! Derivation is pure: chain projections in, display-ready values out.
//! Nothing here touches the DOM.

pub mod admin;
pub mod market;
pub mod wallet;

pub use admin::AdminView;
pub use market::{ClaimState, Holding, MarketStatus, MarketView, MarketsView, PositionView, Viewer};
pub use wallet::{ConnectionStatus, WalletView};
