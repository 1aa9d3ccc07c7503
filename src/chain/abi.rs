//! Fixed ABI of the prediction market contract.
//!
//! Calls are encoded with the `sol!` bindings below. Receipt logs are
//! matched on topic0 and decoded by hand: every event indexes the market
//! id in topic1 and keeps its remaining fields in static 32-byte words.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolEvent};

use super::types::{ContractEvent, LogEntry};

sol! {
    function marketCount() external view returns (uint256);
    function getMarket(uint256 marketId) external view returns (
        string question,
        uint256 endTime,
        bool resolved,
        bool outcome,
        uint256 yesStake,
        uint256 noStake,
        bool active
    );
    function getUserPosition(uint256 marketId, address user) external view returns (
        uint256 yesStake,
        uint256 noStake,
        bool claimed
    );
    function calculatePotentialWinnings(uint256 marketId, address user, bool predictYes)
        external view returns (uint256);
    function createMarket(string question, uint256 durationMinutes) external returns (uint256);
    function placeBet(uint256 marketId, bool predictYes) external payable;
    function claimWinnings(uint256 marketId) external;
    function resolveMarket(uint256 marketId, bool outcome) external;
    function owner() external view returns (address);
    function collectedFees() external view returns (uint256);
    function withdrawFees() external;

    event MarketCreated(uint256 indexed marketId, string question, uint256 endTime);
    event BetPlaced(uint256 indexed marketId, address indexed user, bool prediction, uint256 amount);
    event MarketResolved(uint256 indexed marketId, bool outcome);
    event WinningsClaimed(uint256 indexed marketId, address indexed user, uint256 amount);
}

/// Decode a receipt log into a [`ContractEvent`]; `None` for foreign or malformed logs.
pub fn decode_log(log: &LogEntry) -> Option<ContractEvent> {
    let topic0 = *log.topics.first()?;
    let market_id = U256::from_be_slice(log.topics.get(1)?.as_slice()).saturating_to::<u64>();

    if topic0 == MarketCreated::SIGNATURE_HASH {
        Some(ContractEvent::MarketCreated { market_id })
    } else if topic0 == BetPlaced::SIGNATURE_HASH {
        Some(ContractEvent::BetPlaced {
            market_id,
            user: Address::from_word(*log.topics.get(2)?),
            prediction: !word(&log.data, 0)?.is_zero(),
            amount: word(&log.data, 1)?,
        })
    } else if topic0 == MarketResolved::SIGNATURE_HASH {
        Some(ContractEvent::MarketResolved {
            market_id,
            outcome: !word(&log.data, 0)?.is_zero(),
        })
    } else if topic0 == WinningsClaimed::SIGNATURE_HASH {
        Some(ContractEvent::WinningsClaimed {
            market_id,
            user: Address::from_word(*log.topics.get(2)?),
            amount: word(&log.data, 0)?,
        })
    } else {
        None
    }
}

/// The `index`-th 32-byte word of ABI-encoded event data.
fn word(data: &[u8], index: usize) -> Option<U256> {
    let start = index * 32;
    data.get(start..start + 32).map(U256::from_be_slice)
}
