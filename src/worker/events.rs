//! Decoded pair events, as delivered by the upstream log decoder.
//!
//! Raw log to event decoding happens outside this crate; these types only
//! carry the already-demuxed fields. Packed `bytes32` amount fields are kept
//! packed until a handler splits them with the configured encoding.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::{address_key, hex_encode};

/// Largest bin id representable on chain (uint24).
pub const MAX_BIN_ID: u32 = (1 << 24) - 1;

/// Failures that make an event's amounts or direction unrecoverable.
///
/// Fatal for the event; the harness decides whether to retry or halt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("ids/amounts length mismatch: {ids} ids, {amounts} amounts")]
    LengthMismatch { ids: usize, amounts: usize },

    #[error("bin id {0} does not fit in 24 bits")]
    BinIdOutOfRange(U256),

    #[error("swap direction undetermined: amountXIn={x_in} amountYIn={y_in}")]
    AmbiguousDirection { x_in: u128, y_in: u128 },
}

/// Position and provenance shared by every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMeta {
    pub pair: Address,
    pub block_number: u64,
    pub block_timestamp: u64,
    pub tx_hash: B256,
    pub log_index: u64,
    /// Transaction sender
    pub origin: Address,
}

impl EventMeta {
    pub fn pair_id(&self) -> String {
        address_key(&self.pair)
    }

    pub fn tx_id(&self) -> String {
        hex_encode(self.tx_hash.as_slice())
    }

    /// `{tx}#{log_index}`: key of the record an event appends.
    pub fn record_id(&self) -> String {
        format!("{}#{}", self.tx_id(), self.log_index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub meta: EventMeta,
    pub event: PairEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PairEvent {
    PairCreated(PairCreated),
    Swap(Swap),
    FlashLoan(FlashLoan),
    CompositionFees(CompositionFees),
    DepositedToBins(BinLiquidity),
    WithdrawnFromBins(BinLiquidity),
    CollectedProtocolFees(CollectedProtocolFees),
    TransferBatch(TransferBatch),
    StaticFeeParametersSet(StaticFeeParametersSet),
}

impl PairEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PairEvent::PairCreated(_) => "PairCreated",
            PairEvent::Swap(_) => "Swap",
            PairEvent::FlashLoan(_) => "FlashLoan",
            PairEvent::CompositionFees(_) => "CompositionFees",
            PairEvent::DepositedToBins(_) => "DepositedToBins",
            PairEvent::WithdrawnFromBins(_) => "WithdrawnFromBins",
            PairEvent::CollectedProtocolFees(_) => "CollectedProtocolFees",
            PairEvent::TransferBatch(_) => "TransferBatch",
            PairEvent::StaticFeeParametersSet(_) => "StaticFeeParametersSet",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub address: Address,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub decimals: u8,
}

/// Factory pair creation, with token metadata resolved by the event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairCreated {
    pub token_x: TokenMetadata,
    pub token_y: TokenMetadata,
    pub bin_step: u16,
    pub active_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swap {
    pub sender: Address,
    pub to: Address,
    pub id: u32,
    pub amounts_in: B256,
    pub amounts_out: B256,
    pub volatility_accumulator: u32,
    pub total_fees: B256,
    pub protocol_fees: B256,
    /// Direction reported by the source, when it reports one
    #[serde(default)]
    pub swap_for_y: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashLoan {
    pub sender: Address,
    pub receiver: Address,
    pub active_id: u32,
    pub amounts: B256,
    pub total_fees: B256,
    pub protocol_fees: B256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositionFees {
    pub sender: Address,
    pub id: u32,
    pub total_fees: B256,
    pub protocol_fees: B256,
}

/// Body of both `DepositedToBins` and `WithdrawnFromBins`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinLiquidity {
    pub sender: Address,
    pub to: Address,
    pub ids: Vec<U256>,
    pub amounts: Vec<B256>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectedProtocolFees {
    pub fee_recipient: Address,
    pub protocol_fees: B256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferBatch {
    pub sender: Address,
    pub from: Address,
    pub to: Address,
    pub ids: Vec<U256>,
    pub amounts: Vec<U256>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticFeeParametersSet {
    pub sender: Address,
    pub base_factor: u16,
    pub filter_period: u16,
    pub decay_period: u16,
    pub reduction_factor: u16,
    pub variable_fee_control: u32,
    pub protocol_share: u16,
    pub max_volatility_accumulator: u32,
}

/// Narrow a uint256 bin id to the on-chain uint24 range.
pub fn bin_id(raw: U256) -> Result<u32, DecodeError> {
    if raw > U256::from(MAX_BIN_ID) {
        return Err(DecodeError::BinIdOutOfRange(raw));
    }
    Ok(raw.to::<u32>())
}

/// Pair up `ids` with `amounts`, rejecting batches whose lengths differ.
pub fn zip_bins<'a, T>(ids: &[U256], amounts: &'a [T]) -> Result<Vec<(u32, &'a T)>, DecodeError> {
    if ids.len() != amounts.len() {
        return Err(DecodeError::LengthMismatch {
            ids: ids.len(),
            amounts: amounts.len(),
        });
    }

    ids.iter()
        .zip(amounts)
        .map(|(id, amount)| bin_id(*id).map(|id| (id, amount)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_id_range() {
        assert_eq!(bin_id(U256::from(8_388_608u32)), Ok(8_388_608));
        assert_eq!(bin_id(U256::from(MAX_BIN_ID)), Ok(MAX_BIN_ID));
        assert_eq!(
            bin_id(U256::from(1u64 << 24)),
            Err(DecodeError::BinIdOutOfRange(U256::from(1u64 << 24)))
        );
    }

    #[test]
    fn test_zip_bins_rejects_length_mismatch() {
        let ids = [U256::from(1u8), U256::from(2u8)];
        let amounts = [B256::ZERO];
        assert_eq!(
            zip_bins(&ids, &amounts).unwrap_err(),
            DecodeError::LengthMismatch { ids: 2, amounts: 1 }
        );

        let amounts = [B256::ZERO, B256::ZERO];
        let zipped = zip_bins(&ids, &amounts).unwrap();
        assert_eq!(zipped.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_event_json_shape() {
        let json = r#"{
            "meta": {
                "pair": "0x1111111111111111111111111111111111111111",
                "block_number": 10,
                "block_timestamp": 1700000000,
                "tx_hash": "0x00000000000000000000000000000000000000000000000000000000000000aa",
                "log_index": 3,
                "origin": "0x2222222222222222222222222222222222222222"
            },
            "event": {
                "kind": "CollectedProtocolFees",
                "fee_recipient": "0x3333333333333333333333333333333333333333",
                "protocol_fees": "0x0000000000000000000000000000000000000000000000000000000000000000"
            }
        }"#;

        let event: LogEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event.name(), "CollectedProtocolFees");
        assert_eq!(event.meta.pair_id(), "0x1111111111111111111111111111111111111111");
        assert_eq!(
            event.meta.record_id(),
            "0x00000000000000000000000000000000000000000000000000000000000000aa#3"
        );
    }
}
