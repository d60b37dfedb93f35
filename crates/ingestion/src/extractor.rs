//! Transaction extraction and normalization.

use crate::block_source::{RawBlock, RawTransaction};
use crate::error::ExtractError;
use alloy::primitives::utils::format_ether;
use alloy::primitives::U256;
use block_crawler_db::TransactionRecord;

/// Turn a block's transactions into store records, in block order.
///
/// Yields one item per transaction. A transaction whose own block number
/// disagrees with the block it was served in yields an error instead of a
/// record; the caller decides whether to skip it.
pub fn extract(block: &RawBlock) -> impl Iterator<Item = Result<TransactionRecord, ExtractError>> + '_ {
    block
        .transactions
        .iter()
        .map(move |tx| extract_transaction(block, tx))
}

fn extract_transaction(block: &RawBlock, tx: &RawTransaction) -> Result<TransactionRecord, ExtractError> {
    let hash = format!("0x{}", hex::encode(tx.hash));

    if tx.block_number != Some(block.number) {
        return Err(ExtractError::BlockNumberMismatch {
            hash,
            expected: block.number,
            found: tx.block_number,
        });
    }

    let block_number =
        i64::try_from(block.number).map_err(|_| ExtractError::BlockOutOfBounds(block.number))?;
    let block_timestamp = i64::try_from(block.timestamp)
        .map_err(|_| ExtractError::TimestampOutOfBounds(block.timestamp))?;

    Ok(TransactionRecord {
        hash,
        block_number,
        value_ether: wei_to_ether(tx.value_wei),
        block_timestamp,
    })
}

/// Exact decimal rendering of `wei / 10^18` without trailing fractional zeros.
pub fn wei_to_ether(wei: U256) -> String {
    let formatted = format_ether(wei);
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::B256;

    fn tx(byte: u8, block_number: Option<u64>, value_wei: U256) -> RawTransaction {
        RawTransaction {
            hash: B256::repeat_byte(byte),
            block_number,
            value_wei,
        }
    }

    fn block(number: u64, transactions: Vec<RawTransaction>) -> RawBlock {
        RawBlock {
            number,
            timestamp: 1_700_000_000,
            transactions,
        }
    }

    #[test]
    fn test_wei_to_ether() {
        assert_eq!(wei_to_ether(U256::from(1_500_000_000_000_000_000u64)), "1.5");
        assert_eq!(wei_to_ether(U256::from(1_000_000_000_000_000_000u64)), "1");
        assert_eq!(wei_to_ether(U256::ZERO), "0");
        assert_eq!(wei_to_ether(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(wei_to_ether(U256::from(10_000_000_000_000_000_000u128)), "10");
        assert_eq!(
            wei_to_ether(U256::from(123_456_789_012_345_678_901_234_567u128)),
            "123456789.012345678901234567"
        );
    }

    #[test]
    fn test_wei_to_ether_handles_full_width_values() {
        let expected = "115792089237316195423570985008687907853269984665640564039457.584007913129639935";
        assert_eq!(wei_to_ether(U256::MAX), expected);
    }

    #[test]
    fn test_extract_preserves_order_and_fields() {
        let raw = block(
            100,
            vec![
                tx(0xbb, Some(100), U256::from(1_500_000_000_000_000_000u64)),
                tx(0xaa, Some(100), U256::ZERO),
            ],
        );

        let records: Vec<TransactionRecord> = extract(&raw).collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].hash, format!("0x{}", "bb".repeat(32)));
        assert_eq!(records[0].value_ether, "1.5");
        assert_eq!(records[1].hash, format!("0x{}", "aa".repeat(32)));
        assert_eq!(records[1].value_ether, "0");
        assert!(records.iter().all(|r| r.block_number == 100 && r.block_timestamp == 1_700_000_000));
    }

    #[test]
    fn test_extract_empty_block() {
        assert_eq!(extract(&block(7, vec![])).count(), 0);
    }

    #[test]
    fn test_extract_flags_block_number_mismatch() {
        let raw = block(
            100,
            vec![
                tx(1, Some(100), U256::ZERO),
                tx(2, Some(99), U256::ZERO),
                tx(3, None, U256::ZERO),
            ],
        );

        let items: Vec<_> = extract(&raw).collect();
        assert!(items[0].is_ok());
        assert_eq!(
            items[1],
            Err(ExtractError::BlockNumberMismatch {
                hash: format!("0x{}", "02".repeat(32)),
                expected: 100,
                found: Some(99),
            })
        );
        assert!(matches!(items[2], Err(ExtractError::BlockNumberMismatch { found: None, .. })));
    }

    #[test]
    fn test_extract_rejects_unrepresentable_timestamp() {
        let mut raw = block(100, vec![tx(1, Some(100), U256::from(5u64))]);
        raw.timestamp = u64::MAX;

        let items: Vec<_> = extract(&raw).collect();
        assert_eq!(items, vec![Err(ExtractError::TimestampOutOfBounds(u64::MAX))]);
    }
}
