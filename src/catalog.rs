//! Asset Catalog
//!
//! The set of assets the desk knows about, as pure configuration data:
//! stable identifier, display label, backing CSV file, and an optional
//! price-column override for merged multi-asset exports (suffixed `Close.N`
//! columns). Resolution *logic* lives in the loader; adding an asset is an
//! edit here only.

/// Static description of one known asset.
#[derive(Debug, Clone, Copy)]
pub struct AssetSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub file: &'static str,
    /// Preferred price column. Only honored when the column actually exists
    /// in the source header; otherwise the loader falls through to its
    /// default resolution order.
    pub price_column: Option<&'static str>,
}

pub const ASSETS: &[AssetSpec] = &[
    AssetSpec {
        id: "bitcoin",
        label: "Bitcoin",
        file: "cleaned_BTC_USD_daily_data.csv",
        price_column: Some("Close.1"),
    },
    AssetSpec {
        id: "ethereum",
        label: "Ethereum",
        file: "cleaned_ETH_USD_daily_data.csv",
        price_column: Some("Close.1"),
    },
    AssetSpec {
        id: "binancecoin",
        label: "Binance Coin",
        file: "cleaned_BNB_USD_daily_data.csv",
        price_column: Some("Close"),
    },
    AssetSpec {
        id: "bitcoin-cash",
        label: "Bitcoin Cash",
        file: "cleaned_BCH_USD_daily_data.csv",
        price_column: Some("Close"),
    },
    AssetSpec {
        id: "dogecoin",
        label: "Dogecoin",
        file: "cleaned_DOGE_USD_daily_data.csv",
        price_column: Some("Close.3"),
    },
    AssetSpec {
        id: "solana",
        label: "Solana",
        file: "cleaned_SOL_USD_daily_data.csv",
        price_column: Some("Close.2"),
    },
    AssetSpec {
        id: "tron",
        label: "Tron",
        file: "cleaned_TRX_USD_daily_data.csv",
        price_column: Some("Close.3"),
    },
    AssetSpec {
        id: "usdc",
        label: "USDC",
        file: "cleaned_USDC_USD_daily_data.csv",
        price_column: Some("Close.4"),
    },
    AssetSpec {
        id: "tether",
        label: "Tether",
        file: "cleaned_USDT_USD_daily_data.csv",
        price_column: Some("Close.4"),
    },
    AssetSpec {
        id: "figr",
        label: "FIGR HELOC",
        file: "cleaned_FIGR_HELOC_USD_daily_data.csv",
        price_column: Some("Close.5"),
    },
];

/// Look up an asset by its stable identifier.
pub fn find(asset_id: &str) -> Option<&'static AssetSpec> {
    ASSETS.iter().find(|a| a.id == asset_id)
}

/// Look up an asset by its display label (CLI convenience).
pub fn find_by_label(label: &str) -> Option<&'static AssetSpec> {
    ASSETS.iter().find(|a| a.label.eq_ignore_ascii_case(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_and_unknown() {
        assert_eq!(find("bitcoin").unwrap().label, "Bitcoin");
        assert!(find("not-an-asset").is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        for (i, a) in ASSETS.iter().enumerate() {
            for b in &ASSETS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
