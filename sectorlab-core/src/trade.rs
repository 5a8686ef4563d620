//! Sector-basket trade planning.
//!
//! Tickers in recession-resilient sectors are flagged long, tickers in
//! recession-sensitive sectors short. Nothing is submitted anywhere; the
//! plan is only printed.

use crate::data::snapshot::TickerSectorRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Sector lists driving the long/short decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SectorBaskets {
    pub good_sectors: BTreeSet<String>,
    pub bad_sectors: BTreeSet<String>,
}

impl Default for SectorBaskets {
    fn default() -> Self {
        Self {
            good_sectors: ["Utilities", "Consumer Goods"]
                .into_iter()
                .map(String::from)
                .collect(),
            bad_sectors: ["Technology", "Industrial Goods"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

/// A ticker the bot would trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub ticker: String,
    pub side: Side,
}

impl fmt::Display for TradeIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Long => write!(f, "Going long on: {}", self.ticker),
            Side::Short => write!(f, "Shorting: {}", self.ticker),
        }
    }
}

/// All longs in dataset order, then all shorts in dataset order.
///
/// Sector labels are matched exactly. A sector listed in both baskets yields
/// both a long and a short intent.
pub fn plan_trades(records: &[TickerSectorRecord], baskets: &SectorBaskets) -> Vec<TradeIntent> {
    in_basket(records, &baskets.good_sectors, Side::Long)
        .chain(in_basket(records, &baskets.bad_sectors, Side::Short))
        .collect()
}

fn in_basket<'a>(
    records: &'a [TickerSectorRecord],
    sectors: &'a BTreeSet<String>,
    side: Side,
) -> impl Iterator<Item = TradeIntent> + 'a {
    records
        .iter()
        .filter(move |r| sectors.contains(&r.sector))
        .map(move |r| TradeIntent {
            ticker: r.ticker.clone(),
            side,
        })
}
