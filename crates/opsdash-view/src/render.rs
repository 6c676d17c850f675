//! Derived display attributes.
//!
//! Pure functions of the row fields, recomputed on every reconciliation so
//! they can never drift from the underlying numeric values.

use opsdash_core::{AlertRow, ExcludedCoin, LogRow, PositionRow, SignalRow};
use rust_decimal::Decimal;
use serde::Serialize;

/// Cell text shown where a metric has no value.
pub const NO_DATA_SENTINEL: &str = "—";

/// Badge strength thresholds (signal score 0..100).
const BADGE_STRONG_MIN: Decimal = Decimal::from_parts(70, 0, 0, false, 0);
const BADGE_CAUTION_MIN: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// A rendered table: either real rows or the explicit "no data" placeholder
/// row (an empty collection never renders as an empty table).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RenderedTable<R> {
    Placeholder,
    Rows(Vec<R>),
}

impl<R> RenderedTable<R> {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, RenderedTable::Placeholder)
    }

    pub fn rows(&self) -> &[R] {
        match self {
            RenderedTable::Placeholder => &[],
            RenderedTable::Rows(rows) => rows,
        }
    }

    fn from_rows(rows: Vec<R>) -> Self {
        if rows.is_empty() {
            RenderedTable::Placeholder
        } else {
            RenderedTable::Rows(rows)
        }
    }
}

/// Badge style class derived from signal strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeClass {
    Strong,
    Caution,
    Weak,
}

/// Directional color derived from the trend score sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendColor {
    Up,
    Down,
    Flat,
}

/// Rendered pnl cell: a numeric value with its sign, or the no-data
/// sentinel when the metric is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PnlCell {
    Value { pct: Decimal, gain: bool },
    NoData,
}

impl PnlCell {
    pub fn text(&self) -> String {
        match self {
            PnlCell::Value { pct, .. } => format!("{pct} %"),
            PnlCell::NoData => NO_DATA_SENTINEL.to_string(),
        }
    }
}

/// One rendered position row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPosition {
    pub coin: String,
    pub pnl: PnlCell,
    /// Marker offsets on the range bar, clamped to 0..=100.
    pub entry_offset_pct: Decimal,
    pub stop_offset_pct: Decimal,
    pub take_offset_pct: Decimal,
    pub trend_offset_pct: Decimal,
    pub trend_color: TrendColor,
    pub badge: BadgeClass,
    pub badge_label: String,
}

/// One rendered signal row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSignal {
    pub coin: String,
    pub trend_color: TrendColor,
    pub golden_cross: bool,
    pub rsi: Decimal,
    pub badge: BadgeClass,
    pub badge_label: String,
}

/// Badge class from a 0..100 strength score.
pub fn badge_class(strength: Decimal) -> BadgeClass {
    if strength >= BADGE_STRONG_MIN {
        BadgeClass::Strong
    } else if strength >= BADGE_CAUTION_MIN {
        BadgeClass::Caution
    } else {
        BadgeClass::Weak
    }
}

/// Directional color from a signed trend score.
pub fn trend_color(trend: Decimal) -> TrendColor {
    if trend > Decimal::ZERO {
        TrendColor::Up
    } else if trend < Decimal::ZERO {
        TrendColor::Down
    } else {
        TrendColor::Flat
    }
}

/// Clamp a percentage offset onto the 0..=100 range bar.
pub fn marker_offset(pct: Decimal) -> Decimal {
    pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Pnl cell from an optional percentage.
pub fn pnl_cell(pnl: Option<Decimal>) -> PnlCell {
    match pnl {
        Some(pct) => PnlCell::Value {
            pct,
            gain: pct >= Decimal::ZERO,
        },
        None => PnlCell::NoData,
    }
}

/// Render the positions table.
pub fn render_positions(rows: &[PositionRow]) -> RenderedTable<RenderedPosition> {
    RenderedTable::from_rows(
        rows.iter()
            .map(|row| RenderedPosition {
                coin: row.coin.clone(),
                pnl: pnl_cell(row.pnl),
                entry_offset_pct: marker_offset(row.entry_pct),
                stop_offset_pct: marker_offset(row.stop_pct),
                take_offset_pct: marker_offset(row.take_pct),
                trend_offset_pct: marker_offset(row.trend.abs()),
                trend_color: trend_color(row.trend),
                badge: badge_class(row.strength),
                badge_label: row.signal_label.clone(),
            })
            .collect(),
    )
}

/// Render the buy-signal candidate table.
pub fn render_signals(rows: &[SignalRow]) -> RenderedTable<RenderedSignal> {
    RenderedTable::from_rows(
        rows.iter()
            .map(|row| RenderedSignal {
                coin: row.coin.clone(),
                trend_color: trend_color(row.trend),
                golden_cross: row.golden_cross,
                rsi: row.rsi,
                badge: badge_class(row.strength),
                badge_label: row.signal.clone(),
            })
            .collect(),
    )
}

/// Render the alert feed.
pub fn render_alerts(rows: &[AlertRow]) -> RenderedTable<Vec<String>> {
    RenderedTable::from_rows(
        rows.iter()
            .map(|row| vec![row.time.clone(), row.message.clone()])
            .collect(),
    )
}

/// Render the log feed. Missing price/amount cells use the no-data
/// sentinel instead of a numeric cell.
pub fn render_logs(rows: &[LogRow]) -> RenderedTable<Vec<String>> {
    RenderedTable::from_rows(
        rows.iter()
            .map(|row| {
                vec![
                    row.time.clone(),
                    row.kind.clone(),
                    row.action.clone().unwrap_or_default(),
                    row.coin.clone().unwrap_or_default(),
                    row.price
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| NO_DATA_SENTINEL.to_string()),
                    row.amount
                        .map(|a| a.to_string())
                        .unwrap_or_else(|| NO_DATA_SENTINEL.to_string()),
                ]
            })
            .collect(),
    )
}

/// Render the excluded-coin list.
pub fn render_excluded(rows: &[ExcludedCoin]) -> RenderedTable<Vec<String>> {
    RenderedTable::from_rows(
        rows.iter()
            .map(|row| {
                vec![
                    row.coin.clone(),
                    row.reason.clone().unwrap_or_default(),
                    row.since.clone().unwrap_or_default(),
                ]
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(coin: &str, pnl: Option<Decimal>) -> PositionRow {
        PositionRow {
            coin: coin.to_string(),
            pnl,
            entry_pct: dec!(42),
            stop_pct: dec!(0),
            take_pct: dec!(100),
            trend: dec!(-3),
            strength: dec!(55),
            signal_label: "HOLD".to_string(),
        }
    }

    #[test]
    fn test_empty_collection_renders_placeholder() {
        let table = render_positions(&[]);
        assert!(table.is_placeholder());
        assert!(table.rows().is_empty());
    }

    #[test]
    fn test_null_pnl_renders_sentinel_not_badge() {
        let table = render_positions(&[position("BTC", None)]);
        let row = &table.rows()[0];
        assert_eq!(row.pnl, PnlCell::NoData);
        assert_eq!(row.pnl.text(), NO_DATA_SENTINEL);
    }

    #[test]
    fn test_pnl_sign_drives_gain_flag() {
        let gain = pnl_cell(Some(dec!(2.5)));
        let loss = pnl_cell(Some(dec!(-1.2)));
        assert_eq!(gain, PnlCell::Value { pct: dec!(2.5), gain: true });
        assert_eq!(loss, PnlCell::Value { pct: dec!(-1.2), gain: false });
    }

    #[test]
    fn test_badge_thresholds() {
        assert_eq!(badge_class(dec!(85)), BadgeClass::Strong);
        assert_eq!(badge_class(dec!(70)), BadgeClass::Strong);
        assert_eq!(badge_class(dec!(55)), BadgeClass::Caution);
        assert_eq!(badge_class(dec!(10)), BadgeClass::Weak);
    }

    #[test]
    fn test_trend_color_from_sign() {
        assert_eq!(trend_color(dec!(4)), TrendColor::Up);
        assert_eq!(trend_color(dec!(-4)), TrendColor::Down);
        assert_eq!(trend_color(Decimal::ZERO), TrendColor::Flat);
    }

    #[test]
    fn test_marker_offset_clamps_to_bar() {
        assert_eq!(marker_offset(dec!(-5)), Decimal::ZERO);
        assert_eq!(marker_offset(dec!(42)), dec!(42));
        assert_eq!(marker_offset(dec!(120)), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_empty_alert_feed_renders_placeholder() {
        assert!(render_alerts(&[]).is_placeholder());

        let rows = vec![AlertRow {
            time: "12:00:01".to_string(),
            message: "stop hit".to_string(),
        }];
        let table = render_alerts(&rows);
        assert_eq!(
            table.rows(),
            &[vec!["12:00:01".to_string(), "stop hit".to_string()]]
        );
    }

    #[test]
    fn test_render_is_pure_and_repeatable() {
        let rows = vec![position("BTC", Some(dec!(1.1))), position("ETH", None)];
        assert_eq!(render_positions(&rows), render_positions(&rows));
    }
}
