//! Defines the trade record shape shared by every pipeline stage.
//!
//! A `TradeRecord` is produced by whatever reads the serialized trade list and
//! is consumed read-only afterwards: batches and aggregations borrow it, nobody
//! mutates it.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Side of a trade. Serialized as its single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// The single-letter code used in trade lists and statements.
    pub fn code(&self) -> &'static str {
        match self {
            Direction::Buy => "B",
            Direction::Sell => "S",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown trade direction '{0}'")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b" | "buy" => Ok(Direction::Buy),
            "s" | "sell" => Ok(Direction::Sell),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single statement parameter handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Param {
    Text(String),
    Decimal(Decimal),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Text(s) => write!(f, "'{}'", s),
            Param::Decimal(d) => write!(f, "{}", d),
        }
    }
}

/// One executed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(rename = "Direction")]
    direction: Direction,
    /// Instrument identifier (ISIN). Empty means the record cannot be grouped.
    #[serde(rename = "ISIN", default)]
    instrument_id: String,
    #[serde(rename = "Quantity")]
    quantity: Decimal,
    #[serde(rename = "Price")]
    price: Decimal,
}

impl TradeRecord {
    pub fn new(
        direction: Direction,
        instrument_id: impl Into<String>,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            direction,
            instrument_id: instrument_id.into(),
            quantity,
            price,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Key used to group records per instrument, `None` for a blank identifier.
    ///
    /// The identifier is used as read; surrounding whitespace is not stripped.
    pub fn grouping_key(&self) -> Option<&str> {
        if self.instrument_id.trim().is_empty() {
            None
        } else {
            Some(&self.instrument_id)
        }
    }

    /// Parameters for the insert statement, in `@1..@4` order.
    pub fn insert_params(&self) -> Vec<Param> {
        vec![
            Param::Text(self.instrument_id.clone()),
            Param::Decimal(self.quantity),
            Param::Decimal(self.price),
            Param::Text(self.direction.code().to_string()),
        ]
    }
}

/// The serialized trade-list document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeList {
    #[serde(rename = "Trades", alias = "trades", default)]
    trades: Vec<TradeRecord>,
}

impl TradeList {
    pub fn new(trades: Vec<TradeRecord>) -> Self {
        Self { trades }
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<TradeRecord> {
        self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("B".parse::<Direction>(), Ok(Direction::Buy));
        assert_eq!(" sell ".parse::<Direction>(), Ok(Direction::Sell));
        assert!("X".parse::<Direction>().is_err());
    }

    #[test]
    fn test_grouping_key_rejects_blank_ids() {
        let blank = TradeRecord::new(Direction::Buy, "  ", Decimal::ONE, Decimal::ONE);
        assert_eq!(blank.grouping_key(), None);

        let named = TradeRecord::new(Direction::Buy, "CZ0005112300", Decimal::ONE, Decimal::ONE);
        assert_eq!(named.grouping_key(), Some("CZ0005112300"));

        let padded = TradeRecord::new(Direction::Buy, " CZ0005112300", Decimal::ONE, Decimal::ONE);
        assert_eq!(padded.grouping_key(), Some(" CZ0005112300"));
    }

    #[test]
    fn test_insert_params_order() {
        let trade = TradeRecord::new(
            Direction::Sell,
            "X",
            Decimal::new(15, 0),
            Decimal::new(1025, 2),
        );
        let params = trade.insert_params();
        assert_eq!(params[0], Param::Text("X".into()));
        assert_eq!(params[1], Param::Decimal(Decimal::new(15, 0)));
        assert_eq!(params[2], Param::Decimal(Decimal::new(1025, 2)));
        assert_eq!(params[3], Param::Text("S".into()));
    }

    #[test]
    fn test_trade_list_deserialization() {
        let json = r#"{"Trades":[
            {"Direction":"B","ISIN":"X","Quantity":"10","Price":"1.50"},
            {"Direction":"S","Quantity":5,"Price":2}
        ]}"#;
        let list: TradeList = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.trades()[0].price(), Decimal::new(150, 2));
        assert_eq!(list.trades()[1].direction(), Direction::Sell);
        assert_eq!(list.trades()[1].grouping_key(), None);
    }

    #[test]
    fn test_direction_reads_codes_and_words_in_any_case() {
        let json = r#"{"trades":[
            {"Direction":"buy","ISIN":"X","Quantity":1,"Price":1},
            {"Direction":"SELL","ISIN":"X","Quantity":1,"Price":1},
            {"Direction":"s","ISIN":"X","Quantity":1,"Price":1}
        ]}"#;
        let list: TradeList = serde_json::from_str(json).unwrap();
        let directions: Vec<Direction> = list.trades().iter().map(|t| t.direction()).collect();
        assert_eq!(directions, vec![Direction::Buy, Direction::Sell, Direction::Sell]);

        let bad = r#"{"Trades":[{"Direction":"hold","Quantity":1,"Price":1}]}"#;
        let err = serde_json::from_str::<TradeList>(bad).unwrap_err();
        assert!(err.to_string().contains("Unknown trade direction 'hold'"));
    }

    #[test]
    fn test_trade_list_is_written_with_codes() {
        let list = TradeList::new(vec![TradeRecord::new(
            Direction::Sell,
            "X",
            Decimal::ONE,
            Decimal::new(250, 2),
        )]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["Trades"][0]["Direction"], "S");
        assert_eq!(json["Trades"][0]["ISIN"], "X");
    }
}
