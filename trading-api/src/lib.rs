pub mod model;
pub mod traits;

pub use model::aggregate::{AggregateEntry, BestTradesReport};
pub use model::batch::Batch;
pub use model::trade::{Direction, Param, ParseDirectionError, TradeList, TradeRecord};
pub use traits::sink::{Operation, SinkError, TransactionalSink};

pub use rust_decimal::Decimal;

pub mod prelude {
    pub use crate::model::aggregate::{AggregateEntry, BestTradesReport};
    pub use crate::model::batch::Batch;
    pub use crate::model::trade::{Direction, TradeRecord};
    pub use crate::traits::sink::{Operation, SinkError, TransactionalSink};
}
