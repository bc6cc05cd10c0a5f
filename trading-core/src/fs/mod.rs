pub mod paths;
pub mod persistence;

pub use paths::PathManager;
pub use persistence::{load_trade_list, read_json, write_json, write_trade_list};
