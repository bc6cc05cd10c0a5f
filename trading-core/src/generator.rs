//! Synthetic trade lists for demos and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trading::{Decimal, Direction, TradeRecord};

/// Instrument identifiers drawn by the generator.
pub const ISIN_POOL: [&str; 12] = [
    "CZ0003520116",
    "CZ0005112300",
    "CZ0008019106",
    "CZ0008040318",
    "CZ0005135970",
    "CZ0009000121",
    "CZ0005098558",
    "CZ0009093209",
    "CZ0008032620",
    "CZ0009055158",
    "CZ0005131318",
    "CZ0003508335",
];

/// Generates `count` random trades.
///
/// Prices carry two decimal places in `[1.00, 1000.00)`, quantities are whole
/// numbers in `1..=1000`.
pub fn generate_trades<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<TradeRecord> {
    (0..count)
        .map(|_| {
            let direction = if rng.gen_bool(0.5) {
                Direction::Buy
            } else {
                Direction::Sell
            };
            let isin = ISIN_POOL[rng.gen_range(0..ISIN_POOL.len())];
            let quantity = Decimal::from(rng.gen_range(1..=1000i64));
            let price = Decimal::new(rng.gen_range(100..100_000i64), 2);
            TradeRecord::new(direction, isin, quantity, price)
        })
        .collect()
}

/// Like [`generate_trades`], reproducible when a seed is given.
pub fn generate_seeded(count: usize, seed: Option<u64>) -> Vec<TradeRecord> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_trades(count, &mut rng)
}
