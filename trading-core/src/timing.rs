use log::info;
use std::time::Instant;

/// Runs `action` and logs how long it took under `label`.
pub fn measure<T>(label: &str, action: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = action();
    info!("{} elapsed {:?}", label, start.elapsed());
    result
}
