use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use trading::{Operation, Param, SinkError, TransactionalSink};

/// Wraps a sink and makes some of its attempts fail.
///
/// Two failure sources are supported and may be combined:
/// - a per-statement failure probability, drawn from a seedable RNG;
/// - a script failing the first `k` attempts of a named transaction. A
///   scripted attempt fails on its first statement, or on commit when the
///   transaction carries no statements.
pub struct FaultInjectingSink<S> {
    inner: S,
    failure_rate: f64,
    rng: StdRng,
    scripted: HashMap<String, u32>,
    current: Option<String>,
    doomed: bool,
    injected: usize,
}

impl<S: TransactionalSink> FaultInjectingSink<S> {
    /// Pass-through wrapper with no failures configured.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failure_rate: 0.0,
            rng: StdRng::from_entropy(),
            scripted: HashMap::new(),
            current: None,
            doomed: false,
            injected: 0,
        }
    }

    /// Fails each statement with probability `failure_rate` (clamped to
    /// `[0, 1]`). A seed makes the failure sequence reproducible.
    pub fn with_random_failures(mut self, failure_rate: f64, seed: Option<u64>) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self.rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self
    }

    /// Fails the first `attempts` attempts of transaction `name`.
    pub fn fail_attempts(mut self, name: impl Into<String>, attempts: u32) -> Self {
        self.scripted.insert(name.into(), attempts);
        self
    }

    /// Fails every attempt of transaction `name`.
    pub fn fail_always(self, name: impl Into<String>) -> Self {
        self.fail_attempts(name, u32::MAX)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Number of failures injected so far.
    pub fn injected_failures(&self) -> usize {
        self.injected
    }

    fn inject(&mut self, reason: &str) -> SinkError {
        self.injected += 1;
        let transaction = self.current.clone().unwrap_or_default();
        debug!("Injecting failure into transaction {}: {}", transaction, reason);
        SinkError::Rejected {
            transaction,
            reason: reason.to_string(),
        }
    }

    fn close(&mut self) {
        self.current = None;
        self.doomed = false;
    }
}

impl<S: TransactionalSink> TransactionalSink for FaultInjectingSink<S> {
    fn begin_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        self.inner.begin_transaction(name)?;
        self.current = Some(name.to_string());
        self.doomed = match self.scripted.get_mut(name) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };
        Ok(())
    }

    fn process(
        &mut self,
        operation: Operation,
        statement: &str,
        params: &[Param],
    ) -> Result<(), SinkError> {
        if self.doomed {
            return Err(self.inject("scripted failure"));
        }
        if self.failure_rate > 0.0 && self.rng.gen_bool(self.failure_rate) {
            return Err(self.inject("random failure"));
        }
        self.inner.process(operation, statement, params)
    }

    fn commit_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        if self.doomed {
            return Err(self.inject("scripted commit failure"));
        }
        self.inner.commit_transaction(name)?;
        self.close();
        Ok(())
    }

    fn rollback_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        self.close();
        self.inner.rollback_transaction(name)
    }
}
