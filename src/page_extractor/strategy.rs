//! Ordered, first-match-wins extraction strategies
//!
//! A `Cascade` runs its strategies in the order they were added and stops at
//! the first one that produces at least one result. Each strategy is a plain
//! function, so it can be called and tested on its own.

use tracing::debug;

pub type StrategyFn<'a, C, T> = fn(&'a C) -> Vec<T>;

pub struct Cascade<'a, C, T> {
    label: &'static str,
    strategies: Vec<(&'static str, StrategyFn<'a, C, T>)>,
}

/// Which strategy won and what it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome<T> {
    pub strategy: Option<&'static str>,
    pub items: Vec<T>,
}

impl<'a, C, T> Cascade<'a, C, T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            strategies: Vec::new(),
        }
    }

    #[must_use]
    pub fn then(mut self, name: &'static str, strategy: StrategyFn<'a, C, T>) -> Self {
        self.strategies.push((name, strategy));
        self
    }

    /// Strategy names in precedence order
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|(name, _)| *name).collect()
    }

    pub fn run(&self, input: &'a C) -> CascadeOutcome<T> {
        for (name, strategy) in &self.strategies {
            let items = strategy(input);
            if !items.is_empty() {
                debug!("{}: strategy '{}' produced {} results", self.label, name, items.len());
                return CascadeOutcome {
                    strategy: Some(name),
                    items,
                };
            }
            debug!("{}: strategy '{}' found nothing", self.label, name);
        }

        CascadeOutcome {
            strategy: None,
            items: Vec::new(),
        }
    }
}
