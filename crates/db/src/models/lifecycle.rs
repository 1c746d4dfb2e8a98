//! Snapshot of the lifecycle population for one pass.

use roster_core::lifecycle::{
    Account, AccountFacts, AccountFactsProvider, FactsIndex, LifecycleError,
};

/// Accounts holding the base role, with their roles and enrollment ends.
///
/// Loaded in full before a pass starts, so the pass itself never blocks.
#[derive(Debug, Clone, Default)]
pub struct LifecycleSnapshot {
    pub accounts: Vec<Account>,
    pub facts: FactsIndex,
}

impl LifecycleSnapshot {
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl AccountFactsProvider for LifecycleSnapshot {
    fn facts_for(&self, account: &Account) -> Result<AccountFacts, LifecycleError> {
        self.facts.facts_for(account)
    }
}
