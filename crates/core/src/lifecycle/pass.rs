//! Batch driver: one evaluation pass over an account snapshot.
//!
//! The driver pulls roles and enrollments for each account from an
//! [`AccountFactsProvider`], evaluates it, and yields only the decisions
//! that require an action. Accounts whose facts cannot be loaded are skipped
//! and recorded; they never abort the pass.

use std::borrow::Borrow;
use std::collections::HashMap;

use super::config::LifecycleConfig;
use super::enrollment::EnrollmentFact;
use super::rules::{evaluate, Decision};
use super::{Account, LifecycleError, RoleSet};
use crate::types::{DbId, Timestamp};

/// Everything the evaluator needs to know about one account besides the
/// account row itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFacts {
    pub roles: RoleSet,
    pub enrollments: Vec<EnrollmentFact>,
}

/// Source of per-account roles and enrollments.
///
/// Implementations return a complete snapshot synchronously. Anything that
/// has to block or do I/O should happen before the pass starts.
pub trait AccountFactsProvider {
    fn facts_for(&self, account: &Account) -> Result<AccountFacts, LifecycleError>;
}

impl<F> AccountFactsProvider for F
where
    F: Fn(&Account) -> Result<AccountFacts, LifecycleError>,
{
    fn facts_for(&self, account: &Account) -> Result<AccountFacts, LifecycleError> {
        self(account)
    }
}

/// In-memory provider keyed by account ID.
///
/// Accounts must be registered with [`FactsIndex::insert_account`] (or
/// implicitly through [`FactsIndex::add_role`] / [`FactsIndex::add_enrollment`]);
/// an unregistered account is reported as [`LifecycleError::DataUnavailable`].
#[derive(Debug, Clone, Default)]
pub struct FactsIndex {
    facts: HashMap<DbId, AccountFacts>,
}

impl FactsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with no roles and no enrollments yet.
    pub fn insert_account(&mut self, account_id: DbId) {
        self.facts.entry(account_id).or_default();
    }

    pub fn add_role(&mut self, account_id: DbId, role: impl Into<String>) {
        self.facts
            .entry(account_id)
            .or_default()
            .roles
            .insert(role.into());
    }

    pub fn add_enrollment(&mut self, fact: EnrollmentFact) {
        self.facts
            .entry(fact.account_id)
            .or_default()
            .enrollments
            .push(fact);
    }

    pub fn get(&self, account_id: DbId) -> Option<&AccountFacts> {
        self.facts.get(&account_id)
    }
}

impl AccountFactsProvider for FactsIndex {
    fn facts_for(&self, account: &Account) -> Result<AccountFacts, LifecycleError> {
        self.get(account.id)
            .cloned()
            .ok_or_else(|| LifecycleError::DataUnavailable {
                account_id: account.id,
                reason: "no roles or enrollments loaded".to_string(),
            })
    }
}

/// Lazy, single-use sequence of actionable decisions.
///
/// Decisions come out in the order of the input accounts. Once exhausted,
/// [`LifecyclePass::scanned`] and [`LifecyclePass::skipped`] describe what
/// the pass looked at.
pub struct LifecyclePass<'a, I, P: ?Sized> {
    accounts: I,
    provider: &'a P,
    now: Timestamp,
    config: &'a LifecycleConfig,
    scanned: usize,
    skipped: Vec<LifecycleError>,
}

impl<'a, I, P: ?Sized> LifecyclePass<'a, I, P> {
    /// Accounts evaluated or skipped so far (accounts already flagged
    /// deleted are not counted).
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Accounts skipped because their facts were unavailable.
    pub fn skipped(&self) -> &[LifecycleError] {
        &self.skipped
    }
}

impl<I, P> Iterator for LifecyclePass<'_, I, P>
where
    I: Iterator,
    I::Item: Borrow<Account>,
    P: AccountFactsProvider + ?Sized,
{
    type Item = Decision;

    fn next(&mut self) -> Option<Decision> {
        loop {
            let item = self.accounts.next()?;
            let account: &Account = item.borrow();

            if account.deleted {
                tracing::trace!(account_id = account.id, "Skipping deleted account");
                continue;
            }
            self.scanned += 1;

            let facts = match self.provider.facts_for(account) {
                Ok(facts) => facts,
                Err(e) => {
                    tracing::warn!(account_id = account.id, error = %e, "Skipping account");
                    self.skipped.push(e);
                    continue;
                }
            };

            let decision = evaluate(
                account,
                &facts.roles,
                &facts.enrollments,
                self.now,
                self.config,
            );

            if decision.is_actionable() {
                tracing::debug!(
                    account_id = account.id,
                    action = %decision.action,
                    rules = ?decision.rules,
                    "Lifecycle decision"
                );
                return Some(decision);
            }
        }
    }
}

/// Start a pass over `accounts`.
///
/// Nothing is evaluated until the returned iterator is polled. The pass
/// takes ownership of the account iterator, so a fresh snapshot is needed
/// for every run.
pub fn run_pass<'a, A, P>(
    accounts: A,
    provider: &'a P,
    now: Timestamp,
    config: &'a LifecycleConfig,
) -> LifecyclePass<'a, A::IntoIter, P>
where
    A: IntoIterator,
    A::Item: Borrow<Account>,
    P: AccountFactsProvider + ?Sized,
{
    LifecyclePass {
        accounts: accounts.into_iter(),
        provider,
        now,
        config,
        scanned: 0,
        skipped: Vec::new(),
    }
}
