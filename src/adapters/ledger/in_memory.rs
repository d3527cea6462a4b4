//! In-memory intervention ledger for tests and single-process deployments.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use crate::domain::foundation::{CheckInId, DomainError, Timestamp, UserId};
use crate::ports::{InterventionLedger, LedgerEntry};

#[derive(Debug, Default)]
struct UserLedger {
    entry: LedgerEntry,
    recorded: HashSet<CheckInId>,
}

/// Ledger whose increments are serialized by a single mutex.
#[derive(Debug, Default)]
pub struct InMemoryInterventionLedger {
    users: Mutex<HashMap<UserId, UserLedger>>,
}

impl InMemoryInterventionLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterventionLedger for InMemoryInterventionLedger {
    async fn record_crisis(
        &self,
        user_id: &UserId,
        checkin_id: &CheckInId,
        at: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        let ledger = users.entry(user_id.clone()).or_default();
        if ledger.recorded.insert(checkin_id.clone()) {
            ledger.entry.crisis_intervention_count += 1;
            ledger.entry.last_crisis_timestamp = Some(at);
        }
        Ok(ledger.entry.crisis_intervention_count)
    }

    async fn snapshot(&self, user_id: &UserId) -> Result<LedgerEntry, DomainError> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(user_id).map(|l| l.entry).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn user() -> UserId {
        UserId::new("veteran-1").unwrap()
    }

    #[tokio::test]
    async fn replays_of_the_same_checkin_do_not_double_count() {
        let ledger = InMemoryInterventionLedger::new();
        let checkin = CheckInId::parse("c-1").unwrap();
        let first = Timestamp::now();

        assert_eq!(ledger.record_crisis(&user(), &checkin, first).await.unwrap(), 1);
        assert_eq!(
            ledger
                .record_crisis(&user(), &checkin, first.plus_minutes(5))
                .await
                .unwrap(),
            1
        );

        let snapshot = ledger.snapshot(&user()).await.unwrap();
        assert_eq!(snapshot.crisis_intervention_count, 1);
        assert_eq!(snapshot.last_crisis_timestamp, Some(first));
    }

    #[tokio::test]
    async fn concurrent_crises_are_all_counted() {
        let ledger = Arc::new(InMemoryInterventionLedger::new());
        let mut handles = Vec::new();
        for i in 0..25 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let checkin = CheckInId::parse(format!("c-{}", i)).unwrap();
                ledger.record_crisis(&user(), &checkin, Timestamp::now()).await.unwrap()
            }));
        }
        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap());
        }
        counts.sort_unstable();

        assert_eq!(counts, (1..=25).collect::<Vec<u64>>());
        assert_eq!(ledger.snapshot(&user()).await.unwrap().crisis_intervention_count, 25);
    }

    #[tokio::test]
    async fn unknown_user_has_empty_entry() {
        let ledger = InMemoryInterventionLedger::new();
        assert_eq!(ledger.snapshot(&user()).await.unwrap(), LedgerEntry::default());
    }
}
