use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::ClientId;

/// all events emitted by servicing operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // client lifecycle
    ClientCreated {
        client_id: ClientId,
        name: String,
        principal: Money,
        timestamp: DateTime<Utc>,
    },
    ClientUpdated {
        client_id: ClientId,
        timestamp: DateTime<Utc>,
    },
    ClientDeleted {
        client_id: ClientId,
        timestamp: DateTime<Utc>,
    },

    // ledger events
    PaymentRecorded {
        client_id: ClientId,
        amount: Money,
        applied_to_interest: Money,
        applied_to_principal: Money,
        remaining_balance: Money,
        timestamp: DateTime<Utc>,
    },
    LoanPaidOff {
        client_id: ClientId,
        final_payment: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
