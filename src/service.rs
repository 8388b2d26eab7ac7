use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;

use crate::auth::{authorize, Action, AuthContext};
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::payments::ledger::apply_payment;
use crate::payments::{payment_breakdown, AmortizationSchedule};
use crate::state::{ClientRecord, PaymentLedgerEntry};
use crate::types::{ClientId, ClientStatus, LoanTerms, PaymentBreakdown};

/// input for originating a client with a loan
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: ClientStatus,
    pub revenue: Money,
    pub terms: LoanTerms,
}

impl NewClient {
    pub fn new(name: impl Into<String>, terms: LoanTerms) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            address: None,
            status: ClientStatus::Active,
            revenue: Money::ZERO,
            terms,
        }
    }
}

/// servicing orchestrator: authorization check, storage round trip, payment
/// allocation, and the event trail
///
/// Mutating operations take `&mut self`; callers must serialize payments per
/// client, otherwise two payments reading the same outstanding balance can
/// lose an update. The service itself adds no locking.
pub struct LoanService<S> {
    store: S,
    events: EventStore,
}

impl<S: crate::storage::ClientStore> LoanService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            events: EventStore::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// originate a client; the outstanding balance opens at the principal
    pub fn create_client(
        &mut self,
        ctx: &AuthContext,
        input: NewClient,
        time_provider: &SafeTimeProvider,
    ) -> Result<ClientRecord> {
        authorize(ctx, Action::ManageClients)?;

        let now = time_provider.now();
        let mut record = ClientRecord::new(input.name, input.terms, now);
        record.email = input.email;
        record.phone = input.phone;
        record.address = input.address;
        record.status = input.status;
        record.revenue = input.revenue;

        self.store.save_client(&record)?;

        self.events.emit(Event::ClientCreated {
            client_id: record.client_id,
            name: record.name.clone(),
            principal: record.loan.terms.principal,
            timestamp: now,
        });

        Ok(record)
    }

    pub fn client(&self, ctx: &AuthContext, client_id: ClientId) -> Result<ClientRecord> {
        authorize(ctx, Action::ViewClients)?;
        self.store.load_client(client_id)
    }

    pub fn clients(&self, ctx: &AuthContext) -> Result<Vec<ClientRecord>> {
        authorize(ctx, Action::ViewClients)?;
        self.store.list_clients()
    }

    /// replace a client's stored record
    pub fn update_client(
        &mut self,
        ctx: &AuthContext,
        record: &ClientRecord,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        authorize(ctx, Action::ManageClients)?;

        // reject updates to unknown clients rather than upserting
        self.store.load_client(record.client_id)?;
        self.store.save_client(record)?;

        self.events.emit(Event::ClientUpdated {
            client_id: record.client_id,
            timestamp: time_provider.now(),
        });

        Ok(())
    }

    pub fn delete_client(
        &mut self,
        ctx: &AuthContext,
        client_id: ClientId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        authorize(ctx, Action::ManageClients)?;
        self.store.delete_client(client_id)?;

        self.events.emit(Event::ClientDeleted {
            client_id,
            timestamp: time_provider.now(),
        });

        Ok(())
    }

    /// record a real-world payment against a client's outstanding balance
    ///
    /// The canonical state transition: allocate interest-first, persist the
    /// updated balance, then append the ledger entry. The two storage calls
    /// are not transactional (see [`crate::storage::ClientStore`]). Uses the
    /// caller-supplied payment date, or the provider's current time if none.
    pub fn record_payment(
        &mut self,
        ctx: &AuthContext,
        client_id: ClientId,
        amount: Money,
        payment_date: Option<DateTime<Utc>>,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentLedgerEntry> {
        authorize(ctx, Action::RecordPayment)?;

        let mut record = self.store.load_client(client_id)?;
        let date = payment_date.unwrap_or_else(|| time_provider.now());

        let entry = apply_payment(&mut record.loan, amount, date).map_err(|e| match e {
            LedgerError::LoanAlreadyPaidOff { .. } => LedgerError::LoanAlreadyPaidOff {
                client_id: Some(client_id),
            },
            other => other,
        })?;

        self.store.save_client(&record)?;
        self.store.append_ledger_entry(client_id, &entry)?;

        self.events.emit(Event::PaymentRecorded {
            client_id,
            amount,
            applied_to_interest: entry.interest_paid,
            applied_to_principal: entry.principal_paid,
            remaining_balance: entry.remaining_balance,
            timestamp: date,
        });

        if record.loan.is_paid_off() {
            self.events.emit(Event::LoanPaidOff {
                client_id,
                final_payment: amount,
                timestamp: date,
            });
        }

        Ok(entry)
    }

    /// projected schedule from the client's original loan terms; ignores
    /// realized payment history by design
    pub fn amortization_schedule(
        &self,
        ctx: &AuthContext,
        client_id: ClientId,
    ) -> Result<AmortizationSchedule> {
        authorize(ctx, Action::ViewClients)?;
        let record = self.store.load_client(client_id)?;
        Ok(AmortizationSchedule::generate(&record.loan.terms))
    }

    /// theoretical split of the client's next payment, re-amortized from the
    /// live balance over the remaining term
    pub fn next_payment_breakdown(
        &self,
        ctx: &AuthContext,
        client_id: ClientId,
    ) -> Result<PaymentBreakdown> {
        authorize(ctx, Action::ViewClients)?;
        let record = self.store.load_client(client_id)?;
        Ok(payment_breakdown(
            record.loan.current_outstanding_balance,
            record.loan.terms.annual_rate,
            record.loan.remaining_term_months(),
        ))
    }

    /// drain events emitted since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::decimal::Rate;
    use crate::storage::InMemoryClientStore;
    use crate::types::LoanStatus;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn admin() -> AuthContext {
        AuthContext::new(Uuid::new_v4(), Role::Admin)
    }

    fn analyst() -> AuthContext {
        AuthContext::new(Uuid::new_v4(), Role::Analyst)
    }

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn standard_terms() -> LoanTerms {
        LoanTerms::new(Money::from_major(120_000), Rate::from_percentage(dec!(12)), 12)
    }

    fn service_with_client() -> (LoanService<InMemoryClientStore>, ClientId) {
        let mut service = LoanService::new(InMemoryClientStore::new());
        let record = service
            .create_client(
                &admin(),
                NewClient::new("Asha Traders", standard_terms()),
                &test_time(),
            )
            .unwrap();
        service.take_events();
        (service, record.client_id)
    }

    #[test]
    fn test_create_client_opens_balance_at_principal() {
        let mut service = LoanService::new(InMemoryClientStore::new());
        let time = test_time();

        let mut input = NewClient::new("Asha Traders", standard_terms());
        input.email = Some("asha@example.com".to_string());

        let record = service.create_client(&admin(), input, &time).unwrap();

        assert_eq!(record.loan.current_outstanding_balance, Money::from_major(120_000));
        assert_eq!(record.email.as_deref(), Some("asha@example.com"));

        let events = service.take_events();
        assert!(matches!(events[0], Event::ClientCreated { .. }));

        let loaded = service.client(&admin(), record.client_id).unwrap();
        assert_eq!(loaded.name, "Asha Traders");
    }

    #[test]
    fn test_record_payment_persists_state_and_entry() {
        let (mut service, client_id) = service_with_client();
        let time = test_time();

        let payment_date = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let entry = service
            .record_payment(
                &admin(),
                client_id,
                Money::from_decimal(dec!(10661.85)),
                Some(payment_date),
                &time,
            )
            .unwrap();

        assert_eq!(entry.interest_paid, Money::from_decimal(dec!(1200.00)));
        assert_eq!(entry.principal_paid, Money::from_decimal(dec!(9461.85)));
        assert_eq!(entry.period_month, 2);
        assert_eq!(entry.period_year, 2024);

        let loaded = service.client(&admin(), client_id).unwrap();
        assert_eq!(
            loaded.loan.current_outstanding_balance,
            Money::from_decimal(dec!(110538.15))
        );
        assert_eq!(loaded.loan.payment_count, 1);
        assert_eq!(loaded.loan.history.len(), 1);
        assert_eq!(loaded.loan.history[0], entry);
        assert_eq!(loaded.loan.total_interest_paid(), Money::from_decimal(dec!(1200.00)));
        assert_eq!(loaded.loan.total_principal_paid(), Money::from_decimal(dec!(9461.85)));
        assert_eq!(loaded.loan.last_payment(), Some(&entry));

        let events = service.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::PaymentRecorded { .. }));
    }

    #[test]
    fn test_record_payment_defaults_to_provider_time() {
        let (mut service, client_id) = service_with_client();
        let time = test_time();

        let entry = service
            .record_payment(&admin(), client_id, Money::from_major(2000), None, &time)
            .unwrap();

        assert_eq!(entry.payment_date, time.now());
        assert_eq!(entry.period_month, 1);
        assert_eq!(entry.period_year, 2024);
    }

    #[test]
    fn test_payoff_emits_terminal_event_and_rejects_further_payments() {
        let mut service = LoanService::new(InMemoryClientStore::new());
        let time = test_time();
        let record = service
            .create_client(
                &admin(),
                NewClient::new(
                    "Short Loan",
                    LoanTerms::new(Money::from_major(1000), Rate::ZERO, 2),
                ),
                &time,
            )
            .unwrap();
        service.take_events();

        service
            .record_payment(&admin(), record.client_id, Money::from_major(500), None, &time)
            .unwrap();
        service
            .record_payment(&admin(), record.client_id, Money::from_major(500), None, &time)
            .unwrap();

        let loaded = service.client(&admin(), record.client_id).unwrap();
        assert_eq!(loaded.loan.status(), LoanStatus::PaidOff);

        let events = service.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::LoanPaidOff { .. })));

        let err = service
            .record_payment(&admin(), record.client_id, Money::from_major(100), None, &time)
            .unwrap_err();
        match err {
            LedgerError::LoanAlreadyPaidOff { client_id } => {
                assert_eq!(client_id, Some(record.client_id));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejected_payment_leaves_no_trace() {
        let (mut service, client_id) = service_with_client();
        let time = test_time();

        let err = service
            .record_payment(&admin(), client_id, Money::ZERO, None, &time)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPaymentAmount { .. }));

        let loaded = service.client(&admin(), client_id).unwrap();
        assert_eq!(loaded.loan.current_outstanding_balance, Money::from_major(120_000));
        assert!(loaded.loan.history.is_empty());
        assert!(service.take_events().is_empty());
    }

    #[test]
    fn test_analyst_can_read_but_not_mutate() {
        let (mut service, client_id) = service_with_client();
        let time = test_time();

        assert!(service.client(&analyst(), client_id).is_ok());
        assert!(service.clients(&analyst()).is_ok());
        assert!(service.amortization_schedule(&analyst(), client_id).is_ok());

        let err = service
            .record_payment(&analyst(), client_id, Money::from_major(100), None, &time)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotAuthorized { .. }));

        let err = service
            .delete_client(&analyst(), client_id, &time)
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotAuthorized { .. }));
    }

    #[test]
    fn test_unknown_client_is_not_found() {
        let (mut service, _) = service_with_client();
        let time = test_time();

        let err = service
            .record_payment(&admin(), Uuid::new_v4(), Money::from_major(100), None, &time)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ClientNotFound { .. }));
    }

    #[test]
    fn test_update_requires_existing_client() {
        let (mut service, client_id) = service_with_client();
        let time = test_time();

        let mut record = service.client(&admin(), client_id).unwrap();
        record.phone = Some("+91 98765 43210".to_string());
        service.update_client(&admin(), &record, &time).unwrap();

        let loaded = service.client(&admin(), client_id).unwrap();
        assert_eq!(loaded.phone.as_deref(), Some("+91 98765 43210"));

        record.client_id = Uuid::new_v4();
        let err = service.update_client(&admin(), &record, &time).unwrap_err();
        assert!(matches!(err, LedgerError::ClientNotFound { .. }));
    }

    #[test]
    fn test_schedule_projection_ignores_ledger() {
        let (mut service, client_id) = service_with_client();
        let time = test_time();

        let before = service.amortization_schedule(&admin(), client_id).unwrap();
        service
            .record_payment(&admin(), client_id, Money::from_major(5000), None, &time)
            .unwrap();
        let after = service.amortization_schedule(&admin(), client_id).unwrap();

        // the projection is regenerated from original terms every time
        assert_eq!(before.rows, after.rows);
        assert_eq!(after.rows.len(), 12);
    }

    #[test]
    fn test_next_payment_breakdown_tracks_live_balance() {
        let (mut service, client_id) = service_with_client();
        let time = test_time();

        let first = service.next_payment_breakdown(&admin(), client_id).unwrap();
        assert_eq!(first.monthly_payment, Money::from_decimal(dec!(10661.85)));
        assert_eq!(first.interest_portion, Money::from_decimal(dec!(1200.00)));

        service
            .record_payment(
                &admin(),
                client_id,
                Money::from_decimal(dec!(10661.85)),
                None,
                &time,
            )
            .unwrap();

        // re-amortized over 11 months from the reduced balance of 110538.15;
        // paying the minor-unit-rounded installment leaves a fraction of a
        // cent more outstanding than the exact path, so the fresh installment
        // lands one cent above the original one
        let second = service.next_payment_breakdown(&admin(), client_id).unwrap();
        assert_eq!(second.monthly_payment, Money::from_decimal(dec!(10661.86)));
        assert_eq!(second.interest_portion, Money::from_decimal(dec!(1105.38)));
        assert_eq!(second.principal_portion, Money::from_decimal(dec!(9556.47)));
        assert!(
            (second.monthly_payment - first.monthly_payment).abs()
                <= Money::from_decimal(dec!(0.01))
        );
    }
}
