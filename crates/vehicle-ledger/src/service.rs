//! The caller-facing vehicle ledger service.
//!
//! [`VehicleLedger`] bundles one [`RecordRepository`] per record kind over a
//! shared store handle. It is constructed explicitly; there is no global
//! instance.
//!
//! | Kind | Write | Read | History (JSON) | Delete |
//! |------|-------|------|----------------|--------|
//! | Registration | [`set_reg_data`](VehicleLedger::set_reg_data) | [`get_reg_data`](VehicleLedger::get_reg_data) | [`get_reg_data_history`](VehicleLedger::get_reg_data_history) | [`delete_reg_data`](VehicleLedger::delete_reg_data) |
//! | Insurance | [`set_insurance_data`](VehicleLedger::set_insurance_data) | [`get_insurance_data`](VehicleLedger::get_insurance_data) | [`get_insurance_data_history`](VehicleLedger::get_insurance_data_history) | [`delete_insurance_data`](VehicleLedger::delete_insurance_data) |
//! | Service | [`set_service_data`](VehicleLedger::set_service_data) | [`get_service_data`](VehicleLedger::get_service_data) | [`get_service_data_history`](VehicleLedger::get_service_data_history) | [`delete_service_data`](VehicleLedger::delete_service_data) |

use std::sync::Arc;

use vehicle_ledger_storage::{TxId, VersionedStore};

use crate::{
    codec::Record,
    config::VehicleLedgerConfig,
    error::{RecordError, RecordResult},
    history::{HistoryEntry, render_history},
    records::{InsuranceRecord, RegistrationRecord, ServiceRecord},
    repository::RecordRepository,
};

/// Registration, insurance and service records over one ledger.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use vehicle_ledger::VehicleLedger;
/// use vehicle_ledger_storage::MemoryLedger;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let ledger = VehicleLedger::new(Arc::new(MemoryLedger::new()));
///
/// ledger.set_reg_data("REG1", "CH1", "EN1", "01-2020").await.unwrap();
/// let record = ledger.get_reg_data("REG1").await.unwrap();
/// assert_eq!(record.engine_number, "EN1");
///
/// let history = ledger.get_reg_data_history("REG1").await.unwrap();
/// assert!(history.contains(r#""IsDelete":"false""#));
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct VehicleLedger {
    registrations: RecordRepository<RegistrationRecord>,
    insurance: RecordRepository<InsuranceRecord>,
    services: RecordRepository<ServiceRecord>,
    config: VehicleLedgerConfig,
}

impl VehicleLedger {
    /// Creates a service over `store` with [`VehicleLedgerConfig::default`].
    #[must_use]
    pub fn new(store: Arc<dyn VersionedStore>) -> Self {
        Self::with_config(store, VehicleLedgerConfig::default())
    }

    /// Creates a service over `store` with the given configuration.
    #[must_use]
    pub fn with_config(store: Arc<dyn VersionedStore>, config: VehicleLedgerConfig) -> Self {
        Self {
            registrations: RecordRepository::new(Arc::clone(&store)),
            insurance: RecordRepository::new(Arc::clone(&store)),
            services: RecordRepository::new(store),
            config,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &VehicleLedgerConfig {
        &self.config
    }

    /// Registration repository.
    #[must_use]
    pub fn registrations(&self) -> &RecordRepository<RegistrationRecord> {
        &self.registrations
    }

    /// Insurance repository.
    #[must_use]
    pub fn insurance(&self) -> &RecordRepository<InsuranceRecord> {
        &self.insurance
    }

    /// Service repository.
    #[must_use]
    pub fn services(&self) -> &RecordRepository<ServiceRecord> {
        &self.services
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Records registration facts for `reg_number`.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::set`].
    pub async fn set_reg_data(
        &self,
        reg_number: impl Into<String>,
        chassis_number: impl Into<String>,
        engine_number: impl Into<String>,
        month_year_of_mfg: impl Into<String>,
    ) -> RecordResult<TxId> {
        let record = RegistrationRecord::builder()
            .reg_number(reg_number)
            .chassis_number(chassis_number)
            .engine_number(engine_number)
            .month_year_of_mfg(month_year_of_mfg)
            .build();
        self.registrations.set(&record).await
    }

    /// Latest registration record.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::get`].
    pub async fn get_reg_data(&self, reg_number: &str) -> RecordResult<RegistrationRecord> {
        self.registrations.get(reg_number).await
    }

    /// Registration history as a JSON array.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::history`].
    pub async fn get_reg_data_history(&self, reg_number: &str) -> RecordResult<String> {
        let entries = self.registrations.history(reg_number).await?;
        self.render::<RegistrationRecord>(reg_number, &entries)
    }

    /// Registration history as typed entries.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::history`].
    pub async fn registration_history(&self, reg_number: &str) -> RecordResult<Vec<HistoryEntry>> {
        self.registrations.history(reg_number).await
    }

    /// Tombstones the registration record.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::delete`].
    pub async fn delete_reg_data(&self, reg_number: &str) -> RecordResult<TxId> {
        self.registrations.delete(reg_number).await
    }

    // ------------------------------------------------------------------
    // Insurance
    // ------------------------------------------------------------------

    /// Records an insurance policy under its registration number.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::set`].
    pub async fn set_insurance_data(&self, record: &InsuranceRecord) -> RecordResult<TxId> {
        self.insurance.set(record).await
    }

    /// Latest insurance record.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::get`].
    pub async fn get_insurance_data(&self, reg_number: &str) -> RecordResult<InsuranceRecord> {
        self.insurance.get(reg_number).await
    }

    /// Insurance history as a JSON array.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::history`].
    pub async fn get_insurance_data_history(&self, reg_number: &str) -> RecordResult<String> {
        let entries = self.insurance.history(reg_number).await?;
        self.render::<InsuranceRecord>(reg_number, &entries)
    }

    /// Insurance history as typed entries.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::history`].
    pub async fn insurance_history(&self, reg_number: &str) -> RecordResult<Vec<HistoryEntry>> {
        self.insurance.history(reg_number).await
    }

    /// Tombstones the insurance record.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::delete`].
    pub async fn delete_insurance_data(&self, reg_number: &str) -> RecordResult<TxId> {
        self.insurance.delete(reg_number).await
    }

    // ------------------------------------------------------------------
    // Service
    // ------------------------------------------------------------------

    /// Records a service visit for `reg_number`.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::set`].
    pub async fn set_service_data(
        &self,
        reg_number: impl Into<String>,
        chassis_number: impl Into<String>,
        engine_number: impl Into<String>,
        month_year_of_mfg: impl Into<String>,
        service_details: impl Into<String>,
    ) -> RecordResult<TxId> {
        let record = ServiceRecord::builder()
            .reg_number(reg_number)
            .chassis_number(chassis_number)
            .engine_number(engine_number)
            .month_year_of_mfg(month_year_of_mfg)
            .service_details(service_details)
            .build();
        self.services.set(&record).await
    }

    /// Latest service record.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::get`].
    pub async fn get_service_data(&self, reg_number: &str) -> RecordResult<ServiceRecord> {
        self.services.get(reg_number).await
    }

    /// Service history as a JSON array.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::history`].
    pub async fn get_service_data_history(&self, reg_number: &str) -> RecordResult<String> {
        let entries = self.services.history(reg_number).await?;
        self.render::<ServiceRecord>(reg_number, &entries)
    }

    /// Service history as typed entries.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::history`].
    pub async fn service_history(&self, reg_number: &str) -> RecordResult<Vec<HistoryEntry>> {
        self.services.history(reg_number).await
    }

    /// Tombstones the service record.
    ///
    /// # Errors
    ///
    /// See [`RecordRepository::delete`].
    pub async fn delete_service_data(&self, reg_number: &str) -> RecordResult<TxId> {
        self.services.delete(reg_number).await
    }

    fn render<R: Record>(&self, reg_number: &str, entries: &[HistoryEntry]) -> RecordResult<String> {
        let json = render_history(entries, self.config.delete_flag())
            .map_err(|source| RecordError::Encoding { kind: R::KIND, source })?;

        if self.config.log_history_payloads() {
            tracing::debug!(kind = R::KIND.as_str(), id = reg_number, history = %json, "history rendered");
        }
        Ok(json)
    }
}
