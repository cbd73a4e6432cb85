//! PostgreSQL adapter implementations of the persistence ports.

pub mod event_directory;
pub mod ledger_store;
pub mod payment_repository;
pub mod registration_repository;
pub mod user_directory;

pub use event_directory::PostgresEventDirectory;
pub use ledger_store::PostgresLedgerStore;
pub use payment_repository::PostgresPaymentRepository;
pub use registration_repository::PostgresRegistrationRepository;
pub use user_directory::PostgresUserDirectory;
