pub mod hash_service;
pub mod journal_service;
pub mod period_service;
pub mod posting_service;

pub use hash_service::HashService;
pub use journal_service::JournalService;
pub use period_service::PeriodService;
pub use posting_service::PostingService;
