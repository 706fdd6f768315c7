pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod merchant_repo;
pub use merchant_repo::MerchantRepository;
pub mod transaction_repo;
pub use transaction_repo::TransactionRepository;
pub mod voucher_repo;
pub use voucher_repo::VoucherRepository;
