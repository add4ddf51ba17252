pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};
pub mod tenancy_repo;
pub use tenancy_repo::{PgTenantRepository, TenantRepository};
pub mod marketplace_repo;
pub use marketplace_repo::{MarketplaceRepository, PgMarketplaceRepository};
pub mod catalog_repo;
pub use catalog_repo::{CatalogRepository, PgCatalogRepository};
pub mod sales_repo;
pub use sales_repo::{PgSalesRepository, SalesRepository};
pub mod crm_repo;
pub use crm_repo::{CustomerRepository, PgCustomerRepository};
