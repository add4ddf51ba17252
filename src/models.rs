pub mod auth;
pub mod catalog;
pub mod crm;
pub mod marketplace;
pub mod sales;
pub mod tenancy;
