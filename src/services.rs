pub mod auth;
pub mod catalog_service;
pub mod crm_service;
pub mod marketplace_service;
pub mod object_storage;
pub mod sales_service;
pub mod tenancy_service;
