// tests/common/mod.rs
//
// In-memory implementations of the repository and storage traits, so services
// and the router can be exercised without Postgres.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;
use tokio::sync::Mutex;
use uuid::Uuid;

use pos_admin::{
    common::error::AppError,
    config::{AppState, Repositories},
    db::{
        CatalogRepository, CustomerRepository, MarketplaceRepository, SalesRepository,
        TenantRepository, UserRepository,
    },
    models::{
        auth::{NewUser, User, UserRole},
        catalog::{apply_stock_delta, Category, CategoryPayload, NewProduct, Product, ProductChanges},
        crm::{Customer, CustomerFields, CustomerStats, CustomerWithStats},
        marketplace::{MarketplaceItem, MarketplaceItemFields, RestockOutcome},
        sales::{
            generate_receipt_number, sale_total, NewSale, Sale, SaleDetail, SaleItem,
            PAYMENT_COMPLETED,
        },
        tenancy::{HardwareSettings, NewTenant, Tenant, TenantInfo},
    },
    services::object_storage::ObjectStorage,
};

pub const TEST_PASSWORD: &str = "secret123";

// =============================================================================
//  IN-MEMORY DATABASE
// =============================================================================

#[derive(Default)]
pub struct Data {
    pub tenants: Vec<Tenant>,
    pub users: Vec<User>,
    pub marketplace: Vec<MarketplaceItem>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub customers: Vec<Customer>,
    pub sales: Vec<Sale>,
    pub sale_items: Vec<SaleItem>,
}

/// One lock over all tables, which makes every repository call atomic.
#[derive(Clone, Default)]
pub struct MemoryDb {
    pub data: Arc<Mutex<Data>>,
}

impl MemoryDb {
    pub fn repositories(&self) -> Repositories {
        Repositories {
            tenants: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
            marketplace: Arc::new(self.clone()),
            catalog: Arc::new(self.clone()),
            sales: Arc::new(self.clone()),
            customers: Arc::new(self.clone()),
        }
    }
}

fn build_tenant(id: Uuid, tenant: &NewTenant) -> Tenant {
    let now = Utc::now();
    Tenant {
        id,
        name: tenant.info.name.clone(),
        email: tenant.info.email.clone(),
        phone: tenant.info.phone.clone(),
        address: tenant.info.address.clone(),
        subdomain: tenant.subdomain.clone(),
        is_active: true,
        is_default: tenant.is_default,
        hardware_settings: Json(HardwareSettings::default()),
        created_at: now,
        updated_at: now,
    }
}

fn build_user(id: Uuid, user: &NewUser) -> User {
    User {
        id,
        tenant_id: user.tenant_id,
        username: user.username.clone(),
        email: user.email.clone(),
        password_hash: user.password_hash.clone(),
        role: user.role,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        phone: user.phone.clone(),
        is_active: true,
        is_superadmin: user.is_superadmin,
        created_at: Utc::now(),
        last_login: None,
    }
}

fn check_user_unique(data: &Data, user: &NewUser) -> Result<(), AppError> {
    if data.users.iter().any(|u| u.email == user.email) {
        return Err(AppError::conflict("This e-mail is already in use."));
    }
    if data.users.iter().any(|u| u.username == user.username) {
        return Err(AppError::conflict("This username is already in use."));
    }
    Ok(())
}

fn check_product_unique(
    data: &Data,
    tenant_id: Uuid,
    name: &str,
    sku: Option<&str>,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    let others = data.products.iter().filter(|p| Some(p.id) != exclude);
    for p in others {
        if p.tenant_id == tenant_id && p.name == name {
            return Err(AppError::conflict("A product with this name already exists."));
        }
        if sku.is_some() && p.sku.as_deref() == sku {
            return Err(AppError::conflict("A product with this SKU already exists."));
        }
    }
    Ok(())
}

fn product_from(tenant_id: Uuid, id: Uuid, product: &NewProduct) -> Product {
    let now = Utc::now();
    Product {
        id,
        tenant_id,
        category_id: product.category_id,
        name: product.name.clone(),
        description: product.description.clone(),
        sku: product.sku.clone(),
        barcode: product.barcode.clone(),
        price: product.price,
        cost_price: product.cost_price,
        stock_quantity: product.stock_quantity,
        stock_alert: product.stock_alert,
        unit: product.unit.clone(),
        carton_quantity: product.carton_quantity,
        is_active: true,
        image_url: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl TenantRepository for MemoryDb {
    async fn create_tenant_with_admin(
        &self,
        tenant_id: Uuid,
        tenant: &NewTenant,
        admin: &NewUser,
    ) -> Result<(Tenant, User), AppError> {
        let mut data = self.data.lock().await;
        if data.tenants.iter().any(|t| t.email == tenant.info.email) {
            return Err(AppError::conflict("A tenant with this email already exists."));
        }
        check_user_unique(&data, admin)?;

        let tenant = build_tenant(tenant_id, tenant);
        let user = build_user(Uuid::new_v4(), admin);
        data.tenants.push(tenant.clone());
        data.users.push(user.clone());
        Ok((tenant, user))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, AppError> {
        let data = self.data.lock().await;
        Ok(data.tenants.iter().find(|t| t.id == id).cloned())
    }

    async fn find_default(&self) -> Result<Option<Tenant>, AppError> {
        let data = self.data.lock().await;
        Ok(data.tenants.iter().find(|t| t.is_default).cloned())
    }

    async fn list(&self) -> Result<Vec<Tenant>, AppError> {
        Ok(self.data.lock().await.tenants.clone())
    }

    async fn update_info(&self, id: Uuid, info: &TenantInfo) -> Result<Option<Tenant>, AppError> {
        let mut data = self.data.lock().await;
        let Some(tenant) = data.tenants.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        tenant.name = info.name.clone();
        tenant.email = info.email.clone();
        tenant.phone = info.phone.clone();
        tenant.address = info.address.clone();
        tenant.updated_at = Utc::now();
        Ok(Some(tenant.clone()))
    }

    async fn update_hardware(
        &self,
        id: Uuid,
        settings: &HardwareSettings,
    ) -> Result<Option<Tenant>, AppError> {
        let mut data = self.data.lock().await;
        let Some(tenant) = data.tenants.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        tenant.hardware_settings = Json(settings.clone());
        Ok(Some(tenant.clone()))
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Option<Tenant>, AppError> {
        let mut data = self.data.lock().await;
        let Some(tenant) = data.tenants.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        tenant.is_active = is_active;
        Ok(Some(tenant.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.data.lock().await;
        let before = data.tenants.len();
        data.tenants.retain(|t| t.id != id);
        if data.tenants.len() == before {
            return Ok(false);
        }
        // cascade
        data.users.retain(|u| u.tenant_id != id);
        data.products.retain(|p| p.tenant_id != id);
        data.categories.retain(|c| c.tenant_id != id);
        data.customers.retain(|c| c.tenant_id != id);
        let sale_ids: Vec<Uuid> = data.sales.iter().filter(|s| s.tenant_id == id).map(|s| s.id).collect();
        data.sales.retain(|s| s.tenant_id != id);
        data.sale_items.retain(|i| !sale_ids.contains(&i.sale_id));
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let data = self.data.lock().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let data = self.data.lock().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn any_superadmin(&self) -> Result<bool, AppError> {
        Ok(self.data.lock().await.users.iter().any(|u| u.is_superadmin))
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, AppError> {
        let mut data = self.data.lock().await;
        check_user_unique(&data, user)?;
        let user = build_user(Uuid::new_v4(), user);
        data.users.push(user.clone());
        Ok(user)
    }

    async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<User>, AppError> {
        let data = self.data.lock().await;
        Ok(data.users.iter().filter(|u| u.tenant_id == tenant_id).cloned().collect())
    }

    async fn record_login(&self, id: Uuid) -> Result<(), AppError> {
        let mut data = self.data.lock().await;
        if let Some(user) = data.users.iter_mut().find(|u| u.id == id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }
}

#[async_trait]
impl MarketplaceRepository for MemoryDb {
    async fn list_available(&self) -> Result<Vec<MarketplaceItem>, AppError> {
        let data = self.data.lock().await;
        let mut items: Vec<MarketplaceItem> =
            data.marketplace.iter().filter(|i| i.stock > 0).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn list_all(&self) -> Result<Vec<MarketplaceItem>, AppError> {
        let mut items = self.data.lock().await.marketplace.clone();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MarketplaceItem>, AppError> {
        let data = self.data.lock().await;
        Ok(data.marketplace.iter().find(|i| i.id == id).cloned())
    }

    async fn find_conflicting(
        &self,
        name: &str,
        sku: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<Option<MarketplaceItem>, AppError> {
        let data = self.data.lock().await;
        Ok(data
            .marketplace
            .iter()
            .filter(|i| Some(i.id) != exclude)
            .find(|i| i.name == name || (sku.is_some() && i.sku.as_deref() == sku))
            .cloned())
    }

    async fn create(
        &self,
        id: Uuid,
        fields: &MarketplaceItemFields,
        image_url: Option<&str>,
    ) -> Result<MarketplaceItem, AppError> {
        let mut data = self.data.lock().await;
        if data.marketplace.iter().any(|i| i.name == fields.name) {
            return Err(AppError::conflict("A marketplace item with this name already exists."));
        }
        let now = Utc::now();
        let item = MarketplaceItem {
            id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            price: fields.price,
            stock: fields.stock,
            sku: fields.sku.clone(),
            image_url: image_url.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        data.marketplace.push(item.clone());
        Ok(item)
    }

    async fn update(
        &self,
        id: Uuid,
        fields: &MarketplaceItemFields,
        image_url: Option<&str>,
    ) -> Result<Option<MarketplaceItem>, AppError> {
        let mut data = self.data.lock().await;
        let Some(item) = data.marketplace.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        item.name = fields.name.clone();
        item.description = fields.description.clone();
        item.price = fields.price;
        item.stock = fields.stock;
        item.sku = fields.sku.clone();
        if let Some(url) = image_url {
            item.image_url = Some(url.to_string());
        }
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.data.lock().await;
        let before = data.marketplace.len();
        data.marketplace.retain(|i| i.id != id);
        Ok(data.marketplace.len() < before)
    }
}

#[async_trait]
impl CatalogRepository for MemoryDb {
    async fn list_products(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        let data = self.data.lock().await;
        Ok(data.products.iter().filter(|p| p.tenant_id == tenant_id).cloned().collect())
    }

    async fn find_product(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Product>, AppError> {
        let data = self.data.lock().await;
        Ok(data
            .products
            .iter()
            .find(|p| p.id == id && p.tenant_id == tenant_id)
            .cloned())
    }

    async fn create_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        product: &NewProduct,
    ) -> Result<Product, AppError> {
        let mut data = self.data.lock().await;
        check_product_unique(&data, tenant_id, &product.name, product.sku.as_deref(), None)?;
        let product = product_from(tenant_id, id, product);
        data.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        let mut data = self.data.lock().await;
        if !data.products.iter().any(|p| p.id == id && p.tenant_id == tenant_id) {
            return Ok(None);
        }
        check_product_unique(&data, tenant_id, &changes.name, changes.sku.as_deref(), Some(id))?;

        let Some(product) = data.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.category_id = changes.category_id;
        product.name = changes.name.clone();
        product.description = changes.description.clone();
        product.sku = changes.sku.clone();
        product.barcode = changes.barcode.clone();
        product.price = changes.price;
        product.cost_price = changes.cost_price;
        product.stock_quantity = changes.stock_quantity;
        product.stock_alert = changes.stock_alert;
        product.unit = changes.unit.clone();
        product.carton_quantity = changes.carton_quantity;
        product.is_active = changes.is_active;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.data.lock().await;
        if !data.products.iter().any(|p| p.id == id && p.tenant_id == tenant_id) {
            return Ok(false);
        }
        if data.sale_items.iter().any(|i| i.product_id == id) {
            return Err(AppError::conflict("The product has sales and cannot be deleted."));
        }
        data.products.retain(|p| p.id != id);
        Ok(true)
    }

    async fn adjust_stock(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<Product>, AppError> {
        let mut data = self.data.lock().await;
        let Some(product) = data
            .products
            .iter_mut()
            .find(|p| p.id == id && p.tenant_id == tenant_id)
        else {
            return Ok(None);
        };
        product.stock_quantity = apply_stock_delta(product.stock_quantity, delta)?;
        Ok(Some(product.clone()))
    }

    async fn restock_from_marketplace(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<(Product, RestockOutcome), AppError> {
        let mut data = self.data.lock().await;
        let item = data
            .marketplace
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or(AppError::NotFound("marketplace item"))?;

        if let Some(product) = data
            .products
            .iter_mut()
            .find(|p| p.tenant_id == tenant_id && p.name == item.name)
        {
            product.stock_quantity = product
                .stock_quantity
                .checked_add(quantity)
                .ok_or_else(|| AppError::invalid("Stock quantity is out of range."))?;
            return Ok((product.clone(), RestockOutcome::Merged));
        }

        let mut clone = NewProduct::cloned_from(&item, quantity);
        if clone.sku.is_some() && data.products.iter().any(|p| p.sku == clone.sku) {
            clone.sku = None;
        }
        let product = product_from(tenant_id, Uuid::new_v4(), &clone);
        data.products.push(product.clone());
        Ok((product, RestockOutcome::Created))
    }

    async fn list_categories(&self, tenant_id: Uuid) -> Result<Vec<Category>, AppError> {
        let data = self.data.lock().await;
        Ok(data.categories.iter().filter(|c| c.tenant_id == tenant_id).cloned().collect())
    }

    async fn find_category(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Category>, AppError> {
        let data = self.data.lock().await;
        Ok(data
            .categories
            .iter()
            .find(|c| c.id == id && c.tenant_id == tenant_id)
            .cloned())
    }

    async fn create_category(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        category: &CategoryPayload,
    ) -> Result<Category, AppError> {
        let mut data = self.data.lock().await;
        if data
            .categories
            .iter()
            .any(|c| c.tenant_id == tenant_id && c.name == category.name)
        {
            return Err(AppError::conflict("A category with this name already exists."));
        }
        let category = Category {
            id,
            tenant_id,
            name: category.name.clone(),
            description: category.description.clone(),
            created_at: Utc::now(),
        };
        data.categories.push(category.clone());
        Ok(category)
    }

    async fn delete_category(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.data.lock().await;
        let before = data.categories.len();
        data.categories.retain(|c| !(c.id == id && c.tenant_id == tenant_id));
        if data.categories.len() == before {
            return Ok(false);
        }
        for product in data.products.iter_mut().filter(|p| p.category_id == Some(id)) {
            product.category_id = None;
        }
        Ok(true)
    }
}

fn sale_items_of(data: &Data, sale_id: Uuid) -> Vec<SaleItem> {
    data.sale_items.iter().filter(|i| i.sale_id == sale_id).cloned().collect()
}

#[async_trait]
impl SalesRepository for MemoryDb {
    async fn create_sale(&self, tenant_id: Uuid, sale: &NewSale) -> Result<SaleDetail, AppError> {
        let mut data = self.data.lock().await;

        if let Some(customer_id) = sale.customer_id {
            if !data.customers.iter().any(|c| c.id == customer_id && c.tenant_id == tenant_id) {
                return Err(AppError::NotFound("customer"));
            }
        }

        // Check every line before touching stock, so a failure changes nothing.
        let sale_id = Uuid::new_v4();
        let mut items = Vec::with_capacity(sale.lines.len());
        for &(product_id, quantity) in &sale.lines {
            let product = data
                .products
                .iter()
                .find(|p| p.id == product_id && p.tenant_id == tenant_id)
                .ok_or(AppError::NotFound("product"))?;
            if product.stock_quantity < quantity {
                return Err(AppError::InsufficientStock {
                    product: product.name.clone(),
                    requested: quantity,
                    available: product.stock_quantity,
                });
            }
            items.push(SaleItem::priced(sale_id, product, quantity));
        }
        let total = sale_total(
            items.iter().map(SaleItem::total_price),
            sale.tax_amount,
            sale.discount_amount,
        )?;

        for &(product_id, quantity) in &sale.lines {
            if let Some(product) = data.products.iter_mut().find(|p| p.id == product_id) {
                product.stock_quantity -= quantity;
            }
        }

        let row = Sale {
            id: sale_id,
            tenant_id,
            customer_id: sale.customer_id,
            user_id: Some(sale.user_id),
            receipt_number: generate_receipt_number(Utc::now()),
            total_amount: total,
            tax_amount: sale.tax_amount,
            discount_amount: sale.discount_amount,
            payment_method: sale.payment_method,
            payment_status: PAYMENT_COMPLETED.to_string(),
            notes: sale.notes.clone(),
            created_at: Utc::now(),
        };
        data.sales.push(row.clone());
        data.sale_items.extend(items.iter().cloned());
        Ok(SaleDetail { sale: row, items })
    }

    async fn list_sales(&self, tenant_id: Uuid) -> Result<Vec<Sale>, AppError> {
        let data = self.data.lock().await;
        let mut sales: Vec<Sale> =
            data.sales.iter().filter(|s| s.tenant_id == tenant_id).cloned().collect();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sales)
    }

    async fn find_sale(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<SaleDetail>, AppError> {
        let data = self.data.lock().await;
        let Some(sale) = data.sales.iter().find(|s| s.id == id && s.tenant_id == tenant_id) else {
            return Ok(None);
        };
        Ok(Some(SaleDetail { sale: sale.clone(), items: sale_items_of(&data, id) }))
    }

    async fn update_item_quantity(
        &self,
        tenant_id: Uuid,
        sale_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<SaleDetail, AppError> {
        let mut data = self.data.lock().await;
        if !data.sales.iter().any(|s| s.id == sale_id && s.tenant_id == tenant_id) {
            return Err(AppError::NotFound("sale"));
        }
        let item = data
            .sale_items
            .iter()
            .find(|i| i.id == item_id && i.sale_id == sale_id)
            .cloned()
            .ok_or(AppError::NotFound("sale item"))?;

        let delta = quantity - item.quantity();
        let product = data
            .products
            .iter_mut()
            .find(|p| p.id == item.product_id && p.tenant_id == tenant_id)
            .ok_or(AppError::NotFound("product"))?;
        if delta > product.stock_quantity {
            return Err(AppError::InsufficientStock {
                product: product.name.clone(),
                requested: delta,
                available: product.stock_quantity,
            });
        }
        product.stock_quantity = product
            .stock_quantity
            .checked_sub(delta)
            .ok_or_else(|| AppError::invalid("Stock quantity is out of range."))?;

        if let Some(stored) = data.sale_items.iter_mut().find(|i| i.id == item_id) {
            stored.set_quantity(quantity);
        }
        let items = sale_items_of(&data, sale_id);
        let sale = data
            .sales
            .iter_mut()
            .find(|s| s.id == sale_id)
            .ok_or(AppError::NotFound("sale"))?;
        sale.total_amount = sale_total(
            items.iter().map(SaleItem::total_price),
            sale.tax_amount,
            sale.discount_amount,
        )?;
        Ok(SaleDetail { sale: sale.clone(), items })
    }
}

fn stats_for(data: &Data, customer_id: Uuid) -> CustomerStats {
    let sales: Vec<&Sale> = data.sales.iter().filter(|s| s.customer_id == Some(customer_id)).collect();
    CustomerStats {
        total_spent: sales.iter().map(|s| s.total_amount).sum::<Decimal>(),
        sales_count: sales.len() as i64,
        last_sale_date: sales.iter().map(|s| s.created_at).max(),
    }
}

#[async_trait]
impl CustomerRepository for MemoryDb {
    async fn list_customers(&self, tenant_id: Uuid) -> Result<Vec<CustomerWithStats>, AppError> {
        let data = self.data.lock().await;
        Ok(data
            .customers
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .map(|c| CustomerWithStats { customer: c.clone(), stats: stats_for(&data, c.id) })
            .collect())
    }

    async fn find_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<CustomerWithStats>, AppError> {
        let data = self.data.lock().await;
        Ok(data
            .customers
            .iter()
            .find(|c| c.id == id && c.tenant_id == tenant_id)
            .map(|c| CustomerWithStats { customer: c.clone(), stats: stats_for(&data, c.id) }))
    }

    async fn create_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        fields: &CustomerFields,
    ) -> Result<Customer, AppError> {
        let customer = Customer {
            id,
            tenant_id,
            name: fields.name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            address: fields.address.clone(),
            loyalty_points: fields.loyalty_points,
            created_at: Utc::now(),
        };
        self.data.lock().await.customers.push(customer.clone());
        Ok(customer)
    }

    async fn update_customer(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        fields: &CustomerFields,
    ) -> Result<Option<Customer>, AppError> {
        let mut data = self.data.lock().await;
        let Some(customer) = data
            .customers
            .iter_mut()
            .find(|c| c.id == id && c.tenant_id == tenant_id)
        else {
            return Ok(None);
        };
        customer.name = fields.name.clone();
        customer.email = fields.email.clone();
        customer.phone = fields.phone.clone();
        customer.address = fields.address.clone();
        customer.loyalty_points = fields.loyalty_points;
        Ok(Some(customer.clone()))
    }

    async fn delete_customer(&self, tenant_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.data.lock().await;
        let before = data.customers.len();
        data.customers.retain(|c| !(c.id == id && c.tenant_id == tenant_id));
        if data.customers.len() == before {
            return Ok(false);
        }
        for sale in data.sales.iter_mut().filter(|s| s.customer_id == Some(id)) {
            sale.customer_id = None;
        }
        Ok(true)
    }
}

// =============================================================================
//  OBJECT STORAGE
// =============================================================================

pub const STORAGE_BASE_URL: &str = "http://storage.test/bucket";

#[derive(Default)]
pub struct MemoryStorage {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, bytes: Vec<u8>, _content_type: &str, key: &str) -> Result<String, AppError> {
        self.objects.lock().await.insert(key.to_string(), bytes);
        Ok(format!("{}/{}", STORAGE_BASE_URL, key))
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.objects.lock().await.remove(key).is_some())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(STORAGE_BASE_URL)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
    }
}

// =============================================================================
//  APP + SEEDING HELPERS
// =============================================================================

pub struct TestApp {
    pub state: AppState,
    pub db: MemoryDb,
    pub storage: Arc<MemoryStorage>,
}

impl TestApp {
    pub fn new() -> Self {
        let db = MemoryDb::default();
        let storage = Arc::new(MemoryStorage::default());
        let state = AppState::new(db.repositories(), storage.clone(), "test-secret".to_string());
        Self { state, db, storage }
    }

    pub async fn seed_tenant(&self, name: &str) -> Tenant {
        let tenant = build_tenant(
            Uuid::new_v4(),
            &NewTenant {
                info: TenantInfo {
                    name: name.to_string(),
                    email: format!("{}@example.com", Uuid::new_v4().simple()),
                    phone: None,
                    address: None,
                },
                subdomain: None,
                is_default: false,
            },
        );
        self.db.data.lock().await.tenants.push(tenant.clone());
        tenant
    }

    pub async fn seed_user(&self, tenant_id: Uuid, role: UserRole, is_superadmin: bool) -> User {
        // Minimum bcrypt cost keeps the suite fast.
        let password_hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
        let suffix = Uuid::new_v4().simple().to_string();
        let user = build_user(
            Uuid::new_v4(),
            &NewUser {
                tenant_id,
                username: format!("user_{}", &suffix[..12]),
                email: format!("{}@example.com", &suffix[..12]),
                password_hash,
                role,
                first_name: None,
                last_name: None,
                phone: None,
                is_superadmin,
            },
        );
        self.db.data.lock().await.users.push(user.clone());
        user
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state.auth_service.create_token(user.id).unwrap()
    }

    pub async fn seed_marketplace_item(&self, name: &str, price: i64, stock: i32) -> MarketplaceItem {
        let now = Utc::now();
        let item = MarketplaceItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: Some(format!("{} from the marketplace", name)),
            price: Decimal::from(price),
            stock,
            sku: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        self.db.data.lock().await.marketplace.push(item.clone());
        item
    }

    pub async fn seed_product(&self, tenant_id: Uuid, name: &str, price: i64, stock: i32) -> Product {
        let product = product_from(
            tenant_id,
            Uuid::new_v4(),
            &NewProduct {
                category_id: None,
                name: name.to_string(),
                description: None,
                sku: None,
                barcode: None,
                price: Decimal::from(price),
                cost_price: None,
                stock_quantity: stock,
                stock_alert: 10,
                unit: "pcs".to_string(),
                carton_quantity: 1,
            },
        );
        self.db.data.lock().await.products.push(product.clone());
        product
    }

    pub async fn seed_customer(&self, tenant_id: Uuid, name: &str) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4(),
            tenant_id,
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            loyalty_points: 0,
            created_at: Utc::now(),
        };
        self.db.data.lock().await.customers.push(customer.clone());
        customer
    }

    pub async fn products_of(&self, tenant_id: Uuid) -> Vec<Product> {
        let data = self.db.data.lock().await;
        data.products.iter().filter(|p| p.tenant_id == tenant_id).cloned().collect()
    }

    pub async fn stock_of(&self, product_id: Uuid) -> i32 {
        let data = self.db.data.lock().await;
        data.products
            .iter()
            .find(|p| p.id == product_id)
            .map(|p| p.stock_quantity)
            .unwrap_or(-1)
    }
}
