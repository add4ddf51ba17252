// src/services/marketplace_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{db_utils::found, error::AppError},
    db::{CatalogRepository, MarketplaceRepository},
    models::marketplace::{
        ImageUpload, MarketplaceItem, MarketplaceItemFields, RestockResult,
    },
    services::object_storage::ObjectStorage,
};

/// The shared marketplace and the restock path from it into a tenant's catalog.
#[derive(Clone)]
pub struct MarketplaceService {
    repo: Arc<dyn MarketplaceRepository>,
    catalog_repo: Arc<dyn CatalogRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl MarketplaceService {
    pub fn new(
        repo: Arc<dyn MarketplaceRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self { repo, catalog_repo, storage }
    }

    pub async fn list_available(&self) -> Result<Vec<MarketplaceItem>, AppError> {
        self.repo.list_available().await
    }

    pub async fn list_all(&self) -> Result<Vec<MarketplaceItem>, AppError> {
        self.repo.list_all().await
    }

    pub async fn get_item(&self, id: Uuid) -> Result<MarketplaceItem, AppError> {
        found(self.repo.find_by_id(id).await?, "marketplace item")
    }

    pub async fn create_item(
        &self,
        fields: MarketplaceItemFields,
        image: Option<ImageUpload>,
    ) -> Result<MarketplaceItem, AppError> {
        let fields = fields.normalized();
        fields.validate()?;
        self.ensure_unique(&fields, None).await?;

        let id = Uuid::new_v4();
        let image_url = match image {
            Some(image) => Some(self.store_image(id, image).await?),
            None => None,
        };

        match self.repo.create(id, &fields, image_url.as_deref()).await {
            Ok(item) => {
                tracing::info!("marketplace item {} ({}) created", item.id, item.name);
                Ok(item)
            }
            Err(err) => {
                if let Some(url) = &image_url {
                    self.release_image(url).await;
                }
                Err(err)
            }
        }
    }

    pub async fn update_item(
        &self,
        id: Uuid,
        fields: MarketplaceItemFields,
        image: Option<ImageUpload>,
    ) -> Result<MarketplaceItem, AppError> {
        let fields = fields.normalized();
        fields.validate()?;
        let current = self.get_item(id).await?;
        self.ensure_unique(&fields, Some(id)).await?;

        let new_image_url = match image {
            Some(image) => Some(self.store_image(id, image).await?),
            None => None,
        };

        let updated = match self.repo.update(id, &fields, new_image_url.as_deref()).await {
            Ok(updated) => updated,
            Err(err) => {
                if let Some(url) = &new_image_url {
                    self.release_image(url).await;
                }
                return Err(err);
            }
        };
        let Some(item) = updated else {
            if let Some(url) = &new_image_url {
                self.release_image(url).await;
            }
            return Err(AppError::NotFound("marketplace item"));
        };

        // The old object goes only once the row points at the new one.
        if let (Some(_), Some(old_url)) = (&new_image_url, &current.image_url) {
            if Some(old_url) != item.image_url.as_ref() {
                self.release_image(old_url).await;
            }
        }

        tracing::info!("marketplace item {} updated", item.id);
        Ok(item)
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        let item = self.get_item(id).await?;

        if let Some(url) = &item.image_url {
            self.release_image(url).await;
        }
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("marketplace item"));
        }

        tracing::info!("marketplace item {} deleted", id);
        Ok(())
    }

    /// Copies `item_id` into the tenant's products, or adds `quantity` to the
    /// product with the same name. The marketplace's own stock is left as is.
    pub async fn restock(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<RestockResult, AppError> {
        if quantity <= 0 {
            return Err(AppError::invalid("Quantity must be greater than zero."));
        }

        let (product, outcome) = self
            .catalog_repo
            .restock_from_marketplace(tenant_id, item_id, quantity)
            .await?;

        tracing::info!(
            "tenant {} restocked {} x{} from marketplace item {} ({:?})",
            tenant_id,
            product.name,
            quantity,
            item_id,
            outcome
        );
        Ok(RestockResult::new(product, outcome, quantity))
    }

    async fn ensure_unique(
        &self,
        fields: &MarketplaceItemFields,
        exclude: Option<Uuid>,
    ) -> Result<(), AppError> {
        let existing = self
            .repo
            .find_conflicting(&fields.name, fields.sku.as_deref(), exclude)
            .await?;

        match existing {
            Some(other) if other.name == fields.name => Err(AppError::conflict(
                "A marketplace item with this name already exists.",
            )),
            Some(_) => Err(AppError::conflict(
                "A marketplace item with this SKU already exists.",
            )),
            None => Ok(()),
        }
    }

    async fn store_image(&self, item_id: Uuid, image: ImageUpload) -> Result<String, AppError> {
        let extension = image.extension()?;
        let key = format!("marketplace_{}/{}.{}", item_id, Uuid::new_v4(), extension);
        self.storage.upload(image.bytes, &image.content_type, &key).await
    }

    // Best effort: a storage failure here never fails the request.
    async fn release_image(&self, url: &str) {
        let Some(key) = self.storage.key_for_url(url) else {
            tracing::warn!("image url {} does not belong to object storage", url);
            return;
        };
        match self.storage.delete(&key).await {
            Ok(true) => tracing::debug!("image {} deleted", key),
            Ok(false) => tracing::warn!("image {} was already missing", key),
            Err(err) => tracing::warn!("failed to delete image {}: {}", key, err),
        }
    }
}
