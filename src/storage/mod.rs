//! 持久化层：键值存储 + 产品/快照/购物车读写

pub mod file_store;
pub mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{AppError, AppResult};
use crate::models::{CartItem, Product};
use crate::notify::{ChangeNotifier, ChangeReason};

/// Persistent string key/value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

pub fn create_store(config: &StorageConfig) -> AppResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::File => Arc::new(FileStore::open(&config.data_dir)?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

#[derive(Debug, Clone)]
pub struct StorageKeys {
    pub products: String,
    pub original: String,
    pub cart: String,
}

impl From<&StorageConfig> for StorageKeys {
    fn from(config: &StorageConfig) -> Self {
        Self {
            products: config.products_key.clone(),
            original: config.original_key.clone(),
            cart: config.cart_key.clone(),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        StorageKeys::from(&StorageConfig::default())
    }
}

#[derive(Clone)]
pub struct ProductStorage {
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    notifier: ChangeNotifier,
    write_lock: Arc<Mutex<()>>,
}

impl ProductStorage {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StorageKeys, notifier: ChangeNotifier) -> Self {
        Self {
            store,
            keys,
            notifier,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// 读取产品列表；缺失或损坏时返回空列表
    pub fn load(&self) -> Vec<Product> {
        self.read_list(&self.keys.products).unwrap_or_default()
    }

    /// 保存产品列表；失败只记录日志并返回 false
    pub fn save(&self, products: &[Product]) -> bool {
        let saved = self.write_list(&self.keys.products, products);
        if saved {
            log::debug!("Saved {} products", products.len());
            self.notifier.notify(ChangeReason::LocalWrite);
        }
        saved
    }

    pub fn load_original_snapshot(&self) -> Option<Vec<Product>> {
        self.read_list(&self.keys.original)
    }

    pub fn save_original_snapshot(&self, products: &[Product]) -> bool {
        self.write_list(&self.keys.original, products)
    }

    pub fn load_cart(&self) -> Vec<CartItem> {
        self.read_list::<CartItem>(&self.keys.cart)
            .unwrap_or_default()
            .into_iter()
            .map(|item| CartItem::new(item.id, item.qty as i64))
            .collect()
    }

    pub fn save_cart(&self, items: &[CartItem]) -> bool {
        self.write_list(&self.keys.cart, items)
    }

    /// Read-modify-write of the product collection, serialized with every
    /// other `update`. When `apply` fails nothing is written.
    pub async fn update<R, F>(&self, apply: F) -> AppResult<(R, Vec<Product>)>
    where
        F: FnOnce(&mut Vec<Product>) -> AppResult<R>,
    {
        let _guard = self.write_lock.lock().await;
        let mut products = self.load();
        let result = apply(&mut products)?;
        if !self.save(&products) {
            log::warn!("Continuing with unsaved product changes; they may be lost on reload");
        }
        Ok((result, products))
    }

    /// Replaces the whole collection under the write lock.
    pub async fn replace(&self, products: &[Product]) -> bool {
        let _guard = self.write_lock.lock().await;
        self.save(products)
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::error!("Failed to read {key}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(list) => Some(list),
            Err(e) => {
                log::error!("Stored data under {key} is corrupt: {e}");
                None
            }
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, items: &[T]) -> bool {
        let result = serde_json::to_string(items)
            .map_err(AppError::from)
            .and_then(|json| self.store.set(key, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to save {key}: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::{RawProduct, validate_product};

    pub fn memory_storage() -> ProductStorage {
        ProductStorage::new(
            Arc::new(MemoryStore::new()),
            StorageKeys::default(),
            ChangeNotifier::new(),
        )
    }

    pub fn product(id: &str, name: &str, price: &str, status: bool) -> Product {
        let mut product = validate_product(RawProduct {
            id: Some(id.into()),
            product_name: Some(name.into()),
            price: Some(price.into()),
            ..Default::default()
        });
        product.status = status;
        product
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_save_then_load_round_trip() {
        let storage = memory_storage();
        let mut products = vec![
            product("P001", "智能保温杯", "19.99", true),
            product("P002", "蓝牙音箱", "299", false),
        ];
        products[0].tags = vec!["智能".to_string()];
        products[1].sales = 12;
        products[1]
            .custom_fields
            .insert("color".to_string(), serde_json::json!("red"));

        assert!(storage.save(&products));
        assert_eq!(storage.load(), products);
    }

    #[test]
    fn test_load_missing_or_corrupt_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let storage = ProductStorage::new(store.clone(), StorageKeys::default(), ChangeNotifier::new());
        assert!(storage.load().is_empty());

        store.set("productSystem_products", "{ not json").unwrap();
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_save_failure_is_reported_not_fatal() {
        let store = Arc::new(MemoryStore::with_quota(16));
        let storage = ProductStorage::new(store, StorageKeys::default(), ChangeNotifier::new());
        assert!(!storage.save(&[product("P001", "智能保温杯", "19.99", true)]));
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_original_snapshot() {
        let storage = memory_storage();
        assert!(storage.load_original_snapshot().is_none());
        let products = vec![product("P001", "智能保温杯", "19.99", true)];
        assert!(storage.save_original_snapshot(&products));
        assert_eq!(storage.load_original_snapshot(), Some(products));
        assert!(storage.load().is_empty());
    }

    #[test]
    fn test_cart_quantities_are_clamped_on_load() {
        let store = Arc::new(MemoryStore::new());
        let storage = ProductStorage::new(store.clone(), StorageKeys::default(), ChangeNotifier::new());
        store
            .set("productSystem_cart", r#"[{"id":"P001","qty":150},{"id":"P002","qty":0}]"#)
            .unwrap();
        let cart = storage.load_cart();
        assert_eq!(cart[0].qty, 99);
        assert_eq!(cart[1].qty, 1);
    }

    #[test]
    fn test_save_notifies_subscribers() {
        let storage = memory_storage();
        let rx = storage.notifier().subscribe();
        let before = rx.borrow().version;
        storage.save(&[]);
        assert_eq!(rx.borrow().version, before + 1);
    }

    #[actix_web::test]
    async fn test_update_failure_leaves_collection_unchanged() {
        let storage = memory_storage();
        storage.save(&[product("P001", "智能保温杯", "19.99", true)]);

        let result = storage
            .update(|products| {
                products.clear();
                Err::<(), _>(AppError::ValidationError("nope".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(storage.load().len(), 1);
    }

    #[actix_web::test]
    async fn test_update_persists() {
        let storage = memory_storage();
        storage.save(&[product("P001", "智能保温杯", "19.99", true)]);
        let (count, products) = storage
            .update(|products| {
                products[0].sales += 3;
                Ok(products.len())
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(products[0].sales, 3);
        assert_eq!(storage.load()[0].sales, 3);
    }
}
