use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use utoipa::ToSchema;

use crate::config::SeedConfig;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::storage::ProductStorage;
use crate::utils::generate_sample_products;

/// Where the `{ "products": [...] }` seed document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    File(PathBuf),
    Remote(String),
}

impl SeedSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            SeedSource::Remote(source.to_string())
        } else {
            SeedSource::File(PathBuf::from(source))
        }
    }
}

impl std::fmt::Display for SeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedSource::File(path) => write!(f, "{}", path.display()),
            SeedSource::Remote(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// 种子文件 + 本地修改合并
    SeedMerged,
    /// 首次加载种子文件
    Seed,
    /// 种子不可用，使用已保存数据
    Stored,
    /// 生成的示例数据
    Sample,
}

#[derive(Debug, Clone)]
pub struct InitOutcome {
    pub source: DataSource,
    pub products: Vec<Product>,
}

/// Seed products win for catalog fields; the local record wins for `status`,
/// `sales` and `customFields`. Local-only products are appended.
///
/// 本地销量是唯一计数来源，即使为 0 也不会被种子销量覆盖。
pub fn merge_products(seed: &[Product], local: &[Product]) -> Vec<Product> {
    let mut merged: Vec<Product> = seed
        .iter()
        .map(|seed_product| match local.iter().find(|l| l.id == seed_product.id) {
            Some(local_product) => Product {
                status: local_product.status,
                sales: local_product.sales,
                custom_fields: local_product.custom_fields.clone(),
                ..seed_product.clone()
            },
            None => seed_product.clone(),
        })
        .collect();

    let seed_ids: HashSet<&str> = seed.iter().map(|p| p.id.as_str()).collect();
    merged.extend(
        local
            .iter()
            .filter(|l| !seed_ids.contains(l.id.as_str()))
            .cloned(),
    );
    merged
}

#[derive(Clone)]
pub struct DataInitializer {
    storage: ProductStorage,
    seed: SeedSource,
    client: Client,
    sample_count: usize,
}

impl DataInitializer {
    pub fn new(storage: ProductStorage, config: &SeedConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client, using defaults: {e}");
                Client::new()
            });
        Self {
            storage,
            seed: SeedSource::parse(&config.source),
            client,
            sample_count: config.sample_count,
        }
    }

    pub fn storage(&self) -> &ProductStorage {
        &self.storage
    }

    /// 读取并校验种子文件；空列表视为失败
    pub async fn fetch_seed(&self) -> AppResult<Vec<Product>> {
        log::info!("Loading seed data from {}", self.seed);
        let text = match &self.seed {
            SeedSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                AppError::DataSourceError(format!("failed to read {}: {e}", path.display()))
            })?,
            SeedSource::Remote(url) => {
                self.client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?
            }
        };

        let products = parse_products_document(&text).map_err(|e| match e {
            AppError::ImportError(msg) => AppError::DataSourceError(msg),
            other => other,
        })?;
        if products.is_empty() {
            return Err(AppError::DataSourceError("seed contains no products".to_string()));
        }
        log::info!("Seed data loaded: {} products", products.len());
        Ok(products)
    }

    /// Picks the data source: seed (merged with local changes), then the
    /// stored collection, then generated sample data.
    pub async fn initialize(&self) -> InitOutcome {
        match self.fetch_seed().await {
            Ok(seed) => {
                if !self.storage.save_original_snapshot(&seed) {
                    log::warn!("Original snapshot could not be saved");
                }
                let merged = self
                    .storage
                    .update(move |products| {
                        if products.is_empty() {
                            *products = seed;
                            Ok(DataSource::Seed)
                        } else {
                            log::info!("Local changes found, merging with seed data");
                            *products = merge_products(&seed, products);
                            Ok(DataSource::SeedMerged)
                        }
                    })
                    .await;
                match merged {
                    Ok((source, products)) => {
                        log::info!("Using seed data ({source:?}): {} products", products.len());
                        return InitOutcome { source, products };
                    }
                    Err(e) => log::error!("Failed to apply seed data: {e}"),
                }
            }
            Err(e) => log::warn!("Seed data unavailable, falling back to stored data: {e}"),
        }

        let stored = self.storage.load();
        if !stored.is_empty() {
            log::info!("Using stored data: {} products", stored.len());
            return InitOutcome {
                source: DataSource::Stored,
                products: stored,
            };
        }

        log::warn!("No stored data, generating {} sample products", self.sample_count);
        let sample = generate_sample_products(self.sample_count);
        self.storage.replace(&sample).await;
        InitOutcome {
            source: DataSource::Sample,
            products: sample,
        }
    }

    /// 恢复到原始快照；没有快照时重新读取种子文件并记为快照
    pub async fn reset_to_original(&self) -> AppResult<Vec<Product>> {
        let products = match self.storage.load_original_snapshot() {
            Some(snapshot) => snapshot,
            None => {
                let seed = self.fetch_seed().await.map_err(|e| {
                    log::error!("Reset failed: {e}");
                    AppError::NotFound("没有可恢复的原始数据".to_string())
                })?;
                self.storage.save_original_snapshot(&seed);
                seed
            }
        };
        self.storage.replace(&products).await;
        log::info!("Reset to original data: {} products", products.len());
        Ok(products)
    }

    /// Replaces the collection with an imported document; nothing changes on error.
    pub async fn import_document(&self, text: &str) -> AppResult<Vec<Product>> {
        let products = parse_products_document(text)?;
        self.storage.replace(&products).await;
        log::info!("Imported {} products", products.len());
        Ok(products)
    }

    pub fn export(&self) -> ExportDocument {
        ExportDocument::new(self.storage.load(), Utc::now())
    }

    pub fn statistics(&self) -> ProductStatistics {
        ProductStatistics::from_products(&self.storage.load())
    }
}
