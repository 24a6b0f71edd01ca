use clap::Parser;

use super::error::SystemError;
use crate::actor_framework::Entity;
use crate::domain::{field, Product};
use crate::query::Sort;

const DEFAULT_STORE_BUFFER: usize = 64;
const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Command line and environment settings for the catalog binary.
#[derive(Debug, Parser)]
#[command(name = "product_catalog", about = "Product catalog record service")]
pub struct CatalogArgs {
    /// Capacity of the store actor's request channel.
    #[arg(long, env = "CATALOG_STORE_BUFFER", default_value_t = DEFAULT_STORE_BUFFER)]
    pub store_buffer: usize,

    /// Page size used when a list request does not give one.
    #[arg(long, env = "CATALOG_DEFAULT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub default_page_size: u32,

    /// Largest page size a list request may ask for.
    #[arg(long, env = "CATALOG_MAX_PAGE_SIZE", default_value_t = DEFAULT_MAX_PAGE_SIZE)]
    pub max_page_size: u32,

    /// Sort clause used when a list request does not give one, e.g. `amount,desc`.
    #[arg(long, env = "CATALOG_DEFAULT_SORT", default_value = field::CREATED_AT)]
    pub default_sort: String,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "CATALOG_LOG", default_value = "info")]
    pub log: String,
}

/// Runtime settings shared by the catalog components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub store_buffer: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub default_sort: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            store_buffer: DEFAULT_STORE_BUFFER,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            default_sort: field::CREATED_AT.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn from_args(args: &CatalogArgs) -> Result<Self, SystemError> {
        let config = Self {
            store_buffer: args.store_buffer,
            default_page_size: args.default_page_size,
            max_page_size: args.max_page_size,
            default_sort: args.default_sort.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SystemError> {
        if self.store_buffer == 0 {
            return Err(SystemError::InvalidConfig("store buffer must be positive".to_string()));
        }
        if self.max_page_size == 0 {
            return Err(SystemError::InvalidConfig("max page size must be positive".to_string()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(SystemError::InvalidConfig(format!(
                "default page size {} must be between 1 and {}",
                self.default_page_size, self.max_page_size
            )));
        }
        let sort = Sort::parse(&self.default_sort)
            .map_err(|e| SystemError::InvalidConfig(format!("default sort: {}", e)))?;
        if !Product::schema().is_sortable(&sort.field) {
            return Err(SystemError::InvalidConfig(format!(
                "default sort field {} is not a sortable product field",
                sort.field
            )));
        }
        Ok(())
    }
}
