use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;

use shoploom_accounts::Industry;
use shoploom_core::IndustryId;
use shoploom_infra::{
    AccountStore, CatalogStore, CustomerStore, InMemoryStore, InventoryStore, PostgresStore,
    StoreResult, TailoringStore,
};

/// The stores handlers talk to, behind trait objects so tests, dev and
/// production wire different backends through the same router.
pub struct AppServices {
    pub accounts: Arc<dyn AccountStore>,
    pub customers: Arc<dyn CustomerStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub inventory: Arc<dyn InventoryStore>,
    pub tailoring: Arc<dyn TailoringStore>,
}

impl AppServices {
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(PostgresStore::new(pool)))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: AccountStore + CustomerStore + CatalogStore + InventoryStore + TailoringStore + 'static,
    {
        Self {
            accounts: store.clone(),
            customers: store.clone(),
            catalog: store.clone(),
            inventory: store.clone(),
            tailoring: store,
        }
    }

    /// Seed the industries a fresh (in-memory) deployment offers at
    /// registration.
    pub async fn seed_reference_data(&self) -> StoreResult<()> {
        let now = Utc::now();
        for (name, description) in [
            ("Retail", "Shops selling physical products"),
            ("Tailoring", "Fashion design and garment making"),
            ("Education", "Schools and training services"),
        ] {
            let industry = Industry::new(IndustryId::new(), name, description, now)?;
            self.accounts.insert_industry(industry).await?;
        }
        Ok(())
    }
}
