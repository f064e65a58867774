use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use chrono::{Datelike, NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use storeops_core::{DocumentId, Record};
use storeops_infra::{
    DocumentStore, Entry, InMemoryDocumentStore, LedgerConfig, LedgerError, PostgresDocumentStore,
    Registry, RegistryError, StockLedger, StoreBackend, StoreError, StoreOpsConfig,
};
use storeops_purchasing::{Order, OrderDraft, order_number};
use storeops_sales::{CompetitorSale, Sale};
use storeops_team::{Task, TeamMember};

/// Shared handle to whichever document store backs the service.
pub type Store = Arc<dyn DocumentStore>;

/// Why the service could not start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open document store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to load stock ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("failed to load registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Everything the handlers need, built once at startup.
#[derive(Debug)]
pub struct AppServices {
    pub ledger: StockLedger<Store>,
    pub sales: Registry<Store, Sale>,
    pub competitor_sales: Registry<Store, CompetitorSale>,
    pub orders: Registry<Store, Order>,
    pub team: Registry<Store, TeamMember>,
    pub tasks: Registry<Store, Task>,
    /// Order numbers are derived from the current count; creation is serialized.
    order_numbering: Mutex<()>,
}

/// Access to the registry holding records of type `T`.
pub trait RegistryOf<T: Record> {
    fn registry(&self) -> &Registry<Store, T>;
}

macro_rules! registry_of {
    ($record:ty, $field:ident) => {
        impl RegistryOf<$record> for AppServices {
            fn registry(&self) -> &Registry<Store, $record> {
                &self.$field
            }
        }
    };
}

registry_of!(Sale, sales);
registry_of!(CompetitorSale, competitor_sales);
registry_of!(Order, orders);
registry_of!(TeamMember, team);
registry_of!(Task, tasks);

pub async fn build_services(config: &StoreOpsConfig) -> Result<AppServices, StartupError> {
    let store: Store = match &config.store {
        StoreBackend::Memory => {
            tracing::info!("using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
        StoreBackend::Postgres { database_url } => {
            tracing::info!("using postgres document store");
            Arc::new(PostgresDocumentStore::connect(database_url).await?)
        }
    };

    build_services_with_store(store, config.ledger).await
}

pub async fn build_services_with_store(
    store: Store,
    ledger: LedgerConfig,
) -> Result<AppServices, StartupError> {
    Ok(AppServices {
        ledger: StockLedger::init(store.clone(), ledger).await?,
        sales: Registry::load(store.clone()).await?,
        competitor_sales: Registry::load(store.clone()).await?,
        orders: Registry::load(store.clone()).await?,
        team: Registry::load(store.clone()).await?,
        tasks: Registry::load(store).await?,
        order_numbering: Mutex::new(()),
    })
}

impl AppServices {
    /// Number the draft `ORD-<current year>-<count + 1>` and record it.
    pub async fn create_order(&self, draft: OrderDraft) -> Result<Entry<Order>, RegistryError> {
        let _guard = self.order_numbering.lock().await;
        let number = order_number(Utc::now().year(), self.orders.snapshot().len());
        self.orders.add(draft.into_order(number)).await
    }

    /// Replace an order's fields, keeping its number and recomputing the total.
    pub async fn update_order(
        &self,
        id: DocumentId,
        draft: OrderDraft,
    ) -> Result<Entry<Order>, RegistryError> {
        let existing = self
            .orders
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        self.orders
            .update(id, draft.into_order(existing.record.order_number))
            .await
    }
}

/// Today's date, unless the caller pins one (used for reproducible views).
pub fn today_or(pinned: Option<NaiveDate>) -> NaiveDate {
    pinned.unwrap_or_else(|| Utc::now().date_naive())
}

/// Server-sent stream of ledger changes.
pub fn ledger_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.ledger.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(change) => {
            let data = serde_json::to_string(&change).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event("ledger").data(data)))
        }
        // Lagged receivers skip ahead; clients refetch on gaps.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
