use std::sync::Arc;

use crate::publisher::EventPublisher;
use crate::services::{CartService, CatalogService};
use crate::store::{CartStore, ProductStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub carts: CartService,
    pub store: Arc<dyn Store>,
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new<S: Store + 'static>(store: Arc<S>, events: EventPublisher, api_token: Option<String>) -> Self {
        let products: Arc<dyn ProductStore> = store.clone();
        let carts: Arc<dyn CartStore> = store.clone();
        Self {
            catalog: CatalogService::new(products.clone()),
            carts: CartService::new(products, carts, events),
            store,
            api_token: api_token.map(Arc::from),
        }
    }
}
