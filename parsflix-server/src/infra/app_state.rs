use std::sync::Arc;

use parsflix_core::auth::AuthCrypto;
use parsflix_core::catalog::{
    BrowseCache, CatalogQueryService, IngestOptions, IngestService,
};
use parsflix_core::database::CatalogStore;
use parsflix_core::images::ImageStore;
use parsflix_core::metadata::MetadataProvider;

use super::config::Config;
use crate::auth::jwt::TokenSigner;

/// Shared application state handed to every handler.
///
/// Construction is adapter-agnostic: production wires the PostgreSQL store,
/// TMDB client, and Cloudinary client; tests pass in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: CatalogStore,
    pub provider: Arc<dyn MetadataProvider>,
    pub ingest: IngestService,
    pub queries: CatalogQueryService,
    pub auth_crypto: Arc<AuthCrypto>,
    pub tokens: TokenSigner,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: CatalogStore,
        provider: Arc<dyn MetadataProvider>,
        images: Arc<dyn ImageStore>,
        auth_crypto: Arc<AuthCrypto>,
        tokens: TokenSigner,
    ) -> Self {
        let browse_cache = Arc::new(BrowseCache::default());
        let ingest = IngestService::new(
            store.clone(),
            provider.clone(),
            images,
            browse_cache.clone(),
            IngestOptions {
                cast_limit: config.ingest.cast_limit,
                include_specials: config.ingest.include_specials,
            },
        );
        let queries = CatalogQueryService::new(store.clone(), browse_cache);
        Self {
            config,
            store,
            provider,
            ingest,
            queries,
            auth_crypto,
            tokens,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store)
            .field(
                "provider",
                &std::any::type_name_of_val(self.provider.as_ref()),
            )
            .finish_non_exhaustive()
    }
}
