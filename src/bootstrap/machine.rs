use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    core::{
        config::PreviewConfig,
        errors::{PreviewError, PreviewResult},
        types::{BootstrapState, BootstrapStatus, NormalizedNode},
    },
    graph::store::PreviewRegistry,
    normalizer::{normalize_documents, FieldResolvers},
    providers::{
        http::PreviewTransport,
        search::{self, SearchQuery},
    },
    security::{cookies::CookieStore, token::decode_preview_cookie},
    typepaths::fetch_type_paths,
};

/// One preview bootstrap attempt bound to a repository. A handle bootstraps
/// at most once: after `BOOTSTRAPPED` a new trigger fails with
/// [`PreviewError::AlreadyBootstrapped`], and `FAILED` is final. Create a new
/// handle to retry.
pub struct PreviewBootstrap<T, C> {
    instance: Uuid,
    config: PreviewConfig,
    resolvers: FieldResolvers,
    transport: T,
    cookies: C,
    registry: Arc<PreviewRegistry>,
    status: watch::Sender<BootstrapStatus>,
    mounted: AtomicBool,
}

enum Guard {
    Proceed,
    Skip,
}

impl<T, C> PreviewBootstrap<T, C>
where
    T: PreviewTransport,
    C: CookieStore,
{
    pub fn new(
        registry: Arc<PreviewRegistry>,
        config: PreviewConfig,
        resolvers: FieldResolvers,
        transport: T,
        cookies: C,
    ) -> Self {
        let (status, _) = watch::channel(BootstrapStatus::init());
        Self {
            instance: Uuid::new_v4(),
            config,
            resolvers,
            transport,
            cookies,
            registry,
            status,
            mounted: AtomicBool::new(true),
        }
    }

    pub fn repository_name(&self) -> &str {
        &self.config.repository_name
    }

    pub fn status(&self) -> BootstrapStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BootstrapStatus> {
        self.status.subscribe()
    }

    /// Stops status updates from landing once the owner is gone. An in-flight
    /// bootstrap still merges its nodes into the registry.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub async fn trigger(&self) -> BootstrapStatus {
        let span = tracing::info_span!(
            "preview_bootstrap",
            repository = %self.config.repository_name,
            instance = %self.instance
        );

        match self.enter() {
            Guard::Skip => return self.status(),
            Guard::Proceed => {}
        }

        match self.run().instrument(span.clone()).await {
            Ok(nodes) => {
                self.registry.merge(&self.config.repository_name, nodes);
                span.in_scope(|| tracing::info!("preview bootstrapped"));
                self.publish(BootstrapStatus::bootstrapped());
            }
            Err(err) => {
                span.in_scope(|| tracing::warn!(code = err.code(), error = %err, "preview bootstrap failed"));
                self.publish(BootstrapStatus::failed(err));
            }
        }
        self.status()
    }

    // Checked and set in one step before the first suspension point.
    fn enter(&self) -> Guard {
        let mut guard = Guard::Skip;
        self.status.send_if_modified(|status| match status.state {
            BootstrapState::Init => {
                *status = BootstrapStatus::bootstrapping();
                guard = Guard::Proceed;
                true
            }
            BootstrapState::Bootstrapping => {
                tracing::debug!(instance = %self.instance, "bootstrap already in flight; ignoring trigger");
                false
            }
            BootstrapState::Bootstrapped => {
                if !self.is_mounted() {
                    tracing::debug!(instance = %self.instance, "owner unmounted; ignoring trigger");
                    return false;
                }
                *status = BootstrapStatus::failed(PreviewError::AlreadyBootstrapped);
                true
            }
            BootstrapState::Failed => false,
        });
        guard
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn publish(&self, next: BootstrapStatus) {
        if !self.is_mounted() {
            tracing::debug!(instance = %self.instance, state = next.state.as_str(), "owner unmounted; dropping status update");
            return;
        }
        self.status.send_replace(next);
    }

    async fn run(&self) -> PreviewResult<Vec<NormalizedNode>> {
        let repository_name = self.config.repository_name.as_str();
        self.config.validate()?;

        let raw = self
            .cookies
            .get(&self.config.cookie_name)
            .ok_or(PreviewError::PreviewCookieNotPresent)?;
        let token = decode_preview_cookie(&raw, repository_name)?;
        if !token.is_for(repository_name) {
            return Err(PreviewError::PreviewTokenNotForRepository {
                expected: repository_name.to_string(),
                found: token.repository_name,
            });
        }
        tracing::info!(release = token.release_id.as_deref().unwrap_or("-"), "preview session found");

        let query = SearchQuery::from_config(&self.config, token.preview_ref);
        let (type_paths, first_page) = futures::future::try_join(
            fetch_type_paths(&self.transport, &self.config.asset_prefix, repository_name),
            search::fetch_page(&self.transport, &query, 1),
        )
        .await?;
        let documents = search::fetch_remaining(&self.transport, &query, first_page).await?;
        tracing::debug!(documents = documents.len(), "fetched release documents");

        normalize_documents(&documents, &type_paths, &self.resolvers)
    }
}

impl PreviewRegistry {
    /// Creates a bootstrap handle for `config.repository_name` that merges into
    /// this registry.
    pub fn bootstrap<T, C>(
        self: &Arc<Self>,
        config: PreviewConfig,
        resolvers: FieldResolvers,
        transport: T,
        cookies: C,
    ) -> PreviewBootstrap<T, C>
    where
        T: PreviewTransport,
        C: CookieStore,
    {
        PreviewBootstrap::new(Arc::clone(self), config, resolvers, transport, cookies)
    }
}
