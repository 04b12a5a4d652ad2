use crate::config::CartConfig;
use crate::service::{CartServiceActor, Catalog, ChannelCartService};
use crate::store::{CartStore, Notifier};
use tracing::{error, info};

/// A cart store wired to an in-process [`CartServiceActor`].
///
/// `CartSystem` is responsible for:
/// - **Lifecycle Management**: Spawning the service actor and stopping it again
/// - **Dependency Wiring**: Handing the store a client for the actor
///
/// # Example
///
/// ```ignore
/// let system = CartSystem::new(&CartConfig::default(), catalog, TracingNotifier);
/// system.store.add(SkuId(7), 1).await?;
/// system.shutdown().await?;
/// ```
pub struct CartSystem<N: Notifier> {
    pub store: CartStore<ChannelCartService, N>,

    /// Extra client for code that talks to the service directly (e.g. order placement).
    pub service: ChannelCartService,

    handle: tokio::task::JoinHandle<()>,
}

impl<N: Notifier> CartSystem<N> {
    /// Spawns the service actor and builds a store on top of it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: &CartConfig, catalog: Catalog, notifier: N) -> Self {
        let (actor, service) = CartServiceActor::new(config.channel_buffer, catalog);
        let handle = tokio::spawn(actor.run());
        let store = CartStore::from_config(service.clone(), notifier, config);
        info!(buffer = config.channel_buffer, "Cart system started");

        Self {
            store,
            service,
            handle,
        }
    }

    /// Drops every client, which closes the channel, then waits for the actor to exit.
    ///
    /// Clones of [`service`](Self::service) held elsewhere keep the actor alive, so drop
    /// them before calling this.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down cart system...");
        drop(self.store);
        drop(self.service);

        if let Err(e) = self.handle.await {
            error!("Cart service task failed: {:?}", e);
            return Err(format!("Cart service task failed: {:?}", e));
        }

        info!("Cart system shutdown complete.");
        Ok(())
    }
}
