//! Web form over the rewards lookup.

mod page;
mod routes;

use log::info;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

pub use page::render_index;
pub use routes::{router, ApiState, RewardsRequest, RewardsResponse};

/// Bind the listening socket. Done before the server task is spawned so a
/// busy or malformed address fails startup.
pub async fn bind(addr: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    info!("Web form listening on http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serve the web form on `listener` until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, state: ApiState, shutdown: CancellationToken) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Web server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RewardsError;
    use crate::models::PoolSet;
    use crate::RewardsSource;
    use alloy::primitives::{B256, U256};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoRewards;

    #[async_trait]
    impl RewardsSource for NoRewards {
        async fn compute_rewards(&self, _pool_id: B256, _epoch: U256) -> Result<String> {
            Ok("0".to_string())
        }
    }

    #[tokio::test]
    async fn test_bind_fails_on_address_in_use() {
        let taken = bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        assert!(matches!(bind(&addr).await, Err(RewardsError::Io(_))));
        assert!(bind("not-an-address").await.is_err());
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let listener = bind("127.0.0.1:0").await.unwrap();
        let state = ApiState {
            source: Arc::new(NoRewards),
            pools: Arc::new(PoolSet::default()),
        };
        let token = CancellationToken::new();
        let handle = tokio::spawn(serve(listener, state, token.clone()));

        token.cancel();
        handle.await.unwrap().unwrap();
    }
}
