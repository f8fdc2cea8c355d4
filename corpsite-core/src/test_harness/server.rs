//! HTTP server for the mock backend

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use super::api::{build_router, API_PREFIX};
use super::state::MockState;

pub struct MockServer {
    state: Arc<MockState>,
    addr: String,
}

impl MockServer {
    pub fn new(state: Arc<MockState>, addr: impl Into<String>) -> Self {
        Self {
            state,
            addr: addr.into(),
        }
    }

    /// Serve until the process is stopped
    pub async fn run(self) -> Result<()> {
        let router = build_router(self.state);
        let listener = TcpListener::bind(&self.addr).await?;
        info!("mock CMS backend listening on http://{}{}", self.addr, API_PREFIX);
        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// A backend serving on an ephemeral local port
#[derive(Debug)]
pub struct RunningServer {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl RunningServer {
    /// Base URL to point an API client at
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Bind 127.0.0.1 on a free port and serve `state` in the background
pub async fn spawn(state: Arc<MockState>) -> Result<RunningServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = build_router(state.clone());
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "mock backend stopped");
        }
    });
    Ok(RunningServer { addr, state, handle })
}

/// Serve the demo data set on `addr`
pub async fn start_server(addr: impl Into<String>) -> Result<()> {
    MockServer::new(Arc::new(MockState::demo()), addr).run().await
}
