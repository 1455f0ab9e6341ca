use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tracing::info;

mod error;
mod pages;
pub mod tasks;
pub mod valentine;

pub use error::ApiError;
pub use tasks::{TaskDb, TasksState, tasks_router};
pub use valentine::{CollectionDb, ValentineState, valentine_router};

pub async fn serve(bind_addr: &str, app: Router) -> Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid bind address: {bind_addr}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
