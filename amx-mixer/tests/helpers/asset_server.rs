//! Minimal HTTP server that hands out fixture bytes
//!
//! Binds 127.0.0.1 on an ephemeral port; unknown paths return 404.

use axum::{routing::get, Router};
use tokio::net::TcpListener;

/// Serve each `(name, bytes)` pair at `/<name>` and return the base URL.
pub async fn spawn_asset_server(assets: Vec<(&str, Vec<u8>)>) -> String {
    let mut router = Router::new();
    for (name, bytes) in assets {
        router = router.route(
            &format!("/{}", name),
            get(move || {
                let bytes = bytes.clone();
                async move { bytes }
            }),
        );
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind asset server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("asset server");
    });

    format!("http://{}", addr)
}
