//! In-process HTTP stubs for client tests.

use axum::Router;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Stub listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Stub server failed");
    });
    format!("http://{}", addr)
}
