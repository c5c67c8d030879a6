#[tokio::main]
async fn main() {
    gatehouse_observability::init();

    let jwt_secret = std::env::var("GATEHOUSE_JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("GATEHOUSE_JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });
    let bind_addr =
        std::env::var("GATEHOUSE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let (ctx, store) =
        gatehouse_api::app::build_demo_context(&jwt_secret).expect("failed to wire the gateway");

    // Dev seed so the demo wiring is usable out of the box.
    store.insert_user(
        gatehouse_core::UserId::new(1),
        "admin@example.com",
        "admin",
        "user:read:{all}",
    );

    let app = gatehouse_api::app::build_app(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
