use axum::Router;
use fieldmap::config::Config;
use fieldmap::models::Coordinates;
use std::time::Duration;

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Mock server has no address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on, to force connection failures.
#[allow(dead_code)]
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Probe listener has no address");
    drop(listener);
    format!("http://{}", addr)
}

#[allow(dead_code)]
pub fn short_timeout() -> Duration {
    Duration::from_secs(2)
}

/// Get test configuration
#[allow(dead_code)]
pub fn get_test_config() -> Config {
    let mut config = Config::default();
    config.http_timeout_secs = 2;
    config
}

#[allow(dead_code)]
pub fn eiffel_tower() -> Coordinates {
    Coordinates::new(48.8584, 2.2945).unwrap()
}

#[allow(dead_code)]
pub fn louvre() -> Coordinates {
    Coordinates::new(48.8606, 2.3376).unwrap()
}

/// Poll `check` until it holds or two seconds pass.
#[allow(dead_code)]
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
