use anyhow::Result;
use lms_client::application::services::notification_service::{
    NotificationService, NotificationServiceImpl,
};
use lms_client::config::Config;
use lms_client::polling::scheduler::notifications_poller;
use lms_client::polling::visibility::VisibilitySignal;
use lms_client::session::store::SessionStore;
use lms_client::transport::http_client::ApiHttpClient;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::new();
    let store = Arc::new(SessionStore::from_config(&config));
    let client = Arc::new(ApiHttpClient::new(&config, store)?);
    let notifications = Arc::new(NotificationServiceImpl::new(client));

    // One shared visibility flag; a real UI flips it from its focus events.
    let visibility = VisibilitySignal::new();

    let mut poller = notifications_poller(
        &config,
        Box::new(move || {
            let notifications = notifications.clone();
            Box::pin(async move {
                match notifications.unread_count().await {
                    Ok(count) => println!("unread: {}", count.unread_count),
                    Err(e) => eprintln!("unread count failed: {e}"),
                }
            })
        }),
        true,
        &visibility,
    );

    poller.start();

    // Simulate the tab being hidden for a while, then foregrounded again.
    tokio::time::sleep(Duration::from_secs(70)).await;
    visibility.set_visible(false);
    tokio::time::sleep(Duration::from_secs(60)).await;
    visibility.set_visible(true);
    tokio::time::sleep(Duration::from_secs(35)).await;

    poller.stop();
    Ok(())
}
