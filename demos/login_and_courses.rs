use anyhow::Result;
use lms_client::application::services::course_service::{CourseService, CourseServiceImpl};
use lms_client::config::Config;
use lms_client::session::session::Session;
use lms_client::session::store::SessionStore;
use lms_client::transport::http_client::ApiHttpClient;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger
    tracing_subscriber::fmt::init();

    // Load the configuration
    let config = Config::new();

    // Wire up the session-aware client
    let store = Arc::new(SessionStore::from_config(&config));
    let client = Arc::new(ApiHttpClient::new(&config, store)?);
    let session = Session::new(client.clone());

    // Log in with credentials from the environment
    let username = std::env::var("LMS_USERNAME").unwrap_or_else(|_| "demo".to_string());
    let password = std::env::var("LMS_PASSWORD").unwrap_or_else(|_| "demo".to_string());

    match session.login(&username, &password).await {
        Ok(_) => {
            println!("Login successful");

            let user = session.current_user(false).await?;
            println!("Logged in as {} ({:?})", user.display_name(), user.role);
        }
        Err(e) => {
            eprintln!("Login failed: {e}");
        }
    }

    // Browse the catalog; works with or without a session
    let courses = CourseServiceImpl::new(client);
    let page = courses.list_courses(None, None).await?;
    println!("{} courses available:", page.count);
    for course in &page.results {
        println!("  [{}] {} - {}", course.id, course.title, course.price);
    }

    Ok(())
}
