pub mod course_service;
pub mod notification_service;
pub mod payment_service;
pub mod progress_service;
pub mod review_service;
pub mod user_service;
