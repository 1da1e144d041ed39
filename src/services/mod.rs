//! Client-side workflow and state services

pub mod auth_service;
pub mod booking_service;
pub mod catalog_service;
pub mod review_service;
pub mod session_service;

pub use auth_service::{AuthService, LoginStatus, LoginWorkflow, SignupStatus, SignupWorkflow};
pub use booking_service::{BookingStatus, BookingWorkflow};
pub use catalog_service::CatalogService;
pub use review_service::ReviewService;
pub use session_service::{Session, SessionStore};
