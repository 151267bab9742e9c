pub mod auth;
pub mod customers;
pub mod health;
pub mod onboarding;
pub mod profile;
pub mod review_requests;
