pub mod auth_service;
pub mod dashboard_service;
pub mod document_service;
pub mod mailer_service;
pub mod voucher_service;
pub mod webhook_service;
