pub mod admin;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod voucher;
pub mod webhook;
