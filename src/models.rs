pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod merchant;
pub mod stripe_event;
pub mod transaction;
pub mod voucher;
