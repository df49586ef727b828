//! Invoicing service: invoices, quotes, payments and the settlement rules
//! that tie them together.

pub mod billing;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
