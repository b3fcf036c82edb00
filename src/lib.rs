//! ProcureAI landing page and lead capture service.
//!
//! Serves the landing page and delivers contact-form leads to a
//! spreadsheet-backed webhook.
//!
//! # Modules
//!
//! - `api`: HTTP-facing namespace.
//! - `core`: Submission logic, models and errors.
//! - `integrations`: External webhook client.
//! - `banner`: Auto-dismissing status banner per form instance.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `landing`: Landing page markup.
//! - `models`: Form, submission and response models.
//! - `submission`: Lead submission handler and fallback chain.
//! - `validation`: Contact form validation.
//! - `webhook_client`: Lead webhook client.

pub mod api;
pub mod core;
pub mod integrations;

pub mod banner;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod landing;
pub mod models;
pub mod submission;
pub mod validation;
pub mod webhook_client;
