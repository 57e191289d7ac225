//! Multi-step lead-intake forms for the Revfinery talent programs.
//!
//! [`forms`] holds the form model and the step controller, [`crm`] the outbound
//! submission, and [`session`] the HTTP-facing session registry built on both.

pub mod config;
pub mod crm;
pub mod error;
pub mod forms;
pub mod session;
pub mod telemetry;

pub use error::AppError;
