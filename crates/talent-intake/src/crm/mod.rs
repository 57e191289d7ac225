//! Delivery of completed applications to the CRM forms API.

mod client;
mod payload;

#[cfg(test)]
mod tests;

pub use client::{CrmError, CrmFieldError, CrmReceipt, CrmTransport, HubSpotClient};
pub use payload::{flatten, PayloadField, SubmissionContext, SubmissionPayload, SELECTION_DELIMITER};
