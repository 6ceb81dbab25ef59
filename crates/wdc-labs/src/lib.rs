//! Core state machines behind the WDC Labs landing page.
//!
//! The presentation layer binds its form fields to a
//! [`waitlist::SubmissionController`], renders the latest
//! [`countdown::CountdownBreakdown`], and drives the sponsorship dialog through
//! [`sponsorship::SponsorshipRequest`]. Nothing in here renders anything.

pub mod config;
pub mod countdown;
pub mod error;
pub mod session;
pub mod sponsorship;
pub mod telemetry;
pub mod waitlist;
