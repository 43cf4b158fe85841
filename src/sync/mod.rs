//! Synchronization of device data with the backend.

pub mod msisdn;

pub use msisdn::{MsisdnRegistrar, MsisdnSynchronizer, SyncOutcome};
