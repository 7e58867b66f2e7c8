//! Core business logic - framework-agnostic catalog, checkout, and reporting operations.
//!
//! Checkout flows through [`validator`], [`catalog`] and [`pricing`] before
//! [`committer`] writes the order; [`checkout`] ties those steps together.

pub mod catalog;
pub mod category;
pub mod checkout;
pub mod committer;
pub mod pricing;
pub mod product;
pub mod report;
pub mod validator;
