// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod credentials;
pub mod stats;

pub use activity::Activity;
pub use credentials::CredentialRecord;
pub use stats::{MonthActivities, MonthBucket, MonthTotals, MonthlyReport, StopReason};
