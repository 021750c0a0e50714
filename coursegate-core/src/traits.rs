//! Core trait definitions

use crate::error::GateResult;
use crate::types::CourseRecord;
use async_trait::async_trait;

/// Read access to the course lookup table
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Find the record for `code`, skipping records marked inactive.
    /// Matching is exact and case-sensitive.
    async fn find_active(&self, code: &str) -> GateResult<Option<CourseRecord>>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}
