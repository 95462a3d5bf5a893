use serde::Serialize;
use utoipa::ToSchema;

/// Facility counters shown at the top of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub strains: u64,
    pub active_tanks: u64,
    pub breeding_logs: u64,
    pub users: u64,
}
