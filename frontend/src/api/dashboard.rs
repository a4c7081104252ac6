use chrono::NaiveDate;

use super::{
    client::ApiClient,
    error::ApiError,
    types::{AttendanceRecord, AttendanceStatus, DashboardStats, Employee, LeaveRequest, LeaveStatus},
};

impl DashboardStats {
    /// Counts over whatever the backend let the caller see; the same call
    /// yields company-wide numbers for staff and personal ones otherwise.
    pub fn compute(
        employees: &[Employee],
        attendance: &[AttendanceRecord],
        leaves: &[LeaveRequest],
        today: NaiveDate,
    ) -> Self {
        let todays: Vec<&AttendanceRecord> = attendance
            .iter()
            .filter(|record| record.date == today)
            .collect();
        let count_today = |status: AttendanceStatus| {
            todays.iter().filter(|record| record.status == status).count()
        };
        Self {
            total_employees: employees.len(),
            present_today: count_today(AttendanceStatus::Present),
            absent_today: count_today(AttendanceStatus::Absent),
            pending_leaves: leaves
                .iter()
                .filter(|leave| leave.status == LeaveStatus::Pending)
                .count(),
            attendance_records: attendance.len(),
            leave_requests: leaves.len(),
        }
    }
}

impl ApiClient {
    pub async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats, ApiError> {
        let (employees, attendance, leaves) = futures::try_join!(
            self.list_employees(),
            self.list_attendance(),
            self.list_leaves()
        )?;
        Ok(DashboardStats::compute(&employees, &attendance, &leaves, today))
    }
}
