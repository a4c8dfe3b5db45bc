//! Reports: any user files one, admins review and close them

use std::sync::Arc;

use pairing_client::forms::ReportForm;
use pairing_client::operations::{
    ListReports, ListReportsVariables, ResolveReport, ResolveReportVariables, SubmitReport,
    SubmitReportVariables,
};
use pairing_client::{check, ClientError, ClientResult, GraphqlClient};
use pairing_core::{AppRole, Report, ReportStatus};
use tracing::info;
use uuid::Uuid;

use crate::notice::Notice;

pub struct ReportsScreen {
    client: Arc<GraphqlClient>,
    reports: Vec<Report>,
    filter: Option<ReportStatus>,
}

impl ReportsScreen {
    pub fn new(client: Arc<GraphqlClient>) -> Self {
        Self {
            client,
            reports: Vec::new(),
            filter: Some(ReportStatus::Open),
        }
    }

    /// Status shown in the list; `None` shows all
    pub fn set_filter(&mut self, filter: Option<ReportStatus>) {
        self.filter = filter;
    }

    /// Admins only; the list is scoped to the admin's organization
    pub async fn load(&mut self) -> ClientResult<&[Report]> {
        let session = self.client.session();
        let organization_id = match session.role() {
            Some(AppRole::SuperAdmin) => None,
            Some(AppRole::OrgAdmin) => session.organization_id(),
            _ => return Err(ClientError::Forbidden("Only admins can review reports".into())),
        };
        let variables = ListReportsVariables {
            organization_id,
            status: self.filter,
        };
        self.reports = self.client.query::<ListReports>(&variables).await?.reports;
        Ok(&self.reports)
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn open_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_open()).count()
    }

    pub async fn submit(&self, form: &ReportForm) -> Notice {
        if let Err(fields) = check(form) {
            return Notice::invalid(fields);
        }
        if self.client.session().user_id() == Some(form.reported_user_id) {
            return Notice::error("You cannot report yourself").inline();
        }
        let variables = SubmitReportVariables {
            input: form.to_input(),
        };
        match self.client.mutate::<SubmitReport>(&variables).await {
            Ok(data) => {
                info!(report_id = %data.submit_report.id, "Report submitted");
                Notice::success("Report submitted. An admin will review it.")
            }
            Err(err) => Notice::from_error(&err),
        }
    }

    /// Close a report as resolved or dismissed
    pub async fn resolve(&mut self, id: Uuid, status: ReportStatus) -> Notice {
        if status == ReportStatus::Open {
            return Notice::error("A report can only be resolved or dismissed");
        }
        let variables = ResolveReportVariables { id, status };
        match self.client.mutate::<ResolveReport>(&variables).await {
            Ok(data) => {
                let report = data.resolve_report;
                if self.filter.is_some_and(|f| f != report.status) {
                    self.reports.retain(|r| r.id != report.id);
                } else if let Some(slot) = self.reports.iter_mut().find(|r| r.id == report.id) {
                    *slot = report;
                }
                match status {
                    ReportStatus::Dismissed => Notice::success("Report dismissed"),
                    _ => Notice::success("Report resolved"),
                }
            }
            Err(err) => Notice::from_error(&err),
        }
    }
}
