//! User reports

use pairing_core::{Report, ReportStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graphql::{Operation, OperationKind};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub reported_user_id: Uuid,
    pub reason: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitReportVariables {
    pub input: ReportInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportData {
    pub submit_report: Report,
}

/// File a report about another user
pub struct SubmitReport;

impl Operation for SubmitReport {
    const NAME: &'static str = "SubmitReport";
    const DOCUMENT: &'static str = r"mutation SubmitReport($input: ReportInput!) {
  submitReport(input: $input) {
    id reporterId reportedUserId reason details status createdAt resolvedAt
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["ListReports", "OrganizationStatistics"];
    type Variables = SubmitReportVariables;
    type Data = SubmitReportData;
}

/// Reports visible to an admin, optionally filtered by status
pub struct ListReports;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsVariables {
    pub organization_id: Option<Uuid>,
    pub status: Option<ReportStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListReportsData {
    pub reports: Vec<Report>,
}

impl Operation for ListReports {
    const NAME: &'static str = "ListReports";
    const DOCUMENT: &'static str = r"query ListReports($organizationId: ID, $status: ReportStatus) {
  reports(organizationId: $organizationId, status: $status) {
    id reporterId reportedUserId reason details status createdAt resolvedAt
  }
}";
    const KIND: OperationKind = OperationKind::Query;
    type Variables = ListReportsVariables;
    type Data = ListReportsData;
}

/// Close a report as resolved or dismissed
pub struct ResolveReport;

#[derive(Debug, Clone, Serialize)]
pub struct ResolveReportVariables {
    pub id: Uuid,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReportData {
    pub resolve_report: Report,
}

impl Operation for ResolveReport {
    const NAME: &'static str = "ResolveReport";
    const DOCUMENT: &'static str = r"mutation ResolveReport($id: ID!, $status: ReportStatus!) {
  resolveReport(id: $id, status: $status) {
    id reporterId reportedUserId reason details status createdAt resolvedAt
  }
}";
    const KIND: OperationKind = OperationKind::Mutation;
    const INVALIDATES: &'static [&'static str] = &["ListReports", "OrganizationStatistics"];
    type Variables = ResolveReportVariables;
    type Data = ResolveReportData;
}
