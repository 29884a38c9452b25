//! Wire types and report assembly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculator::{life_path, name_number};
use crate::interpretation::interpretation;

/// A numerology request as received from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumerologyRequest {
    /// The full name of the person under analysis.
    pub full_name: String,
    /// The birth date, serialized as an ISO `YYYY-MM-DD` string.
    pub birth_date: NaiveDate,
}

/// A single computed number with its interpretation text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    /// The reduced number (1-9, 11, 22, 33, or 0 for degenerate input).
    pub number: u32,
    /// The fixed interpretation text for the number.
    pub interpretation: String,
}

/// The two computed numbers making up a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumerologyReport {
    /// The number derived from the birth date.
    pub life_path_number: ReportItem,
    /// The number derived from the full name.
    pub name_number: ReportItem,
}

/// The full response: the echoed request plus the computed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumerologyResponse {
    /// The request exactly as received.
    pub request_data: NumerologyRequest,
    /// The computed numerology report.
    pub numerology_report: NumerologyReport,
}

/// Assemble the full response for a request.
///
/// Pure composition of the two calculators and the interpretation lookup.
/// Always succeeds for a well-formed request; the request is echoed back
/// untouched alongside the report.
pub fn build_report(request: NumerologyRequest) -> NumerologyResponse {
    let life_path_number = report_item(life_path(request.birth_date));
    let name_number = report_item(name_number(&request.full_name));

    NumerologyResponse {
        request_data: request,
        numerology_report: NumerologyReport {
            life_path_number,
            name_number,
        },
    }
}

fn report_item(number: u32) -> ReportItem {
    ReportItem {
        number,
        interpretation: interpretation(number).to_string(),
    }
}
