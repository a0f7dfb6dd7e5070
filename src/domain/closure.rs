use {
    super::error::ClosureError,
    super::id::RegisterId,
    super::money::Amount,
    chrono::{DateTime, NaiveDate, Utc},
    serde::{Serialize, Serializer},
    std::fmt,
};

/// A calendar date in strict `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClosureDate(NaiveDate);

impl ClosureDate {
    pub fn parse(raw: &str) -> Result<Self, ClosureError> {
        let raw = raw.trim();
        let well_formed = raw.len() == 10
            && raw.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(ClosureError::Validation(format!(
                "date must be YYYY-MM-DD, got: {raw}"
            )));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ClosureError::Validation(format!("not a calendar date: {raw}")))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for ClosureDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for ClosureDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for ClosureDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Complete,
    /// Some detail fetch failed; the row carries an error message.
    Degraded,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Degraded => "degraded",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct NewClosureReport {
    pub register_id: RegisterId,
    pub register_name: String,
    pub outlet_name: Option<String>,
    pub date: ClosureDate,
    pub closed_at: DateTime<Utc>,
    pub total: Amount,
    pub sequence_number: Option<i64>,
    pub url: String,
    pub error: Option<String>,
}

/// One normalized row per register closed on the requested date.
///
/// The vendor only reports payments, so the payment total stands in for
/// sales as well.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureReport {
    #[serde(rename = "id")]
    register_id: RegisterId,
    #[serde(rename = "outlet")]
    outlet_name: Option<String>,
    #[serde(rename = "register")]
    register_name: String,
    date: ClosureDate,
    closed_at: DateTime<Utc>,
    sales: Amount,
    payments: Amount,
    sequence_number: Option<i64>,
    url: String,
    status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ClosureReport {
    pub fn new(p: NewClosureReport) -> Self {
        let status = if p.error.is_some() {
            ReportStatus::Degraded
        } else {
            ReportStatus::Complete
        };
        Self {
            register_id: p.register_id,
            outlet_name: p.outlet_name,
            register_name: p.register_name,
            date: p.date,
            closed_at: p.closed_at,
            sales: p.total,
            payments: p.total,
            sequence_number: p.sequence_number,
            url: p.url,
            status,
            error: p.error,
        }
    }

    pub fn register_id(&self) -> &RegisterId {
        &self.register_id
    }

    pub fn outlet_name(&self) -> Option<&str> {
        self.outlet_name.as_deref()
    }

    pub fn register_name(&self) -> &str {
        &self.register_name
    }

    pub fn date(&self) -> &ClosureDate {
        &self.date
    }

    pub fn closed_at(&self) -> DateTime<Utc> {
        self.closed_at
    }

    pub fn sales(&self) -> Amount {
        self.sales
    }

    pub fn payments(&self) -> Amount {
        self.payments
    }

    pub fn sequence_number(&self) -> Option<i64> {
        self.sequence_number
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> ReportStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_degraded(&self) -> bool {
        self.status == ReportStatus::Degraded
    }
}

/// Context returned when no register closed on the requested date.
#[derive(Debug, Clone, Serialize)]
pub struct NoMatchDiagnostics {
    /// Registers carrying any readable close timestamp.
    pub closed_registers: usize,
    /// Distinct close dates, ascending.
    pub available_dates: Vec<ClosureDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosureBatch {
    pub date: ClosureDate,
    pub reports: Vec<ClosureReport>,
    pub matched: usize,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unfinished: Vec<RegisterId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<NoMatchDiagnostics>,
}

impl ClosureBatch {
    pub fn no_match(date: ClosureDate, diagnostics: NoMatchDiagnostics) -> Self {
        Self {
            date,
            reports: Vec::new(),
            matched: 0,
            truncated: false,
            note: None,
            unfinished: Vec::new(),
            diagnostics: Some(diagnostics),
        }
    }

    pub fn complete_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_degraded()).count()
    }

    pub fn degraded_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_degraded()).count()
    }
}
