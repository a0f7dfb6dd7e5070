use {
    super::closure::ClosureDate,
    super::id::{OutletId, RegisterId},
    super::money::Amount,
    chrono::{DateTime, NaiveDate, NaiveDateTime, Utc},
    serde::{Deserialize, Deserializer, Serialize},
};

/// A point-of-sale register as listed by the vendor. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Register {
    pub id: RegisterId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub outlet_id: Option<OutletId>,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default, alias = "closed_at")]
    pub register_close_time: Option<String>,
    #[serde(default, alias = "opened_at")]
    pub register_open_time: Option<String>,
}

impl Register {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Close timestamp in UTC. Empty or unreadable values count as "never closed".
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.register_close_time
            .as_deref()
            .and_then(parse_vendor_timestamp)
    }

    /// The raw close time when it is present but cannot be read.
    pub fn unreadable_close_time(&self) -> Option<&str> {
        self.register_close_time
            .as_deref()
            .filter(|raw| !raw.trim().is_empty() && parse_vendor_timestamp(raw).is_none())
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.register_open_time
            .as_deref()
            .and_then(parse_vendor_timestamp)
    }

    /// Calendar date of the close timestamp, truncated in UTC.
    pub fn close_date(&self) -> Option<NaiveDate> {
        self.closed_at().map(|ts| ts.date_naive())
    }

    pub fn closes_on(&self, date: &ClosureDate) -> bool {
        self.close_date() == Some(date.date())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outlet {
    pub id: OutletId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub total: serde_json::Value,
}

impl PaymentRecord {
    pub fn new(total: serde_json::Value) -> Self {
        Self { name: None, total }
    }

    pub fn amount(&self) -> Amount {
        Amount::from_json(&self.total)
    }
}

/// Per-register payments summary for the latest closure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RawPaymentSummary")]
pub struct PaymentSummary {
    pub payments: Vec<PaymentRecord>,
    pub sequence_number: Option<i64>,
}

/// The vendor names the sequence number either way, sometimes both.
#[derive(Deserialize)]
struct RawPaymentSummary {
    #[serde(default)]
    payments: Vec<PaymentRecord>,
    #[serde(default, deserialize_with = "lenient_i64")]
    sequence_number: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    register_closure_sequence_number: Option<i64>,
}

impl From<RawPaymentSummary> for PaymentSummary {
    fn from(raw: RawPaymentSummary) -> Self {
        Self {
            payments: raw.payments,
            sequence_number: raw.sequence_number.or(raw.register_closure_sequence_number),
        }
    }
}

impl PaymentSummary {
    pub fn total(&self) -> Amount {
        self.payments.iter().map(PaymentRecord::amount).sum()
    }
}

/// Vendor timestamps are RFC 3339; naive values are taken as UTC.
pub fn parse_vendor_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .map(|naive| naive.and_utc())
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}
