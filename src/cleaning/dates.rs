use chrono::NaiveDate;

/// Completion-date formats seen across transcript layouts. Day-first
/// is the default; ISO dates are accepted either way.
const DAYFIRST_FORMATS: &[&str] = &[
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%Y-%m-%d",
];

const MONTHFIRST_FORMATS: &[&str] = &[
    "%m-%d-%Y",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%Y-%m-%d",
];

pub fn parse_date(value: &str, dayfirst: bool) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let formats = if dayfirst {
        DAYFIRST_FORMATS
    } else {
        MONTHFIRST_FORMATS
    };

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}
