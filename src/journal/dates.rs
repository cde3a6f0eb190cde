use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

/// Convert the export's UTC timestamp into the entry's own zone. Entries
/// without a zone are kept in UTC.
pub fn localize(creation_date: &str, time_zone: Option<&str>) -> Result<DateTime<Tz>> {
    let instant = DateTime::parse_from_rfc3339(creation_date)
        .with_context(|| format!("invalid creationDate `{creation_date}`"))?;
    let zone = match time_zone.map(str::trim).filter(|z| !z.is_empty()) {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|err| anyhow!("unknown timeZone `{name}`: {err}"))?,
        None => Tz::UTC,
    };
    Ok(instant.with_timezone(&zone))
}

pub fn calendar_date(local: &DateTime<Tz>) -> NaiveDate {
    local.date_naive()
}

pub fn frontmatter_stamp(local: &DateTime<Tz>) -> String {
    local.format("%Y-%m-%d %H:%M:%S %A").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_utc_evening_is_next_day_in_tokyo() {
        let local = localize("2024-01-31T20:30:00Z", Some("Asia/Tokyo")).expect("localize");
        assert_eq!(
            calendar_date(&local),
            NaiveDate::from_ymd_opt(2024, 2, 1).expect("date")
        );
        assert_eq!(frontmatter_stamp(&local), "2024-02-01 05:30:00 Thursday");
    }

    #[test]
    fn missing_zone_stays_utc() {
        let local = localize("2024-01-31T20:30:00Z", None).expect("localize");
        assert_eq!(frontmatter_stamp(&local), "2024-01-31 20:30:00 Wednesday");
    }

    #[test]
    fn bad_inputs_are_errors() {
        assert!(localize("yesterday", Some("UTC")).is_err());
        assert!(localize("2024-01-31T20:30:00Z", Some("Mars/Olympus")).is_err());
    }
}
