use crate::dates::FILE_DATE_FMT;
use crate::error::CoreError;
use crate::store::InviteDefaults;
use chrono::{DateTime, NaiveDate, Utc};

/// Placeholders understood by the invite template. The template file is a
/// plain `.ics` skeleton with these tokens in place of the event fields.
const PLACEHOLDERS: &[&str] = &[
    "{uid}",
    "{dtstamp}",
    "{start}",
    "{end}",
    "{location}",
    "{summary}",
    "{description}",
];

/// Render a calendar invite for a resolved date.
///
/// Deterministic in its inputs: the caller supplies the generation instant
/// and the unique invite id, so tests can pin both. Start and end encode as
/// `yyyyMMdd'T'HHmmss`, composed from the resolved date and the configured
/// time of day.
pub fn build_invite(
    template: Option<&str>,
    meta: &InviteDefaults,
    date: NaiveDate,
    now: DateTime<Utc>,
    uid: &str,
) -> Result<String, CoreError> {
    let template = match template {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(CoreError::TemplateMissing),
    };

    let day = date.format("%Y%m%d").to_string();
    let values = [
        uid.to_string(),
        now.format("%Y%m%dT%H%M%SZ").to_string(),
        format!("{day}T{}", meta.start_time),
        format!("{day}T{}", meta.end_time),
        meta.location.clone(),
        meta.summary.clone(),
        meta.description.clone(),
    ];

    let mut invite = template.to_string();
    for (token, value) in PLACEHOLDERS.iter().zip(values.iter()) {
        invite = invite.replace(token, value);
    }
    Ok(invite)
}

/// Attachment filename for a resolved date, e.g. `06_01_2024.ics`.
pub fn invite_filename(date: NaiveDate) -> String {
    format!("{}.ics", date.format(FILE_DATE_FMT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const TEMPLATE: &str = "BEGIN:VCALENDAR\n\
        BEGIN:VEVENT\n\
        UID:{uid}\n\
        DTSTAMP:{dtstamp}\n\
        DTSTART:{start}\n\
        DTEND:{end}\n\
        LOCATION:{location}\n\
        SUMMARY:{summary}\n\
        DESCRIPTION:{description}\n\
        END:VEVENT\n\
        END:VCALENDAR\n";

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 10, 30, 0).unwrap()
    }

    #[test]
    fn substitutes_every_field() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let invite = build_invite(
            Some(TEMPLATE),
            &InviteDefaults::default(),
            date,
            fixed_now(),
            "abc-123",
        )
        .unwrap();
        assert!(invite.contains("UID:abc-123"));
        assert!(invite.contains("DTSTAMP:20240102T103000Z"));
        assert!(invite.contains("DTSTART:20240106T130000"));
        assert!(invite.contains("DTEND:20240106T180000"));
        assert!(invite.contains("LOCATION:Online"));
        assert!(!invite.contains('{'));
    }

    #[test]
    fn deterministic_for_pinned_inputs() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let meta = InviteDefaults::default();
        let a = build_invite(Some(TEMPLATE), &meta, date, fixed_now(), "x").unwrap();
        let b = build_invite(Some(TEMPLATE), &meta, date, fixed_now(), "x").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_or_blank_template_fails() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        let meta = InviteDefaults::default();
        assert!(matches!(
            build_invite(None, &meta, date, fixed_now(), "x"),
            Err(CoreError::TemplateMissing)
        ));
        assert!(matches!(
            build_invite(Some("  \n"), &meta, date, fixed_now(), "x"),
            Err(CoreError::TemplateMissing)
        ));
    }

    #[test]
    fn filename_derives_from_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
        assert_eq!(invite_filename(date), "06_01_2024.ics");
    }
}
