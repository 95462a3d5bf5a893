use super::models::ArchiveEntry;
use crate::common::errors::{BusinessError, BusinessResult};
use chrono::{DateTime, Utc};

pub const CSV_HEADER: [&str; 9] = [
    "Tank ID",
    "Strain",
    "Archived At",
    "Total",
    "Larval",
    "Male",
    "Female",
    "Deceased",
    "Notes",
];

fn count(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Attachment name for an export started at `now`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("tank_archive_export_{}.csv", now.format("%Y%m%dT%H%M%SZ"))
}

/// Render entries as CSV with a fixed 9 column header. Fields that contain
/// commas, quotes or line breaks are quoted.
pub fn export_csv(entries: &[ArchiveEntry]) -> BusinessResult<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    let csv_error = |e: csv::Error| BusinessError::InternalError {
        message: format!("Failed to write archive CSV: {e}"),
    };

    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for entry in entries {
        let archive = &entry.entry;
        writer
            .write_record([
                entry.tank_display(),
                entry.strain_name.clone().unwrap_or_default(),
                archive.archived_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                count(archive.total_fish),
                count(archive.larval_count),
                count(archive.male_count),
                count(archive.female_count),
                count(archive.deceased_count),
                archive.notes.clone().unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| BusinessError::InternalError {
            message: format!("Failed to flush archive CSV: {e}"),
        })?;
    String::from_utf8(bytes).map_err(|e| BusinessError::InternalError {
        message: format!("Archive CSV is not valid UTF-8: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::filter::tests::entry;
    use chrono::TimeZone;

    #[test]
    fn test_header_only_for_empty_archive() {
        let csv = export_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "Tank ID,Strain,Archived At,Total,Larval,Male,Female,Deceased,Notes\n"
        );
    }

    #[test]
    fn test_row_layout() {
        let csv = export_csv(&[entry(Some("ARF1-A-1"), Some("casper"), 4)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "ARF1-A-1,casper,2025-03-04 23:30:00,20,5,7,8,0,");
    }

    #[test]
    fn test_unknown_values_are_empty_fields() {
        let mut unlabelled = entry(None, None, 4);
        unlabelled.entry.total_fish = None;
        let tank_id = unlabelled.entry.tank_id;

        let csv = export_csv(&[unlabelled]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(&format!("{tank_id},,2025-03-04 23:30:00,,5")));
    }

    #[test]
    fn test_notes_with_delimiters_are_quoted() {
        let mut noisy = entry(Some("ARF1-A-1"), Some("casper, nacre"), 4);
        noisy.entry.notes = Some("moved \"fast\"\nre-check".to_string());

        let csv = export_csv(&[noisy]).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 9);
        assert_eq!(&records[0][1], "casper, nacre");
        assert_eq!(&records[0][8], "moved \"fast\"\nre-check");
    }

    #[test]
    fn test_export_filename() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 5, 9).unwrap();
        assert_eq!(export_filename(now), "tank_archive_export_20250601T080509Z.csv");
    }
}
