use crate::model::PlanItem;
use std::path::Path;

/// Export a day's plans to a semicolon-delimited CSV file.
///
/// Columns: Title ; Type ; Start ; End ; Notes, ordered by start time.
/// Returns the number of plans written.
pub fn export_day(plans: &[PlanItem], path: &Path) -> Result<usize, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)?;
    write_plans(&mut wtr, plans)?;
    wtr.flush()?;
    Ok(plans.len())
}

fn write_plans<W: std::io::Write>(wtr: &mut csv::Writer<W>, plans: &[PlanItem]) -> Result<(), csv::Error> {
    wtr.write_record(["Title", "Type", "Start", "End", "Notes"])?;

    let mut ordered: Vec<&PlanItem> = plans.iter().collect();
    ordered.sort_by_key(|p| (p.start_time, p.end_time));
    for plan in ordered {
        let start = plan.start_time.to_string();
        let end = plan.end_time.to_string();
        wtr.write_record([
            plan.title.as_str(),
            plan.category.label(),
            start.as_str(),
            end.as_str(),
            plan.notes.as_deref().unwrap_or(""),
        ])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, PlanId, TimeOfDay};
    use chrono::NaiveDate;

    fn plan(title: &str, start: &str, end: &str, notes: Option<&str>) -> PlanItem {
        PlanItem {
            id: PlanId::generate(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            title: title.into(),
            category: Category::Learning,
            start_time: start.parse::<TimeOfDay>().unwrap(),
            end_time: end.parse::<TimeOfDay>().unwrap(),
            notes: notes.map(Into::into),
        }
    }

    #[test]
    fn writes_header_and_rows_in_start_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("day.csv");
        let plans = vec![
            plan("Read", "20:00", "21:00", None),
            plan("Course; part 2", "07:15", "08:00", Some("ch. 4")),
        ];
        assert_eq!(export_day(&plans, &path).unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Title;Type;Start;End;Notes");
        assert_eq!(lines[1], "\"Course; part 2\";Learning;07:15;08:00;ch. 4");
        assert_eq!(lines[2], "Read;Learning;20:00;21:00;");
    }
}
