//! Submission coverage analytics.
//!
//! Compares the school registry against submitted responses per
//! district or taluka.

use crate::models::{CoverageLevel, CoverageReport, CoverageRow, ResponseRecord, School};
use indexmap::IndexMap;

/// Compute coverage rows in registry order.
pub fn coverage(
    schools: &[School],
    responses: &[ResponseRecord],
    level: CoverageLevel,
) -> CoverageReport {
    // Keyed by district, or by district and taluka.
    let mut areas: IndexMap<String, (Option<String>, String, usize)> = IndexMap::new();
    for school in schools {
        let (key, district) = match level {
            CoverageLevel::District => (school.district_name.clone(), None),
            CoverageLevel::Taluka => (
                format!("{}\u{1f}{}", school.district_name, school.taluka_name),
                Some(school.district_name.clone()),
            ),
        };
        let name = match level {
            CoverageLevel::District => &school.district_name,
            CoverageLevel::Taluka => &school.taluka_name,
        };

        let area = areas.entry(key).or_default();
        area.0 = district;
        area.1 = name.clone();
        area.2 += 1;
    }

    let rows = areas
        .into_values()
        .map(|(district, name, school_count)| {
            let response_count = responses
                .iter()
                .filter(|r| match &district {
                    None => r.district_name == name,
                    Some(district) => r.district_name == *district && r.taluka_name == name,
                })
                .count();

            CoverageRow {
                completion_rate: completion_rate(response_count, school_count),
                name,
                district,
                school_count,
                response_count,
            }
        })
        .collect();

    CoverageReport {
        level,
        total_schools: schools.len(),
        total_responses: responses.len(),
        rows,
    }
}

fn completion_rate(responses: usize, schools: usize) -> u32 {
    if schools == 0 {
        return 0;
    }
    (responses as f64 / schools as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(udise: &str, district: &str, taluka: &str) -> School {
        School {
            udise_code: udise.to_string(),
            school_name: format!("School {}", udise),
            district_name: district.to_string(),
            taluka_name: taluka.to_string(),
        }
    }

    fn response(district: &str, taluka: &str) -> ResponseRecord {
        ResponseRecord {
            district_name: district.to_string(),
            taluka_name: taluka.to_string(),
            ..Default::default()
        }
    }

    fn registry() -> Vec<School> {
        vec![
            school("27250100101", "Pune", "Haveli"),
            school("27250100102", "Pune", "Mulshi"),
            school("27250100103", "Pune", "Haveli"),
            school("27310200201", "Satara", "Wai"),
        ]
    }

    #[test]
    fn test_district_coverage() {
        let responses = vec![response("Pune", "Haveli"), response("Pune", "Mulshi")];
        let report = coverage(&registry(), &responses, CoverageLevel::District);

        assert_eq!(report.total_schools, 4);
        assert_eq!(report.total_responses, 2);
        assert_eq!(
            report.rows,
            vec![
                CoverageRow {
                    name: "Pune".to_string(),
                    district: None,
                    school_count: 3,
                    response_count: 2,
                    completion_rate: 67,
                },
                CoverageRow {
                    name: "Satara".to_string(),
                    district: None,
                    school_count: 1,
                    response_count: 0,
                    completion_rate: 0,
                },
            ]
        );
    }

    #[test]
    fn test_taluka_coverage() {
        let responses = vec![
            response("Pune", "Haveli"),
            response("Pune", "Haveli"),
            response("Satara", "Wai"),
        ];
        let report = coverage(&registry(), &responses, CoverageLevel::Taluka);

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[0].name, "Haveli");
        assert_eq!(report.rows[0].district.as_deref(), Some("Pune"));
        assert_eq!(report.rows[0].completion_rate, 100);
        assert_eq!(report.rows[1].name, "Mulshi");
        assert_eq!(report.rows[1].completion_rate, 0);
        assert_eq!(report.rows[2].completion_rate, 100);
    }

    #[test]
    fn test_empty_registry() {
        let report = coverage(&[], &[response("Pune", "Haveli")], CoverageLevel::District);
        assert!(report.rows.is_empty());
        assert_eq!(report.total_responses, 1);
    }
}
