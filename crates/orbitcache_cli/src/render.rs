//! Console rendering for propagation reports.

use orbitcache_core::{PropagationReport, PropagationResult};

const NAME_WIDTH: usize = 28;
/// Field width for each vector component, sign included.
const COMPONENT_WIDTH: usize = 10;

pub const FORMAT_LEGEND: &str = "Format: NORAD  NAME | r_km=(x,y,z) | v_km_s=(vx,vy,vz)  [TEME]";

/// Summary line printed before the per-object lines.
pub fn header_line(report: &PropagationReport) -> String {
    format!(
        "Propagated {} satellites to time {}",
        report.results.len(),
        report.target_time
    )
}

/// One line per result: `catalogId  name | r_km=(x,y,z) | v_km_s=(vx,vy,vz)`.
pub fn result_line(result: &PropagationResult) -> String {
    let name: String = result.name.chars().take(NAME_WIDTH).collect();
    let [x, y, z] = result.position_km;
    let [vx, vy, vz] = result.velocity_km_s;
    format!(
        "{:>6}  {:<width$} | r_km=({x:>w$.3},{y:>w$.3},{z:>w$.3}) | v_km_s=({vx:>w$.6},{vy:>w$.6},{vz:>w$.6})",
        result.catalog_id,
        name,
        width = NAME_WIDTH,
        w = COMPONENT_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::{header_line, result_line};
    use orbitcache_core::{PropagationReport, PropagationResult};

    fn result(name: &str) -> PropagationResult {
        PropagationResult {
            catalog_id: 5,
            name: name.to_string(),
            target_time: "2000-06-27T18:50:19Z".to_string(),
            position_km: [7022.465_292_66, -1400.082_967_55, 0.039_951_55],
            velocity_km_s: [1.893_841_015, 6.405_893_759, 4.534_807_25],
        }
    }

    #[test]
    fn result_line_pads_id_and_name() {
        assert_eq!(
            result_line(&result("VANGUARD 1")),
            "     5  VANGUARD 1                   | r_km=(  7022.465, -1400.083,     0.040) | v_km_s=(  1.893841,  6.405894,  4.534807)"
        );
    }

    #[test]
    fn mixed_signs_keep_columns_aligned() {
        let positive = result("VANGUARD 1");
        let mut negative = positive.clone();
        negative.position_km = positive.position_km.map(|c| -c);
        negative.velocity_km_s = positive.velocity_km_s.map(|c| -c);

        let a = result_line(&positive);
        let b = result_line(&negative);
        assert_eq!(a.len(), b.len());
        assert_eq!(a.find("| v_km_s"), b.find("| v_km_s"));
        assert!(b.contains("r_km=( -7022.465,  1400.083,    -0.040)"));
    }

    #[test]
    fn long_names_are_truncated() {
        let line = result_line(&result("AN OBJECT NAME THAT IS FAR TOO LONG TO FIT"));
        assert!(line.contains("AN OBJECT NAME THAT IS FAR T |"));
    }

    #[test]
    fn header_counts_results() {
        let report = PropagationReport {
            target_time: "2000-06-27T18:50:19Z".to_string(),
            results: vec![result("A"), result("B")],
            failures: Vec::new(),
        };
        assert_eq!(
            header_line(&report),
            "Propagated 2 satellites to time 2000-06-27T18:50:19Z"
        );
    }
}
