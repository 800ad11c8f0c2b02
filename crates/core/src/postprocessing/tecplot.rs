//! Loader for MERRILL's Tecplot FEPOINT field output.
//!
//! Only the first zone is read; later zones (extra images written by
//! multi-image runs) are ignored. Node rows may wrap across lines, so the
//! data section is consumed as a stream of whitespace-separated tokens.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{parse_fortran_float, PostProcessError};

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)""#).expect("valid regex"));

static ZONE_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(N|E|ET|F|NODES|ELEMENTS|ZONETYPE|DATAPACKING)\s*=\s*("[^"]*"|[^,\s]+)"#)
        .expect("valid regex")
});

/// One finite-element zone of tetrahedra with per-node values.
///
/// Serializes as `{variables, nodes, elements, values, connectivity}`;
/// `values` holds one row per node in variable order and `connectivity`
/// holds zero-based node indices.
#[derive(Debug, Clone, Serialize)]
pub struct TecplotZone {
    #[serde(skip)]
    pub title: Option<String>,
    pub variables: Vec<String>,
    pub nodes: usize,
    pub elements: usize,
    pub values: Vec<Vec<f64>>,
    pub connectivity: Vec<[usize; 4]>,
}

impl TecplotZone {
    /// Column of `name`, compared case-insensitively.
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables
            .iter()
            .position(|v| v.eq_ignore_ascii_case(name))
    }
}

/// Read and parse a Tecplot file.
pub fn load_tecplot(path: &Path) -> Result<TecplotZone, PostProcessError> {
    let text = std::fs::read_to_string(path).map_err(|source| PostProcessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tecplot(&text)
}

fn malformed(line: usize, message: impl Into<String>) -> PostProcessError {
    PostProcessError::Tecplot {
        line,
        message: message.into(),
    }
}

fn starts_numeric(line: &str) -> bool {
    line.trim_start()
        .starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
}

fn variable_names(text: &str) -> Vec<String> {
    if text.contains('"') {
        QUOTED
            .captures_iter(text)
            .map(|caps| caps[1].trim().to_string())
            .collect()
    } else {
        text.split([',', ' ', '\t'])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Parse the first zone of a Tecplot FEPOINT document.
pub fn parse_tecplot(text: &str) -> Result<TecplotZone, PostProcessError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut title = None;
    let mut variables = Vec::new();

    // Header: TITLE and VARIABLES (possibly continued on quoted lines) up to ZONE.
    let mut pos = 0;
    loop {
        let Some(line) = lines.get(pos) else {
            return Err(malformed(lines.len(), "no ZONE record"));
        };
        let trimmed = line.trim();
        let upper = trimmed.to_ascii_uppercase();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            pos += 1;
            continue;
        }
        if upper.starts_with("TITLE") {
            title = QUOTED.captures(trimmed).map(|caps| caps[1].to_string());
        } else if upper.starts_with("VARIABLES") {
            let list = trimmed.split_once('=').map_or("", |(_, rest)| rest);
            variables.extend(variable_names(list));
        } else if trimmed.starts_with('"') {
            variables.extend(variable_names(trimmed));
        } else if upper.starts_with("ZONE") {
            break;
        } else {
            return Err(malformed(pos + 1, format!("unexpected record '{trimmed}'")));
        }
        pos += 1;
    }
    let zone_line = pos + 1;
    if variables.is_empty() {
        return Err(malformed(zone_line, "no VARIABLES before ZONE"));
    }

    // Zone attributes may continue on following lines until the data starts.
    let mut zone_text = String::new();
    while let Some(line) = lines.get(pos) {
        if pos + 1 > zone_line && (line.trim().is_empty() || starts_numeric(line)) {
            break;
        }
        zone_text.push_str(line);
        zone_text.push(' ');
        pos += 1;
    }
    let data_start = pos;

    let attributes: HashMap<String, String> = ZONE_ATTRIBUTE
        .captures_iter(&zone_text)
        .map(|caps| {
            (
                caps[1].to_ascii_uppercase(),
                caps[2].trim_matches('"').to_string(),
            )
        })
        .collect();
    let count = |keys: [&str; 2]| -> Result<usize, PostProcessError> {
        let raw = keys
            .iter()
            .find_map(|k| attributes.get(*k))
            .ok_or_else(|| malformed(zone_line, format!("ZONE lacks {}=", keys[0])))?;
        raw.parse()
            .map_err(|_| malformed(zone_line, format!("{}={raw} is not a count", keys[0])))
    };
    let nodes = count(["N", "NODES"])?;
    let elements = count(["E", "ELEMENTS"])?;

    match (attributes.get("ET"), attributes.get("ZONETYPE")) {
        (Some(et), _) if et.eq_ignore_ascii_case("TETRAHEDRON") => {}
        (None, Some(zt)) if zt.eq_ignore_ascii_case("FETETRAHEDRON") => {}
        (et, zt) => {
            let found = et.or(zt).map_or("none", String::as_str);
            return Err(malformed(
                zone_line,
                format!("element type must be tetrahedron, found {found}"),
            ));
        }
    }
    if let Some(packing) = attributes.get("F").or(attributes.get("DATAPACKING")) {
        if !packing.eq_ignore_ascii_case("FEPOINT") && !packing.eq_ignore_ascii_case("POINT") {
            return Err(malformed(
                zone_line,
                format!("unsupported data packing {packing}"),
            ));
        }
    }

    let mut tokens = lines[data_start..]
        .iter()
        .copied()
        .enumerate()
        .flat_map(|(offset, line)| {
            line.split_whitespace()
                .map(move |token| (data_start + offset + 1, token))
        });
    let truncated = || malformed(lines.len(), "unexpected end of data");

    let mut values = Vec::with_capacity(nodes);
    for _ in 0..nodes {
        let mut row = Vec::with_capacity(variables.len());
        for _ in 0..variables.len() {
            let (line, token) = tokens.next().ok_or_else(truncated)?;
            let value = parse_fortran_float(token)
                .ok_or_else(|| malformed(line, format!("'{token}' is not a number")))?;
            row.push(value);
        }
        values.push(row);
    }

    let mut connectivity = Vec::with_capacity(elements);
    for _ in 0..elements {
        let mut tet = [0usize; 4];
        for slot in &mut tet {
            let (line, token) = tokens.next().ok_or_else(truncated)?;
            let index: usize = token
                .parse()
                .map_err(|_| malformed(line, format!("'{token}' is not a node index")))?;
            if index == 0 || index > nodes {
                return Err(malformed(
                    line,
                    format!("node index {index} outside 1..={nodes}"),
                ));
            }
            *slot = index - 1;
        }
        connectivity.push(tet);
    }

    Ok(TecplotZone {
        title,
        variables,
        nodes,
        elements,
        values,
        connectivity,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SINGLE_TET: &str = r#"TITLE = "magnetization"
VARIABLES = "X","Y","Z","Mx","My","Mz","Vx","Vy","Vz","H","RH","ADM"
ZONE T="1", N=4, E=1, F=FEPOINT, ET=TETRAHEDRON
0 0 0 1 0 0 0 0 0 0 0 0
1 0 0 1 0 0 0 0 0 0 0 0
0 1 0 1 0 0 0 0 0 0 0 0
0 0 1 1 0 0 0 0 0 0 0 0
1 2 3 4
"#;

    #[test]
    fn parses_single_tetrahedron() {
        let zone = parse_tecplot(SINGLE_TET).unwrap();
        assert_eq!(zone.title.as_deref(), Some("magnetization"));
        assert_eq!(zone.variables.len(), 12);
        assert_eq!(zone.nodes, 4);
        assert_eq!(zone.elements, 1);
        assert_eq!(zone.values[1][0], 1.0);
        assert_eq!(zone.connectivity, vec![[0, 1, 2, 3]]);
        assert_eq!(zone.variable_index("mx"), Some(3));
    }

    #[test]
    fn later_zones_are_ignored() {
        let text = format!(
            "{SINGLE_TET}ZONE T=\"2\", N=4, E=1, F=FEPOINT, ET=TETRAHEDRON\n\
             9 9 9 9 9 9 9 9 9 9 9 9\n"
        );
        let zone = parse_tecplot(&text).unwrap();
        assert_eq!(zone.nodes, 4);
        assert!(zone.values.iter().all(|row| row[3] == 1.0));
    }

    #[test]
    fn wrapped_rows_and_multiline_header() {
        let text = "VARIABLES = \"X\",\"Y\"\n\"Z\"\nZONE N=1, E=0\nET=TETRAHEDRON\n1.0\n2.0 3D0\n";
        let zone = parse_tecplot(text).unwrap();
        assert_eq!(zone.variables, vec!["X", "Y", "Z"]);
        assert_eq!(zone.values, vec![vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn truncated_data_is_rejected() {
        let text = SINGLE_TET.replace("1 2 3 4\n", "");
        assert_matches!(
            parse_tecplot(&text),
            Err(PostProcessError::Tecplot { message, .. }) if message.contains("end of data")
        );
    }

    #[test]
    fn out_of_range_connectivity_is_rejected() {
        let text = SINGLE_TET.replace("1 2 3 4", "1 2 3 5");
        assert_matches!(
            parse_tecplot(&text),
            Err(PostProcessError::Tecplot { line: 8, .. })
        );
    }

    #[test]
    fn non_tetrahedral_zone_is_rejected() {
        let text = SINGLE_TET.replace("ET=TETRAHEDRON", "ET=BRICK");
        let err = parse_tecplot(&text).unwrap_err();
        assert!(err.to_string().contains("BRICK"));
    }

    #[test]
    fn raw_json_uses_documented_keys() {
        let zone = parse_tecplot(SINGLE_TET).unwrap();
        let json = serde_json::to_value(&zone).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["connectivity", "elements", "nodes", "values", "variables"]
        );
    }
}
