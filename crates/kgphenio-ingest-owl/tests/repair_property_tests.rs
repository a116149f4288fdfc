use kgphenio_ingest_owl::{repair_markup, RepairConfig};
use proptest::prelude::*;
use std::fs;
use tempfile::tempdir;

fn line() -> impl Strategy<Value = String> {
    let bad = RepairConfig::default().known_bad_lines;
    prop_oneof![
        // Known-bad lines with arbitrary padding.
        (proptest::sample::select(bad), "[ \t]{0,3}", "[ \t]{0,3}")
            .prop_map(|(b, pre, post)| format!("{pre}{b}{post}")),
        // Ordinary markup, including near misses.
        Just("<rdfs:comment>text</rdfs:comment>".to_string()),
        Just("<rdfs:comment> </rdfs:comment>".to_string()),
        Just("<oboInOwl:hasDbXref></oboInOwl:hasDbXref><x/>".to_string()),
        "[ -~]{0,30}",
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn only_known_bad_lines_are_removed(lines in proptest::collection::vec(line(), 0..30), crlf in any::<bool>()) {
        let config = RepairConfig::default();
        let eol = if crlf { "\r\n" } else { "\n" };
        let dir = tempdir().unwrap();
        let path = dir.path().join("src.owl");
        let input: String = lines.iter().map(|l| format!("{l}{eol}")).collect();
        fs::write(&path, &input).unwrap();

        let report = repair_markup(&path, &config).unwrap();

        let expected: String = lines
            .iter()
            .filter(|l| !config.known_bad_lines.iter().any(|b| b == l.trim()))
            .map(|l| format!("{l}{eol}"))
            .collect();
        prop_assert_eq!(fs::read_to_string(&path).unwrap(), expected);
        prop_assert_eq!(report.lines_read, lines.len());
    }
}
