use kgphenio_core::{first_non_empty, parse_header, parse_row, HeaderMapping, RowPolicy, TAB};
use proptest::prelude::*;

fn field() -> impl Strategy<Value = String> {
    // No separators, quotes or surrounding whitespace: those are normalized away.
    proptest::string::string_regex("[A-Za-z0-9:_.][A-Za-z0-9:_. ]{0,8}[A-Za-z0-9:_.]").unwrap()
}

fn fields(max: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(field(), 1..=max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn lenient_zip_takes_the_shorter_side(header in fields(6), data in fields(6)) {
        let header_line = header.join("\t");
        let parsed_header = parse_header(&header_line, TAB);
        prop_assert_eq!(&parsed_header, &header);

        let row = parse_row(&data.join("\t"), &parsed_header, TAB, RowPolicy::Lenient)
            .expect("lenient never fails");
        prop_assert_eq!(row.len(), header.len().min(data.len()));

        let strict = parse_row(&data.join("\t"), &parsed_header, TAB, RowPolicy::Strict);
        prop_assert_eq!(strict.is_ok(), header.len() == data.len());
    }

    #[test]
    fn first_non_empty_matches_linear_scan(values in proptest::collection::vec(
        prop_oneof![Just(String::new()), field()], 0..6)) {
        let keys: Vec<String> = (0..values.len()).map(|i| format!("k{i}")).collect();
        let row = HeaderMapping::from_pairs(keys.iter().cloned().zip(values.iter().cloned()).collect());

        let expected = values.iter().find(|v| !v.is_empty()).map(String::as_str);
        prop_assert_eq!(first_non_empty(&row, &keys).ok(), expected);
    }
}
