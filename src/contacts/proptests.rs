//! Property-based tests for the contact transforms

use super::extract::{extract_lines, partition_lines};
use super::split::{chunk_sizes, split_into};
use super::vcard::{
    append_records, build_records, serialize, telephone_lines, telephone_value, NameStyle,
    RecordShape,
};
use super::{normalize, PhoneNumber};
use proptest::prelude::*;

fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[0-9]{1,12}",
        "[a-z +()-]{0,4}[0-9]{1,10}[a-z ]{0,3}",
    ]
}

fn arb_numbers() -> impl Strategy<Value = Vec<PhoneNumber>> {
    proptest::collection::vec("[0-9]{1,12}", 0..20)
        .prop_map(|raw| raw.iter().filter_map(|r| normalize(r)).collect())
}

proptest! {
    #[test]
    fn prop_normalize_keeps_digits_in_order(raw in "\\PC{0,40}") {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        match normalize(&raw) {
            Some(number) => {
                prop_assert!(number.as_str().starts_with('+'));
                prop_assert_eq!(number.digits(), digits.as_str());
                prop_assert!(number.digits().bytes().all(|b| b.is_ascii_digit()));
            }
            None => prop_assert!(digits.is_empty()),
        }
    }

    #[test]
    fn prop_partition_is_exact(lines in proptest::collection::vec(arb_line(), 0..30), count in 0usize..40) {
        let text = lines.join("\n");
        let all = extract_lines(&text);
        let part = partition_lines(&text, count);

        prop_assert_eq!(part.selected.len(), count.min(all.len()));
        let mut joined = part.selected.clone();
        joined.extend(part.remainder.clone());
        prop_assert_eq!(joined, all);
    }

    #[test]
    fn prop_chunks_cover_everything(total in 0usize..500, parts in 1usize..50) {
        let sizes = chunk_sizes(total, parts);
        prop_assert_eq!(sizes.len(), parts);
        prop_assert_eq!(sizes.iter().sum::<usize>(), total);
        let base = total / parts;
        for size in &sizes[..parts - 1] {
            prop_assert_eq!(*size, base);
        }
        prop_assert_eq!(sizes[parts - 1], total - base * (parts - 1));
    }

    #[test]
    fn prop_split_into_preserves_order(items in proptest::collection::vec(any::<u16>(), 0..100), parts in 1usize..12) {
        let chunks = split_into(&items, parts);
        let flat: Vec<u16> = chunks.concat();
        prop_assert_eq!(flat, items);
    }

    #[test]
    fn prop_append_is_prefix_preserving(original in proptest::collection::vec(any::<u8>(), 0..200), numbers in arb_numbers()) {
        let blocks = build_records("Admin", &numbers, NameStyle::Numbered, RecordShape::Structured);
        let out = append_records(&original, &blocks);
        prop_assert!(out.starts_with(&original));
    }

    #[test]
    fn prop_serialize_round_trips_numbers(numbers in arb_numbers()) {
        let blocks = build_records("Budi", &numbers, NameStyle::Numbered, RecordShape::Formatted);
        let doc = serialize(&blocks);
        prop_assert_eq!(serialize(&blocks), doc.clone());

        let recovered: Vec<&str> = telephone_lines(&doc)
            .into_iter()
            .filter_map(telephone_value)
            .collect();
        let expected: Vec<&str> = numbers.iter().map(PhoneNumber::as_str).collect();
        prop_assert_eq!(recovered, expected);
    }
}
