//! Message tests: header negotiation, extraction with metadata and maps, and assembly.

use astm_records::message::{DELIMITERS_KEY, MESSAGE_TYPE_KEY, TYPE_KEY};
use astm_records::{
    assemble_message, extract_message, CodecError, DelimiterSet, Dialect, ExtractOptions, MapDirection, Message,
    RecordContent, TranslationMap,
};

const ORDER_MESSAGE: &str = concat!(
    "H|\\^&|||Mini LIS|||||||P|LIS2-A|20210309155210\r\n",
    "P|1|PID123456|||Brown^Bobby^B|White|196501020304|M|PHY1001^Brewster^Katherine\\PHY1002^McCoy^Leonard^H\r\n",
    "O|1|SID304||Type &E& Screen|N|20210309155210|||||N||||CENTBLOOD\r\n",
    "Q|1|^=W13131200096100||||||||||O\r\n",
    "L|1|N\r\n",
);

const MAP: &str = "\
H.5:SenderName
P.3:PatPracticePID
P.6.1.1:PatLastName
P.6.1.2:PatFirstName
O.3:SpecimenID
O.5:TestID
";

fn lookup<'a>(content: &'a RecordContent, key: &str) -> Option<&'a str> {
    content.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

#[test]
fn test_extract_appends_metadata() {
    let records = extract_message(ORDER_MESSAGE, None, &ExtractOptions::default()).expect("extract");
    assert_eq!(records.len(), 5);
    let types: Vec<&str> = records.iter().map(|r| r.record_type.as_str()).collect();
    assert_eq!(types, ["H", "P", "O", "Q", "L"]);

    for record in &records {
        assert_eq!(record.dialect, Some(Dialect::Astm));
        assert_eq!(lookup(&record.content, TYPE_KEY), Some(record.record_type.as_str()));
        assert_eq!(lookup(&record.content, DELIMITERS_KEY), Some(r"|\^&"));
        assert_eq!(lookup(&record.content, MESSAGE_TYPE_KEY), Some("ASTM"));
    }
    let header = &records[0].content;
    assert_eq!(lookup(header, "H.2"), None);
    assert_eq!(lookup(header, "H.5"), Some("Mini LIS"));
    assert_eq!(lookup(&records[2].content, "O.5"), Some("Type & Screen"));
}

#[test]
fn test_extract_through_map() {
    let map = TranslationMap::parse(MAP, MapDirection::Forward);
    let options = ExtractOptions {
        only_mapped: true,
        include_metadata: false,
        ..ExtractOptions::default()
    };
    let records = extract_message(ORDER_MESSAGE, Some(&map), &options).expect("extract");
    assert_eq!(records[0].content, vec![("SenderName".to_string(), "Mini LIS".to_string())]);
    let patient: Vec<&str> = records[1].content.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(patient, ["PatPracticePID", "PatLastName", "PatFirstName"]);
    assert!(records[4].content.is_empty());
}

#[test]
fn test_assemble_round_trip() {
    let map = TranslationMap::parse(MAP, MapDirection::Forward);
    let options = ExtractOptions::default();
    let content: Vec<RecordContent> = extract_message(ORDER_MESSAGE, Some(&map), &options)
        .expect("extract")
        .into_iter()
        .map(|r| r.content)
        .collect();

    let text = assemble_message(&content, &DelimiterSet::astm(), Dialect::Astm, Some(&map.inverse()), false)
        .expect("assemble");
    let expected: Vec<&str> = ORDER_MESSAGE.lines().collect();
    assert_eq!(text, expected);
}

#[test]
fn test_assemble_leaves_only_round_trip() {
    let options = ExtractOptions {
        suppress_ambiguous_top_level: true,
        ..ExtractOptions::default()
    };
    let content: Vec<RecordContent> = extract_message(ORDER_MESSAGE, None, &options)
        .expect("extract")
        .into_iter()
        .map(|r| r.content)
        .collect();
    let text = assemble_message(&content, &DelimiterSet::astm(), Dialect::Astm, None, false).expect("assemble");
    assert_eq!(text, ORDER_MESSAGE.lines().collect::<Vec<_>>());
}

#[test]
fn test_assemble_skips_empty_records() {
    let content = vec![
        vec![(TYPE_KEY.to_string(), "H".to_string())],
        vec![(MESSAGE_TYPE_KEY.to_string(), "ASTM".to_string())],
        vec![("L.2".to_string(), "1".to_string()), (TYPE_KEY.to_string(), "L".to_string())],
    ];
    let text = assemble_message(&content, &DelimiterSet::astm(), Dialect::Astm, None, false).expect("assemble");
    assert_eq!(text, [r"H|\^&", "L|1"]);
}

#[test]
fn test_assemble_rejects_unmapped_tokens() {
    let content = vec![vec![("NotAnAddress".to_string(), "x".to_string())]];
    let err = assemble_message(&content, &DelimiterSet::astm(), Dialect::Astm, None, false).unwrap_err();
    assert!(matches!(err, CodecError::InvalidAddress(_)), "{:?}", err);
}

#[test]
fn test_parse_skips_blank_and_comment_lines() {
    let text = "# captured 2021-03-09\n\nH|\\^&\n   \n# patient\nP|1\nL|1\n";
    let message = Message::parse(text, &ExtractOptions::default()).expect("parse");
    assert_eq!(message.len(), 3);
    assert_eq!(message.to_text("\n"), "H|\\^&\nP|1\nL|1");
}

#[test]
fn test_custom_delimiters_negotiated() {
    let text = "H!@#$\rP!1!a@b#c$F$d";
    let message = Message::parse(text, &ExtractOptions::default()).expect("parse");
    let p = message.records().nth(1).expect("P record");
    assert_eq!(p.delimiters(), &DelimiterSet::new(['!', '@', '#'], '$').expect("delimiters"));
    assert_eq!(p.get("P.3.2.1").expect("get"), "b");
    assert_eq!(p.get("P.3.2.2").expect("get"), "c!d");
    let records = message.extract(None, &ExtractOptions::default());
    assert_eq!(lookup(&records[1].content, DELIMITERS_KEY), Some("!@#$"));
}

#[test]
fn test_missing_delimiter_set() {
    let options = ExtractOptions {
        default_delimiters: None,
        ..ExtractOptions::default()
    };
    let err = Message::parse("P|1\rH|\\^&", &options).unwrap_err();
    assert!(matches!(err, CodecError::MissingDelimiterSet(_)), "{:?}", err);
    assert!(Message::parse("H|\\^&\rP|1", &options).is_ok());
}

#[test]
fn test_malformed_header() {
    let err = Message::parse("H|\\", &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, CodecError::MalformedHeader(_)), "{:?}", err);
}

#[test]
fn test_hl7_metadata() {
    let text = "MSH|^~\\&|LAB\rPID|1||12345";
    let records = extract_message(text, None, &ExtractOptions::default()).expect("extract");
    assert_eq!(lookup(&records[1].content, MESSAGE_TYPE_KEY), Some("HL7"));
    assert_eq!(lookup(&records[1].content, DELIMITERS_KEY), Some("|^~\\&"));
    assert_eq!(lookup(&records[1].content, "PID.4"), Some("12345"));
}

#[test]
fn test_records_mut_edits_serialize() {
    let mut message = Message::parse("H|\\^&\nP|1|PID1", &ExtractOptions::default()).expect("parse");
    for record in message.records_mut() {
        if record.record_type() == "P" {
            record.set("P.3", "PID2").expect("set");
        }
    }
    assert_eq!(message.to_text("\r"), "H|\\^&\rP|1|PID2");
}

#[test]
fn test_assemble_keeps_composite_beside_partial_parts() {
    let map = TranslationMap::parse("P.6:PatName\nP.6.1.1:PatLastName", MapDirection::Forward);
    let options = ExtractOptions {
        only_mapped: true,
        ..ExtractOptions::default()
    };
    let content: Vec<RecordContent> = extract_message(ORDER_MESSAGE, Some(&map), &options)
        .expect("extract")
        .into_iter()
        .map(|r| r.content)
        .collect();
    assert_eq!(lookup(&content[1], "PatName"), Some("Brown^Bobby^B"));
    assert_eq!(lookup(&content[1], "PatLastName"), Some("Brown"));

    let text = assemble_message(&content, &DelimiterSet::astm(), Dialect::Astm, Some(&map.inverse()), true)
        .expect("assemble");
    assert!(text.contains(&"P|||||Brown^Bobby^B".to_string()), "{:?}", text);
}

#[test]
fn test_assemble_parts_override_composite_in_any_order() {
    let content = vec![vec![
        ("P.6.1.2".to_string(), "Robert".to_string()),
        ("P.6".to_string(), "Brown^Bobby^B".to_string()),
        (TYPE_KEY.to_string(), "P".to_string()),
    ]];
    let text = assemble_message(&content, &DelimiterSet::astm(), Dialect::Astm, None, false).expect("assemble");
    assert_eq!(text, ["P|||||Brown^Robert^B"]);
}
