#![no_main]
use libfuzzer_sys::fuzz_target;
use school_query::RecordShape;
use school_query::query::{compile_filter, parse_filter};

struct Row {
    name: String,
    score: i64,
    nested: Option<Box<Row>>,
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        // Parsing and compiling never panic, whatever the input
        let parsed = parse_filter(s);
        let inner = RecordShape::builder("Inner")
            .string("Name", |r: &Row| r.name.as_str())
            .long("Score", |r: &Row| r.score)
            .build();
        let shape = RecordShape::builder("Row")
            .string("Name", |r: &Row| r.name.as_str())
            .long("Score", |r: &Row| r.score)
            .nested("Nested", &inner, |r: &Row| r.nested.as_deref())
            .build();
        let compiled = compile_filter(&shape, s);
        assert!(compiled.group_count() <= parsed.groups.len());
        let row = Row { name: s.to_string(), score: 0, nested: None };
        let _ = compiled.matches(&row);
    }
});
