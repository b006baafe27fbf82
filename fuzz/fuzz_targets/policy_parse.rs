#![no_main]

use libfuzzer_sys::fuzz_target;
use flow_lattice::{Lattice, PolicyParser, Registry};
use std::sync::{Arc, OnceLock};

fn parser() -> &'static PolicyParser {
    static PARSER: OnceLock<PolicyParser> = OnceLock::new();
    PARSER.get_or_init(|| {
        let mut data_type = Lattice::from_edges(
            "DataType",
            [
                ("UniqueID", vec!["AccountID", "IPAddress"]),
                ("Location", vec!["IPAddress"]),
            ],
        )
        .unwrap();
        let state = Lattice::from_edges("TypeState", [("Truncated", vec!["Redacted"])]).unwrap();
        data_type.product(Arc::new(state));
        let purpose = Lattice::from_edges("Purpose", [("Sharing", Vec::<&str>::new())]).unwrap();
        PolicyParser::new(Registry::new([data_type, purpose]).unwrap())
    })
}

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let parser = parser();
    if let Ok(policy) = parser.parse(&s) {
        // A parsed policy renders to text that parses to the same tree.
        let rendered = policy.to_string();
        let reparsed = parser.parse(&rendered).unwrap();
        assert_eq!(reparsed.to_string(), rendered);

        if let Ok(annotation) = parser.parse_annotation("DataType IPAddress:Truncated Purpose Sharing") {
            let _ = policy.apply_on(&annotation);
        }
    }
    let _ = parser.parse_annotation(&s);
});
