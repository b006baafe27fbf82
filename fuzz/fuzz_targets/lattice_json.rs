#![no_main]

use libfuzzer_sys::fuzz_target;
use flow_lattice::{Lattice, Value, BOTTOM, TOP};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(lattices) = Lattice::many_from_json(s) {
            for lattice in lattices {
                let elements = lattice.elements();
                assert!(elements.contains(&TOP));
                assert!(elements.contains(&BOTTOM));
                for e in elements.iter().take(8) {
                    let v = Value::new(*e);
                    assert!(lattice.precede(&v, &Value::top()));
                    let _ = lattice.meet(&v, &Value::bottom());
                }
            }
        }
    }
});
