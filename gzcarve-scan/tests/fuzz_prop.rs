//! Scanning arbitrary bytes never panics and never loses an embedded member.

use flate2::{Compression, GzBuilder};
use gzcarve_scan::{CarveOptions, Carver};
use proptest::prelude::*;
use std::io::Write;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzBuilder::new().write(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn magic_heavy_bytes() -> impl Strategy<Value = Vec<u8>> {
    // Plenty of magic bytes so candidates actually get validated
    proptest::collection::vec(
        prop_oneof![any::<u8>(), Just(0x1Fu8), Just(0x8Bu8), Just(0x08u8)],
        0..1024,
    )
}

proptest! {
    #[test]
    fn random_hosts_never_panic(host in magic_heavy_bytes(), thorough in any::<bool>()) {
        let options = CarveOptions::new().with_thorough(thorough).with_dry_run(true);
        let findings = Carver::new(options).scan_buffer(&host, "unused").unwrap();

        let mut last = None;
        for finding in &findings {
            prop_assert!(!finding.file_valid || finding.header_valid);
            prop_assert!(last < Some(finding.offset));
            last = Some(finding.offset);
        }
    }

    #[test]
    fn embedded_member_is_found(
        prefix in proptest::collection::vec(any::<u8>(), 0..256),
        suffix in proptest::collection::vec(any::<u8>(), 0..256),
        payload in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let member = gzip(&payload);
        let mut host = prefix.clone();
        host.extend_from_slice(&member);
        host.extend_from_slice(&suffix);

        let options = CarveOptions::new().with_dry_run(true);
        let findings = Carver::new(options).scan_buffer(&host, "unused").unwrap();

        let found = findings
            .iter()
            .filter_map(|f| f.member.as_ref())
            .any(|m| m.offset == prefix.len() as u64 && m.length == member.len() as u64);
        prop_assert!(found);
    }
}
