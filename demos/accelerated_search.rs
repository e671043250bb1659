//! Accelerated FM-Index Example
//!
//! Parses a repetitive text, builds both indexes and compares their counts.
//!
//! ```bash
//! cargo run --example accelerated_search
//! ```

use alice_afm::pfp::parse_text;
use alice_afm::{AcceleratedIndex, BaselineIndex, IndexConfig, Result};

fn main() -> Result<()> {
    println!("=== ALICE-AFM Accelerated FM-Index Demo ===\n");

    let config = IndexConfig::load()?;
    config.validate()?;
    let params = config.params();

    // Forty copies of a short sequence, each with one substitution
    let unit = b"GATTACAGATTACATTAGACCAGATTGCACCGGTTAACCGGTTAAGGCATCATG";
    let mut text = Vec::new();
    for i in 0..40 {
        let mut copy = unit.to_vec();
        copy[i % unit.len()] = b'T';
        text.extend_from_slice(&copy);
    }

    let (dictionary, parse) = parse_text(&text, params)?;
    println!("Text:       {} bytes", text.len());
    println!("Params:     w = {}, p = {}", params.w, params.p);
    println!(
        "Dictionary: {} phrases, {} bytes",
        dictionary.len(),
        dictionary.total_len()
    );
    println!("Parse:      {} phrases", parse.len());

    let afm = AcceleratedIndex::with_config(&config, &dictionary, &parse)?;
    let baseline = BaselineIndex::with_config(&config, &dictionary, &parse)?;
    drop(dictionary);
    drop(parse);

    println!("\n--- Index Size ---\n");
    println!("  accelerated: {} bytes", afm.size_bytes());
    println!("  baseline:    {} bytes", baseline.size_bytes());

    println!("\n--- Search Results ---\n");

    let queries: [&[u8]; 6] = [
        b"GATTACA",
        b"CCGGTTAA",
        b"TTAGACCAGATTGCACCGG",
        b"ATCATGGATTACAGATTACATTAG",
        b"CAT",
        b"AAAAAAAA",
    ];

    for query in queries {
        let occurrences = afm.search(query);
        let expected = baseline.count(query);
        let status = if occurrences.len() == expected { "ok" } else { "MISMATCH" };
        println!(
            "  \"{}\" -> {} occurrences in {} parse intervals (baseline {}) [{}]",
            String::from_utf8_lossy(query),
            occurrences.len(),
            occurrences.ranges().len(),
            expected,
            status
        );
    }

    Ok(())
}
