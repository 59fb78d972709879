//! Parsing, printing and merging value trees.
//!
//! Run with: `cargo run --example values`

use brack::{brack, merge, parse, to_text, to_text_pretty, PrintOptions, Result};

fn main() -> Result<()> {
    // Parse a document with comments, markers and nested collections.
    let base = parse(
        "; monster template\n\
         {name imp\n\
          health 10\n\
          boss #false\n\
          sprite {frame-count 3 frame-types [1 3 5]}}",
    )?;
    println!("parsed: {}", to_text(&base)?);

    // Overlay a patch: scalars replace, nested maps merge.
    let patch = parse("{name fire-imp health 14 sprite {frame-types [2 4]}}")?;
    let merged = merge(&base, &patch, false);
    println!("merged: {}", to_text(&merged)?);

    // Pretty printing breaks complex collections across lines.
    println!("pretty:\n{}", to_text_pretty(&merged)?);

    // Values can also be built directly.
    let built = brack!({
        "scores": [12.25, 7.5, 9.125],
        "average": 9.625
    });
    let options = PrintOptions::new().with_max_decimal_digits(1);
    println!(
        "truncated: {}",
        brack::to_text_with_options(&built, &options)?
    );

    Ok(())
}
