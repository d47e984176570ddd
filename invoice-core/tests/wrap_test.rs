use invoice_core::fonts::{Font, FontMetrics};
use invoice_core::wrap::wrap;

fn measure(s: &str) -> f64 {
    FontMetrics::text_width_mm(s, Font::Helvetica, 12.0)
}

// -------------------------------------------------------
// Width bound
// -------------------------------------------------------

#[test]
fn every_line_fits_the_column() {
    let texts = [
        "site visit and inspection of the north wall",
        "replace fixture; patch, sand and repaint ceiling",
        "follow-up: verify drainage slope / regrade as needed",
        "a",
        "word",
    ];
    for text in texts {
        for width in [15.0, 25.0, 40.0, 78.0] {
            let lines = wrap(text, width, measure);
            assert!(!lines.is_empty());
            for line in &lines {
                assert!(
                    measure(line) <= width,
                    "{line:?} measures {} in column {width}",
                    measure(line)
                );
            }
        }
    }
}

#[test]
fn empty_string_is_one_empty_line() {
    assert_eq!(wrap("", 40.0, measure), vec![String::new()]);
}

// -------------------------------------------------------
// Progress and stability
// -------------------------------------------------------

#[test]
fn unbroken_token_terminates_within_progress_bound() {
    let text = "q".repeat(300);
    let width = 20.0;
    let lines = wrap(&text, width, measure);
    // At least one character lands per line.
    assert!(lines.len() <= 300);
    let rejoined: String = lines.concat();
    assert_eq!(rejoined, text);
}

#[test]
fn rewrapping_joined_output_is_stable() {
    let text = "replace the corroded supply line under the kitchen sink and \
                test all fittings for leaks over a full pressure cycle";
    for width in [25.0, 40.0, 78.0] {
        let first = wrap(text, width, measure);
        let rejoined = first.join(" ");
        let second = wrap(&rejoined, width, measure);
        assert_eq!(first.len(), second.len(), "width {width}");
    }
}

// -------------------------------------------------------
// Emergency split scenario
// -------------------------------------------------------

#[test]
fn five_hundred_chars_split_near_twenty_per_line() {
    // 'x' is 500/1000 em: 2.1167 mm at 12 pt, so a 43 mm column takes
    // exactly 20 characters per line after the safety margin.
    let text = "x".repeat(500);
    let lines = wrap(&text, 43.0, measure);
    assert_eq!(lines.len(), 25);
    for line in &lines {
        assert_eq!(line.chars().count(), 20);
        assert!(measure(line) <= 43.0);
    }
    assert_eq!(lines.concat(), text);
}
