#![no_main]

use diffview::ops::{after_text, before_text, diff_chars, diff_lines};
use diffview::{diff_with, Algorithm, ColorChoice, DiffOptions, Strategy};
use libfuzzer_sys::fuzz_target;

/// First characters a rendered patch line can start with.
const VALID_LINE_PREFIXES: [char; 4] = [' ', '+', '-', '@'];

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // first byte picks the split point and the patch margin
    let split = data[0] as usize % data.len();
    let margin = u32::from(data[0] % 9);
    let before = String::from_utf8_lossy(&data[1..split.max(1)]);
    let after = String::from_utf8_lossy(&data[split.max(1)..]);

    for algorithm in [Algorithm::Myers, Algorithm::MyersMinimal] {
        let ops = diff_chars(algorithm, &before, &after);
        assert_eq!(before_text(&ops), before);
        assert_eq!(after_text(&ops), after);
        let ops = diff_lines(algorithm, &before, &after);
        assert_eq!(before_text(&ops), before);
        assert_eq!(after_text(&ops), after);

        let mut options = DiffOptions::default();
        options
            .algorithm(algorithm)
            .color(ColorChoice::Never)
            .patch_margin(margin);
        let differ = diff_with(options, &before, &after);
        let output = differ.render_to_string().expect("rendering failed");

        if differ.strategy() == Strategy::Unified {
            for line in output.lines().filter(|line| !line.is_empty()) {
                let prefix = line.chars().next().unwrap_or(' ');
                assert!(
                    VALID_LINE_PREFIXES.contains(&prefix),
                    "unexpected line {line:?} in {output:?}"
                );
            }
        }
        assert_eq!(differ.render_to_string().unwrap(), output);
    }
});
