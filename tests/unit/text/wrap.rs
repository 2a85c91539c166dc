use super::*;

/// One pixel per character at size 1.
fn unit() -> ApproxMeasure {
    ApproxMeasure { em_advance: 1.0 }
}

fn texts(lines: &[WrappedLine]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}

#[test]
fn two_words_per_line_yields_exactly_two_lines() {
    // "alpha beta " measures 11.
    let lines = wrap_greedy("alpha beta gamma", 1.0, 11.0, &mut unit());
    assert_eq!(texts(&lines), vec!["alpha beta ", "gamma "]);
    assert_eq!(lines[0].width, 11.0);
    assert_eq!(lines[1].width, 6.0);
}

#[test]
fn everything_fits_on_one_line() {
    let lines = wrap_greedy("alpha beta gamma", 1.0, 1_000.0, &mut unit());
    assert_eq!(texts(&lines), vec!["alpha beta gamma "]);
}

#[test]
fn overlong_first_word_is_kept_not_split() {
    let lines = wrap_greedy("extraordinarily long", 1.0, 4.0, &mut unit());
    assert_eq!(texts(&lines), vec!["extraordinarily ", "long "]);
}

#[test]
fn explicit_newlines_start_new_paragraphs() {
    // A blank paragraph still contributes one (space-only) line.
    let lines = wrap_greedy("one\n\ntwo", 1.0, 100.0, &mut unit());
    assert_eq!(texts(&lines), vec!["one ", " ", "two "]);
}

#[test]
fn empty_content_draws_nothing() {
    assert!(wrap_greedy("", 40.0, 400.0, &mut unit()).is_empty());
}

#[test]
fn nan_width_never_wraps() {
    let lines = wrap_greedy("a b c", 1.0, f32::NAN, &mut unit());
    assert_eq!(lines.len(), 1);
}

#[test]
fn font_size_scales_measurement() {
    let lines = wrap_greedy("ab cd", 10.0, 35.0, &mut unit());
    assert_eq!(texts(&lines), vec!["ab ", "cd "]);
    assert_eq!(widest(&lines), 30.0);
}

#[test]
fn widest_of_nothing_is_zero() {
    assert_eq!(widest(&[]), 0.0);
}
