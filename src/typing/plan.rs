//! Splitting text into emission steps.
//!
//! Control characters (`\n`, `\r`, `\t`) are always their own step.  All
//! other characters are grouped into batches of at most `batch_size`; a
//! batch stops right before the first control character it would contain.

use crate::inject::SpecialKey;

/// One unit of emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Ordinary characters typed in one call.
    Batch(String),
    /// A control character sent as a key press.
    Control(char),
}

impl Step {
    /// Character that decides the pause after this step.
    pub fn last_char(&self) -> Option<char> {
        match self {
            Step::Batch(chunk) => chunk.chars().last(),
            Step::Control(c) => Some(*c),
        }
    }

    /// Key to press for a control step.
    pub fn key(&self) -> Option<SpecialKey> {
        match self {
            Step::Control(c) => SpecialKey::for_char(*c),
            Step::Batch(_) => None,
        }
    }
}

fn is_control(c: char) -> bool {
    SpecialKey::for_char(c).is_some()
}

/// Step starting at `chars[start]` and the number of characters it covers.
///
/// `start` must be in bounds.  A `batch_size` of 0 is treated as 1.
pub fn next_step(chars: &[char], start: usize, batch_size: usize) -> (Step, usize) {
    let first = chars[start];
    if is_control(first) {
        return (Step::Control(first), 1);
    }

    let limit = (start + batch_size.max(1)).min(chars.len());
    let end = chars[start..limit]
        .iter()
        .position(|&c| is_control(c))
        .map_or(limit, |offset| start + offset);

    let chunk: String = chars[start..end].iter().collect();
    (Step::Batch(chunk), end - start)
}

/// Every step for `text`, in order.
pub fn plan_steps(text: &str, batch_size: usize) -> Vec<Step> {
    let chars: Vec<char> = text.chars().collect();
    let mut steps = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (step, len) = next_step(&chars, i, batch_size);
        steps.push(step);
        i += len;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(s: &str) -> Step {
        Step::Batch(s.into())
    }

    #[test]
    fn tab_splits_batches() {
        assert_eq!(
            plan_steps("hi\tbye", 3),
            vec![batch("hi"), Step::Control('\t'), batch("bye")]
        );
    }

    #[test]
    fn empty_text_has_no_steps() {
        assert!(plan_steps("", 3).is_empty());
    }

    #[test]
    fn plain_text_batches_are_bounded_and_lossless() {
        let texts = [
            "a",
            "ab",
            "abc",
            "abcd",
            "The quick brown fox, jumps.",
            "สวัสดีครับ — ok?",
        ];
        for text in texts {
            for size in 1..=5 {
                let steps = plan_steps(text, size);
                let mut joined = String::new();
                for step in &steps {
                    match step {
                        Step::Batch(chunk) => {
                            let n = chunk.chars().count();
                            assert!(n >= 1 && n <= size, "{text:?} size {size}: {chunk:?}");
                            joined.push_str(chunk);
                        }
                        Step::Control(c) => panic!("unexpected control {c:?}"),
                    }
                }
                assert_eq!(joined, text);
            }
        }
    }

    #[test]
    fn control_inside_window_truncates_before_it() {
        // A naive window of 3 starting at 'a' would be "a\nb".
        assert_eq!(
            plan_steps("a\nb", 3),
            vec![batch("a"), Step::Control('\n'), batch("b")]
        );
        assert_eq!(
            plan_steps("ab\r\ncd", 3),
            vec![
                batch("ab"),
                Step::Control('\r'),
                Step::Control('\n'),
                batch("cd")
            ]
        );
    }

    #[test]
    fn next_step_reports_truncation_point() {
        let chars: Vec<char> = "xy\tz".chars().collect();
        assert_eq!(next_step(&chars, 0, 3), (batch("xy"), 2));
        assert_eq!(next_step(&chars, 2, 3), (Step::Control('\t'), 1));
        assert_eq!(next_step(&chars, 3, 3), (batch("z"), 1));
    }

    #[test]
    fn leading_and_consecutive_controls_are_individual() {
        assert_eq!(
            plan_steps("\n\n\tx", 3),
            vec![
                Step::Control('\n'),
                Step::Control('\n'),
                Step::Control('\t'),
                batch("x")
            ]
        );
    }

    #[test]
    fn zero_batch_size_acts_as_one() {
        assert_eq!(plan_steps("ab", 0), vec![batch("a"), batch("b")]);
    }

    #[test]
    fn step_keys_and_last_chars() {
        assert_eq!(Step::Control('\r').key(), Some(SpecialKey::Enter));
        assert_eq!(Step::Control('\t').key(), Some(SpecialKey::Tab));
        assert_eq!(batch("ab.").key(), None);
        assert_eq!(batch("ab.").last_char(), Some('.'));
        assert_eq!(Step::Control('\n').last_char(), Some('\n'));
    }
}
