//! Code-128 symbology, code set C (digit pairs).
//!
//! A symbol is a start character, one value per digit pair, a modulo-103
//! checksum character and the stop character. Each character is six
//! alternating bar/space widths (bar first) totalling 11 modules; the stop
//! character has seven widths totalling 13.

use super::error::CodeError;

/// Element widths for symbol values 0..=105.
const PATTERNS: [[u8; 6]; 106] = [
    [2, 1, 2, 2, 2, 2],
    [2, 2, 2, 1, 2, 2],
    [2, 2, 2, 2, 2, 1],
    [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2],
    [1, 3, 1, 2, 2, 2],
    [1, 2, 2, 2, 1, 3],
    [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2],
    [2, 2, 1, 2, 1, 3],
    [2, 2, 1, 3, 1, 2],
    [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2],
    [1, 2, 2, 1, 3, 2],
    [1, 2, 2, 2, 3, 1],
    [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2],
    [1, 2, 3, 2, 2, 1],
    [2, 2, 3, 2, 1, 1],
    [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1],
    [2, 1, 3, 2, 1, 2],
    [2, 2, 3, 1, 1, 2],
    [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2],
    [3, 2, 1, 1, 2, 2],
    [3, 2, 1, 2, 2, 1],
    [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2],
    [3, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 3],
    [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1],
    [1, 1, 1, 3, 2, 3],
    [1, 3, 1, 1, 2, 3],
    [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3],
    [1, 3, 2, 1, 1, 3],
    [1, 3, 2, 3, 1, 1],
    [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3],
    [2, 3, 1, 3, 1, 1],
    [1, 1, 2, 1, 3, 3],
    [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1],
    [1, 1, 3, 1, 2, 3],
    [1, 1, 3, 3, 2, 1],
    [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1],
    [2, 1, 1, 3, 3, 1],
    [2, 3, 1, 1, 3, 1],
    [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1],
    [2, 1, 3, 1, 3, 1],
    [3, 1, 1, 1, 2, 3],
    [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1],
    [3, 1, 2, 1, 1, 3],
    [3, 1, 2, 3, 1, 1],
    [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1],
    [2, 2, 1, 4, 1, 1],
    [4, 3, 1, 1, 1, 1],
    [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2],
    [1, 2, 1, 1, 2, 4],
    [1, 2, 1, 4, 2, 1],
    [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1],
    [1, 1, 2, 2, 1, 4],
    [1, 1, 2, 4, 1, 2],
    [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1],
    [1, 4, 2, 1, 1, 2],
    [1, 4, 2, 2, 1, 1],
    [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4],
    [4, 1, 3, 1, 1, 1],
    [2, 4, 1, 1, 1, 2],
    [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2],
    [1, 2, 1, 1, 4, 2],
    [1, 2, 1, 2, 4, 1],
    [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2],
    [1, 2, 4, 2, 1, 1],
    [4, 1, 1, 2, 1, 2],
    [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1],
    [2, 1, 2, 1, 4, 1],
    [2, 1, 4, 1, 2, 1],
    [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3],
    [1, 1, 1, 3, 4, 1],
    [1, 3, 1, 1, 4, 1],
    [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1],
    [4, 1, 1, 1, 1, 3],
    [4, 1, 1, 3, 1, 1],
    [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1],
    [3, 1, 1, 1, 4, 1],
    [4, 1, 1, 1, 3, 1],
    [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4],
    [2, 1, 1, 2, 3, 2],
];

const STOP: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];

const START_C: u8 = 105;

/// Encode an even-length digit string as a module sequence (`true` = bar).
///
/// Quiet zones are not included.
pub fn encode_numeric(digits: &str) -> Result<Vec<bool>, CodeError> {
    if digits.is_empty() || digits.len() % 2 != 0 {
        return Err(CodeError::Symbol(format!(
            "code set C needs an even number of digits, got {}",
            digits.len()
        )));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodeError::NotNumeric(digits.to_string()));
    }

    let values: Vec<u8> = digits
        .as_bytes()
        .chunks(2)
        .map(|pair| (pair[0] - b'0') * 10 + (pair[1] - b'0'))
        .collect();

    let mut modules = Vec::with_capacity((values.len() + 3) * 11 + 2);
    push_widths(&mut modules, &PATTERNS[START_C as usize]);
    for value in &values {
        push_widths(&mut modules, &PATTERNS[*value as usize]);
    }
    push_widths(&mut modules, &PATTERNS[checksum(&values) as usize]);
    push_widths(&mut modules, &STOP);

    Ok(modules)
}

/// Decode a module sequence produced by [`encode_numeric`] back into digits.
///
/// Leading and trailing spaces (quiet zone) are ignored.
pub fn decode_numeric(modules: &[bool]) -> Result<String, CodeError> {
    let widths = run_widths(modules);
    if widths.len() < 6 * 3 + STOP.len() || (widths.len() - STOP.len()) % 6 != 0 {
        return Err(CodeError::Symbol(format!(
            "unexpected element count {}",
            widths.len()
        )));
    }

    let (body, stop) = widths.split_at(widths.len() - STOP.len());
    if stop != STOP {
        return Err(CodeError::Symbol("missing stop character".into()));
    }

    let mut symbols = Vec::with_capacity(body.len() / 6);
    for chunk in body.chunks(6) {
        let value = PATTERNS
            .iter()
            .position(|p| p[..] == *chunk)
            .ok_or_else(|| CodeError::Symbol(format!("unknown character {chunk:?}")))?;
        symbols.push(value as u8);
    }

    if symbols[0] != START_C {
        return Err(CodeError::Symbol("not a code set C symbol".into()));
    }
    let (check, values) = symbols[1..]
        .split_last()
        .ok_or_else(|| CodeError::Symbol("missing checksum".into()))?;
    if values.iter().any(|v| *v > 99) {
        return Err(CodeError::Symbol("control character in data".into()));
    }
    if checksum(values) != *check {
        return Err(CodeError::Symbol("checksum mismatch".into()));
    }

    Ok(values.iter().map(|v| format!("{v:02}")).collect())
}

fn checksum(values: &[u8]) -> u8 {
    let weighted: u32 = values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as u32 + 1) * u32::from(*v))
        .sum();
    ((u32::from(START_C) + weighted) % 103) as u8
}

fn push_widths(modules: &mut Vec<bool>, widths: &[u8]) {
    for (i, w) in widths.iter().enumerate() {
        let bar = i % 2 == 0;
        modules.extend(std::iter::repeat_n(bar, *w as usize));
    }
}

/// Collapse modules into alternating element widths, starting at the first bar.
fn run_widths(modules: &[bool]) -> Vec<u8> {
    let start = modules.iter().position(|m| *m);
    let end = modules.iter().rposition(|m| *m);
    let (Some(start), Some(end)) = (start, end) else {
        return Vec::new();
    };

    let mut widths = Vec::new();
    let mut current = modules[start];
    let mut run: u8 = 0;
    for module in &modules[start..=end] {
        if *module == current {
            run = run.saturating_add(1);
        } else {
            widths.push(run);
            current = *module;
            run = 1;
        }
    }
    widths.push(run);
    widths
}
