//! Date/time format specifiers.
//!
//! Templates written against other logging ecosystems use custom patterns such as
//! `{when:yyyy-MM-dd}`; native callers tend to write `strftime` patterns such as
//! `{when:%Y-%m-%d}`. Both are accepted: a specifier containing `%` is handed to chrono,
//! anything else is read as a custom pattern with invariant month and day names.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, FixedOffset, NaiveDateTime, TimeZone, Timelike};
use std::fmt::Write;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Renders `dt` according to `spec`.
///
/// # Errors
/// Returns a description of the problem when `spec` is not a valid pattern.
pub fn format(
    dt: &NaiveDateTime,
    offset: Option<FixedOffset>,
    spec: &str,
) -> Result<String, String> {
    if spec.contains('%') {
        return format_strftime(dt, offset, spec);
    }

    let pattern = if spec.chars().count() == 1 {
        standard_pattern(spec).ok_or_else(|| format!("unknown date format specifier '{spec}'"))?
    } else {
        spec
    };

    format_custom(dt, offset, pattern)
}

fn format_strftime(
    dt: &NaiveDateTime,
    offset: Option<FixedOffset>,
    spec: &str,
) -> Result<String, String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(spec).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(format!("invalid strftime pattern '{spec}'"));
    }

    let mut out = String::new();
    let written = match offset.and_then(|o| o.from_local_datetime(dt).single()) {
        Some(zoned) => write!(out, "{}", zoned.format_with_items(items.iter())),
        None => write!(out, "{}", dt.format_with_items(items.iter())),
    };
    written.map_err(|_| format!("date pattern '{spec}' needs a time zone"))?;
    Ok(out)
}

/// Single-letter standard formats, expanded to their invariant custom pattern.
fn standard_pattern(spec: &str) -> Option<&'static str> {
    Some(match spec {
        "d" => "MM/dd/yyyy",
        "D" => "dddd, dd MMMM yyyy",
        "f" => "dddd, dd MMMM yyyy HH:mm",
        "F" => "dddd, dd MMMM yyyy HH:mm:ss",
        "g" => "MM/dd/yyyy HH:mm",
        "G" => "MM/dd/yyyy HH:mm:ss",
        "s" => "yyyy-MM-ddTHH:mm:ss",
        "u" => "yyyy-MM-dd HH:mm:ssZ",
        "o" | "O" => "yyyy-MM-ddTHH:mm:ss.fffffffzzz",
        "t" => "HH:mm",
        "T" => "HH:mm:ss",
        _ => return None,
    })
}

/// Longer `y` runs still pad the year to this many digits.
const MAX_YEAR_DIGITS: usize = 10;

fn format_custom(
    dt: &NaiveDateTime,
    offset: Option<FixedOffset>,
    pattern: &str,
) -> Result<String, String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Quoted literal text and backslash escapes pass through verbatim.
        if c == '\'' || c == '"' {
            let end = chars[i + 1..]
                .iter()
                .position(|&q| q == c)
                .ok_or_else(|| format!("unterminated quote in date pattern '{pattern}'"))?;
            out.extend(&chars[i + 1..i + 1 + end]);
            i += end + 2;
            continue;
        }
        if c == '\\' {
            if let Some(&next) = chars.get(i + 1) {
                out.push(next);
            }
            i += 2;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&r| r == c).count();
        i += run;

        match c {
            'y' => {
                let _ = match run {
                    1 => write!(out, "{}", dt.year() % 100),
                    2 => write!(out, "{:02}", dt.year().rem_euclid(100)),
                    n => {
                        let width = n.min(MAX_YEAR_DIGITS);
                        write!(out, "{:0width$}", dt.year())
                    }
                };
            }
            'M' => push_named(&mut out, dt.month0() as usize, run, &MONTHS),
            'd' => match run {
                1 | 2 => pad(&mut out, dt.day(), run),
                _ => push_named(
                    &mut out,
                    dt.weekday().num_days_from_monday() as usize,
                    run,
                    &DAYS,
                ),
            },
            'H' => pad(&mut out, dt.hour(), run.min(2)),
            'h' => pad(&mut out, dt.hour12().1, run.min(2)),
            'm' => pad(&mut out, dt.minute(), run.min(2)),
            's' => pad(&mut out, dt.second(), run.min(2)),
            'f' | 'F' => {
                let digits = run.min(9);
                let nanos = format!("{:09}", dt.nanosecond() % 1_000_000_000);
                let fraction = &nanos[..digits];
                if c == 'F' {
                    out.push_str(fraction.trim_end_matches('0'));
                } else {
                    out.push_str(fraction);
                }
            }
            't' => {
                let pm = dt.hour12().0;
                let marker = if pm { "PM" } else { "AM" };
                out.push_str(if run == 1 { &marker[..1] } else { marker });
            }
            'z' => {
                if let Some(offset) = offset {
                    push_offset(&mut out, offset, run);
                }
            }
            'Z' | 'K' => match offset {
                Some(offset) if offset.local_minus_utc() != 0 => push_offset(&mut out, offset, 3),
                _ => out.push('Z'),
            },
            other => {
                for _ in 0..run {
                    out.push(other);
                }
            }
        }
    }

    Ok(out)
}

fn pad(out: &mut String, value: u32, width: usize) {
    let _ = write!(out, "{value:0width$}");
}

/// One or two letters are numeric, three abbreviate the name, four or more spell it out.
fn push_named(out: &mut String, index: usize, run: usize, names: &[&str]) {
    let name = names[index % names.len()];
    match run {
        1 | 2 => {
            let _ = write!(out, "{:0run$}", index + 1);
        }
        3 => out.push_str(&name[..3]),
        _ => out.push_str(name),
    }
}

fn push_offset(out: &mut String, offset: FixedOffset, run: usize) {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let hours = seconds.abs() / 3600;
    let minutes = (seconds.abs() % 3600) / 60;
    let _ = match run {
        1 => write!(out, "{sign}{hours}"),
        2 => write!(out, "{sign}{hours:02}"),
        _ => write!(out, "{sign}{hours:02}:{minutes:02}"),
    };
}
