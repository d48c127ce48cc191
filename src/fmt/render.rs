//! Composite positional formatting: `{index[,alignment][:format]}` items substituted from an
//! argument list, with `{{` and `}}` collapsing to literal braces.

use super::LogValue;
use crate::Error;

/// Substitutes `args` into a positional `format` string.
///
/// `template` is only used to make errors point at what the caller actually wrote.
///
/// # Errors
/// Returns [`Error::Format`] on unbalanced braces, a malformed item, an invalid format
/// specifier, or an index outside `args`.
pub fn render_positional(template: &str, format: &str, args: &[LogValue]) -> Result<String, Error> {
    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut chars = format.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if chars.peek().is_some_and(|&(_, n)| n == '{') {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut item = String::new();
                let mut closed = false;
                for (_, n) in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    if n == '{' {
                        return Err(Error::format(
                            template,
                            format!("unexpected '{{' inside format item at offset {pos}"),
                        ));
                    }
                    item.push(n);
                }
                if !closed {
                    return Err(Error::format(
                        template,
                        format!("unterminated format item at offset {pos}"),
                    ));
                }

                out.push_str(&render_item(template, &item, args)?);
            }
            '}' => {
                if chars.peek().is_some_and(|&(_, n)| n == '}') {
                    chars.next();
                    out.push('}');
                    continue;
                }
                return Err(Error::format(
                    template,
                    format!("unmatched '}}' at offset {pos}"),
                ));
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Widest padding an alignment may request.
const MAX_ALIGNMENT: usize = 999_999;

fn render_item(template: &str, item: &str, args: &[LogValue]) -> Result<String, Error> {
    let (head, spec) = item
        .split_once(':')
        .map_or((item, None), |(h, s)| (h, Some(s)));
    let (index, alignment) = head
        .split_once(',')
        .map_or((head, None), |(i, a)| (i, Some(a)));

    let index: usize = index.trim().parse().map_err(|_| {
        Error::format(template, format!("'{{{item}}}' is not a valid format item"))
    })?;
    let alignment: Option<isize> = alignment
        .map(|a| a.trim().parse())
        .transpose()
        .map_err(|_| Error::format(template, format!("invalid alignment in '{{{item}}}'")))?;
    if alignment.is_some_and(|a| a.unsigned_abs() > MAX_ALIGNMENT) {
        return Err(Error::format(
            template,
            format!("alignment in '{{{item}}}' exceeds {MAX_ALIGNMENT}"),
        ));
    }

    let arg = args.get(index).ok_or_else(|| {
        Error::format(
            template,
            format!(
                "index {index} is out of range ({} argument{} supplied)",
                args.len(),
                if args.len() == 1 { "" } else { "s" }
            ),
        )
    })?;

    let text = arg
        .format_with(spec)
        .map_err(|reason| Error::format(template, reason))?;

    let Some(width) = alignment else {
        return Ok(text);
    };
    let fill = " ".repeat(width.unsigned_abs().saturating_sub(text.chars().count()));
    Ok(if width < 0 {
        text + &fill
    } else {
        fill + &text
    })
}
