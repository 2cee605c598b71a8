use std::cmp::Ordering;

/// Anything that can be ordered by a display name.
pub trait SortName {
    fn sort_name(&self) -> &str;
}

impl SortName for String {
    fn sort_name(&self) -> &str {
        self
    }
}

impl SortName for str {
    fn sort_name(&self) -> &str {
        self
    }
}

impl<T: SortName + ?Sized> SortName for &T {
    fn sort_name(&self) -> &str {
        (**self).sort_name()
    }
}

/// Compare two names so that embedded digit runs order numerically
/// (`IMG_2.jpg` before `IMG_10.jpg`). Text runs compare case-insensitively,
/// falling back to a byte comparison to keep the order total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_digits = take_digits(&mut left);
                let r_digits = take_digits(&mut right);
                let ord = compare_digit_runs(&l_digits, &r_digits);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}

// Leading zeros are ignored for the numeric value; "007" and "7" are equal here.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Stable in-place natural sort by [`SortName::sort_name`].
pub fn sort_naturally<T: SortName>(items: &mut [T]) {
    items.sort_by(|a, b| natural_cmp(a.sort_name(), b.sort_name()));
}
