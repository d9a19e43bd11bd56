use std::fmt::Display;
use itertools::Itertools;

pub fn superscript(i: isize) -> String { 
    let (sign, i) = if i < 0 { 
        ("\u{207B}", -i)
    } else { 
        ("", i)
    };

    let digits = i.to_string().chars().map(|d| match d { 
        '1' => '\u{00B9}',
        '2' => '\u{00B2}',
        '3' => '\u{00B3}',
        d => d.to_digit(10)
              .and_then(|d| char::from_u32(('\u{2070}' as u32) + d))
              .unwrap_or(d)
    }).collect::<String>();

    format!("{sign}{digits}")
}

/// Renders `a₀ ⊕ a₁ ⊕ …`, or `dflt` for an empty list.
pub fn direct_sum<S>(summands: impl IntoIterator<Item = S>, dflt: &str) -> String
where S: Display { 
    let s = summands.into_iter().map(|s| s.to_string()).join(" ⊕ ");
    if s.is_empty() { 
        dflt.to_string()
    } else { 
        s
    }
}

/// Renders a vector as `[a, b, c]`.
pub fn vec_str<S>(v: &[S]) -> String
where S: Display { 
    format!("[{}]", v.iter().map(|a| a.to_string()).join(", "))
}
