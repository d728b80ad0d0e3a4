use crate::template::engine::TemplateValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
    /// Padding goes between the sign/prefix and the digits.
    AfterSign,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Minus,
    Plus,
    Space,
}

/// Parsed `[[fill]align][sign][#][0][width][,][.precision][type]` format spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    pub fill: char,
    pub align: Option<Align>,
    pub sign: Sign,
    pub alternate: bool,
    pub zero: bool,
    pub width: usize,
    pub grouping: bool,
    pub precision: Option<usize>,
    pub kind: Option<char>,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            fill: ' ',
            align: None,
            sign: Sign::Minus,
            alternate: false,
            zero: false,
            width: 0,
            grouping: false,
            precision: None,
            kind: None,
        }
    }
}

fn align_of(c: char) -> Option<Align> {
    match c {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}

fn take_digits(chars: &[char], i: &mut usize) -> Option<usize> {
    let start = *i;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        *i += 1;
    }
    if *i == start {
        None
    } else {
        chars[start..*i].iter().collect::<String>().parse().ok()
    }
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<Self, String> {
        let chars = spec.chars().collect::<Vec<_>>();
        let mut out = Self::default();
        let mut i = 0usize;

        if chars.len() >= 2
            && let Some(a) = align_of(chars[1])
        {
            out.fill = chars[0];
            out.align = Some(a);
            i = 2;
        } else if let Some(a) = chars.first().copied().and_then(align_of) {
            out.align = Some(a);
            i = 1;
        }

        match chars.get(i) {
            Some('+') => {
                out.sign = Sign::Plus;
                i += 1;
            }
            Some('-') => i += 1,
            Some(' ') => {
                out.sign = Sign::Space;
                i += 1;
            }
            _ => {}
        }
        if chars.get(i) == Some(&'#') {
            out.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            out.zero = true;
            i += 1;
        }
        out.width = take_digits(&chars, &mut i).unwrap_or(0);
        if chars.get(i) == Some(&',') {
            out.grouping = true;
            i += 1;
        }
        if chars.get(i) == Some(&'.') {
            i += 1;
            out.precision = Some(
                take_digits(&chars, &mut i)
                    .ok_or_else(|| format!("format spec '{spec}': missing precision"))?,
            );
        }
        if let Some(&k) = chars.get(i) {
            if !"dxXobfFeEgGs%".contains(k) {
                return Err(format!("format spec '{spec}': unknown type '{k}'"));
            }
            out.kind = Some(k);
            i += 1;
        }
        if i != chars.len() {
            return Err(format!("format spec '{spec}': unexpected trailing text"));
        }
        Ok(out)
    }

    pub fn apply(&self, value: &TemplateValue) -> Result<String, String> {
        match value {
            TemplateValue::Int(v) => self.format_int(*v),
            TemplateValue::Float(v) => self.format_float(*v),
            TemplateValue::Str(s) => self.format_str(s),
        }
    }

    fn format_int(&self, v: i64) -> Result<String, String> {
        let magnitude = v.unsigned_abs();
        let (prefix, digits) = match self.kind {
            None | Some('d') => ("", magnitude.to_string()),
            Some('x') => ("0x", format!("{magnitude:x}")),
            Some('X') => ("0X", format!("{magnitude:X}")),
            Some('o') => ("0o", format!("{magnitude:o}")),
            Some('b') => ("0b", format!("{magnitude:b}")),
            Some('s') => return Err("type 's' is not valid for an integer".to_string()),
            Some(_) => return self.format_float(v as f64),
        };
        if self.precision.is_some() {
            return Err("precision is not allowed for integers".to_string());
        }
        let digits = if self.grouping {
            group_thousands(&digits)
        } else {
            digits
        };
        let prefix = if self.alternate { prefix } else { "" };
        Ok(self.pad_numeric(v < 0, prefix, &digits))
    }

    fn format_float(&self, v: f64) -> Result<String, String> {
        let m = v.abs();
        let body = match self.kind {
            None => match self.precision {
                Some(p) => general(m, p, self.alternate),
                None if m.is_finite() && m.fract() == 0.0 && m < 1e16 => format!("{m:.1}"),
                None => format!("{m}"),
            },
            Some('f') | Some('F') => format!("{m:.*}", self.precision.unwrap_or(6)),
            Some('e') => scientific(m, self.precision.unwrap_or(6), false),
            Some('E') => scientific(m, self.precision.unwrap_or(6), true),
            Some('g') => general(m, self.precision.unwrap_or(6), self.alternate),
            Some('G') => general(m, self.precision.unwrap_or(6), self.alternate).to_uppercase(),
            Some('%') => format!("{:.*}%", self.precision.unwrap_or(6), m * 100.0),
            Some(k) => return Err(format!("type '{k}' is not valid for a float")),
        };
        let body = if self.grouping {
            let split = body.find(|c: char| !c.is_ascii_digit()).unwrap_or(body.len());
            format!("{}{}", group_thousands(&body[..split]), &body[split..])
        } else {
            body
        };
        Ok(self.pad_numeric(v.is_sign_negative() && v != 0.0, "", &body))
    }

    fn format_str(&self, s: &str) -> Result<String, String> {
        if !matches!(self.kind, None | Some('s')) {
            return Err(format!(
                "type '{}' is not valid for a string",
                self.kind.unwrap_or('s')
            ));
        }
        if self.sign != Sign::Minus || self.align == Some(Align::AfterSign) {
            return Err("sign and '=' alignment are not allowed for strings".to_string());
        }
        let text = match self.precision {
            Some(p) => s.chars().take(p).collect::<String>(),
            None => s.to_string(),
        };
        let fill = if self.zero && self.align.is_none() {
            '0'
        } else {
            self.fill
        };
        Ok(pad(&text, fill, self.align.unwrap_or(Align::Left), self.width))
    }

    fn pad_numeric(&self, negative: bool, prefix: &str, digits: &str) -> String {
        let sign = match (negative, self.sign) {
            (true, _) => "-",
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Minus) => "",
        };
        let (fill, align) = match (self.align, self.zero) {
            (Some(a), _) => (self.fill, a),
            (None, true) => ('0', Align::AfterSign),
            (None, false) => (self.fill, Align::Right),
        };
        if align == Align::AfterSign {
            let lead = format!("{sign}{prefix}");
            let used = lead.chars().count() + digits.chars().count();
            let padding = fill.to_string().repeat(self.width.saturating_sub(used));
            return format!("{lead}{padding}{digits}");
        }
        pad(&format!("{sign}{prefix}{digits}"), fill, align, self.width)
    }
}

fn pad(text: &str, fill: char, align: Align, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let total = width - len;
    let (left, right) = match align {
        Align::Left => (0, total),
        Align::Center => (total / 2, total - total / 2),
        Align::Right | Align::AfterSign => (total, 0),
    };
    let f = fill.to_string();
    format!("{}{}{}", f.repeat(left), text, f.repeat(right))
}

fn group_thousands(digits: &str) -> String {
    let n = digits.len();
    let mut out = String::with_capacity(n + n / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn scientific(m: f64, precision: usize, upper: bool) -> String {
    let raw = format!("{m:.precision$e}");
    let (mantissa, exp) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    let e = if upper { 'E' } else { 'e' };
    format!("{mantissa}{e}{sign}{:02}", exp.abs())
}

fn general(m: f64, precision: usize, keep_zeros: bool) -> String {
    if !m.is_finite() {
        return format!("{m}");
    }
    let p = precision.max(1);
    let exp = if m == 0.0 {
        0
    } else {
        // Exponent after rounding to `p` significant digits.
        let sci = format!("{:.*e}", p - 1, m);
        sci.split_once('e')
            .and_then(|(_, e)| e.parse::<i32>().ok())
            .unwrap_or(0)
    };
    let body = if exp >= -4 && exp < p as i32 {
        format!("{m:.*}", (p as i32 - 1 - exp).max(0) as usize)
    } else {
        scientific(m, p - 1, false)
    };
    if keep_zeros {
        return body;
    }
    let (mantissa, suffix) = match body.find('e') {
        Some(pos) => body.split_at(pos),
        None => (body.as_str(), ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{mantissa}{suffix}")
}

#[cfg(test)]
#[path = "../../tests/unit/template/spec.rs"]
mod tests;
