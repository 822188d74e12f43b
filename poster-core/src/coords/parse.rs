use crate::{error::CoordinateParseError, types::CoordinateField};

const SEPARATORS: &[char] = &['°', 'º', '\'', '"', '′', '″', ':'];

/// Parses a human-entered coordinate.
///
/// Accepts decimal degrees (`48.8566`, `-2.35`), an optional hemisphere letter
/// before or after the value (`48.8566 N`, `W 2.35`) and degrees with minutes
/// and seconds (`48°51'24"N`, `48 51 24.5 N`). `S` and `W` make the value
/// negative.
pub fn parse_coordinate(input: &str, field: CoordinateField) -> Result<f64, CoordinateParseError> {
    let fail = |reason: &'static str| CoordinateParseError {
        field,
        input: input.to_owned(),
        reason,
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(fail("value is empty"));
    }

    let (hemisphere, body) = split_hemisphere(trimmed).map_err(fail)?;

    let negative_hemisphere = match (field, hemisphere) {
        (_, None) => false,
        (CoordinateField::Latitude, Some('N')) | (CoordinateField::Longitude, Some('E')) => false,
        (CoordinateField::Latitude, Some('S')) | (CoordinateField::Longitude, Some('W')) => true,
        (CoordinateField::Latitude, Some(_)) => {
            return Err(fail("latitude hemisphere must be N or S"));
        }
        (CoordinateField::Longitude, Some(_)) => {
            return Err(fail("longitude hemisphere must be E or W"));
        }
    };

    let (negative_sign, body) = match body.chars().next() {
        Some('-') => (true, &body[1..]),
        Some('+') => (false, &body[1..]),
        _ => (false, body),
    };

    if negative_sign && hemisphere.is_some() {
        return Err(fail("sign conflicts with hemisphere"));
    }

    let magnitude = parse_magnitude(body).map_err(fail)?;

    let value = if negative_sign || negative_hemisphere {
        -magnitude
    } else {
        magnitude
    };

    let limit = match field {
        CoordinateField::Latitude => 90.0,
        CoordinateField::Longitude => 180.0,
    };

    if value.abs() > limit {
        return Err(fail("value is out of range"));
    }

    Ok(value)
}

fn split_hemisphere(input: &str) -> Result<(Option<char>, &str), &'static str> {
    let is_hemisphere = |c: char| matches!(c.to_ascii_uppercase(), 'N' | 'S' | 'E' | 'W');

    let first = input.chars().next().filter(|c| is_hemisphere(*c));
    let last = input.chars().next_back().filter(|c| is_hemisphere(*c));

    match (first, last) {
        (Some(_), Some(_)) if input.chars().count() > 1 => Err("more than one hemisphere"),
        (Some(_), Some(_)) => Err("missing degrees"),
        (Some(c), None) => Ok((Some(c.to_ascii_uppercase()), input[c.len_utf8()..].trim())),
        (None, Some(c)) => Ok((
            Some(c.to_ascii_uppercase()),
            input[..input.len() - c.len_utf8()].trim(),
        )),
        (None, None) => Ok((None, input)),
    }
}

// Degrees, optionally followed by minutes and seconds.
fn parse_magnitude(body: &str) -> Result<f64, &'static str> {
    let parts = body
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().map_err(|_| "not a number"))
        .collect::<Result<Vec<_>, _>>()?;

    if parts.iter().any(|part| !part.is_finite() || *part < 0.0) {
        return Err("not a number");
    }

    match parts.as_slice() {
        [] => Err("missing degrees"),
        [degrees] => Ok(*degrees),
        [degrees, minutes] if *minutes < 60.0 => Ok(degrees + minutes / 60.0),
        [degrees, minutes, seconds] if *minutes < 60.0 && *seconds < 60.0 => {
            Ok(degrees + minutes / 60.0 + seconds / 3600.0)
        }
        [_, _] | [_, _, _] => Err("minutes and seconds must be below 60"),
        _ => Err("too many components"),
    }
}
