use anyhow::{Result, bail};

/// Resolve CLI seed tokens into master seeds.
///
/// Accepts decimal integers (negative values use their magnitude) and
/// `0x`-prefixed hexadecimal. Duplicates are dropped, first occurrence wins.
/// An empty list falls back to `fallback`.
pub fn resolve_seed_inputs(tokens: &[String], fallback: u64) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        let seed = parse_seed(token)?;
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(fallback);
    }
    Ok(seeds)
}

fn parse_seed(token: &str) -> Result<u64> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        let digits = hex.replace('_', "");
        return match u64::from_str_radix(&digits, 16) {
            Ok(value) => Ok(value),
            Err(_) => bail!("Unrecognized seed token: {token}"),
        };
    }

    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }

    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }

    bail!("Unrecognized seed token: {token}");
}
