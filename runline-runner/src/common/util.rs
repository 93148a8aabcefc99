use anyhow::{Context, Result};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated list of roster indices.
pub fn parse_index_list(s: &str) -> Result<Vec<usize>> {
    split_csv(s)
        .iter()
        .map(|token| {
            token
                .parse::<usize>()
                .with_context(|| format!("invalid roster index: {token}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn index_list_rejects_garbage() {
        assert_eq!(parse_index_list("3, 1,2").unwrap(), vec![3, 1, 2]);
        assert!(parse_index_list("1,x").is_err());
        assert!(parse_index_list("").unwrap().is_empty());
    }
}
