//! JSON file loading.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::CliError;

/// Read and deserialize a JSON document; `-` reads stdin.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    if path == Path::new("-") {
        return Ok(serde_json::from_reader(std::io::stdin().lock())?);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestfest_quadratic::VoteRecord;
    use std::io::Write;

    #[test]
    fn reads_vote_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"submission_id":"s1","voter_id":"v1","vote_count":2,"credits_spent":4,"timestamp":1700000000,"ip_address":"192.168.1.4"}}]"#
        )
        .unwrap();
        let votes: Vec<VoteRecord> = read_json(file.path()).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].credits_spent, 4);
        assert!(votes[0].competition_id.is_none());
        assert!(votes[0].ip_address.is_some());
    }

    #[test]
    fn malformed_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let result: Result<Vec<VoteRecord>, _> = read_json(file.path());
        assert!(matches!(result, Err(CliError::Json(_))));
    }
}
