use anyhow::{Result, bail};
use sha2::{Digest, Sha256};

/// Resolve CLI seed tokens into numeric seeds.
///
/// Integers are taken as-is (negative values by magnitude). Any other
/// token is a seed phrase and hashes to a stable seed, so `--seeds crypt`
/// replays the same dungeon on every machine.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let seed = if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            phrase_seed(token)
        };
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    }
    if seeds.is_empty() {
        bail!("no seeds supplied");
    }
    Ok(seeds)
}

fn phrase_seed(phrase: &str) -> u64 {
    let digest = Sha256::digest(phrase.to_lowercase().as_bytes());
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
