use std::env::{self, VarError};

use anyhow::{bail, Result};

/// The environment variable `name`, or `default` when unset.
pub fn getenv_or(name: &str, default: &str) -> Result<String> {
    match env::var(name) {
        Ok(v) => Ok(v),
        Err(VarError::NotPresent) => Ok(default.to_string()),
        Err(VarError::NotUnicode(v)) => bail!("env var {name} is not unicode: {v:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_getenv_or() {
        assert_eq!(getenv_or("LIVESITE_SURELY_UNSET_VAR", "fallback").unwrap(),
                   "fallback");
        env::set_var("LIVESITE_TEST_VAR", "set");
        assert_eq!(getenv_or("LIVESITE_TEST_VAR", "fallback").unwrap(), "set");
    }
}
